//! Snapshot comparison engine.
//!
//! Joins two snapshots on product link and classifies each product:
//! - increased / decreased / unchanged when it is listed in both
//! - appeared / disappeared when it is listed in only one
//!
//! A product with an unknown price on either side cannot be classified and
//! counts as unchanged with an unknown delta.
//!
//! Entry order is part of the output contract: increases largest first,
//! decreases most negative first, then appeared, disappeared and unchanged.
//! Ties and the non-numeric groups are ordered by link.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use super::snapshot::Snapshot;
use crate::scrape::product::ProductRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Increased,
    Decreased,
    Unchanged,
    AppearedOnly,
    DisappearedOnly,
}

impl Direction {
    fn rank(self) -> u8 {
        match self {
            Direction::Increased => 0,
            Direction::Decreased => 1,
            Direction::AppearedOnly => 2,
            Direction::DisappearedOnly => 3,
            Direction::Unchanged => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub link: String,
    pub name: String,
    pub price_old: Option<i64>,
    pub price_new: Option<i64>,
    pub delta: Option<i64>,
    pub direction: Direction,
}

#[derive(Debug, Serialize)]
pub struct DiffResult {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub entries: Vec<DiffEntry>,
    /// Links listed more than once in either snapshot; the last listing was used.
    pub duplicate_links: Vec<String>,
}

impl DiffResult {
    pub fn with_direction(&self, direction: Direction) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(move |e| e.direction == direction)
    }

    pub fn count(&self, direction: Direction) -> usize {
        self.with_direction(direction).count()
    }

    /// Increased and decreased entries with a known delta, in report order.
    pub fn price_changes(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(|e| {
            e.delta.is_some()
                && matches!(e.direction, Direction::Increased | Direction::Decreased)
        })
    }

    pub fn has_changes(&self) -> bool {
        self.entries.iter().any(|e| e.direction != Direction::Unchanged)
    }
}

/// Index records by link, last listing wins. Returns the duplicated links.
fn index_by_link(records: &[ProductRecord]) -> (HashMap<&str, &ProductRecord>, BTreeSet<String>) {
    let mut map = HashMap::with_capacity(records.len());
    let mut duplicates = BTreeSet::new();
    for record in records {
        if map.insert(record.link.as_str(), record).is_some() {
            duplicates.insert(record.link.clone());
        }
    }
    (map, duplicates)
}

/// Compare a previous snapshot against a current one.
pub fn compare(prev: &Snapshot, curr: &Snapshot) -> DiffResult {
    let (prev_map, mut duplicates) = index_by_link(&prev.records);
    let (curr_map, curr_duplicates) = index_by_link(&curr.records);
    duplicates.extend(curr_duplicates);

    for link in &duplicates {
        tracing::warn!("{link} is listed more than once; using its last listing");
    }

    let mut entries = Vec::with_capacity(prev_map.len().max(curr_map.len()));

    for (link, new) in &curr_map {
        let entry = match prev_map.get(link) {
            Some(old) => {
                let delta = match (old.price, new.price) {
                    (Some(o), Some(n)) => Some(n.saturating_sub(o)),
                    _ => None,
                };
                let direction = match delta {
                    Some(d) if d > 0 => Direction::Increased,
                    Some(d) if d < 0 => Direction::Decreased,
                    _ => Direction::Unchanged,
                };
                let name = if old.name.is_empty() { &new.name } else { &old.name };
                DiffEntry {
                    link: link.to_string(),
                    name: name.clone(),
                    price_old: old.price,
                    price_new: new.price,
                    delta,
                    direction,
                }
            }
            None => DiffEntry {
                link: link.to_string(),
                name: new.name.clone(),
                price_old: None,
                price_new: new.price,
                delta: None,
                direction: Direction::AppearedOnly,
            },
        };
        entries.push(entry);
    }

    for (link, old) in &prev_map {
        if !curr_map.contains_key(link) {
            entries.push(DiffEntry {
                link: link.to_string(),
                name: old.name.clone(),
                price_old: old.price,
                price_new: None,
                delta: None,
                direction: Direction::DisappearedOnly,
            });
        }
    }

    entries.sort_by(report_order);

    DiffResult {
        from_date: prev.captured_on,
        to_date: curr.captured_on,
        entries,
        duplicate_links: duplicates.into_iter().collect(),
    }
}

fn report_order(a: &DiffEntry, b: &DiffEntry) -> Ordering {
    let by_delta = match (a.direction, a.delta, b.delta) {
        (Direction::Increased, Some(x), Some(y)) => y.cmp(&x),
        (Direction::Decreased, Some(x), Some(y)) => x.cmp(&y),
        _ => Ordering::Equal,
    };

    a.direction
        .rank()
        .cmp(&b.direction.rank())
        .then(by_delta)
        .then_with(|| a.link.cmp(&b.link))
}
