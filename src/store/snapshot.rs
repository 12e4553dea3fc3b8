use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Local, NaiveDate};
use regex::Regex;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::SnapshotError;
use crate::scrape::product::{brand_of, ProductRecord};

/// One dated capture of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub captured_on: NaiveDate,
    pub records: Vec<ProductRecord>,
}

/// A snapshot file found in the snapshot directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    pub path: PathBuf,
    pub captured_on: NaiveDate,
}

const HEADER: [&str; 6] = ["index", "Name", "Brand", "Price", "Link", "Storage"];

#[derive(Serialize)]
struct Row<'a> {
    index: usize,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Brand")]
    brand: &'a str,
    #[serde(rename = "Price")]
    price: Option<i64>,
    #[serde(rename = "Link")]
    link: &'a str,
    #[serde(rename = "Storage")]
    storage: &'a str,
}

/// CSV snapshots in a single directory, one file per capture date.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("snapshot_{}.csv", date.format("%Y-%m-%d")))
    }

    /// Write `snapshot` to its dated file, replacing an earlier run from the same day.
    /// The rows go to a temp file first, which is removed again if anything fails.
    pub fn write(&self, snapshot: &Snapshot) -> Result<PathBuf, SnapshotError> {
        let path = self.path_for(snapshot.captured_on);
        let tmp = path.with_extension("csv.tmp");

        fs::create_dir_all(&self.dir)
            .map_err(|source| SnapshotError::Io { path: self.dir.clone(), source })?;

        let written = write_rows(&tmp, &snapshot.records).and_then(|()| {
            fs::rename(&tmp, &path).map_err(|source| SnapshotError::Io { path: path.clone(), source })
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        tracing::info!("saved {} products to {}", snapshot.records.len(), path.display());
        Ok(path)
    }

    /// Read a snapshot written by [`SnapshotStore::write`] or by the older
    /// pandas export (unnamed index column, float prices, NaN for unknown).
    pub fn read(path: &Path) -> Result<Snapshot, SnapshotError> {
        let corrupt = |reason: String| SnapshotError::Corrupt { path: path.to_path_buf(), reason };
        let csv_err = |source| SnapshotError::Csv { path: path.to_path_buf(), source };

        let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
        let headers = reader.headers().map_err(csv_err)?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);

        let link_col = column("Link").ok_or_else(|| corrupt("missing column 'Link'".into()))?;
        let price_col = column("Price").ok_or_else(|| corrupt("missing column 'Price'".into()))?;
        let name_col = column("Name");
        let brand_col = column("Brand");
        let storage_col = column("Storage");

        let mut records = Vec::new();
        for (i, row) in reader.records().enumerate() {
            let row = row.map_err(csv_err)?;
            let line = i + 2;
            let cell = |col: Option<usize>| {
                col.and_then(|c| row.get(c)).unwrap_or_default().to_string()
            };

            let link = cell(Some(link_col));
            if link.trim().is_empty() {
                return Err(corrupt(format!("row {line}: empty link")));
            }
            let price_text = cell(Some(price_col));
            let price = parse_stored_price(&price_text)
                .ok_or_else(|| corrupt(format!("row {line}: invalid price '{price_text}'")))?;

            let name = cell(name_col);
            let brand = match brand_col {
                Some(_) => cell(brand_col),
                None => brand_of(&name),
            };

            records.push(ProductRecord {
                name,
                brand,
                price,
                link,
                storage: cell(storage_col),
            });
        }

        let captured_on = snapshot_date(path)?;
        tracing::debug!("read {} products from {}", records.len(), path.display());
        Ok(Snapshot { captured_on, records })
    }

    /// CSV files in the snapshot directory, newest first.
    pub fn list(&self) -> Result<Vec<SnapshotFile>, SnapshotError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry
                .map_err(|e| SnapshotError::Io { path: self.dir.clone(), source: e.into() })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_csv(path) {
                continue;
            }
            files.push(SnapshotFile { captured_on: snapshot_date(path)?, path: path.to_path_buf() });
        }

        files.sort_by(|a, b| b.captured_on.cmp(&a.captured_on).then_with(|| b.path.cmp(&a.path)));
        Ok(files)
    }

    /// The two newest snapshots as `(older, newer)`, or None with fewer than two.
    /// Files sharing a date are ordered by path, like [`SnapshotStore::list`].
    pub fn latest_pair(&self) -> Result<Option<(SnapshotFile, SnapshotFile)>, SnapshotError> {
        let mut files = self.list()?.into_iter();
        Ok(match (files.next(), files.next()) {
            (Some(newer), Some(older)) => Some((older, newer)),
            _ => None,
        })
    }

    /// Newest snapshot captured strictly before `date`.
    pub fn latest_before(&self, date: NaiveDate) -> Result<Option<SnapshotFile>, SnapshotError> {
        Ok(self.list()?.into_iter().find(|f| f.captured_on < date))
    }
}

fn write_rows(tmp: &Path, records: &[ProductRecord]) -> Result<(), SnapshotError> {
    let csv_err = |source| SnapshotError::Csv { path: tmp.to_path_buf(), source };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(tmp)
        .map_err(csv_err)?;
    writer.write_record(HEADER).map_err(csv_err)?;
    for (i, record) in records.iter().enumerate() {
        writer
            .serialize(Row {
                index: i + 1,
                name: &record.name,
                brand: &record.brand,
                price: record.price,
                link: &record.link,
                storage: &record.storage,
            })
            .map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|source| SnapshotError::Io { path: tmp.to_path_buf(), source })
}

fn is_csv(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn filename_date() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"_(\d{4}-\d{2}-\d{2})\.csv$").expect("snapshot filename pattern is valid")
    })
}

/// Capture date from a `_YYYY-MM-DD.csv` suffix, else the file's modification date.
fn snapshot_date(path: &Path) -> Result<NaiveDate, SnapshotError> {
    let from_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| filename_date().captures(n))
        .and_then(|caps| NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok());
    if let Some(date) = from_name {
        return Ok(date);
    }

    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| SnapshotError::Io { path: path.to_path_buf(), source })?;
    Ok(DateTime::<Local>::from(modified).date_naive())
}

/// Stored price cell: integer, integral float, or empty/NaN for unknown.
/// The outer None means the cell is not a price at all.
fn parse_stored_price(cell: &str) -> Option<Option<i64>> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Some(None);
    }
    if let Ok(value) = cell.parse::<i64>() {
        return Some(Some(value));
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 => {
            Some(Some(value as i64))
        }
        _ => None,
    }
}
