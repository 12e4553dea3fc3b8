//! Plain text rendering of price changes.
//!
//! Console output lists increases and decreases followed by new and delisted
//! products. The change log carries only the increase and decrease sections.

use std::fmt::Write;

use crate::store::diff::{DiffEntry, DiffResult, Direction};

const HEADLINE: &str = "The prices of the following products have changed";
const RULE: &str = "=========";

pub fn render(result: &DiffResult, currency: &str) -> String {
    if !result.has_changes() {
        return String::from("No prices have changed.\n");
    }

    let mut output = String::new();
    writeln!(output, "{HEADLINE}").ok();
    push_changes(&mut output, result, currency);

    let appeared: Vec<_> = result.with_direction(Direction::AppearedOnly).collect();
    if !appeared.is_empty() {
        writeln!(output, "{RULE}\nNew listings:").ok();
        for entry in appeared {
            writeln!(output, "- Link {} \n\tPrice: {}\n", entry.link, price(entry.price_new, currency)).ok();
        }
    }

    let gone: Vec<_> = result.with_direction(Direction::DisappearedOnly).collect();
    if !gone.is_empty() {
        writeln!(output, "{RULE}\nDelisted:").ok();
        for entry in gone {
            writeln!(output, "- Link {} \n\tLast price: {}\n", entry.link, price(entry.price_old, currency)).ok();
        }
    }

    if !result.duplicate_links.is_empty() {
        writeln!(
            output,
            "{RULE}\nListed more than once (last listing used): {}",
            result.duplicate_links.join(", ")
        )
        .ok();
    }

    output
}

/// Text for the persisted change log.
pub fn render_log(result: &DiffResult, currency: &str) -> String {
    let mut output = String::new();
    writeln!(output, "{HEADLINE}").ok();
    push_changes(&mut output, result, currency);
    output
}

fn push_changes(output: &mut String, result: &DiffResult, currency: &str) {
    let (increased, decreased): (Vec<&DiffEntry>, Vec<&DiffEntry>) = result
        .price_changes()
        .partition(|e| e.direction == Direction::Increased);

    writeln!(output, "{RULE}\nIncreased:").ok();
    for entry in increased {
        push_change(output, entry, "increased", "Increased", currency);
    }

    writeln!(output, "{RULE}\nDecreased:").ok();
    for entry in decreased {
        push_change(output, entry, "decreased", "Decreased", currency);
    }
}

fn push_change(output: &mut String, entry: &DiffEntry, verb: &str, label: &str, currency: &str) {
    // price_changes() only yields entries with both prices known
    let (Some(delta), Some(old), Some(new)) = (entry.delta, entry.price_old, entry.price_new) else {
        return;
    };
    writeln!(
        output,
        "- Link {} \n\tPrice {verb}: {} {currency}\n\tPrevious price: {old} {currency}, {label} price: {new} {currency}\n",
        entry.link,
        delta.unsigned_abs(),
    )
    .ok();
}

fn price(value: Option<i64>, currency: &str) -> String {
    match value {
        Some(v) => format!("{v} {currency}"),
        None => String::from("unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::product::ProductRecord;
    use crate::store::diff::compare;
    use crate::store::snapshot::Snapshot;
    use chrono::NaiveDate;

    fn snapshot(records: &[(&str, Option<i64>)]) -> Snapshot {
        Snapshot {
            captured_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            records: records
                .iter()
                .map(|(link, price)| {
                    ProductRecord::new(format!("Item {link}"), *price, link.to_string(), String::new())
                })
                .collect(),
        }
    }

    #[test]
    fn log_lists_increases_then_decreases() {
        let result = compare(
            &snapshot(&[("a", Some(1000)), ("b", Some(500)), ("c", Some(900))]),
            &snapshot(&[("a", Some(1200)), ("b", Some(450)), ("c", None)]),
        );

        let expected = "The prices of the following products have changed\n\
                        =========\n\
                        Increased:\n\
                        - Link a \n\tPrice increased: 200 Taka\n\tPrevious price: 1000 Taka, Increased price: 1200 Taka\n\n\
                        =========\n\
                        Decreased:\n\
                        - Link b \n\tPrice decreased: 50 Taka\n\tPrevious price: 500 Taka, Decreased price: 450 Taka\n\n";

        assert_eq!(render_log(&result, "Taka"), expected);
    }

    #[test]
    fn console_adds_new_and_delisted_sections() {
        let result = compare(&snapshot(&[("gone", Some(5))]), &snapshot(&[("new", None)]));

        let text = render(&result, "Taka");

        assert!(text.contains("Increased:\n=========\nDecreased:\n"));
        assert!(text.contains("New listings:\n- Link new \n\tPrice: unknown\n"));
        assert!(text.contains("Delisted:\n- Link gone \n\tLast price: 5 Taka\n"));
    }

    #[test]
    fn nothing_changed() {
        let result = compare(&snapshot(&[("a", Some(1))]), &snapshot(&[("a", Some(1))]));
        assert_eq!(render(&result, "Taka"), "No prices have changed.\n");
    }

    #[test]
    fn unknown_prices_never_reach_change_sections() {
        let result = compare(&snapshot(&[("a", None)]), &snapshot(&[("a", Some(10))]));
        let log = render_log(&result, "Taka");
        assert!(!log.contains("Link a"));
    }

    #[test]
    fn duplicates_are_surfaced() {
        let result = compare(&snapshot(&[("a", Some(1)), ("a", Some(2))]), &snapshot(&[("a", Some(3))]));
        assert!(render(&result, "Taka").contains("Listed more than once (last listing used): a"));
    }
}
