pub mod json;
pub mod text;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::Config;
use crate::scrape::ScrapeResult;
use crate::store::diff::{DiffResult, Direction};

/// Status line for the user. Goes to stderr in JSON mode so stdout stays parseable.
pub fn notice(config: &Config, message: &str) {
    if config.json_output {
        eprintln!("{message}");
    } else {
        println!("{message}");
    }
}

/// Pages, products, field warnings and elapsed time of a finished scrape.
pub fn print_run_summary(result: &ScrapeResult, config: &Config) {
    notice(config, &run_summary(result));
    if result.diagnostics.is_empty() {
        return;
    }

    if config.verbose {
        for diagnostic in &result.diagnostics {
            eprintln!("  {diagnostic}");
        }
    } else {
        eprintln!("run with -v to list the field warnings");
    }
}

fn run_summary(result: &ScrapeResult) -> String {
    let duration_sec = result.duration_ms as f64 / 1000.0;
    format!(
        "scraped {} products from {} pages in {duration_sec:.2}s ({} field warnings)",
        result.records.len(),
        result.pages,
        result.diagnostics.len()
    )
}

pub fn print(result: &DiffResult, config: &Config) {
    if config.json_output {
        println!("{}", json::render(result));
        return;
    }

    println!(
        "\nComparing snapshots:\n  From: {}\n  To:   {}\n",
        result.from_date, result.to_date
    );
    print!("{}", text::render(result, &config.currency));
    print_summary(result);
}

fn print_summary(result: &DiffResult) {
    let unknown = result
        .with_direction(Direction::Unchanged)
        .filter(|e| e.delta.is_none())
        .count();

    println!(
        "\n{} increased, {} decreased, {} new, {} delisted, {} unchanged",
        result.count(Direction::Increased),
        result.count(Direction::Decreased),
        result.count(Direction::AppearedOnly),
        result.count(Direction::DisappearedOnly),
        result.count(Direction::Unchanged),
    );
    if unknown > 0 {
        println!("{unknown} product(s) had no price on one side and were not compared");
    }
}

pub fn log_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("price_changes_log_{}.txt", date.format("%Y-%m-%d")))
}

/// Write the change log for `result` into `dir`, named after `date`.
pub fn write_log(
    result: &DiffResult,
    dir: &Path,
    date: NaiveDate,
    currency: &str,
) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = log_path(dir, date);
    std::fs::write(&path, text::render_log(result, currency))?;
    tracing::info!("price change log written to {}", path.display());
    Ok(path)
}

/// Write the change log only when some product appeared, disappeared or changed price.
pub fn write_log_if_changed(
    result: &DiffResult,
    dir: &Path,
    date: NaiveDate,
    currency: &str,
) -> std::io::Result<Option<PathBuf>> {
    if !result.has_changes() {
        tracing::debug!("no changes between {} and {}, no log written", result.from_date, result.to_date);
        return Ok(None);
    }
    write_log(result, dir, date, currency).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Field, FieldExtractionFailed};
    use crate::scrape::product::ProductRecord;
    use crate::store::diff::compare;
    use crate::store::snapshot::Snapshot;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn snap(price: Option<i64>) -> Snapshot {
        Snapshot {
            captured_on: day(),
            records: vec![ProductRecord::new("HP Victus".into(), price, "v".into(), String::new())],
        }
    }

    #[test]
    fn log_file_named_after_date() {
        let dir = tempfile::tempdir().unwrap();
        let day = day();
        let snap = |price| snap(Some(price));

        let path = write_log(&compare(&snap(100), &snap(90)), dir.path(), day, "Taka").unwrap();

        assert_eq!(path, dir.path().join("price_changes_log_2024-06-30.txt"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("Price decreased: 10 Taka"));
    }

    #[test]
    fn log_skipped_without_changes() {
        let dir = tempfile::tempdir().unwrap();

        let same = compare(&snap(Some(100)), &snap(Some(100)));
        assert_eq!(write_log_if_changed(&same, dir.path(), day(), "Taka").unwrap(), None);
        let unknown = compare(&snap(None), &snap(Some(100)));
        assert_eq!(write_log_if_changed(&unknown, dir.path(), day(), "Taka").unwrap(), None);
        assert!(!log_path(dir.path(), day()).exists());

        let changed = compare(&snap(Some(100)), &snap(Some(120)));
        let path = write_log_if_changed(&changed, dir.path(), day(), "Taka").unwrap();
        assert_eq!(path, Some(log_path(dir.path(), day())));
    }

    #[test]
    fn run_summary_counts() {
        let result = ScrapeResult {
            records: snap(Some(1)).records,
            diagnostics: vec![FieldExtractionFailed { page: 1, container: 0, field: Field::Storage }],
            pages: 2,
            duration_ms: 1500,
        };
        assert_eq!(
            run_summary(&result),
            "scraped 1 products from 2 pages in 1.50s (1 field warnings)"
        );
    }
}
