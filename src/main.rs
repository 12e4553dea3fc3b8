use std::path::Path;

use chrono::{Local, NaiveDate};
use clap::Parser;
use pricewatch::cli::{Cli, Command};
use pricewatch::config::{CompareTarget, Config, FileConfig};
use pricewatch::logging;
use pricewatch::report;
use pricewatch::scrape::{self, http::HttpSource, progress::ConsoleProgress};
use pricewatch::store::diff;
use pricewatch::store::{Snapshot, SnapshotStore};

fn exit_with(context: &str, err: &dyn std::error::Error) -> ! {
    eprintln!("{context}: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
    std::process::exit(1);
}

fn load_config(path: Option<&Path>) -> Config {
    FileConfig::load(path)
        .and_then(Config::from_file)
        .unwrap_or_else(|e| exit_with("Error loading config", &e))
}

fn read_snapshot(path: &Path) -> Snapshot {
    SnapshotStore::read(path)
        .unwrap_or_else(|e| exit_with(&format!("Error reading snapshot {}", path.display()), &e))
}

fn compare_and_report(previous: &Snapshot, current: &Snapshot, config: &Config, log_date: NaiveDate) {
    let result = diff::compare(previous, current);
    report::print(&result, config);

    if config.write_log {
        match report::write_log_if_changed(&result, &config.snapshot_dir, log_date, &config.currency) {
            Ok(Some(path)) => report::notice(
                config,
                &format!("\nThe price change logs have been written to {}", path.display()),
            ),
            Ok(None) => {}
            Err(e) => exit_with("Error writing change log", &e),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Scrape(args) => {
            logging::init(args.verbose);
            let mut config = load_config(cli.config.as_deref());
            if let Err(e) = config.apply_scrape_args(&args) {
                exit_with("Invalid arguments", &e);
            }

            let source = HttpSource::new(config.timeout);
            let result = scrape::run(&source, &config, &mut ConsoleProgress::default())
                .unwrap_or_else(|e| exit_with("Scrape failed", &e));
            report::print_run_summary(&result, &config);

            let today = Local::now().date_naive();
            let store = SnapshotStore::new(&config.snapshot_dir);
            let current = Snapshot { captured_on: today, records: result.records };
            let path = store
                .write(&current)
                .unwrap_or_else(|e| exit_with("Error saving snapshot", &e));
            report::notice(&config, &format!("Current date's data has been saved to {}", path.display()));

            let previous_path = match &config.compare {
                CompareTarget::None => return,
                CompareTarget::Path(p) => p.clone(),
                CompareTarget::Latest => match store.latest_before(today) {
                    Ok(Some(file)) => file.path,
                    Ok(None) => {
                        report::notice(
                            &config,
                            &format!("No earlier snapshot in {} to compare with.", store.dir().display()),
                        );
                        return;
                    }
                    Err(e) => exit_with("Error listing snapshots", &e),
                },
            };

            let previous = read_snapshot(&previous_path);
            compare_and_report(&previous, &current, &config, today);
        }
        Command::Diff(args) => {
            logging::init(false);
            let mut config = load_config(cli.config.as_deref());
            config.apply_diff_args(&args);

            // clap requires --from and --to together
            let (from, to) = match (args.from, args.to) {
                (Some(from), Some(to)) => (from, to),
                _ => {
                    let store = SnapshotStore::new(&config.snapshot_dir);
                    match store.latest_pair() {
                        Ok(Some((older, newer))) => (older.path, newer.path),
                        Ok(None) => {
                            eprintln!(
                                "Need at least 2 snapshots in {} to compare. Run 'pricewatch scrape' on different days.",
                                store.dir().display()
                            );
                            std::process::exit(1);
                        }
                        Err(e) => exit_with("Error listing snapshots", &e),
                    }
                }
            };

            let previous = read_snapshot(&from);
            let current = read_snapshot(&to);
            compare_and_report(&previous, &current, &config, current.captured_on);
        }
        Command::List(args) => {
            logging::init(false);
            let mut config = load_config(cli.config.as_deref());
            if let Some(dir) = args.dir {
                config.snapshot_dir = dir;
            }

            let store = SnapshotStore::new(&config.snapshot_dir);
            let files = store
                .list()
                .unwrap_or_else(|e| exit_with("Error listing snapshots", &e));

            if files.is_empty() {
                println!("No snapshots found. Run 'pricewatch scrape' to create one.");
                return;
            }

            println!("{:<12} {:>9}  {}", "Date", "Products", "File");
            println!("{}", "-".repeat(60));
            for file in files {
                let products = SnapshotStore::read(&file.path)
                    .map(|s| s.records.len().to_string())
                    .unwrap_or_else(|_| "corrupt".to_string());
                println!("{:<12} {:>9}  {}", file.captured_on, products, file.path.display());
            }
        }
    }
}
