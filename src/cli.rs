use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pricewatch")]
#[command(about = "Tracks catalog prices through dated snapshots")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scrape the catalog and save today's snapshot
    Scrape(ScrapeArgs),

    /// Compare two saved snapshots
    Diff(DiffArgs),

    /// List saved snapshots, newest first
    List(ListArgs),
}

#[derive(Parser)]
pub struct ScrapeArgs {
    /// Catalog listing url to scrape
    #[arg(long)]
    pub url: Option<String>,

    /// Directory holding snapshots and change logs
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Compare against this snapshot file after saving (takes precedence over --compare-latest)
    #[arg(long)]
    pub compare: Option<PathBuf>,

    /// Compare against the newest snapshot older than today
    #[arg(long, default_value_t = false)]
    pub compare_latest: bool,

    /// Write the price change log next to the snapshots
    #[arg(long, default_value_t = false)]
    pub write_log: bool,

    /// Number of pages fetched concurrently
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-request timeout, e.g. "30s"
    #[arg(long)]
    pub timeout: Option<String>,

    /// Refuse listings that claim more pages than this
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Retries per page before the run is aborted
    #[arg(long)]
    pub retries: Option<usize>,

    /// Output the comparison as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Show debug logging
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct DiffArgs {
    /// Older snapshot file
    #[arg(long, requires = "to")]
    pub from: Option<PathBuf>,

    /// Newer snapshot file
    #[arg(long, requires = "from")]
    pub to: Option<PathBuf>,

    /// Directory searched when --from/--to are omitted
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Write the price change log next to the snapshots
    #[arg(long, default_value_t = false)]
    pub write_log: bool,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Directory holding snapshots
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn diff_accepts_file_pair() {
        let cli = Cli::parse_from(["pricewatch", "diff", "--from", "a.csv", "--to", "b.csv"]);
        match cli.command {
            Command::Diff(args) => {
                assert_eq!(args.from, Some(PathBuf::from("a.csv")));
                assert_eq!(args.to, Some(PathBuf::from("b.csv")));
            }
            _ => panic!("expected diff"),
        }
    }

    #[test]
    fn diff_rejects_half_a_pair() {
        for argv in [
            ["pricewatch", "diff", "--from", "a.csv"],
            ["pricewatch", "diff", "--to", "b.csv"],
        ] {
            let err = Cli::try_parse_from(argv).err().expect("one-sided pair must fail");
            assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        }
    }

    #[test]
    fn diff_without_files_uses_directory() {
        let cli = Cli::parse_from(["pricewatch", "diff", "--dir", "snaps"]);
        match cli.command {
            Command::Diff(args) => {
                assert!(args.from.is_none() && args.to.is_none());
                assert_eq!(args.dir, Some(PathBuf::from("snaps")));
            }
            _ => panic!("expected diff"),
        }
    }
}
