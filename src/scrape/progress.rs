use std::io::Write;

/// Page-level progress for a scrape run. Frontends implement this to surface status.
pub trait Progress {
    /// Called once the page count is known.
    fn begin(&mut self, _total_pages: u32) {}

    /// Called when a page has been fetched and extracted.
    fn page_done(&mut self, _page: u32, _total_pages: u32, _records: usize) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Single-line counter on stderr: `Scraping: 3/12 pages (60 products)`.
#[derive(Default)]
pub struct ConsoleProgress {
    completed: u32,
    records: usize,
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, total_pages: u32) {
        self.completed = 0;
        self.records = 0;
        eprint!("\rScraping: 0/{total_pages} pages");
    }

    fn page_done(&mut self, _page: u32, total_pages: u32, records: usize) {
        self.completed += 1;
        self.records += records;
        eprint!(
            "\rScraping: {}/{total_pages} pages ({} products)",
            self.completed, self.records
        );
        let _ = std::io::stderr().flush();
    }

    fn finish(&mut self) {
        eprintln!();
    }
}
