use std::sync::OnceLock;

use regex::Regex;
use scraper::Html;
use url::Url;

use super::extract::{css, text_of};

fn summary_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Showing \d+ to \d+ of \d+ \((\d+) Pages?\)")
            .expect("pagination pattern is valid")
    })
}

/// Page count from the "Showing X to Y of Z (P Pages)" summary.
pub fn total_pages(document: &Html) -> Option<u32> {
    let selector = css("div.text-right");
    document
        .select(&selector)
        .map(text_of)
        .find_map(|text| parse_summary(&text))
}

fn parse_summary(text: &str) -> Option<u32> {
    summary_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// The listing url for `page`, replacing any page parameter already present.
pub fn page_url(base: &Url, page: u32) -> Url {
    let pairs: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("page", &page.to_string());
    url
}
