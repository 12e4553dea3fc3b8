//! Product extraction from one listing page.
//!
//! Layout contract for the catalog as currently published:
//! - each product sits in `div.p-item`
//! - name and link come from `div.p-item-details h4.p-item-name a`
//! - the short description is a `ul` of detail lines; the RAM/storage line
//!   is the second one
//! - the price is the first `span` in `div.p-item-price`
//!
//! The storage line is looked up by label first and only falls back to the
//! positional rule, so a reordered description still yields the right line
//! as long as it mentions RAM or storage.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::price::parse_price;
use super::product::{PageResult, ProductRecord};
use crate::error::{Field, FieldExtractionFailed};

/// Zero-based position of the RAM/storage line in the detail list.
pub const STORAGE_ITEM_INDEX: usize = 1;

struct Selectors {
    item: Selector,
    name_link: Selector,
    detail_items: Selector,
    price: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        item: css("div.p-item"),
        name_link: css("div.p-item-details h4.p-item-name a"),
        detail_items: css("ul li"),
        price: css("div.p-item-price span"),
    })
}

fn storage_label() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| {
        Regex::new(r"(?i)\b(ram|ssd|hdd|emmc|storage)\b").expect("storage label pattern is valid")
    })
}

pub(crate) fn css(selector: &str) -> Selector {
    Selector::parse(selector).expect("hard-coded selector is valid")
}

/// Element text with runs of whitespace collapsed.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Extract every product on a parsed listing page.
///
/// Relative links are resolved against `page_url`. Missing fields become
/// empty strings or an unknown price and are reported in the diagnostics;
/// a product without a link cannot be identified and is skipped.
pub fn extract(document: &Html, page_url: &Url, page: u32) -> PageResult {
    let selectors = selectors();
    let mut result = PageResult::default();

    for (index, item) in document.select(&selectors.item).enumerate() {
        let mut missing = |field| {
            result.diagnostics.push(FieldExtractionFailed { page, container: index, field });
        };

        let anchor = item.select(&selectors.name_link).next();

        let link = anchor
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .and_then(|href| page_url.join(href).ok());
        let Some(link) = link else {
            missing(Field::Link);
            continue;
        };

        let name = anchor.map(text_of).unwrap_or_default();
        if name.is_empty() {
            missing(Field::Name);
        }

        let storage = storage_line(item);
        if storage.is_empty() {
            missing(Field::Storage);
        }

        let price = match item.select(&selectors.price).next().map(text_of) {
            Some(text) => {
                let price = parse_price(&text);
                if price.is_none() && !text.eq_ignore_ascii_case(super::price::UNAVAILABLE) {
                    missing(Field::Price);
                }
                price
            }
            None => {
                missing(Field::Price);
                None
            }
        };

        result.records.push(ProductRecord::new(name, price, link.to_string(), storage));
    }

    for failure in &result.diagnostics {
        tracing::warn!("{failure}");
    }

    result
}

fn storage_line(item: ElementRef<'_>) -> String {
    let lines: Vec<String> = item.select(&selectors().detail_items).map(text_of).collect();

    lines
        .iter()
        .find(|line| storage_label().is_match(line))
        .or_else(|| lines.get(STORAGE_ITEM_INDEX))
        .cloned()
        .unwrap_or_default()
}
