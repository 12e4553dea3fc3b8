use url::Url;

use crate::error::{FetchError, FieldExtractionFailed};

/// One product listing as scraped. `link` is the identity across snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub name: String,
    /// First word of the name. Multi-word brands are cut short.
    pub brand: String,
    pub price: Option<i64>,
    pub link: String,
    pub storage: String,
}

impl ProductRecord {
    pub fn new(name: String, price: Option<i64>, link: String, storage: String) -> Self {
        let brand = brand_of(&name);
        ProductRecord { name, brand, price, link, storage }
    }
}

/// Brand heuristic: the first whitespace-delimited token of the display name.
pub fn brand_of(name: &str) -> String {
    name.split_whitespace().next().unwrap_or_default().to_string()
}

/// Records and recoverable problems from a single listing page.
#[derive(Debug, Default)]
pub struct PageResult {
    pub records: Vec<ProductRecord>,
    pub diagnostics: Vec<FieldExtractionFailed>,
}

/// Where listing pages come from. The live catalog uses [`super::http::HttpSource`].
pub trait PageSource: Sync {
    fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_is_first_word() {
        assert_eq!(brand_of("Lenovo IdeaPad Slim 3"), "Lenovo");
        assert_eq!(brand_of("  Asus  Vivobook"), "Asus");
    }

    #[test]
    fn multi_word_brand_is_mis_split() {
        assert_eq!(brand_of("Walton Tamarind EX510"), "Walton");
        assert_eq!(brand_of("Golden Field Laptop"), "Golden");
    }

    #[test]
    fn empty_name_gives_empty_brand() {
        assert_eq!(brand_of(""), "");
    }
}
