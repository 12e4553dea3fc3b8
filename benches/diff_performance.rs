use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricewatch::scrape::extract;
use pricewatch::scrape::product::ProductRecord;
use pricewatch::store::diff;
use pricewatch::store::{Snapshot, SnapshotStore};
use scraper::Html;
use tempfile::TempDir;
use url::Url;

/// Fixture generator for catalog-sized snapshots and listing pages
mod fixtures {
    use super::*;

    /// `size` products; every third price moves, every tenth product is swapped out
    pub fn snapshot_pair(size: usize) -> (Snapshot, Snapshot) {
        let record = |i: usize, price: i64| {
            ProductRecord::new(
                format!("Brand{} Model {i}", i % 12),
                Some(price),
                format!("https://shop.example/product-{i}"),
                "RAM: 16GB, Storage: 512GB SSD".to_string(),
            )
        };

        let prev = (0..size).map(|i| record(i, 50_000 + i as i64)).collect();
        let curr = (0..size)
            .map(|i| {
                let id = if i % 10 == 0 { i + size } else { i };
                let price = match i % 3 {
                    0 => 50_000 + i as i64 + 1_500,
                    1 => 50_000 + i as i64 - 700,
                    _ => 50_000 + i as i64,
                };
                record(id, price)
            })
            .collect();

        (
            Snapshot { captured_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), records: prev },
            Snapshot { captured_on: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), records: curr },
        )
    }

    pub fn listing_page(items: usize) -> String {
        let body: String = (0..items)
            .map(|i| {
                format!(
                    r#"<div class="p-item"><div class="p-item-details">
                       <h4 class="p-item-name"><a href="/product-{i}">Brand Model {i}</a></h4>
                       <ul><li>Processor: Core i5</li><li>RAM: 8GB, 512GB SSD</li></ul>
                       <div class="p-item-price"><span>৳{i},000</span></div></div></div>"#
                )
            })
            .collect();
        format!(r#"<html><body>{body}<div class="text-right">Showing 1 to {items} of {items} (1 Pages)</div></body></html>"#)
    }
}

/// Benchmark: diff engine across catalog sizes
fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_snapshots");

    for size in [100, 1_000, 10_000] {
        let (prev, curr) = fixtures::snapshot_pair(size);
        group.bench_with_input(BenchmarkId::new("products", size), &size, |b, _| {
            b.iter(|| {
                let result = diff::compare(black_box(&prev), black_box(&curr));
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark: extracting a full listing page
fn bench_extract_page(c: &mut Criterion) {
    let html = fixtures::listing_page(20);
    let url = Url::parse("https://shop.example/laptop-notebook").unwrap();

    c.bench_function("extract_listing_page", |b| {
        b.iter(|| {
            let document = Html::parse_document(black_box(&html));
            black_box(extract::extract(&document, &url, 1));
        });
    });
}

/// Benchmark: csv round trip of a large snapshot
fn bench_snapshot_round_trip(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp_dir.path());
    let (snapshot, _) = fixtures::snapshot_pair(5_000);

    c.bench_function("snapshot_write_read_5000", |b| {
        b.iter(|| {
            let path = store.write(black_box(&snapshot)).unwrap();
            black_box(SnapshotStore::read(&path).unwrap());
        });
    });
}

criterion_group!(benches, bench_compare, bench_extract_page, bench_snapshot_round_trip);

criterion_main!(benches);
