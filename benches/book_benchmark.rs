//! Benchmarks for order book reconciliation and display aggregation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use polypro_market_data::orderbook::{DepthView, OrderBook};
use polypro_market_data::parser::{
    BookEvent, OrderSide, PriceChange, PriceChangeEvent, WireLevel,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn create_snapshot(levels: u32) -> BookEvent {
    let size = Decimal::from_str("100").unwrap();
    let bids: Vec<WireLevel> = (0..levels)
        .map(|i| WireLevel {
            price: Decimal::new(4000 - i as i64, 4),
            size,
        })
        .collect();

    let asks: Vec<WireLevel> = (0..levels)
        .map(|i| WireLevel {
            price: Decimal::new(4500 + i as i64, 4),
            size,
        })
        .collect();

    BookEvent {
        asset_id: "token-yes".to_string(),
        market: "0xabc".to_string(),
        hash: String::new(),
        timestamp: "1700000000000".to_string(),
        bids,
        asks,
    }
}

fn create_delta() -> PriceChangeEvent {
    PriceChangeEvent {
        asset_id: "token-yes".to_string(),
        market: "0xabc".to_string(),
        timestamp: "1700000000001".to_string(),
        changes: vec![
            PriceChange {
                price: Decimal::from_str("0.3999").unwrap(),
                side: OrderSide::Buy,
                size: Decimal::from_str("250").unwrap(),
            },
            PriceChange {
                price: Decimal::from_str("0.4500").unwrap(),
                side: OrderSide::Sell,
                size: Decimal::ZERO,
            },
        ],
    }
}

fn benchmark_apply_snapshot(c: &mut Criterion) {
    let snapshot = create_snapshot(100);

    c.bench_function("apply_snapshot_100_levels", |b| {
        b.iter(|| {
            let mut book = OrderBook::new("token-yes");
            book.apply_book(black_box(&snapshot));
        })
    });
}

fn benchmark_apply_changes(c: &mut Criterion) {
    let snapshot = create_snapshot(100);
    let mut book = OrderBook::new("token-yes");
    book.apply_book(&snapshot);

    let delta = create_delta();

    c.bench_function("apply_changes", |b| {
        b.iter(|| {
            book.apply_changes(black_box(&delta));
        })
    });
}

fn benchmark_depth_view(c: &mut Criterion) {
    let snapshot = create_snapshot(100);
    let mut book = OrderBook::new("token-yes");
    book.apply_book(&snapshot);

    c.bench_function("depth_view_7_rows", |b| {
        b.iter(|| {
            black_box(DepthView::of(&book, 7, false));
        })
    });

    c.bench_function("depth_view_grouped", |b| {
        b.iter(|| {
            black_box(DepthView::of(&book, 7, true));
        })
    });
}

criterion_group!(
    benches,
    benchmark_apply_snapshot,
    benchmark_apply_changes,
    benchmark_depth_view
);
criterion_main!(benches);
