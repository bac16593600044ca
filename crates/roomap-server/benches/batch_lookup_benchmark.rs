//! Performance benchmarks for BatchLookupHandler.
//!
//! Run with: cargo bench -p roomap-server
//!
//! These benchmarks measure:
//! - Batch throughput with varying duplicate ratios (0%, 50%, 90%)
//! - Scaling with batch size up to the default cap
//! - Record assembly cost for large hotels

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

use roomap_domain::{
    build_room_records, primary_key_of, BatchRead, DomainResult, RawFieldMap, ResolverConfig,
    RoomMapReader,
};
use roomap_server::handlers::batch::{BatchLookupHandler, BatchLookupRequest, MAX_BATCH_SIZE};

// =============================================================================
// Benchmark-specific reader
// =============================================================================

/// In-memory reader answering pipelined reads without I/O.
struct BenchRoomMapReader {
    hashes: HashMap<String, RawFieldMap>,
}

impl BenchRoomMapReader {
    fn with_hotels(hotel_count: usize, rooms_per_hotel: usize) -> Self {
        let hashes = (0..hotel_count)
            .map(|h| (primary_key_of(&h.to_string()), hotel_fields(rooms_per_hotel)))
            .collect();
        Self { hashes }
    }
}

#[async_trait]
impl RoomMapReader for BenchRoomMapReader {
    async fn read_hash(&self, key: &str) -> DomainResult<Option<RawFieldMap>> {
        Ok(self.hashes.get(key).cloned())
    }

    async fn read_hashes(&self, keys: &[String]) -> BatchRead {
        BatchRead {
            entries: keys.iter().map(|k| Ok(self.hashes.get(k).cloned())).collect(),
            error: None,
        }
    }
}

fn hotel_fields(rooms: usize) -> RawFieldMap {
    (0..rooms)
        .map(|r| (format!("Deluxe-Room ({r})"), format!(r#"{{"id":{}}}"#, r + 1)))
        .collect()
}

/// Generates `batch_size` identifiers with the given share of duplicates.
fn generate_ids(batch_size: usize, duplicate_ratio: f64) -> Vec<String> {
    let unique_count = ((1.0 - duplicate_ratio) * batch_size as f64).ceil() as usize;
    let unique_count = unique_count.max(1);
    (0..batch_size).map(|i| (i % unique_count).to_string()).collect()
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_batch_deduplication(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let reader = Arc::new(BenchRoomMapReader::with_hotels(MAX_BATCH_SIZE, 20));
    let handler = BatchLookupHandler::new(reader, ResolverConfig::default());

    let mut group = c.benchmark_group("batch_lookup_deduplication");
    group.throughput(Throughput::Elements(MAX_BATCH_SIZE as u64));

    for (label, ratio) in [
        ("0%_duplicates", 0.0),
        ("50%_duplicates", 0.50),
        ("90%_duplicates", 0.90),
    ] {
        let ids = generate_ids(MAX_BATCH_SIZE, ratio);
        group.bench_with_input(BenchmarkId::new("throughput", label), &ids, |b, ids| {
            b.to_async(&rt).iter(|| async {
                let request = BatchLookupRequest::new(ids.clone());
                black_box(handler.resolve(black_box(request)).await)
            })
        });
    }

    group.finish();
}

fn bench_batch_scaling(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let reader = Arc::new(BenchRoomMapReader::with_hotels(MAX_BATCH_SIZE, 20));
    let handler = BatchLookupHandler::new(reader, ResolverConfig::default());

    let mut group = c.benchmark_group("batch_lookup_scaling");

    for batch_size in [1, 10, 50, MAX_BATCH_SIZE] {
        let ids = generate_ids(batch_size, 0.0);
        group.throughput(Throughput::Elements(batch_size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch_size), &ids, |b, ids| {
            b.to_async(&rt).iter(|| async {
                let request = BatchLookupRequest::new(ids.clone());
                black_box(handler.resolve(black_box(request)).await)
            })
        });
    }

    group.finish();
}

fn bench_record_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_assembly");

    for rooms in [10, 200, 2000] {
        let fields = hotel_fields(rooms);
        group.throughput(Throughput::Elements(rooms as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rooms), &fields, |b, fields| {
            b.iter(|| black_box(build_room_records("bench", black_box(fields), 2000)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_batch_deduplication,
    bench_batch_scaling,
    bench_record_assembly
);
criterion_main!(benches);
