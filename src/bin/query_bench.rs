// Builds a small classic index, runs a batch of queries against it, and
// prints the phase-timer breakdown. No argument parser; adjust the
// constants below for different shapes.

use cobs_index::construction::classic::{build_classic_index, ClassicDocument};
use cobs_index::diagnostics;
use cobs_index::index::ClassicIndex;
use cobs_index::terms::SliceProducer;
use std::time::Instant;

const NUM_DOCS: usize = 200;
const DOC_LEN: usize = 1_000;
const TERM_SIZE: usize = 31;
const NUM_HASHES: u32 = 3;
const FALSE_POSITIVE_RATE: f64 = 0.1;
const NUM_QUERIES: usize = 50;

fn synthetic_document(seed: usize, len: usize) -> Vec<u8> {
    const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];
    (0..len)
        .map(|i| BASES[(seed.wrapping_mul(2654435761).wrapping_add(i)) % 4])
        .collect()
}

fn main() {
    let docs_data: Vec<Vec<u8>> = (0..NUM_DOCS).map(|i| synthetic_document(i, DOC_LEN)).collect();
    let producers: Vec<SliceProducer> = docs_data.iter().map(|d| SliceProducer::new(d)).collect();
    let docs: Vec<ClassicDocument<SliceProducer>> = producers
        .iter()
        .enumerate()
        .map(|(i, p)| ClassicDocument {
            name: format!("synthetic_{i}"),
            producer: p,
        })
        .collect();

    let path = std::env::temp_dir().join("cobs_query_bench_demo.cobs_classic");
    build_classic_index(&docs, TERM_SIZE, NUM_HASHES, FALSE_POSITIVE_RATE, true, &path)
        .expect("index construction should succeed for synthetic input");
    let index = ClassicIndex::open(&path).expect("index should open after construction");

    diagnostics::reset_counters();
    let t0 = Instant::now();
    for q in 0..NUM_QUERIES {
        let query = synthetic_document(q + 10_000, TERM_SIZE * 3);
        let _ = cobs_index::search_str(&index, &query, 0.0, 10).expect("query should succeed");
    }
    let elapsed = t0.elapsed();

    let (rows, bytes, kmers) = diagnostics::counters_snapshot();
    let (hash_ns, fetch_ns, reduce_ns, popcount_ns, rank_ns) = diagnostics::phase_snapshot();
    println!(
        "ran {NUM_QUERIES} queries in {elapsed:?}: rows_fetched={rows} bytes_mapped={bytes} kmers_hashed={kmers}"
    );
    println!(
        "phase breakdown (ns): hash={hash_ns} fetch={fetch_ns} reduce={reduce_ns} popcount={popcount_ns} rank={rank_ns}"
    );

    let _ = std::fs::remove_file(&path);
}
