// Builds a classic index over synthetic documents and reports
// construction diagnostics. No argument parser: tune the constants
// below and re-run, in the same spirit as the profiling binaries this
// crate keeps alongside the library.

use cobs_index::construction::classic::{build_classic_index, ClassicDocument};
use cobs_index::diagnostics;
use cobs_index::terms::SliceProducer;
use std::time::Instant;

const NUM_DOCS: usize = 500;
const DOC_LEN: usize = 2_000;
const TERM_SIZE: usize = 31;
const NUM_HASHES: u32 = 3;
const FALSE_POSITIVE_RATE: f64 = 0.1;

fn synthetic_document(seed: usize, len: usize) -> Vec<u8> {
    const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];
    (0..len)
        .map(|i| BASES[(seed.wrapping_mul(2654435761).wrapping_add(i)) % 4])
        .collect()
}

fn main() {
    diagnostics::reset_counters();
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

    let dir = std::env::temp_dir().join("cobs_build_index_demo.cobs_classic");
    let t0 = Instant::now();
    build_classic_index(
        &docs,
        TERM_SIZE,
        NUM_HASHES,
        FALSE_POSITIVE_RATE,
        true,
        &dir,
    )
    .expect("index construction should succeed for synthetic input");
    let elapsed = t0.elapsed();

    println!(
        "built {NUM_DOCS} documents of {DOC_LEN} bases each in {elapsed:?} -> {}",
        dir.display()
    );
    let _ = std::fs::remove_file(&dir);
}
