//! Thread-local counters and phase timers for query and construction:
//! plain `Cell`-backed counters queried by dev binaries, not a
//! tracing/log facade. Resetting and snapshotting are the only public
//! contract.

use std::cell::Cell;
use std::time::Duration;

thread_local! {
    static ROWS_FETCHED: Cell<u64> = Cell::new(0);
    static BYTES_MAPPED: Cell<u64> = Cell::new(0);
    static KMERS_HASHED: Cell<u64> = Cell::new(0);

    static HASH_NS: Cell<u64> = Cell::new(0);
    static FETCH_NS: Cell<u64> = Cell::new(0);
    static REDUCE_NS: Cell<u64> = Cell::new(0);
    static POPCOUNT_NS: Cell<u64> = Cell::new(0);
    static RANK_NS: Cell<u64> = Cell::new(0);
}

pub fn reset_counters() {
    ROWS_FETCHED.with(|c| c.set(0));
    BYTES_MAPPED.with(|c| c.set(0));
    KMERS_HASHED.with(|c| c.set(0));
    HASH_NS.with(|c| c.set(0));
    FETCH_NS.with(|c| c.set(0));
    REDUCE_NS.with(|c| c.set(0));
    POPCOUNT_NS.with(|c| c.set(0));
    RANK_NS.with(|c| c.set(0));
}

pub fn add_rows_fetched(n: u64) {
    ROWS_FETCHED.with(|c| c.set(c.get().wrapping_add(n)));
}

pub fn add_bytes_mapped(n: u64) {
    BYTES_MAPPED.with(|c| c.set(c.get().wrapping_add(n)));
}

pub fn add_kmers_hashed(n: u64) {
    KMERS_HASHED.with(|c| c.set(c.get().wrapping_add(n)));
}

/// (rows_fetched, bytes_mapped, kmers_hashed)
pub fn counters_snapshot() -> (u64, u64, u64) {
    (
        ROWS_FETCHED.with(|c| c.get()),
        BYTES_MAPPED.with(|c| c.get()),
        KMERS_HASHED.with(|c| c.get()),
    )
}

/// Query phases, mirroring `cobs::query::Timer`'s per-phase breakdown
/// (hash, fetch, AND-reduce, popcount, rank).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hash,
    Fetch,
    Reduce,
    Popcount,
    Rank,
}

pub fn add_phase_duration(phase: Phase, d: Duration) {
    let ns = d.as_nanos() as u64;
    let cell = match phase {
        Phase::Hash => &HASH_NS,
        Phase::Fetch => &FETCH_NS,
        Phase::Reduce => &REDUCE_NS,
        Phase::Popcount => &POPCOUNT_NS,
        Phase::Rank => &RANK_NS,
    };
    cell.with(|c| c.set(c.get().wrapping_add(ns)));
}

/// (hash_ns, fetch_ns, reduce_ns, popcount_ns, rank_ns)
pub fn phase_snapshot() -> (u64, u64, u64, u64, u64) {
    (
        HASH_NS.with(|c| c.get()),
        FETCH_NS.with(|c| c.get()),
        REDUCE_NS.with(|c| c.get()),
        POPCOUNT_NS.with(|c| c.get()),
        RANK_NS.with(|c| c.get()),
    )
}
