//! A compact bit-sliced signature index (CoBS-style) for approximate
//! k-mer membership queries across many documents.
//!
//! For each document, a Bloom filter is built over its k-mer set; the
//! filters are transposed into row-major bit slices so a single row,
//! indexed by a hash value, yields one bit per document. A query is
//! decomposed into k-mers, each k-mer is hashed to a small set of row
//! offsets, the rows are fetched and AND-ed together per k-mer, the
//! per-document bits are popcount-accumulated across k-mers, and the
//! top-scoring documents are returned.
//!
//! Two on-disk layouts share the same query engine: [`index::ClassicIndex`]
//! (one signature size for every document) and [`index::CompactIndex`]
//! (documents partitioned by size into sub-shards with independent
//! signature sizes but a common page-aligned row width).

pub mod config;
pub mod construction;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod hash;
pub mod index;
pub mod kmer;
pub mod pool;
pub mod popcount;
pub mod query;
pub mod signature_size;
pub mod terms;

pub use config::Settings;
pub use error::{Error, Result};
pub use index::{ClassicIndex, CompactIndex, IndexLayout, SearchIndex};
pub use query::{search, search_str, QueryPlan};
pub use terms::{SliceProducer, TermProducer};
