//! The query engine: hash the query's k-mers to row offsets, fetch
//! rows, AND-reduce per k-mer, popcount-accumulate into per-document
//! counters, and partially rank the top results.

use std::time::Instant;

use rayon::prelude::*;

use crate::diagnostics::{self, Phase};
use crate::error::Error;
use crate::index::IndexLayout;
use crate::kmer::canonicalize;
use crate::popcount::accumulate_byte;

/// A query's k-mer windows, pre-hashed to row indices, together with
/// the parameters the index it was built for used. `search` validates
/// that a plan was built for the same `term_size` and `num_hashes` as
/// the index it is run against; a mismatch fails with
/// `Error::IndexMismatch`, rather than silently reading wrong rows.
pub struct QueryPlan {
    term_size: u32,
    num_hashes: u32,
    num_terms: usize,
    /// Flattened `num_terms * num_hashes` hash values; a term's hashes
    /// occupy `hashes[i * num_hashes .. (i+1) * num_hashes]`.
    hashes: Vec<u64>,
}

impl QueryPlan {
    /// Builds a plan for `query` against an index with the given
    /// `term_size`, `num_hashes`, and canonicalization contract.
    pub fn new(
        query: &[u8],
        term_size: u32,
        num_hashes: u32,
        canonicalize_terms: bool,
    ) -> Result<QueryPlan, Error> {
        let t = term_size as usize;
        if query.len() < t {
            return Err(Error::QueryTooShort {
                query_len: query.len(),
                term_size: t,
            });
        }

        let start = Instant::now();
        let mut hashes = Vec::with_capacity((query.len() - t + 1) * num_hashes as usize);
        let mut num_terms = 0usize;
        for window in query.windows(t) {
            let canonical;
            let term = if canonicalize_terms {
                canonical = canonicalize(window);
                canonical.as_slice()
            } else {
                window
            };
            // Row indices require a signature size, which this plan
            // does not own; store the raw xxh64 digests here and reduce
            // modulo signature_size lazily inside `search`, since the
            // compact layout has a different signature_size per
            // partition and cannot be folded in up front.
            for seed in 0..num_hashes as u64 {
                hashes.push(crate::hash::hash_kmer(term, seed));
            }
            num_terms += 1;
        }
        diagnostics::add_kmers_hashed(num_terms as u64);
        diagnostics::add_phase_duration(Phase::Hash, start.elapsed());

        Ok(QueryPlan {
            term_size,
            num_hashes,
            num_terms,
            hashes,
        })
    }

    pub fn num_terms(&self) -> usize {
        self.num_terms
    }
}

/// Runs `plan` against `index`, returning `(score, name)` pairs ordered
/// by descending score (ties broken by ascending original document
/// index), filtered by `threshold` and trimmed to `num_results` (`0`
/// means "all documents").
pub fn search<L: IndexLayout>(
    index: &L,
    plan: &QueryPlan,
    threshold: f64,
    num_results: usize,
) -> Result<Vec<(u16, String)>, Error> {
    if plan.term_size != index.term_size() || plan.num_hashes != index.num_hashes() {
        return Err(Error::IndexMismatch(format!(
            "query plan built for term_size={}, num_hashes={}, but index uses term_size={}, num_hashes={}",
            plan.term_size,
            plan.num_hashes,
            index.term_size(),
            index.num_hashes()
        )));
    }

    let row_size = index.row_size();
    let num_hashes = plan.num_hashes as usize;
    let num_terms = plan.num_terms;

    // Fetch: one row per hash lookup.
    let fetch_start = Instant::now();
    let mut rows = vec![0u8; plan.hashes.len() * row_size];
    rows.par_chunks_mut(row_size)
        .zip(plan.hashes.par_iter())
        .for_each(|(buf, &digest)| {
            index.read_row_into(digest, buf);
        });
    diagnostics::add_rows_fetched(plan.hashes.len() as u64);
    diagnostics::add_bytes_mapped((plan.hashes.len() * row_size) as u64);
    diagnostics::add_phase_duration(Phase::Fetch, fetch_start.elapsed());

    // Reduce: AND together each term's num_hashes consecutive rows.
    let reduce_start = Instant::now();
    let hit_rows: Vec<Vec<u8>> = (0..num_terms)
        .into_par_iter()
        .map(|term_idx| {
            let base = term_idx * num_hashes * row_size;
            let mut hit = rows[base..base + row_size].to_vec();
            for h in 1..num_hashes {
                let row = &rows[base + h * row_size..base + (h + 1) * row_size];
                for (a, b) in hit.iter_mut().zip(row.iter()) {
                    *a &= b;
                }
            }
            hit
        })
        .collect();
    diagnostics::add_phase_duration(Phase::Reduce, reduce_start.elapsed());

    // Accumulate: popcount-expand each hit row's bits into 16-bit
    // per-document counters.
    let popcount_start = Instant::now();
    let num_docs_padded = row_size * 8;
    let counters = hit_rows
        .par_iter()
        .fold(
            || vec![0u16; num_docs_padded],
            |mut acc, hit| {
                for (byte_idx, &byte) in hit.iter().enumerate() {
                    if byte != 0 {
                        accumulate_byte(&mut acc, byte_idx, byte);
                    }
                }
                acc
            },
        )
        .reduce(
            || vec![0u16; num_docs_padded],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b.iter()) {
                    *x = x.saturating_add(*y);
                }
                a
            },
        );
    diagnostics::add_phase_duration(Phase::Popcount, popcount_start.elapsed());

    // Rank: trim to the real document count, threshold, partial sort.
    let rank_start = Instant::now();
    let names = index.file_names();
    let num_docs = names.len();
    let min_score = (threshold * num_terms as f64).ceil() as u16;

    let mut scored: Vec<(u16, usize)> = (0..num_docs)
        .map(|d| (counters[d], d))
        .filter(|&(score, _)| score >= min_score)
        .collect();

    let k = if num_results == 0 {
        scored.len()
    } else {
        num_results.min(scored.len())
    };
    if k < scored.len() {
        scored.select_nth_unstable_by(k.saturating_sub(1).min(scored.len().saturating_sub(1)), |a, b| {
            b.0.cmp(&a.0).then(a.1.cmp(&b.1))
        });
        scored.truncate(k);
    }
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let result = scored
        .into_iter()
        .map(|(score, idx)| (score, names[idx].clone()))
        .collect();
    diagnostics::add_phase_duration(Phase::Rank, rank_start.elapsed());

    Ok(result)
}

/// Convenience wrapper building a [`QueryPlan`] for `index`'s own
/// parameters and running `search` in one call.
pub fn search_str<L: IndexLayout>(
    index: &L,
    query: &[u8],
    threshold: f64,
    num_results: usize,
) -> Result<Vec<(u16, String)>, Error> {
    let plan = QueryPlan::new(query, index.term_size(), index.num_hashes(), index.canonicalize())?;
    search(index, &plan, threshold, num_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::classic::{build_classic_index, ClassicDocument};
    use crate::index::ClassicIndex;
    use crate::terms::SliceProducer;

    fn build_three_doc_index(dir: &std::path::Path) -> std::path::PathBuf {
        // Three documents of distinct base composition, term_size=4, num_hashes=3, p=0.1
        let a = "A".repeat(40);
        let b = "ACGT".repeat(10);
        let c = "G".repeat(40);
        let docs_data: Vec<&str> = vec![a.as_str(), b.as_str(), c.as_str()];
        let producers: Vec<SliceProducer> = docs_data
            .iter()
            .map(|d| SliceProducer::new(d.as_bytes()))
            .collect();
        let docs: Vec<ClassicDocument<SliceProducer>> = producers
            .iter()
            .enumerate()
            .map(|(i, p)| ClassicDocument {
                name: format!("doc{i}"),
                producer: p,
            })
            .collect();
        let path = dir.join("three_docs.cobs_classic");
        build_classic_index(&docs, 4, 3, 0.1, true, &path).unwrap();
        path
    }

    #[test]
    fn query_acgt_scores_matching_document_highest() {
        let dir = tempfile::tempdir().unwrap();
        let path = build_three_doc_index(dir.path());
        let index = ClassicIndex::open(&path).unwrap();

        let results = search_str(&index, b"ACGT", 0.0, 0).unwrap();
        let scores: std::collections::HashMap<String, u16> = results.into_iter().map(|(s, n)| (n, s)).collect();

        assert!(scores["doc1"] >= 1);
        assert!(scores["doc1"] >= scores["doc0"]);
        assert!(scores["doc1"] >= scores["doc2"]);
    }

    #[test]
    fn query_shorter_than_term_size_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = build_three_doc_index(dir.path());
        let index = ClassicIndex::open(&path).unwrap();

        let err = search_str(&index, b"AC", 0.0, 0).unwrap_err();
        assert!(matches!(err, Error::QueryTooShort { .. }));
    }

    #[test]
    fn score_never_exceeds_number_of_query_terms() {
        let dir = tempfile::tempdir().unwrap();
        let path = build_three_doc_index(dir.path());
        let index = ClassicIndex::open(&path).unwrap();

        let query = b"ACGTACGTACGTACGT";
        let num_terms = query.len() - 4 + 1;
        let results = search_str(&index, query, 0.0, 0).unwrap();
        for (score, _) in results {
            assert!((score as usize) <= num_terms);
        }
    }

    #[test]
    fn results_are_sorted_by_descending_score_then_ascending_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = build_three_doc_index(dir.path());
        let index = ClassicIndex::open(&path).unwrap();

        let results = search_str(&index, b"ACGTACGT", 0.0, 0).unwrap();
        for pair in results.windows(2) {
            assert!(pair[0].0 >= pair[1].0);
        }
    }

    #[test]
    fn index_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = build_three_doc_index(dir.path());
        let index = ClassicIndex::open(&path).unwrap();

        let bad_plan = QueryPlan::new(b"ACGTA", 5, 3, true).unwrap();
        let err = search(&index, &bad_plan, 0.0, 0).unwrap_err();
        assert!(matches!(err, Error::IndexMismatch(_)));
    }

    #[test]
    fn non_acgt_letters_still_return_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = build_three_doc_index(dir.path());
        let index = ClassicIndex::open(&path).unwrap();

        // Non-ACGT letters are tolerated, not rejected.
        let results = search_str(&index, b"ACNT", 0.0, 0).unwrap();
        assert_eq!(results.len(), 3);
    }
}
