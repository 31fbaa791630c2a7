//! Classic index construction: one shared `signature_size` across all
//! documents, built by batching documents, transposing each batch into
//! a shard, and hierarchically combining the shards into one matrix.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rayon::prelude::*;

use crate::construction::combine::{combine_all, Shard};
use crate::construction::signature::build_signature;
use crate::construction::transpose::transpose_signatures;
use crate::error::Error;
use crate::format::classic_index::{write_classic_header, ClassicIndexHeader};
use crate::signature_size::calc_signature_size;
use crate::terms::{count_terms, TermProducer};

/// Default number of documents per construction batch. Chosen so a
/// batch's per-document signatures and transposed shard comfortably fit
/// in cache while still giving `rayon` enough row-parallel work per
/// batch; callers needing a different memory/parallelism trade-off can
/// call `build_classic_shard` directly. Must stay a multiple of 8 (see
/// `build_classic_shard`'s `batch_size` contract).
pub const DEFAULT_BATCH_SIZE: usize = 1024;

pub struct ClassicDocument<'a, P: TermProducer> {
    pub name: String,
    pub producer: &'a P,
}

/// Builds a classic index in memory from documents and their term
/// producers, returning the final shard and header (with
/// `file_names` filled in but `row_size` implicit in the shard).
///
/// `batch_size` must be a multiple of 8: `docs.chunks(batch_size)`
/// gives every batch but the last exactly `batch_size` documents, and
/// `combine_shards` concatenates each batch's transposed row bytes
/// back to back. A non-final batch whose document count isn't a
/// multiple of 8 would leave unused high bits in its last row byte,
/// shifting every document in a later batch off its dense bit index —
/// silently wrong scores at query time. Only the last (possibly short)
/// batch is exempt, since nothing follows it in the combined matrix.
pub fn build_classic_shard<P: TermProducer + Sync>(
    docs: &[ClassicDocument<'_, P>],
    term_size: usize,
    num_hashes: u32,
    false_positive_rate: f64,
    canonicalize_terms: bool,
    batch_size: usize,
) -> Result<Shard, Error> {
    if docs.is_empty() {
        return Err(Error::Internal("cannot build an index over zero documents".into()));
    }
    if batch_size == 0 || batch_size % 8 != 0 {
        return Err(Error::OutOfRange(format!(
            "batch_size must be a positive multiple of 8 to keep non-final batches byte-aligned, got {batch_size}"
        )));
    }

    let term_counts: Result<Vec<u64>, Error> = docs
        .par_iter()
        .map(|d| count_terms(d.producer, term_size))
        .collect();
    let term_counts = term_counts?;
    let max_terms = term_counts.iter().copied().max().unwrap_or(0).max(1);
    let signature_size = calc_signature_size(max_terms, num_hashes, false_positive_rate)?;

    let batches: Vec<&[ClassicDocument<'_, P>]> = docs.chunks(batch_size).collect();

    let shards: Result<Vec<Shard>, Error> = batches
        .par_iter()
        .map(|batch| {
            let signatures: Result<Vec<Vec<u8>>, Error> = batch
                .iter()
                .map(|doc| {
                    build_signature(
                        doc.producer,
                        term_size,
                        num_hashes,
                        signature_size,
                        canonicalize_terms,
                    )
                })
                .collect();
            let signatures = signatures?;
            let matrix = transpose_signatures(&signatures, signature_size);
            let names: Vec<String> = batch.iter().map(|d| d.name.clone()).collect();
            let name_range = (
                names.first().cloned().unwrap_or_default(),
                names.last().cloned().unwrap_or_default(),
            );
            Ok(Shard {
                signature_size,
                num_hashes,
                term_size: term_size as u32,
                canonicalize: canonicalize_terms,
                row_bytes: (batch.len() + 7) / 8,
                data: matrix,
                names,
                name_range,
            })
        })
        .collect();

    combine_all(shards?)
}

/// Builds a classic index and writes it to `path`, using a temporary
/// file plus atomic rename so a failure during construction leaves no
/// partial file behind.
pub fn build_classic_index<P: TermProducer + Sync>(
    docs: &[ClassicDocument<'_, P>],
    term_size: usize,
    num_hashes: u32,
    false_positive_rate: f64,
    canonicalize_terms: bool,
    path: &Path,
) -> Result<(), Error> {
    let shard = build_classic_shard(
        docs,
        term_size,
        num_hashes,
        false_positive_rate,
        canonicalize_terms,
        DEFAULT_BATCH_SIZE,
    )?;

    let tmp_path = path.with_extension("tmp");
    {
        let file = File::create(&tmp_path).map_err(|e| Error::io(&tmp_path, e))?;
        let mut writer = BufWriter::new(file);
        let header = ClassicIndexHeader {
            term_size: shard.term_size,
            canonicalize: shard.canonicalize,
            signature_size: shard.signature_size,
            num_hashes: shard.num_hashes as u64,
            file_names: shard.names.clone(),
        };
        write_classic_header(&mut writer, &header)?;
        writer.write_all(&shard.data).map_err(|e| Error::io(&tmp_path, e))?;
        writer.flush().map_err(|e| Error::io(&tmp_path, e))?;
    }
    std::fs::rename(&tmp_path, path).map_err(|e| Error::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::SliceProducer;

    #[test]
    fn build_classic_shard_yields_one_row_per_signature_bit() {
        // 10 documents with batch_size=8 exercises two batches (8, then 2)
        // through combine_shards; only the trailing short batch is exempt
        // from the multiple-of-8 alignment rule.
        let docs_data: Vec<Vec<u8>> = (0..10).map(|i| format!("ACGT{}", "A".repeat(i)).into_bytes()).collect();
        let producers: Vec<SliceProducer> = docs_data.iter().map(|d| SliceProducer::new(d)).collect();
        let docs: Vec<ClassicDocument<SliceProducer>> = producers
            .iter()
            .enumerate()
            .map(|(i, p)| ClassicDocument {
                name: format!("doc{i}"),
                producer: p,
            })
            .collect();
        let shard = build_classic_shard(&docs, 4, 3, 0.1, true, 8).unwrap();
        assert_eq!(shard.names.len(), 10);
        assert_eq!(shard.data.len(), shard.signature_size as usize * shard.row_bytes);
    }

    #[test]
    fn build_classic_shard_rejects_batch_size_not_a_multiple_of_eight() {
        let docs_data: Vec<&[u8]> = vec![b"AAAAAAAA", b"ACGTACGT", b"GGGGGGGG"];
        let producers: Vec<SliceProducer> = docs_data.iter().map(|d| SliceProducer::new(d)).collect();
        let docs: Vec<ClassicDocument<SliceProducer>> = producers
            .iter()
            .enumerate()
            .map(|(i, p)| ClassicDocument {
                name: format!("doc{i}"),
                producer: p,
            })
            .collect();
        assert!(build_classic_shard(&docs, 4, 3, 0.1, true, 2).is_err());
        assert!(build_classic_shard(&docs, 4, 3, 0.1, true, 0).is_err());
    }
}
