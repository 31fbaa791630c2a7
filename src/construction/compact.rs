//! Compact-index partitioning: documents are grouped by increasing
//! k-mer count into partitions of exactly `8 * page_size` documents (the
//! last partition may be short), each sized independently via
//! `signature_size` while sharing one page-aligned `row_size`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rayon::prelude::*;

use crate::construction::combine::Shard;
use crate::construction::signature::build_signature;
use crate::construction::transpose::transpose_signatures;
use crate::error::Error;
use crate::format::compact_index::{write_compact_header, CompactIndexHeader, PartitionParameters};
use crate::signature_size::calc_signature_size;
use crate::terms::TermProducer;

/// One document fed into compact-index construction: its name, term
/// producer, and precomputed term count (used to sort into partitions
/// and to size each partition's signature).
pub struct CompactDocument<'a, P: TermProducer> {
    pub name: String,
    pub producer: &'a P,
    pub num_terms: u64,
}

/// A fully built compact-index partition: a page-row-width shard plus
/// its own signature size.
pub struct CompactPartition {
    pub shard: Shard,
    pub page_size: usize,
}

/// Builds one compact-index partition from documents already narrowed
/// down to a single size class (at most `8 * page_size` documents).
pub fn build_partition<P: TermProducer>(
    docs: &[CompactDocument<'_, P>],
    term_size: usize,
    num_hashes: u32,
    false_positive_rate: f64,
    page_size: usize,
    canonicalize_terms: bool,
) -> Result<CompactPartition, Error> {
    if docs.is_empty() {
        return Err(Error::Internal("compact partition with no documents".into()));
    }
    if docs.len() > 8 * page_size {
        return Err(Error::Internal(format!(
            "partition has {} documents, exceeds 8 * page_size = {}",
            docs.len(),
            8 * page_size
        )));
    }

    let max_terms = docs.iter().map(|d| d.num_terms).max().unwrap_or(0).max(1);
    let signature_size = calc_signature_size(max_terms, num_hashes, false_positive_rate)?;

    let signatures: Result<Vec<Vec<u8>>, Error> = docs
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

    // Transpose to a row width of exactly `page_size` bytes: document
    // bit positions beyond the real document count stay zero (there is
    // no document there to contribute a set bit).
    let padded_count = 8 * page_size;
    let mut padded_signatures = signatures;
    padded_signatures.resize_with(padded_count, || vec![0u8; ((signature_size + 7) / 8) as usize]);
    let matrix = transpose_signatures(&padded_signatures, signature_size);

    let names: Vec<String> = docs.iter().map(|d| d.name.clone()).collect();
    let name_range = (
        names.first().cloned().unwrap_or_default(),
        names.last().cloned().unwrap_or_default(),
    );

    let shard = Shard {
        signature_size,
        num_hashes,
        term_size: term_size as u32,
        canonicalize: canonicalize_terms,
        row_bytes: page_size,
        data: matrix,
        names,
        name_range,
    };

    Ok(CompactPartition { shard, page_size })
}

/// Sorts documents by increasing term count and splits them into
/// partitions of at most `8 * page_size` documents each.
pub fn partition_by_size<'a, P: TermProducer>(
    mut docs: Vec<CompactDocument<'a, P>>,
    page_size: usize,
) -> Vec<Vec<CompactDocument<'a, P>>> {
    docs.sort_by_key(|d| d.num_terms);
    let chunk_size = 8 * page_size;
    let mut partitions = Vec::new();
    let mut remaining = docs.drain(..).collect::<Vec<_>>();
    while !remaining.is_empty() {
        let split_at = chunk_size.min(remaining.len());
        let rest = remaining.split_off(split_at);
        partitions.push(remaining);
        remaining = rest;
    }
    partitions
}

/// Builds a compact index over all `docs` and writes it to `path`: sorts
/// documents by term count, partitions them, builds each partition's
/// shard independently (in parallel), and concatenates the per-partition
/// matrices after a page-aligned header. Uses a temporary file plus
/// atomic rename so construction failure leaves no partial file.
pub fn build_compact_index<P: TermProducer + Sync>(
    docs: Vec<CompactDocument<'_, P>>,
    term_size: usize,
    num_hashes: u32,
    false_positive_rate: f64,
    page_size: usize,
    canonicalize_terms: bool,
    path: &Path,
) -> Result<(), Error> {
    if docs.is_empty() {
        return Err(Error::Internal("cannot build an index over zero documents".into()));
    }
    let partition_docs = partition_by_size(docs, page_size);

    let partitions: Result<Vec<CompactPartition>, Error> = partition_docs
        .par_iter()
        .map(|docs| {
            build_partition(
                docs,
                term_size,
                num_hashes,
                false_positive_rate,
                page_size,
                canonicalize_terms,
            )
        })
        .collect();
    let partitions = partitions?;

    let mut file_names = Vec::new();
    let mut partition_params = Vec::new();
    for p in &partitions {
        file_names.extend(p.shard.names.iter().cloned());
        partition_params.push(PartitionParameters {
            signature_size: p.shard.signature_size,
            num_hashes: p.shard.num_hashes as u64,
        });
    }

    let header = CompactIndexHeader {
        term_size: term_size as u32,
        canonicalize: canonicalize_terms,
        page_size: page_size as u64,
        partitions: partition_params,
        file_names,
    };

    let tmp_path = path.with_extension("tmp");
    {
        let file = File::create(&tmp_path).map_err(|e| Error::io(&tmp_path, e))?;
        let mut writer = BufWriter::new(file);
        write_compact_header(&mut writer, &header)?;
        for p in &partitions {
            writer
                .write_all(&p.shard.data)
                .map_err(|e| Error::io(&tmp_path, e))?;
        }
        writer.flush().map_err(|e| Error::io(&tmp_path, e))?;
    }
    std::fs::rename(&tmp_path, path).map_err(|e| Error::io(path, e))?;
    Ok(())
}
