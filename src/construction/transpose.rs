//! Transposition of a batch of per-document signatures into one
//! row-major bit-sliced shard: row `h`, bit `d`, equals bit `h` of
//! document `d`'s signature.
//!
//! Parallel over tiles of rows; within a tile, documents are visited
//! outer-most so each document's signature bytes backing that tile are
//! read once and scattered across the tile's rows, instead of being
//! re-read once per row.

use rayon::prelude::*;

/// Rows per parallel tile. Chosen so a tile spans a whole number of
/// signature bytes (`TILE_ROWS / 8`) while staying small enough to keep
/// each document's slice of the tile in cache.
const TILE_ROWS: usize = 512;

/// Transposes `signatures` (each `ceil(signature_size / 8)` bytes) into
/// a `signature_size`-row, `ceil(signatures.len() / 8)`-byte-wide matrix.
pub fn transpose_signatures(signatures: &[Vec<u8>], signature_size: u64) -> Vec<u8> {
    let num_docs = signatures.len();
    let row_bytes = (num_docs + 7) / 8;
    let num_rows = signature_size as usize;
    let mut shard = vec![0u8; num_rows * row_bytes];

    shard
        .par_chunks_mut(TILE_ROWS * row_bytes)
        .enumerate()
        .for_each(|(tile_idx, tile)| {
            let tile_row_start = tile_idx * TILE_ROWS;
            let tile_rows = tile.len() / row_bytes;
            let sig_byte_start = tile_row_start / 8;

            for (doc_idx, sig) in signatures.iter().enumerate() {
                let doc_byte = doc_idx / 8;
                let doc_bit = doc_idx % 8;
                for local_row in 0..tile_rows {
                    let h = tile_row_start + local_row;
                    let sig_byte = sig_byte_start + local_row / 8;
                    if sig_byte >= sig.len() {
                        continue;
                    }
                    let bit_set = (sig[sig_byte] >> (h % 8)) & 1 == 1;
                    if bit_set {
                        tile[local_row * row_bytes + doc_byte] |= 1 << doc_bit;
                    }
                }
            }
        });

    shard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transposition_matches_direct_bit_lookup() {
        let signatures = vec![
            vec![0b1010_1010u8, 0b0000_0001],
            vec![0b0101_0101u8, 0b1000_0000],
            vec![0b1111_0000u8, 0b0000_1111],
        ];
        let signature_size = 16u64;
        let shard = transpose_signatures(&signatures, signature_size);
        let row_bytes = 1usize; // ceil(3/8) == 1

        for h in 0..signature_size as usize {
            for (d, sig) in signatures.iter().enumerate() {
                let sig_bit = (sig[h / 8] >> (h % 8)) & 1;
                let shard_bit = (shard[h * row_bytes] >> d) & 1;
                assert_eq!(
                    sig_bit, shard_bit,
                    "mismatch at row {h} doc {d}"
                );
            }
        }
    }

    #[test]
    fn transposition_handles_tile_boundaries() {
        let num_docs = 20usize;
        let signature_size = 1300u64; // spans more than two tiles
        let signatures: Vec<Vec<u8>> = (0..num_docs)
            .map(|d| {
                let num_bytes = ((signature_size + 7) / 8) as usize;
                (0..num_bytes)
                    .map(|b| ((b * 31 + d * 7) % 256) as u8)
                    .collect()
            })
            .collect();
        let shard = transpose_signatures(&signatures, signature_size);
        let row_bytes = (num_docs + 7) / 8;

        for h in (0..signature_size as usize).step_by(37) {
            for (d, sig) in signatures.iter().enumerate() {
                let sig_bit = (sig[h / 8] >> (h % 8)) & 1;
                let shard_bit = (shard[h * row_bytes + d / 8] >> (d % 8)) & 1;
                assert_eq!(sig_bit, shard_bit, "mismatch at row {h} doc {d}");
            }
        }
    }
}
