//! The seeded k-mer hash shared, bit-for-bit, between construction and
//! query. Both sides must agree exactly, so this is the only place
//! either one is allowed to call into `xxhash-rust`.

use smallvec::SmallVec;
use xxhash_rust::xxh64::xxh64;

/// `xxh64(kmer_bytes, seed)`, the single hash primitive the rest of the
/// crate builds on. A pure function of its arguments: no hidden state.
#[inline]
pub fn hash_kmer(kmer: &[u8], seed: u64) -> u64 {
    xxh64(kmer, seed)
}

/// The row index a given seed maps `kmer` to, for a signature of size
/// `signature_size`.
#[inline]
pub fn row_index(kmer: &[u8], seed: u64, signature_size: u64) -> u64 {
    hash_kmer(kmer, seed) % signature_size
}

/// Computes all `num_hashes` row indices for `kmer`. Inlined storage
/// covers the common `num_hashes <= 8` case without heap allocation.
pub fn row_indices(kmer: &[u8], num_hashes: u32, signature_size: u64) -> SmallVec<[u64; 8]> {
    (0..num_hashes as u64)
        .map(|seed| row_index(kmer, seed, signature_size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = hash_kmer(b"ACGTACGT", 3);
        let b = hash_kmer(b"ACGTACGT", 3);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let a = hash_kmer(b"ACGTACGT", 0);
        let b = hash_kmer(b"ACGTACGT", 1);
        assert_ne!(a, b);
    }

    #[test]
    fn row_indices_are_reduced_modulo_signature_size() {
        let m = 101u64;
        for idx in row_indices(b"GATTACAGATTACA", 5, m) {
            assert!(idx < m);
        }
    }
}
