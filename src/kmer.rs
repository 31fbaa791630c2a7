//! K-mer packing, reverse complement, and canonicalization.
//!
//! A k-mer is treated as a byte slice over the alphabet `{A, C, G, T}`
//! ("pure"). Bytes outside that alphabet are tolerated ("impure") and
//! still hashed; their relative order for canonicalization purposes is
//! simply their own byte value, so every k-mer has a well-defined
//! canonical form regardless of alphabet purity.

/// Maximum k-mer length representable in the packed 2-bit encoding.
pub const MAX_PACKED_LEN: usize = 32;

/// Returns the complementary base for `A`, `C`, `G`, `T`; any other byte
/// is returned unchanged (there is no defined pairing for it).
#[inline]
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        other => other,
    }
}

/// Builds the reverse complement of `kmer`, always materializing a new
/// buffer.
pub fn reverse_complement(kmer: &[u8]) -> Vec<u8> {
    kmer.iter().rev().map(|&b| complement(b)).collect()
}

/// Compares `kmer` against its own reverse complement without
/// materializing the complement, short-circuiting at the first pair of
/// bytes (one from each end) that differ. Returns `true` when `kmer` is
/// already its own canonical (lexicographically smaller-or-equal) form.
///
/// Mirrors the two-pointer trick in the original C++ `canonicalize_kmer`:
/// comparing `kmer[i]` against `complement(kmer[len - 1 - i])` for
/// increasing `i` is equivalent to comparing `kmer` against
/// `reverse_complement(kmer)` byte by byte, without allocating.
pub fn is_forward_canonical(kmer: &[u8]) -> bool {
    let len = kmer.len();
    for i in 0..len {
        let fwd = kmer[i];
        let rc = complement(kmer[len - 1 - i]);
        if fwd != rc {
            return fwd < rc;
        }
    }
    true
}

/// Returns the canonical form of `kmer`: the lexicographic minimum of
/// the k-mer and its reverse complement. Avoids allocating when the
/// forward form already wins.
pub fn canonicalize(kmer: &[u8]) -> Vec<u8> {
    if is_forward_canonical(kmer) {
        kmer.to_vec()
    } else {
        reverse_complement(kmer)
    }
}

/// True if every byte of `kmer` is one of `A`, `C`, `G`, `T`.
pub fn is_pure(kmer: &[u8]) -> bool {
    kmer.iter().all(|&b| matches!(b, b'A' | b'C' | b'G' | b'T'))
}

#[inline]
fn base_code(base: u8) -> u64 {
    match base {
        b'A' => 0,
        b'C' => 1,
        b'G' => 2,
        b'T' => 3,
        _ => unreachable!("base_code called on impure byte"),
    }
}

#[inline]
fn code_base(code: u64) -> u8 {
    match code & 0b11 {
        0 => b'A',
        1 => b'C',
        2 => b'G',
        _ => b'T',
    }
}

/// Packs a pure k-mer of length `<= MAX_PACKED_LEN` into a 2-bit-per-base
/// `u64`, most-significant base first. Returns `None` for impure k-mers
/// or lengths beyond the packed width.
pub fn pack_2bit(kmer: &[u8]) -> Option<u64> {
    if kmer.is_empty() || kmer.len() > MAX_PACKED_LEN || !is_pure(kmer) {
        return None;
    }
    let mut code = 0u64;
    for &b in kmer {
        code = (code << 2) | base_code(b);
    }
    Some(code)
}

/// Inverse of [`pack_2bit`]: unpacks `len` bases from `code`.
pub fn unpack_2bit(code: u64, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    let mut c = code;
    for i in (0..len).rev() {
        out[i] = code_base(c);
        c >>= 2;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trips_for_pure_kmers() {
        for s in ["ACGT", "A", "TTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTT", "GATTACA"] {
            let packed = pack_2bit(s.as_bytes()).expect("pure k-mer should pack");
            let unpacked = unpack_2bit(packed, s.len());
            assert_eq!(unpacked, s.as_bytes());
        }
    }

    #[test]
    fn impure_kmers_do_not_pack() {
        assert_eq!(pack_2bit(b"ACGN"), None);
        assert_eq!(pack_2bit(b""), None);
    }

    #[test]
    fn reverse_complement_is_involutive() {
        let k = b"ACGTACGTGGT";
        assert_eq!(reverse_complement(&reverse_complement(k)), k);
    }

    #[test]
    fn canonicalize_matches_min_of_forward_and_reverse_complement() {
        let k = b"TGGAAAGTCTTTTACGCTGGGGTAAGAGTGA";
        let rc = reverse_complement(k);
        let expected = if k.as_slice() <= rc.as_slice() {
            k.to_vec()
        } else {
            rc
        };
        assert_eq!(canonicalize(k), expected);
    }

    #[test]
    fn canonicalize_known_example() {
        let k = b"TGGAAAGTCTTTTACGCTGGGGTAAGAGTGA";
        let expected = b"TCACTCTTACCCCAGCGTAAAAGACTTTCCA";
        assert_eq!(canonicalize(k), expected);
    }

    #[test]
    fn canonicalize_fixed_point_example() {
        let k = b"AGGAAAGTCTTTTACGCTGGGGTAAGAGTGA";
        assert_eq!(canonicalize(k), k);
    }

    #[test]
    fn is_forward_canonical_agrees_with_full_comparison() {
        let cases: &[&[u8]] = &[b"ACGT", b"TTTT", b"GATTACA", b"ACGTN", b"NNNNACGT"];
        for k in cases {
            let rc = reverse_complement(k);
            assert_eq!(is_forward_canonical(k), k <= &rc.as_slice());
        }
    }

    #[test]
    fn impure_bytes_are_tolerated_and_still_canonicalize() {
        let k = b"ACGN";
        let canon = canonicalize(k);
        assert!(canon == k.to_vec() || canon == reverse_complement(k));
    }
}
