//! Per-document Bloom signature construction: fill a bit vector with the
//! hashes of every term a producer yields. Bit-exact with the hash used
//! at query time (`crate::hash`).

use crate::error::Error;
use crate::hash::row_index;
use crate::kmer::canonicalize;
use crate::terms::TermProducer;

/// Builds a `ceil(signature_size / 8)`-byte Bloom signature for one
/// document.
pub fn build_signature<P: TermProducer>(
    producer: &P,
    term_size: usize,
    num_hashes: u32,
    signature_size: u64,
    canonicalize_terms: bool,
) -> Result<Vec<u8>, Error> {
    let num_bytes = ((signature_size + 7) / 8) as usize;
    let mut bits = vec![0u8; num_bytes];
    let mut set_bit = |h: u64| {
        let byte = (h / 8) as usize;
        let bit = (h % 8) as u8;
        bits[byte] |= 1 << bit;
    };

    producer.process_terms(term_size, |term| {
        let canonical;
        let term = if canonicalize_terms {
            canonical = canonicalize(term);
            canonical.as_slice()
        } else {
            term
        };
        for seed in 0..num_hashes as u64 {
            set_bit(row_index(term, seed, signature_size));
        }
    })?;
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::row_indices;
    use crate::terms::SliceProducer;

    #[test]
    fn every_inserted_kmer_has_all_its_hash_bits_set() {
        let doc = b"ACGTACGTGGTTAACCGGTT";
        let term_size = 4;
        let num_hashes = 4;
        let signature_size = 503u64;
        let producer = SliceProducer::new(doc);
        let sig = build_signature(&producer, term_size, num_hashes, signature_size, true).unwrap();

        for window in doc.windows(term_size) {
            let canonical = canonicalize(window);
            for idx in row_indices(&canonical, num_hashes, signature_size) {
                let byte = (idx / 8) as usize;
                let bit = (idx % 8) as u8;
                assert_ne!(sig[byte] & (1 << bit), 0, "bit {idx} should be set");
            }
        }
    }

    #[test]
    fn signature_length_matches_ceil_bits_to_bytes() {
        let producer = SliceProducer::new(b"ACGT");
        let sig = build_signature(&producer, 4, 3, 17, true).unwrap();
        assert_eq!(sig.len(), 3); // ceil(17/8) == 3
    }
}
