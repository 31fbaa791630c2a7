//! An independently built Bloom signature's empirical false-positive
//! rate matches its calibrated target within tolerance.

use rand::RngCore;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use cobs_index::construction::signature::build_signature;
use cobs_index::hash::row_indices;
use cobs_index::signature_size::calc_signature_size;
use cobs_index::terms::SliceProducer;

const TERM_SIZE: usize = 20;
const NUM_HASHES: u32 = 3;

fn random_term(rng: &mut ChaCha8Rng) -> [u8; TERM_SIZE] {
    const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];
    let mut buf = [0u8; TERM_SIZE];
    for b in buf.iter_mut() {
        *b = BASES[(rng.next_u32() % 4) as usize];
    }
    buf
}

fn bits_all_set(sig: &[u8], signature_size: u64, term: &[u8]) -> bool {
    row_indices(term, NUM_HASHES, signature_size)
        .iter()
        .all(|&idx| {
            let byte = (idx / 8) as usize;
            let bit = (idx % 8) as u8;
            sig[byte] & (1 << bit) != 0
        })
}

#[test]
fn empirical_false_positive_rate_matches_target_within_tolerance() {
    let false_positive_rate = 0.1;
    let n = 100_000u64;
    let signature_size = calc_signature_size(n, NUM_HASHES, false_positive_rate).unwrap();

    let mut insert_rng = ChaCha8Rng::seed_from_u64(1);
    let members: Vec<[u8; TERM_SIZE]> = (0..n).map(|_| random_term(&mut insert_rng)).collect();
    let joined: Vec<u8> = members.iter().flat_map(|m| m.iter().copied()).collect();
    let producer = SliceProducer::new(&joined);

    // `process_terms` on a contiguous buffer would re-window across
    // adjacent members; build the signature by hand instead, one
    // disjoint member at a time, via `build_signature` over a producer
    // that yields exactly the inserted terms (no canonicalization, so
    // the generated bases are taken as literal, not folded).
    let _ = producer; // see note above: not used directly.
    let num_bytes = ((signature_size + 7) / 8) as usize;
    let mut sig = vec![0u8; num_bytes];
    for term in &members {
        for idx in row_indices(term, NUM_HASHES, signature_size) {
            let byte = (idx / 8) as usize;
            let bit = (idx % 8) as u8;
            sig[byte] |= 1 << bit;
        }
    }

    let mut query_rng = ChaCha8Rng::seed_from_u64(2);
    let mut positives = 0u64;
    for _ in 0..n {
        let candidate = random_term(&mut query_rng);
        if bits_all_set(&sig, signature_size, &candidate) {
            positives += 1;
        }
    }

    assert!(
        (9_000..=11_000).contains(&positives),
        "expected ~10% false-positive rate over {n} trials, got {positives} positives"
    );
}

#[test]
fn build_signature_matches_hand_built_bit_set() {
    let doc = b"ACGTACGTGGTTAACCGGTTACGTACGTGGTT";
    let term_size = 6;
    let num_hashes = 3;
    let signature_size = 977u64;
    let producer = SliceProducer::new(doc);
    let sig = build_signature(&producer, term_size, num_hashes, signature_size, false).unwrap();

    for window in doc.windows(term_size) {
        assert!(bits_all_set(&sig, signature_size, window));
    }
}
