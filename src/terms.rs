//! The term producer contract: a uniform iterator over a document's
//! fixed-length terms. Parsers for named bio formats (FASTA, FASTQ,
//! Cortex) are external collaborators that implement this trait; the
//! crate ships one trivial producer, `SliceProducer`, over a raw byte
//! slice.

use crate::error::Error;

/// Produces each `term_size`-length term of a document, in document
/// order, exactly once. The callback receives a borrowed slice valid
/// only for the duration of the call.
pub trait TermProducer {
    fn process_terms<F: FnMut(&[u8])>(&self, term_size: usize, callback: F) -> Result<(), Error>;
}

/// Windows a raw byte slice into overlapping terms of length
/// `term_size`. A document shorter than `term_size` simply yields no
/// terms; that is not an error (only a *query* shorter than the term
/// size is rejected, in `query::QueryPlan`).
pub struct SliceProducer<'a> {
    data: &'a [u8],
}

impl<'a> SliceProducer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        SliceProducer { data }
    }
}

impl<'a> TermProducer for SliceProducer<'a> {
    fn process_terms<F: FnMut(&[u8])>(&self, term_size: usize, mut callback: F) -> Result<(), Error> {
        if term_size == 0 {
            return Err(Error::OutOfRange("term_size must be positive".into()));
        }
        if self.data.len() < term_size {
            return Ok(());
        }
        for window in self.data.windows(term_size) {
            callback(window);
        }
        Ok(())
    }
}

/// Counts the terms a producer would yield, without retaining them.
/// Used by construction to determine a document's k-mer count before
/// sizing a signature.
pub fn count_terms<P: TermProducer>(producer: &P, term_size: usize) -> Result<u64, Error> {
    let mut count = 0u64;
    producer.process_terms(term_size, |_| count += 1)?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_producer_yields_overlapping_windows() {
        let producer = SliceProducer::new(b"ACGTACGT");
        let mut terms = Vec::new();
        producer
            .process_terms(4, |t| terms.push(t.to_vec()))
            .unwrap();
        assert_eq!(
            terms,
            vec![
                b"ACGT".to_vec(),
                b"CGTA".to_vec(),
                b"GTAC".to_vec(),
                b"TACG".to_vec(),
                b"ACGT".to_vec(),
            ]
        );
    }

    #[test]
    fn short_document_yields_no_terms() {
        let producer = SliceProducer::new(b"AC");
        let mut count = 0;
        producer.process_terms(4, |_| count += 1).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn count_terms_matches_callback_count() {
        let producer = SliceProducer::new(b"ACGTACGTACGT");
        assert_eq!(count_terms(&producer, 4).unwrap(), 9);
    }
}
