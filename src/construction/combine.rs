//! Hierarchical combine: pairwise, row-concatenating merge of shards
//! until one remains.

use rayon::prelude::*;

use crate::error::Error;

/// An in-memory bit-sliced shard together with the header fields that
/// travel with it until it becomes (or is folded into) a terminal index.
///
/// Intermediate shards are a construction-internal artifact; the wire
/// format defines on-disk layouts only for per-document signatures
/// and the two terminal index kinds, so shards here stay in memory
/// across a construction run rather than being persisted as their own
/// file kind.
#[derive(Debug, Clone)]
pub struct Shard {
    pub signature_size: u64,
    pub num_hashes: u32,
    pub term_size: u32,
    pub canonicalize: bool,
    pub row_bytes: usize,
    pub data: Vec<u8>,
    pub names: Vec<String>,
    /// Deterministic, inspectable name recording the first and last
    /// document name folded into this shard.
    pub name_range: (String, String),
}

impl Shard {
    pub fn single(
        name: String,
        signature: Vec<u8>,
        signature_size: u64,
        num_hashes: u32,
        term_size: u32,
        canonicalize: bool,
    ) -> Shard {
        Shard {
            signature_size,
            num_hashes,
            term_size,
            canonicalize,
            row_bytes: 1,
            data: signature,
            name_range: (name.clone(), name.clone()),
            names: vec![name],
        }
    }

    pub fn num_docs(&self) -> usize {
        self.names.len()
    }
}

/// Concatenates the rows of `a` and `b` byte-wise: `new_row[h] = a[h] ++
/// b[h]`. Document name lists concatenate in the same order. Fails with
/// `Error::Internal` if the two shards disagree on row count or hashing
/// parameters.
pub fn combine_shards(a: &Shard, b: &Shard) -> Result<Shard, Error> {
    if a.signature_size != b.signature_size {
        return Err(Error::Internal(format!(
            "cannot combine shards with different signature sizes: {} vs {}",
            a.signature_size, b.signature_size
        )));
    }
    if a.num_hashes != b.num_hashes || a.term_size != b.term_size || a.canonicalize != b.canonicalize {
        return Err(Error::Internal(
            "cannot combine shards built with different hashing parameters".into(),
        ));
    }

    let row_bytes = a.row_bytes + b.row_bytes;
    let num_rows = a.signature_size as usize;
    let mut data = vec![0u8; num_rows * row_bytes];

    data.par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(h, row)| {
            let a_row = &a.data[h * a.row_bytes..(h + 1) * a.row_bytes];
            let b_row = &b.data[h * b.row_bytes..(h + 1) * b.row_bytes];
            row[..a.row_bytes].copy_from_slice(a_row);
            row[a.row_bytes..].copy_from_slice(b_row);
        });

    let mut names = a.names.clone();
    names.extend(b.names.iter().cloned());
    let name_range = (a.name_range.0.clone(), b.name_range.1.clone());

    Ok(Shard {
        signature_size: a.signature_size,
        num_hashes: a.num_hashes,
        term_size: a.term_size,
        canonicalize: a.canonicalize,
        row_bytes,
        data,
        names,
        name_range,
    })
}

/// Hierarchical pairwise combine of a list of shards (assumed sorted by
/// name range) into a single shard. Each level combines independent
/// pairs in parallel; an odd shard out carries forward unchanged.
pub fn combine_all(mut shards: Vec<Shard>) -> Result<Shard, Error> {
    if shards.is_empty() {
        return Err(Error::Internal("combine_all called with no shards".into()));
    }
    while shards.len() > 1 {
        let next: Result<Vec<Shard>, Error> = shards
            .par_chunks(2)
            .map(|pair| match pair {
                [a, b] => combine_shards(a, b),
                [a] => Ok(a.clone()),
                _ => unreachable!(),
            })
            .collect();
        shards = next?;
    }
    Ok(shards.into_iter().next().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shard_with(names: &[&str], row_bytes: usize, fill: u8) -> Shard {
        let signature_size = 8u64;
        let data = vec![fill; signature_size as usize * row_bytes];
        Shard {
            signature_size,
            num_hashes: 3,
            term_size: 4,
            canonicalize: true,
            row_bytes,
            data,
            names: names.iter().map(|s| s.to_string()).collect(),
            name_range: (names[0].to_string(), names[names.len() - 1].to_string()),
        }
    }

    #[test]
    fn combine_concatenates_rows_and_names() {
        let a = shard_with(&["alpha"], 1, 0b0000_0001);
        let b = shard_with(&["beta"], 1, 0b0000_0010);
        let combined = combine_shards(&a, &b).unwrap();
        assert_eq!(combined.names, vec!["alpha".to_string(), "beta".to_string()]);
        assert_eq!(combined.row_bytes, 2);
        for h in 0..combined.signature_size as usize {
            let row = &combined.data[h * 2..h * 2 + 2];
            assert_eq!(row, &[0b0000_0001, 0b0000_0010]);
        }
    }

    #[test]
    fn combine_rejects_mismatched_signature_size() {
        let a = shard_with(&["a"], 1, 0);
        let mut b = shard_with(&["b"], 1, 0);
        b.signature_size = 16;
        assert!(combine_shards(&a, &b).is_err());
    }

    #[test]
    fn combine_all_reduces_to_one_shard_preserving_order() {
        let shards: Vec<Shard> = ["d0", "d1", "d2", "d3", "d4"]
            .iter()
            .enumerate()
            .map(|(i, name)| shard_with(&[name], 1, i as u8))
            .collect();
        let combined = combine_all(shards).unwrap();
        assert_eq!(
            combined.names,
            vec!["d0", "d1", "d2", "d3", "d4"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
        assert_eq!(combined.row_bytes, 5);
    }
}
