//! Memory-mapped read side of the classic index: one shared
//! `signature_size`, `read_row(h)` at offset `(h mod signature_size) *
//! row_size`.

use std::fs::File;
use std::path::Path;

use memmap2::{Advice, Mmap, MmapOptions};

use crate::error::Error;
use crate::format::classic_index::{read_classic_header, ClassicIndexHeader};
use crate::index::layout::IndexLayout;

pub struct ClassicIndex {
    header: ClassicIndexHeader,
    mmap: Mmap,
    data_offset: usize,
}

impl ClassicIndex {
    pub fn open(path: &Path) -> Result<ClassicIndex, Error> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut reader = std::io::BufReader::new(&file);
        let header = read_classic_header(&mut reader)?;
        let data_offset = header_byte_len(&header);

        let mmap = unsafe { MmapOptions::new().map(&file).map_err(|e| Error::io(path, e))? };
        let _ = mmap.advise(Advice::Random);

        let expected_len = data_offset + header.signature_size as usize * header.row_size();
        if mmap.len() < expected_len {
            return Err(Error::InvalidFormat(format!(
                "classic index file is truncated: expected at least {expected_len} bytes, found {}",
                mmap.len()
            )));
        }

        Ok(ClassicIndex {
            header,
            mmap,
            data_offset,
        })
    }

    pub fn signature_size(&self) -> u64 {
        self.header.signature_size
    }
}

/// Reconstructs the header's serialized byte length so the data region
/// can be located without re-reading the file. Mirrors
/// `write_classic_header` field-for-field.
fn header_byte_len(header: &ClassicIndexHeader) -> usize {
    let mut len = 6 + 4; // outer magic + version
    len += 4 + 1 + 4 + 8 + 8; // term_size, canonicalize, file_names_size, signature_size, num_hashes
    len += header.file_names.iter().map(|n| n.len() + 1).sum::<usize>();
    len += 13; // "CLASSIC_INDEX"
    len
}

impl IndexLayout for ClassicIndex {
    fn row_size(&self) -> usize {
        self.header.row_size()
    }

    fn num_hashes(&self) -> u32 {
        self.header.num_hashes as u32
    }

    fn term_size(&self) -> u32 {
        self.header.term_size
    }

    fn canonicalize(&self) -> bool {
        self.header.canonicalize
    }

    fn file_names(&self) -> &[String] {
        &self.header.file_names
    }

    fn read_row_into(&self, h: u64, out: &mut [u8]) {
        let row_size = self.row_size();
        let row_index = (h % self.header.signature_size) as usize;
        let offset = self.data_offset + row_index * row_size;
        out.copy_from_slice(&self.mmap[offset..offset + row_size]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::classic::{build_classic_index, ClassicDocument};
    use crate::terms::SliceProducer;

    #[test]
    fn open_reads_back_rows_matching_construction() {
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

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classic.cobs_classic");
        build_classic_index(&docs, 4, 3, 0.1, true, &path).unwrap();

        let index = ClassicIndex::open(&path).unwrap();
        assert_eq!(index.file_names(), &["doc0", "doc1", "doc2"]);
        assert_eq!(index.num_hashes(), 3);

        let mut row = vec![0u8; index.row_size()];
        index.read_row_into(0, &mut row);
        assert_eq!(row.len(), index.row_size());
    }
}
