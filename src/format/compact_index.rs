//! Compact index file:
//! `u32 term_size || u8 canonicalize || u32 num_partitions || u32
//! file_names_size || u64 page_size || per-partition (signature_size,
//! num_hashes) || file_names || zero-padding || per-partition
//! raw_matrix`.
//!
//! Per `cobs/file/header.hpp`, the inner magic word is written
//! immediately after the header's own fields (ending at `file_names`);
//! the zero-padding and the raw per-partition matrices come after it.
//! The padding is sized so that the absolute file offset right after it
//! — where the first partition's data region begins — is a multiple of
//! `page_size`, counting from the end of the inner magic word.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::header::{
    read_header, read_names, write_header, write_name, COMPACT_INDEX_MAGIC, OUTER_MAGIC,
};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionParameters {
    pub signature_size: u64,
    pub num_hashes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactIndexHeader {
    pub term_size: u32,
    pub canonicalize: bool,
    pub page_size: u64,
    pub partitions: Vec<PartitionParameters>,
    pub file_names: Vec<String>,
}

impl CompactIndexHeader {
    pub fn row_size(&self) -> usize {
        self.partitions.len() * self.page_size as usize
    }

    /// Absolute byte length of the header block, from the start of the
    /// file through the inner magic word (exclusive of any padding).
    fn header_len_through_inner_magic(&self) -> usize {
        let mut len = OUTER_MAGIC.len() + 4; // outer magic + version
        len += 4 + 1 + 4 + 4 + 8; // term_size, canonicalize, num_partitions, file_names_size, page_size
        len += self.partitions.len() * (8 + 8);
        len += self.file_names.iter().map(|n| n.len() + 1).sum::<usize>();
        len += COMPACT_INDEX_MAGIC.len();
        len
    }

    /// Zero-padding length needed after the inner magic so the first
    /// partition's data region starts at a file offset that is a
    /// multiple of `page_size`.
    pub fn padding_len(&self) -> usize {
        let page_size = self.page_size as usize;
        if page_size == 0 {
            return 0;
        }
        let offset = self.header_len_through_inner_magic();
        (page_size - offset % page_size) % page_size
    }
}

fn io(e: std::io::Error) -> Error {
    Error::io("<stream>", e)
}

/// Writes the header block (through the inner magic) and the
/// page-alignment padding that follows it. The caller appends the
/// per-partition raw matrices afterward.
pub fn write_compact_header<W: Write>(w: &mut W, header: &CompactIndexHeader) -> Result<(), Error> {
    write_header(w, COMPACT_INDEX_MAGIC, |w| {
        w.write_u32::<LittleEndian>(header.term_size).map_err(io)?;
        w.write_u8(header.canonicalize as u8).map_err(io)?;
        w.write_u32::<LittleEndian>(header.partitions.len() as u32)
            .map_err(io)?;
        w.write_u32::<LittleEndian>(header.file_names.len() as u32)
            .map_err(io)?;
        w.write_u64::<LittleEndian>(header.page_size).map_err(io)?;
        for p in &header.partitions {
            w.write_u64::<LittleEndian>(p.signature_size).map_err(io)?;
            w.write_u64::<LittleEndian>(p.num_hashes).map_err(io)?;
        }
        for name in &header.file_names {
            write_name(w, name)?;
        }
        Ok(())
    })?;
    let padding = vec![0u8; header.padding_len()];
    w.write_all(&padding).map_err(io)?;
    Ok(())
}

/// Reads the header and consumes the trailing padding, leaving the
/// stream positioned at the start of the first partition's data region.
pub fn read_compact_header<R: Read>(r: &mut R) -> Result<CompactIndexHeader, Error> {
    let header = read_compact_header_only(r)?;
    let mut padding = vec![0u8; header.padding_len()];
    r.read_exact(&mut padding).map_err(io)?;
    Ok(header)
}

fn read_compact_header_only<R: Read>(r: &mut R) -> Result<CompactIndexHeader, Error> {
    let header = read_header(r, COMPACT_INDEX_MAGIC, |r| {
        let term_size = r.read_u32::<LittleEndian>().map_err(io)?;
        let canonicalize = r.read_u8().map_err(io)? != 0;
        let num_partitions = r.read_u32::<LittleEndian>().map_err(io)? as usize;
        let file_names_size = r.read_u32::<LittleEndian>().map_err(io)? as usize;
        let page_size = r.read_u64::<LittleEndian>().map_err(io)?;
        let mut partitions = Vec::with_capacity(num_partitions);
        for _ in 0..num_partitions {
            let signature_size = r.read_u64::<LittleEndian>().map_err(io)?;
            let num_hashes = r.read_u64::<LittleEndian>().map_err(io)?;
            partitions.push(PartitionParameters {
                signature_size,
                num_hashes,
            });
        }
        let file_names = read_names(r, file_names_size)?;
        Ok(CompactIndexHeader {
            term_size,
            canonicalize,
            page_size,
            partitions,
            file_names,
        })
    })?;
    Ok(header)
}
