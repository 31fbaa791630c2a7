//! Classic index file:
//! `u32 term_size || u8 canonicalize || u32 file_names_size || u64
//! signature_size || u64 num_hashes || file_names || raw_matrix`.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::header::{read_header, read_names, write_header, write_name, CLASSIC_INDEX_MAGIC};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicIndexHeader {
    pub term_size: u32,
    pub canonicalize: bool,
    pub signature_size: u64,
    pub num_hashes: u64,
    pub file_names: Vec<String>,
}

impl ClassicIndexHeader {
    pub fn row_size(&self) -> usize {
        (self.file_names.len() + 7) / 8
    }
}

fn io(e: std::io::Error) -> Error {
    Error::io("<stream>", e)
}

/// Writes the header only; the caller appends `raw_matrix` afterward.
pub fn write_classic_header<W: Write>(w: &mut W, header: &ClassicIndexHeader) -> Result<(), Error> {
    write_header(w, CLASSIC_INDEX_MAGIC, |w| {
        w.write_u32::<LittleEndian>(header.term_size).map_err(io)?;
        w.write_u8(header.canonicalize as u8).map_err(io)?;
        w.write_u32::<LittleEndian>(header.file_names.len() as u32)
            .map_err(io)?;
        w.write_u64::<LittleEndian>(header.signature_size).map_err(io)?;
        w.write_u64::<LittleEndian>(header.num_hashes).map_err(io)?;
        for name in &header.file_names {
            write_name(w, name)?;
        }
        Ok(())
    })
}

pub fn read_classic_header<R: Read>(r: &mut R) -> Result<ClassicIndexHeader, Error> {
    read_header(r, CLASSIC_INDEX_MAGIC, |r| {
        let term_size = r.read_u32::<LittleEndian>().map_err(io)?;
        let canonicalize = r.read_u8().map_err(io)? != 0;
        let file_names_size = r.read_u32::<LittleEndian>().map_err(io)? as usize;
        let signature_size = r.read_u64::<LittleEndian>().map_err(io)?;
        let num_hashes = r.read_u64::<LittleEndian>().map_err(io)?;
        let file_names = read_names(r, file_names_size)?;
        Ok(ClassicIndexHeader {
            term_size,
            canonicalize,
            signature_size,
            num_hashes,
            file_names,
        })
    })
}
