//! Per-document signature file: `u32 kmer_size || name || raw_bits`.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::header::{read_header, read_name, write_header, write_name, DOCUMENT_MAGIC};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    pub kmer_size: u32,
    pub name: String,
}

/// Writes a complete per-document signature file: header, name, and the
/// raw Bloom bits.
pub fn write_document<W: Write>(w: &mut W, header: &DocumentHeader, raw_bits: &[u8]) -> Result<(), Error> {
    write_header(w, DOCUMENT_MAGIC, |w| {
        w.write_u32::<LittleEndian>(header.kmer_size)
            .map_err(|e| Error::io("<stream>", e))?;
        write_name(w, &header.name)
    })?;
    w.write_all(raw_bits).map_err(|e| Error::io("<stream>", e))
}

/// Reads a document header; the caller is responsible for reading the
/// remaining raw bits (length depends on the signature size, which is
/// not stored in this file and must be supplied by the caller's index
/// context).
pub fn read_document_header<R: Read>(r: &mut R) -> Result<DocumentHeader, Error> {
    read_header(r, DOCUMENT_MAGIC, |r| {
        let kmer_size = r.read_u32::<LittleEndian>().map_err(|e| Error::io("<stream>", e))?;
        let name = read_name(r)?;
        Ok(DocumentHeader { kmer_size, name })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn document_round_trips() {
        let header = DocumentHeader {
            kmer_size: 31,
            name: "sample_1".to_string(),
        };
        let bits = vec![0xAB, 0xCD, 0xEF];
        let mut buf = Vec::new();
        write_document(&mut buf, &header, &bits).unwrap();

        let mut cursor = Cursor::new(buf);
        let read_back = read_document_header(&mut cursor).unwrap();
        assert_eq!(read_back, header);
        let mut remaining = Vec::new();
        cursor.read_to_end(&mut remaining).unwrap();
        assert_eq!(remaining, bits);
    }
}
