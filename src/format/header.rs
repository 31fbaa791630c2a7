//! The common framing shared by every artifact kind:
//! `outer_magic || u32 version || payload || inner_magic`.
//!
//! Mirrors `cobs/file/header.hpp`'s `header<T>::serialize`/`deserialize`:
//! the inner magic word is written immediately after the type-specific
//! payload and marks the end of the header block. Any data region that
//! follows (padding, a raw bit matrix) is appended by the caller once
//! framing is complete, not by this module.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::Error;

pub const OUTER_MAGIC: &[u8; 6] = b"INSIIN";
pub const CURRENT_VERSION: u32 = 1;

pub const DOCUMENT_MAGIC: &[u8; 8] = b"DOCUMENT";
pub const CLASSIC_INDEX_MAGIC: &[u8; 13] = b"CLASSIC_INDEX";
pub const COMPACT_INDEX_MAGIC: &[u8; 13] = b"COMPACT_INDEX";

/// Writes `outer_magic || version`, then lets `write_payload` emit the
/// type-specific fields, then writes `inner_magic`.
pub fn write_header<W, F>(w: &mut W, inner_magic: &[u8], write_payload: F) -> Result<(), Error>
where
    W: Write,
    F: FnOnce(&mut W) -> Result<(), Error>,
{
    w.write_all(OUTER_MAGIC).map_err(wrap_io)?;
    w.write_u32::<LittleEndian>(CURRENT_VERSION).map_err(wrap_io)?;
    write_payload(w)?;
    w.write_all(inner_magic).map_err(wrap_io)?;
    Ok(())
}

/// Reads and validates `outer_magic || version`, then lets
/// `read_payload` consume the type-specific fields, then reads and
/// validates `inner_magic`.
pub fn read_header<R, T, F>(r: &mut R, inner_magic: &[u8], read_payload: F) -> Result<T, Error>
where
    R: Read,
    F: FnOnce(&mut R) -> Result<T, Error>,
{
    let mut magic = [0u8; 6];
    r.read_exact(&mut magic).map_err(wrap_io)?;
    if &magic != OUTER_MAGIC {
        return Err(Error::InvalidFormat(format!(
            "missing or wrong outer magic word, expected {:?}",
            OUTER_MAGIC
        )));
    }
    let version = r.read_u32::<LittleEndian>().map_err(wrap_io)?;
    if version != CURRENT_VERSION {
        return Err(Error::UnsupportedVersion {
            found: version,
            expected: CURRENT_VERSION,
        });
    }
    let payload = read_payload(r)?;
    let mut inner = vec![0u8; inner_magic.len()];
    r.read_exact(&mut inner).map_err(wrap_io)?;
    if inner != inner_magic {
        return Err(Error::InvalidFormat(format!(
            "wrong inner magic word, expected {:?}, got {:?}",
            inner_magic, inner
        )));
    }
    Ok(payload)
}

fn wrap_io(e: std::io::Error) -> Error {
    Error::io("<in-memory or stream>", e)
}

/// Writes a name terminated by `\n`. Construction rejects names
/// containing an embedded newline, since that would make the name list
/// unparseable.
pub fn write_name<W: Write>(w: &mut W, name: &str) -> Result<(), Error> {
    if name.contains('\n') {
        return Err(Error::InvalidFormat(format!(
            "document name {name:?} contains an embedded newline"
        )));
    }
    w.write_all(name.as_bytes()).map_err(wrap_io)?;
    w.write_all(b"\n").map_err(wrap_io)?;
    Ok(())
}

/// Reads a single `\n`-terminated name.
pub fn read_name<R: Read>(r: &mut R) -> Result<String, Error> {
    let mut bytes = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        r.read_exact(&mut byte).map_err(wrap_io)?;
        if byte[0] == b'\n' {
            break;
        }
        bytes.push(byte[0]);
    }
    String::from_utf8(bytes).map_err(|e| Error::InvalidFormat(format!("name is not valid UTF-8: {e}")))
}

/// Reads `count` newline-terminated names packed back to back.
pub fn read_names<R: Read>(r: &mut R, count: usize) -> Result<Vec<String>, Error> {
    (0..count).map(|_| read_name(r)).collect()
}
