//! Read-side search files: memory-mapped readers abstracting the
//! classic vs. compact row layout behind one trait
//! ([`layout::IndexLayout`]), plus a tagged enum for callers that need
//! to open either kind without knowing which ahead of time.

pub mod classic;
pub mod compact;
pub mod layout;

use std::path::Path;

pub use classic::ClassicIndex;
pub use compact::CompactIndex;
pub use layout::IndexLayout;

use crate::error::Error;
use crate::format::header::{CLASSIC_INDEX_MAGIC, COMPACT_INDEX_MAGIC};

/// Either index layout, resolved at the query engine's outermost
/// dispatch boundary. The hot fetch path (`IndexLayout::read_row_into`)
/// stays generic and inlinable; this enum exists only here.
pub enum SearchIndex {
    Classic(ClassicIndex),
    Compact(CompactIndex),
}

impl SearchIndex {
    /// Opens `path`, sniffing the inner magic word to determine which
    /// layout to construct.
    pub fn open(path: &Path) -> Result<SearchIndex, Error> {
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        if contains_magic(&bytes, CLASSIC_INDEX_MAGIC) {
            Ok(SearchIndex::Classic(ClassicIndex::open(path)?))
        } else if contains_magic(&bytes, COMPACT_INDEX_MAGIC) {
            Ok(SearchIndex::Compact(CompactIndex::open(path)?))
        } else {
            Err(Error::InvalidFormat(
                "file does not contain a recognized classic or compact inner magic word".into(),
            ))
        }
    }
}

/// The inner magic word sits right after the fixed-size header fields
/// (term_size, canonicalize, counts...), so its position varies by file
/// kind; rather than re-deriving that offset here, sniff for the
/// pattern directly. Index headers are small, so this is cheap and only
/// runs once per open.
fn contains_magic(bytes: &[u8], magic: &[u8]) -> bool {
    bytes.windows(magic.len()).any(|w| w == magic)
}

impl IndexLayout for SearchIndex {
    fn row_size(&self) -> usize {
        match self {
            SearchIndex::Classic(i) => i.row_size(),
            SearchIndex::Compact(i) => i.row_size(),
        }
    }

    fn num_hashes(&self) -> u32 {
        match self {
            SearchIndex::Classic(i) => i.num_hashes(),
            SearchIndex::Compact(i) => i.num_hashes(),
        }
    }

    fn term_size(&self) -> u32 {
        match self {
            SearchIndex::Classic(i) => i.term_size(),
            SearchIndex::Compact(i) => i.term_size(),
        }
    }

    fn canonicalize(&self) -> bool {
        match self {
            SearchIndex::Classic(i) => i.canonicalize(),
            SearchIndex::Compact(i) => i.canonicalize(),
        }
    }

    fn file_names(&self) -> &[String] {
        match self {
            SearchIndex::Classic(i) => i.file_names(),
            SearchIndex::Compact(i) => i.file_names(),
        }
    }

    fn read_row_into(&self, h: u64, out: &mut [u8]) {
        match self {
            SearchIndex::Classic(i) => i.read_row_into(h, out),
            SearchIndex::Compact(i) => i.read_row_into(h, out),
        }
    }
}
