//! The capability set shared by both index layouts, expressed as a
//! trait so the query engine's hot fetch path is generic (and
//! inlinable) rather than dispatched through a vtable. The enum-based
//! dispatch (`SearchIndex`) lives one level up, at `search()`'s own
//! boundary.

/// A read-side index layout: something that can answer "give me the row
/// for hash `h`" along with the header fields the query engine needs.
pub trait IndexLayout {
    /// Width, in bytes, of the row `read_row_into` writes.
    fn row_size(&self) -> usize;
    fn num_hashes(&self) -> u32;
    fn term_size(&self) -> u32;
    fn canonicalize(&self) -> bool;
    fn file_names(&self) -> &[String];
    /// Writes the row for hash `h` into `out` (`out.len() ==
    /// row_size()`).
    fn read_row_into(&self, h: u64, out: &mut [u8]);
}
