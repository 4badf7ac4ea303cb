//! Character streams.
//!
//! Two families are provided. Buffered streams ([`Utf16CharStream`],
//! [`CodePointCharStream`]) read their whole input up front and give
//! unrestricted lookahead and text extraction. [`UnbufferedCharStream`] keeps
//! a sliding window over an upstream [`CharSource`] and only retains what a
//! held mark still needs.
//!
//! The free functions in this module are the usual way to build a
//! [`CodePointCharStream`]: they pick the narrowest storage width that can
//! hold the input.

use alloc::{rc::Rc, string::String};
use core::cell::RefCell;

use bstr::ByteSlice;

use crate::{error::StreamError, int_stream::IntStream, interval::Interval};

mod code_point;
mod source;
mod unbuffered;
mod utf16;


pub use code_point::{CodePointBuffer, CodePointBufferBuilder, CodePointCharStream, StorageWidth};
#[cfg(feature = "std")]
pub use source::Utf8Reader;
pub use source::{CharSource, Utf16Units};
pub use unbuffered::UnbufferedCharStream;
pub use utf16::Utf16CharStream;

/// An [`IntStream`] over characters that can also hand back text.
pub trait CharStream: IntStream {
    /// Returns the text covered by `interval`, in absolute indices.
    ///
    /// # Errors
    ///
    /// Windowed streams fail for ranges they no longer retain.
    fn text(&self, interval: Interval) -> Result<String, StreamError>;
}

/// Shared handle to a character stream, as held by tokens for lazy text.
pub type CharStreamRef = Rc<RefCell<dyn CharStream>>;

/// Default read size used by the reader-based constructors here.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Builds a stream over `s`.
#[must_use]
pub fn from_str(s: &str) -> CodePointCharStream {
    let mut builder = CodePointBuffer::builder(s.len());
    builder.append_str(s);
    CodePointCharStream::from_buffer(builder.build())
}

/// Builds a stream over `s` reporting `source_name`.
#[must_use]
pub fn from_str_named(s: &str, source_name: &str) -> CodePointCharStream {
    from_str(s).with_name(source_name)
}

/// Builds a stream over UTF-16 code units.
///
/// Surrogate pairs are combined; unpaired surrogates are kept as-is.
#[must_use]
pub fn from_utf16(units: &[u16]) -> CodePointCharStream {
    let mut builder = CodePointBuffer::builder(units.len());
    builder.append_utf16(units);
    CodePointCharStream::from_buffer(builder.build())
}

/// Builds a stream over UTF-8 bytes, replacing malformed sequences with
/// U+FFFD.
#[must_use]
pub fn from_bytes(bytes: &[u8]) -> CodePointCharStream {
    from_str(&bytes.to_str_lossy())
}

/// Like [`from_bytes`], reporting `source_name`.
#[must_use]
pub fn from_bytes_named(bytes: &[u8], source_name: &str) -> CodePointCharStream {
    from_bytes(bytes).with_name(source_name)
}

/// Reads `reader` to the end as UTF-8 and builds a stream over the result.
///
/// # Errors
///
/// Propagates read failures as [`StreamError::Io`].
#[cfg(feature = "std")]
pub fn from_reader<R: std::io::Read>(reader: R) -> Result<CodePointCharStream, StreamError> {
    let bytes = read_all(reader, DEFAULT_BUFFER_SIZE)?;
    Ok(from_bytes(&bytes))
}

/// Like [`from_reader`], reporting `source_name`.
///
/// # Errors
///
/// Propagates read failures as [`StreamError::Io`].
#[cfg(feature = "std")]
pub fn from_reader_named<R: std::io::Read>(
    reader: R,
    source_name: &str,
) -> Result<CodePointCharStream, StreamError> {
    Ok(from_reader(reader)?.with_name(source_name))
}

/// Drains `reader` in `chunk_size` reads.
#[cfg(feature = "std")]
pub(crate) fn read_all<R: std::io::Read>(
    mut reader: R,
    chunk_size: usize,
) -> Result<alloc::vec::Vec<u8>, StreamError> {
    let mut bytes = alloc::vec::Vec::with_capacity(chunk_size);
    let mut chunk = alloc::vec![0u8; chunk_size.max(1)];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => return Ok(bytes),
            Ok(read) => bytes.extend_from_slice(&chunk[..read]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
}
