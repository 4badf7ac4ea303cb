use crate::error::StreamError;

/// Upstream of an [`UnbufferedCharStream`](super::UnbufferedCharStream).
///
/// Each call yields either one UTF-16 code unit or one whole code point
/// above U+FFFF. The stream pairs surrogates itself and rejects malformed
/// sequences.
pub trait CharSource {
    /// Next unit or code point, `None` at end of input.
    ///
    /// # Errors
    ///
    /// Whatever the underlying input reports.
    fn next_char(&mut self) -> Result<Option<u32>, StreamError>;
}

/// Adapts an iterator of UTF-16 code units, such as
/// [`str::encode_utf16`], into a [`CharSource`].
#[derive(Debug, Clone)]
pub struct Utf16Units<I> {
    units: I,
}

impl<I: Iterator<Item = u16>> Utf16Units<I> {
    /// Wraps `units`.
    pub fn new(units: impl IntoIterator<IntoIter = I>) -> Self {
        Utf16Units {
            units: units.into_iter(),
        }
    }
}

impl<I: Iterator<Item = u16>> CharSource for Utf16Units<I> {
    #[inline]
    fn next_char(&mut self) -> Result<Option<u32>, StreamError> {
        Ok(self.units.next().map(u32::from))
    }
}

/// Decodes UTF-8 from a reader one code point at a time.
///
/// Malformed sequences decode to U+FFFD, one per maximal invalid prefix.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct Utf8Reader<R> {
    reader: R,
    pending: alloc::vec::Vec<u8>,
    /// Bytes of `pending` already decoded.
    start: usize,
    chunk_size: usize,
    eof: bool,
}

#[cfg(feature = "std")]
impl<R: std::io::Read> Utf8Reader<R> {
    /// Wraps `reader`, reading `chunk_size` bytes at a time.
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Utf8Reader {
            reader,
            pending: alloc::vec::Vec::with_capacity(chunk_size),
            start: 0,
            chunk_size: chunk_size.max(4),
            eof: false,
        }
    }

    fn refill(&mut self) -> Result<(), StreamError> {
        self.pending.drain(..self.start);
        self.start = 0;
        let len = self.pending.len();
        self.pending.resize(len + self.chunk_size, 0);
        loop {
            match self.reader.read(&mut self.pending[len..]) {
                Ok(read) => {
                    self.pending.truncate(len + read);
                    self.eof = read == 0;
                    return Ok(());
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.pending.truncate(len);
                    return Err(e.into());
                }
            }
        }
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> CharSource for Utf8Reader<R> {
    fn next_char(&mut self) -> Result<Option<u32>, StreamError> {
        // A UTF-8 sequence is at most four bytes long.
        while self.pending.len() - self.start < 4 && !self.eof {
            self.refill()?;
        }
        let available = &self.pending[self.start..];
        if available.is_empty() {
            return Ok(None);
        }
        let (decoded, size) = bstr::decode_utf8(available);
        self.start += size.max(1);
        Ok(Some(
            decoded.map_or(u32::from(char::REPLACEMENT_CHARACTER), u32::from),
        ))
    }
}
