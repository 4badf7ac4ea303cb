use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use super::CharStream;
use crate::{
    error::StreamError,
    int_stream::{EOF, IntStream, UNKNOWN_SOURCE_NAME},
    interval::Interval,
};

/// A fully buffered stream of UTF-16 code units.
///
/// Lookahead yields individual code units, so a supplementary character
/// occupies two positions. Use [`CodePointCharStream`](super::CodePointCharStream)
/// when positions should count code points.
#[derive(Debug, Clone)]
pub struct Utf16CharStream {
    data: Vec<u16>,
    /// Number of valid units in `data`.
    n: usize,
    /// Index of the unit `la(1)` returns.
    p: usize,
    name: Option<String>,
}

impl Utf16CharStream {
    /// Buffers the UTF-16 encoding of `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self::from_utf16(input.encode_utf16().collect())
    }

    /// Takes ownership of already-encoded code units.
    #[must_use]
    pub fn from_utf16(data: Vec<u16>) -> Self {
        let n = data.len();
        Utf16CharStream {
            data,
            n,
            p: 0,
            name: None,
        }
    }

    /// Reads `reader` to the end as UTF-8 using the default read sizes.
    ///
    /// # Errors
    ///
    /// Propagates read failures.
    #[cfg(feature = "std")]
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, StreamError> {
        Self::load(reader, crate::StreamOptions::default())
    }

    /// Reads `reader` to the end in `options.read_chunk_size` pieces.
    ///
    /// Malformed UTF-8 is replaced with U+FFFD. The stream length is exactly
    /// the number of code units decoded.
    ///
    /// # Errors
    ///
    /// Propagates read failures.
    #[cfg(feature = "std")]
    pub fn load<R: std::io::Read>(
        reader: R,
        options: crate::StreamOptions,
    ) -> Result<Self, StreamError> {
        use bstr::ByteSlice;

        let options = options.normalized();
        let bytes = super::read_all(reader, options.read_chunk_size)?;
        Ok(Self::from_utf16(bytes.to_str_lossy().encode_utf16().collect()))
    }

    /// Sets the name reported by [`IntStream::source_name`].
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Rewinds to the first unit.
    pub fn reset(&mut self) {
        self.p = 0;
    }
}

impl IntStream for Utf16CharStream {
    fn consume(&mut self) -> Result<(), StreamError> {
        if self.p >= self.n {
            return Err(StreamError::ConsumeEof);
        }
        self.p += 1;
        Ok(())
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn la(&mut self, i: isize) -> Result<i32, StreamError> {
        if i == 0 {
            return Ok(0);
        }
        // la(-1) is the unit at p-1, la(1) the unit at p.
        let offset = if i < 0 { i } else { i - 1 };
        let index = self.p as isize + offset;
        if index < 0 || index as usize >= self.n {
            return Ok(EOF);
        }
        Ok(i32::from(self.data[index as usize]))
    }

    fn mark(&mut self) -> isize {
        -1
    }

    fn release(&mut self, _marker: isize) -> Result<(), StreamError> {
        Ok(())
    }

    fn index(&self) -> usize {
        self.p
    }

    fn seek(&mut self, index: isize) -> Result<(), StreamError> {
        let index = usize::try_from(index).map_err(|_| StreamError::NegativeSeek(index))?;
        if index <= self.p {
            self.p = index;
            return Ok(());
        }
        let target = index.min(self.n);
        while self.p < target {
            self.consume()?;
        }
        Ok(())
    }

    fn size(&self) -> Result<usize, StreamError> {
        Ok(self.n)
    }

    fn source_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_SOURCE_NAME)
    }
}

impl CharStream for Utf16CharStream {
    #[allow(clippy::cast_sign_loss)]
    fn text(&self, interval: Interval) -> Result<String, StreamError> {
        if interval.a() < 0 {
            return Err(StreamError::InvalidInterval(interval));
        }
        let start = interval.a() as usize;
        if start >= self.n || interval.b() < interval.a() {
            return Ok(String::new());
        }
        let stop = (interval.b() as usize).min(self.n - 1);
        Ok(String::from_utf16_lossy(&self.data[start..=stop]))
    }
}
