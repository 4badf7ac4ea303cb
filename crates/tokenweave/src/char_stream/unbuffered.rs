//! Sliding-window character stream.
//!
//! Only the characters the caller may still look at are kept:
//!
//! ```text
//!   absolute:   buffer_start                      buffer_start + n
//!                    │                                  │
//!   window:        [ c0  c1  c2  …  c(p)  …  c(n-1) ]   (c(n-1) may be EOF)
//!                                    ▲
//!                                    p  = next character (la(1))
//! ```
//!
//! With no marks held, consuming the last buffered character drops the whole
//! window. Holding a mark keeps everything from the mark onward; releasing
//! the outermost mark discards the prefix before `p`.

use alloc::{string::String, vec::Vec};

use log::trace;

use super::{CharSource, CharStream, Utf16Units};
use crate::{
    error::{StreamError, Utf16Error},
    int_stream::{EOF, IntStream, UNKNOWN_SOURCE_NAME, marker_for},
    interval::Interval,
    options::StreamOptions,
};

/// A character stream that buffers only what is needed.
///
/// Text can be retrieved with [`CharStream::text`] only while it is still in
/// the window; hold a [`mark`](IntStream::mark) across anything you will
/// want back. [`IntStream::size`] is not available.
#[derive(Debug)]
pub struct UnbufferedCharStream<S> {
    source: S,
    /// The window. `data.len()` is the number of valid entries.
    data: Vec<i32>,
    /// Index into `data` of the character `la(1)` returns.
    p: usize,
    num_markers: usize,
    /// `la(-1)`; `EOF` before the first consume.
    last_char: i32,
    /// `last_char` as of the moment the window was last reset or pinned.
    last_char_buffer_start: i32,
    /// Absolute index of `data[p]`.
    current_char_index: usize,
    name: Option<String>,
}

impl<'a> UnbufferedCharStream<Utf16Units<core::str::EncodeUtf16<'a>>> {
    /// Streams the characters of `input`.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches the other
    /// constructors.
    pub fn from_text(input: &'a str) -> Result<Self, StreamError> {
        Self::new(Utf16Units::new(input.encode_utf16()))
    }

    /// Streams the characters of `input` with custom sizing.
    ///
    /// # Errors
    ///
    /// See [`from_text`](Self::from_text).
    pub fn from_text_with_options(input: &'a str, options: StreamOptions) -> Result<Self, StreamError> {
        Self::with_options(Utf16Units::new(input.encode_utf16()), options)
    }
}

impl UnbufferedCharStream<Utf16Units<alloc::vec::IntoIter<u16>>> {
    /// Streams raw UTF-16 code units, which may be malformed.
    ///
    /// # Errors
    ///
    /// A malformed first character is reported here.
    pub fn from_utf16(units: Vec<u16>) -> Result<Self, StreamError> {
        Self::new(Utf16Units::new(units))
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> UnbufferedCharStream<super::Utf8Reader<R>> {
    /// Streams UTF-8 from `reader`.
    ///
    /// # Errors
    ///
    /// Propagates the first read failure.
    pub fn from_reader(reader: R) -> Result<Self, StreamError> {
        let options = StreamOptions::default();
        Self::with_options(
            super::Utf8Reader::new(reader, options.read_chunk_size),
            options,
        )
    }
}

impl<S: CharSource> UnbufferedCharStream<S> {
    /// Streams from `source` with the default window size.
    ///
    /// # Errors
    ///
    /// The window is primed with one character; failures doing so are
    /// returned.
    pub fn new(source: S) -> Result<Self, StreamError> {
        Self::with_options(source, StreamOptions::default())
    }

    /// Streams from `source` with custom sizing.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_options(source: S, options: StreamOptions) -> Result<Self, StreamError> {
        let mut stream = Self::empty(source, options);
        stream.fill(1)?;
        Ok(stream)
    }

    fn empty(source: S, options: StreamOptions) -> Self {
        UnbufferedCharStream {
            source,
            data: Vec::with_capacity(options.normalized().buffer_size),
            p: 0,
            num_markers: 0,
            last_char: EOF,
            last_char_buffer_start: EOF,
            current_char_index: 0,
            name: None,
        }
    }

    /// Sets the name reported by [`IntStream::source_name`].
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Absolute index of the first character still in the window.
    #[must_use]
    pub fn buffer_start_index(&self) -> usize {
        self.current_char_index - self.p
    }

    /// Makes sure `want` characters from `p` on are buffered, or EOF is.
    fn sync(&mut self, want: usize) -> Result<(), StreamError> {
        let need = (self.p + want).saturating_sub(self.data.len());
        if need > 0 {
            self.fill(need)?;
        }
        Ok(())
    }

    /// Appends up to `n` characters, stopping after EOF. Returns how many
    /// were added.
    fn fill(&mut self, n: usize) -> Result<usize, StreamError> {
        for added in 0..n {
            if self.data.last() == Some(&EOF) {
                return Ok(added);
            }
            let c = self.next_code_point()?;
            self.data.push(c);
        }
        Ok(n)
    }

    /// Reads one code point, pairing surrogates.
    #[allow(clippy::cast_possible_wrap)]
    fn next_code_point(&mut self) -> Result<i32, StreamError> {
        let Some(c) = self.source.next_char()? else {
            return Ok(EOF);
        };
        if (0xDC00..=0xDFFF).contains(&c) {
            return Err(Utf16Error::LoneLowSurrogate(c).into());
        }
        if !(0xD800..=0xDBFF).contains(&c) {
            return Ok(c as i32);
        }
        match self.source.next_char()? {
            None => Err(Utf16Error::DanglingAtEof(c).into()),
            Some(next) if next > 0xFFFF => {
                Err(Utf16Error::HighSurrogateBeforeWide { high: c, next }.into())
            }
            Some(next) if (0xDC00..=0xDFFF).contains(&next) => {
                Ok((0x10000 + ((c - 0xD800) << 10) + (next - 0xDC00)) as i32)
            }
            Some(next) => Err(Utf16Error::DanglingHighSurrogate { high: c, next }.into()),
        }
    }
}

impl<S: CharSource> IntStream for UnbufferedCharStream<S> {
    fn consume(&mut self) -> Result<(), StreamError> {
        if self.la(1)? == EOF {
            return Err(StreamError::ConsumeEof);
        }
        self.last_char = self.data[self.p];
        if self.p + 1 == self.data.len() && self.num_markers == 0 {
            trace!(
                "unbuffered char stream: dropping window of {} at index {}",
                self.data.len(),
                self.current_char_index
            );
            self.data.clear();
            self.p = 0;
            self.last_char_buffer_start = self.last_char;
        } else {
            self.p += 1;
        }
        self.current_char_index += 1;
        self.sync(1)
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn la(&mut self, i: isize) -> Result<i32, StreamError> {
        match i {
            -1 => return Ok(self.last_char),
            0 => return Ok(0),
            _ => {}
        }
        let index = if i > 0 {
            self.sync(i as usize)?;
            self.p as isize + i - 1
        } else {
            self.p as isize + i
        };
        if index < 0 {
            return Err(StreamError::IndexOutOfBounds {
                index,
                start: 0,
                stop: self.data.len() as isize - 1,
            });
        }
        Ok(self.data.get(index as usize).copied().unwrap_or(EOF))
    }

    fn mark(&mut self) -> isize {
        if self.num_markers == 0 {
            self.last_char_buffer_start = self.last_char;
        }
        self.num_markers += 1;
        marker_for(self.num_markers)
    }

    fn release(&mut self, marker: isize) -> Result<(), StreamError> {
        let expected = marker_for(self.num_markers);
        if self.num_markers == 0 || marker != expected {
            return Err(StreamError::InvalidMarker { marker, expected });
        }
        self.num_markers -= 1;
        if self.num_markers == 0 && self.p > 0 {
            trace!(
                "unbuffered char stream: compacting {} consumed characters",
                self.p
            );
            self.data.drain(..self.p);
            self.p = 0;
            self.last_char_buffer_start = self.last_char;
        }
        Ok(())
    }

    fn index(&self) -> usize {
        self.current_char_index
    }

    fn seek(&mut self, index: isize) -> Result<(), StreamError> {
        let mut index = usize::try_from(index).map_err(|_| StreamError::NegativeSeek(index))?;
        if index == self.current_char_index {
            return Ok(());
        }
        if index > self.current_char_index {
            self.sync(index - self.current_char_index)?;
            let last = (self.buffer_start_index() + self.data.len()).saturating_sub(1);
            index = index.min(last);
        }
        let start = self.buffer_start_index();
        let outside = StreamError::SeekOutsideBuffer {
            index,
            start,
            stop: start + self.data.len(),
        };
        let Some(i) = index.checked_sub(start) else {
            return Err(outside);
        };
        if i >= self.data.len() {
            return Err(outside);
        }
        self.p = i;
        self.current_char_index = index;
        self.last_char = if i == 0 {
            self.last_char_buffer_start
        } else {
            self.data[i - 1]
        };
        Ok(())
    }

    fn size(&self) -> Result<usize, StreamError> {
        Err(StreamError::UnknownSize)
    }

    fn source_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_SOURCE_NAME)
    }
}

impl<S: CharSource> CharStream for UnbufferedCharStream<S> {
    #[allow(clippy::cast_sign_loss)]
    fn text(&self, interval: Interval) -> Result<String, StreamError> {
        if interval.a() < 0 || interval.b() < interval.a() - 1 {
            return Err(StreamError::InvalidInterval(interval));
        }
        let start = self.buffer_start_index();
        let n = self.data.len();
        let a = interval.a() as usize;
        let end = a + interval.length();
        let outside = StreamError::IntervalOutsideBuffer {
            interval,
            start,
            stop: start + n,
        };
        if a < start {
            return Err(outside);
        }
        // The EOF slot has no text.
        if self.data.last() == Some(&EOF) && end > start + n - 1 {
            return Err(StreamError::InvalidInterval(interval));
        }
        if end > start + n {
            return Err(outside);
        }
        let offset = a - start;
        Ok(self.data[offset..end - start]
            .iter()
            .map(|&c| {
                u32::try_from(c)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
            })
            .collect())
    }
}
