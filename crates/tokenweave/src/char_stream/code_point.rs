//! Code-point storage with a width picked from the content.
//!
//! Most inputs are ASCII or Latin-1 and fit one byte per character; inputs
//! with BMP characters need two; only inputs with supplementary characters
//! pay for four. The [`CodePointBufferBuilder`] starts narrow and widens in
//! place the first time a wider unit shows up:
//!
//! ```text
//!   Byte ──(unit > 0xFF, not a high surrogate)──▶ Char
//!   Byte ──(high surrogate)─────────────────────▶ Int
//!   Char ──(high surrogate)─────────────────────▶ Int
//! ```
//!
//! In `Int` mode surrogate pairs are combined into one code point. A high
//! surrogate that is not followed by a low one is stored on its own, as is a
//! lone low surrogate; neither is an error here.

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

/// Width of the elements backing a [`CodePointBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StorageWidth {
    /// One byte per code point (U+0000 to U+00FF).
    Byte,
    /// Two bytes per code point (the BMP).
    Char,
    /// Four bytes per code point.
    Int,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Storage {
    Latin1(Vec<u8>),
    Bmp(Vec<u16>),
    Wide(Vec<u32>),
}

impl Storage {
    fn width(&self) -> StorageWidth {
        match self {
            Storage::Latin1(_) => StorageWidth::Byte,
            Storage::Bmp(_) => StorageWidth::Char,
            Storage::Wide(_) => StorageWidth::Int,
        }
    }

    fn len(&self) -> usize {
        match self {
            Storage::Latin1(v) => v.len(),
            Storage::Bmp(v) => v.len(),
            Storage::Wide(v) => v.len(),
        }
    }

    fn widen(self, width: StorageWidth) -> Storage {
        match (self, width) {
            (Storage::Latin1(bytes), StorageWidth::Char) => {
                Storage::Bmp(bytes.into_iter().map(u16::from).collect())
            }
            (Storage::Latin1(bytes), StorageWidth::Int) => {
                Storage::Wide(bytes.into_iter().map(u32::from).collect())
            }
            (Storage::Bmp(chars), StorageWidth::Int) => {
                Storage::Wide(chars.into_iter().map(u32::from).collect())
            }
            (storage, _) => storage,
        }
    }
}

#[inline]
fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

#[inline]
fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Immutable code points in the narrowest width that fits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePointBuffer {
    storage: Storage,
}

impl CodePointBuffer {
    /// Starts a builder with room for `capacity` code points.
    #[must_use]
    pub fn builder(capacity: usize) -> CodePointBufferBuilder {
        CodePointBufferBuilder {
            storage: Storage::Latin1(Vec::with_capacity(capacity)),
            prev_high_surrogate: None,
        }
    }

    /// Number of stored code points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element width chosen for the content.
    #[must_use]
    pub fn width(&self) -> StorageWidth {
        self.storage.width()
    }

    /// The code point at `offset`.
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<u32> {
        match &self.storage {
            Storage::Latin1(v) => v.get(offset).copied().map(u32::from),
            Storage::Bmp(v) => v.get(offset).copied().map(u32::from),
            Storage::Wide(v) => v.get(offset).copied(),
        }
    }

    /// Renders `len` code points starting at `start`.
    ///
    /// Unpaired surrogates become U+FFFD.
    fn render(&self, start: usize, len: usize) -> String {
        let end = start + len;
        match &self.storage {
            Storage::Latin1(v) => v[start..end].iter().copied().map(char::from).collect(),
            Storage::Bmp(v) => String::from_utf16_lossy(&v[start..end]),
            Storage::Wide(v) => v[start..end]
                .iter()
                .map(|&cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect(),
        }
    }
}

/// Accumulates UTF-16 units or text into a [`CodePointBuffer`].
#[derive(Debug)]
pub struct CodePointBufferBuilder {
    storage: Storage,
    prev_high_surrogate: Option<u16>,
}

impl CodePointBufferBuilder {
    /// Width the builder currently stores in.
    #[must_use]
    pub fn width(&self) -> StorageWidth {
        self.storage.width()
    }

    fn widen(&mut self, width: StorageWidth) {
        let storage = core::mem::replace(&mut self.storage, Storage::Latin1(Vec::new()));
        self.storage = storage.widen(width);
    }

    /// Appends UTF-16 code units.
    ///
    /// A high surrogate left unpaired at the end of `units` is stored as-is;
    /// pairs are not joined across calls.
    pub fn append_utf16(&mut self, units: &[u16]) {
        for &unit in units {
            let needed = match self.storage {
                Storage::Latin1(_) if unit > 0xFF => Some(if is_high_surrogate(unit) {
                    StorageWidth::Int
                } else {
                    StorageWidth::Char
                }),
                Storage::Bmp(_) if is_high_surrogate(unit) => Some(StorageWidth::Int),
                _ => None,
            };
            if let Some(width) = needed {
                self.widen(width);
            }
            match &mut self.storage {
                Storage::Latin1(bytes) => bytes.extend(u8::try_from(unit).ok()),
                Storage::Bmp(chars) => chars.push(unit),
                Storage::Wide(ints) => push_wide(ints, &mut self.prev_high_surrogate, unit),
            }
        }
        if let (Storage::Wide(ints), Some(high)) =
            (&mut self.storage, self.prev_high_surrogate.take())
        {
            ints.push(u32::from(high));
        }
    }

    /// Appends the characters of `s`.
    pub fn append_str(&mut self, s: &str) {
        for c in s.chars() {
            self.push_char(c);
        }
    }

    /// Appends a single character.
    pub fn push_char(&mut self, c: char) {
        let cp = u32::from(c);
        let needed = if cp > 0xFFFF {
            StorageWidth::Int
        } else if cp > 0xFF {
            StorageWidth::Char
        } else {
            StorageWidth::Byte
        };
        if needed > self.storage.width() {
            self.widen(needed);
        }
        match &mut self.storage {
            Storage::Latin1(bytes) => bytes.extend(u8::try_from(cp).ok()),
            Storage::Bmp(chars) => chars.extend(u16::try_from(cp).ok()),
            Storage::Wide(ints) => ints.push(cp),
        }
    }

    /// Finishes the buffer.
    #[must_use]
    pub fn build(self) -> CodePointBuffer {
        CodePointBuffer {
            storage: self.storage,
        }
    }
}

fn push_wide(ints: &mut Vec<u32>, pending: &mut Option<u16>, unit: u16) {
    if let Some(high) = pending.take() {
        if is_low_surrogate(unit) {
            let cp = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00);
            ints.push(cp);
            return;
        }
        ints.push(u32::from(high));
    }
    if is_high_surrogate(unit) {
        *pending = Some(unit);
    } else {
        ints.push(u32::from(unit));
    }
}

/// A fully buffered stream whose positions count Unicode code points.
#[derive(Debug, Clone)]
pub struct CodePointCharStream {
    buffer: CodePointBuffer,
    position: usize,
    name: Option<String>,
}

impl CodePointCharStream {
    /// Wraps a finished buffer, positioned at its start.
    #[must_use]
    pub fn from_buffer(buffer: CodePointBuffer) -> Self {
        CodePointCharStream {
            buffer,
            position: 0,
            name: None,
        }
    }

    /// Buffers the code points of `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        super::from_str(input)
    }

    /// Sets the name reported by [`IntStream::source_name`].
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Storage width picked for the input.
    #[must_use]
    pub fn width(&self) -> StorageWidth {
        self.buffer.width()
    }

    /// Rewinds to the first code point.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    #[allow(clippy::cast_possible_wrap)]
    fn symbol_at(&self, offset: usize) -> i32 {
        self.buffer.get(offset).map_or(EOF, |cp| cp as i32)
    }
}

impl IntStream for CodePointCharStream {
    fn consume(&mut self) -> Result<(), StreamError> {
        if self.position >= self.buffer.len() {
            return Err(StreamError::ConsumeEof);
        }
        self.position += 1;
        Ok(())
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn la(&mut self, i: isize) -> Result<i32, StreamError> {
        let offset = match i.signum() {
            0 => return Ok(0),
            -1 => self.position as isize + i,
            _ => self.position as isize + i - 1,
        };
        if offset < 0 {
            return Ok(EOF);
        }
        Ok(self.symbol_at(offset as usize))
    }

    fn mark(&mut self) -> isize {
        -1
    }

    fn release(&mut self, _marker: isize) -> Result<(), StreamError> {
        Ok(())
    }

    fn index(&self) -> usize {
        self.position
    }

    fn seek(&mut self, index: isize) -> Result<(), StreamError> {
        let index = usize::try_from(index).map_err(|_| StreamError::NegativeSeek(index))?;
        self.position = index.min(self.buffer.len());
        Ok(())
    }

    fn size(&self) -> Result<usize, StreamError> {
        Ok(self.buffer.len())
    }

    fn source_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_SOURCE_NAME)
    }
}

impl CharStream for CodePointCharStream {
    #[allow(clippy::cast_sign_loss)]
    fn text(&self, interval: Interval) -> Result<String, StreamError> {
        if interval.a() < 0 {
            return Err(StreamError::InvalidInterval(interval));
        }
        let size = self.buffer.len();
        let start = (interval.a() as usize).min(size);
        let len = interval.length().min(size - start);
        Ok(self.buffer.render(start, len))
    }
}
