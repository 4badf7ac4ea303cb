use thiserror::Error;

use crate::interval::Interval;

/// Coarse classification of a [`StreamError`].
///
/// Misuse errors come from a bad call sequence, unsupported errors from the
/// stream variant that was chosen, and malformed-input errors from the data
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller broke the stream protocol.
    Misuse,
    /// The input could not be decoded.
    MalformedInput,
    /// The stream variant cannot provide the requested capability.
    Unsupported,
    /// The underlying reader failed.
    Io,
}

/// Error raised by character and token streams.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("cannot consume EOF")]
    ConsumeEof,
    #[error("release() called with an invalid marker {marker}, expected {expected}")]
    InvalidMarker { marker: isize, expected: isize },
    #[error("cannot seek to negative index {0}")]
    NegativeSeek(isize),
    #[error("invalid interval {0}")]
    InvalidInterval(Interval),
    #[error("index {index} out of range {start}..{stop}")]
    IndexOutOfBounds {
        index: isize,
        start: isize,
        stop: isize,
    },
    #[error("input stream is already mutably borrowed")]
    InputBorrowed,
    #[error("invalid UTF-16 ({0})")]
    MalformedUtf16(#[from] Utf16Error),
    #[error("unbuffered stream cannot know its size")]
    UnknownSize,
    #[error("seek to index {index} outside buffer {start}..{stop}")]
    SeekOutsideBuffer {
        index: usize,
        start: usize,
        stop: usize,
    },
    #[error("interval {interval} outside buffer {start}..{stop}")]
    IntervalOutsideBuffer {
        interval: Interval,
        start: usize,
        stop: usize,
    },
    #[cfg(feature = "std")]
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl StreamError {
    /// Returns the class this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            StreamError::ConsumeEof
            | StreamError::InvalidMarker { .. }
            | StreamError::NegativeSeek(_)
            | StreamError::InvalidInterval(_)
            | StreamError::IndexOutOfBounds { .. }
            | StreamError::InputBorrowed
            | StreamError::SeekOutsideBuffer { .. } => ErrorKind::Misuse,
            StreamError::MalformedUtf16(_) => ErrorKind::MalformedInput,
            StreamError::UnknownSize | StreamError::IntervalOutsideBuffer { .. } => {
                ErrorKind::Unsupported
            }
            #[cfg(feature = "std")]
            StreamError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Surrogate-pairing failures found while decoding UTF-16 input.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Utf16Error {
    #[error("low surrogate U+{0:04X} with no preceding high surrogate")]
    LoneLowSurrogate(u32),
    #[error("high surrogate U+{high:04X} followed by code point U+{next:X} > U+FFFF")]
    HighSurrogateBeforeWide { high: u32, next: u32 },
    #[error("dangling high surrogate U+{0:04X} at end of file")]
    DanglingAtEof(u32),
    #[error("dangling high surrogate U+{high:04X} followed by U+{next:04X}")]
    DanglingHighSurrogate { high: u32, next: u32 },
}
