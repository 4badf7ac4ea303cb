//! Token streams: the [`IntStream`] a parser reads.
//!
//! [`BufferedTokenStream`] keeps every token it has pulled from its
//! [`TokenSource`] and can optionally present only the tokens of one channel
//! to the parser. [`UnbufferedTokenStream`] keeps a sliding window, the same
//! way [`UnbufferedCharStream`](crate::UnbufferedCharStream) does for
//! characters.

use alloc::string::String;

use crate::{
    error::StreamError,
    int_stream::IntStream,
    interval::Interval,
    token::{Token, TokenSource},
};

mod buffered;
mod unbuffered;

#[cfg(test)]
mod tests;

pub use buffered::BufferedTokenStream;
pub use unbuffered::UnbufferedTokenStream;

/// An [`IntStream`] of tokens. `la(i)` is the type of `lt(i)`.
pub trait TokenStream: IntStream {
    /// Token type held by the stream.
    type Tok: Token;
    /// Where the tokens come from.
    type Source: TokenSource<Token = Self::Tok>;

    /// Token `k` positions ahead (`k > 0`) or behind (`k < 0`) the cursor.
    ///
    /// Looking past the end yields the EOF token. `lt(0)` and lookbehind
    /// before the first token yield `None`.
    ///
    /// # Errors
    ///
    /// Failures of the token source while fetching, and lookbehind the
    /// stream no longer retains.
    fn lt(&mut self, k: isize) -> Result<Option<&Self::Tok>, StreamError>;

    /// Token at absolute index `index`. Does not fetch.
    ///
    /// # Errors
    ///
    /// [`StreamError::IndexOutOfBounds`] for tokens that are not (or no
    /// longer) buffered.
    fn get(&self, index: usize) -> Result<&Self::Tok, StreamError>;

    /// Concatenated text of the tokens in `interval`, fetching as needed.
    /// The EOF token contributes nothing.
    ///
    /// # Errors
    ///
    /// Streams that drop tokens fail for ranges they no longer hold.
    fn text_in(&mut self, interval: Interval) -> Result<String, StreamError>;

    /// The token source.
    fn token_source(&self) -> &Self::Source;
}

#[allow(clippy::cast_possible_wrap)]
pub(crate) fn signed(index: usize) -> isize {
    index as isize
}
