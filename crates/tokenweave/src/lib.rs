//! Runtime streams for generated lexers and parsers.
//!
//! The crate provides the plumbing a recognizer reads from:
//!
//! - character streams ([`CodePointCharStream`], [`Utf16CharStream`],
//!   [`UnbufferedCharStream`]) behind the [`CharStream`] trait,
//! - tokens ([`CommonToken`]) and the [`TokenSource`] / [`TokenFactory`]
//!   interfaces a lexer implements,
//! - token streams ([`BufferedTokenStream`], [`UnbufferedTokenStream`])
//!   behind the [`TokenStream`] trait,
//! - a [`TokenStreamRewriter`] that renders edited text without touching
//!   the tokens.
//!
//! Everything is single-threaded: tokens keep an `Rc` handle to their input
//! so that text can be read back lazily.
//!
//! ```rust
//! use tokenweave::{char_stream, CharStream, IntStream, Interval, EOF};
//!
//! let mut input = char_stream::from_str("let x");
//! assert_eq!(input.la(1)?, i32::from(b'l'));
//! input.consume()?;
//! input.seek(4)?;
//! assert_eq!(input.la(1)?, i32::from(b'x'));
//! assert_eq!(input.la(2)?, EOF);
//! assert_eq!(input.text(Interval::of(0, 2))?, "let");
//! # Ok::<(), tokenweave::StreamError>(())
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod error;
mod int_stream;
mod interval;
mod options;

pub mod char_stream;
pub mod misc;
pub mod rewriter;
pub mod token;
pub mod token_stream;

pub use char_stream::{
    CharSource, CharStream, CharStreamRef, CodePointBuffer, CodePointCharStream, UnbufferedCharStream,
    Utf16CharStream,
};
pub use error::{ErrorKind, StreamError, Utf16Error};
pub use int_stream::{EOF, IntStream, UNKNOWN_SOURCE_NAME};
pub use interval::{INTERVAL_POOL_MAX_VALUE, Interval};
pub use options::StreamOptions;
pub use rewriter::{DEFAULT_PROGRAM_NAME, RewriteError, RewriteOp, TokenAddress, TokenStreamRewriter};
pub use token::{
    CommonToken, CommonTokenFactory, ListTokenSource, Token, TokenFactory, TokenOrigin, TokenSource,
    WritableToken,
};
pub use token_stream::{BufferedTokenStream, TokenStream, UnbufferedTokenStream};
