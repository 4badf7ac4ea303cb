//! Lazy, transactional edits over a token stream.
//!
//! A [`TokenStreamRewriter`] records inserts, replaces and deletes as
//! operations in named programs. Nothing touches the token stream; each call
//! to one of the `text` methods reduces a copy of the program and renders
//! the tokens with the edits applied. Several programs can be kept over the
//! same tokens, and any of them rolled back to an earlier instruction.
//!
//! ```rust
//! use tokenweave::{BufferedTokenStream, CommonToken, ListTokenSource, TokenStreamRewriter};
//!
//! let tokens = ["a", "b", "c"]
//!     .into_iter()
//!     .map(|text| CommonToken::with_text(1, text))
//!     .collect();
//! let source: ListTokenSource = ListTokenSource::new(tokens);
//! let mut stream = BufferedTokenStream::new(source);
//! stream.fill()?;
//!
//! let mut rewriter = TokenStreamRewriter::new(stream);
//! rewriter.insert_before(0, "<")?;
//! rewriter.replace(1, 1, "B")?;
//! rewriter.insert_after(2, ">")?;
//! assert_eq!(rewriter.text()?, "<aBc>");
//! # Ok::<(), tokenweave::RewriteError>(())
//! ```

use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};

use log::debug;

use crate::{
    int_stream::IntStream,
    interval::Interval,
    token::{EOF, Token},
    token_stream::{TokenStream, signed},
};

mod error;
mod op;


pub use error::RewriteError;
pub use op::RewriteOp;

/// Name of the program used by the methods without an `_in` suffix.
pub const DEFAULT_PROGRAM_NAME: &str = "default";

/// Anything that names a token: an index or the token itself.
pub trait TokenAddress {
    /// The token index, possibly negative for tokens not in a stream.
    fn token_index(&self) -> isize;
}

impl TokenAddress for usize {
    fn token_index(&self) -> isize {
        isize::try_from(*self).unwrap_or(isize::MAX)
    }
}

impl TokenAddress for isize {
    fn token_index(&self) -> isize {
        *self
    }
}

impl TokenAddress for i32 {
    fn token_index(&self) -> isize {
        isize::try_from(*self).unwrap_or(isize::MAX)
    }
}

impl<T: Token + ?Sized> TokenAddress for &T {
    fn token_index(&self) -> isize {
        Token::token_index(*self)
    }
}

/// Records edits against a token stream and renders them on demand.
///
/// The stream should be fully fetched (for a [`BufferedTokenStream`],
/// call [`fill`](crate::BufferedTokenStream::fill)) before rewriting:
/// ranges are validated and rendered against the tokens the stream holds.
///
/// [`BufferedTokenStream`]: crate::BufferedTokenStream
pub struct TokenStreamRewriter<T> {
    tokens: T,
    programs: BTreeMap<String, Vec<RewriteOp>>,
}

impl<T: TokenStream> TokenStreamRewriter<T> {
    /// A rewriter with an empty default program.
    pub fn new(tokens: T) -> Self {
        let mut programs = BTreeMap::new();
        programs.insert(DEFAULT_PROGRAM_NAME.to_string(), Vec::new());
        TokenStreamRewriter { tokens, programs }
    }

    /// The token stream being rewritten.
    pub fn token_stream(&self) -> &T {
        &self.tokens
    }

    /// Mutable access to the token stream, e.g. to fetch more tokens.
    pub fn token_stream_mut(&mut self) -> &mut T {
        &mut self.tokens
    }

    /// Gives the token stream back.
    pub fn into_token_stream(self) -> T {
        self.tokens
    }

    /// Operations recorded in `program`, in order. Empty for unknown names.
    pub fn program(&self, program: &str) -> &[RewriteOp] {
        self.programs.get(program).map(Vec::as_slice).unwrap_or_default()
    }

    /// Drops every instruction of the default program from
    /// `instruction_index` on.
    pub fn rollback(&mut self, instruction_index: usize) {
        self.rollback_in(DEFAULT_PROGRAM_NAME, instruction_index);
    }

    /// Drops every instruction of `program` from `instruction_index` on.
    pub fn rollback_in(&mut self, program: &str, instruction_index: usize) {
        if let Some(ops) = self.programs.get_mut(program) {
            debug!(
                "rewriter: rolling back {program:?} from {} to {instruction_index} instructions",
                ops.len()
            );
            ops.truncate(instruction_index);
        }
    }

    /// Clears the default program.
    pub fn delete_program(&mut self) {
        self.delete_program_in(DEFAULT_PROGRAM_NAME);
    }

    /// Clears `program`.
    pub fn delete_program_in(&mut self, program: &str) {
        self.rollback_in(program, 0);
    }

    /// Inserts `text` before the token at `at`.
    ///
    /// # Errors
    ///
    /// [`RewriteError::InvalidIndex`] for negative addresses.
    pub fn insert_before(&mut self, at: impl TokenAddress, text: impl Into<String>) -> Result<(), RewriteError> {
        self.insert_before_in(DEFAULT_PROGRAM_NAME, at, text)
    }

    /// [`insert_before`](Self::insert_before) in a named program.
    ///
    /// # Errors
    ///
    /// See [`insert_before`](Self::insert_before).
    pub fn insert_before_in(
        &mut self,
        program: &str,
        at: impl TokenAddress,
        text: impl Into<String>,
    ) -> Result<(), RewriteError> {
        let index = checked_index(at.token_index())?;
        let ops = self.program_mut(program);
        ops.push(RewriteOp::InsertBefore {
            index,
            text: text.into(),
            instruction_index: ops.len(),
        });
        Ok(())
    }

    /// Inserts `text` after the token at `at`.
    ///
    /// # Errors
    ///
    /// [`RewriteError::InvalidIndex`] for negative addresses.
    pub fn insert_after(&mut self, at: impl TokenAddress, text: impl Into<String>) -> Result<(), RewriteError> {
        self.insert_after_in(DEFAULT_PROGRAM_NAME, at, text)
    }

    /// [`insert_after`](Self::insert_after) in a named program.
    ///
    /// # Errors
    ///
    /// See [`insert_after`](Self::insert_after).
    pub fn insert_after_in(
        &mut self,
        program: &str,
        at: impl TokenAddress,
        text: impl Into<String>,
    ) -> Result<(), RewriteError> {
        let index = checked_index(at.token_index())?;
        let ops = self.program_mut(program);
        ops.push(RewriteOp::InsertAfter {
            index: index + 1,
            text: text.into(),
            instruction_index: ops.len(),
        });
        Ok(())
    }

    /// Replaces tokens `from..=to` with `text`.
    ///
    /// # Errors
    ///
    /// [`RewriteError::InvalidRange`] when `from > to`, either end is
    /// negative, or `to` is past the last token.
    pub fn replace(
        &mut self,
        from: impl TokenAddress,
        to: impl TokenAddress,
        text: impl Into<String>,
    ) -> Result<(), RewriteError> {
        self.replace_in(DEFAULT_PROGRAM_NAME, from, to, text)
    }

    /// [`replace`](Self::replace) in a named program.
    ///
    /// # Errors
    ///
    /// See [`replace`](Self::replace).
    pub fn replace_in(
        &mut self,
        program: &str,
        from: impl TokenAddress,
        to: impl TokenAddress,
        text: impl Into<String>,
    ) -> Result<(), RewriteError> {
        self.push_replace(program, from.token_index(), to.token_index(), Some(text.into()))
    }

    /// Deletes tokens `from..=to`.
    ///
    /// # Errors
    ///
    /// See [`replace`](Self::replace).
    pub fn delete(&mut self, from: impl TokenAddress, to: impl TokenAddress) -> Result<(), RewriteError> {
        self.delete_in(DEFAULT_PROGRAM_NAME, from, to)
    }

    /// [`delete`](Self::delete) in a named program.
    ///
    /// # Errors
    ///
    /// See [`replace`](Self::replace).
    pub fn delete_in(
        &mut self,
        program: &str,
        from: impl TokenAddress,
        to: impl TokenAddress,
    ) -> Result<(), RewriteError> {
        self.push_replace(program, from.token_index(), to.token_index(), None)
    }

    /// The whole stream with the default program applied.
    ///
    /// # Errors
    ///
    /// Conflicting operations, or a stream that cannot report its size.
    pub fn text(&self) -> Result<String, RewriteError> {
        self.program_text(DEFAULT_PROGRAM_NAME)
    }

    /// Tokens in `interval` with the default program applied.
    ///
    /// # Errors
    ///
    /// See [`text`](Self::text).
    pub fn text_range(&self, interval: Interval) -> Result<String, RewriteError> {
        self.program_text_range(DEFAULT_PROGRAM_NAME, interval)
    }

    /// The whole stream with `program` applied.
    ///
    /// # Errors
    ///
    /// See [`text`](Self::text).
    pub fn program_text(&self, program: &str) -> Result<String, RewriteError> {
        let size = self.tokens.size()?;
        self.program_text_range(program, Interval::of(0, signed(size) - 1))
    }

    /// Tokens in `interval` with `program` applied.
    ///
    /// The interval is clamped to the stream. When it reaches the last
    /// token, inserts positioned after the end of the stream are emitted
    /// too.
    ///
    /// # Errors
    ///
    /// See [`text`](Self::text).
    #[allow(clippy::cast_sign_loss)]
    pub fn program_text_range(&self, program: &str, interval: Interval) -> Result<String, RewriteError> {
        let size = signed(self.tokens.size()?);
        let start = interval.a().max(0);
        let stop = interval.b().min(size - 1);
        let ops = self.program(program);
        if ops.is_empty() {
            return self.raw_text(start, stop);
        }

        let mut index_to_op = op::reduce(ops)?;
        let mut buf = String::new();
        let mut i = start;
        while i <= stop && i < size {
            let index = i as usize;
            let token = self.tokens.get(index)?;
            match index_to_op.remove(&index) {
                None => {
                    push_token_text(&mut buf, token);
                    i += 1;
                }
                Some(RewriteOp::Replace { to, text, .. }) => {
                    if let Some(text) = text {
                        buf.push_str(&text);
                    }
                    i = signed(to) + 1;
                }
                Some(op) => {
                    buf.push_str(op.text().unwrap_or_default());
                    push_token_text(&mut buf, token);
                    i += 1;
                }
            }
        }
        // Inserts past the last token have no token to attach to.
        if stop == size - 1 {
            for op in index_to_op.values() {
                if signed(op.index()) >= size - 1 {
                    buf.push_str(op.text().unwrap_or_default());
                }
            }
        }
        Ok(buf)
    }

    #[allow(clippy::cast_sign_loss)]
    fn raw_text(&self, start: isize, stop: isize) -> Result<String, RewriteError> {
        let mut buf = String::new();
        for i in start..=stop {
            push_token_text(&mut buf, self.tokens.get(i as usize)?);
        }
        Ok(buf)
    }

    fn program_mut(&mut self, program: &str) -> &mut Vec<RewriteOp> {
        self.programs.entry(program.to_string()).or_default()
    }

    fn push_replace(
        &mut self,
        program: &str,
        from: isize,
        to: isize,
        text: Option<String>,
    ) -> Result<(), RewriteError> {
        let size = self.tokens.size()?;
        if from > to || from < 0 || to < 0 || to >= signed(size) {
            return Err(RewriteError::InvalidRange { from, to, size });
        }
        let (from, to) = (checked_index(from)?, checked_index(to)?);
        let ops = self.program_mut(program);
        ops.push(RewriteOp::Replace {
            from,
            to,
            text,
            instruction_index: ops.len(),
        });
        Ok(())
    }
}

fn checked_index(index: isize) -> Result<usize, RewriteError> {
    usize::try_from(index).map_err(|_| RewriteError::InvalidIndex(index))
}

fn push_token_text<T: Token + ?Sized>(buf: &mut String, token: &T) {
    if token.token_type() != EOF {
        if let Some(text) = token.text() {
            buf.push_str(&text);
        }
    }
}
