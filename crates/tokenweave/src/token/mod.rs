//! Tokens and the interfaces that produce them.

use alloc::{borrow::Cow, rc::Rc};
use core::fmt;

use crate::char_stream::CharStreamRef;

mod common;
mod factory;
mod source;


pub use common::CommonToken;
pub use factory::{CommonTokenFactory, TokenFactory};
pub use source::{ListTokenSource, TokenSource};

/// Type of a token that has not been classified.
pub const INVALID_TYPE: i32 = 0;
/// Internal type used by recognizers for empty transitions.
pub const EPSILON: i32 = -2;
/// Smallest type a grammar may assign.
pub const MIN_USER_TOKEN_TYPE: i32 = 1;
/// Type of the end-of-file token.
pub const EOF: i32 = crate::int_stream::EOF;
/// Channel parsers listen on.
pub const DEFAULT_CHANNEL: i32 = 0;
/// Conventional channel for whitespace and comments.
pub const HIDDEN_CHANNEL: i32 = 1;
/// Smallest channel number a grammar may define.
pub const MIN_USER_CHANNEL_VALUE: i32 = 2;

/// Read access to a lexed token.
pub trait Token {
    /// Token type; [`EOF`] for the end-of-file token.
    fn token_type(&self) -> i32;

    /// Channel the token was emitted on.
    fn channel(&self) -> i32;

    /// 1-based line of the first character; 0 when unknown.
    fn line(&self) -> usize;

    /// 0-based column of the first character; -1 when unknown.
    fn char_position_in_line(&self) -> isize;

    /// Position in the token stream, or -1 if not yet buffered.
    fn token_index(&self) -> isize;

    /// Index of the first character in the input.
    fn start_index(&self) -> isize;

    /// Index of the last character in the input, inclusive.
    fn stop_index(&self) -> isize;

    /// The token's text, if it has any.
    fn text(&self) -> Option<Cow<'_, str>>;

    /// Where the token came from.
    fn origin(&self) -> &TokenOrigin;
}

/// Mutable access used by token buffers and lexers.
pub trait WritableToken: Token {
    /// Overrides the text derived from the input.
    fn set_text(&mut self, text: &str);
    /// Changes the token type.
    fn set_token_type(&mut self, token_type: i32);
    /// Changes the line.
    fn set_line(&mut self, line: usize);
    /// Changes the column.
    fn set_char_position_in_line(&mut self, position: isize);
    /// Moves the token to another channel.
    fn set_channel(&mut self, channel: i32);
    /// Records the token's position in a token stream.
    fn set_token_index(&mut self, index: isize);
}

/// The source name and input stream a token was lexed from.
///
/// Tokens keep a shared handle to their input so that their text can be
/// read back lazily. Cloning is cheap.
#[derive(Clone, Default)]
pub struct TokenOrigin {
    source_name: Option<Rc<str>>,
    input: Option<CharStreamRef>,
}

impl TokenOrigin {
    /// An origin with neither name nor input.
    pub const EMPTY: TokenOrigin = TokenOrigin {
        source_name: None,
        input: None,
    };

    /// Creates an origin.
    #[must_use]
    pub fn new(source_name: Option<&str>, input: Option<CharStreamRef>) -> Self {
        TokenOrigin {
            source_name: source_name.map(Rc::from),
            input,
        }
    }

    /// Name of the token source.
    #[must_use]
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Input the token's offsets refer to.
    #[must_use]
    pub fn input(&self) -> Option<&CharStreamRef> {
        self.input.as_ref()
    }
}

impl fmt::Debug for TokenOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenOrigin")
            .field("source_name", &self.source_name)
            .field("has_input", &self.input.is_some())
            .finish()
    }
}
