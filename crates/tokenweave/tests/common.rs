#![allow(missing_docs)]
#![allow(dead_code, clippy::cast_possible_wrap)]

use std::{cell::RefCell, rc::Rc};

use tokenweave::{
    CharStream, CharStreamRef, CommonToken, CommonTokenFactory, EOF, IntStream, StreamError, TokenFactory,
    TokenOrigin, TokenSource,
    token::{DEFAULT_CHANNEL, HIDDEN_CHANNEL},
};

pub const ID: i32 = 1;
pub const INT: i32 = 2;
pub const WS: i32 = 3;
pub const OP: i32 = 4;

/// Identifiers, integers, whitespace on the hidden channel, and one-char
/// operators for everything else.
pub struct ToyLexer {
    input: CharStreamRef,
    origin: TokenOrigin,
    factory: CommonTokenFactory,
    line: usize,
    column: isize,
}

impl ToyLexer {
    pub fn new(input: impl CharStream + 'static) -> Self {
        Self::with_factory(Rc::new(RefCell::new(input)), CommonTokenFactory::DEFAULT)
    }

    /// Lexer that copies token text out of the input as it goes.
    pub fn copying(input: impl CharStream + 'static) -> Self {
        Self::with_factory(Rc::new(RefCell::new(input)), CommonTokenFactory::new(true))
    }

    pub fn with_factory(input: CharStreamRef, factory: CommonTokenFactory) -> Self {
        let name = input.borrow().source_name().to_owned();
        ToyLexer {
            origin: TokenOrigin::new(Some(name.as_str()), Some(input.clone())),
            input,
            factory,
            line: 1,
            column: 0,
        }
    }

    fn advance(&mut self, input: &mut dyn CharStream) -> Result<(), StreamError> {
        if input.la(1)? == i32::from(b'\n') {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        input.consume()
    }
}

fn is(c: i32, pred: fn(char) -> bool) -> bool {
    u32::try_from(c).ok().and_then(char::from_u32).is_some_and(pred)
}

impl TokenSource for ToyLexer {
    type Token = CommonToken;
    type Factory = CommonTokenFactory;

    fn next_token(&mut self) -> Result<CommonToken, StreamError> {
        let input = self.input.clone();
        let (line, column) = (self.line, self.column);
        let mut stream = input.try_borrow_mut().map_err(|_| StreamError::InputBorrowed)?;
        let marker = stream.mark();
        let start = stream.index() as isize;
        let c = stream.la(1)?;
        let (token_type, channel) = if c == EOF {
            (EOF, DEFAULT_CHANNEL)
        } else if is(c, char::is_alphabetic) {
            while is(stream.la(1)?, char::is_alphanumeric) {
                self.advance(&mut *stream)?;
            }
            (ID, DEFAULT_CHANNEL)
        } else if is(c, |c| c.is_ascii_digit()) {
            while is(stream.la(1)?, |c| c.is_ascii_digit()) {
                self.advance(&mut *stream)?;
            }
            (INT, DEFAULT_CHANNEL)
        } else if is(c, char::is_whitespace) {
            while is(stream.la(1)?, char::is_whitespace) {
                self.advance(&mut *stream)?;
            }
            (WS, HIDDEN_CHANNEL)
        } else {
            self.advance(&mut *stream)?;
            (OP, DEFAULT_CHANNEL)
        };
        let stop = stream.index() as isize - 1;
        drop(stream);

        let text = (token_type == EOF).then_some("<EOF>");
        let token = self
            .factory
            .create(&self.origin, token_type, text, channel, start, stop, line, column)?;
        input
            .try_borrow_mut()
            .map_err(|_| StreamError::InputBorrowed)?
            .release(marker)?;
        Ok(token)
    }

    fn line(&self) -> usize {
        self.line
    }

    fn char_position_in_line(&self) -> isize {
        self.column
    }

    fn input_stream(&self) -> Option<CharStreamRef> {
        Some(self.input.clone())
    }

    fn source_name(&self) -> &str {
        self.origin.source_name().unwrap_or_default()
    }

    fn token_factory(&self) -> &CommonTokenFactory {
        &self.factory
    }

    fn set_token_factory(&mut self, factory: CommonTokenFactory) {
        self.factory = factory;
    }
}
