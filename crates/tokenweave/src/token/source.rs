use alloc::{string::String, vec::Vec};

use super::{CommonTokenFactory, DEFAULT_CHANNEL, EOF, Token, TokenFactory, TokenOrigin, WritableToken};
use crate::{char_stream::CharStreamRef, error::StreamError};

/// Something that hands out tokens one at a time, usually a lexer.
///
/// After the input is exhausted every call returns an EOF token.
pub trait TokenSource {
    /// Token type produced.
    type Token: WritableToken;
    /// Factory used to build tokens.
    type Factory: TokenFactory<Token = Self::Token>;

    /// Produces the next token.
    ///
    /// # Errors
    ///
    /// Propagates failures from the underlying character stream.
    fn next_token(&mut self) -> Result<Self::Token, StreamError>;

    /// Line of the current position, 1-based.
    fn line(&self) -> usize;

    /// Column of the current position, 0-based.
    fn char_position_in_line(&self) -> isize;

    /// Character stream the source reads from, if any.
    fn input_stream(&self) -> Option<CharStreamRef>;

    /// Name of the input.
    fn source_name(&self) -> &str;

    /// Factory in use.
    fn token_factory(&self) -> &Self::Factory;

    /// Replaces the factory.
    fn set_token_factory(&mut self, factory: Self::Factory);
}

/// A [`TokenSource`] replaying a prepared list of tokens.
///
/// When the list does not end with an EOF token one is synthesized,
/// positioned just after the last token.
pub struct ListTokenSource<F: TokenFactory = CommonTokenFactory> {
    tokens: Vec<F::Token>,
    source_name: String,
    i: usize,
    eof_token: Option<F::Token>,
    factory: F,
}

impl<F> ListTokenSource<F>
where
    F: TokenFactory + Default,
    F::Token: WritableToken + Clone,
{
    /// Replays `tokens`, naming the source after their input.
    pub fn new(tokens: Vec<F::Token>) -> Self {
        let source_name = tokens
            .first()
            .and_then(|t| t.origin().input())
            .and_then(|input| input.try_borrow().ok().map(|s| String::from(s.source_name())))
            .unwrap_or_else(|| String::from("List"));
        ListTokenSource {
            tokens,
            source_name,
            i: 0,
            eof_token: None,
            factory: F::default(),
        }
    }

    /// Replays `tokens` under an explicit source name.
    pub fn with_source_name(tokens: Vec<F::Token>, source_name: &str) -> Self {
        let mut source = Self::new(tokens);
        source.source_name = String::from(source_name);
        source
    }
}

impl<F> TokenSource for ListTokenSource<F>
where
    F: TokenFactory,
    F::Token: WritableToken + Clone,
{
    type Token = F::Token;
    type Factory = F;

    fn next_token(&mut self) -> Result<F::Token, StreamError> {
        if let Some(token) = self.tokens.get(self.i) {
            let token = token.clone();
            if self.i + 1 == self.tokens.len() && token.token_type() == EOF {
                self.eof_token = Some(token.clone());
            }
            self.i += 1;
            return Ok(token);
        }
        if let Some(eof) = &self.eof_token {
            return Ok(eof.clone());
        }
        let start = match self.tokens.last().map(Token::stop_index) {
            Some(previous_stop) if previous_stop != -1 => previous_stop + 1,
            _ => -1,
        };
        let stop = (start - 1).max(-1);
        let origin = TokenOrigin::new(Some(&self.source_name), self.input_stream());
        let eof = self.factory.create(
            &origin,
            EOF,
            Some("EOF"),
            DEFAULT_CHANNEL,
            start,
            stop,
            self.line(),
            self.char_position_in_line(),
        )?;
        self.eof_token = Some(eof.clone());
        Ok(eof)
    }

    fn line(&self) -> usize {
        if let Some(token) = self.tokens.get(self.i) {
            return token.line();
        }
        if let Some(eof) = &self.eof_token {
            return eof.line();
        }
        match self.tokens.last() {
            Some(last) => {
                let newlines = last.text().map_or(0, |text| text.matches('\n').count());
                last.line() + newlines
            }
            None => 1,
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn char_position_in_line(&self) -> isize {
        if let Some(token) = self.tokens.get(self.i) {
            return token.char_position_in_line();
        }
        if let Some(eof) = &self.eof_token {
            return eof.char_position_in_line();
        }
        let Some(last) = self.tokens.last() else {
            return 0;
        };
        if let Some(text) = last.text() {
            if let Some(newline) = text.rfind('\n') {
                return text[newline + 1..].chars().count() as isize;
            }
        }
        last.char_position_in_line() + last.stop_index() - last.start_index() + 1
    }

    fn input_stream(&self) -> Option<CharStreamRef> {
        self.tokens
            .get(self.i)
            .or(self.eof_token.as_ref())
            .or(self.tokens.last())
            .and_then(|t| t.origin().input().cloned())
    }

    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn token_factory(&self) -> &F {
        &self.factory
    }

    fn set_token_factory(&mut self, factory: F) {
        self.factory = factory;
    }
}
