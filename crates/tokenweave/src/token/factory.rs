use super::{CommonToken, Token, TokenOrigin, WritableToken};
use crate::{error::StreamError, interval::Interval};

/// Creates tokens for a lexer.
pub trait TokenFactory {
    /// Token type produced.
    type Token: Token;

    /// Creates a token spanning `start..=stop` of the origin's input.
    ///
    /// `text`, when given, overrides the text derived from the input.
    ///
    /// # Errors
    ///
    /// Factories that read the input eagerly report failures doing so.
    #[allow(clippy::too_many_arguments)]
    fn create(
        &self,
        origin: &TokenOrigin,
        token_type: i32,
        text: Option<&str>,
        channel: i32,
        start: isize,
        stop: isize,
        line: usize,
        char_position_in_line: isize,
    ) -> Result<Self::Token, StreamError>;

    /// Creates a free-standing token with explicit text.
    fn create_simple(&self, token_type: i32, text: &str) -> Self::Token;
}

/// Factory for [`CommonToken`]s.
///
/// With `copy_text` set, text is copied out of the input when the token is
/// created instead of being read back later. Unbuffered character streams
/// need this: by the time anyone asks for the text, the window holding it is
/// usually gone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommonTokenFactory {
    /// Copy text from the input at creation time.
    pub copy_text: bool,
}

impl CommonTokenFactory {
    /// Factory that reads text lazily.
    pub const DEFAULT: CommonTokenFactory = CommonTokenFactory { copy_text: false };

    /// Factory with an explicit copy policy.
    #[must_use]
    pub const fn new(copy_text: bool) -> Self {
        CommonTokenFactory { copy_text }
    }
}

impl TokenFactory for CommonTokenFactory {
    type Token = CommonToken;

    fn create(
        &self,
        origin: &TokenOrigin,
        token_type: i32,
        text: Option<&str>,
        channel: i32,
        start: isize,
        stop: isize,
        line: usize,
        char_position_in_line: isize,
    ) -> Result<CommonToken, StreamError> {
        let mut token = CommonToken::from_origin(origin.clone(), token_type, channel, start, stop);
        token.set_line(line);
        token.set_char_position_in_line(char_position_in_line);
        if let Some(text) = text {
            token.set_text(text);
        } else if self.copy_text {
            if let Some(input) = origin.input() {
                let input = input.try_borrow().map_err(|_| StreamError::InputBorrowed)?;
                token.set_text(&input.text(Interval::of(start, stop))?);
            }
        }
        Ok(token)
    }

    fn create_simple(&self, token_type: i32, text: &str) -> CommonToken {
        CommonToken::with_text(token_type, text)
    }
}
