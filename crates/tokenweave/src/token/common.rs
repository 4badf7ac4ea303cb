use alloc::{borrow::Cow, rc::Rc};
use core::fmt;

use super::{DEFAULT_CHANNEL, Token, TokenOrigin, WritableToken};
use crate::{interval::Interval, misc::escape_whitespace};

/// The standard token record.
///
/// Text is read from the input on demand unless it was set explicitly.
/// Clones share both the explicit text and the input handle.
#[derive(Debug, Clone)]
pub struct CommonToken {
    token_type: i32,
    line: usize,
    char_position_in_line: isize,
    channel: i32,
    origin: TokenOrigin,
    text: Option<Rc<str>>,
    index: isize,
    start: isize,
    stop: isize,
}

impl CommonToken {
    /// A token of `token_type` with no origin and no text.
    #[must_use]
    pub fn new(token_type: i32) -> Self {
        Self::from_origin(TokenOrigin::EMPTY, token_type, DEFAULT_CHANNEL, -1, -1)
    }

    /// A token of `token_type` carrying explicit `text`.
    #[must_use]
    pub fn with_text(token_type: i32, text: &str) -> Self {
        let mut token = Self::new(token_type);
        token.text = Some(Rc::from(text));
        token
    }

    /// A token spanning `start..=stop` of the origin's input.
    ///
    /// Line and column are left unknown; factories fill them in.
    #[must_use]
    pub fn from_origin(
        origin: TokenOrigin,
        token_type: i32,
        channel: i32,
        start: isize,
        stop: isize,
    ) -> Self {
        CommonToken {
            token_type,
            line: 0,
            char_position_in_line: -1,
            channel,
            origin,
            text: None,
            index: -1,
            start,
            stop,
        }
    }

    /// Copies any token. The text is materialized once.
    #[must_use]
    pub fn from_token<T: Token + ?Sized>(other: &T) -> Self {
        CommonToken {
            token_type: other.token_type(),
            line: other.line(),
            char_position_in_line: other.char_position_in_line(),
            channel: other.channel(),
            origin: other.origin().clone(),
            text: other.text().map(|t| Rc::from(t.as_ref())),
            index: other.token_index(),
            start: other.start_index(),
            stop: other.stop_index(),
        }
    }

    /// Sets the first character offset.
    pub fn set_start_index(&mut self, start: isize) {
        self.start = start;
    }

    /// Sets the last character offset.
    pub fn set_stop_index(&mut self, stop: isize) {
        self.stop = stop;
    }

    #[allow(clippy::cast_sign_loss)]
    fn text_from_input(&self) -> Option<Cow<'_, str>> {
        let input = self.origin.input()?.try_borrow().ok()?;
        let interval = Interval::of(self.start, self.stop);
        match input.size() {
            Ok(n) => {
                // An empty token at offset 0 has stop -1; it still reads as "".
                let n = isize::try_from(n).unwrap_or(isize::MAX);
                if self.start >= 0 && self.start < n && self.stop < n {
                    input.text(interval).ok().map(Cow::Owned)
                } else {
                    Some(Cow::Borrowed("<EOF>"))
                }
            }
            Err(_) => input.text(interval).ok().map(Cow::Owned),
        }
    }
}

impl Token for CommonToken {
    #[inline]
    fn token_type(&self) -> i32 {
        self.token_type
    }

    #[inline]
    fn channel(&self) -> i32 {
        self.channel
    }

    #[inline]
    fn line(&self) -> usize {
        self.line
    }

    #[inline]
    fn char_position_in_line(&self) -> isize {
        self.char_position_in_line
    }

    #[inline]
    fn token_index(&self) -> isize {
        self.index
    }

    #[inline]
    fn start_index(&self) -> isize {
        self.start
    }

    #[inline]
    fn stop_index(&self) -> isize {
        self.stop
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        match &self.text {
            Some(text) => Some(Cow::Borrowed(text)),
            None => self.text_from_input(),
        }
    }

    #[inline]
    fn origin(&self) -> &TokenOrigin {
        &self.origin
    }
}

impl WritableToken for CommonToken {
    fn set_text(&mut self, text: &str) {
        self.text = Some(Rc::from(text));
    }

    fn set_token_type(&mut self, token_type: i32) {
        self.token_type = token_type;
    }

    fn set_line(&mut self, line: usize) {
        self.line = line;
    }

    fn set_char_position_in_line(&mut self, position: isize) {
        self.char_position_in_line = position;
    }

    fn set_channel(&mut self, channel: i32) {
        self.channel = channel;
    }

    fn set_token_index(&mut self, index: isize) {
        self.index = index;
    }
}

/// `[@index,start:stop='text',<type>,line:column]`, with `,channel=N` after
/// the type for channels other than the default.
impl fmt::Display for CommonToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[@{},{}:{}='", self.index, self.start, self.stop)?;
        match self.text() {
            Some(text) => f.write_str(&escape_whitespace(&text, false))?,
            None => f.write_str("<no text>")?,
        }
        write!(f, "',<{}>", self.token_type)?;
        if self.channel > 0 {
            write!(f, ",channel={}", self.channel)?;
        }
        write!(f, ",{}:{}]", self.line, self.char_position_in_line)
    }
}
