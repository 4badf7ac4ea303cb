use alloc::{string::String, vec::Vec};

use log::trace;

use super::{TokenStream, signed};
use crate::{
    error::StreamError,
    int_stream::{IntStream, marker_for},
    interval::Interval,
    options::StreamOptions,
    token::{EOF, INVALID_TYPE, Token, TokenSource, WritableToken},
};

/// A token stream that keeps only the tokens still reachable.
///
/// The window discipline matches
/// [`UnbufferedCharStream`](crate::UnbufferedCharStream): with no marks
/// held, consuming the last buffered token drops the window; releasing the
/// outermost mark discards everything before the cursor. Tokens receive
/// absolute indices as they are added.
pub struct UnbufferedTokenStream<S: TokenSource> {
    source: S,
    tokens: Vec<S::Token>,
    /// Index into `tokens` of `lt(1)`.
    p: usize,
    num_markers: usize,
    last_token: Option<S::Token>,
    last_token_buffer_start: Option<S::Token>,
    /// Absolute index of `tokens[p]`.
    current_token_index: usize,
}

impl<S> UnbufferedTokenStream<S>
where
    S: TokenSource,
    S::Token: Clone,
{
    /// Streams tokens from `source` with the default window size.
    ///
    /// # Errors
    ///
    /// The window is primed with one token; source failures doing so are
    /// returned.
    pub fn new(source: S) -> Result<Self, StreamError> {
        Self::with_options(source, StreamOptions::default())
    }

    /// Streams tokens from `source` with custom sizing.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_options(source: S, options: StreamOptions) -> Result<Self, StreamError> {
        let mut stream = UnbufferedTokenStream {
            source,
            tokens: Vec::with_capacity(options.normalized().buffer_size),
            p: 0,
            num_markers: 0,
            last_token: None,
            last_token_buffer_start: None,
            current_token_index: 0,
        };
        stream.fill(1)?;
        Ok(stream)
    }

    /// Absolute index of the first token still in the window.
    #[must_use]
    pub fn buffer_start_index(&self) -> usize {
        self.current_token_index - self.p
    }

    fn sync(&mut self, want: usize) -> Result<(), StreamError> {
        let need = (self.p + want).saturating_sub(self.tokens.len());
        if need > 0 {
            self.fill(need)?;
        }
        Ok(())
    }

    fn fill(&mut self, n: usize) -> Result<usize, StreamError> {
        for added in 0..n {
            if self.tokens.last().is_some_and(|t| t.token_type() == EOF) {
                return Ok(added);
            }
            let mut t = self.source.next_token()?;
            t.set_token_index(signed(self.buffer_start_index() + self.tokens.len()));
            self.tokens.push(t);
        }
        Ok(n)
    }

    fn window_bounds(&self) -> (isize, isize) {
        let start = self.buffer_start_index();
        (signed(start), signed(start + self.tokens.len()) - 1)
    }
}

impl<S> IntStream for UnbufferedTokenStream<S>
where
    S: TokenSource,
    S::Token: Clone,
{
    fn consume(&mut self) -> Result<(), StreamError> {
        if self.la(1)? == EOF {
            return Err(StreamError::ConsumeEof);
        }
        self.last_token = self.tokens.get(self.p).cloned();
        if self.p + 1 == self.tokens.len() && self.num_markers == 0 {
            trace!(
                "unbuffered token stream: dropping window of {} at index {}",
                self.tokens.len(),
                self.current_token_index
            );
            self.tokens.clear();
            self.p = 0;
            self.last_token_buffer_start.clone_from(&self.last_token);
        } else {
            self.p += 1;
        }
        self.current_token_index += 1;
        self.sync(1)
    }

    fn la(&mut self, i: isize) -> Result<i32, StreamError> {
        Ok(self.lt(i)?.map_or(INVALID_TYPE, Token::token_type))
    }

    fn mark(&mut self) -> isize {
        if self.num_markers == 0 {
            self.last_token_buffer_start.clone_from(&self.last_token);
        }
        self.num_markers += 1;
        marker_for(self.num_markers)
    }

    fn release(&mut self, marker: isize) -> Result<(), StreamError> {
        let expected = marker_for(self.num_markers);
        if self.num_markers == 0 || marker != expected {
            return Err(StreamError::InvalidMarker { marker, expected });
        }
        self.num_markers -= 1;
        if self.num_markers == 0 {
            if self.p > 0 {
                trace!(
                    "unbuffered token stream: compacting {} consumed tokens",
                    self.p
                );
                self.tokens.drain(..self.p);
                self.p = 0;
            }
            self.last_token_buffer_start.clone_from(&self.last_token);
        }
        Ok(())
    }

    fn index(&self) -> usize {
        self.current_token_index
    }

    fn seek(&mut self, index: isize) -> Result<(), StreamError> {
        let mut index = usize::try_from(index).map_err(|_| StreamError::NegativeSeek(index))?;
        if index == self.current_token_index {
            return Ok(());
        }
        if index > self.current_token_index {
            self.sync(index - self.current_token_index)?;
            let last = (self.buffer_start_index() + self.tokens.len()).saturating_sub(1);
            index = index.min(last);
        }
        let start = self.buffer_start_index();
        let outside = StreamError::SeekOutsideBuffer {
            index,
            start,
            stop: start + self.tokens.len(),
        };
        let Some(i) = index.checked_sub(start) else {
            return Err(outside);
        };
        if i >= self.tokens.len() {
            return Err(outside);
        }
        self.p = i;
        self.current_token_index = index;
        self.last_token = if i == 0 {
            self.last_token_buffer_start.clone()
        } else {
            self.tokens.get(i - 1).cloned()
        };
        Ok(())
    }

    fn size(&self) -> Result<usize, StreamError> {
        Err(StreamError::UnknownSize)
    }

    fn source_name(&self) -> &str {
        self.source.source_name()
    }
}

impl<S> TokenStream for UnbufferedTokenStream<S>
where
    S: TokenSource,
    S::Token: Clone,
{
    type Tok = S::Token;
    type Source = S;

    fn lt(&mut self, k: isize) -> Result<Option<&S::Token>, StreamError> {
        match k {
            -1 => return Ok(self.last_token.as_ref()),
            0 => return Ok(None),
            _ => {}
        }
        let index = if k > 0 {
            self.sync(k.unsigned_abs())?;
            signed(self.p) + k - 1
        } else {
            signed(self.p) + k
        };
        let Ok(index) = usize::try_from(index) else {
            let (_, stop) = self.window_bounds();
            return Err(StreamError::IndexOutOfBounds {
                index: signed(self.current_token_index) + k,
                start: signed(self.buffer_start_index()),
                stop,
            });
        };
        // Past the end: EOF is the last token in the window.
        Ok(self.tokens.get(index).or(self.tokens.last()))
    }

    fn get(&self, index: usize) -> Result<&S::Token, StreamError> {
        let (start, stop) = self.window_bounds();
        index
            .checked_sub(self.buffer_start_index())
            .and_then(|i| self.tokens.get(i))
            .ok_or(StreamError::IndexOutOfBounds {
                index: signed(index),
                start,
                stop,
            })
    }

    #[allow(clippy::cast_sign_loss)]
    fn text_in(&mut self, interval: Interval) -> Result<String, StreamError> {
        let (start, stop) = self.window_bounds();
        if interval.a() < start || interval.b() > stop {
            return Err(StreamError::IntervalOutsideBuffer {
                interval,
                start: self.buffer_start_index(),
                stop: self.buffer_start_index() + self.tokens.len(),
            });
        }
        let a = (interval.a() - start) as usize;
        let b = (interval.b() - start) as usize;
        let mut text = String::new();
        for t in self.tokens.get(a..=b).unwrap_or_default() {
            if t.token_type() == EOF {
                break;
            }
            if let Some(s) = t.text() {
                text.push_str(&s);
            }
        }
        Ok(text)
    }

    fn token_source(&self) -> &S {
        &self.source
    }
}
