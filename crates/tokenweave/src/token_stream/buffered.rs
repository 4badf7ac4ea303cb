use alloc::{string::String, vec::Vec};
use core::mem;

use log::trace;

use super::{TokenStream, signed};
use crate::{
    error::StreamError,
    int_stream::IntStream,
    interval::Interval,
    options::StreamOptions,
    token::{DEFAULT_CHANNEL, EOF, INVALID_TYPE, Token, TokenSource, WritableToken},
};

/// A token stream that keeps every token pulled from its source.
///
/// Tokens are fetched lazily: nothing is read from the source until the
/// stream is first looked at, and then only as far as lookahead requires.
/// [`fill`](Self::fill) drains the source.
///
/// Built with [`on_channel`](Self::on_channel), the stream only shows the
/// parser tokens of that channel: seeks land on the next on-channel token
/// and `lt`/`lb` skip the others. Off-channel tokens stay in the buffer and
/// remain reachable through [`get`](TokenStream::get), [`tokens`](Self::tokens)
/// and the hidden-token queries.
pub struct BufferedTokenStream<S: TokenSource> {
    source: S,
    tokens: Vec<S::Token>,
    /// `None` until the first access fetches the first token.
    p: Option<usize>,
    fetched_eof: bool,
    channel: Option<i32>,
    fetch_block_size: usize,
}

impl<S: TokenSource> BufferedTokenStream<S> {
    /// A stream showing tokens of every channel.
    pub fn new(source: S) -> Self {
        Self::with_options(source, None, StreamOptions::default())
    }

    /// A stream showing only tokens on `channel`.
    pub fn on_channel(source: S, channel: i32) -> Self {
        Self::with_options(source, Some(channel), StreamOptions::default())
    }

    /// A stream showing only tokens on [`DEFAULT_CHANNEL`], which is what
    /// a parser normally wants.
    pub fn on_default_channel(source: S) -> Self {
        Self::on_channel(source, DEFAULT_CHANNEL)
    }

    /// A stream with an optional channel filter and custom fetch sizing.
    pub fn with_options(source: S, channel: Option<i32>, options: StreamOptions) -> Self {
        BufferedTokenStream {
            source,
            tokens: Vec::with_capacity(100),
            p: None,
            fetched_eof: false,
            channel,
            fetch_block_size: options.normalized().fetch_block_size,
        }
    }

    /// The channel filter, if any.
    #[must_use]
    pub fn channel(&self) -> Option<i32> {
        self.channel
    }

    /// Swaps in a new token source and forgets every buffered token.
    /// Returns the previous source.
    pub fn set_token_source(&mut self, source: S) -> S {
        self.tokens.clear();
        self.p = None;
        self.fetched_eof = false;
        mem::replace(&mut self.source, source)
    }

    /// Consumes the stream, returning its source.
    pub fn into_token_source(self) -> S {
        self.source
    }

    /// All tokens fetched so far.
    #[must_use]
    pub fn tokens(&self) -> &[S::Token] {
        &self.tokens
    }

    /// Rewinds to the first token.
    ///
    /// # Errors
    ///
    /// Token source failures.
    pub fn reset(&mut self) -> Result<(), StreamError> {
        self.seek(0)
    }

    /// Pulls every remaining token from the source.
    ///
    /// # Errors
    ///
    /// Token source failures.
    pub fn fill(&mut self) -> Result<(), StreamError> {
        self.lazy_init()?;
        loop {
            let fetched = self.fetch(self.fetch_block_size)?;
            if fetched < self.fetch_block_size {
                return Ok(());
            }
        }
    }

    /// Tokens `start..=stop`, fetching up to `stop` and ending before EOF.
    ///
    /// # Errors
    ///
    /// Token source failures.
    pub fn get_range(&mut self, start: usize, stop: usize) -> Result<&[S::Token], StreamError> {
        self.lazy_init()?;
        self.sync(stop)?;
        let mut end = stop.saturating_add(1).min(self.tokens.len());
        if end > 0 && self.tokens[end - 1].token_type() == EOF {
            end -= 1;
        }
        Ok(self.tokens.get(start..end).unwrap_or_default())
    }

    /// Buffered tokens in `start..=stop` whose type is in `types`; every
    /// token when `types` is `None`.
    ///
    /// # Errors
    ///
    /// [`StreamError::IndexOutOfBounds`] unless both ends are buffered.
    pub fn tokens_in(
        &mut self,
        start: usize,
        stop: usize,
        types: Option<&[i32]>,
    ) -> Result<Vec<&S::Token>, StreamError> {
        self.lazy_init()?;
        let len = self.tokens.len();
        if start >= len || stop >= len {
            return Err(StreamError::IndexOutOfBounds {
                index: signed(start.max(stop)),
                start: 0,
                stop: signed(len) - 1,
            });
        }
        if start > stop {
            return Ok(Vec::new());
        }
        Ok(self.tokens[start..=stop]
            .iter()
            .filter(|t| types.is_none_or(|types| types.contains(&t.token_type())))
            .collect())
    }

    /// Token `k` positions behind the cursor; off-channel tokens are skipped
    /// when the stream filters by channel.
    ///
    /// # Errors
    ///
    /// Token source failures.
    pub fn lb(&mut self, k: usize) -> Result<Option<&S::Token>, StreamError> {
        let p = self.cursor();
        if k == 0 || k > p {
            return Ok(None);
        }
        let Some(channel) = self.channel else {
            return Ok(self.tokens.get(p - k));
        };
        let mut i = p;
        for _ in 0..k {
            if i == 0 {
                return Ok(None);
            }
            match self.previous_token_on_channel(i - 1, channel)? {
                Some(previous) => i = previous,
                None => return Ok(None),
            }
        }
        Ok(self.tokens.get(i))
    }

    /// Index of the first token at or after `i` that is on `channel`, or of
    /// the EOF token if none is.
    ///
    /// # Errors
    ///
    /// Token source failures.
    pub fn next_token_on_channel(&mut self, mut i: usize, channel: i32) -> Result<usize, StreamError> {
        self.sync(i)?;
        if i >= self.tokens.len() {
            return Ok(self.tokens.len().saturating_sub(1));
        }
        loop {
            let token = self.token_at(i)?;
            if token.channel() == channel || token.token_type() == EOF {
                return Ok(i);
            }
            i += 1;
            self.sync(i)?;
        }
    }

    /// Index of the last token at or before `i` that is on `channel`. The
    /// EOF token counts as being on every channel. `None` when there is no
    /// such token.
    ///
    /// # Errors
    ///
    /// Token source failures.
    pub fn previous_token_on_channel(
        &mut self,
        i: usize,
        channel: i32,
    ) -> Result<Option<usize>, StreamError> {
        self.sync(i)?;
        if i >= self.tokens.len() {
            return Ok(self.tokens.len().checked_sub(1));
        }
        Ok(self.tokens[..=i]
            .iter()
            .rposition(|t| t.token_type() == EOF || t.channel() == channel))
    }

    /// Off-default-channel tokens between `index` and the next default
    /// channel token. `channel` narrows the result to one channel; `None`
    /// accepts any channel other than [`DEFAULT_CHANNEL`].
    ///
    /// # Errors
    ///
    /// [`StreamError::IndexOutOfBounds`] when `index` is not buffered.
    pub fn hidden_tokens_to_right(
        &mut self,
        index: usize,
        channel: Option<i32>,
    ) -> Result<Vec<&S::Token>, StreamError> {
        self.lazy_init()?;
        self.check_buffered(index)?;
        let to = self.next_token_on_channel(index + 1, DEFAULT_CHANNEL)?;
        Ok(self.filter_for_channel(index + 1, to, channel))
    }

    /// Off-default-channel tokens between the previous default channel
    /// token and `index`. See [`hidden_tokens_to_right`](Self::hidden_tokens_to_right).
    ///
    /// # Errors
    ///
    /// [`StreamError::IndexOutOfBounds`] when `index` is not buffered.
    pub fn hidden_tokens_to_left(
        &mut self,
        index: usize,
        channel: Option<i32>,
    ) -> Result<Vec<&S::Token>, StreamError> {
        self.lazy_init()?;
        self.check_buffered(index)?;
        if index == 0 {
            return Ok(Vec::new());
        }
        let previous = self.previous_token_on_channel(index - 1, DEFAULT_CHANNEL)?;
        if previous == Some(index - 1) {
            return Ok(Vec::new());
        }
        let from = previous.map_or(0, |p| p + 1);
        Ok(self.filter_for_channel(from, index - 1, channel))
    }

    /// Number of tokens on the stream's channel, fetching everything. The
    /// unfiltered stream counts [`DEFAULT_CHANNEL`] tokens.
    ///
    /// # Errors
    ///
    /// Token source failures.
    pub fn number_of_on_channel_tokens(&mut self) -> Result<usize, StreamError> {
        self.fill()?;
        let channel = self.channel.unwrap_or(DEFAULT_CHANNEL);
        let mut n = 0;
        for t in &self.tokens {
            if t.channel() == channel {
                n += 1;
            }
            if t.token_type() == EOF {
                break;
            }
        }
        Ok(n)
    }

    /// Text of the whole input, fetching everything.
    ///
    /// # Errors
    ///
    /// Token source failures.
    pub fn text(&mut self) -> Result<String, StreamError> {
        self.fill()?;
        let stop = signed(self.tokens.len()) - 1;
        self.text_in(Interval::of(0, stop))
    }

    fn cursor(&self) -> usize {
        self.p.unwrap_or(0)
    }

    fn lazy_init(&mut self) -> Result<(), StreamError> {
        if self.p.is_none() {
            self.sync(0)?;
            self.p = Some(self.adjust_seek_index(0)?);
        }
        Ok(())
    }

    fn adjust_seek_index(&mut self, i: usize) -> Result<usize, StreamError> {
        match self.channel {
            Some(channel) => self.next_token_on_channel(i, channel),
            None => Ok(i),
        }
    }

    /// Makes sure token `i` is buffered. `false` when EOF came first.
    fn sync(&mut self, i: usize) -> Result<bool, StreamError> {
        let need = (i + 1).saturating_sub(self.tokens.len());
        if need > 0 {
            let fetched = self.fetch(need)?;
            return Ok(fetched >= need);
        }
        Ok(true)
    }

    fn fetch(&mut self, n: usize) -> Result<usize, StreamError> {
        if self.fetched_eof {
            return Ok(0);
        }
        trace!(
            "buffered token stream: fetching up to {n} tokens after {}",
            self.tokens.len()
        );
        for i in 0..n {
            let mut t = self.source.next_token()?;
            t.set_token_index(signed(self.tokens.len()));
            let eof = t.token_type() == EOF;
            self.tokens.push(t);
            if eof {
                self.fetched_eof = true;
                return Ok(i + 1);
            }
        }
        Ok(n)
    }

    fn token_at(&self, i: usize) -> Result<&S::Token, StreamError> {
        self.tokens.get(i).ok_or(StreamError::IndexOutOfBounds {
            index: signed(i),
            start: 0,
            stop: signed(self.tokens.len()) - 1,
        })
    }

    fn check_buffered(&self, index: usize) -> Result<(), StreamError> {
        self.token_at(index).map(|_| ())
    }

    fn filter_for_channel(&self, from: usize, to: usize, channel: Option<i32>) -> Vec<&S::Token> {
        let to = to.min(self.tokens.len().saturating_sub(1));
        self.tokens
            .get(from..=to)
            .unwrap_or_default()
            .iter()
            .filter(|t| match channel {
                Some(channel) => t.channel() == channel,
                None => t.channel() != DEFAULT_CHANNEL,
            })
            .collect()
    }
}

impl<S: TokenSource> IntStream for BufferedTokenStream<S> {
    fn consume(&mut self) -> Result<(), StreamError> {
        // The EOF check can be skipped whenever p is on a buffered token
        // other than a trailing EOF.
        let skip_eof_check = match self.p {
            Some(p) if self.fetched_eof => p + 1 < self.tokens.len(),
            Some(p) => p < self.tokens.len(),
            None => false,
        };
        if !skip_eof_check && self.la(1)? == EOF {
            return Err(StreamError::ConsumeEof);
        }
        let next = self.cursor() + 1;
        if self.sync(next)? {
            self.p = Some(self.adjust_seek_index(next)?);
        }
        Ok(())
    }

    fn la(&mut self, i: isize) -> Result<i32, StreamError> {
        Ok(self.lt(i)?.map_or(INVALID_TYPE, Token::token_type))
    }

    fn mark(&mut self) -> isize {
        0
    }

    fn release(&mut self, _marker: isize) -> Result<(), StreamError> {
        Ok(())
    }

    fn index(&self) -> usize {
        self.cursor()
    }

    fn seek(&mut self, index: isize) -> Result<(), StreamError> {
        let index = usize::try_from(index).map_err(|_| StreamError::NegativeSeek(index))?;
        self.lazy_init()?;
        self.p = Some(self.adjust_seek_index(index)?);
        Ok(())
    }

    fn size(&self) -> Result<usize, StreamError> {
        Ok(self.tokens.len())
    }

    fn source_name(&self) -> &str {
        self.source.source_name()
    }
}

impl<S: TokenSource> TokenStream for BufferedTokenStream<S> {
    type Tok = S::Token;
    type Source = S;

    fn lt(&mut self, k: isize) -> Result<Option<&S::Token>, StreamError> {
        self.lazy_init()?;
        if k == 0 {
            return Ok(None);
        }
        if k < 0 {
            return self.lb(k.unsigned_abs());
        }
        let k = k.unsigned_abs();
        let i = match self.channel {
            None => {
                let i = self.cursor() + k - 1;
                self.sync(i)?;
                i
            }
            Some(channel) => {
                let mut i = self.cursor();
                for _ in 1..k {
                    if self.sync(i + 1)? {
                        i = self.next_token_on_channel(i + 1, channel)?;
                    }
                }
                i
            }
        };
        // Past the end: EOF is the last token.
        Ok(self.tokens.get(i).or(self.tokens.last()))
    }

    fn get(&self, index: usize) -> Result<&S::Token, StreamError> {
        self.token_at(index)
    }

    #[allow(clippy::cast_sign_loss)]
    fn text_in(&mut self, interval: Interval) -> Result<String, StreamError> {
        if interval.a() < 0 || interval.b() < 0 {
            return Ok(String::new());
        }
        let (start, stop) = (interval.a() as usize, interval.b() as usize);
        self.lazy_init()?;
        self.sync(stop)?;
        let stop = stop.min(self.tokens.len().saturating_sub(1));
        let mut text = String::new();
        for t in self.tokens.get(start..=stop).unwrap_or_default() {
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
