use crate::error::StreamError;

/// Symbol returned by [`IntStream::la`] once the stream is exhausted.
pub const EOF: i32 = -1;

/// Source name reported by streams that were not given one.
pub const UNKNOWN_SOURCE_NAME: &str = "<unknown>";

/// A stream of integer symbols with lookahead, marking and seeking.
///
/// Character streams yield code units or code points; token streams yield
/// token types. Indices are absolute positions in the whole stream.
///
/// # Marks
///
/// [`mark`](IntStream::mark) pins the current position so that data from
/// there on stays addressable until the returned marker is passed to
/// [`release`](IntStream::release). Markers must be released in the reverse
/// order of acquisition. Streams that keep all input resident treat both as
/// no-ops.
pub trait IntStream {
    /// Advances past the current symbol.
    ///
    /// # Errors
    ///
    /// [`StreamError::ConsumeEof`] when `la(1)` is already [`EOF`].
    fn consume(&mut self) -> Result<(), StreamError>;

    /// Looks at the symbol `i` positions ahead (`i > 0`) or behind (`i < 0`)
    /// the cursor. `la(1)` is the next symbol to consume and `la(-1)` the last
    /// one consumed; `la(0)` is undefined and returns `0`.
    ///
    /// # Errors
    ///
    /// Streams that decode or fetch on demand report upstream failures here.
    fn la(&mut self, i: isize) -> Result<i32, StreamError>;

    /// Pins the current position and returns a marker for
    /// [`release`](IntStream::release).
    fn mark(&mut self) -> isize;

    /// Releases a marker obtained from [`mark`](IntStream::mark).
    ///
    /// # Errors
    ///
    /// [`StreamError::InvalidMarker`] when `marker` is not the innermost
    /// outstanding mark.
    fn release(&mut self, marker: isize) -> Result<(), StreamError>;

    /// Absolute index of the symbol `la(1)` returns.
    fn index(&self) -> usize;

    /// Moves the cursor so that `index()` becomes `index`.
    ///
    /// # Errors
    ///
    /// Negative indices are rejected; windowed streams also reject targets
    /// outside the retained window.
    fn seek(&mut self, index: isize) -> Result<(), StreamError>;

    /// Total number of symbols in the stream.
    ///
    /// # Errors
    ///
    /// [`StreamError::UnknownSize`] for streams that cannot know it.
    fn size(&self) -> Result<usize, StreamError>;

    /// Name of the input, or [`UNKNOWN_SOURCE_NAME`].
    fn source_name(&self) -> &str;
}

/// Marker handed out by windowed streams for the `depth`-th nested mark.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn marker_for(depth: usize) -> isize {
    -(depth as isize)
}
