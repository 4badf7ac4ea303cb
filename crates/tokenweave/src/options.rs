/// Sizing knobs for the buffering streams.
///
/// None of these options change what a stream returns; they only trade
/// memory for the number of upstream reads.
///
/// # Examples
///
/// ```rust
/// use tokenweave::{StreamOptions, UnbufferedCharStream};
///
/// let options = StreamOptions {
///     buffer_size: 16,
///     ..Default::default()
/// };
/// let stream = UnbufferedCharStream::from_text_with_options("abc", options)?;
/// # let _ = stream;
/// # Ok::<(), tokenweave::StreamError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamOptions {
    /// Initial capacity of the sliding window kept by unbuffered streams.
    ///
    /// The window grows past this size while marks are held.
    ///
    /// # Default
    ///
    /// `256`
    pub buffer_size: usize,

    /// Number of bytes requested per `read` call when loading a buffered
    /// stream from a reader.
    ///
    /// # Default
    ///
    /// `1024`
    pub read_chunk_size: usize,

    /// Number of tokens pulled from the token source per round when
    /// [`BufferedTokenStream::fill`](crate::BufferedTokenStream::fill) runs.
    ///
    /// # Default
    ///
    /// `1000`
    pub fetch_block_size: usize,
}

impl StreamOptions {
    /// Default window capacity for unbuffered streams.
    pub const DEFAULT_BUFFER_SIZE: usize = 256;
    /// Default read size for reader-backed buffered streams.
    pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;
    /// Default token block size for `fill`.
    pub const DEFAULT_FETCH_BLOCK_SIZE: usize = 1000;

    /// Replaces zero sizes with their defaults.
    pub(crate) fn normalized(self) -> Self {
        let or_default = |value: usize, default: usize| if value == 0 { default } else { value };
        StreamOptions {
            buffer_size: or_default(self.buffer_size, Self::DEFAULT_BUFFER_SIZE),
            read_chunk_size: or_default(self.read_chunk_size, Self::DEFAULT_READ_CHUNK_SIZE),
            fetch_block_size: or_default(self.fetch_block_size, Self::DEFAULT_FETCH_BLOCK_SIZE),
        }
    }
}

impl Default for StreamOptions {
    fn default() -> Self {
        StreamOptions {
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            read_chunk_size: Self::DEFAULT_READ_CHUNK_SIZE,
            fetch_block_size: Self::DEFAULT_FETCH_BLOCK_SIZE,
        }
    }
}
