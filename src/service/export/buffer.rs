//! Fixed-size chunking over a growable byte buffer.

use bytes::{Bytes, BytesMut};

/// Accumulates synthesized lines and hands them out in `chunk_size` pieces.
///
/// Chunk boundaries ignore line boundaries; concatenating every chunk and the
/// final remainder yields the exact byte stream that was appended.
#[derive(Debug)]
pub struct ChunkBuffer {
    buf: BytesMut,
    chunk_size: usize,
}

impl ChunkBuffer {
    /// Create a buffer emitting chunks of `chunk_size` bytes (at least 1).
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            buf: BytesMut::with_capacity(chunk_size.saturating_mul(2)),
            chunk_size,
        }
    }

    /// Buffer to append into.
    pub fn writer(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Split off one full chunk if enough bytes are buffered.
    pub fn take_chunk(&mut self) -> Option<Bytes> {
        (self.buf.len() >= self.chunk_size).then(|| self.buf.split_to(self.chunk_size).freeze())
    }

    /// Take whatever is left.
    pub fn take_rest(&mut self) -> Option<Bytes> {
        (!self.buf.is_empty()).then(|| self.buf.split().freeze())
    }

    /// Buffered byte count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Configured chunk size.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}
