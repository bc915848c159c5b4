#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::traits::Sink;

/// An implementation of [Sink]. This sink will write data to a backing `&mut [u8]`.
///
/// Every region it grants is the whole unwritten tail of the buffer, so a writer over a
/// `SliceSink` acquires exactly one region unless it flushes in between.
pub struct SliceSink<'a> {
    buffer: &'a mut [u8],
    index: usize,
}

impl<'a> SliceSink<'a> {
    /// Create a new sink with a backing buffer.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, index: 0 }
    }

    /// The bytes count committed to the backing buffer.
    pub fn written_len(&self) -> usize {
        self.index
    }

    /// A slice of the buffer that is in this sink. This is equivalent to getting a slice of the
    /// original buffer with the range `..sink.written_len()`.
    /// ```
    /// # let mut buffer: [u8; 0] = [];
    /// # let mut buffer_2: [u8; 0] = [];
    /// # let mut sink = spanpack_core::SliceSink::new(&mut buffer_2[..]);
    ///
    /// // These two statements are equivalent
    /// let buffer_slice = &buffer[..sink.written_len()];
    /// let sink_slice = sink.written_buffer();
    ///
    /// assert_eq!(buffer_slice, sink_slice);
    /// ```
    pub fn written_buffer(&self) -> &[u8] {
        &self.buffer[..self.index]
    }
}

/// Errors that can be returned from writing to a [SliceSink].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceSinkError {
    /// The backing buffer of the [SliceSink] is too small.
    BufferTooSmall {
        /// Bytes that were asked for.
        requested: usize,
        /// Bytes that were left in the buffer.
        available: usize,
    },
}

impl Sink for SliceSink<'_> {
    type Error = SliceSinkError;

    fn get_region(&mut self, size_hint: usize) -> Result<usize, Self::Error> {
        let available = self.buffer.len() - self.index;
        if size_hint > available {
            return Err(SliceSinkError::BufferTooSmall {
                requested: size_hint,
                available,
            });
        }
        Ok(available)
    }

    fn region_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[self.index..]
    }

    fn commit(&mut self, count: usize) -> Result<(), Self::Error> {
        let available = self.buffer.len() - self.index;
        if count > available {
            return Err(SliceSinkError::BufferTooSmall {
                requested: count,
                available,
            });
        }
        self.index += count;
        Ok(())
    }
}

/// The smallest region a [VecSink] hands out.
#[cfg(feature = "alloc")]
pub const MIN_GROWTH: usize = 256;

/// An implementation of [Sink] that appends to a growable `Vec<u8>`.
#[cfg(feature = "alloc")]
#[derive(Debug, Default)]
pub struct VecSink {
    bytes: Vec<u8>,
    committed: usize,
}

#[cfg(feature = "alloc")]
impl VecSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that appends to an existing vector.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let committed = bytes.len();
        Self { bytes, committed }
    }

    /// The bytes committed so far.
    pub fn written_buffer(&self) -> &[u8] {
        &self.bytes[..self.committed]
    }

    /// Return the committed bytes. Uncommitted region bytes are dropped.
    pub fn into_inner(mut self) -> Vec<u8> {
        self.bytes.truncate(self.committed);
        self.bytes
    }
}

#[cfg(feature = "alloc")]
impl Sink for VecSink {
    type Error = core::convert::Infallible;

    fn get_region(&mut self, size_hint: usize) -> Result<usize, Self::Error> {
        let len = size_hint.max(MIN_GROWTH);
        self.bytes.truncate(self.committed);
        self.bytes.resize(self.committed + len, 0);
        Ok(len)
    }

    fn region_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[self.committed..]
    }

    fn commit(&mut self, count: usize) -> Result<(), Self::Error> {
        self.committed = (self.committed + count).min(self.bytes.len());
        self.bytes.truncate(self.committed);
        Ok(())
    }
}
