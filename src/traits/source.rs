use core::convert::Infallible;

/// An origin that hands out readable regions. This is the read-side dual of [Sink](super::Sink).
///
/// The [Reader](crate::Reader) calls `get_region(n)` whenever its cached region runs dry, after
/// reporting the bytes it consumed from the previous one with `advance`. The region returned
/// always starts at the first byte not yet advanced past.
///
/// Because the format is not self-describing, a source cannot know how much the decoder will need.
/// It reports what it has; a region shorter than the hint means end of data.
pub trait Source<'de> {
    /// The error that this source can encounter
    type Error: core::fmt::Debug;

    /// Makes at least `size_hint` bytes readable if possible and returns how many are readable.
    ///
    /// Returning less than `size_hint` signals end of data (or, for fixed staging buffers, that the
    /// request exceeds the buffer).
    fn get_region(&mut self, size_hint: usize) -> Result<usize, Self::Error>;

    /// The readable region made available by the most recent call to
    /// [get_region](Source::get_region).
    fn region(&self) -> &[u8];

    /// Marks the first `count` bytes of the current region as consumed.
    fn advance(&mut self, count: usize);

    /// The current region with the lifetime of the underlying data, if the source can lend it.
    ///
    /// Zero-copy decoding of `&'de str` and `&'de [u8]` is only possible when this returns `Some`.
    fn borrowed_region(&self) -> Option<&'de [u8]> {
        None
    }
}

/// A [Source] over a byte slice. Decoding from it never copies strings or byte slices.
#[derive(Debug, Clone, Copy)]
pub struct SliceSource<'de> {
    remaining: &'de [u8],
}

impl<'de> SliceSource<'de> {
    /// Create a new source over `bytes`.
    pub fn new(bytes: &'de [u8]) -> Self {
        Self { remaining: bytes }
    }

    /// The bytes that have not been advanced past yet.
    pub fn remaining(&self) -> &'de [u8] {
        self.remaining
    }
}

impl<'de> Source<'de> for SliceSource<'de> {
    type Error = Infallible;

    #[inline]
    fn get_region(&mut self, _size_hint: usize) -> Result<usize, Infallible> {
        Ok(self.remaining.len())
    }

    #[inline]
    fn region(&self) -> &[u8] {
        self.remaining
    }

    #[inline]
    fn advance(&mut self, count: usize) {
        let count = count.min(self.remaining.len());
        self.remaining = &self.remaining[count..];
    }

    #[inline]
    fn borrowed_region(&self) -> Option<&'de [u8]> {
        Some(self.remaining)
    }
}

impl<'de, R: Source<'de> + ?Sized> Source<'de> for &'_ mut R {
    type Error = R::Error;

    #[inline]
    fn get_region(&mut self, size_hint: usize) -> Result<usize, Self::Error> {
        (**self).get_region(size_hint)
    }

    #[inline]
    fn region(&self) -> &[u8] {
        (**self).region()
    }

    #[inline]
    fn advance(&mut self, count: usize) {
        (**self).advance(count)
    }

    #[inline]
    fn borrowed_region(&self) -> Option<&'de [u8]> {
        (**self).borrowed_region()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_advances_through_data() {
        let data = [1u8, 2, 3, 4];
        let mut source = SliceSource::new(&data);
        assert_eq!(source.get_region(2).unwrap(), 4);
        source.advance(3);
        assert_eq!(source.region(), &[4]);
        assert_eq!(source.borrowed_region(), Some(&data[3..]));
        source.advance(10);
        assert!(source.remaining().is_empty());
    }
}
