/// A destination that hands out writable regions. This plays the role `std::io::Write` plays
/// elsewhere, but lets the encoder write in place instead of pushing byte slices through a copy.
///
/// The [Writer](crate::Writer) is the only caller. It follows a strict protocol:
/// 1. `get_region(n)` is called to obtain a fresh region of at least `n` bytes. Any region granted
///    before is forgotten by the writer.
/// 2. `region_mut()` is called any number of times to write into that region.
/// 3. `commit(count)` finalizes the first `count` bytes of the region. After this the writer does
///    not touch the region again, so a pooled sink may reuse the memory immediately.
///
/// This trait is implemented for [SliceSink](crate::SliceSink), and for `VecSink` when the `alloc`
/// feature is enabled. It can also be implemented to write to an e.g. serial port.
pub trait Sink {
    /// The error that this sink can encounter
    type Error: core::fmt::Debug;

    /// Grants a fresh writable region of at least `size_hint` bytes and returns its length.
    ///
    /// A sink may return a longer region to reduce future calls. It must return an error rather
    /// than a shorter region.
    fn get_region(&mut self, size_hint: usize) -> Result<usize, Self::Error>;

    /// The region granted by the most recent call to [get_region](Sink::get_region).
    fn region_mut(&mut self) -> &mut [u8];

    /// Marks the first `count` bytes of the current region as finalized output.
    fn commit(&mut self, count: usize) -> Result<(), Self::Error>;
}

impl<S: Sink + ?Sized> Sink for &'_ mut S {
    type Error = S::Error;

    #[inline]
    fn get_region(&mut self, size_hint: usize) -> Result<usize, Self::Error> {
        (**self).get_region(size_hint)
    }

    #[inline]
    fn region_mut(&mut self) -> &mut [u8] {
        (**self).region_mut()
    }

    #[inline]
    fn commit(&mut self, count: usize) -> Result<(), Self::Error> {
        (**self).commit(count)
    }
}
