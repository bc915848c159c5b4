use alloc::vec::Vec;
use core::convert::Infallible;

use crate::buffer_writer::MIN_GROWTH;
use crate::config::Options;
use crate::error::EncodeError;
use crate::pack::Pack;
use crate::traits::Sink;

/// A [Sink] that only counts committed bytes.
///
/// It reuses one scratch region for every request, so measuring a value costs no more memory
/// than the largest single request made while encoding it.
#[derive(Debug, Default)]
pub struct CountingSink {
    scratch: Vec<u8>,
    total: u64,
}

impl CountingSink {
    /// Create a sink with an empty count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes committed so far.
    pub fn total(&self) -> u64 {
        self.total
    }
}

impl Sink for CountingSink {
    type Error = Infallible;

    fn get_region(&mut self, size_hint: usize) -> Result<usize, Infallible> {
        if self.scratch.len() < size_hint {
            self.scratch.resize(size_hint.max(MIN_GROWTH), 0);
        } else if self.scratch.is_empty() {
            self.scratch.resize(MIN_GROWTH, 0);
        }
        Ok(self.scratch.len())
    }

    fn region_mut(&mut self) -> &mut [u8] {
        &mut self.scratch
    }

    fn commit(&mut self, count: usize) -> Result<(), Infallible> {
        self.total += count as u64;
        Ok(())
    }
}

/// Return the size that serializing a given `T` type would need to be stored.
pub(crate) fn serialized_size<T: serde::Serialize + ?Sized, O: Options>(
    value: &T,
    options: O,
) -> Result<u64, EncodeError<Infallible>> {
    let mut sink = CountingSink::new();
    crate::serialize::serialize(value, &mut sink, options)?;
    Ok(sink.total())
}

/// Return the size that packing a given `T` type would need to be stored.
pub(crate) fn packed_size<T: Pack + ?Sized, O: Options>(
    value: &T,
    options: O,
) -> Result<u64, EncodeError<Infallible>> {
    let mut sink = CountingSink::new();
    crate::pack(value, &mut sink, options)?;
    Ok(sink.total())
}
