/// Caps the number of bytes a single top-level call may produce or consume.
///
/// Both the [Writer](crate::Writer) and the [Reader](crate::Reader) charge every `advance`
/// against the limit, so a hostile collection header cannot drive a read past it.
pub trait SizeLimit {
    /// Tells the SizeLimit that `n` more bytes have been read or written.
    /// Returns `Err` if the limit has been exceeded.
    fn add(&mut self, n: u64) -> Result<(), LimitError>;
    /// Returns the remaining budget (if one exists)
    fn limit(&self) -> Option<u64>;
}

/// The byte limit passed to the options was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct LimitError {
    /// Bytes that were requested when the limit tripped.
    pub requested: u64,
    /// Bytes that were still available.
    pub remaining: u64,
}

/// A SizeLimit that restricts serialized or deserialized messages from
/// exceeding a certain byte length.
#[derive(Copy, Clone, Debug)]
pub struct Bounded(pub u64);

/// A SizeLimit without a limit!
/// Use this if you don't care about the size of encoded or decoded messages.
#[derive(Copy, Clone, Debug)]
pub struct Infinite;

impl SizeLimit for Bounded {
    #[inline(always)]
    fn add(&mut self, n: u64) -> Result<(), LimitError> {
        if self.0 >= n {
            self.0 -= n;
            Ok(())
        } else {
            Err(LimitError {
                requested: n,
                remaining: self.0,
            })
        }
    }

    #[inline(always)]
    fn limit(&self) -> Option<u64> {
        Some(self.0)
    }
}

impl SizeLimit for Infinite {
    #[inline(always)]
    fn add(&mut self, _: u64) -> Result<(), LimitError> {
        Ok(())
    }

    #[inline(always)]
    fn limit(&self) -> Option<u64> {
        None
    }
}
