/// Decides what the slice entry points do with bytes left over after the top-level value.
pub trait TrailingBytes {
    /// Returns `true` if leftover bytes should be reported as an error.
    fn reject() -> bool;
}

/// Leftover bytes are an error. This is the default.
#[derive(Copy, Clone, Debug)]
pub struct RejectTrailing;

/// Leftover bytes are ignored.
#[derive(Copy, Clone, Debug)]
pub struct AllowTrailing;

impl TrailingBytes for RejectTrailing {
    #[inline(always)]
    fn reject() -> bool {
        true
    }
}

impl TrailingBytes for AllowTrailing {
    #[inline(always)]
    fn reject() -> bool {
        false
    }
}
