//! Errors returned by the [Writer](crate::Writer) and the [Reader](crate::Reader).
//!
//! Every error falls into one of two classes:
//! - *usage errors*: the codec layered above the writer or reader broke a contract, e.g. advancing
//!   past the granted region or writing a member count inside the reserved header band.
//! - *data errors*: the bytes being read are truncated, corrupted or adversarial.
//!
//! Both abort the current top-level call. Nothing in this crate tries to continue after one.

#[cfg(feature = "alloc")]
use alloc::string::String;
use core::str::Utf8Error;

use crate::config::LimitError;

/// Any error that can occur while encoding a value.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EncodeError<E> {
    /// The sink failed to grant a region or to accept a commit.
    #[error("sink error: {0:?}")]
    Sink(E),

    /// An `advance` would move the cursor past the region granted by the last `request`.
    #[error("cannot advance {count} bytes, only {remaining} remain in the granted region")]
    AdvanceOutOfBounds {
        /// Bytes the caller tried to advance by.
        count: usize,
        /// Bytes that were left between the cursor and the end of the region.
        remaining: usize,
    },

    /// The sink granted a region shorter than the writer asked for.
    #[error("sink granted {granted} bytes, at least {requested} were requested")]
    RegionTooSmall {
        /// The minimum size passed to the sink.
        requested: usize,
        /// The size of the region the sink returned.
        granted: usize,
    },

    /// A member count would collide with the reserved header band.
    #[error("member count {0} is outside the header range 0..=249")]
    HeaderOutOfRange(usize),

    /// A union tag would collide with the reserved header band.
    #[error("union tag {0} is outside the tag range 0..=249")]
    TagOutOfRange(u32),

    /// A collection has too many elements for its `u32` length prefix.
    #[error("collection of {0} elements does not fit a length prefix")]
    CollectionTooLarge(usize),

    /// The configured byte limit was exceeded.
    #[error("byte limit reached ({0:?})")]
    LimitReached(LimitError),

    /// A serde sequence or map was serialized without a known length.
    #[error("sequence does not have a length")]
    SequenceMustHaveLength,

    /// A serde `Serialize` impl raised its own error.
    #[cfg(feature = "alloc")]
    #[error("{0}")]
    Custom(String),

    /// A serde `Serialize` impl raised its own error.
    #[cfg(not(feature = "alloc"))]
    #[error("custom serialization error")]
    Custom,
}

impl<E> EncodeError<E> {
    /// Returns `true` if this error was caused by a codec breaking the writer's contracts.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            EncodeError::AdvanceOutOfBounds { .. }
                | EncodeError::RegionTooSmall { .. }
                | EncodeError::HeaderOutOfRange(_)
                | EncodeError::TagOutOfRange(_)
                | EncodeError::CollectionTooLarge(_)
                | EncodeError::SequenceMustHaveLength
        )
    }

    /// Returns `true` if the value being encoded does not fit the configured limit.
    pub fn is_data_error(&self) -> bool {
        matches!(self, EncodeError::LimitReached(_))
    }
}

/// Any error that can occur while decoding a value.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError<E> {
    /// The source failed to produce a region.
    #[error("source error: {0:?}")]
    Source(E),

    /// An `advance` would move the cursor past the region granted by the last `request`.
    #[error("cannot advance {count} bytes, only {remaining} remain in the granted region")]
    AdvanceOutOfBounds {
        /// Bytes the caller tried to advance by.
        count: usize,
        /// Bytes that were left between the cursor and the end of the region.
        remaining: usize,
    },

    /// The source ran out of data before a request could be satisfied.
    #[error("unexpected end of data: needed {needed} bytes, {available} available")]
    UnexpectedEnd {
        /// Bytes the decoder needed.
        needed: usize,
        /// Bytes the source could provide.
        available: usize,
    },

    /// A reserved header code was found where a member count or null was expected.
    #[error("reserved header code {0}")]
    ReservedHeader(u8),

    /// A null header was found where a value is required.
    #[error("unexpected null object")]
    UnexpectedNull,

    /// An object header declared a different number of members than the type has.
    #[error("expected an object with {expected} members, found {found}")]
    MemberCountMismatch {
        /// Members declared by the type being decoded.
        expected: usize,
        /// Members declared by the header.
        found: u8,
    },

    /// Invalid bool value. Only `0` and `1` are valid values.
    #[error("invalid bool value {0}, expected 0 or 1")]
    InvalidBool(u8),

    /// The value is not a valid unicode scalar value.
    #[error("invalid char value {0:#x}")]
    InvalidChar(u32),

    /// A string was not valid UTF-8.
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(Utf8Error),

    /// A union tag does not name any variant of the type being decoded.
    #[error("unknown union tag {0}")]
    InvalidTag(u8),

    /// The configured byte limit was exceeded.
    #[error("byte limit reached ({0:?})")]
    LimitReached(LimitError),

    /// Bytes were left over after the top-level value and the options reject them.
    #[error("{0} trailing bytes after the value")]
    TrailingBytes(usize),

    /// Zero-copy borrowing was requested from a source that cannot lend its data.
    #[error("the source cannot lend borrowed data")]
    BorrowUnsupported,

    /// The requested operation needs a self-describing format.
    #[error("{0} is not supported by this format")]
    Unsupported(&'static str),

    /// A serde `Deserialize` impl raised its own error.
    #[cfg(feature = "alloc")]
    #[error("{0}")]
    Custom(String),

    /// A serde `Deserialize` impl raised its own error.
    #[cfg(not(feature = "alloc"))]
    #[error("custom deserialization error")]
    Custom,
}

impl<E> DecodeError<E> {
    /// Returns `true` if this error was caused by a codec breaking the reader's contracts.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            DecodeError::AdvanceOutOfBounds { .. }
                | DecodeError::BorrowUnsupported
                | DecodeError::Unsupported(_)
        )
    }

    /// Returns `true` if this error was caused by the input bytes.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            DecodeError::UnexpectedEnd { .. }
                | DecodeError::ReservedHeader(_)
                | DecodeError::UnexpectedNull
                | DecodeError::MemberCountMismatch { .. }
                | DecodeError::InvalidBool(_)
                | DecodeError::InvalidChar(_)
                | DecodeError::InvalidUtf8(_)
                | DecodeError::InvalidTag(_)
                | DecodeError::LimitReached(_)
                | DecodeError::TrailingBytes(_)
                // serde raises invalid input through `de::Error::custom`
                | DecodeError::Custom { .. }
        )
    }
}

impl<E> From<Utf8Error> for DecodeError<E> {
    fn from(err: Utf8Error) -> Self {
        tracing::debug!(valid_up_to = err.valid_up_to(), "invalid UTF-8 in string");
        DecodeError::InvalidUtf8(err)
    }
}
