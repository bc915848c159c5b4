//! The one-byte structural prefix written in front of every object.
//!
//! | byte        | meaning                                    |
//! |-------------|--------------------------------------------|
//! | `0..=249`   | an object with that many members follows   |
//! | `250..=254` | reserved, never produced by this crate     |
//! | `255`       | null reference, nothing follows            |
//!
//! The same byte range is shared by union tags: a union is written as `[tag][object]`, where
//! `tag < 250`, and a null union is the single byte [NULL_OBJECT].

/// The largest member count that fits in a header byte.
pub const MAX_MEMBER_COUNT: u8 = 249;

/// First byte of the reserved band. Every byte from here up to and including [NULL_OBJECT] is a
/// sentinel.
pub const RESERVED_START: u8 = MAX_MEMBER_COUNT + 1;

/// The sentinel marking a null reference. Distinct from an object with zero members.
pub const NULL_OBJECT: u8 = 255;

/// A classified header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Header {
    /// An object with this many members follows. Always `<= MAX_MEMBER_COUNT`.
    MemberCount(u8),
    /// A null reference.
    Null,
    /// A reserved code in `RESERVED_START..NULL_OBJECT`.
    Reserved(u8),
}

impl Header {
    /// Builds a member-count header, or `None` if `count` falls in the reserved band.
    #[inline]
    pub const fn member_count(count: u8) -> Option<Header> {
        if count <= MAX_MEMBER_COUNT {
            Some(Header::MemberCount(count))
        } else {
            None
        }
    }

    /// Classifies a raw header byte.
    #[inline]
    pub const fn from_byte(byte: u8) -> Header {
        match byte {
            0..=MAX_MEMBER_COUNT => Header::MemberCount(byte),
            NULL_OBJECT => Header::Null,
            other => Header::Reserved(other),
        }
    }

    /// The raw byte this header is written as.
    #[inline]
    pub const fn to_byte(self) -> u8 {
        match self {
            Header::MemberCount(count) => count,
            Header::Null => NULL_OBJECT,
            Header::Reserved(code) => code,
        }
    }

    /// Returns `true` for the null sentinel.
    #[inline]
    pub const fn is_null(self) -> bool {
        matches!(self, Header::Null)
    }
}

impl From<u8> for Header {
    fn from(byte: u8) -> Self {
        Header::from_byte(byte)
    }
}
