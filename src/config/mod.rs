//! Encoding options, resolved at compile time.
//!
//! Every option is a marker type carried in the type of a [Config]. The writer and reader read
//! them through associated types, so choosing big-endian or a byte limit costs nothing at runtime
//! beyond the limit counter itself.
//!
//! ```
//! use spanpack_core::config::Options;
//! use spanpack_core::DefaultOptions;
//!
//! let options = DefaultOptions::new().with_big_endian().with_limit(64);
//! let bytes = options.pack_to_vec(&0x0102u16).unwrap();
//! assert_eq!(bytes, [1, 2]);
//! ```

use core::convert::Infallible;
use core::marker::PhantomData;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

pub(crate) use self::internal::{InternalOptions, Order};

pub use self::endian::{BigEndian, LittleEndian, NativeEndian, WireByteOrder};
pub use self::limit::{Bounded, Infinite, LimitError, SizeLimit};
pub use self::trailing::{AllowTrailing, RejectTrailing, TrailingBytes};
use crate::{
    error::{DecodeError, EncodeError},
    pack::{Pack, Unpack},
    traits::{Sink, Source},
};

mod endian;
mod internal;
mod limit;
mod trailing;

/// A full set of options: byte limit `L`, byte order `E` and trailing-bytes behavior `T`.
///
/// Only the limit has runtime state. Build one from [DefaultOptions::new] and the [Options]
/// methods rather than naming the parameters by hand.
#[derive(Copy, Clone, Debug)]
pub struct Config<L, E, T> {
    limit: L,
    _markers: PhantomData<(E, T)>,
}

impl<L, E, T> Config<L, E, T> {
    #[inline(always)]
    pub(crate) fn from_limit(limit: L) -> Self {
        Config {
            limit,
            _markers: PhantomData,
        }
    }
}

/// Unlimited, little-endian, trailing bytes rejected.
pub type DefaultOptions = Config<Infinite, LittleEndian, RejectTrailing>;

impl DefaultOptions {
    /// Get a default configuration object.
    ///
    /// | Byte limit | Endianness | Trailing bytes |
    /// |------------|------------|----------------|
    /// | Unlimited  | Little     | Rejected       |
    pub fn new() -> DefaultOptions {
        Config::from_limit(Infinite)
    }
}

impl Default for DefaultOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder and convenience methods shared by every [Config].
///
/// The byte limit is charged on every `advance`, by the writer and the reader alike. A forged
/// collection length therefore cannot make a decode consume more input than the caller allowed,
/// and an encode cannot produce more output than the limit.
///
/// Endianness applies uniformly to every multi-byte primitive and length prefix in one call.
///
/// Trailing bytes only matter to the slice entry points ([from_slice](crate::from_slice),
/// [unpack_from_slice](crate::unpack_from_slice)); the source-based ones leave leftovers in the
/// source.
pub trait Options: InternalOptions + Sized {
    /// Removes the byte limit. This is the default.
    fn with_no_limit(self) -> Config<Infinite, Self::Endian, Self::Trailing> {
        Config::from_limit(Infinite)
    }

    /// Caps every top-level call at `limit` bytes.
    fn with_limit(self, limit: u64) -> Config<Bounded, Self::Endian, Self::Trailing> {
        Config::from_limit(Bounded(limit))
    }

    /// Little-endian multi-byte values. This is the default.
    fn with_little_endian(mut self) -> Config<Self::Limit, LittleEndian, Self::Trailing> {
        Config::from_limit(*self.limit())
    }

    /// Big-endian multi-byte values.
    fn with_big_endian(mut self) -> Config<Self::Limit, BigEndian, Self::Trailing> {
        Config::from_limit(*self.limit())
    }

    /// Multi-byte values in the byte order of the machine running the code.
    fn with_native_endian(mut self) -> Config<Self::Limit, NativeEndian, Self::Trailing> {
        Config::from_limit(*self.limit())
    }

    /// Bytes left over after a value decoded from a slice are an error. This is the default.
    fn reject_trailing_bytes(mut self) -> Config<Self::Limit, Self::Endian, RejectTrailing> {
        Config::from_limit(*self.limit())
    }

    /// Bytes left over after a value decoded from a slice are ignored.
    fn allow_trailing_bytes(mut self) -> Config<Self::Limit, Self::Endian, AllowTrailing> {
        Config::from_limit(*self.limit())
    }

    /// Packs `value` into `sink` and flushes.
    #[inline(always)]
    fn pack_into<S: Sink, T: ?Sized + Pack>(
        self,
        sink: &mut S,
        value: &T,
    ) -> Result<(), EncodeError<S::Error>> {
        crate::pack(value, sink, self)
    }

    /// Serializes a serde value into `sink` and flushes.
    ///
    /// Bytes committed before a failure stay in the sink.
    #[inline(always)]
    fn serialize_into<S: Sink, T: ?Sized + serde::Serialize>(
        self,
        sink: &mut S,
        value: &T,
    ) -> Result<(), EncodeError<S::Error>> {
        crate::serialize::serialize(value, sink, self)
    }

    /// Packs `value` into a new vector.
    #[cfg(feature = "alloc")]
    fn pack_to_vec<T: ?Sized + Pack>(self, value: &T) -> Result<Vec<u8>, EncodeError<Infallible>> {
        crate::pack_to_vec(value, self)
    }

    /// Bytes `value` packs to under these options.
    #[cfg(feature = "alloc")]
    fn packed_size<T: ?Sized + Pack>(self, value: &T) -> Result<u64, EncodeError<Infallible>> {
        crate::size_checker::packed_size(value, self)
    }

    /// Bytes a serde value serializes to under these options.
    #[cfg(feature = "alloc")]
    fn serialized_size<T: ?Sized + serde::Serialize>(
        self,
        value: &T,
    ) -> Result<u64, EncodeError<Infallible>> {
        crate::size_checker::serialized_size(value, self)
    }

    /// Unpacks a value from a slice, borrowing strings and byte slices from it.
    #[inline(always)]
    fn unpack_slice<'a, T: Unpack<'a>>(self, bytes: &'a [u8]) -> Result<T, DecodeError<Infallible>> {
        crate::unpack_from_slice(bytes, self)
    }

    /// Deserializes a serde value from a slice, borrowing strings and byte slices from it.
    #[inline(always)]
    fn deserialize_slice<'a, T: serde::Deserialize<'a>>(
        self,
        bytes: &'a [u8],
    ) -> Result<T, DecodeError<Infallible>> {
        crate::from_slice(bytes, self)
    }

    /// Deserializes a serde value from `source`.
    ///
    /// On error the source may have been advanced past part of the value.
    #[inline(always)]
    fn deserialize_from<'de, R: Source<'de>, T: serde::Deserialize<'de>>(
        self,
        source: &mut R,
    ) -> Result<T, DecodeError<R::Error>> {
        crate::deserialize::deserialize(source, self)
    }
}

impl<O: InternalOptions> Options for O {}

impl<L, E, T> InternalOptions for Config<L, E, T>
where
    L: SizeLimit + Copy + 'static,
    E: WireByteOrder + 'static,
    T: TrailingBytes + 'static,
{
    type Limit = L;
    type Endian = E;
    type Trailing = T;

    #[inline(always)]
    fn limit(&mut self) -> &mut L {
        &mut self.limit
    }
}
