#![warn(missing_docs)]
#![no_std]

//! Span-buffered binary object serialization
//!
//! This crate encodes values into caller-supplied byte sinks and decodes them from byte sources
//! without intermediate allocation. It works on microcontrollers as well as on servers: with the
//! `alloc` feature disabled it only needs `core`.
//!
//! The writer never pushes bytes one by one into its destination. A [Sink] hands out writable
//! regions; the [Writer] caches one region, lets codecs write straight into it, and commits the
//! produced prefix back to the sink only when the region runs out or on flush. The [Reader] is
//! the same thing in reverse over a [Source].
//!
//! ### Wire format
//!
//! Every object starts with one [header](header) byte:
//!
//! - `0..=249`: the object has that many members, which follow in declared order.
//! - `255`: the object is null. Nothing follows.
//! - `250..=254`: reserved. Never written, and rejected where a header is read.
//!
//! Members are encoded back to back. Fixed-width primitives are written in the configured byte
//! order (little-endian by default). Strings, byte slices and sequences carry a `u32` length
//! prefix, where `u32::MAX` is a null collection. A union value is a tag byte (`< 250`) followed
//! by the variant's own object, and a null union is the single byte `255`.
//!
//! The format is not self-describing: the reader must know the shape it expects. That shape
//! comes either from the [Pack]/[Unpack] traits (see [pack_object!] and [pack_union!]) or from
//! `serde` derives through [serialize] and [deserialize].
//!
//! ```
//! use spanpack_core::{pack_object, DefaultOptions, SliceSink};
//!
//! #[derive(Debug, PartialEq)]
//! struct Reading {
//!     sensor: u8,
//!     value: i16,
//!     label: Option<Label>,
//! }
//!
//! #[derive(Debug, PartialEq)]
//! struct Label {
//!     code: u16,
//! }
//!
//! pack_object!(Reading { sensor: u8, value: i16, label: Option<Label> });
//! pack_object!(Label { code: u16 });
//!
//! let reading = Reading { sensor: 3, value: -20, label: None };
//! let mut buffer = [0u8; 32];
//! let mut sink = SliceSink::new(&mut buffer);
//! spanpack_core::pack(&reading, &mut sink, DefaultOptions::new()).unwrap();
//! assert_eq!(sink.written_buffer(), &[3, 3, 0xEC, 0xFF, 255]);
//!
//! let len = sink.written_len();
//! let decoded: Reading =
//!     spanpack_core::unpack_from_slice(&buffer[..len], DefaultOptions::new()).unwrap();
//! assert_eq!(decoded, reading);
//! ```

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod config;
pub mod deserialize;
pub mod error;
pub mod header;
pub mod serialize;
pub mod traits;

mod buffer_writer;
mod pack;
mod reader;
#[cfg(feature = "alloc")]
mod size_checker;
mod writer;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;
use core::convert::Infallible;

pub use self::buffer_writer::{SliceSink, SliceSinkError};
#[cfg(feature = "alloc")]
pub use self::buffer_writer::{VecSink, MIN_GROWTH};
pub use self::config::{DefaultOptions, Options};
pub use self::deserialize::deserialize;
pub use self::error::{DecodeError, EncodeError};
pub use self::header::Header;
pub use self::pack::{Pack, PackObject, Unpack};
pub use self::reader::{check_member_count, unknown_tag, Reader};
pub use self::serialize::serialize;
#[cfg(feature = "alloc")]
pub use self::size_checker::CountingSink;
pub use self::traits::{Sink, SliceSource, Source};
pub use self::writer::{Writer, NULL_COLLECTION};

use self::config::TrailingBytes;

/// Pack a value into a [Sink] and flush.
pub fn pack<T: Pack + ?Sized, S: Sink, O: Options>(
    value: &T,
    sink: &mut S,
    options: O,
) -> Result<(), EncodeError<S::Error>> {
    let mut writer = Writer::new(sink, options);
    value.pack(&mut writer)?;
    writer.flush()
}

/// Unpack a value from a [Source]. Bytes after the value are left in the source.
pub fn unpack<'de, T: Unpack<'de>, R: Source<'de>, O: Options>(
    source: &mut R,
    options: O,
) -> Result<T, DecodeError<R::Error>> {
    let mut reader = Reader::new(source, options);
    let value = T::unpack(&mut reader)?;
    reader.finish();
    Ok(value)
}

/// Unpack a value from a byte slice. Strings and byte slices are borrowed from `bytes`.
///
/// Leftover bytes are an error unless the options allow trailing bytes.
pub fn unpack_from_slice<'de, T: Unpack<'de>, O: Options>(
    bytes: &'de [u8],
    options: O,
) -> Result<T, DecodeError<Infallible>> {
    let mut source = SliceSource::new(bytes);
    let value = unpack(&mut source, options)?;
    check_trailing::<O>(&source)?;
    Ok(value)
}

/// Deserialize a serde value from a byte slice. Strings and byte slices are borrowed from `bytes`.
///
/// Leftover bytes are an error unless the options allow trailing bytes.
pub fn from_slice<'de, T: serde::Deserialize<'de>, O: Options>(
    bytes: &'de [u8],
    options: O,
) -> Result<T, DecodeError<Infallible>> {
    let mut source = SliceSource::new(bytes);
    let value = deserialize(&mut source, options)?;
    check_trailing::<O>(&source)?;
    Ok(value)
}

fn check_trailing<O: Options>(source: &SliceSource<'_>) -> Result<(), DecodeError<Infallible>> {
    let left = source.remaining().len();
    if left > 0 && O::Trailing::reject() {
        tracing::debug!(left, "trailing bytes after value");
        return Err(DecodeError::TrailingBytes(left));
    }
    Ok(())
}

/// Pack a value into a new `Vec<u8>`.
#[cfg(feature = "alloc")]
pub fn pack_to_vec<T: Pack + ?Sized, O: Options>(
    value: &T,
    options: O,
) -> Result<Vec<u8>, EncodeError<Infallible>> {
    let mut sink = VecSink::new();
    pack(value, &mut sink, options)?;
    Ok(sink.into_inner())
}

/// Serialize a serde value into a new `Vec<u8>`.
#[cfg(feature = "alloc")]
pub fn to_vec<T: serde::Serialize + ?Sized, O: Options>(
    value: &T,
    options: O,
) -> Result<Vec<u8>, EncodeError<Infallible>> {
    let mut sink = VecSink::new();
    serialize(value, &mut sink, options)?;
    Ok(sink.into_inner())
}

/// Return the number of bytes `value` packs to.
#[cfg(feature = "alloc")]
pub fn packed_size<T: Pack + ?Sized, O: Options>(
    value: &T,
    options: O,
) -> Result<u64, EncodeError<Infallible>> {
    size_checker::packed_size(value, options)
}

/// Return the number of bytes `value` serializes to.
#[cfg(feature = "alloc")]
pub fn serialized_size<T: serde::Serialize + ?Sized, O: Options>(
    value: &T,
    options: O,
) -> Result<u64, EncodeError<Infallible>> {
    size_checker::serialized_size(value, options)
}
