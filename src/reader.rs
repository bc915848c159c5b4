#[cfg(feature = "alloc")]
use alloc::{string::String, vec::Vec};
use byteorder::ByteOrder;
use core::marker::PhantomData;

use crate::config::{DefaultOptions, Options, Order, SizeLimit};
use crate::error::DecodeError;
use crate::header::Header;
use crate::traits::Source;
use crate::writer::NULL_COLLECTION;

/// Upper bound on the capacity reserved up front for an owned collection. Larger collections grow
/// as their elements actually arrive, so a forged length cannot force a huge allocation.
pub(crate) const MAX_PREALLOCATION: usize = 4096;

/// The buffered span reader, dual of [Writer](crate::Writer).
///
/// It borrows a [Source] for one top-level decode and caches the region last obtained from it.
/// Consumed bytes are reported back to the source only when the cached region cannot satisfy a
/// request, or on [finish](Reader::finish).
///
/// Header bytes are validated before they are allowed to drive any further read.
pub struct Reader<'de, 's, R: Source<'de>, O: Options = DefaultOptions> {
    source: &'s mut R,
    options: O,
    region_len: usize,
    cursor: usize,
    consumed: u64,
    _lifetime: PhantomData<&'de ()>,
}

macro_rules! impl_read_fixed {
    ($(#[$doc:meta])* $name:ident : $ty:ty = $read:ident) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self) -> Result<$ty, DecodeError<R::Error>> {
            const SIZE: usize = core::mem::size_of::<$ty>();
            let value = <Order<O> as ByteOrder>::$read(&self.request(SIZE)?[..SIZE]);
            self.advance(SIZE)?;
            Ok(value)
        }
    };
}

impl<'de, 's, R: Source<'de>, O: Options> Reader<'de, 's, R, O> {
    /// Create a reader over `source`. Nothing is read until the first request.
    pub fn new(source: &'s mut R, options: O) -> Self {
        Self {
            source,
            options,
            region_len: 0,
            cursor: 0,
            consumed: 0,
            _lifetime: PhantomData,
        }
    }

    /// Returns a readable slice of at least `min_size` bytes starting at the cursor.
    ///
    /// Fails with [DecodeError::UnexpectedEnd] if the source cannot provide that many bytes.
    /// This never moves the cursor.
    pub fn request(&mut self, min_size: usize) -> Result<&[u8], DecodeError<R::Error>> {
        if self.region_len - self.cursor < min_size {
            self.refill(min_size)?;
        }
        Ok(&self.source.region()[self.cursor..self.region_len])
    }

    /// Marks `count` bytes at the cursor as consumed.
    ///
    /// `count` may not exceed what the last [request](Reader::request) returned.
    pub fn advance(&mut self, count: usize) -> Result<(), DecodeError<R::Error>> {
        let remaining = self.region_len - self.cursor;
        if count > remaining {
            return Err(DecodeError::AdvanceOutOfBounds { count, remaining });
        }
        self.options
            .limit()
            .add(count as u64)
            .map_err(DecodeError::LimitReached)?;
        self.cursor += count;
        Ok(())
    }

    /// Reports every consumed byte back to the source.
    pub fn finish(&mut self) {
        self.release();
        self.region_len = 0;
    }

    /// Total bytes consumed through this reader.
    pub fn consumed(&self) -> u64 {
        self.consumed + self.cursor as u64
    }

    /// The source this reader reads from.
    pub fn get_ref(&self) -> &R {
        self.source
    }

    /// Returns the next `len` bytes with the lifetime of the source's data, and consumes them.
    ///
    /// Only sources that implement [Source::borrowed_region] can lend data; others fail with
    /// [DecodeError::BorrowUnsupported].
    pub fn borrow(&mut self, len: usize) -> Result<&'de [u8], DecodeError<R::Error>> {
        self.request(len)?;
        let region = self
            .source
            .borrowed_region()
            .ok_or(DecodeError::BorrowUnsupported)?;
        let bytes = &region[self.cursor..self.cursor + len];
        self.advance(len)?;
        Ok(bytes)
    }

    /// Returns `true` if the source can lend data for [borrow](Reader::borrow).
    pub fn can_borrow(&self) -> bool {
        self.source.borrowed_region().is_some()
    }

    fn refill(&mut self, min_size: usize) -> Result<(), DecodeError<R::Error>> {
        self.release();
        let available = self
            .source
            .get_region(min_size)
            .map_err(DecodeError::Source)?;
        tracing::trace!(requested = min_size, available, "acquired read region");
        self.region_len = available;
        if available < min_size {
            tracing::debug!(needed = min_size, available, "unexpected end of data");
            return Err(DecodeError::UnexpectedEnd {
                needed: min_size,
                available,
            });
        }
        Ok(())
    }

    fn release(&mut self) {
        if self.cursor > 0 {
            self.source.advance(self.cursor);
            self.consumed += self.cursor as u64;
            self.region_len -= self.cursor;
            self.cursor = 0;
        }
    }

    #[inline]
    fn read_byte(&mut self) -> Result<u8, DecodeError<R::Error>> {
        let byte = self.request(1)?[0];
        self.advance(1)?;
        Ok(byte)
    }

    /// Reads and classifies an object header. Reserved codes are returned, not rejected.
    pub fn read_object_header(&mut self) -> Result<Header, DecodeError<R::Error>> {
        self.read_byte().map(Header::from_byte)
    }

    /// Reads an object header that must be either a member count or null.
    ///
    /// Returns `None` for null. Reserved codes fail with [DecodeError::ReservedHeader].
    pub fn read_object_header_or_null(&mut self) -> Result<Option<u8>, DecodeError<R::Error>> {
        match self.read_object_header()? {
            Header::MemberCount(count) => Ok(Some(count)),
            Header::Null => Ok(None),
            Header::Reserved(code) => {
                tracing::debug!(code, "reserved object header");
                Err(DecodeError::ReservedHeader(code))
            }
        }
    }

    /// Reads the header of a non-null object that must declare exactly `member_count` members.
    pub fn expect_object_header(&mut self, member_count: usize) -> Result<(), DecodeError<R::Error>> {
        match self.read_object_header_or_null()? {
            Some(found) => check_member_count(member_count, found),
            None => {
                tracing::debug!("null object where a value is required");
                Err(DecodeError::UnexpectedNull)
            }
        }
    }

    /// Reads a union tag. Returns `None` for a null union.
    pub fn read_union_header(&mut self) -> Result<Option<u8>, DecodeError<R::Error>> {
        match self.read_object_header()? {
            Header::MemberCount(tag) => Ok(Some(tag)),
            Header::Null => Ok(None),
            Header::Reserved(code) => {
                tracing::debug!(code, "reserved union header");
                Err(DecodeError::ReservedHeader(code))
            }
        }
    }

    /// Reads a collection length prefix. Returns `None` for a null collection.
    pub fn read_collection_header(&mut self) -> Result<Option<usize>, DecodeError<R::Error>> {
        match self.read_u32()? {
            NULL_COLLECTION => Ok(None),
            len => Ok(Some(len as usize)),
        }
    }

    /// Reads a collection length prefix that must not be null.
    pub fn expect_collection_header(&mut self) -> Result<usize, DecodeError<R::Error>> {
        self.read_collection_header()?.ok_or_else(|| {
            tracing::debug!("null collection where a value is required");
            DecodeError::UnexpectedNull
        })
    }

    /// Fills `buffer` with the next bytes, gathering them from as many regions as needed.
    pub fn read_raw(&mut self, mut buffer: &mut [u8]) -> Result<(), DecodeError<R::Error>> {
        while !buffer.is_empty() {
            let region = self.request(1)?;
            let count = region.len().min(buffer.len());
            buffer[..count].copy_from_slice(&region[..count]);
            self.advance(count)?;
            buffer = &mut buffer[count..];
        }
        Ok(())
    }

    /// Reads a length-prefixed byte slice without copying it.
    pub fn read_borrowed_bytes(&mut self) -> Result<&'de [u8], DecodeError<R::Error>> {
        let len = self.expect_collection_header()?;
        self.borrow(len)
    }

    /// Reads a length-prefixed UTF-8 string without copying it.
    pub fn read_borrowed_str(&mut self) -> Result<&'de str, DecodeError<R::Error>> {
        let bytes = self.read_borrowed_bytes()?;
        Ok(core::str::from_utf8(bytes)?)
    }

    /// Reads `len` raw bytes into a new vector.
    #[cfg(feature = "alloc")]
    pub fn read_raw_vec(&mut self, len: usize) -> Result<Vec<u8>, DecodeError<R::Error>> {
        let mut bytes = Vec::with_capacity(len.min(MAX_PREALLOCATION));
        while bytes.len() < len {
            let region = self.request(1)?;
            let count = region.len().min(len - bytes.len());
            bytes.extend_from_slice(&region[..count]);
            self.advance(count)?;
        }
        Ok(bytes)
    }

    /// Reads a length-prefixed byte slice into a new vector. Returns `None` for null.
    #[cfg(feature = "alloc")]
    pub fn read_byte_vec(&mut self) -> Result<Option<Vec<u8>>, DecodeError<R::Error>> {
        match self.read_collection_header()? {
            Some(len) => self.read_raw_vec(len).map(Some),
            None => Ok(None),
        }
    }

    /// Reads a length-prefixed UTF-8 string into a new `String`. Returns `None` for null.
    #[cfg(feature = "alloc")]
    pub fn read_string(&mut self) -> Result<Option<String>, DecodeError<R::Error>> {
        match self.read_byte_vec()? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| DecodeError::from(e.utf8_error())),
            None => Ok(None),
        }
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> Result<u8, DecodeError<R::Error>> {
        self.read_byte()
    }

    /// Reads an `i8`.
    pub fn read_i8(&mut self) -> Result<i8, DecodeError<R::Error>> {
        self.read_byte().map(|b| b as i8)
    }

    /// Reads a bool. Only `0` and `1` are accepted.
    pub fn read_bool(&mut self) -> Result<bool, DecodeError<R::Error>> {
        match self.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            value => {
                tracing::debug!(value, "invalid bool");
                Err(DecodeError::InvalidBool(value))
            }
        }
    }

    /// Reads a char from its `u32` scalar value.
    pub fn read_char(&mut self) -> Result<char, DecodeError<R::Error>> {
        let value = self.read_u32()?;
        char::from_u32(value).ok_or_else(|| {
            tracing::debug!(value, "invalid char");
            DecodeError::InvalidChar(value)
        })
    }

    impl_read_fixed!(
        /// Reads a `u16`.
        read_u16: u16 = read_u16
    );
    impl_read_fixed!(
        /// Reads a `u32`.
        read_u32: u32 = read_u32
    );
    impl_read_fixed!(
        /// Reads a `u64`.
        read_u64: u64 = read_u64
    );
    impl_read_fixed!(
        /// Reads a `u128`.
        read_u128: u128 = read_u128
    );
    impl_read_fixed!(
        /// Reads an `i16`.
        read_i16: i16 = read_i16
    );
    impl_read_fixed!(
        /// Reads an `i32`.
        read_i32: i32 = read_i32
    );
    impl_read_fixed!(
        /// Reads an `i64`.
        read_i64: i64 = read_i64
    );
    impl_read_fixed!(
        /// Reads an `i128`.
        read_i128: i128 = read_i128
    );
    impl_read_fixed!(
        /// Reads an `f32`.
        read_f32: f32 = read_f32
    );
    impl_read_fixed!(
        /// Reads an `f64`.
        read_f64: f64 = read_f64
    );
}

/// Checks a decoded member count against the count a type declares.
pub fn check_member_count<E>(expected: usize, found: u8) -> Result<(), DecodeError<E>> {
    if found as usize == expected {
        Ok(())
    } else {
        tracing::debug!(expected, found, "member count mismatch");
        Err(DecodeError::MemberCountMismatch { expected, found })
    }
}

/// The error for a union tag that names no variant of the type being decoded.
pub fn unknown_tag<E>(tag: u8) -> DecodeError<E> {
    tracing::debug!(tag, "unknown union tag");
    DecodeError::InvalidTag(tag)
}
