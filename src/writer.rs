use byteorder::ByteOrder;

use crate::config::{DefaultOptions, Options, Order, SizeLimit};
use crate::error::EncodeError;
use crate::header::{MAX_MEMBER_COUNT, NULL_OBJECT};
use crate::traits::Sink;

/// Length prefix marking a null collection or string.
pub const NULL_COLLECTION: u32 = u32::MAX;

/// The buffered span writer.
///
/// A `Writer` borrows a [Sink] for one top-level encode and caches a single region obtained from
/// it. Callers ask for contiguous space with [request](Writer::request), write into it, and
/// report what they wrote with [advance](Writer::advance). The sink only sees a `get_region`
/// call when the cached region runs out, and a `commit` right before that (or on
/// [flush](Writer::flush)).
///
/// The writer never keeps a slice of the region across calls: it only remembers the region's
/// length and a cursor, and re-borrows the bytes from the sink each time. Once a prefix has been
/// committed the writer forgets the region entirely.
///
/// Nothing is committed on drop. Call [flush](Writer::flush) once the top-level value is written;
/// the crate's entry points ([pack](crate::pack), [serialize](crate::serialize)) do so.
pub struct Writer<'s, S: Sink, O: Options = DefaultOptions> {
    sink: &'s mut S,
    options: O,
    region_len: usize,
    cursor: usize,
    committed: u64,
}

macro_rules! impl_write_fixed {
    ($(#[$doc:meta])* $name:ident : $ty:ty = $write:ident) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, value: $ty) -> Result<(), EncodeError<S::Error>> {
            const SIZE: usize = core::mem::size_of::<$ty>();
            let region = self.request(SIZE)?;
            <Order<O> as ByteOrder>::$write(&mut region[..SIZE], value);
            self.advance(SIZE)
        }
    };
}

impl<'s, S: Sink, O: Options> Writer<'s, S, O> {
    /// Create a writer over `sink`. No region is acquired until the first request.
    pub fn new(sink: &'s mut S, options: O) -> Self {
        Self {
            sink,
            options,
            region_len: 0,
            cursor: 0,
            committed: 0,
        }
    }

    /// Returns a writable slice of at least `min_size` bytes starting at the cursor.
    ///
    /// If the cached region still has `min_size` bytes after the cursor, they are returned and the
    /// sink is not called. Otherwise everything written so far is committed, and a fresh region
    /// of at least `min_size` bytes is requested from the sink.
    ///
    /// This never moves the cursor. Call [advance](Writer::advance) after writing.
    pub fn request(&mut self, min_size: usize) -> Result<&mut [u8], EncodeError<S::Error>> {
        if self.region_len - self.cursor < min_size {
            self.acquire(min_size)?;
        }
        let (cursor, end) = (self.cursor, self.region_len);
        Ok(&mut self.sink.region_mut()[cursor..end])
    }

    /// Marks `count` bytes at the cursor as written.
    ///
    /// `count` may not exceed what the last [request](Writer::request) returned. On failure the
    /// cursor does not move.
    pub fn advance(&mut self, count: usize) -> Result<(), EncodeError<S::Error>> {
        let remaining = self.region_len - self.cursor;
        if count > remaining {
            return Err(EncodeError::AdvanceOutOfBounds { count, remaining });
        }
        self.options
            .limit()
            .add(count as u64)
            .map_err(EncodeError::LimitReached)?;
        self.cursor += count;
        Ok(())
    }

    /// Commits every byte written into the cached region and releases it.
    pub fn flush(&mut self) -> Result<(), EncodeError<S::Error>> {
        self.commit_pending()?;
        self.region_len = 0;
        Ok(())
    }

    /// Total bytes written through this writer, committed or not.
    pub fn written(&self) -> u64 {
        self.committed + self.cursor as u64
    }

    /// Bytes written into the cached region that the sink has not seen yet.
    pub fn pending(&self) -> usize {
        self.cursor
    }

    /// The sink this writer writes to.
    pub fn get_ref(&self) -> &S {
        self.sink
    }

    fn acquire(&mut self, min_size: usize) -> Result<(), EncodeError<S::Error>> {
        self.commit_pending()?;
        self.region_len = 0;
        let granted = self
            .sink
            .get_region(min_size)
            .map_err(EncodeError::Sink)?;
        tracing::trace!(requested = min_size, granted, "acquired write region");
        if granted < min_size {
            return Err(EncodeError::RegionTooSmall {
                requested: min_size,
                granted,
            });
        }
        self.region_len = granted;
        Ok(())
    }

    fn commit_pending(&mut self) -> Result<(), EncodeError<S::Error>> {
        if self.cursor > 0 {
            self.sink.commit(self.cursor).map_err(EncodeError::Sink)?;
            tracing::trace!(count = self.cursor, "committed write region");
            self.committed += self.cursor as u64;
            self.cursor = 0;
        }
        Ok(())
    }

    #[inline]
    fn write_byte(&mut self, byte: u8) -> Result<(), EncodeError<S::Error>> {
        self.request(1)?[0] = byte;
        self.advance(1)
    }

    /// Writes the header of an object with `member_count` members.
    ///
    /// Counts in the reserved band (`>= 250`) are rejected with
    /// [EncodeError::HeaderOutOfRange]; they are never truncated or reinterpreted.
    pub fn write_object_header(&mut self, member_count: u8) -> Result<(), EncodeError<S::Error>> {
        if member_count > MAX_MEMBER_COUNT {
            return Err(EncodeError::HeaderOutOfRange(member_count as usize));
        }
        self.write_byte(member_count)
    }

    /// Writes the null sentinel in place of an object.
    pub fn write_null_object_header(&mut self) -> Result<(), EncodeError<S::Error>> {
        self.write_byte(NULL_OBJECT)
    }

    /// Writes the tag of a union variant. The variant's own object must follow.
    pub fn write_union_header(&mut self, tag: u8) -> Result<(), EncodeError<S::Error>> {
        if tag > MAX_MEMBER_COUNT {
            return Err(EncodeError::TagOutOfRange(tag as u32));
        }
        self.write_byte(tag)
    }

    /// Writes a null union.
    pub fn write_null_union_header(&mut self) -> Result<(), EncodeError<S::Error>> {
        self.write_byte(NULL_OBJECT)
    }

    /// Writes the length prefix of a collection, string or byte slice.
    pub fn write_collection_header(&mut self, len: usize) -> Result<(), EncodeError<S::Error>> {
        match u32::try_from(len) {
            Ok(len) if len != NULL_COLLECTION => self.write_u32(len),
            _ => Err(EncodeError::CollectionTooLarge(len)),
        }
    }

    /// Writes the length prefix of a null collection.
    pub fn write_null_collection_header(&mut self) -> Result<(), EncodeError<S::Error>> {
        self.write_u32(NULL_COLLECTION)
    }

    /// Writes `bytes` as is, spreading them over as many regions as needed.
    pub fn write_raw(&mut self, mut bytes: &[u8]) -> Result<(), EncodeError<S::Error>> {
        while !bytes.is_empty() {
            let region = self.request(1)?;
            let count = region.len().min(bytes.len());
            region[..count].copy_from_slice(&bytes[..count]);
            self.advance(count)?;
            bytes = &bytes[count..];
        }
        Ok(())
    }

    /// Writes a length-prefixed byte slice.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError<S::Error>> {
        self.write_collection_header(bytes.len())?;
        self.write_raw(bytes)
    }

    /// Writes a length-prefixed UTF-8 string.
    pub fn write_str(&mut self, value: &str) -> Result<(), EncodeError<S::Error>> {
        self.write_bytes(value.as_bytes())
    }

    /// Writes a `u8`.
    pub fn write_u8(&mut self, value: u8) -> Result<(), EncodeError<S::Error>> {
        self.write_byte(value)
    }

    /// Writes an `i8`.
    pub fn write_i8(&mut self, value: i8) -> Result<(), EncodeError<S::Error>> {
        self.write_byte(value as u8)
    }

    /// Writes a bool as `0` or `1`.
    pub fn write_bool(&mut self, value: bool) -> Result<(), EncodeError<S::Error>> {
        self.write_byte(value as u8)
    }

    /// Writes a char as its `u32` scalar value.
    pub fn write_char(&mut self, value: char) -> Result<(), EncodeError<S::Error>> {
        self.write_u32(value as u32)
    }

    impl_write_fixed!(
        /// Writes a `u16`.
        write_u16: u16 = write_u16
    );
    impl_write_fixed!(
        /// Writes a `u32`.
        write_u32: u32 = write_u32
    );
    impl_write_fixed!(
        /// Writes a `u64`.
        write_u64: u64 = write_u64
    );
    impl_write_fixed!(
        /// Writes a `u128`.
        write_u128: u128 = write_u128
    );
    impl_write_fixed!(
        /// Writes an `i16`.
        write_i16: i16 = write_i16
    );
    impl_write_fixed!(
        /// Writes an `i32`.
        write_i32: i32 = write_i32
    );
    impl_write_fixed!(
        /// Writes an `i64`.
        write_i64: i64 = write_i64
    );
    impl_write_fixed!(
        /// Writes an `i128`.
        write_i128: i128 = write_i128
    );
    impl_write_fixed!(
        /// Writes an `f32`.
        write_f32: f32 = write_f32
    );
    impl_write_fixed!(
        /// Writes an `f64`.
        write_f64: f64 = write_f64
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SliceSink;

    #[test]
    fn primitives_are_little_endian_by_default() {
        let mut buffer = [0u8; 16];
        let mut sink = SliceSink::new(&mut buffer);
        let mut writer = Writer::new(&mut sink, DefaultOptions::new());
        writer.write_u16(0x0102).unwrap();
        writer.write_i32(-2).unwrap();
        writer.write_bool(true).unwrap();
        writer.flush().unwrap();
        assert_eq!(
            sink.written_buffer(),
            &[0x02, 0x01, 0xFE, 0xFF, 0xFF, 0xFF, 0x01]
        );
    }

    #[test]
    fn big_endian_option_applies_to_lengths() {
        let mut buffer = [0u8; 16];
        let mut sink = SliceSink::new(&mut buffer);
        let mut writer = Writer::new(&mut sink, DefaultOptions::new().with_big_endian());
        writer.write_str("ab").unwrap();
        writer.flush().unwrap();
        assert_eq!(sink.written_buffer(), &[0, 0, 0, 2, b'a', b'b']);
    }

    #[test]
    fn limit_is_charged_on_advance() {
        let mut buffer = [0u8; 16];
        let mut sink = SliceSink::new(&mut buffer);
        let mut writer = Writer::new(&mut sink, DefaultOptions::new().with_limit(3));
        writer.write_u16(1).unwrap();
        assert!(matches!(
            writer.write_u16(2),
            Err(EncodeError::LimitReached(_))
        ));
        assert_eq!(writer.written(), 2);
    }

    #[test]
    fn collection_header_refuses_the_null_length() {
        let mut buffer = [0u8; 16];
        let mut sink = SliceSink::new(&mut buffer);
        let mut writer = Writer::new(&mut sink, DefaultOptions::new());
        writer.write_null_collection_header().unwrap();
        assert!(matches!(
            writer.write_collection_header(u32::MAX as usize),
            Err(EncodeError::CollectionTooLarge(_))
        ));
        assert_eq!(writer.pending(), 4);
    }
}
