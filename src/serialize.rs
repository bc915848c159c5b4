#[cfg(feature = "alloc")]
use alloc::string::ToString;
use serde::ser::*;

use crate::config::Options;
use crate::error::EncodeError;
use crate::header::MAX_MEMBER_COUNT;
use crate::traits::Sink;
use crate::writer::Writer;

/// Serialize a given `T` type into a given [Sink] with the given options, then flush.
///
/// `T` can be any value that derives `serde::Serialize`. Structs become objects (one header byte
/// holding the field count, then the fields), `None` becomes the null header, and enum variants
/// become a union tag followed by the variant's fields as an object.
///
/// `S` can be any value that implements [Sink]. This can e.g. be a [SliceSink](crate::SliceSink),
/// or a serial port.
pub fn serialize<T: Serialize + ?Sized, S: Sink, O: Options>(
    value: &T,
    sink: &mut S,
    options: O,
) -> Result<(), EncodeError<S::Error>> {
    let mut serializer = Serializer::new(Writer::new(sink, options));
    value.serialize(&mut serializer)?;
    serializer.finish()
}

impl<E: core::fmt::Debug> serde::ser::Error for EncodeError<E> {
    #[cfg(feature = "alloc")]
    fn custom<T: core::fmt::Display>(cause: T) -> Self {
        EncodeError::Custom(cause.to_string())
    }

    #[cfg(not(feature = "alloc"))]
    fn custom<T: core::fmt::Display>(cause: T) -> Self {
        tracing::debug!(%cause, "custom serialization error");
        EncodeError::Custom
    }
}

/// A serializer that can serialize any value that implements `serde::Serialize` through a
/// [Writer].
pub struct Serializer<'s, S: Sink, O: Options> {
    writer: Writer<'s, S, O>,
}

impl<'s, S: Sink, O: Options> Serializer<'s, S, O> {
    /// Wrap a writer.
    pub fn new(writer: Writer<'s, S, O>) -> Self {
        Self { writer }
    }

    /// Flush everything written so far to the sink.
    pub fn finish(mut self) -> Result<(), EncodeError<S::Error>> {
        self.writer.flush()
    }

    fn write_object_header(&mut self, len: usize) -> Result<(), EncodeError<S::Error>> {
        let count = u8::try_from(len).map_err(|_| EncodeError::HeaderOutOfRange(len))?;
        self.writer.write_object_header(count)
    }

    fn write_variant(
        &mut self,
        variant_index: u32,
        len: usize,
    ) -> Result<(), EncodeError<S::Error>> {
        match u8::try_from(variant_index) {
            Ok(tag) if tag <= MAX_MEMBER_COUNT => self.writer.write_union_header(tag)?,
            _ => return Err(EncodeError::TagOutOfRange(variant_index)),
        }
        self.write_object_header(len)
    }
}

impl<'a, 's, S: Sink, O: Options> serde::Serializer for &'a mut Serializer<'s, S, O> {
    type Ok = ();
    type Error = EncodeError<S::Error>;
    type SerializeSeq = Compound<'a, 's, S, O>;
    type SerializeTuple = Compound<'a, 's, S, O>;
    type SerializeTupleStruct = Compound<'a, 's, S, O>;
    type SerializeTupleVariant = Compound<'a, 's, S, O>;
    type SerializeMap = Compound<'a, 's, S, O>;
    type SerializeStruct = Compound<'a, 's, S, O>;
    type SerializeStructVariant = Compound<'a, 's, S, O>;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        self.writer.write_bool(v)
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        self.writer.write_i8(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        self.writer.write_i16(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        self.writer.write_i32(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
        self.writer.write_i64(v)
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok, Self::Error> {
        self.writer.write_i128(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        self.writer.write_u8(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        self.writer.write_u16(v)
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        self.writer.write_u32(v)
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        self.writer.write_u64(v)
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok, Self::Error> {
        self.writer.write_u128(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        self.writer.write_f32(v)
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        self.writer.write_f64(v)
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        self.writer.write_char(v)
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        self.writer.write_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        self.writer.write_bytes(v)
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        self.writer.write_null_object_header()
    }

    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize,
    {
        self.writer.write_object_header(1)?;
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        self.write_object_header(0)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        self.write_variant(variant_index, 0)
    }

    fn serialize_newtype_struct<T: ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize,
    {
        self.write_variant(variant_index, 1)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        let len = len.ok_or(EncodeError::SequenceMustHaveLength)?;
        self.writer.write_collection_header(len)?;
        Ok(Compound { ser: self })
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(Compound { ser: self })
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.write_object_header(len)?;
        Ok(Compound { ser: self })
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        self.write_variant(variant_index, len)?;
        Ok(Compound { ser: self })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        let len = len.ok_or(EncodeError::SequenceMustHaveLength)?;
        self.writer.write_collection_header(len)?;
        Ok(Compound { ser: self })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        self.write_object_header(len)?;
        Ok(Compound { ser: self })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        self.write_variant(variant_index, len)?;
        Ok(Compound { ser: self })
    }

    #[cfg(feature = "alloc")]
    fn collect_str<T: ?Sized>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: core::fmt::Display,
    {
        self.writer.write_str(&value.to_string())
    }

    // The length prefix has to be known before the first byte, which needs an allocation.
    #[cfg(not(feature = "alloc"))]
    fn collect_str<T: ?Sized>(self, _value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: core::fmt::Display,
    {
        Err(EncodeError::SequenceMustHaveLength)
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

/// Internal struct needed for serialization.
pub struct Compound<'a, 's, S: Sink, O: Options> {
    ser: &'a mut Serializer<'s, S, O>,
}

impl<'a, 's, S: Sink, O: Options> SerializeSeq for Compound<'a, 's, S, O> {
    type Ok = ();
    type Error = EncodeError<S::Error>;

    #[inline]
    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: serde::ser::Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<'a, 's, S: Sink, O: Options> SerializeTuple for Compound<'a, 's, S, O> {
    type Ok = ();
    type Error = EncodeError<S::Error>;

    #[inline]
    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: serde::ser::Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<'a, 's, S: Sink, O: Options> SerializeTupleStruct for Compound<'a, 's, S, O> {
    type Ok = ();
    type Error = EncodeError<S::Error>;

    #[inline]
    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: serde::ser::Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<'a, 's, S: Sink, O: Options> SerializeTupleVariant for Compound<'a, 's, S, O> {
    type Ok = ();
    type Error = EncodeError<S::Error>;

    #[inline]
    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: serde::ser::Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<'a, 's, S: Sink, O: Options> SerializeMap for Compound<'a, 's, S, O> {
    type Ok = ();
    type Error = EncodeError<S::Error>;

    #[inline]
    fn serialize_key<K: ?Sized>(&mut self, value: &K) -> Result<(), Self::Error>
    where
        K: serde::ser::Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    #[inline]
    fn serialize_value<V: ?Sized>(&mut self, value: &V) -> Result<(), Self::Error>
    where
        V: serde::ser::Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<'a, 's, S: Sink, O: Options> SerializeStruct for Compound<'a, 's, S, O> {
    type Ok = ();
    type Error = EncodeError<S::Error>;

    #[inline]
    fn serialize_field<T: ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error>
    where
        T: serde::ser::Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<'a, 's, S: Sink, O: Options> SerializeStructVariant for Compound<'a, 's, S, O> {
    type Ok = ();
    type Error = EncodeError<S::Error>;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}
