#[cfg(feature = "alloc")]
use alloc::string::{String, ToString};
use core::str;
use serde::de::*;

use crate::config::Options;
use crate::error::DecodeError;
use crate::reader::{check_member_count, unknown_tag, Reader};
use crate::traits::Source;

/// Deserialize a given object from the given [Source].
///
/// The source must hold the exact shape `T` serializes to; the format carries no field names or
/// type information, only object headers, union tags and collection lengths. Each of those is
/// validated before it drives any further read.
///
/// ```
/// # extern crate serde_derive;
/// # use serde_derive::Deserialize;
/// # use spanpack_core::{deserialize, DefaultOptions, SliceSource};
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// pub struct SomeStruct {
///     a: u8,
///     b: u8,
/// }
/// let buffer: [u8; 3] = [
///     2, // header: two members
///     3, // a
///     6, // b
/// ];
/// let mut source = SliceSource::new(&buffer);
/// let val: SomeStruct = deserialize(&mut source, DefaultOptions::new()).unwrap();
/// assert_eq!(val, SomeStruct { a: 3, b: 6 });
/// ```
pub fn deserialize<'de, T: Deserialize<'de>, R: Source<'de>, O: Options>(
    source: &mut R,
    options: O,
) -> Result<T, DecodeError<R::Error>> {
    let mut deserializer = Deserializer::new(Reader::new(source, options));
    let value = T::deserialize(&mut deserializer)?;
    deserializer.finish();
    Ok(value)
}

impl<E: core::fmt::Debug> serde::de::Error for DecodeError<E> {
    #[cfg(feature = "alloc")]
    fn custom<T: core::fmt::Display>(cause: T) -> Self {
        DecodeError::Custom(cause.to_string())
    }

    #[cfg(not(feature = "alloc"))]
    fn custom<T: core::fmt::Display>(cause: T) -> Self {
        tracing::debug!(%cause, "custom deserialization error");
        DecodeError::Custom
    }
}

/// A deserializer that can be used to deserialize any `serde::Deserialize` type from a given
/// [Reader].
pub struct Deserializer<'de, 's, R: Source<'de>, O: Options> {
    reader: Reader<'de, 's, R, O>,
}

impl<'de, 's, R: Source<'de>, O: Options> Deserializer<'de, 's, R, O> {
    /// Wrap a reader.
    pub fn new(reader: Reader<'de, 's, R, O>) -> Self {
        Self { reader }
    }

    /// Report every consumed byte back to the source.
    pub fn finish(mut self) {
        self.reader.finish()
    }

    fn visit_sized_str<V: Visitor<'de>>(
        &mut self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError<R::Error>> {
        if self.reader.can_borrow() {
            let bytes = self.reader.borrow(len)?;
            return visitor.visit_borrowed_str(str::from_utf8(bytes)?);
        }
        #[cfg(feature = "alloc")]
        {
            let bytes = self.reader.read_raw_vec(len)?;
            let string = String::from_utf8(bytes)
                .map_err(|e| DecodeError::from(e.utf8_error()))?;
            visitor.visit_string(string)
        }
        #[cfg(not(feature = "alloc"))]
        {
            let value = {
                let region = self.reader.request(len)?;
                visitor.visit_str(str::from_utf8(&region[..len])?)?
            };
            self.reader.advance(len)?;
            Ok(value)
        }
    }

    fn visit_sized_bytes<V: Visitor<'de>>(
        &mut self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError<R::Error>> {
        if self.reader.can_borrow() {
            let bytes = self.reader.borrow(len)?;
            return visitor.visit_borrowed_bytes(bytes);
        }
        #[cfg(feature = "alloc")]
        {
            visitor.visit_byte_buf(self.reader.read_raw_vec(len)?)
        }
        #[cfg(not(feature = "alloc"))]
        {
            let value = {
                let region = self.reader.request(len)?;
                visitor.visit_bytes(&region[..len])?
            };
            self.reader.advance(len)?;
            Ok(value)
        }
    }
}

macro_rules! impl_deserialize_primitive {
    ($name:ident = $visitor_method:ident ($read:ident)) => {
        #[inline]
        fn $name<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: serde::de::Visitor<'de>,
        {
            visitor.$visitor_method(self.reader.$read()?)
        }
    };
}

impl<'de, 'a, 's, R: Source<'de>, O: Options> serde::Deserializer<'de>
    for &'a mut Deserializer<'de, 's, R, O>
{
    type Error = DecodeError<R::Error>;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(DecodeError::Unsupported("deserialize_any"))
    }

    impl_deserialize_primitive!(deserialize_bool = visit_bool(read_bool));
    impl_deserialize_primitive!(deserialize_i8 = visit_i8(read_i8));
    impl_deserialize_primitive!(deserialize_i16 = visit_i16(read_i16));
    impl_deserialize_primitive!(deserialize_i32 = visit_i32(read_i32));
    impl_deserialize_primitive!(deserialize_i64 = visit_i64(read_i64));
    impl_deserialize_primitive!(deserialize_i128 = visit_i128(read_i128));
    impl_deserialize_primitive!(deserialize_u8 = visit_u8(read_u8));
    impl_deserialize_primitive!(deserialize_u16 = visit_u16(read_u16));
    impl_deserialize_primitive!(deserialize_u32 = visit_u32(read_u32));
    impl_deserialize_primitive!(deserialize_u64 = visit_u64(read_u64));
    impl_deserialize_primitive!(deserialize_u128 = visit_u128(read_u128));
    impl_deserialize_primitive!(deserialize_f32 = visit_f32(read_f32));
    impl_deserialize_primitive!(deserialize_f64 = visit_f64(read_f64));
    impl_deserialize_primitive!(deserialize_char = visit_char(read_char));

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let len = self.reader.expect_collection_header()?;
        self.visit_sized_str(len, visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let len = self.reader.expect_collection_header()?;
        self.visit_sized_bytes(len, visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.reader.read_object_header_or_null()? {
            None => visitor.visit_none(),
            Some(count) => {
                check_member_count(1, count)?;
                visitor.visit_some(self)
            }
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.reader.expect_object_header(0)?;
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let len = self.reader.expect_collection_header()?;
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        struct Access<'a, 'de, 's, R: Source<'de>, O: Options> {
            deserializer: &'a mut Deserializer<'de, 's, R, O>,
            len: usize,
        }

        impl<'a, 'de, 's, R: Source<'de>, O: Options> serde::de::SeqAccess<'de>
            for Access<'a, 'de, 's, R, O>
        {
            type Error = DecodeError<R::Error>;

            fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
            where
                T: serde::de::DeserializeSeed<'de>,
            {
                if self.len > 0 {
                    self.len -= 1;
                    let value =
                        serde::de::DeserializeSeed::deserialize(seed, &mut *self.deserializer)?;
                    Ok(Some(value))
                } else {
                    Ok(None)
                }
            }

            fn size_hint(&self) -> Option<usize> {
                Some(self.len.min(crate::reader::MAX_PREALLOCATION))
            }
        }

        visitor.visit_seq(Access {
            deserializer: self,
            len,
        })
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.reader.expect_object_header(len)?;
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        struct Access<'a, 'de, 's, R: Source<'de>, O: Options> {
            deserializer: &'a mut Deserializer<'de, 's, R, O>,
            len: usize,
        }

        impl<'a, 'de, 's, R: Source<'de>, O: Options> serde::de::MapAccess<'de>
            for Access<'a, 'de, 's, R, O>
        {
            type Error = DecodeError<R::Error>;

            fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
            where
                K: serde::de::DeserializeSeed<'de>,
            {
                if self.len > 0 {
                    self.len -= 1;
                    let key =
                        serde::de::DeserializeSeed::deserialize(seed, &mut *self.deserializer)?;
                    Ok(Some(key))
                } else {
                    Ok(None)
                }
            }

            fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
            where
                V: serde::de::DeserializeSeed<'de>,
            {
                serde::de::DeserializeSeed::deserialize(seed, &mut *self.deserializer)
            }

            fn size_hint(&self) -> Option<usize> {
                Some(self.len.min(crate::reader::MAX_PREALLOCATION))
            }
        }

        let len = self.reader.expect_collection_header()?;
        visitor.visit_map(Access {
            deserializer: self,
            len,
        })
    }

    /// Hint that the `Deserialize` type is expecting a struct with a particular
    /// name and fields.
    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.reader.expect_object_header(fields.len())?;
        self.deserialize_tuple(fields.len(), visitor)
    }

    /// Hint that the `Deserialize` type is expecting an enum value with a
    /// particular name and possible variants.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_enum(self)
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(DecodeError::Unsupported("deserialize_identifier"))
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(DecodeError::Unsupported("deserialize_ignored_any"))
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

impl<'de, 'a, 's, R: Source<'de>, O: Options> serde::de::EnumAccess<'de>
    for &'a mut Deserializer<'de, 's, R, O>
{
    type Error = DecodeError<R::Error>;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: serde::de::DeserializeSeed<'de>,
    {
        let tag = self
            .reader
            .read_union_header()?
            .ok_or(DecodeError::UnexpectedNull)?;
        let idx: Result<_, DecodeError<R::Error>> =
            seed.deserialize(u32::from(tag).into_deserializer());
        let idx = idx.map_err(|_| unknown_tag(tag))?;
        Ok((idx, self))
    }
}

impl<'de, 'a, 's, R: Source<'de>, O: Options> serde::de::VariantAccess<'de>
    for &'a mut Deserializer<'de, 's, R, O>
{
    type Error = DecodeError<R::Error>;

    fn unit_variant(self) -> Result<(), Self::Error> {
        self.reader.expect_object_header(0)
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: serde::de::DeserializeSeed<'de>,
    {
        self.reader.expect_object_header(1)?;
        serde::de::DeserializeSeed::deserialize(seed, self)
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.reader.expect_object_header(len)?;
        serde::de::Deserializer::deserialize_tuple(self, len, visitor)
    }

    fn struct_variant<V>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: serde::de::Visitor<'de>,
    {
        self.reader.expect_object_header(fields.len())?;
        serde::de::Deserializer::deserialize_tuple(self, fields.len(), visitor)
    }
}
