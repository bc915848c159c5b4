//! The per-type encode/decode contract.
//!
//! A type that implements [Pack] and [Unpack] is one a code generator would emit a
//! serialize/deserialize pair for. Dispatch is static: every call resolves to the concrete impl at
//! compile time.
//!
//! Object types (structs) begin their encoding with exactly one header byte; use
//! [pack_object!](crate::pack_object) to implement both traits for a plain struct. Union types
//! (enums whose variants each wrap an object) begin with a tag byte; see
//! [pack_union!](crate::pack_union). Primitives, strings and collections are *values*: they are
//! written as members of an object and carry no object header of their own.

#[cfg(feature = "alloc")]
use alloc::{boxed::Box, string::String, vec::Vec};

use crate::config::Options;
use crate::error::{DecodeError, EncodeError};
use crate::reader::{check_member_count, Reader};
use crate::traits::{Sink, Source};
use crate::writer::Writer;

/// A value that can be written to a [Writer].
pub trait Pack {
    /// Writes this value.
    fn pack<S: Sink, O: Options>(
        &self,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>>;

    /// Writes a value that may be absent. This is what `Option<Self>` packs as.
    ///
    /// The default wraps the value in a one-member object and writes the null header for `None`.
    /// Objects override this to use their own header, and collections to use the null length.
    fn pack_nullable<S: Sink, O: Options>(
        value: Option<&Self>,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        match value {
            Some(value) => {
                writer.write_object_header(1)?;
                value.pack(writer)
            }
            None => writer.write_null_object_header(),
        }
    }
}

/// A value that can be read from a [Reader].
pub trait Unpack<'de>: Sized {
    /// Reads a value.
    fn unpack<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Self, DecodeError<R::Error>>;

    /// Reads a value that may be absent, mirroring [Pack::pack_nullable].
    fn unpack_nullable<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Option<Self>, DecodeError<R::Error>> {
        match reader.read_object_header_or_null()? {
            Some(count) => {
                check_member_count(1, count)?;
                Self::unpack(reader).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// A type whose encoding begins with its own object header.
///
/// Union variants must wrap one of these, so that every union value is a tag followed by an
/// object. [pack_object!](crate::pack_object) implements it; implement it by hand only for types
/// whose [Pack::pack] writes exactly one object header before anything else.
pub trait PackObject: Pack {}

#[cfg(feature = "alloc")]
impl<T: PackObject + ?Sized> PackObject for Box<T> {}

macro_rules! impl_primitive {
    ($($ty:ty => $write:ident / $read:ident),* $(,)?) => {
        $(
            impl Pack for $ty {
                #[inline]
                fn pack<S: Sink, O: Options>(
                    &self,
                    writer: &mut Writer<'_, S, O>,
                ) -> Result<(), EncodeError<S::Error>> {
                    writer.$write(*self)
                }
            }

            impl<'de> Unpack<'de> for $ty {
                #[inline]
                fn unpack<R: Source<'de>, O: Options>(
                    reader: &mut Reader<'de, '_, R, O>,
                ) -> Result<Self, DecodeError<R::Error>> {
                    reader.$read()
                }
            }
        )*
    };
}

impl_primitive! {
    u8 => write_u8 / read_u8,
    u16 => write_u16 / read_u16,
    u32 => write_u32 / read_u32,
    u64 => write_u64 / read_u64,
    u128 => write_u128 / read_u128,
    i8 => write_i8 / read_i8,
    i16 => write_i16 / read_i16,
    i32 => write_i32 / read_i32,
    i64 => write_i64 / read_i64,
    i128 => write_i128 / read_i128,
    f32 => write_f32 / read_f32,
    f64 => write_f64 / read_f64,
    bool => write_bool / read_bool,
    char => write_char / read_char,
}

impl Pack for () {
    fn pack<S: Sink, O: Options>(&self, _: &mut Writer<'_, S, O>) -> Result<(), EncodeError<S::Error>> {
        Ok(())
    }
}

impl<'de> Unpack<'de> for () {
    fn unpack<R: Source<'de>, O: Options>(
        _: &mut Reader<'de, '_, R, O>,
    ) -> Result<Self, DecodeError<R::Error>> {
        Ok(())
    }
}

impl<T: Pack + ?Sized> Pack for &T {
    #[inline]
    fn pack<S: Sink, O: Options>(
        &self,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        (**self).pack(writer)
    }

    fn pack_nullable<S: Sink, O: Options>(
        value: Option<&Self>,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        T::pack_nullable(value.map(|v| &**v), writer)
    }
}

impl<T: Pack> Pack for Option<T> {
    #[inline]
    fn pack<S: Sink, O: Options>(
        &self,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        T::pack_nullable(self.as_ref(), writer)
    }
}

impl<'de, T: Unpack<'de>> Unpack<'de> for Option<T> {
    #[inline]
    fn unpack<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Self, DecodeError<R::Error>> {
        T::unpack_nullable(reader)
    }
}

impl Pack for str {
    fn pack<S: Sink, O: Options>(
        &self,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        writer.write_str(self)
    }

    fn pack_nullable<S: Sink, O: Options>(
        value: Option<&Self>,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        match value {
            Some(value) => writer.write_str(value),
            None => writer.write_null_collection_header(),
        }
    }
}

impl<'de> Unpack<'de> for &'de str {
    fn unpack<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Self, DecodeError<R::Error>> {
        reader.read_borrowed_str()
    }

    fn unpack_nullable<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Option<Self>, DecodeError<R::Error>> {
        match reader.read_collection_header()? {
            Some(len) => Ok(Some(core::str::from_utf8(reader.borrow(len)?)?)),
            None => Ok(None),
        }
    }
}

impl<'de> Unpack<'de> for &'de [u8] {
    fn unpack<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Self, DecodeError<R::Error>> {
        reader.read_borrowed_bytes()
    }

    fn unpack_nullable<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Option<Self>, DecodeError<R::Error>> {
        match reader.read_collection_header()? {
            Some(len) => reader.borrow(len).map(Some),
            None => Ok(None),
        }
    }
}

impl<T: Pack> Pack for [T] {
    fn pack<S: Sink, O: Options>(
        &self,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        writer.write_collection_header(self.len())?;
        for item in self {
            item.pack(writer)?;
        }
        Ok(())
    }

    fn pack_nullable<S: Sink, O: Options>(
        value: Option<&Self>,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        match value {
            Some(value) => value.pack(writer),
            None => writer.write_null_collection_header(),
        }
    }
}

// Fixed-size arrays have a static shape, so no length is written.
impl<T: Pack, const N: usize> Pack for [T; N] {
    fn pack<S: Sink, O: Options>(
        &self,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        for item in self {
            item.pack(writer)?;
        }
        Ok(())
    }
}

impl<'de, T: Unpack<'de>, const N: usize> Unpack<'de> for [T; N] {
    fn unpack<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Self, DecodeError<R::Error>> {
        let mut failure = None;
        let items: [Option<T>; N] = core::array::from_fn(|_| {
            if failure.is_some() {
                return None;
            }
            match T::unpack(reader) {
                Ok(item) => Some(item),
                Err(err) => {
                    failure = Some(err);
                    None
                }
            }
        });
        if let Some(err) = failure {
            return Err(err);
        }
        // No element failed, so every slot holds a value.
        Ok(items.map(|item| match item {
            Some(item) => item,
            None => unreachable!("array slot left empty without an error"),
        }))
    }
}

macro_rules! impl_tuple {
    ($($name:ident)+) => {
        impl<$($name: Pack),+> Pack for ($($name,)+) {
            #[allow(non_snake_case)]
            fn pack<S: Sink, O: Options>(
                &self,
                writer: &mut Writer<'_, S, O>,
            ) -> Result<(), EncodeError<S::Error>> {
                let ($($name,)+) = self;
                $($name.pack(writer)?;)+
                Ok(())
            }
        }

        impl<'de, $($name: Unpack<'de>),+> Unpack<'de> for ($($name,)+) {
            fn unpack<R: Source<'de>, O: Options>(
                reader: &mut Reader<'de, '_, R, O>,
            ) -> Result<Self, DecodeError<R::Error>> {
                Ok(($($name::unpack(reader)?,)+))
            }
        }
    };
}

impl_tuple!(A);
impl_tuple!(A B);
impl_tuple!(A B C);
impl_tuple!(A B C D);
impl_tuple!(A B C D E);
impl_tuple!(A B C D E F);

#[cfg(feature = "alloc")]
impl Pack for String {
    fn pack<S: Sink, O: Options>(
        &self,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        writer.write_str(self)
    }

    fn pack_nullable<S: Sink, O: Options>(
        value: Option<&Self>,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        <str as Pack>::pack_nullable(value.map(String::as_str), writer)
    }
}

#[cfg(feature = "alloc")]
impl<'de> Unpack<'de> for String {
    fn unpack<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Self, DecodeError<R::Error>> {
        reader.read_string()?.ok_or(DecodeError::UnexpectedNull)
    }

    fn unpack_nullable<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Option<Self>, DecodeError<R::Error>> {
        reader.read_string()
    }
}

#[cfg(feature = "alloc")]
impl<T: Pack> Pack for Vec<T> {
    fn pack<S: Sink, O: Options>(
        &self,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        self.as_slice().pack(writer)
    }

    fn pack_nullable<S: Sink, O: Options>(
        value: Option<&Self>,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        <[T] as Pack>::pack_nullable(value.map(Vec::as_slice), writer)
    }
}

#[cfg(feature = "alloc")]
impl<'de, T: Unpack<'de>> Unpack<'de> for Vec<T> {
    fn unpack<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Self, DecodeError<R::Error>> {
        let len = reader.expect_collection_header()?;
        unpack_elements(reader, len)
    }

    fn unpack_nullable<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Option<Self>, DecodeError<R::Error>> {
        match reader.read_collection_header()? {
            Some(len) => unpack_elements(reader, len).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(feature = "alloc")]
fn unpack_elements<'de, T: Unpack<'de>, R: Source<'de>, O: Options>(
    reader: &mut Reader<'de, '_, R, O>,
    len: usize,
) -> Result<Vec<T>, DecodeError<R::Error>> {
    let mut items = Vec::with_capacity(len.min(crate::reader::MAX_PREALLOCATION));
    for _ in 0..len {
        items.push(T::unpack(reader)?);
    }
    Ok(items)
}

#[cfg(feature = "alloc")]
impl<T: Pack + ?Sized> Pack for Box<T> {
    fn pack<S: Sink, O: Options>(
        &self,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        (**self).pack(writer)
    }

    fn pack_nullable<S: Sink, O: Options>(
        value: Option<&Self>,
        writer: &mut Writer<'_, S, O>,
    ) -> Result<(), EncodeError<S::Error>> {
        T::pack_nullable(value.map(|v| &**v), writer)
    }
}

#[cfg(feature = "alloc")]
impl<'de, T: Unpack<'de>> Unpack<'de> for Box<T> {
    fn unpack<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Self, DecodeError<R::Error>> {
        T::unpack(reader).map(Box::new)
    }

    fn unpack_nullable<R: Source<'de>, O: Options>(
        reader: &mut Reader<'de, '_, R, O>,
    ) -> Result<Option<Self>, DecodeError<R::Error>> {
        T::unpack_nullable(reader).map(|v| v.map(Box::new))
    }
}

/// Implements [Pack] and [Unpack] for a struct, treating it as an object.
///
/// The object header carries the number of listed fields, and the fields are written in the
/// listed order. `None` of an `Option<Struct>` is the null header alone.
///
/// ```
/// use spanpack_core::{pack_object, DefaultOptions, SliceSink};
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// pack_object!(Point { x: i32, y: i32 });
///
/// let mut buffer = [0u8; 16];
/// let mut sink = SliceSink::new(&mut buffer);
/// spanpack_core::pack(&Point { x: 1, y: -1 }, &mut sink, DefaultOptions::new()).unwrap();
/// assert_eq!(sink.written_buffer(), &[2, 1, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);
///
/// let point: Point = spanpack_core::unpack_from_slice(&buffer[..9], DefaultOptions::new()).unwrap();
/// assert_eq!(point, Point { x: 1, y: -1 });
/// ```
#[macro_export]
macro_rules! pack_object {
    ($ty:ident { $($field:ident : $fty:ty),* $(,)? }) => {
        const _: () = assert!(
            $crate::pack_object!(@count $($field)*) <= $crate::header::MAX_MEMBER_COUNT as usize,
            "too many members for an object header"
        );

        impl $crate::Pack for $ty {
            fn pack<S: $crate::traits::Sink, O: $crate::config::Options>(
                &self,
                writer: &mut $crate::Writer<'_, S, O>,
            ) -> ::core::result::Result<(), $crate::EncodeError<S::Error>> {
                writer.write_object_header($crate::pack_object!(@count $($field)*) as u8)?;
                $($crate::Pack::pack(&self.$field, writer)?;)*
                Ok(())
            }

            fn pack_nullable<S: $crate::traits::Sink, O: $crate::config::Options>(
                value: ::core::option::Option<&Self>,
                writer: &mut $crate::Writer<'_, S, O>,
            ) -> ::core::result::Result<(), $crate::EncodeError<S::Error>> {
                match value {
                    Some(value) => $crate::Pack::pack(value, writer),
                    None => writer.write_null_object_header(),
                }
            }
        }

        impl $crate::PackObject for $ty {}

        impl<'de> $crate::Unpack<'de> for $ty {
            fn unpack<R: $crate::traits::Source<'de>, O: $crate::config::Options>(
                reader: &mut $crate::Reader<'de, '_, R, O>,
            ) -> ::core::result::Result<Self, $crate::DecodeError<R::Error>> {
                reader.expect_object_header($crate::pack_object!(@count $($field)*))?;
                Ok($ty {
                    $($field: <$fty as $crate::Unpack<'de>>::unpack(reader)?,)*
                })
            }

            fn unpack_nullable<R: $crate::traits::Source<'de>, O: $crate::config::Options>(
                reader: &mut $crate::Reader<'de, '_, R, O>,
            ) -> ::core::result::Result<::core::option::Option<Self>, $crate::DecodeError<R::Error>> {
                match reader.read_object_header_or_null()? {
                    Some(found) => {
                        $crate::check_member_count($crate::pack_object!(@count $($field)*), found)?;
                        Ok(Some($ty {
                            $($field: <$fty as $crate::Unpack<'de>>::unpack(reader)?,)*
                        }))
                    }
                    None => Ok(None),
                }
            }
        }
    };
    (@count $($field:ident)*) => {
        <[()]>::len(&[$($crate::pack_object!(@unit $field)),*])
    };
    (@unit $field:ident) => { () };
}

/// Implements [Pack] and [Unpack] for an enum whose variants each wrap one object.
///
/// Each variant is written as its tag byte followed by the wrapped object, header included. The
/// wrapped types must implement [PackObject], which [pack_object!](crate::pack_object) does.
/// Tags must be below the reserved header band. An unknown tag fails with
/// [DecodeError::InvalidTag](crate::DecodeError::InvalidTag), and `None` of an `Option<Enum>` is
/// the null header alone.
///
/// ```
/// use spanpack_core::{pack_object, pack_union, DefaultOptions};
///
/// #[derive(Debug, PartialEq)]
/// struct Circle { radius: u16 }
/// #[derive(Debug, PartialEq)]
/// struct Square { side: u16 }
/// #[derive(Debug, PartialEq)]
/// enum Shape { Circle(Circle), Square(Square) }
///
/// pack_object!(Circle { radius: u16 });
/// pack_object!(Square { side: u16 });
/// pack_union!(Shape { 0 => Circle(Circle), 1 => Square(Square) });
///
/// let bytes = [1, 1, 4, 0];
/// let shape: Shape = spanpack_core::unpack_from_slice(&bytes, DefaultOptions::new()).unwrap();
/// assert_eq!(shape, Shape::Square(Square { side: 4 }));
/// ```
///
/// A variant that wraps a plain value would carry no object header, so it is rejected:
///
/// ```compile_fail
/// use spanpack_core::pack_union;
///
/// enum Reading { Raw(u32) }
///
/// pack_union!(Reading { 0 => Raw(u32) });
/// ```
#[macro_export]
macro_rules! pack_union {
    ($ty:ident { $($tag:literal => $variant:ident($inner:ty)),* $(,)? }) => {
        $(
            const _: () = assert!(
                $tag <= $crate::header::MAX_MEMBER_COUNT,
                "union tag collides with the reserved header band"
            );
        )*

        impl $crate::Pack for $ty
        where
            $($inner: $crate::PackObject,)*
        {
            fn pack<S: $crate::traits::Sink, O: $crate::config::Options>(
                &self,
                writer: &mut $crate::Writer<'_, S, O>,
            ) -> ::core::result::Result<(), $crate::EncodeError<S::Error>> {
                match self {
                    $($ty::$variant(inner) => {
                        writer.write_union_header($tag)?;
                        $crate::Pack::pack(inner, writer)
                    })*
                }
            }

            fn pack_nullable<S: $crate::traits::Sink, O: $crate::config::Options>(
                value: ::core::option::Option<&Self>,
                writer: &mut $crate::Writer<'_, S, O>,
            ) -> ::core::result::Result<(), $crate::EncodeError<S::Error>> {
                match value {
                    Some(value) => $crate::Pack::pack(value, writer),
                    None => writer.write_null_union_header(),
                }
            }
        }

        impl<'de> $crate::Unpack<'de> for $ty {
            fn unpack<R: $crate::traits::Source<'de>, O: $crate::config::Options>(
                reader: &mut $crate::Reader<'de, '_, R, O>,
            ) -> ::core::result::Result<Self, $crate::DecodeError<R::Error>> {
                <Self as $crate::Unpack<'de>>::unpack_nullable(reader)?
                    .ok_or($crate::DecodeError::UnexpectedNull)
            }

            fn unpack_nullable<R: $crate::traits::Source<'de>, O: $crate::config::Options>(
                reader: &mut $crate::Reader<'de, '_, R, O>,
            ) -> ::core::result::Result<::core::option::Option<Self>, $crate::DecodeError<R::Error>> {
                match reader.read_union_header()? {
                    $(Some($tag) => Ok(Some($ty::$variant(
                        <$inner as $crate::Unpack<'de>>::unpack(reader)?,
                    ))),)*
                    Some(tag) => Err($crate::unknown_tag(tag)),
                    None => Ok(None),
                }
            }
        }
    };
}
