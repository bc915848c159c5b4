#[macro_use]
extern crate serde_derive;

use spanpack_core::config::Options;
use spanpack_core::{from_slice, serialize, DecodeError, DefaultOptions, SliceSink};
use std::collections::BTreeMap;
use std::marker::PhantomData;

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub enum SimpleEnum {
    A,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct UnitStruct;

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct NewTypeStruct(u8);

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub enum ComplexEnum {
    A(u8),
    B(u8, i8),
    C { x: u16 },
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct TupleStruct(u8, i8);

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct SimpleStruct {
    a: u8,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct ComplexStruct {
    a: SimpleStruct,
    b: SimpleEnum,
    c: ComplexEnum,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct TestStruct {
    a: u8,
    b: u16,
    c: u32,
    d: u64,
    e: u128,

    opt: Option<u8>,
    buff: [u8; 3],
}

macro_rules! simple_test {
    ($name:ident($prim: ty), val: $val: expr, size: $size: expr) => {
        #[test]
        fn $name() {
            let s: $prim = $val;
            let mut buffer = [0u8; 100];
            let mut sink = SliceSink::new(&mut buffer);
            serialize(&s, &mut sink, DefaultOptions::new()).unwrap();
            println!("Buffer: {:?}", sink.written_buffer());

            let len = sink.written_len();
            assert_eq!($size, len);
            assert_eq!(
                $size as u64,
                spanpack_core::serialized_size(&s, DefaultOptions::new()).unwrap()
            );

            let deserialized: $prim = from_slice(&buffer[..len], DefaultOptions::new()).unwrap();
            assert_eq!(s, deserialized);
        }
    };
}

simple_test!(test_bool(bool), val: true, size: 1);
simple_test!(test_i8(i8), val: -1, size: 1);
simple_test!(test_i16(i16), val: -2, size: 2);
simple_test!(test_i32(i32), val: -3, size: 4);
simple_test!(test_i64(i64), val: -4, size: 8);
simple_test!(test_i128(i128), val: -5, size: 16);
simple_test!(test_isize(isize), val: -6, size: 8);
simple_test!(test_u8(u8), val: 1, size: 1);
simple_test!(test_u16(u16), val: 2, size: 2);
simple_test!(test_u32(u32), val: 3, size: 4);
simple_test!(test_u64(u64), val: 4, size: 8);
simple_test!(test_u128(u128), val: 5, size: 16);
simple_test!(test_usize(usize), val: 6, size: 8);
simple_test!(test_f32(f32), val: 1.0, size: 4);
simple_test!(test_f64(f64), val: -1.0, size: 8);
// Chars are their u32 scalar value
simple_test!(test_char(char), val: 'a', size: 4);
simple_test!(test_unit(()), val: (), size: 0);
// Unit structs are objects with zero members: header only
simple_test!(test_phantom_data(PhantomData<()>), val: PhantomData, size: 1);
simple_test!(test_unit_struct(UnitStruct), val: UnitStruct, size: 1);
// String has length (4 bytes) + content (4 bytes)
simple_test!(test_string(&str), val: "Test", size: 8);
// Slice has length (4 bytes) + content (1 byte)
simple_test!(test_slice(&[u8]), val: &[1], size: 5);
// Some: header 1 (1 byte) + content (1 byte)
simple_test!(test_option_some(Option<u8>), val: Some(1), size: 2);
// None: null header (1 byte)
simple_test!(test_option_none(Option<u8>), val: None, size: 1);
// Unit variant: tag (1 byte) + header 0 (1 byte)
simple_test!(test_enum_variant(SimpleEnum), val: SimpleEnum::A, size: 2);
// Newtype struct content (1 byte)
simple_test!(test_newtype_struct(NewTypeStruct), val: NewTypeStruct(1), size: 1);
// Newtype variant: tag (1 byte) + header 1 (1 byte) + content (1 byte)
simple_test!(test_newtype_enum_variant(ComplexEnum), val: ComplexEnum::A(1), size: 3);
// Tuple variant: tag (1 byte) + header 2 (1 byte) + content (2 bytes)
simple_test!(test_tuple_enum_variant(ComplexEnum), val: ComplexEnum::B(1, -1), size: 4);
// Struct variant: tag (1 byte) + header 1 (1 byte) + content (2 bytes)
simple_test!(test_struct_enum_variant(ComplexEnum), val: ComplexEnum::C { x: 9 }, size: 4);
// Tuple content (2 bytes), the shape is static so there is no header
simple_test!(test_tuple((u8, i8)), val: (1, -1), size: 2);
// Tuple struct: header (1 byte) + content (2 bytes)
simple_test!(test_tuple_struct(TupleStruct), val: TupleStruct(1, -1), size: 3);
// Simple struct: header (1 byte) + content (1 byte)
simple_test!(test_simple_struct(SimpleStruct), val: SimpleStruct{ a: 1 }, size: 2);
// Complex struct - header (1 byte) + a (2 bytes) + b: (2 bytes) + c: (3 bytes)
simple_test!(test_complex_struct(ComplexStruct), val: ComplexStruct{ a: SimpleStruct { a: 1 }, b: SimpleEnum::A, c: ComplexEnum::A(1) }, size: 8);

#[test]
fn simple_struct() {
    let s = TestStruct {
        a: 1,
        b: 2,
        c: 3,
        d: 4,
        e: 5,
        opt: Some(6),
        buff: [7, 8, 9],
    };

    let mut buffer = [0u8; 100];
    let mut sink = SliceSink::new(&mut buffer);
    serialize(&s, &mut sink, DefaultOptions::new()).unwrap();
    println!("Buffer: {:?}", sink.written_buffer());

    // type         size
    // header       1
    // u8           1
    // u16          2
    // u32          4
    // u64          8
    // u128         16
    // Option<u8>   1 + 1
    // [u8; 3]      3 (fixed array so no length)
    let len = sink.written_len();
    assert_eq!(1 + 1 + 2 + 4 + 8 + 16 + 1 + 1 + 3, len);
    assert_eq!(buffer[0], 7);

    let deserialized: TestStruct = from_slice(&buffer[..len], DefaultOptions::new()).unwrap();
    assert_eq!(s, deserialized);
}

#[test]
fn simple_tuple() {
    let s = (1u16, 2u32, &b"test"[..], "tesT");

    let mut buffer = [0u8; 100];
    let mut sink = SliceSink::new(&mut buffer);
    serialize(&s, &mut sink, DefaultOptions::new()).unwrap();

    // type         size
    // u16          2
    // u32          4
    // &[u8]        4 (len) + 4 (byte content)
    // &str         4 (len) + 4 (str content)
    let len = sink.written_len();
    assert_eq!(2 + 4 + 4 + 4 + 4 + 4, len);

    let deserialized: (u16, u32, &[u8], &str) =
        from_slice(&buffer[..len], DefaultOptions::new()).unwrap();
    assert_eq!(s, deserialized);
}

#[test]
fn big_endian_changes_every_multi_byte_value() {
    let s = (0x0102u16, "a");
    let mut buffer = [0u8; 16];
    let mut sink = SliceSink::new(&mut buffer);
    serialize(&s, &mut sink, DefaultOptions::new().with_big_endian()).unwrap();
    assert_eq!(sink.written_buffer(), &[1, 2, 0, 0, 0, 1, b'a']);

    let len = sink.written_len();
    let back: (u16, &str) =
        from_slice(&buffer[..len], DefaultOptions::new().with_big_endian()).unwrap();
    assert_eq!(back, s);
}

#[test]
fn owned_collections_round_trip() {
    let mut map = BTreeMap::new();
    map.insert(String::from("one"), vec![1u32]);
    map.insert(String::from("two"), vec![2, 2]);

    let bytes = spanpack_core::to_vec(&map, DefaultOptions::new()).unwrap();
    let back: BTreeMap<String, Vec<u32>> = from_slice(&bytes, DefaultOptions::new()).unwrap();
    assert_eq!(back, map);
}

#[test]
fn nested_options_stay_distinct() {
    let values: [Option<Option<u8>>; 3] = [None, Some(None), Some(Some(0))];
    for value in values.iter() {
        let bytes = spanpack_core::to_vec(value, DefaultOptions::new()).unwrap();
        let back: Option<Option<u8>> = from_slice(&bytes, DefaultOptions::new()).unwrap();
        assert_eq!(&back, value);
    }
}

#[test]
fn trailing_bytes_are_rejected_by_default() {
    let bytes = [2u8, 1, 1];
    let err = from_slice::<SimpleStruct, _>(&bytes, DefaultOptions::new()).unwrap_err();
    assert!(matches!(err, DecodeError::MemberCountMismatch { expected: 1, found: 2 }));

    let bytes = [1u8, 5, 0];
    let err = from_slice::<SimpleStruct, _>(&bytes, DefaultOptions::new()).unwrap_err();
    assert!(matches!(err, DecodeError::TrailingBytes(1)));

    let value: SimpleStruct =
        from_slice(&bytes, DefaultOptions::new().allow_trailing_bytes()).unwrap();
    assert_eq!(value, SimpleStruct { a: 5 });
}

#[test]
fn null_is_not_an_empty_struct() {
    let err = from_slice::<UnitStruct, _>(&[255], DefaultOptions::new()).unwrap_err();
    assert!(matches!(err, DecodeError::UnexpectedNull));
    let value: Option<UnitStruct> = from_slice(&[255], DefaultOptions::new()).unwrap();
    assert_eq!(value, None);
    let value: UnitStruct = from_slice(&[0], DefaultOptions::new()).unwrap();
    assert_eq!(value, UnitStruct);
}

#[test]
fn unknown_variant_is_an_error() {
    // tag 3 does not exist in ComplexEnum
    let err = from_slice::<ComplexEnum, _>(&[3, 1, 0], DefaultOptions::new()).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidTag(3)));
    assert!(err.is_data_error());
    assert!(!err.is_usage_error());

    let err = from_slice::<SimpleEnum, _>(&[9, 0], DefaultOptions::new()).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidTag(9)));
}

#[test]
fn custom_deserialize_errors_are_data_errors() {
    let err: DecodeError<std::convert::Infallible> = serde::de::Error::custom("bad input");
    assert!(matches!(err, DecodeError::Custom(_)));
    assert!(err.is_data_error());
}

#[test]
fn truncated_struct_is_an_error() {
    let err = from_slice::<TupleStruct, _>(&[2, 1], DefaultOptions::new()).unwrap_err();
    assert!(matches!(err, DecodeError::UnexpectedEnd { needed: 1, available: 0 }));
}

#[test]
fn limit_applies_to_serialization() {
    let s = TupleStruct(1, 2);
    let mut buffer = [0u8; 16];
    let mut sink = SliceSink::new(&mut buffer);
    let err = serialize(&s, &mut sink, DefaultOptions::new().with_limit(2)).unwrap_err();
    assert!(matches!(err, spanpack_core::EncodeError::LimitReached(_)));
}

#[test]
fn sink_errors_are_surfaced() {
    let s = (1u64, 2u64);
    let mut buffer = [0u8; 12];
    let mut sink = SliceSink::new(&mut buffer);
    serialize(&(1u64,), &mut sink, DefaultOptions::new()).unwrap();
    let err = serialize(&s, &mut sink, DefaultOptions::new()).unwrap_err();
    assert!(matches!(err, spanpack_core::EncodeError::Sink(_)));
}
