use spanpack_core::header::{Header, MAX_MEMBER_COUNT, NULL_OBJECT, RESERVED_START};
use spanpack_core::{
    DecodeError, DefaultOptions, EncodeError, Reader, SliceSink, SliceSource, Writer,
};

fn write_one<F>(write: F) -> Vec<u8>
where
    F: FnOnce(&mut Writer<'_, SliceSink<'_>>) -> Result<(), EncodeError<spanpack_core::SliceSinkError>>,
{
    let mut buffer = [0u8; 8];
    let mut sink = SliceSink::new(&mut buffer);
    let mut writer = Writer::new(&mut sink, DefaultOptions::new());
    write(&mut writer).unwrap();
    writer.flush().unwrap();
    sink.written_buffer().to_vec()
}

fn read_header(bytes: &[u8]) -> Header {
    let mut source = SliceSource::new(bytes);
    let mut reader = Reader::new(&mut source, DefaultOptions::new());
    reader.read_object_header().unwrap()
}

#[test]
fn reserved_band_boundary() {
    assert_eq!(MAX_MEMBER_COUNT, 249);
    assert_eq!(RESERVED_START, 250);
    assert_eq!(NULL_OBJECT, 255);
}

#[test]
fn write_null_object_header() {
    let bytes = write_one(|w| w.write_null_object_header());
    assert_eq!(bytes, [NULL_OBJECT]);
    assert_eq!(read_header(&bytes), Header::Null);
}

#[test]
fn every_member_count_round_trips() {
    for count in 0..250u8 {
        let bytes = write_one(|w| w.write_object_header(count));
        assert_eq!(bytes, [count]);
        assert_eq!(read_header(&bytes), Header::MemberCount(count));
    }
}

#[test]
fn every_reserved_value_is_rejected_as_member_count() {
    for value in RESERVED_START..=u8::MAX {
        let mut buffer = [0u8; 8];
        let mut sink = SliceSink::new(&mut buffer);
        let mut writer = Writer::new(&mut sink, DefaultOptions::new());
        let err = writer.write_object_header(value).unwrap_err();
        assert!(
            matches!(err, EncodeError::HeaderOutOfRange(v) if v == value as usize),
            "value {} was not rejected",
            value
        );
        assert!(err.is_usage_error());
        // nothing was written
        assert_eq!(writer.written(), 0);
    }
}

#[test]
fn every_reserved_value_is_rejected_as_union_tag() {
    for value in RESERVED_START..=u8::MAX {
        let mut buffer = [0u8; 8];
        let mut sink = SliceSink::new(&mut buffer);
        let mut writer = Writer::new(&mut sink, DefaultOptions::new());
        assert!(matches!(
            writer.write_union_header(value),
            Err(EncodeError::TagOutOfRange(v)) if v == value as u32
        ));
    }
}

#[test]
fn zero_members_and_null_are_distinct() {
    let zero = write_one(|w| w.write_object_header(0));
    let null = write_one(|w| w.write_null_object_header());
    assert_ne!(zero, null);

    let zero = read_header(&zero);
    let null = read_header(&null);
    assert_eq!(zero, Header::MemberCount(0));
    assert_eq!(null, Header::Null);
    assert_ne!(zero, null);
}

#[test]
fn reserved_codes_fail_where_count_or_null_is_expected() {
    for code in RESERVED_START..NULL_OBJECT {
        let bytes = [code];
        assert_eq!(read_header(&bytes), Header::Reserved(code));

        let mut source = SliceSource::new(&bytes);
        let mut reader = Reader::new(&mut source, DefaultOptions::new());
        let err = reader.read_object_header_or_null().unwrap_err();
        assert!(matches!(err, DecodeError::ReservedHeader(c) if c == code));
        assert!(err.is_data_error());

        let mut source = SliceSource::new(&bytes);
        let mut reader = Reader::new(&mut source, DefaultOptions::new());
        assert!(matches!(
            reader.read_union_header(),
            Err(DecodeError::ReservedHeader(_))
        ));
    }
}

#[test]
fn expect_object_header_branches_on_classification() {
    let cases: [(&[u8], fn(&DecodeError<std::convert::Infallible>) -> bool); 4] = [
        (&[2], |e| matches!(e, DecodeError::MemberCountMismatch { expected: 3, found: 2 })),
        (&[NULL_OBJECT], |e| matches!(e, DecodeError::UnexpectedNull)),
        (&[251], |e| matches!(e, DecodeError::ReservedHeader(251))),
        (&[], |e| matches!(e, DecodeError::UnexpectedEnd { needed: 1, available: 0 })),
    ];
    for (bytes, check) in cases.iter() {
        let mut source = SliceSource::new(bytes);
        let mut reader = Reader::new(&mut source, DefaultOptions::new());
        let err = reader.expect_object_header(3).unwrap_err();
        assert!(check(&err), "unexpected error {:?} for {:?}", err, bytes);
    }

    let mut source = SliceSource::new(&[3]);
    let mut reader = Reader::new(&mut source, DefaultOptions::new());
    reader.expect_object_header(3).unwrap();
}

#[test]
fn union_header_round_trip() {
    let bytes = write_one(|w| {
        w.write_union_header(7)?;
        w.write_object_header(0)?;
        w.write_null_union_header()
    });
    assert_eq!(bytes, [7, 0, NULL_OBJECT]);

    let mut source = SliceSource::new(&bytes);
    let mut reader = Reader::new(&mut source, DefaultOptions::new());
    assert_eq!(reader.read_union_header().unwrap(), Some(7));
    reader.expect_object_header(0).unwrap();
    assert_eq!(reader.read_union_header().unwrap(), None);
}
