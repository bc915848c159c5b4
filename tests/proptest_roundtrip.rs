//! Property-based tests: encoding must not depend on how the sink or source splits its regions.

#[macro_use]
extern crate serde_derive;

use proptest::prelude::*;
use spanpack_core::{
    deserialize, pack, pack_object, pack_to_vec, serialize, to_vec, unpack, DecodeError,
    DefaultOptions, Sink, Source,
};
use std::convert::Infallible;

/// A sink that grants regions whose lengths cycle through `sizes`, never shorter than asked.
struct ChunkedSink {
    sizes: Vec<usize>,
    next: usize,
    region: Vec<u8>,
    output: Vec<u8>,
}

impl ChunkedSink {
    fn new(sizes: Vec<usize>) -> Self {
        Self {
            sizes,
            next: 0,
            region: Vec::new(),
            output: Vec::new(),
        }
    }
}

impl Sink for ChunkedSink {
    type Error = Infallible;

    fn get_region(&mut self, size_hint: usize) -> Result<usize, Infallible> {
        let size = self.sizes[self.next % self.sizes.len()];
        self.next += 1;
        self.region = vec![0; size.max(size_hint)];
        Ok(self.region.len())
    }

    fn region_mut(&mut self) -> &mut [u8] {
        &mut self.region
    }

    fn commit(&mut self, count: usize) -> Result<(), Infallible> {
        self.output.extend_from_slice(&self.region[..count]);
        Ok(())
    }
}

/// A source that exposes at most `chunk` bytes at a time unless more are needed, and cannot lend
/// its data.
struct ChunkedSource {
    data: Vec<u8>,
    pos: usize,
    len: usize,
    chunk: usize,
}

impl ChunkedSource {
    fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self {
            data,
            pos: 0,
            len: 0,
            chunk,
        }
    }
}

impl<'de> Source<'de> for ChunkedSource {
    type Error = Infallible;

    fn get_region(&mut self, size_hint: usize) -> Result<usize, Infallible> {
        let left = self.data.len() - self.pos;
        self.len = size_hint.max(self.chunk).min(left);
        Ok(self.len)
    }

    fn region(&self) -> &[u8] {
        &self.data[self.pos..self.pos + self.len]
    }

    fn advance(&mut self, count: usize) {
        self.pos += count;
        self.len -= count;
    }
}

#[derive(Debug, PartialEq, Clone)]
struct Record {
    id: u64,
    delta: i16,
    name: String,
    samples: Vec<u32>,
    parent: Option<u64>,
}

pack_object!(Record {
    id: u64,
    delta: i16,
    name: String,
    samples: Vec<u32>,
    parent: Option<u64>,
});

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
enum Event {
    Start { at: u64 },
    Data(Vec<u8>, String),
    Stop,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct Log {
    source: String,
    level: Option<u8>,
    events: Vec<Event>,
    ratio: f64,
    flag: bool,
    symbol: char,
}

fn arb_record() -> impl Strategy<Value = Record> {
    (
        any::<u64>(),
        any::<i16>(),
        ".{0,40}",
        prop::collection::vec(any::<u32>(), 0..50),
        any::<Option<u64>>(),
    )
        .prop_map(|(id, delta, name, samples, parent)| Record {
            id,
            delta,
            name,
            samples,
            parent,
        })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        any::<u64>().prop_map(|at| Event::Start { at }),
        (prop::collection::vec(any::<u8>(), 0..64), ".{0,16}")
            .prop_map(|(bytes, text)| Event::Data(bytes, text)),
        Just(Event::Stop),
    ]
}

fn arb_log() -> impl Strategy<Value = Log> {
    (
        "[a-z]{0,12}",
        any::<Option<u8>>(),
        prop::collection::vec(arb_event(), 0..10),
        any::<f64>().prop_filter("not NaN", |f| !f.is_nan()),
        any::<bool>(),
        any::<char>(),
    )
        .prop_map(|(source, level, events, ratio, flag, symbol)| Log {
            source,
            level,
            events,
            ratio,
            flag,
            symbol,
        })
}

proptest! {
    #[test]
    fn region_sizes_do_not_change_packed_bytes(
        record in arb_record(),
        sizes in prop::collection::vec(1usize..24, 1..8),
    ) {
        let expected = pack_to_vec(&record, DefaultOptions::new()).unwrap();

        let mut sink = ChunkedSink::new(sizes);
        pack(&record, &mut sink, DefaultOptions::new()).unwrap();
        prop_assert_eq!(&sink.output, &expected);
    }

    #[test]
    fn region_sizes_do_not_change_serialized_bytes(
        log in arb_log(),
        sizes in prop::collection::vec(1usize..24, 1..8),
    ) {
        let expected = to_vec(&log, DefaultOptions::new()).unwrap();

        let mut sink = ChunkedSink::new(sizes);
        serialize(&log, &mut sink, DefaultOptions::new()).unwrap();
        prop_assert_eq!(&sink.output, &expected);
    }

    #[test]
    fn records_unpack_from_any_chunking(record in arb_record(), chunk in 0usize..16) {
        let bytes = pack_to_vec(&record, DefaultOptions::new()).unwrap();
        let total = bytes.len();

        let mut source = ChunkedSource::new(bytes, chunk);
        let back: Record = unpack(&mut source, DefaultOptions::new()).unwrap();
        prop_assert_eq!(back, record);
        prop_assert_eq!(source.pos, total);
    }

    #[test]
    fn logs_deserialize_from_any_chunking(log in arb_log(), chunk in 0usize..16) {
        let bytes = to_vec(&log, DefaultOptions::new()).unwrap();
        let total = bytes.len();

        let mut source = ChunkedSource::new(bytes, chunk);
        let back: Log = deserialize(&mut source, DefaultOptions::new()).unwrap();
        prop_assert_eq!(back, log);
        prop_assert_eq!(source.pos, total);
    }

    #[test]
    fn primitives_round_trip(a in any::<i128>(), b in any::<u16>(), c in any::<char>(), d in any::<f32>()) {
        let value = (a, b, c, d.to_bits());
        let bytes = pack_to_vec(&value, DefaultOptions::new()).unwrap();
        prop_assert_eq!(bytes.len(), 16 + 2 + 4 + 4);
        let back: (i128, u16, char, u32) =
            spanpack_core::unpack_from_slice(&bytes, DefaultOptions::new()).unwrap();
        prop_assert_eq!(back, value);
    }

    #[test]
    fn truncated_input_never_decodes(record in arb_record(), cut in any::<prop::sample::Index>()) {
        let bytes = pack_to_vec(&record, DefaultOptions::new()).unwrap();
        let cut = cut.index(bytes.len());
        let result = spanpack_core::unpack_from_slice::<Record, _>(&bytes[..cut], DefaultOptions::new());
        prop_assert!(result.is_err());
        prop_assert!(result.unwrap_err().is_data_error());
    }
}

#[test]
fn borrowing_needs_a_lending_source() {
    let bytes = pack_to_vec("abc", DefaultOptions::new()).unwrap();
    let mut source = ChunkedSource::new(bytes, 64);
    let err = unpack::<&str, _, _>(&mut source, DefaultOptions::new()).unwrap_err();
    assert!(matches!(err, DecodeError::BorrowUnsupported));
    assert!(err.is_usage_error());
}
