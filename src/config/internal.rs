use super::{SizeLimit, TrailingBytes, WireByteOrder};

/// What the writer and reader need from a set of options. Reachable only through [Options].
///
/// [Options]: super::Options
pub trait InternalOptions {
    type Limit: SizeLimit + Copy + 'static;
    type Endian: WireByteOrder + 'static;
    type Trailing: TrailingBytes + 'static;

    fn limit(&mut self) -> &mut Self::Limit;
}

/// The `byteorder` type selected by a set of options.
pub(crate) type Order<O> = <<O as InternalOptions>::Endian as WireByteOrder>::Endian;
