use byteorder::ByteOrder;

/// Selects the byte order every multi-byte primitive is written in.
///
/// One byte order applies to a whole top-level call; mixing is not possible because the order is
/// part of the options type.
pub trait WireByteOrder {
    /// The `byteorder` implementation backing this choice.
    type Endian: ByteOrder + 'static;
}

/// Little-endian byte order. This is the default.
#[derive(Copy, Clone, Debug)]
pub struct LittleEndian;

/// Big-endian byte order.
#[derive(Copy, Clone, Debug)]
pub struct BigEndian;

/// The byte order of the machine running the code.
#[derive(Copy, Clone, Debug)]
pub struct NativeEndian;

impl WireByteOrder for LittleEndian {
    type Endian = byteorder::LittleEndian;
}

impl WireByteOrder for BigEndian {
    type Endian = byteorder::BigEndian;
}

impl WireByteOrder for NativeEndian {
    type Endian = byteorder::NativeEndian;
}
