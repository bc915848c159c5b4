mod sink;
mod source;

#[cfg(feature = "embedded-hal-traits")]
mod impl_embedded_hal;

pub use self::sink::Sink;
pub use self::source::{SliceSource, Source};

#[cfg(feature = "embedded-hal-traits")]
pub use self::impl_embedded_hal::{SerialSink, SerialSinkError, SerialSource};
