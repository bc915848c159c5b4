use embedded_hal::serial;

use super::{Sink, Source};

/// A [Sink] that stages bytes in a fixed `[u8; N]` and pushes each commit out over an
/// `embedded_hal::serial::Write` port.
///
/// Writes block until the port accepts every byte. The largest region it can grant is `N` bytes.
pub struct SerialSink<W, const N: usize> {
    port: W,
    buffer: [u8; N],
}

impl<W, const N: usize> SerialSink<W, N> {
    /// Wrap a serial port.
    pub fn new(port: W) -> Self {
        Self {
            port,
            buffer: [0; N],
        }
    }

    /// Give back the serial port.
    pub fn into_inner(self) -> W {
        self.port
    }
}

/// Errors from a [SerialSink].
#[derive(Debug)]
pub enum SerialSinkError<E> {
    /// The port failed.
    Serial(E),
    /// A region larger than the staging buffer was requested.
    RegionTooLarge {
        /// Bytes requested.
        requested: usize,
        /// Size of the staging buffer.
        capacity: usize,
    },
}

// note: Sink is only implemented for serial::Write if serial::Write::Error
// implements core::fmt::Debug, to match the Sink::Error bound

impl<W, const N: usize> Sink for SerialSink<W, N>
where
    W: serial::Write<u8>,
    <W as serial::Write<u8>>::Error: core::fmt::Debug,
{
    type Error = SerialSinkError<<W as serial::Write<u8>>::Error>;

    fn get_region(&mut self, size_hint: usize) -> Result<usize, Self::Error> {
        if size_hint > N {
            return Err(SerialSinkError::RegionTooLarge {
                requested: size_hint,
                capacity: N,
            });
        }
        Ok(N)
    }

    fn region_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[..]
    }

    fn commit(&mut self, count: usize) -> Result<(), Self::Error> {
        for byte in &self.buffer[..count] {
            nb::block!(serial::Write::write(&mut self.port, *byte))
                .map_err(SerialSinkError::Serial)?;
        }
        nb::block!(serial::Write::flush(&mut self.port)).map_err(SerialSinkError::Serial)
    }
}

/// A [Source] that fills a fixed `[u8; N]` from an `embedded_hal::serial::Read` port.
///
/// Reads block until enough bytes arrived. A request larger than `N` is answered with the full
/// buffer, which the reader reports as an unexpected end of data. Strings can only be decoded
/// into owned storage, since the staging buffer cannot lend `'de` data.
pub struct SerialSource<R, const N: usize> {
    port: R,
    buffer: [u8; N],
    start: usize,
    end: usize,
}

impl<R, const N: usize> SerialSource<R, N> {
    /// Wrap a serial port.
    pub fn new(port: R) -> Self {
        Self {
            port,
            buffer: [0; N],
            start: 0,
            end: 0,
        }
    }

    /// Give back the serial port. Bytes already buffered but not consumed are lost.
    pub fn into_inner(self) -> R {
        self.port
    }
}

impl<'de, R, const N: usize> Source<'de> for SerialSource<R, N>
where
    R: serial::Read<u8>,
    <R as serial::Read<u8>>::Error: core::fmt::Debug,
{
    type Error = <R as serial::Read<u8>>::Error;

    fn get_region(&mut self, size_hint: usize) -> Result<usize, Self::Error> {
        let wanted = size_hint.min(N);
        if self.start > 0 {
            self.buffer.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
        while self.end < wanted {
            self.buffer[self.end] = nb::block!(self.port.read())?;
            self.end += 1;
        }
        Ok(self.end)
    }

    fn region(&self) -> &[u8] {
        &self.buffer[self.start..self.end]
    }

    fn advance(&mut self, count: usize) {
        self.start += count.min(self.end - self.start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Port {
        data: [u8; 32],
        written: usize,
        read: usize,
    }

    impl serial::Write<u8> for Port {
        type Error = ();

        fn write(&mut self, word: u8) -> nb::Result<(), ()> {
            self.data[self.written] = word;
            self.written += 1;
            Ok(())
        }

        fn flush(&mut self) -> nb::Result<(), ()> {
            Ok(())
        }
    }

    impl serial::Read<u8> for Port {
        type Error = ();

        fn read(&mut self) -> nb::Result<u8, ()> {
            if self.read == self.written {
                return Err(nb::Error::WouldBlock);
            }
            let byte = self.data[self.read];
            self.read += 1;
            Ok(byte)
        }
    }

    #[test]
    fn serial_round_trip() {
        let port = Port {
            data: [0; 32],
            written: 0,
            read: 0,
        };
        let mut sink = SerialSink::<_, 8>::new(port);
        crate::pack(&(7u32, true), &mut sink, crate::DefaultOptions::new()).unwrap();

        let mut source = SerialSource::<_, 8>::new(sink.into_inner());
        let value: (u32, bool) = crate::unpack(&mut source, crate::DefaultOptions::new()).unwrap();
        assert_eq!(value, (7, true));
    }

    #[test]
    fn oversized_region_is_refused() {
        let port = Port {
            data: [0; 32],
            written: 0,
            read: 0,
        };
        let mut sink = SerialSink::<_, 4>::new(port);
        assert!(matches!(
            sink.get_region(5),
            Err(SerialSinkError::RegionTooLarge {
                requested: 5,
                capacity: 4
            })
        ));
    }
}
