//! Byte-source abstraction implemented by the hardware layer.

/// A source of raw MIDI bytes (wired UART, wireless link, ...).
///
/// Implementations own all transport setup; the decoder only pulls bytes.
pub trait MidiTransport {
    /// Block until the next byte is available and return it.
    fn read_byte(&mut self) -> u8;

    /// Return the next byte if one becomes available within `timeout_us`
    /// microseconds, or `None` otherwise.
    ///
    /// A timeout of `0` must not wait at all: it returns a byte only if one
    /// is already buffered.
    fn try_read_byte(&mut self, timeout_us: u32) -> Option<u8>;
}

impl<T: MidiTransport + ?Sized> MidiTransport for &mut T {
    fn read_byte(&mut self) -> u8 {
        (**self).read_byte()
    }

    fn try_read_byte(&mut self, timeout_us: u32) -> Option<u8> {
        (**self).try_read_byte(timeout_us)
    }
}
