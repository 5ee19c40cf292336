//! Raw three-byte MIDI packets.

/// Mask selecting the message kind (high nibble) of a status byte.
pub const KIND_MASK: u8 = 0xF0;

/// Mask selecting the channel (low nibble) of a status byte.
pub const CHANNEL_MASK: u8 = 0x0F;

/// Returns `true` if `byte` has its high bit set, marking the start of a
/// MIDI message.
pub fn is_status_byte(byte: u8) -> bool {
    byte & 0x80 == 0x80
}

/// One framed MIDI message: a status byte followed by two data bytes.
///
/// The data bytes are passed through as received. Only the status byte is
/// guaranteed to have its high bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    /// Status byte (high bit always set).
    pub status: u8,
    /// First data byte.
    pub data1: u8,
    /// Second data byte.
    pub data2: u8,
}

impl Packet {
    pub const fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            status,
            data1,
            data2,
        }
    }

    /// Message kind, i.e. the status byte with the channel bits cleared.
    pub fn kind(&self) -> u8 {
        self.status & KIND_MASK
    }

    /// Zero-based MIDI channel carried in the status byte.
    pub fn channel(&self) -> u8 {
        self.status & CHANNEL_MASK
    }
}
