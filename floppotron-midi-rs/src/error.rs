//! Error types for MIDI decoding.

use core::fmt;

/// Errors that can occur when interpreting a MIDI packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MidiError {
    /// The packet's status byte names a message kind the synthesizer does
    /// not act on (aftertouch, program change, system messages, ...).
    UnsupportedStatus(u8),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MidiError::UnsupportedStatus(status) => {
                write!(f, "Unsupported MIDI status byte: {:#04x}", status)
            }
        }
    }
}
