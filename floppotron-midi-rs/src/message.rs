//! Typed MIDI channel messages.

use crate::error::MidiError;
use crate::packet::Packet;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;
const PITCH_BEND: u8 = 0xE0;

const DATA_MASK: u8 = 0x7F;

/// Modulation wheel controller number.
pub const CC_MODULATION: u8 = 1;

/// "All Sound Off" channel-mode controller number.
pub const CC_ALL_SOUND_OFF: u8 = 120;

/// "All Notes Off" channel-mode controller number.
pub const CC_ALL_NOTES_OFF: u8 = 123;

/// A channel message the synthesizer reacts to.
///
/// Note and controller data bytes are passed through unmasked; consumers
/// ignore out-of-range values. Pitch-bend values are assembled from the low
/// seven bits of each data byte, so they always lie in `0..=16383`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MidiMessage {
    /// A key was pressed. Never carries velocity 0.
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// A key was released (including note-on with velocity 0).
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Pitch wheel moved; `value` is 14-bit, centred at 8192.
    PitchBend { channel: u8, value: u16 },
    /// Controller change.
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
}

impl MidiMessage {
    /// Zero-based channel the message was sent on.
    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOn { channel, .. }
            | MidiMessage::NoteOff { channel, .. }
            | MidiMessage::PitchBend { channel, .. }
            | MidiMessage::ControlChange { channel, .. } => channel,
        }
    }
}

impl TryFrom<Packet> for MidiMessage {
    type Error = MidiError;

    fn try_from(packet: Packet) -> Result<Self, Self::Error> {
        let channel = packet.channel();
        match packet.kind() {
            NOTE_ON if packet.data2 == 0 => Ok(MidiMessage::NoteOff {
                channel,
                note: packet.data1,
                velocity: 0,
            }),
            NOTE_ON => Ok(MidiMessage::NoteOn {
                channel,
                note: packet.data1,
                velocity: packet.data2,
            }),
            NOTE_OFF => Ok(MidiMessage::NoteOff {
                channel,
                note: packet.data1,
                velocity: packet.data2,
            }),
            PITCH_BEND => Ok(MidiMessage::PitchBend {
                channel,
                value: u16::from(packet.data1 & DATA_MASK)
                    | u16::from(packet.data2 & DATA_MASK) << 7,
            }),
            CONTROL_CHANGE => Ok(MidiMessage::ControlChange {
                channel,
                controller: packet.data1,
                value: packet.data2,
            }),
            _ => Err(MidiError::UnsupportedStatus(packet.status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(status: u8, data1: u8, data2: u8) -> Packet {
        Packet {
            status,
            data1,
            data2,
        }
    }

    #[test]
    fn note_on_decodes_note_and_velocity() {
        assert_eq!(
            MidiMessage::try_from(packet(0x93, 64, 80)),
            Ok(MidiMessage::NoteOn {
                channel: 3,
                note: 64,
                velocity: 80
            })
        );
    }

    #[test]
    fn note_on_with_zero_velocity_is_note_off() {
        assert_eq!(
            MidiMessage::try_from(packet(0x90, 60, 0)),
            Ok(MidiMessage::NoteOff {
                channel: 0,
                note: 60,
                velocity: 0
            })
        );
    }

    #[test]
    fn note_off_keeps_release_velocity() {
        assert_eq!(
            MidiMessage::try_from(packet(0x8F, 72, 33)),
            Ok(MidiMessage::NoteOff {
                channel: 15,
                note: 72,
                velocity: 33
            })
        );
    }

    #[test]
    fn pitch_bend_assembles_fourteen_bits() {
        // LSB first, then MSB.
        assert_eq!(
            MidiMessage::try_from(packet(0xE0, 0x00, 0x40)),
            Ok(MidiMessage::PitchBend {
                channel: 0,
                value: 8192
            })
        );
        assert_eq!(
            MidiMessage::try_from(packet(0xE1, 0x7F, 0x7F)),
            Ok(MidiMessage::PitchBend {
                channel: 1,
                value: 16383
            })
        );
    }

    #[test]
    fn pitch_bend_ignores_stray_high_bits() {
        let msg = MidiMessage::try_from(packet(0xE0, 0xFF, 0xFF)).unwrap();
        assert_eq!(
            msg,
            MidiMessage::PitchBend {
                channel: 0,
                value: 16383
            }
        );
    }

    #[test]
    fn control_change_decodes_controller_and_value() {
        assert_eq!(
            MidiMessage::try_from(packet(0xB2, CC_MODULATION, 99)),
            Ok(MidiMessage::ControlChange {
                channel: 2,
                controller: CC_MODULATION,
                value: 99
            })
        );
    }

    #[test]
    fn unsupported_kinds_are_rejected() {
        for status in [0xA0, 0xC0, 0xD5, 0xF0, 0xF8] {
            assert_eq!(
                MidiMessage::try_from(packet(status, 0, 0)),
                Err(MidiError::UnsupportedStatus(status))
            );
        }
    }

    #[test]
    fn channel_accessor() {
        let msg = MidiMessage::PitchBend {
            channel: 9,
            value: 0,
        };
        assert_eq!(msg.channel(), 9);
    }
}
