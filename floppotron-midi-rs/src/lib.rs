//! MIDI framing for the floppotron firmware.
//!
//! This crate turns the raw byte stream of any MIDI transport into
//! three-byte [`Packet`]s and decodes those into [`MidiMessage`]s.
//!
//! # Architecture
//!
//! - **[`MidiTransport`]**: the byte source. Implemented by the firmware
//!   for its UART (or any other link); only one transport is active at a
//!   time.
//! - **[`MidiDecoder`]**: synchronises on status bytes and assembles
//!   packets, with blocking and timeout-bounded variants.
//! - **[`MidiMessage`]**: typed view of the packets the synthesizer acts on.
//!
//! # Quick start
//!
//! ```
//! use floppotron_midi::{MidiDecoder, MidiMessage, MidiTransport};
//!
//! struct Bytes<'a>(&'a [u8]);
//!
//! impl MidiTransport for Bytes<'_> {
//!     fn read_byte(&mut self) -> u8 {
//!         self.try_read_byte(0).unwrap_or(0)
//!     }
//!
//!     fn try_read_byte(&mut self, _timeout_us: u32) -> Option<u8> {
//!         let (first, rest) = self.0.split_first()?;
//!         self.0 = rest;
//!         Some(*first)
//!     }
//! }
//!
//! let mut decoder = MidiDecoder::new(Bytes(&[0x90, 60, 100]));
//! let packet = decoder.try_read().unwrap();
//! assert_eq!(
//!     MidiMessage::try_from(packet),
//!     Ok(MidiMessage::NoteOn { channel: 0, note: 60, velocity: 100 })
//! );
//! ```
//!
//! # Features
//!
//! - **`defmt`**: enable [`defmt::Format`] implementations on the packet,
//!   message, and error types.

#![no_std]

pub use decoder::{MidiDecoder, DIN_BYTE_TIMEOUT_US, PACKET_BYTE_TIMEOUT_US};
pub use error::MidiError;
pub use message::{MidiMessage, CC_ALL_NOTES_OFF, CC_ALL_SOUND_OFF, CC_MODULATION};
pub use packet::{is_status_byte, Packet};
pub use transport::MidiTransport;

mod decoder;
mod error;
mod message;
mod packet;
mod transport;
