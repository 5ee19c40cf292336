//! Status-byte synchronised packet decoder.
//!
//! [`MidiDecoder`] scans the transport for a byte with its high bit set and
//! then collects the two data bytes that follow. The timeout-bounded
//! [`try_read`](MidiDecoder::try_read) never stalls the caller: an empty
//! transport or a frame whose data bytes do not arrive in time yields
//! `None`, and the next call starts synchronising from scratch.

use crate::packet::{is_status_byte, Packet};
use crate::transport::MidiTransport;

/// Default time to wait for each data byte of a frame, in microseconds.
///
/// Only long enough for bytes already sitting in a receive buffer. A
/// decoder polled mid-frame on a live serial link needs at least one byte
/// time; see [`DIN_BYTE_TIMEOUT_US`].
pub const PACKET_BYTE_TIMEOUT_US: u32 = 50;

/// Per-byte timeout for a 31250 baud DIN link: one byte time (320 µs)
/// plus margin.
///
/// A poll that lands just after a status byte must still wait out both data
/// bytes, or the frame is abandoned and its data bytes are later discarded
/// as sync noise.
pub const DIN_BYTE_TIMEOUT_US: u32 = 400;

/// Decodes a raw MIDI byte stream into [`Packet`]s.
///
/// The decoder holds no framing state between calls.
pub struct MidiDecoder<T> {
    transport: T,
    byte_timeout_us: u32,
}

impl<T> MidiDecoder<T>
where
    T: MidiTransport,
{
    /// Create a decoder using the default per-byte timeout
    /// ([`PACKET_BYTE_TIMEOUT_US`]).
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            byte_timeout_us: PACKET_BYTE_TIMEOUT_US,
        }
    }

    /// Override the time [`try_read`](Self::try_read) waits for each data byte.
    pub fn with_byte_timeout(mut self, byte_timeout_us: u32) -> Self {
        self.byte_timeout_us = byte_timeout_us;
        self
    }

    /// Per-byte timeout currently in effect, in microseconds.
    pub fn byte_timeout_us(&self) -> u32 {
        self.byte_timeout_us
    }

    /// Block until a complete packet has been read.
    ///
    /// Data bytes preceding the first status byte are discarded.
    pub fn read(&mut self) -> Packet {
        let status = loop {
            let byte = self.transport.read_byte();
            if is_status_byte(byte) {
                break byte;
            }
        };

        let data1 = self.transport.read_byte();
        let data2 = self.transport.read_byte();

        Packet {
            status,
            data1,
            data2,
        }
    }

    /// Read a packet without blocking.
    ///
    /// Returns `None` if the transport runs dry before a status byte is
    /// found, or if either data byte fails to arrive within the per-byte
    /// timeout. An abandoned frame is dropped; its bytes are not replayed.
    pub fn try_read(&mut self) -> Option<Packet> {
        let status = loop {
            let byte = self.transport.try_read_byte(0)?;
            if is_status_byte(byte) {
                break byte;
            }
        };

        let data1 = self.transport.try_read_byte(self.byte_timeout_us)?;
        let data2 = self.transport.try_read_byte(self.byte_timeout_us)?;

        Some(Packet {
            status,
            data1,
            data2,
        })
    }

    /// Mutable access to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the decoder and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
