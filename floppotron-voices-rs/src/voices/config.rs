//! Runtime configuration for the synthesizer.

use super::envelope::EnvelopeConfig;

/// Configuration for [`Synth`](super::Synth) and its control loop.
///
/// [`SynthConfig::default()`] reproduces the stock instrument: omni mode,
/// a ±2 semitone bend range and a 1 kHz control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SynthConfig {
    /// Pitch-bend range in semitones at full wheel deflection. Default: 2.
    pub pitch_bend_range: u8,
    /// Zero-based MIDI channel to listen on, or `None` for all channels.
    /// Default: `None`.
    pub midi_channel: Option<u8>,
    /// Envelope timings applied to every voice.
    pub envelope: EnvelopeConfig,
    /// Control-loop rate in Hz. Default: 1000. Must be non-zero.
    pub control_rate_hz: u32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            pitch_bend_range: 2,
            midi_channel: None,
            envelope: EnvelopeConfig::default(),
            control_rate_hz: 1000,
        }
    }
}

impl SynthConfig {
    /// Convert the control rate to a timer period in microseconds.
    ///
    /// Formula: `1_000_000 / control_rate_hz`. A zero rate is treated as 1 Hz.
    pub fn control_period_us(&self) -> u64 {
        1_000_000 / u64::from(self.control_rate_hz.max(1))
    }

    /// Returns `true` if a message on `channel` should be handled.
    pub fn accepts_channel(&self, channel: u8) -> bool {
        self.midi_channel.map_or(true, |wanted| wanted == channel)
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
