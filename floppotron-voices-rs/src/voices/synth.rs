//! Process-wide synthesizer state.

use floppotron_midi::{
    MidiMessage, Packet, CC_ALL_NOTES_OFF, CC_ALL_SOUND_OFF, CC_MODULATION,
};

use super::config::SynthConfig;
use super::dispatcher::{apply_pitch_bend, reconcile};
use super::envelope::EnvelopeConfig;
use super::note_stack::NoteStack;
use super::oscillator::Voice;
use super::pitch_bend::PitchBend;

const VALUE_MAX: u8 = 0x7F;

/// Control-voltage and gate outputs driven from the held-note state.
pub trait ExpressionOutput {
    /// Velocity of the most recently pressed held note, `0..=127`.
    fn set_velocity(&mut self, velocity: u8);
    /// High while any note is held.
    fn set_gate(&mut self, gate: bool);
    /// Modulation-wheel position, `0..=127`.
    fn set_mod(&mut self, modulation: u8);
}

/// Everything the control loop mutates: held notes, voices, pitch bend,
/// modulation and configuration.
///
/// Each control cycle feeds zero or more MIDI messages through
/// [`handle_message`](Self::handle_message), then calls
/// [`run_cycle`](Self::run_cycle) so note changes always land before
/// reconciliation. Pitch bend is the exception and retunes sounding voices
/// as soon as it arrives.
pub struct Synth<V, const N: usize> {
    notes: NoteStack,
    voices: [V; N],
    bend: PitchBend,
    modulation: u8,
    config: SynthConfig,
}

impl<V: Voice, const N: usize> Synth<V, N> {
    /// Build the synthesizer around `voices`, applying the configured
    /// envelope to each.
    pub fn new(mut voices: [V; N], config: SynthConfig) -> Self {
        let notes = NoteStack::new();
        for voice in voices.iter_mut() {
            voice.configure_envelope(&config.envelope);
        }
        Self {
            notes,
            voices,
            bend: PitchBend::NONE,
            modulation: 0,
            config,
        }
    }

    /// Apply one MIDI message. Messages on other channels are ignored when
    /// a channel is configured.
    pub fn handle_message(&mut self, message: MidiMessage) {
        if !self.config.accepts_channel(message.channel()) {
            return;
        }

        match message {
            MidiMessage::NoteOn { note, velocity, .. } => self.notes.push(note, velocity),
            MidiMessage::NoteOff { note, .. } => self.notes.remove(note),
            MidiMessage::PitchBend { value, .. } => {
                self.bend = PitchBend::from_raw(value, self.config.pitch_bend_range);
                apply_pitch_bend(&mut self.voices, self.bend);
            }
            MidiMessage::ControlChange {
                controller, value, ..
            } => self.handle_control_change(controller, value),
        }
    }

    /// Decode and apply a raw packet. Unsupported status bytes are dropped.
    pub fn handle_packet(&mut self, packet: Packet) {
        match MidiMessage::try_from(packet) {
            Ok(message) => self.handle_message(message),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("dropping packet: {}", _e);
            }
        }
    }

    fn handle_control_change(&mut self, controller: u8, value: u8) {
        match controller {
            CC_MODULATION => self.modulation = value.min(VALUE_MAX),
            CC_ALL_SOUND_OFF | CC_ALL_NOTES_OFF => self.notes.clear(),
            _ => {
                #[cfg(feature = "defmt")]
                defmt::trace!("ignoring CC {} = {}", controller, value);
            }
        }
    }

    /// Reconcile held notes against the voices.
    pub fn run_cycle(&mut self) {
        reconcile(&self.notes, &mut self.voices, self.bend);
    }

    /// Advance every voice envelope by one control tick.
    pub fn tick(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.tick();
        }
    }

    /// Push velocity, gate and modulation to `output`.
    pub fn write_expression<E: ExpressionOutput>(&self, output: &mut E) {
        output.set_velocity(self.notes.top_velocity().min(VALUE_MAX));
        output.set_gate(!self.notes.is_empty());
        output.set_mod(self.modulation);
    }

    /// Replace the envelope on every voice. Sounding notes keep their
    /// current envelope until retriggered.
    pub fn configure_envelope(&mut self, envelope: EnvelopeConfig) {
        self.config.envelope = envelope;
        for voice in self.voices.iter_mut() {
            voice.configure_envelope(&envelope);
        }
    }

    pub fn notes(&self) -> &NoteStack {
        &self.notes
    }

    pub fn voices(&self) -> &[V; N] {
        &self.voices
    }

    pub fn voices_mut(&mut self) -> &mut [V; N] {
        &mut self.voices
    }

    /// Bend currently applied to new and sounding notes.
    pub fn pitch_bend(&self) -> PitchBend {
        self.bend
    }

    pub fn modulation(&self) -> u8 {
        self.modulation
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
