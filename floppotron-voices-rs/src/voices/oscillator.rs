//! Main-loop half of a voice: pitch, envelope and drive power.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::{OutputPin, PinState};

use super::envelope::{Envelope, EnvelopeConfig};
use super::note_table::NoteTiming;
use super::pitch_bend::PitchBend;
use super::{Note, NOTE_COUNT};

/// Tone-generator registers for one voice (a PWM slice on the RP2040).
///
/// Each wrap of the generator raises the timer interrupt that drives the
/// paired [`Stepper`](super::Stepper).
pub trait FrequencyOutput {
    fn set_clock_divider(&mut self, divider: u8);
    fn set_period(&mut self, period: u16);
    /// Compare level; half the period gives a 50% duty cycle.
    fn set_duty(&mut self, level: u16);
    fn set_enabled(&mut self, enabled: bool);
}

/// The operations the dispatcher needs from a voice.
pub trait Voice {
    /// Note currently assigned, or `None` if the voice is free.
    fn note(&self) -> Option<Note>;

    /// Sound `note` with the given bend. Calling this again with the
    /// already assigned note only retunes the voice.
    fn set_note(&mut self, note: Note, bend: PitchBend);

    /// Silence the voice and mark it free.
    fn stop(&mut self);

    /// Advance the voice envelope by one control tick.
    fn tick(&mut self) {}

    /// Replace the envelope timings. Takes effect from the next trigger.
    fn configure_envelope(&mut self, _config: &EnvelopeConfig) {}
}

/// Pitch and power control for one floppy drive.
///
/// Owned by the control loop. Writes the shared `powered` flag that the
/// interrupt-side [`Stepper`](super::Stepper) reads; never touches the
/// step or direction lines.
pub struct Oscillator<'a, F, P> {
    slot: u8,
    output: F,
    power_pin: P,
    powered: &'a AtomicBool,
    note: Option<Note>,
    envelope: Envelope,
}

impl<'a, F, P> Oscillator<'a, F, P>
where
    F: FrequencyOutput,
    P: OutputPin,
{
    /// Create a silent voice. The tone generator is disabled and the drive
    /// unpowered.
    pub fn new(
        slot: u8,
        output: F,
        power_pin: P,
        powered: &'a AtomicBool,
        envelope: &EnvelopeConfig,
    ) -> Self {
        let mut osc = Self {
            slot,
            output,
            power_pin,
            powered,
            note: None,
            envelope: Envelope::new(envelope),
        };
        osc.output.set_enabled(false);
        osc.set_power(false);
        osc
    }

    /// Voice index, used for logging.
    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Returns `true` while mechanical power is switched on.
    pub fn is_powered(&self) -> bool {
        self.powered.load(Ordering::Relaxed)
    }

    pub fn output(&self) -> &F {
        &self.output
    }

    /// Release the hardware handles.
    pub fn free(self) -> (F, P) {
        (self.output, self.power_pin)
    }

    fn set_power(&mut self, on: bool) {
        // Raise the line before publishing the flag, and publish before
        // lowering it, so the stepper never steps an unpowered drive.
        if !on {
            self.powered.store(false, Ordering::Release);
        }
        if self.power_pin.set_state(PinState::from(on)).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("voice {}: power line write failed", self.slot);
        }
        if on {
            self.powered.store(true, Ordering::Release);
        }
    }
}

impl<F, P> Voice for Oscillator<'_, F, P>
where
    F: FrequencyOutput,
    P: OutputPin,
{
    fn note(&self) -> Option<Note> {
        self.note
    }

    fn set_note(&mut self, note: Note, bend: PitchBend) {
        if usize::from(note) >= NOTE_COUNT {
            return;
        }
        let Some(timing) = NoteTiming::for_note(bend.offset_note(note)) else {
            return;
        };
        let period = timing.period(bend.fraction);

        self.set_power(true);
        if self.note != Some(note) {
            self.envelope.trigger();
            #[cfg(feature = "defmt")]
            defmt::debug!("voice {}: start note {}", self.slot, note);
        }
        self.note = Some(note);

        self.output.set_clock_divider(timing.clock_divider);
        self.output.set_period(period);
        self.output.set_duty(period / 2);
        self.output.set_enabled(true);
    }

    fn stop(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::debug!("voice {}: stop note {}", self.slot, self.note);

        self.output.set_enabled(false);
        self.set_power(false);
        self.note = None;
        self.envelope.stop();
    }

    fn tick(&mut self) {
        self.envelope.progress();
    }

    fn configure_envelope(&mut self, config: &EnvelopeConfig) {
        self.envelope.configure(config);
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
