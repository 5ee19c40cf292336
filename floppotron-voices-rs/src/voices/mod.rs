//! Voice allocation and tone generation for floppy-drive stepper motors.
//!
//! This module holds everything between decoded MIDI messages and the
//! hardware registers that make the drives sing. The central type is
//! [`Synth`], the single process-wide state structure owned by the control
//! loop.
//!
//! # Architecture
//!
//! ```text
//! MidiMessage ─► NoteStack ──┐
//!            └─► PitchBend ──┼─► reconcile() ─► Oscillator ─► FrequencyOutput
//!                            │                      │
//!                            │                 power flag (AtomicBool)
//!                            │                      ▼
//!      PWM wrap interrupt ───┴──────────────► Stepper ─► step / dir lines
//! ```
//!
//! - [`NoteStack`] keeps every held note, most recently pressed first.
//! - [`reconcile`] maps the top `N` held notes onto the `N` voices once per
//!   control cycle, keeping voices whose note is still held untouched.
//! - [`Oscillator`] converts a note plus [`PitchBend`] into a period and
//!   clock divider using the [`NOTE_TABLE`] calibration, and owns the
//!   voice [`Envelope`].
//! - [`Stepper`] toggles the step line from the timer interrupt and turns
//!   the head around every [`TRACK_STEPS`] steps.
//!
//! # Interrupt safety
//!
//! Each voice is split into an [`Oscillator`] (main loop) and a [`Stepper`]
//! (interrupt handler). The only state they share is the mechanical power
//! flag, which the oscillator writes and the stepper reads. No field is
//! written from both contexts, so no locking is needed between them.
//!
//! # `no_std` Compatibility
//!
//! No heap allocation is used. All storage is fixed-size arrays sized by
//! [`NOTE_COUNT`] and the voice count const parameter. The optional
//! `defmt` feature enables structured logging for embedded targets.

mod config;
mod dispatcher;
mod envelope;
mod error;
mod note_stack;
mod note_table;
mod oscillator;
mod pitch_bend;
mod stepper;
mod synth;

pub use config::SynthConfig;
pub use dispatcher::{apply_pitch_bend, reconcile};
pub use envelope::{Envelope, EnvelopeConfig, EnvelopePhase, INSTANT, LEVEL_MAX};
pub use error::StepperError;
pub use note_stack::{Iter, NoteStack};
pub use note_table::{NoteTiming, NOTE_TABLE};
pub use oscillator::{FrequencyOutput, Oscillator, Voice};
pub use pitch_bend::{PitchBend, PITCH_BEND_CENTER};
pub use stepper::{Stepper, TRACK_STEPS};
pub use synth::{ExpressionOutput, Synth};

/// A MIDI note number. Valid notes are `0..NOTE_COUNT`.
pub type Note = u8;

/// Number of distinct MIDI note values.
pub const NOTE_COUNT: usize = 128;

/// Highest valid MIDI note number.
pub const NOTE_MAX: Note = 127;

/// Number of floppy-drive voices on the instrument.
pub const N_VOICES: usize = 6;
