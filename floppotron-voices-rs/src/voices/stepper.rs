//! Interrupt-side half of a voice: the drive's step and direction lines.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::{OutputPin, PinState};

use super::error::StepperError;

/// Step pulses per sweep before the head reverses direction.
///
/// Keeps the head inside the 80 tracks of a 3.5" drive.
pub const TRACK_STEPS: u8 = 80;

/// Mechanical driver for one floppy drive.
///
/// Owned by the timer interrupt handler, which calls
/// [`mechanical_step`](Self::mechanical_step) once per output half-cycle.
/// The step counter, direction and step-line level are written only here.
/// Mechanical power is switched by the paired
/// [`Oscillator`](super::Oscillator) and only read through `powered`.
pub struct Stepper<'a, S, D> {
    step_pin: S,
    dir_pin: D,
    powered: &'a AtomicBool,
    counter: u8,
    forward: bool,
    step_high: bool,
}

impl<'a, S, D> Stepper<'a, S, D>
where
    S: OutputPin,
    D: OutputPin<Error = S::Error>,
{
    /// Create a stepper with both lines assumed low and the counter at 0.
    pub fn new(step_pin: S, dir_pin: D, powered: &'a AtomicBool) -> Self {
        Self {
            step_pin,
            dir_pin,
            powered,
            counter: 0,
            forward: false,
            step_high: false,
        }
    }

    /// Toggle the step line, reversing direction every [`TRACK_STEPS`]
    /// rising edges.
    ///
    /// Returns [`StepperError::Unpowered`] without touching any line while
    /// the drive is unpowered.
    pub fn mechanical_step(&mut self) -> Result<(), StepperError<S::Error>> {
        if !self.powered.load(Ordering::Acquire) {
            return Err(StepperError::Unpowered);
        }

        self.step_high = !self.step_high;
        if self.step_high {
            self.counter += 1;
            if self.counter >= TRACK_STEPS {
                self.counter = 0;
                self.forward = !self.forward;
                self.dir_pin.set_state(PinState::from(self.forward))?;
            }
        }

        self.step_pin.set_state(PinState::from(self.step_high))?;
        Ok(())
    }

    /// Rising edges since the last direction change.
    pub fn counter(&self) -> u8 {
        self.counter
    }

    /// Current level of the direction line.
    pub fn is_forward(&self) -> bool {
        self.forward
    }

    /// Current level of the step line.
    pub fn is_step_high(&self) -> bool {
        self.step_high
    }

    /// Release the pins.
    pub fn free(self) -> (S, D) {
        (self.step_pin, self.dir_pin)
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
