//! Error types for the voice hardware halves.

use core::fmt;

/// Errors that can occur when stepping a drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperError<E> {
    /// Underlying GPIO error.
    Pin(E),

    /// Mechanical power is off; the step was skipped.
    Unpowered,
}

// Allow ergonomic `?` propagation from raw pin errors.
impl<E> From<E> for StepperError<E> {
    fn from(error: E) -> Self {
        StepperError::Pin(error)
    }
}

impl<E: fmt::Debug> fmt::Display for StepperError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StepperError::Pin(e) => write!(f, "Pin error: {:?}", e),
            StepperError::Unpowered => write!(f, "Drive is not powered"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for StepperError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            StepperError::Pin(e) => defmt::write!(f, "Pin error: {}", e),
            StepperError::Unpowered => defmt::write!(f, "Drive is not powered"),
        }
    }
}
