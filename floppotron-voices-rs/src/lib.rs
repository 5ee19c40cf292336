//! Voice allocation and tone generation for a floppy-drive synthesizer.
//!
//! See the [`voices`] module for the architecture overview.

#![no_std]

pub mod voices;
