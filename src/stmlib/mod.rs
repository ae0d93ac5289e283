//! Small DSP building blocks in the spirit of the stmlib support library

pub mod dsp;
pub mod trigger;
