//! Four operator wavetable FM voice

pub mod algorithms;
pub mod config;
pub mod operator;
pub mod patch;
pub mod ramp;
pub mod ratios;
pub mod voice;
pub mod wavetables;

pub use algorithms::Algorithms;
pub use config::{EngineConfig, Preset};
pub use operator::Operator;
pub use patch::{Inputs, Patch};
pub use ramp::{Ramp, RampStage};
pub use ratios::RatioBank;
pub use voice::{Latched, Voice, VoiceOutput};
pub use wavetables::{WavetableBank, Wavetables};
