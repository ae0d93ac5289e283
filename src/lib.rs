// Copyright 2025 Tyler Neely (tylerneely@gmail.com).
// Copyright 2021 Emilie Gillet (emilie.o.gillet@gmail.com)
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.
//
// See http://creativecommons.org/licenses/MIT/ for more information.

//! Four operator wavetable FM percussion voice.
//!
//! Four phase accumulating operators read single cycle waves and modulate
//! each other through one of six routings. Two decaying ramps shape the
//! operator amplitudes and a third, free running one glides the pitch. A
//! trigger latches every control, an accent selects a louder and brighter
//! preset and a choke silences the voice at once.

#![warn(missing_docs)]

pub mod fm;
mod stmlib;
pub mod synth;
pub mod wav;

/// Default sample rate used by the renderer (in Hz)
pub const SAMPLE_RATE: f32 = 48000.0;

/// Frequency of a zero pitch offset, C4 (in Hz)
pub const REFERENCE_FREQUENCY: f32 = 261.6256;

/// Number of operators in a voice
pub const NUM_OPERATORS: usize = 4;

/// Number of routing algorithms
pub const NUM_ALGORITHMS: usize = 6;

/// Number of ramps in a voice: two amplitude envelopes and the pitch glide
pub const NUM_RAMPS: usize = 3;

pub use fm::{EngineConfig, Inputs, Patch, Voice, VoiceOutput};
pub use synth::{Hit, Synth};

/// Length of the trigger pulses sent by [`Patch::generate_samples`] (in seconds)
const TRIGGER_LENGTH: f32 = 1e-3;

impl Patch {
    /// Renders one hit of this patch with the default configuration.
    ///
    /// The trigger fires on the first sample and the buffer is exactly
    /// `duration` long.
    pub fn generate_samples(
        &self,
        accent: bool,
        sample_rate: u32,
        duration: std::time::Duration,
    ) -> Vec<f32> {
        let dt = 1.0 / sample_rate as f32;
        let n_samples = (duration.as_secs_f64() * sample_rate as f64) as usize;
        let trigger_samples = (TRIGGER_LENGTH * sample_rate as f32).ceil() as usize;

        let mut voice = Voice::new(EngineConfig::default());
        let gate = Inputs {
            trigger: 10.0,
            accent: if accent { 10.0 } else { 0.0 },
            ..Inputs::default()
        };
        let idle = Inputs::default();

        (0..n_samples)
            .map(|i| {
                let inputs = if i < trigger_samples { &gate } else { &idle };
                voice.process(self, inputs, dt).out
            })
            .collect()
    }
}
