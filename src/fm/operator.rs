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

//! Wavetable FM operator with phase accumulation and self feedback

use super::wavetables::WavetableBank;
use crate::stmlib::dsp::{euclidean_mod, interpolate_wrap, octaves_to_ratio};

/// FM operator state
#[derive(Debug, Clone, Copy)]
pub struct Operator {
    reference_frequency: f32,
    /// Phase accumulator, kept in [-0.5, 0.5)
    phase: f32,
    /// Frequency in Hz for the current tick
    frequency: f32,
    /// Last raw wavetable sample
    wave: f32,
    /// Last amplitude scaled sample
    output: f32,
    /// Raw sample before `wave`
    previous_wave: f32,
    /// Smoothed raw signal used as phase feedback
    feedback_sample: f32,
}

impl Operator {
    /// Creates an operator tuned to `reference_frequency` at zero pitch
    pub fn new(reference_frequency: f32) -> Self {
        Self {
            reference_frequency,
            phase: 0.0,
            frequency: 0.0,
            wave: 0.0,
            output: 0.0,
            previous_wave: 0.0,
            feedback_sample: 0.0,
        }
    }

    /// Resets the operator state
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::new(self.reference_frequency);
    }

    /// Sets the base frequency from an offset in octaves
    #[inline]
    pub fn set_pitch(&mut self, octaves: f32) {
        self.frequency = self.reference_frequency * octaves_to_ratio(octaves);
    }

    /// Scales the frequency by a ratio
    #[inline]
    pub fn apply_ratio(&mut self, ratio: f32) {
        self.frequency *= ratio;
    }

    /// Renders one sample.
    ///
    /// `fm` is added to the phase (half a cycle per unit) and `feedback`
    /// offsets the read position by the smoothed raw output of this operator.
    #[inline]
    pub fn process<W: WavetableBank + ?Sized>(
        &mut self,
        dt: f32,
        amplitude: f32,
        fm: f32,
        feedback: f32,
        bank: &W,
        table: usize,
    ) -> f32 {
        self.phase += self.frequency * dt + fm * 0.5;
        // The increment stays far below one cycle so a single wrap is enough
        if self.phase >= 0.5 {
            self.phase -= 1.0;
        } else if self.phase < -0.5 {
            self.phase += 1.0;
        }

        let samples = bank.table(table.min(bank.num_tables().saturating_sub(1)));
        let position = euclidean_mod(self.phase + feedback * self.feedback_sample, 1.0);
        self.wave = interpolate_wrap(samples, position * samples.len() as f32);

        self.output = self.wave * amplitude;

        self.feedback_sample = (self.wave + self.previous_wave) * 0.5;
        self.previous_wave = self.wave;

        self.output
    }

    /// Phase in cycles, in [-0.5, 0.5)
    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Frequency in Hz set for the current tick
    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Amplitude scaled output of the last tick
    #[inline]
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Raw wavetable value of the last tick
    #[inline]
    pub fn wave(&self) -> f32 {
        self.wave
    }

    /// Smoothed raw signal fed back into the phase
    #[inline]
    pub fn feedback_sample(&self) -> f32 {
        self.feedback_sample
    }
}

impl Default for Operator {
    fn default() -> Self {
        Self::new(crate::REFERENCE_FREQUENCY)
    }
}
