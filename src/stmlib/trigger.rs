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

//! Edge detection and pulse utilities for control signals

/// Rising edge detector with hysteresis.
///
/// The trigger fires once when the input reaches the high threshold and
/// re-arms only after the input has dropped to the low threshold.
#[derive(Debug, Clone, Copy)]
pub struct SchmittTrigger {
    armed: bool,
    low_threshold: f32,
    high_threshold: f32,
}

impl SchmittTrigger {
    /// Creates an armed trigger with the given thresholds
    pub fn new(low_threshold: f32, high_threshold: f32) -> Self {
        Self {
            armed: true,
            low_threshold,
            high_threshold,
        }
    }

    /// Processes one sample, returns true on a rising edge
    #[inline]
    pub fn process(&mut self, input: f32) -> bool {
        if self.armed {
            if input >= self.high_threshold {
                self.armed = false;
                return true;
            }
        } else if input <= self.low_threshold {
            self.armed = true;
        }
        false
    }

    /// Whether the next crossing of the high threshold will fire
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Re-arms the trigger
    pub fn reset(&mut self) {
        self.armed = true;
    }
}

impl Default for SchmittTrigger {
    /// Thresholds of 0 and 1
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// Emits a high signal for a fixed duration after being triggered
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseGenerator {
    remaining: f32,
}

impl PulseGenerator {
    /// Starts (or extends) a pulse of `duration` seconds
    pub fn trigger(&mut self, duration: f32) {
        if duration > self.remaining {
            self.remaining = duration;
        }
    }

    /// Advances time by `dt` seconds, returns whether the pulse is high
    #[inline]
    pub fn process(&mut self, dt: f32) -> bool {
        if self.remaining > 0.0 {
            self.remaining -= dt;
            true
        } else {
            false
        }
    }

    /// Whether the pulse is currently high
    pub fn is_high(&self) -> bool {
        self.remaining > 0.0
    }

    /// Cancels any pending pulse
    pub fn reset(&mut self) {
        self.remaining = 0.0;
    }
}
