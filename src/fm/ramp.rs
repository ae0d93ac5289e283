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

//! Single segment ramp generator used for the amplitude and pitch envelopes
//!
//! The ramp rises toward 1 while its gate is set, clears its own gate at the
//! top, then falls back to 0. Curvature is a crossfade between a linear, a
//! logarithmic and an exponential slope. In cycling mode the gate re-asserts
//! at the bottom and the ramp turns into a free running LFO.

use crate::stmlib::dsp::{crossfade, sign};
use crate::stmlib::trigger::PulseGenerator;

/// Distance to the target below which a segment is considered complete
pub const EPSILON: f32 = 1e-3;

/// Weight of the logarithmic slope for a shape of -1
pub const LOG_SHAPE_WEIGHT: f32 = 0.95;

/// Weight of the exponential slope for a shape of +1
pub const EXP_SHAPE_WEIGHT: f32 = 0.90;

/// Duration of the end of cycle pulse in seconds
const END_OF_CYCLE_PULSE: f32 = 1e-3;

/// Segment the ramp is currently travelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampStage {
    /// Moving up toward 1
    Rising,
    /// Moving down toward 0
    Falling,
    /// Settled on its target
    Idle,
}

/// Ramp generator state
#[derive(Debug, Clone, Copy)]
pub struct Ramp {
    min_time: f32,
    output: f32,
    gate: bool,
    stage: RampStage,
    end_of_cycle: PulseGenerator,
    end_of_cycle_high: bool,
}

impl Ramp {
    /// Creates an idle ramp whose fastest time constant is `min_time` seconds
    pub fn new(min_time: f32) -> Self {
        Self {
            min_time,
            output: 0.0,
            gate: false,
            stage: RampStage::Idle,
            end_of_cycle: PulseGenerator::default(),
            end_of_cycle_high: false,
        }
    }

    /// Time constant in seconds for a rate parameter in `[0, 1]`
    #[inline]
    pub fn time_constant(&self, rate: f32) -> f32 {
        self.min_time * 2.0f32.powf(rate * 20.0)
    }

    /// Slope (per second) for a distance `delta` to the target.
    ///
    /// A shape of 0 is linear, negative shapes lean toward a logarithmic
    /// curve and positive shapes toward an exponential one.
    #[inline]
    pub fn shape_delta(delta: f32, tau: f32, shape: f32) -> f32 {
        let lin = sign(delta) * 10.0 / tau;
        if shape < 0.0 {
            let log = sign(delta) * 40.0 / tau / (delta.abs() + 1.0);
            crossfade(lin, log, -shape * LOG_SHAPE_WEIGHT)
        } else {
            let exp = std::f32::consts::E * delta / tau;
            crossfade(lin, exp, shape * EXP_SHAPE_WEIGHT)
        }
    }

    /// Advances the ramp by `dt` seconds.
    ///
    /// `rise_rate` and `fall_rate` select the time constant of each segment.
    /// The fall rate is clamped to `[0, 1]`, the rise rate is used as is.
    pub fn process(&mut self, shape: f32, rise_rate: f32, fall_rate: f32, dt: f32, cycle: bool) {
        let target = if self.gate { 1.0 } else { 0.0 };
        let delta = target - self.output;

        let mut rising = false;
        let mut falling = false;

        if delta > 0.0 {
            let tau = self.time_constant(rise_rate);
            self.output += Self::shape_delta(delta, tau, shape) * dt;
            rising = target - self.output > EPSILON;
            if !rising {
                // Top reached: the ramp is attack-then-decay
                self.gate = false;
            }
        } else if delta < 0.0 {
            let tau = self.time_constant(fall_rate.clamp(0.0, 1.0));
            self.output += Self::shape_delta(delta, tau, shape) * dt;
            falling = target - self.output < -EPSILON;
            if !falling {
                self.end_of_cycle.trigger(END_OF_CYCLE_PULSE);
                if cycle {
                    self.gate = true;
                }
            }
        } else {
            self.gate = false;
        }

        if !rising && !falling {
            self.output = target;
        }

        self.stage = if rising {
            RampStage::Rising
        } else if falling {
            RampStage::Falling
        } else {
            RampStage::Idle
        };

        self.end_of_cycle_high = self.end_of_cycle.process(dt);
    }

    /// Sets the gate so the next call starts a new rise
    #[inline]
    pub fn trigger(&mut self) {
        self.gate = true;
    }

    /// Clears the gate and silences the ramp immediately
    #[inline]
    pub fn choke(&mut self) {
        self.gate = false;
        self.output = 0.0;
        self.stage = RampStage::Idle;
    }

    /// Returns the ramp to its power-on state
    pub fn reset(&mut self) {
        *self = Self::new(self.min_time);
    }

    /// Current output in `[0, 1]`
    #[inline]
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Whether the gate is held high
    #[inline]
    pub fn gate(&self) -> bool {
        self.gate
    }

    /// Segment travelled during the last call to [`Ramp::process`]
    #[inline]
    pub fn stage(&self) -> RampStage {
        self.stage
    }

    /// High for 1 ms after a fall completes
    #[inline]
    pub fn end_of_cycle(&self) -> bool {
        self.end_of_cycle_high
    }
}

impl Default for Ramp {
    fn default() -> Self {
        Self::new(1e-3)
    }
}
