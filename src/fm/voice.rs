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

//! Four operator FM voice - main synthesis entry point
//!
//! Every tick the voice looks for trigger and choke edges, runs the two
//! amplitude ramps and the pitch glide ramp, then renders the operators in
//! order. FM inputs are computed from the outputs of the previous tick, so
//! routings with loops behave as a network with one sample of delay.

use std::sync::Arc;

use log::{debug, trace};

use super::algorithms::Algorithms;
use super::config::{EngineConfig, Preset};
use super::operator::Operator;
use super::patch::{Inputs, Patch};
use super::ramp::Ramp;
use super::ratios::RatioBank;
use super::wavetables::{WavetableBank, Wavetables};

use crate::stmlib::dsp::crossfade;
use crate::stmlib::trigger::SchmittTrigger;
use crate::{NUM_ALGORITHMS, NUM_OPERATORS, NUM_RAMPS};

/// Pitch range in octaves on either side of the reference frequency
pub const PITCH_RANGE: f32 = 4.0;

/// Share of a rate or feedback knob covered by one volt of CV
const CV_SCALE: f32 = 0.2;

/// Gate inputs are halved before reaching the edge detectors, which fire at 1
const GATE_SCALE: f32 = 0.5;

/// Ramp driving the amplitude of each operator
const AMPLITUDE_RAMP: [usize; NUM_OPERATORS] = [0, 1, 0, 1];

/// Ramp index of the pitch glide
const GLIDE_RAMP: usize = 2;

/// Parameters captured on the last trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Latched {
    /// Pitch at the top of the glide, in octaves
    pub start_pitch: f32,
    /// Pitch at the bottom of the glide, in octaves
    pub end_pitch: f32,
    /// Rates of the two amplitude ramps and of the glide
    pub rates: [f32; NUM_RAMPS],
    /// Ratio selection index
    pub ratio: usize,
    /// Wave selection index
    pub wave: usize,
    /// Algorithm index
    pub algorithm: usize,
    /// Operator 1 feedback amount
    pub feedback: f32,
    /// Whether the accent fired with the trigger
    pub accent: bool,
    /// Global FM index
    pub index: f32,
    /// Output level
    pub level: f32,
}

impl Latched {
    fn new(preset: Preset) -> Self {
        Self {
            start_pitch: 0.0,
            end_pitch: 0.0,
            rates: [0.0; NUM_RAMPS],
            ratio: 0,
            wave: 0,
            algorithm: 0,
            feedback: 0.0,
            accent: false,
            index: preset.index,
            level: preset.level,
        }
    }
}

/// One rendered tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VoiceOutput {
    /// Mixed audio sample
    pub out: f32,
    /// Output of each operator, for monitoring only
    pub taps: [f32; NUM_OPERATORS],
}

/// Four operator FM voice
pub struct Voice<W: WavetableBank = Wavetables> {
    config: EngineConfig,
    algorithms: Arc<Algorithms>,
    ratios: Arc<RatioBank>,
    wavetables: Arc<W>,
    operators: [Operator; NUM_OPERATORS],
    ramps: [Ramp; NUM_RAMPS],
    trigger: SchmittTrigger,
    accent: SchmittTrigger,
    choke: SchmittTrigger,
    latched: Latched,
}

impl Voice<Wavetables> {
    /// Creates a voice with the built-in tables
    pub fn new(config: EngineConfig) -> Self {
        Self::with_banks(
            config,
            Arc::new(Algorithms::new()),
            Arc::new(RatioBank::default()),
            Arc::new(Wavetables::new()),
        )
    }
}

impl Default for Voice<Wavetables> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<W: WavetableBank> Voice<W> {
    /// Creates a voice reading shared, read-only tables
    pub fn with_banks(
        config: EngineConfig,
        algorithms: Arc<Algorithms>,
        ratios: Arc<RatioBank>,
        wavetables: Arc<W>,
    ) -> Self {
        Self {
            operators: [Operator::new(config.reference_frequency); NUM_OPERATORS],
            ramps: [Ramp::new(config.min_ramp_time); NUM_RAMPS],
            trigger: SchmittTrigger::default(),
            accent: SchmittTrigger::default(),
            choke: SchmittTrigger::default(),
            latched: Latched::new(config.normal),
            config,
            algorithms,
            ratios,
            wavetables,
        }
    }

    /// Silences the voice and forgets the latched parameters
    pub fn reset(&mut self) {
        self.operators.iter_mut().for_each(Operator::reset);
        self.ramps.iter_mut().for_each(Ramp::reset);
        self.trigger.reset();
        self.accent.reset();
        self.choke.reset();
        self.latched = Latched::new(self.config.normal);
    }

    /// Renders one tick of `dt` seconds
    pub fn process(&mut self, patch: &Patch, inputs: &Inputs, dt: f32) -> VoiceOutput {
        // All three detectors run on every tick
        let accent = self.accent.process(inputs.accent * GATE_SCALE);
        if self.trigger.process(inputs.trigger * GATE_SCALE) {
            self.latch(patch, inputs, accent);
            self.ramps.iter_mut().for_each(Ramp::trigger);
        }

        if self.choke.process(inputs.choke * GATE_SCALE) {
            trace!("VOICE: choke");
            self.ramps.iter_mut().for_each(Ramp::choke);
        }

        let rates = self.latched.rates;
        self.ramps[0].process(0.0, 0.0, rates[0], dt, false);
        self.ramps[1].process(0.0, 0.0, rates[1], dt, false);

        let mut pitch = self.latched.start_pitch;
        if rates[GLIDE_RAMP] > self.config.glide_threshold {
            // Free running: the glide restarts every time it lands
            self.ramps[GLIDE_RAMP].process(
                self.config.glide_shape,
                0.0,
                1.0 - rates[GLIDE_RAMP],
                dt,
                true,
            );
            pitch = crossfade(
                self.latched.end_pitch,
                self.latched.start_pitch,
                self.ramps[GLIDE_RAMP].output(),
            );
        }

        let previous = self.taps();
        let ratios = self.ratios.selection(self.latched.ratio);
        let waves = self.wavetables.selection(self.latched.wave);
        let algorithm = self.latched.algorithm;

        for (i, op) in self.operators.iter_mut().enumerate() {
            op.set_pitch(pitch);
            op.apply_ratio(self.ratios.ratios()[ratios[i]]);

            let fm = self
                .algorithms
                .fm_input(algorithm, i, &previous, self.latched.index);
            let amplitude = self.ramps[AMPLITUDE_RAMP[i]].output();
            let feedback = if i == 0 { self.latched.feedback } else { 0.0 };

            op.process(dt, amplitude, fm, feedback, &*self.wavetables, waves[i]);
        }

        let taps = self.taps();
        let mix = self.algorithms.mix(algorithm, &taps);

        VoiceOutput {
            out: mix * self.config.output_gain * self.latched.level,
            taps,
        }
    }

    /// Captures the knobs and CVs, clamping everything into range
    fn latch(&mut self, patch: &Patch, inputs: &Inputs, accent: bool) {
        let preset = if accent {
            self.config.accent
        } else {
            self.config.normal
        };

        let rates = [
            patch.rate1 + CV_SCALE * inputs.rate1,
            patch.rate2 + CV_SCALE * patch.rate2_attenuverter * inputs.rate2,
            patch.speed + CV_SCALE * inputs.speed,
        ];

        self.latched = Latched {
            start_pitch: clamp_cv(patch.start + inputs.start + patch.fine, -PITCH_RANGE, PITCH_RANGE),
            end_pitch: clamp_cv(patch.end + inputs.end, -PITCH_RANGE, PITCH_RANGE),
            rates: rates.map(|rate| clamp_cv(rate, 0.0, 1.0)),
            ratio: select_index(
                patch.ratio,
                inputs.ratio * patch.ratio_attenuverter,
                self.ratios.num_selections(),
            ),
            wave: select_index(
                patch.wave,
                inputs.wave * patch.wave_attenuverter,
                self.wavetables.num_selections(),
            ),
            algorithm: select_index(patch.algorithm, inputs.algorithm, NUM_ALGORITHMS),
            feedback: clamp_cv(patch.feedback + CV_SCALE * inputs.feedback, 0.0, 1.0),
            accent,
            index: preset.index,
            level: preset.level,
        };

        debug!("VOICE: trigger, latched {:?}", self.latched);
    }

    /// Outputs of the four operators from the last tick
    #[inline]
    pub fn taps(&self) -> [f32; NUM_OPERATORS] {
        [
            self.operators[0].output(),
            self.operators[1].output(),
            self.operators[2].output(),
            self.operators[3].output(),
        ]
    }

    /// Parameters captured on the last trigger
    pub fn latched(&self) -> &Latched {
        &self.latched
    }

    /// Current output of ramp `i` (0 and 1 amplitude, 2 glide)
    pub fn ramp_output(&self, i: usize) -> f32 {
        self.ramps[i].output()
    }

    /// Ramp `i` (0 and 1 amplitude, 2 glide)
    pub fn ramp(&self, i: usize) -> &Ramp {
        &self.ramps[i]
    }

    /// Operator `i`
    pub fn operator(&self, i: usize) -> &Operator {
        &self.operators[i]
    }

    /// Configuration the voice was built with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Routing tables
    pub fn algorithms(&self) -> &Algorithms {
        &self.algorithms
    }

    /// Ratio tables
    pub fn ratios(&self) -> &RatioBank {
        &self.ratios
    }

    /// Wave tables
    pub fn wavetables(&self) -> &W {
        &self.wavetables
    }

    /// Whether every envelope has settled at zero
    pub fn is_silent(&self) -> bool {
        self.ramps[0].output() == 0.0
            && self.ramps[1].output() == 0.0
            && !self.ramps[0].gate()
            && !self.ramps[1].gate()
    }
}

/// Clamps a control value, NaN falls to the lower bound
#[inline]
fn clamp_cv(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Knob (truncated) plus rounded offset, clamped to `[0, len)`
#[inline]
fn select_index(knob: f32, offset: f32, len: usize) -> usize {
    let max = len.saturating_sub(1).min(i32::MAX as usize) as i32;
    let index = (knob as i32).saturating_add(offset.round() as i32);
    index.clamp(0, max) as usize
}
