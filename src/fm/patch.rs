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

//! Front panel settings and per-sample control voltages

use serde::{Deserialize, Serialize};

/// Knob positions of the voice.
///
/// Pitches are in octaves relative to the reference frequency, selection
/// knobs are table indices and everything else is in the unit range unless
/// noted otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Patch {
    /// Start pitch, -4 to 4 octaves
    pub start: f32,
    /// Fine tuning of the start pitch, -0.2 to 0.2 octaves
    pub fine: f32,
    /// End pitch of the glide, -4 to 4 octaves
    pub end: f32,
    /// Ratio selection, 0 to 31
    pub ratio: f32,
    /// Wave selection, 0 to 63
    pub wave: f32,
    /// Algorithm, 0 to 5
    pub algorithm: f32,
    /// Operator 1 self feedback
    pub feedback: f32,
    /// Decay rate of operators 1 and 3
    pub rate1: f32,
    /// Decay rate of operators 2 and 4
    pub rate2: f32,
    /// Pitch glide speed, glide is off at 0.2 and below
    pub speed: f32,
    /// Attenuverter of the rate 2 CV, -1 to 1
    pub rate2_attenuverter: f32,
    /// Attenuverter of the wave CV, -1 to 1
    pub wave_attenuverter: f32,
    /// Attenuverter of the ratio CV, -1 to 1
    pub ratio_attenuverter: f32,
}

impl Default for Patch {
    fn default() -> Self {
        Self {
            start: 0.0,
            fine: 0.0,
            end: 0.0,
            ratio: 0.0,
            wave: 0.0,
            algorithm: 0.0,
            feedback: 0.0,
            rate1: 0.5,
            rate2: 0.5,
            speed: 0.0,
            rate2_attenuverter: 0.0,
            wave_attenuverter: 0.0,
            ratio_attenuverter: 0.0,
        }
    }
}

impl Patch {
    /// Reads a patch from JSON, missing fields keep their defaults
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the patch to pretty printed JSON
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Control voltages sampled every tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inputs {
    /// Added to the start pitch, 1 V per octave
    pub start: f32,
    /// Added to the end pitch, 1 V per octave
    pub end: f32,
    /// Ratio selection offset, scaled by its attenuverter
    pub ratio: f32,
    /// Wave selection offset, scaled by its attenuverter
    pub wave: f32,
    /// Algorithm offset, 1 V per step
    pub algorithm: f32,
    /// Feedback offset, 5 V for the full range
    pub feedback: f32,
    /// Rate 1 offset, 5 V for the full range
    pub rate1: f32,
    /// Rate 2 offset, scaled by its attenuverter
    pub rate2: f32,
    /// Glide speed offset, 5 V for the full range
    pub speed: f32,
    /// Trigger gate, fires at 2 V
    pub trigger: f32,
    /// Accent gate, sampled on trigger
    pub accent: f32,
    /// Choke gate, fires at 2 V
    pub choke: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let patch = Patch::from_json(r#"{ "algorithm": 2, "feedback": 0.25 }"#).unwrap();
        assert_eq!(patch.algorithm, 2.0);
        assert_eq!(patch.feedback, 0.25);
        assert_eq!(patch.rate1, 0.5);
        assert_eq!(patch.rate2, 0.5);
    }

    #[test]
    fn test_json_round_trip() {
        let patch = Patch {
            start: -1.5,
            fine: 0.1,
            ratio: 17.0,
            wave: 42.0,
            speed: 0.75,
            ratio_attenuverter: -0.5,
            ..Patch::default()
        };
        let json = patch.to_json().unwrap();
        assert!(json.contains("\"ratio_attenuverter\""));
        assert_eq!(Patch::from_json(&json).unwrap(), patch);
    }

    #[test]
    fn test_json_rejects_garbage() {
        assert!(Patch::from_json("{ algorithm: }").is_err());
    }
}
