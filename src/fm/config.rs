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

//! Construction time constants of the voice

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Modulation depth and output level selected on trigger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Global FM index applied to every routing gain
    pub index: f32,
    /// Output level multiplier
    pub level: f32,
}

/// Voice configuration, fixed for the lifetime of a voice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frequency in Hz at a pitch of 0 octaves (C4)
    pub reference_frequency: f32,
    /// Fastest ramp time constant in seconds
    pub min_ramp_time: f32,
    /// Glide speeds at or below this value freeze the pitch
    pub glide_threshold: f32,
    /// Curvature of the pitch glide ramp
    pub glide_shape: f32,
    /// Gain applied to the mix before the level preset
    pub output_gain: f32,
    /// Preset used by plain triggers
    pub normal: Preset,
    /// Preset used when the accent fires with the trigger
    pub accent: Preset,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_frequency: crate::REFERENCE_FREQUENCY,
            min_ramp_time: 1e-3,
            glide_threshold: 0.2,
            glide_shape: 0.3,
            output_gain: 4.0,
            normal: Preset {
                index: 0.6,
                level: 1.0,
            },
            accent: Preset {
                index: 1.0,
                level: 1.8,
            },
        }
    }
}

impl EngineConfig {
    /// Reads a configuration from JSON, missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the constants describe a usable voice
    pub fn validate(&self) -> Result<()> {
        if !(self.reference_frequency.is_finite() && self.reference_frequency > 0.0) {
            bail!(
                "reference frequency must be positive, got {}",
                self.reference_frequency
            );
        }
        if !(self.min_ramp_time.is_finite() && self.min_ramp_time > 0.0) {
            bail!("minimum ramp time must be positive, got {}", self.min_ramp_time);
        }
        if !(-1.0..=1.0).contains(&self.glide_shape) {
            bail!("glide shape must lie in [-1, 1], got {}", self.glide_shape);
        }
        for (name, value) in [
            ("glide threshold", self.glide_threshold),
            ("output gain", self.output_gain),
            ("normal index", self.normal.index),
            ("normal level", self.normal.level),
            ("accent index", self.accent.index),
            ("accent level", self.accent.level),
        ] {
            if !value.is_finite() {
                bail!("{} must be finite, got {}", name, value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_presets() {
        let config = EngineConfig::default();
        assert_eq!(config.normal, Preset { index: 0.6, level: 1.0 });
        assert_eq!(config.accent, Preset { index: 1.0, level: 1.8 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_overrides() {
        let config = EngineConfig::from_json(r#"{ "reference_frequency": 440.0 }"#).unwrap();
        assert_eq!(config.reference_frequency, 440.0);
        assert_eq!(config.output_gain, 4.0);

        assert!(EngineConfig::from_json(r#"{ "min_ramp_time": 0.0 }"#).is_err());
        assert!(EngineConfig::from_json(r#"{ "glide_shape": 3.0 }"#).is_err());
    }
}
