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

//! Wavetable storage and the per-operator wave selections
//!
//! Sample data is provided through the [`WavetableBank`] trait so the voice
//! does not care where it comes from. [`Wavetables`] is a bank of eight
//! procedurally generated single cycle waves.

use std::f64::consts::PI;

use anyhow::{bail, Result};

use crate::NUM_OPERATORS;

/// Number of waves in the built-in bank
pub const NUM_WAVES: usize = 8;

/// Number of built-in wave selections
pub const NUM_WAVE_SELECTIONS: usize = NUM_WAVES * NUM_WAVES;

/// Table lengths of the built-in waves
pub const WAVE_LENGTHS: [usize; NUM_WAVES] = [256, 256, 512, 512, 384, 600, 1024, 2048];

/// Names of the built-in waves
pub const WAVE_NAMES: [&str; NUM_WAVES] = [
    "sine",
    "triangle",
    "ramp",
    "square",
    "octave",
    "rectified",
    "saturated",
    "saw",
];

/// Provider of single cycle waves and of the wave selections.
///
/// Implementations must return at least one table and one selection. The
/// voice clamps every index before asking, and clamps the table indices found
/// in a selection, so a bank never sees an out of range request from it.
pub trait WavetableBank {
    /// Number of tables
    fn num_tables(&self) -> usize;

    /// Samples of table `index`, one full cycle
    fn table(&self, index: usize) -> &[f32];

    /// Number of selections
    fn num_selections(&self) -> usize;

    /// Table index for each operator in `selection`
    fn selection(&self, selection: usize) -> [usize; NUM_OPERATORS];
}

/// The built-in bank
#[derive(Debug, Clone)]
pub struct Wavetables {
    tables: Vec<Vec<f32>>,
    selections: Vec<[usize; NUM_OPERATORS]>,
}

impl Wavetables {
    /// Generates the eight built-in waves
    pub fn new() -> Self {
        let tables = WAVE_LENGTHS
            .iter()
            .enumerate()
            .map(|(wave, &len)| {
                (0..len)
                    .map(|i| wave_sample(wave, i as f64 / len as f64) as f32)
                    .collect()
            })
            .collect();

        Self {
            tables,
            selections: default_selections(NUM_WAVES),
        }
    }

    /// Builds a bank from user supplied tables.
    ///
    /// Without explicit selections, every pairing of tables on operators 1/3
    /// and 2/4 is generated, the way the built-in bank does it.
    pub fn from_tables(
        tables: Vec<Vec<f32>>,
        selections: Option<Vec<[usize; NUM_OPERATORS]>>,
    ) -> Result<Self> {
        if tables.is_empty() {
            bail!("wavetable bank needs at least one table");
        }
        if let Some(i) = tables.iter().position(|t| t.len() < 2) {
            bail!("wavetable {} needs at least two samples", i);
        }
        if let Some(i) = tables.iter().position(|t| t.iter().any(|s| !s.is_finite())) {
            bail!("wavetable {} contains non finite samples", i);
        }

        let selections = selections.unwrap_or_else(|| default_selections(tables.len()));
        if selections.is_empty() {
            bail!("wavetable bank needs at least one selection");
        }
        for (i, selection) in selections.iter().enumerate() {
            if let Some(t) = selection.iter().find(|&&t| t >= tables.len()) {
                bail!(
                    "wave selection {} refers to table {} but only {} tables exist",
                    i,
                    t,
                    tables.len()
                );
            }
        }

        Ok(Self { tables, selections })
    }
}

impl Default for Wavetables {
    fn default() -> Self {
        Self::new()
    }
}

impl WavetableBank for Wavetables {
    fn num_tables(&self) -> usize {
        self.tables.len()
    }

    fn table(&self, index: usize) -> &[f32] {
        &self.tables[index.min(self.tables.len() - 1)]
    }

    fn num_selections(&self) -> usize {
        self.selections.len()
    }

    fn selection(&self, selection: usize) -> [usize; NUM_OPERATORS] {
        self.selections[selection.min(self.selections.len() - 1)]
    }
}

/// Operators 1 and 3 share one wave, 2 and 4 another
fn default_selections(num_tables: usize) -> Vec<[usize; NUM_OPERATORS]> {
    (0..num_tables * num_tables)
        .map(|i| {
            let a = i / num_tables;
            let b = i % num_tables;
            [a, b, a, b]
        })
        .collect()
}

/// Sample of built-in wave `wave` at phase `t` in `[0, 1)`
fn wave_sample(wave: usize, t: f64) -> f64 {
    let w = 2.0 * PI * t;
    match wave {
        0 => w.sin(),
        1 => {
            if t < 0.25 {
                4.0 * t
            } else if t < 0.75 {
                2.0 - 4.0 * t
            } else {
                4.0 * t - 4.0
            }
        }
        2 => 2.0 * t - 1.0,
        3 => {
            let partials: f64 = (1..=15)
                .step_by(2)
                .map(|k| (k as f64 * w).sin() / k as f64)
                .sum();
            partials * 4.0 / PI
        }
        4 => 0.7 * (w.sin() + 0.5 * (2.0 * w).sin()),
        5 => 2.0 * w.sin().abs() - 1.0,
        6 => (4.0 * w.sin()).tanh() / 4.0f64.tanh(),
        _ => {
            let partials: f64 = (1..=16).map(|k| (k as f64 * w).sin() / k as f64).sum();
            partials * 2.0 / PI
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_bank_shape() {
        let bank = Wavetables::new();
        assert_eq!(bank.num_tables(), NUM_WAVES);
        assert_eq!(bank.num_selections(), NUM_WAVE_SELECTIONS);
        for (i, &len) in WAVE_LENGTHS.iter().enumerate() {
            assert_eq!(bank.table(i).len(), len);
            assert!(bank.table(i).iter().all(|s| s.abs() <= 1.25));
        }
    }

    #[test]
    fn test_selection_layout() {
        let bank = Wavetables::new();
        assert_eq!(bank.selection(0), [0, 0, 0, 0]);
        assert_eq!(bank.selection(1), [0, 1, 0, 1]);
        assert_eq!(bank.selection(8), [1, 0, 1, 0]);
        assert_eq!(bank.selection(63), [7, 7, 7, 7]);
        assert_eq!(bank.selection(1000), [7, 7, 7, 7]);
    }

    #[test]
    fn test_sine_table_quarter_points() {
        let bank = Wavetables::new();
        let sine = bank.table(0);
        assert_eq!(sine[0], 0.0);
        assert!((sine[64] - 1.0).abs() < 1e-6);
        assert!((sine[192] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_custom_bank_validation() {
        assert!(Wavetables::from_tables(vec![], None).is_err());
        assert!(Wavetables::from_tables(vec![vec![0.0]], None).is_err());
        assert!(Wavetables::from_tables(vec![vec![0.0, f32::NAN]], None).is_err());
        assert!(Wavetables::from_tables(vec![vec![0.0, 1.0]], Some(vec![[0, 1, 0, 0]])).is_err());

        let bank = Wavetables::from_tables(vec![vec![0.0, 1.0], vec![1.0, 0.0]], None).unwrap();
        assert_eq!(bank.num_selections(), 4);
        assert_eq!(bank.selection(3), [1, 1, 1, 1]);
    }
}
