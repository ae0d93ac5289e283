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

//! Frequency ratio tables
//!
//! The 23 ratios come from the two operator FM mode of Mutable Instruments
//! Plaits. Each of the 32 selections assigns one ratio to each operator.

use anyhow::{bail, Result};

use crate::NUM_OPERATORS;

/// Number of built-in ratio selections
pub const NUM_RATIO_SELECTIONS: usize = 32;

/// Built-in selections as indices into [`frequency_ratios`]
pub const RATIO_SELECTIONS: [[usize; NUM_OPERATORS]; NUM_RATIO_SELECTIONS] = [
    [5, 5, 5, 5],
    [3, 5, 7, 5],
    [0, 5, 8, 5],
    [7, 5, 2, 5],
    [9, 5, 10, 5],
    [14, 5, 15, 5],
    [14, 8, 9, 5],
    [14, 11, 8, 5],
    [9, 8, 12, 5],
    [22, 14, 17, 4],
    [14, 14, 12, 4],
    [9, 11, 14, 7],
    [22, 9, 9, 13],
    [15, 8, 17, 13],
    [10, 12, 6, 15],
    [10, 12, 6, 16],
    [17, 12, 6, 11],
    [5, 14, 8, 12],
    [5, 10, 13, 12],
    [5, 14, 14, 14],
    [4, 2, 5, 2],
    [0, 8, 16, 9],
    [3, 13, 14, 1],
    [4, 12, 14, 1],
    [0, 10, 9, 0],
    [0, 14, 13, 13],
    [0, 10, 4, 16],
    [0, 3, 4, 18],
    [0, 1, 4, 13],
    [14, 0, 12, 22],
    [15, 0, 5, 22],
    [1, 14, 9, 4],
];

/// The 23 built-in frequency ratios, in ascending order
pub fn frequency_ratios() -> Vec<f32> {
    use std::f32::consts::PI;

    // 16 cents of detune
    let detune = 2.0f32.powf(16.0 / 1200.0);
    let sqrt2 = 2.0f32.sqrt();

    vec![
        0.5,
        0.5 * detune,
        sqrt2 / 2.0,
        PI / 4.0,
        1.0,
        1.0 * detune,
        sqrt2,
        PI / 2.0,
        7.0 / 4.0,
        2.0,
        2.0 * detune,
        9.0 / 4.0,
        11.0 / 4.0,
        2.0 * sqrt2,
        3.0,
        PI,
        3.0f32.sqrt() * 2.0,
        4.0,
        sqrt2 * 3.0,
        PI * 3.0 / 2.0,
        5.0,
        sqrt2 * 4.0,
        8.0,
    ]
}

/// Ratio constants and the per-operator selections built from them
#[derive(Debug, Clone)]
pub struct RatioBank {
    ratios: Vec<f32>,
    selections: Vec<[usize; NUM_OPERATORS]>,
}

impl RatioBank {
    /// Creates a bank from custom data.
    ///
    /// Fails if a table is empty, a ratio is not a positive finite number or a
    /// selection refers to a missing ratio.
    pub fn new(ratios: Vec<f32>, selections: Vec<[usize; NUM_OPERATORS]>) -> Result<Self> {
        if ratios.is_empty() {
            bail!("ratio bank needs at least one ratio");
        }
        if selections.is_empty() {
            bail!("ratio bank needs at least one selection");
        }
        if let Some(bad) = ratios.iter().find(|r| !r.is_finite() || **r <= 0.0) {
            bail!("invalid frequency ratio {}", bad);
        }
        for (i, selection) in selections.iter().enumerate() {
            if let Some(slot) = selection.iter().find(|&&slot| slot >= ratios.len()) {
                bail!(
                    "ratio selection {} refers to ratio {} but only {} ratios exist",
                    i,
                    slot,
                    ratios.len()
                );
            }
        }
        Ok(Self { ratios, selections })
    }

    /// Number of selections
    #[inline]
    pub fn num_selections(&self) -> usize {
        self.selections.len()
    }

    /// All ratio constants
    pub fn ratios(&self) -> &[f32] {
        &self.ratios
    }

    /// Ratio indices of a selection, clamped to the last one
    #[inline]
    pub fn selection(&self, selection: usize) -> [usize; NUM_OPERATORS] {
        self.selections[selection.min(self.selections.len() - 1)]
    }

    /// Ratio used by operator `op` in `selection`
    #[inline]
    pub fn ratio(&self, selection: usize, op: usize) -> f32 {
        self.ratios[self.selection(selection)[op]]
    }
}

impl Default for RatioBank {
    fn default() -> Self {
        Self {
            ratios: frequency_ratios(),
            selections: RATIO_SELECTIONS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ratios_are_sorted() {
        let ratios = frequency_ratios();
        assert_eq!(ratios.len(), 23);
        assert!(ratios.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_first_selection_is_unison() {
        let bank = RatioBank::default();
        assert_eq!(bank.num_selections(), NUM_RATIO_SELECTIONS);
        let detune = 2.0f32.powf(16.0 / 1200.0);
        for op in 0..NUM_OPERATORS {
            assert!((bank.ratio(0, op) - detune).abs() < 1e-6);
        }
    }

    #[test]
    fn test_selection_clamps() {
        let bank = RatioBank::default();
        assert_eq!(bank.selection(999), RATIO_SELECTIONS[31]);
    }

    #[test]
    fn test_rejects_dangling_selection() {
        assert!(RatioBank::new(vec![1.0, 2.0], vec![[0, 1, 2, 0]]).is_err());
        assert!(RatioBank::new(vec![1.0, -2.0], vec![[0, 1, 1, 0]]).is_err());
        assert!(RatioBank::new(vec![], vec![]).is_err());
        assert!(RatioBank::new(vec![1.0, 2.0], vec![[0, 1, 1, 0]]).is_ok());
    }
}
