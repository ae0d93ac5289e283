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

//! FM algorithms as a modulation matrix
//!
//! Each algorithm is a 4x5 table: one row per source operator, one column per
//! destination. Columns 0 to 3 feed the FM input of the matching operator and
//! column 4 is the contribution of the source to the final mix.

use crate::{NUM_ALGORITHMS, NUM_OPERATORS};

/// Number of destinations per source: every FM input plus the mix
pub const NUM_DESTINATIONS: usize = NUM_OPERATORS + 1;

/// Destination column of the final mix
pub const MIX: usize = NUM_OPERATORS;

/// Routing gains indexed by `[algorithm][source][destination]`
pub type Routing = [[[f32; NUM_DESTINATIONS]; NUM_OPERATORS]; NUM_ALGORITHMS];

/// The six built-in algorithms
pub const MODULATION_MATRIX: Routing = [
    // 1 -> 2 -> out
    [
        [0.0, 1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, 0.0],
    ],
    // 1 + 2 -> out
    [
        [0.0, 0.0, 0.0, 0.0, 0.5],
        [0.0, 0.0, 0.0, 0.0, 0.5],
        [0.0, 0.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, 0.0],
    ],
    // 1 -> 2 -> 3 -> 4 -> out
    [
        [0.0, 1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, 1.0],
    ],
    // (1 -> 2) + (3 -> 4) -> out
    [
        [0.0, 1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, 0.5],
        [0.0, 0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, 0.5],
    ],
    // 1 + (2 -> 3 -> 4) -> out
    [
        [0.0, 0.0, 0.0, 0.0, 0.5],
        [0.0, 0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, 0.5],
    ],
    // 1 + (2 -> 3) + 3 + 4 -> out
    [
        [0.0, 0.0, 0.0, 0.0, 0.3],
        [0.0, 0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, 0.3],
        [0.0, 0.0, 0.0, 0.0, 0.3],
    ],
];

/// Read-only view over a routing table
#[derive(Debug, Clone)]
pub struct Algorithms {
    routing: Routing,
}

impl Algorithms {
    /// Creates the built-in algorithm set
    pub fn new() -> Self {
        Self::with_routing(MODULATION_MATRIX)
    }

    /// Creates an algorithm set from custom routing gains
    pub fn with_routing(routing: Routing) -> Self {
        Self { routing }
    }

    /// Number of algorithms available
    #[inline]
    pub fn len(&self) -> usize {
        NUM_ALGORITHMS
    }

    /// Always false, there is at least one algorithm
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Clamps an algorithm index into range
    #[inline]
    pub fn clamp_index(algorithm: usize) -> usize {
        algorithm.min(NUM_ALGORITHMS - 1)
    }

    /// Gain from `source` to `destination` in `algorithm`
    #[inline]
    pub fn gain(&self, algorithm: usize, source: usize, destination: usize) -> f32 {
        self.routing[Self::clamp_index(algorithm)][source][destination]
    }

    /// FM input of operator `destination` given the operator outputs
    #[inline]
    pub fn fm_input(
        &self,
        algorithm: usize,
        destination: usize,
        outputs: &[f32; NUM_OPERATORS],
        index: f32,
    ) -> f32 {
        let rows = &self.routing[Self::clamp_index(algorithm)];
        let mut fm = 0.0;
        for (output, row) in outputs.iter().zip(rows.iter()) {
            fm += output * index * row[destination];
        }
        fm
    }

    /// Mixed output of `algorithm` given the operator outputs
    #[inline]
    pub fn mix(&self, algorithm: usize, outputs: &[f32; NUM_OPERATORS]) -> f32 {
        let rows = &self.routing[Self::clamp_index(algorithm)];
        let mut mix = 0.0;
        for (output, row) in outputs.iter().zip(rows.iter()) {
            mix += output * row[MIX];
        }
        mix
    }

    /// Checks if an operator is heard directly in the mix
    #[inline]
    pub fn is_carrier(&self, algorithm: usize, op: usize) -> bool {
        self.gain(algorithm, op, MIX) != 0.0
    }

    /// Checks if an operator modulates any other operator
    #[inline]
    pub fn is_modulator(&self, algorithm: usize, op: usize) -> bool {
        (0..NUM_OPERATORS).any(|dst| self.gain(algorithm, op, dst) != 0.0)
    }

    /// Human readable routing, e.g. `1->2 2->out(1.00)`
    pub fn describe(&self, algorithm: usize) -> String {
        let mut parts = Vec::new();
        for src in 0..NUM_OPERATORS {
            for dst in 0..NUM_OPERATORS {
                let gain = self.gain(algorithm, src, dst);
                if gain != 0.0 {
                    parts.push(format!("{}->{}({:.2})", src + 1, dst + 1, gain));
                }
            }
            let gain = self.gain(algorithm, src, MIX);
            if gain != 0.0 {
                parts.push(format!("{}->out({:.2})", src + 1, gain));
            }
        }
        parts.join(" ")
    }
}

impl Default for Algorithms {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_algorithm_reaches_the_mix() {
        let algorithms = Algorithms::new();
        for algo in 0..NUM_ALGORITHMS {
            assert!(
                (0..NUM_OPERATORS).any(|op| algorithms.is_carrier(algo, op)),
                "algorithm {} is silent",
                algo
            );
        }
    }

    #[test]
    fn test_fm_input_is_a_plain_dot_product() {
        let algorithms = Algorithms::new();
        let outputs = [0.5, -0.25, 0.75, 1.0];

        // Algorithm 3: 1 -> 2 -> 3 -> 4
        assert_eq!(algorithms.fm_input(2, 0, &outputs, 0.6), 0.0);
        assert_eq!(algorithms.fm_input(2, 1, &outputs, 0.6), 0.5 * 0.6);
        assert_eq!(algorithms.fm_input(2, 2, &outputs, 0.6), -0.25 * 0.6);
        assert_eq!(algorithms.fm_input(2, 3, &outputs, 1.0), 0.75);
        assert_eq!(algorithms.mix(2, &outputs), 1.0);
    }

    #[test]
    fn test_mix_is_not_normalized() {
        let algorithms = Algorithms::new();
        let outputs = [1.0; NUM_OPERATORS];
        assert_eq!(algorithms.mix(0, &outputs), 1.0);
        assert_eq!(algorithms.mix(1, &outputs), 1.0);
        assert!((algorithms.mix(5, &outputs) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_algorithm_uses_last() {
        let algorithms = Algorithms::new();
        assert_eq!(algorithms.gain(999, 1, 2), algorithms.gain(5, 1, 2));
        assert_eq!(algorithms.describe(5), "1->out(0.30) 2->3(1.00) 3->out(0.30) 4->out(0.30)");
    }
}
