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

//! DSP utility functions shared by the voice components

use num_traits::Float;

/// Crossfades from `a` to `b` as `p` goes from 0 to 1
#[inline]
pub fn crossfade<T: Float>(a: T, b: T, p: T) -> T {
    a + (b - a) * p
}

/// Euclidean modulo: the result always lies in `[0, b)` for positive `b`
#[inline]
pub fn euclidean_mod<T: Float>(a: T, b: T) -> T {
    let m = a % b;
    if m < T::zero() {
        let wrapped = m + b;
        // -tiny + b rounds to b in floating point
        if wrapped >= b {
            T::zero()
        } else {
            wrapped
        }
    } else {
        m
    }
}

/// Sign of `x` as -1, 0 or 1
#[inline]
pub fn sign<T: Float>(x: T) -> T {
    if x > T::zero() {
        T::one()
    } else if x < T::zero() {
        -T::one()
    } else {
        T::zero()
    }
}

/// Linear interpolation in a cyclic table.
///
/// `position` is expressed in samples and must lie in `[0, table.len())`.
/// The sample after the last one is the first one, so reading between the
/// end and the start of the table is continuous.
#[inline]
pub fn interpolate_wrap(table: &[f32], position: f32) -> f32 {
    let len = table.len();
    if len == 0 {
        return 0.0;
    }
    let index_integral = (position as usize).min(len - 1);
    let index_fractional = position - index_integral as f32;
    let a = table[index_integral];
    let b = table[(index_integral + 1) % len];
    a + (b - a) * index_fractional
}

/// Convert an offset in octaves to a frequency ratio
#[inline]
pub fn octaves_to_ratio(octaves: f32) -> f32 {
    2.0f32.powf(octaves)
}

/// One pole DC blocking filter.
///
/// See <https://www.dsprelated.com/freebooks/filters/DC_Blocker.html>
#[derive(Debug, Clone, Copy)]
pub struct DcBlocker {
    x1: f32,
    y1: f32,
    r: f32,
}

impl DcBlocker {
    /// Creates a blocker with the usual pole radius of 0.995
    pub fn new() -> Self {
        Self::with_pole(0.995)
    }

    /// Creates a blocker with a custom pole radius
    pub fn with_pole(r: f32) -> Self {
        Self {
            x1: 0.0,
            y1: 0.0,
            r,
        }
    }

    /// Filters one sample
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = x - self.x1 + self.r * self.y1;
        self.x1 = x;
        self.y1 = y;
        y
    }

    /// Clears the filter memory
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

impl Default for DcBlocker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossfade_endpoints() {
        assert_eq!(crossfade(2.0f32, 6.0, 0.0), 2.0);
        assert_eq!(crossfade(2.0f32, 6.0, 1.0), 6.0);
        assert_eq!(crossfade(2.0f32, 6.0, 0.5), 4.0);
    }

    #[test]
    fn test_euclidean_mod_is_positive() {
        assert!((euclidean_mod(1.25f32, 1.0) - 0.25).abs() < 1e-6);
        assert!((euclidean_mod(-0.25f32, 1.0) - 0.75).abs() < 1e-6);
        assert_eq!(euclidean_mod(-1.0f32, 1.0), 0.0);
        let tiny = euclidean_mod(-1e-9f32, 1.0);
        assert!((0.0..1.0).contains(&tiny));
    }

    #[test]
    fn test_interpolate_wrap_crosses_table_end() {
        let table = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(interpolate_wrap(&table, 1.5), 1.5);
        // Halfway between the last sample and the first one
        assert_eq!(interpolate_wrap(&table, 3.5), 1.5);
        assert_eq!(interpolate_wrap(&[], 0.3), 0.0);
    }

    #[test]
    fn test_dc_blocker_removes_offset() {
        let mut dc = DcBlocker::new();
        let mut y = 0.0;
        for _ in 0..20_000 {
            y = dc.process(1.0);
        }
        assert!(y.abs() < 1e-3, "DC should decay, got {}", y);
    }
}
