#![allow(dead_code)]

use num_complex::Complex;
use rustfft::FftPlanner;

use psiop::fm::{EngineConfig, Inputs, Patch, Voice, VoiceOutput};

pub const SAMPLE_RATE: f32 = 48000.0;
pub const DT: f32 = 1.0 / SAMPLE_RATE;

/// Gate voltage comfortably above the 2V trigger threshold
pub const GATE: f32 = 10.0;

pub fn voice() -> Voice {
    Voice::new(EngineConfig::default())
}

pub fn trigger() -> Inputs {
    Inputs {
        trigger: GATE,
        ..Inputs::default()
    }
}

pub fn accent_trigger() -> Inputs {
    Inputs {
        trigger: GATE,
        accent: GATE,
        ..Inputs::default()
    }
}

pub fn choke() -> Inputs {
    Inputs {
        choke: GATE,
        ..Inputs::default()
    }
}

/// Runs `first` on the first tick, then idle inputs for the rest
pub fn render(voice: &mut Voice, patch: &Patch, first: Inputs, n_samples: usize) -> Vec<VoiceOutput> {
    let idle = Inputs::default();
    (0..n_samples)
        .map(|i| {
            let inputs = if i == 0 { &first } else { &idle };
            voice.process(patch, inputs, DT)
        })
        .collect()
}

/// Renders a fresh voice hit and returns only the mixed output
pub fn render_hit(patch: &Patch, first: Inputs, n_samples: usize) -> Vec<f32> {
    let mut voice = voice();
    render(&mut voice, patch, first, n_samples)
        .iter()
        .map(|frame| frame.out)
        .collect()
}

pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Magnitude spectrum as (frequency, magnitude) pairs, positive frequencies only
pub fn analyze_spectrum(samples: &[f32], sample_rate: f32) -> Vec<(f32, f32)> {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(samples.len());

    let mut buffer: Vec<Complex<f32>> = samples
        .iter()
        .map(|&s| Complex { re: s, im: 0.0 })
        .collect();

    fft.process(&mut buffer);

    let bin_width = sample_rate / samples.len() as f32;

    buffer
        .iter()
        .take(buffer.len() / 2)
        .enumerate()
        .map(|(i, c)| (i as f32 * bin_width, c.norm()))
        .collect()
}

/// Frequency of the strongest bin, DC excluded
pub fn dominant_frequency(samples: &[f32], sample_rate: f32) -> f32 {
    analyze_spectrum(samples, sample_rate)
        .into_iter()
        .skip(1)
        .fold((0.0f32, 0.0f32), |best, (freq, mag)| {
            if mag > best.1 {
                (freq, mag)
            } else {
                best
            }
        })
        .0
}

/// Peaks above `relative_threshold_db` (relative to the loudest bin)
pub fn find_peaks(spectrum: &[(f32, f32)], relative_threshold_db: f32) -> Vec<(f32, f32)> {
    let max_mag = spectrum
        .iter()
        .map(|(_, mag)| mag)
        .fold(0.0f32, |a, &b| a.max(b));

    let threshold = max_mag * 10.0_f32.powf(relative_threshold_db / 20.0);

    let mut peaks = Vec::new();
    for i in 1..spectrum.len().saturating_sub(1) {
        let (freq, mag) = spectrum[i];
        if mag > threshold && mag > spectrum[i - 1].1 && mag > spectrum[i + 1].1 {
            peaks.push((freq, mag));
        }
    }

    peaks
}

/// Largest magnitude within `tolerance` Hz of `freq`
pub fn magnitude_near(spectrum: &[(f32, f32)], freq: f32, tolerance: f32) -> f32 {
    spectrum
        .iter()
        .filter(|(f, _)| (f - freq).abs() <= tolerance)
        .map(|(_, mag)| *mag)
        .fold(0.0f32, f32::max)
}

/// Hann window, applied in place
pub fn hann(samples: &mut [f32]) {
    let n = samples.len();
    if n < 2 {
        return;
    }
    for (i, s) in samples.iter_mut().enumerate() {
        let w = 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / (n - 1) as f32).cos();
        *s *= w;
    }
}
