use psiop::fm::{Patch, RatioBank};
use psiop::REFERENCE_FREQUENCY;

mod common;
use common::{
    analyze_spectrum, dominant_frequency, find_peaks, hann, magnitude_near, render_hit, trigger,
    SAMPLE_RATE,
};

const N_SAMPLES: usize = 32768;

/// Long decays so the hit holds steady over the analysis window
fn sustained(algorithm: f32) -> Patch {
    Patch {
        algorithm,
        rate1: 0.8,
        rate2: 0.8,
        ..Patch::default()
    }
}

fn windowed_hit(patch: &Patch) -> Vec<f32> {
    let mut samples = render_hit(patch, trigger(), N_SAMPLES);
    hann(&mut samples);
    samples
}

#[test]
fn test_unmodulated_carrier_sits_at_reference_times_ratio() {
    let patch = sustained(1.0);
    let expected = REFERENCE_FREQUENCY * RatioBank::default().ratio(0, 0);

    let samples = windowed_hit(&patch);
    let freq = dominant_frequency(&samples, SAMPLE_RATE);

    assert!(
        (freq - expected).abs() < 3.0,
        "expected {} Hz, found {} Hz",
        expected,
        freq
    );
}

#[test]
fn test_start_pitch_is_one_volt_per_octave() {
    let patch = Patch {
        start: 1.0,
        ..sustained(1.0)
    };
    let expected = 2.0 * REFERENCE_FREQUENCY * RatioBank::default().ratio(0, 0);

    let samples = windowed_hit(&patch);
    let freq = dominant_frequency(&samples, SAMPLE_RATE);

    assert!(
        (freq - expected).abs() < 4.0,
        "expected {} Hz, found {} Hz",
        expected,
        freq
    );
}

#[test]
fn test_parallel_carriers_show_both_ratios() {
    // Selection 2 puts ratio 1/2 on operator 1 and 16 cents over 1 on operator 2
    let ratios = RatioBank::default();
    let patch = Patch {
        ratio: 2.0,
        ..sustained(1.0)
    };

    let samples = windowed_hit(&patch);
    let spectrum = analyze_spectrum(&samples, SAMPLE_RATE);
    let peaks = find_peaks(&spectrum, -12.0);

    for op in 0..2 {
        let expected = REFERENCE_FREQUENCY * ratios.ratio(2, op);
        assert!(
            peaks.iter().any(|(f, _)| (f - expected).abs() < 3.0),
            "no peak near {} Hz in {:?}",
            expected,
            peaks
        );
    }
}

#[test]
fn test_modulation_adds_sidebands() {
    let carrier = REFERENCE_FREQUENCY * RatioBank::default().ratio(0, 0);

    let plain = analyze_spectrum(&windowed_hit(&sustained(1.0)), SAMPLE_RATE);
    let modulated = analyze_spectrum(&windowed_hit(&sustained(0.0)), SAMPLE_RATE);

    let relative_harmonic = |spectrum: &[(f32, f32)]| {
        magnitude_near(spectrum, 2.0 * carrier, 3.0) / magnitude_near(spectrum, carrier, 3.0)
    };

    assert!(relative_harmonic(&plain) < 0.01);
    assert!(relative_harmonic(&modulated) > 0.05);
}
