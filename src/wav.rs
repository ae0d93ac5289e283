//! WAV encoding of rendered buffers

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use hound::{WavSpec, WavWriter};
use log::debug;

/// Peak level rendered buffers are scaled down to when they are louder
pub const HEADROOM: f32 = 0.8;

fn wav_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    }
}

/// Gain that brings the peak of `samples` down to [`HEADROOM`], or 1
pub fn normalize_factor(samples: &[f32]) -> f32 {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
    if peak > HEADROOM {
        HEADROOM / peak
    } else {
        1.0
    }
}

fn write_samples<W: Write + Seek>(writer: W, samples: &[f32], sample_rate: u32) -> Result<()> {
    if sample_rate == 0 {
        bail!("Invalid sample rate: 0");
    }

    let factor = normalize_factor(samples);
    debug!(
        "WAV: {} samples at {}Hz, normalize factor {}",
        samples.len(),
        sample_rate,
        factor
    );

    let mut wav_writer = WavWriter::new(writer, wav_spec(sample_rate))?;
    for sample in samples {
        wav_writer.write_sample(sample * factor)?;
    }
    wav_writer.finalize()?;

    Ok(())
}

/// Encodes a mono 32-bit float WAV file in memory
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let mut ret = vec![];
    write_samples(Cursor::new(&mut ret), samples, sample_rate)?;
    Ok(ret)
}

/// Writes a mono 32-bit float WAV file to `path`
pub fn write_wav(path: impl AsRef<Path>, samples: &[f32], sample_rate: u32) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("unable to create wav file '{}'", path.display()))?;
    write_samples(std::io::BufWriter::new(file), samples, sample_rate)
        .with_context(|| format!("unable to write wav file '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_round_trip() {
        let samples = [0.0, 0.25, -0.5, 0.75];
        let bytes = encode_wav(&samples, 48000).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 48000);
        assert_eq!(reader.spec().channels, 1);
        let decoded: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_loud_buffers_are_normalized() {
        assert_eq!(normalize_factor(&[0.1, -0.5]), 1.0);
        assert_eq!(normalize_factor(&[1.6, -0.5]), 0.5);
        assert_eq!(normalize_factor(&[]), 1.0);
    }

    #[test]
    fn test_zero_sample_rate_fails() {
        assert!(encode_wav(&[0.0], 0).is_err());
    }

    #[test]
    fn test_write_wav_file() {
        let path = std::env::temp_dir().join("psiop_wav_test.wav");
        let _ = std::fs::remove_file(&path);
        write_wav(&path, &[0.1, 0.2], 44100).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }
}
