use crate::fm::{EngineConfig, Inputs, Patch, Voice, VoiceOutput, WavetableBank, Wavetables};
use crate::stmlib::dsp::DcBlocker;
use anyhow::{anyhow, bail, Result};
use log::{debug, trace};

/// Voltage of the gate pulses sent to the voice
const GATE_VOLTAGE: f32 = 10.0;

/// Length of the gate pulses in seconds
const GATE_LENGTH: f64 = 1e-3;

/// What happens at a point of a rendered sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    /// Plain trigger
    Trigger,
    /// Trigger with accent
    Accent,
    /// Choke, silences the voice
    Choke,
}

/// A timed event of a rendered sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Time of the event in seconds from the start of the render
    pub at: f64,
    /// Kind of event
    pub kind: HitKind,
}

impl Hit {
    /// Plain trigger at `at` seconds
    pub fn trigger(at: f64) -> Self {
        Self {
            at,
            kind: HitKind::Trigger,
        }
    }

    /// Accented trigger at `at` seconds
    pub fn accent(at: f64) -> Self {
        Self {
            at,
            kind: HitKind::Accent,
        }
    }

    /// Choke at `at` seconds
    pub fn choke(at: f64) -> Self {
        Self {
            at,
            kind: HitKind::Choke,
        }
    }
}

/// Offline renderer driving a voice with gate pulses
pub struct Synth<W: WavetableBank = Wavetables> {
    /// The voice being played
    voice: Voice<W>,

    /// Sample rate
    sample_rate: f64,

    /// Maximum render length in samples (safety limit)
    max_length_samples: usize,

    /// Optional DC blocking on the output
    dc_block: Option<DcBlocker>,
}

impl Synth<Wavetables> {
    /// Create a renderer with the default configuration
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `max_length_seconds` - Maximum render length in seconds (safety limit)
    pub fn new(sample_rate: f64, max_length_seconds: f64) -> Result<Self> {
        Self::with_config(sample_rate, max_length_seconds, EngineConfig::default())
    }

    /// Create a renderer with a custom voice configuration
    pub fn with_config(
        sample_rate: f64,
        max_length_seconds: f64,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Self::with_voice(Voice::new(config), sample_rate, max_length_seconds)
    }
}

impl<W: WavetableBank> Synth<W> {
    /// Create a renderer around an existing voice
    pub fn with_voice(voice: Voice<W>, sample_rate: f64, max_length_seconds: f64) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate >= 1000.0) {
            bail!("Invalid sample rate: {}", sample_rate);
        }
        if !(max_length_seconds.is_finite() && max_length_seconds > 0.0) {
            bail!("Invalid maximum length: {}s", max_length_seconds);
        }

        debug!(
            "SYNTH: sample rate {}, max length {:.3}s",
            sample_rate, max_length_seconds
        );

        Ok(Self {
            voice,
            sample_rate,
            max_length_samples: (sample_rate * max_length_seconds) as usize,
            dc_block: None,
        })
    }

    /// Enable or disable DC blocking of the rendered output
    pub fn set_dc_block(&mut self, enabled: bool) {
        self.dc_block = enabled.then(DcBlocker::new);
    }

    /// Render a single hit starting on the first sample
    ///
    /// # Arguments
    /// * `patch` - Knob settings
    /// * `accent` - Whether the accent fires with the trigger
    /// * `length_seconds` - Render length, capped by the maximum length
    pub fn render_hit(&mut self, patch: &Patch, accent: bool, length_seconds: f64) -> Result<Vec<f32>> {
        let hit = if accent { Hit::accent(0.0) } else { Hit::trigger(0.0) };
        self.render_hits(patch, &[hit], length_seconds)
    }

    /// Render a sequence of hits
    pub fn render_hits(&mut self, patch: &Patch, hits: &[Hit], length_seconds: f64) -> Result<Vec<f32>> {
        let n_samples = self.length_in_samples(length_seconds)?;
        let schedule = self.schedule(hits)?;

        self.start();
        let output = (0..n_samples)
            .map(|i| {
                let inputs = gates_at(&schedule, i);
                self.tick(patch, &inputs).out
            })
            .collect();

        Ok(output)
    }

    /// Render one hit and keep going until the envelopes have died out
    ///
    /// Rendering stops after 10ms of silence or at the maximum length.
    pub fn render_until_silent(&mut self, patch: &Patch, accent: bool) -> Result<Vec<f32>> {
        let hit = if accent { Hit::accent(0.0) } else { Hit::trigger(0.0) };
        let schedule = self.schedule(&[hit])?;
        let silence_threshold = (self.sample_rate * 0.01) as usize;

        self.start();
        let mut output = Vec::new();
        let mut silence_count = 0;

        while output.len() < self.max_length_samples {
            let inputs = gates_at(&schedule, output.len());
            let sample = self.tick(patch, &inputs).out;
            output.push(sample);

            if self.voice.is_silent() && sample.abs() < 1e-6 {
                silence_count += 1;
            } else {
                silence_count = 0;
            }

            if silence_count >= silence_threshold {
                break;
            }
        }

        debug!(
            "SYNTH: rendered {} samples ({:.3}s) until silence",
            output.len(),
            output.len() as f64 / self.sample_rate
        );

        if output.iter().all(|&x| x == 0.0) {
            return Err(anyhow!("render produced only silence"));
        }

        Ok(output)
    }

    /// Render a hit and return the full per-sample output, taps included
    pub fn trace(&mut self, patch: &Patch, accent: bool, samples: usize) -> Result<Vec<VoiceOutput>> {
        if samples > self.max_length_samples {
            bail!(
                "Trace of {} samples exceeds the maximum of {}",
                samples,
                self.max_length_samples
            );
        }
        let hit = if accent { Hit::accent(0.0) } else { Hit::trigger(0.0) };
        let schedule = self.schedule(&[hit])?;

        self.start();
        let trace = (0..samples)
            .map(|i| {
                let inputs = gates_at(&schedule, i);
                self.tick(patch, &inputs)
            })
            .collect();

        Ok(trace)
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Get the maximum render length in samples
    pub fn max_length_samples(&self) -> usize {
        self.max_length_samples
    }

    /// The voice being rendered
    pub fn voice(&self) -> &Voice<W> {
        &self.voice
    }

    /// Reset the voice and the output filter
    pub fn reset(&mut self) {
        self.voice.reset();
        if let Some(dc) = self.dc_block.as_mut() {
            dc.reset();
        }
    }

    fn start(&mut self) {
        self.reset();
        trace!("SYNTH: voice reset");
    }

    #[inline]
    fn tick(&mut self, patch: &Patch, inputs: &Inputs) -> VoiceOutput {
        let mut frame = self.voice.process(patch, inputs, (1.0 / self.sample_rate) as f32);
        if let Some(dc) = self.dc_block.as_mut() {
            frame.out = dc.process(frame.out);
        }
        frame
    }

    fn length_in_samples(&self, length_seconds: f64) -> Result<usize> {
        if !(length_seconds.is_finite() && length_seconds >= 0.0) {
            bail!("Invalid render length: {}s", length_seconds);
        }
        Ok(((length_seconds * self.sample_rate) as usize).min(self.max_length_samples))
    }

    /// Converts hit times to gate windows in samples, sorted by start
    fn schedule(&self, hits: &[Hit]) -> Result<Vec<(usize, usize, HitKind)>> {
        let gate_samples = ((GATE_LENGTH * self.sample_rate).ceil() as usize).max(1);
        let mut schedule = Vec::with_capacity(hits.len());
        for hit in hits {
            if !(hit.at.is_finite() && hit.at >= 0.0) {
                bail!("Invalid hit time: {}s", hit.at);
            }
            let start = (hit.at * self.sample_rate).round() as usize;
            schedule.push((start, start + gate_samples, hit.kind));
        }
        schedule.sort_by_key(|&(start, _, _)| start);
        debug!("SYNTH: {} hits scheduled", schedule.len());
        Ok(schedule)
    }
}

/// Gate voltages at sample `i`
fn gates_at(schedule: &[(usize, usize, HitKind)], i: usize) -> Inputs {
    let mut inputs = Inputs::default();
    for &(start, end, kind) in schedule {
        if start > i {
            break;
        }
        if i < end {
            match kind {
                HitKind::Trigger => inputs.trigger = GATE_VOLTAGE,
                HitKind::Accent => {
                    inputs.trigger = GATE_VOLTAGE;
                    inputs.accent = GATE_VOLTAGE;
                }
                HitKind::Choke => inputs.choke = GATE_VOLTAGE,
            }
        }
    }
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synth_creation() {
        let synth = Synth::new(48000.0, 10.0).unwrap();
        assert_eq!(synth.sample_rate(), 48000.0);
        assert_eq!(synth.max_length_samples(), 480000);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(Synth::new(0.0, 1.0).is_err());
        assert!(Synth::new(f64::NAN, 1.0).is_err());
        assert!(Synth::new(48000.0, -1.0).is_err());

        let mut synth = Synth::new(48000.0, 1.0).unwrap();
        let patch = Patch::default();
        assert!(synth.render_hit(&patch, false, -0.1).is_err());
        assert!(synth.render_hits(&patch, &[Hit::trigger(f64::NAN)], 0.1).is_err());
        assert!(synth.trace(&patch, false, 48001).is_err());
    }

    #[test]
    fn test_render_length_is_capped() {
        let mut synth = Synth::new(48000.0, 0.1).unwrap();
        let samples = synth.render_hit(&Patch::default(), false, 5.0).unwrap();
        assert_eq!(samples.len(), 4800);
    }

    #[test]
    fn test_gate_windows() {
        let schedule = vec![(0, 48, HitKind::Accent), (100, 148, HitKind::Choke)];
        let at_start = gates_at(&schedule, 0);
        assert_eq!(at_start.trigger, GATE_VOLTAGE);
        assert_eq!(at_start.accent, GATE_VOLTAGE);
        assert_eq!(at_start.choke, 0.0);

        assert_eq!(gates_at(&schedule, 48), Inputs::default());
        assert_eq!(gates_at(&schedule, 120).choke, GATE_VOLTAGE);
    }

    #[test]
    fn test_render_until_silent_ends() {
        let mut synth = Synth::new(48000.0, 10.0).unwrap();
        let patch = Patch {
            rate1: 0.3,
            rate2: 0.3,
            ..Patch::default()
        };
        let samples = synth.render_until_silent(&patch, false).unwrap();
        assert!(samples.len() < synth.max_length_samples());
        assert!(samples.iter().any(|s| s.abs() > 0.01));
    }

    #[test]
    fn test_dc_block_filters_output() {
        let patch = Patch::default();
        let mut synth = Synth::new(48000.0, 1.0).unwrap();
        let raw = synth.render_hit(&patch, false, 0.05).unwrap();

        synth.set_dc_block(true);
        let blocked = synth.render_hit(&patch, false, 0.05).unwrap();

        assert_eq!(raw.len(), blocked.len());
        assert_eq!(raw[0], blocked[0]);
        assert!(raw.iter().zip(blocked.iter()).any(|(a, b)| a != b));
        assert!(blocked.iter().all(|s| s.is_finite()));
    }
}
