use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use psiop::fm::ratios::RatioBank;
use psiop::fm::wavetables::{WavetableBank, Wavetables, WAVE_NAMES};
use psiop::fm::Algorithms;
use psiop::{EngineConfig, Hit, Patch, Synth, NUM_ALGORITHMS, NUM_OPERATORS};

fn parse_duration(s: &str) -> Result<Duration, std::num::ParseIntError> {
    let ms: u64 = s.parse()?;
    Ok(Duration::from_millis(ms))
}

/// Parses `250` (trigger), `250a` (accent) or `250c` (choke), in milliseconds
fn parse_hit(s: &str) -> Result<Hit, String> {
    let s = s.trim();
    let (ms, make): (&str, fn(f64) -> Hit) = if let Some(ms) = s.strip_suffix('a') {
        (ms, Hit::accent)
    } else if let Some(ms) = s.strip_suffix('c') {
        (ms, Hit::choke)
    } else {
        (s, Hit::trigger)
    };
    let ms: f64 = ms
        .parse()
        .map_err(|e| format!("invalid hit time '{}': {}", s, e))?;
    if !(ms.is_finite() && ms >= 0.0) {
        return Err(format!("hit time must be positive, got '{}'", s));
    }
    Ok(make(ms / 1000.0))
}

/// Render hits of a four operator FM percussion voice
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Knob overrides, applied on top of the patch file
#[derive(clap::Args, Debug, Default)]
struct Knobs {
    /// Start pitch in octaves (-4 to 4)
    #[arg(long, allow_hyphen_values = true)]
    start: Option<f32>,
    /// Fine tuning of the start pitch in octaves (-0.2 to 0.2)
    #[arg(long, allow_hyphen_values = true)]
    fine: Option<f32>,
    /// End pitch in octaves (-4 to 4)
    #[arg(long, allow_hyphen_values = true)]
    end: Option<f32>,
    /// Ratio selection (0 to 31)
    #[arg(long)]
    ratio: Option<f32>,
    /// Wave selection (0 to 63)
    #[arg(long)]
    wave: Option<f32>,
    /// Algorithm (0 to 5)
    #[arg(long)]
    algorithm: Option<f32>,
    /// Operator 1 feedback (0 to 1)
    #[arg(long)]
    feedback: Option<f32>,
    /// Decay rate of operators 1 and 3 (0 to 1)
    #[arg(long)]
    rate1: Option<f32>,
    /// Decay rate of operators 2 and 4 (0 to 1)
    #[arg(long)]
    rate2: Option<f32>,
    /// Pitch glide speed (0 to 1, off at 0.2 and below)
    #[arg(long)]
    speed: Option<f32>,
}

impl Knobs {
    fn apply(&self, patch: &mut Patch) {
        let overrides = [
            (self.start, &mut patch.start),
            (self.fine, &mut patch.fine),
            (self.end, &mut patch.end),
            (self.ratio, &mut patch.ratio),
            (self.wave, &mut patch.wave),
            (self.algorithm, &mut patch.algorithm),
            (self.feedback, &mut patch.feedback),
            (self.rate1, &mut patch.rate1),
            (self.rate2, &mut patch.rate2),
            (self.speed, &mut patch.speed),
        ];
        for (value, knob) in overrides {
            if let Some(value) = value {
                *knob = value;
            }
        }
    }
}

/// Patch and configuration sources shared by the rendering commands
#[derive(clap::Args, Debug)]
struct Sources {
    /// JSON patch file, missing knobs keep their defaults
    #[arg(long)]
    patch: Option<PathBuf>,

    /// JSON voice configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 48000)]
    sample_rate: u32,

    #[command(flatten)]
    knobs: Knobs,
}

impl Sources {
    fn patch(&self) -> Result<Patch> {
        let mut patch = match &self.patch {
            Some(path) => Patch::from_json(&read_file(path)?)
                .with_context(|| format!("invalid patch file '{}'", path.display()))?,
            None => Patch::default(),
        };
        self.knobs.apply(&mut patch);
        Ok(patch)
    }

    fn synth(&self, max_length: Duration) -> Result<Synth> {
        let config = match &self.config {
            Some(path) => EngineConfig::from_json(&read_file(path)?)
                .with_context(|| format!("invalid config file '{}'", path.display()))?,
            None => EngineConfig::default(),
        };
        Synth::with_config(self.sample_rate as f64, max_length.as_secs_f64(), config)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render hits to a WAV file
    Render {
        /// Output WAV file
        output: PathBuf,

        #[command(flatten)]
        sources: Sources,

        /// Render length in milliseconds
        #[arg(long, default_value = "1000", value_parser = parse_duration)]
        duration: Duration,

        /// Accent the single hit
        #[arg(long)]
        accent: bool,

        /// Comma separated hit times in ms, suffix `a` for accent, `c` for choke
        #[arg(long, value_delimiter = ',', value_parser = parse_hit)]
        hits: Vec<Hit>,

        /// Render a single hit until it has died out, ignoring --duration
        #[arg(long)]
        until_silent: bool,

        /// Remove DC offset from the output
        #[arg(long)]
        dc_block: bool,
    },
    /// Print the algorithm, ratio and wave tables
    Tables,
    /// Print the output and operator taps of the first samples of a hit
    Trace {
        #[command(flatten)]
        sources: Sources,

        /// Number of samples to print
        #[arg(long, default_value_t = 64)]
        samples: usize,

        /// Accent the hit
        #[arg(long)]
        accent: bool,
    },
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("unable to read '{}'", path.display()))
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args.command) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Render {
            output,
            sources,
            duration,
            accent,
            hits,
            until_silent,
            dc_block,
        } => {
            let patch = sources.patch()?;
            // --until-silent may run past --duration, up to 30 seconds
            let max_length = duration.max(Duration::from_secs(30));
            let mut synth = sources.synth(max_length)?;
            synth.set_dc_block(dc_block);

            let samples = if until_silent {
                if !hits.is_empty() {
                    bail!("--until-silent renders a single hit, drop --hits");
                }
                synth.render_until_silent(&patch, accent)?
            } else if hits.is_empty() {
                synth.render_hit(&patch, accent, duration.as_secs_f64())?
            } else {
                if accent {
                    bail!("--accent applies to a single hit, use the `a` suffix in --hits");
                }
                synth.render_hits(&patch, &hits, duration.as_secs_f64())?
            };

            psiop::wav::write_wav(&output, &samples, sources.sample_rate)?;
            info!(
                "wrote {} samples to '{}'",
                samples.len(),
                output.display()
            );
        }
        Commands::Tables => print_tables(),
        Commands::Trace {
            sources,
            samples,
            accent,
        } => {
            let patch = sources.patch()?;
            let length =
                Duration::from_secs_f64(samples as f64 / sources.sample_rate.max(1) as f64 + 1e-3);
            let mut synth = sources.synth(length)?;
            let trace = synth.trace(&patch, accent, samples)?;

            println!("sample\tout\top1\top2\top3\top4");
            for (i, frame) in trace.iter().enumerate() {
                println!(
                    "{}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}",
                    i, frame.out, frame.taps[0], frame.taps[1], frame.taps[2], frame.taps[3]
                );
            }
        }
    }

    Ok(())
}

fn print_tables() {
    let algorithms = Algorithms::new();
    println!("Algorithms:");
    for algo in 0..NUM_ALGORITHMS {
        let modulators: Vec<String> = (0..NUM_OPERATORS)
            .filter(|&op| algorithms.is_modulator(algo, op))
            .map(|op| (op + 1).to_string())
            .collect();
        println!(
            "  {}: {} [modulators: {}]",
            algo,
            algorithms.describe(algo),
            modulators.join(",")
        );
    }

    let ratios = RatioBank::default();
    println!("Ratio selections:");
    for selection in 0..ratios.num_selections() {
        let values: Vec<String> = (0..NUM_OPERATORS)
            .map(|op| format!("{:.4}", ratios.ratio(selection, op)))
            .collect();
        println!("  {:2}: {}", selection, values.join(" "));
    }

    let waves = Wavetables::new();
    println!("Wave selections:");
    for selection in 0..waves.num_selections() {
        let names: Vec<&str> = waves
            .selection(selection)
            .iter()
            .map(|&t| WAVE_NAMES[t])
            .collect();
        println!("  {:2}: {}", selection, names.join(" "));
    }
}
