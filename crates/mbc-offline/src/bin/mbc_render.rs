//! Multiband compressor offline renderer
//!
//! Usage:
//!   mbc-render render -i in.wav -o out.wav [-p preset.json] [--set key=value]...
//!   mbc-render defaults [--sample-rate 48000]   - Print a complete default preset
//!   mbc-render params                            - List automatable parameters

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mbc_core::{ParamKind, ParameterSnapshot, parameter_layout};
use mbc_offline::{OfflineConfig, Preset, RenderPipeline, WavFormat};

#[derive(Parser)]
#[command(name = "mbc-render", version, about = "Render WAV files through the multiband compressor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file
    Render {
        /// Input WAV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// JSON preset with parameter overrides and automation
        #[arg(short, long)]
        preset: Option<PathBuf>,

        /// Override a parameter, e.g. --set thresholdLow=-20
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        overrides: Vec<(String, f32)>,

        /// Samples per processing block
        #[arg(short, long, default_value_t = 512)]
        block_size: usize,

        /// Only apply parameters when a change is pending, as a live host does
        #[arg(long)]
        realtime: bool,

        /// Output bit depth (16, 24 or 32 float)
        #[arg(long, default_value_t = 24)]
        bit_depth: u16,
    },
    /// Print the default parameter set as JSON
    Defaults {
        #[arg(long, default_value_t = 48000.0)]
        sample_rate: f32,

        #[arg(long, default_value_t = 512)]
        block_size: usize,

        #[arg(long, default_value_t = 2)]
        channels: usize,
    },
    /// List automatable parameters with ranges and defaults
    Params,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            preset,
            overrides,
            block_size,
            realtime,
            bit_depth,
        } => render(input, output, preset, overrides, block_size, realtime, bit_depth),
        Commands::Defaults {
            sample_rate,
            block_size,
            channels,
        } => print_defaults(sample_rate, block_size, channels),
        Commands::Params => {
            print_params();
            Ok(())
        }
    }
}

fn parse_assignment(arg: &str) -> Result<(String, f32), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{arg}'"))?;
    let value: f32 = value
        .trim()
        .parse()
        .map_err(|e| format!("bad value for {key}: {e}"))?;
    Ok((key.trim().to_string(), value))
}

#[allow(clippy::too_many_arguments)]
fn render(
    input: PathBuf,
    output: PathBuf,
    preset_path: Option<PathBuf>,
    overrides: Vec<(String, f32)>,
    block_size: usize,
    realtime: bool,
    bit_depth: u16,
) -> Result<()> {
    let mut preset = match &preset_path {
        Some(path) => Preset::load(path)
            .with_context(|| format!("Failed to load preset {}", path.display()))?,
        None => Preset::default(),
    };

    for (key, value) in overrides {
        preset
            .params
            .set_known(&key, value)
            .with_context(|| format!("Invalid --set {key}={value}"))?;
    }

    if block_size == 0 {
        bail!("--block-size must be at least 1");
    }

    let config = OfflineConfig::default()
        .with_block_size(block_size)
        .with_non_realtime(!realtime)
        .with_output_format(WavFormat::from_bit_depth(bit_depth)?);

    let stats = RenderPipeline::new(config, preset)
        .render_file(&input, &output)
        .with_context(|| format!("Failed to render {}", input.display()))?;

    println!(
        "{} -> {}: {:.2} s, peak {:.2} -> {:.2} dBFS",
        input.display(),
        output.display(),
        stats.frames as f64 / stats.sample_rate.max(1) as f64,
        stats.input_peak.0,
        stats.output_peak.0
    );
    Ok(())
}

fn print_defaults(sample_rate: f32, block_size: usize, channels: usize) -> Result<()> {
    let snapshot = ParameterSnapshot::with_defaults(sample_rate, block_size, channels);
    let preset = Preset {
        params: snapshot,
        automation: Vec::new(),
    };
    println!("{}", preset.to_json()?);
    Ok(())
}

fn print_params() {
    println!("{:<16} {:<20} {:>10} {:>10} {:>10}  unit", "id", "name", "min", "max", "default");
    for spec in parameter_layout() {
        let (min, max, kind) = match spec.kind {
            ParamKind::Float => (spec.range.min, spec.range.max, ""),
            ParamKind::Choice(choices) => (
                choices.first().copied().unwrap_or(spec.range.min),
                choices.last().copied().unwrap_or(spec.range.max),
                " (choice)",
            ),
            ParamKind::Toggle => (0.0, 1.0, " (toggle)"),
        };
        println!(
            "{:<16} {:<20} {:>10.2} {:>10.2} {:>10.2}  {}{}",
            spec.id,
            spec.name,
            min,
            max,
            spec.default_value(),
            spec.unit,
            kind
        );
    }
}
