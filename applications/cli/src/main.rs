//! loudnorm - normalize the loudness of a WAV file block by block
//!
//! A minimal file-based host for the `loudnorm` library: reads a mono
//! 16-bit 48 kHz WAV, runs the normalizer over fixed-duration blocks the
//! way a streaming pipeline would, and writes the result.

use anyhow::{bail, Context, Result};
use clap::Parser;
use hound::{SampleFormat, WavReader, WavWriter};
use loudnorm::{LoudnessNormalizer, NormalizerConfig, SAMPLE_RATE};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "loudnorm")]
#[command(about = "Normalize the loudness of a mono 16-bit 48 kHz WAV file", long_about = None)]
struct Cli {
    /// Input WAV file (mono, 16-bit PCM, 48 kHz)
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// Target loudness in LUFS (-40 to 0)
    #[arg(short, long, default_value_t = -23.0, allow_negative_numbers = true)]
    target_loudness: f64,

    /// Block duration in milliseconds
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=10_000))]
    block_ms: u32,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loudnorm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut reader = WavReader::open(&cli.input)
        .with_context(|| format!("failed to open {}", cli.input.display()))?;
    let spec = reader.spec();
    if spec.channels != 1
        || spec.sample_rate != SAMPLE_RATE
        || spec.bits_per_sample != 16
        || spec.sample_format != SampleFormat::Int
    {
        bail!(
            "unsupported input format ({} ch, {} Hz, {} bit): expected mono 16-bit PCM at {} Hz",
            spec.channels,
            spec.sample_rate,
            spec.bits_per_sample,
            SAMPLE_RATE
        );
    }

    let mut samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<std::result::Result<_, _>>()
        .context("failed to read samples")?;

    let config = NormalizerConfig {
        target_loudness: cli.target_loudness,
        ..NormalizerConfig::default()
    };
    let mut normalizer = LoudnessNormalizer::new(config)?;

    let block_len = (u64::from(SAMPLE_RATE) * u64::from(cli.block_ms) / 1000).max(1) as usize;
    let mut writer = WavWriter::create(&cli.output, spec)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;

    for block in samples.chunks_mut(block_len) {
        normalizer.process_block(block)?;
        for &sample in block.iter() {
            writer.write_sample(sample)?;
        }
    }
    writer.finalize()?;

    // The meter measured the stream before gain was applied.
    let integrated = normalizer.meter().integrated()?;
    let range = normalizer.meter().loudness_range()?;
    info!(
        "Wrote {}: input {:.1} LUFS (range {:.1} LU), final gain {:.2} dB",
        cli.output.display(),
        integrated,
        range,
        normalizer.current_gain_db()
    );

    Ok(())
}
