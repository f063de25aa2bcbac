//! Real-time loudness normalization
//!
//! Drives the whole per-block pipeline: feed the meter, turn the momentary
//! and short-term readings into one conservative gain, smooth it through the
//! gain history, and rewrite the block's samples in place with saturation.
//!
//! Processing is strictly causal and block-at-a-time: each block is fully
//! measured, decided, smoothed and applied before the next one is accepted.
//! One normalizer owns all of its state; streams must not share instances.

use crate::error::Result;
use crate::history::GainHistory;
use crate::kernel::GaussianKernel;
use crate::meter::{LoudnessMeter, LoudnessReading};
use tracing::trace;

/// EBU R128 reference level in LUFS. Doubles as the stand-in short-term
/// loudness while the meter has nothing to report, so the proposed gain
/// stays finite.
pub const EBU_R128_REFERENCE_LUFS: f64 = -23.0;

/// Sample rate of the processed stream in Hz
pub const SAMPLE_RATE: u32 = 48_000;

/// Channel count of the processed stream
pub const CHANNELS: u32 = 1;

const TARGET_LOUDNESS_MIN: f64 = -40.0;
const TARGET_LOUDNESS_MAX: f64 = 0.0;
const TARGET_LOUDNESS_RANGE_MIN: f64 = 1.0;
const TARGET_LOUDNESS_RANGE_MAX: f64 = 20.0;
const SILENCE_THRESHOLD_MIN: f64 = -80.0;
const SILENCE_THRESHOLD_MAX: f64 = 0.0;

/// Configuration for a [`LoudnessNormalizer`]
///
/// Out-of-range values are clamped when the configuration is handed to a
/// normalizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizerConfig {
    /// Target loudness in LUFS (-40.0 to 0.0)
    pub target_loudness: f64,

    /// Target loudness range in LU (1.0 to 20.0)
    ///
    /// Accepted for the host's benefit; the gain decision does not read it.
    pub target_loudness_range: f64,

    /// Silence threshold in LUFS (-80.0 to 0.0)
    ///
    /// Accepted for the host's benefit; the gain decision does not read it.
    pub silence_threshold: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            target_loudness: EBU_R128_REFERENCE_LUFS,
            target_loudness_range: 5.0,
            silence_threshold: -50.0,
        }
    }
}

impl NormalizerConfig {
    /// Copy of this configuration with every field clamped into range.
    fn clamped(self) -> Self {
        Self {
            target_loudness: self
                .target_loudness
                .clamp(TARGET_LOUDNESS_MIN, TARGET_LOUDNESS_MAX),
            target_loudness_range: self
                .target_loudness_range
                .clamp(TARGET_LOUDNESS_RANGE_MIN, TARGET_LOUDNESS_RANGE_MAX),
            silence_threshold: self
                .silence_threshold
                .clamp(SILENCE_THRESHOLD_MIN, SILENCE_THRESHOLD_MAX),
        }
    }
}

/// Combine the two loudness estimates into a single proposed gain in dB.
///
/// An undefined short-term reading is replaced by the fixed reference level
/// so the candidate gain stays finite. Of the two candidates the smaller
/// (less boosting) one wins: momentary loudness reacts faster to transient
/// loud content, and taking the minimum keeps a sudden loud passage from
/// being boosted while the short-term average is still catching up.
fn decide_gain(reading: &LoudnessReading, target_loudness: f64) -> f64 {
    let short_term = reading.short_term.unwrap_or(EBU_R128_REFERENCE_LUFS);
    let short_term_gain = target_loudness - short_term;
    let momentary_gain = target_loudness - reading.momentary;
    short_term_gain.min(momentary_gain)
}

/// Apply a gain in dB to a block of samples in place, saturating at the
/// signed 16-bit bounds.
///
/// The scaled value is compared against the bounds before truncation, so a
/// result just past the representable range still saturates instead of
/// wrapping through the cast. In-range values truncate toward zero.
pub fn apply_gain(samples: &mut [i16], gain_db: f64) {
    let scale = 10.0_f64.powf(gain_db / 20.0);
    for sample in samples.iter_mut() {
        let scaled = f64::from(*sample) * scale;
        *sample = if scaled > f64::from(i16::MAX) {
            i16::MAX
        } else if scaled < f64::from(i16::MIN) {
            i16::MIN
        } else {
            scaled as i16
        };
    }
}

/// Real-time loudness normalizer for a mono 16-bit 48 kHz stream
///
/// Owns the meter, the smoothing kernel and the gain history for one stream.
/// The first [`HISTORY_LEN`](crate::HISTORY_LEN) blocks are a warm-up period
/// during which the raw gain decisions are applied directly; once the
/// history is full every applied gain is the kernel-filtered blend of the
/// recent decisions, so consecutive blocks cannot jump discontinuously.
///
/// # Example
///
/// ```ignore
/// use loudnorm::{LoudnessNormalizer, NormalizerConfig};
///
/// let mut normalizer = LoudnessNormalizer::new(NormalizerConfig::default())?;
/// for block in blocks.iter_mut() {
///     normalizer.process_block(block)?;
/// }
/// ```
pub struct LoudnessNormalizer {
    /// Active configuration (already clamped)
    config: NormalizerConfig,
    /// Loudness meter fed with every processed block
    meter: LoudnessMeter,
    /// Smoothing kernel, built once
    kernel: GaussianKernel,
    /// Recent gain decisions
    history: GainHistory,
}

impl LoudnessNormalizer {
    /// Create a normalizer for a mono 48 kHz stream
    ///
    /// # Errors
    /// Returns an error if the loudness meter cannot be created
    pub fn new(config: NormalizerConfig) -> Result<Self> {
        Ok(Self {
            config: config.clamped(),
            meter: LoudnessMeter::new(SAMPLE_RATE, CHANNELS)?,
            kernel: GaussianKernel::new(),
            history: GainHistory::new(),
        })
    }

    /// Create a normalizer with the default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(NormalizerConfig::default())
    }

    /// Active configuration
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Set the target loudness in LUFS (clamped to -40.0 to 0.0)
    pub fn set_target_loudness(&mut self, lufs: f64) {
        self.config.target_loudness = lufs.clamp(TARGET_LOUDNESS_MIN, TARGET_LOUDNESS_MAX);
    }

    /// Set the target loudness range in LU (clamped to 1.0 to 20.0)
    pub fn set_target_loudness_range(&mut self, lu: f64) {
        self.config.target_loudness_range =
            lu.clamp(TARGET_LOUDNESS_RANGE_MIN, TARGET_LOUDNESS_RANGE_MAX);
    }

    /// Set the silence threshold in LUFS (clamped to -80.0 to 0.0)
    pub fn set_silence_threshold(&mut self, lufs: f64) {
        self.config.silence_threshold = lufs.clamp(SILENCE_THRESHOLD_MIN, SILENCE_THRESHOLD_MAX);
    }

    /// Measure, decide, smooth and apply the gain for one block, in place
    ///
    /// Always succeeds for in-range 16-bit PCM input; the only failure path
    /// is the measurement engine, and a failed block leaves the samples
    /// untouched so the caller may continue with the next one.
    pub fn process_block(&mut self, samples: &mut [i16]) -> Result<()> {
        self.meter.add_frames_i16(samples)?;
        let reading = self.meter.reading()?;

        let proposed = decide_gain(&reading, self.config.target_loudness);
        let applied = self.history.push_smoothed(proposed, &self.kernel);
        apply_gain(samples, applied);

        trace!(
            "Block of {} samples: momentary {:.1} LUFS, short-term {:?}, gain {:.2} dB (raw {:.2} dB)",
            samples.len(),
            reading.momentary,
            reading.short_term,
            applied,
            proposed
        );

        Ok(())
    }

    /// Gain most recently applied, in dB (0.0 before the first block)
    pub fn current_gain_db(&self) -> f64 {
        self.history.most_recent()
    }

    /// The loudness meter fed by this normalizer, for whole-stream readings
    /// (integrated loudness, loudness range)
    pub fn meter(&self) -> &LoudnessMeter {
        &self.meter
    }

    /// Reset all per-stream state (for reuse between independent streams)
    ///
    /// The configuration is kept.
    pub fn reset(&mut self) {
        self.meter.reset();
        self.history = GainHistory::new();
    }
}
