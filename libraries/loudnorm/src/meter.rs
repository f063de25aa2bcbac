//! EBU R128 loudness measurement
//!
//! Thin wrapper around the `ebur128` crate that accumulates a PCM stream and
//! reports the readings the normalizer consumes each block:
//! - Momentary loudness (LUFS) - the most recent ~400 ms window
//! - Short-term loudness (LUFS) - the most recent ~3 s window
//! plus the whole-stream readings (integrated loudness and loudness range)
//! for hosts that want to report them.

use crate::error::{LoudnormError, Result};
use ebur128::{EbuR128, Mode};

/// One pair of windowed loudness estimates for the audio fed so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessReading {
    /// Loudness over the most recent ~400 ms window, in LUFS. Negative
    /// infinity while the window holds no energy (nothing fed yet, or
    /// silence).
    pub momentary: f64,

    /// Loudness over the most recent ~3 s window, in LUFS. `None` while the
    /// window holds no energy (nothing fed yet, or silence); the engine's
    /// negative-infinity sentinel is converted here so it never propagates
    /// as a float.
    pub short_term: Option<f64>,
}

/// Streaming EBU R128 loudness meter
///
/// Feed sample blocks with [`add_frames_i16`](Self::add_frames_i16), then
/// query readings for the audio accumulated so far. State grows with the
/// stream; use [`reset`](Self::reset) between independent streams.
///
/// # Example
///
/// ```ignore
/// use loudnorm::LoudnessMeter;
///
/// let mut meter = LoudnessMeter::new(48000, 1)?;
/// meter.add_frames_i16(&block)?;
/// let reading = meter.reading()?;
/// println!("momentary: {:.1} LUFS", reading.momentary);
/// ```
pub struct LoudnessMeter {
    /// EBU R128 engine instance
    ebur128: EbuR128,
    /// Sample rate
    sample_rate: u32,
    /// Number of channels
    channels: u32,
    /// Total samples fed
    samples_processed: usize,
}

impl LoudnessMeter {
    /// Create a new loudness meter
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz (8000-384000)
    /// * `channels` - Number of channels (1-8)
    ///
    /// # Errors
    /// Returns an error if sample rate or channel count is invalid
    pub fn new(sample_rate: u32, channels: u32) -> Result<Self> {
        if !(8000..=384000).contains(&sample_rate) {
            return Err(LoudnormError::InvalidSampleRate(sample_rate));
        }
        if !(1..=8).contains(&channels) {
            return Err(LoudnormError::InvalidChannelCount(channels));
        }

        // Mode::M = momentary (400 ms window)
        // Mode::S = short-term (3 s window)
        // Mode::I = integrated loudness over the whole stream
        // Mode::LRA = loudness range
        let mode = Mode::M | Mode::S | Mode::I | Mode::LRA;

        let ebur128 = EbuR128::new(channels, sample_rate, mode)?;

        Ok(Self {
            ebur128,
            sample_rate,
            channels,
            samples_processed: 0,
        })
    }

    /// Feed a block of signed 16-bit samples
    ///
    /// # Arguments
    /// * `samples` - Interleaved audio samples as i16
    ///
    /// # Notes
    /// - Length must be divisible by the channel count
    /// - An empty block is a no-op
    pub fn add_frames_i16(&mut self, samples: &[i16]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        if samples.len() % self.channels as usize != 0 {
            return Err(LoudnormError::Meter(format!(
                "Sample count {} is not divisible by channel count {}",
                samples.len(),
                self.channels
            )));
        }

        self.ebur128.add_frames_i16(samples)?;
        self.samples_processed += samples.len();

        Ok(())
    }

    /// Momentary and short-term loudness for the audio fed so far
    pub fn reading(&self) -> Result<LoudnessReading> {
        let momentary = self.ebur128.loudness_momentary()?;
        let short_term = self.ebur128.loudness_shortterm()?;

        Ok(LoudnessReading {
            momentary,
            short_term: short_term.is_finite().then_some(short_term),
        })
    }

    /// Integrated loudness over the whole stream so far, in LUFS
    pub fn integrated(&self) -> Result<f64> {
        Ok(self.ebur128.loudness_global()?)
    }

    /// Loudness range of the stream so far, in LU
    pub fn loudness_range(&self) -> Result<f64> {
        Ok(self.ebur128.loudness_range()?)
    }

    /// Sample rate the meter was created with
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count the meter was created with
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Total number of samples fed so far
    pub fn samples_processed(&self) -> usize {
        self.samples_processed
    }

    /// Discard all accumulated measurement state
    pub fn reset(&mut self) {
        // Recreate the engine (ebur128 has no reset method)
        let mode = Mode::M | Mode::S | Mode::I | Mode::LRA;
        if let Ok(fresh) = EbuR128::new(self.channels, self.sample_rate, mode) {
            self.ebur128 = fresh;
            self.samples_processed = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_creation() {
        // Valid parameters
        assert!(LoudnessMeter::new(48000, 1).is_ok());
        assert!(LoudnessMeter::new(44100, 2).is_ok());

        // Invalid sample rate
        assert!(matches!(
            LoudnessMeter::new(100, 1),
            Err(LoudnormError::InvalidSampleRate(100))
        ));
        assert!(LoudnessMeter::new(500000, 1).is_err());

        // Invalid channels
        assert!(matches!(
            LoudnessMeter::new(48000, 0),
            Err(LoudnormError::InvalidChannelCount(0))
        ));
        assert!(LoudnessMeter::new(48000, 10).is_err());
    }

    #[test]
    fn test_fresh_meter_reads_undefined() {
        let meter = LoudnessMeter::new(48000, 1).unwrap();

        let reading = meter.reading().unwrap();
        assert!(reading.short_term.is_none());
        assert!(reading.momentary.is_infinite() && reading.momentary < 0.0);
    }

    #[test]
    fn test_short_term_defined_after_window_fills() {
        let mut meter = LoudnessMeter::new(48000, 1).unwrap();

        // Four seconds of 997 Hz sine at -20 dBFS.
        let block: Vec<i16> = (0..48000 * 4)
            .map(|i| {
                let t = i as f64 / 48000.0;
                (3276.0 * (2.0 * std::f64::consts::PI * 997.0 * t).sin()) as i16
            })
            .collect();
        meter.add_frames_i16(&block).unwrap();

        let reading = meter.reading().unwrap();
        let short_term = reading.short_term.expect("short-term should be defined");
        // A -20 dBFS sine measures around -23 LUFS under K-weighting.
        assert!(
            short_term > -30.0 && short_term < -15.0,
            "expected around -23 LUFS, got {:.1}",
            short_term
        );
    }

    #[test]
    fn test_silence_reads_undefined() {
        let mut meter = LoudnessMeter::new(48000, 1).unwrap();
        let silence = vec![0_i16; 48000 * 4];
        meter.add_frames_i16(&silence).unwrap();

        let reading = meter.reading().unwrap();
        assert!(reading.short_term.is_none());
        assert!(reading.momentary.is_infinite() && reading.momentary < 0.0);
    }

    #[test]
    fn test_empty_block_is_noop() {
        let mut meter = LoudnessMeter::new(48000, 1).unwrap();
        meter.add_frames_i16(&[]).unwrap();
        assert_eq!(meter.samples_processed(), 0);
    }

    #[test]
    fn test_invalid_sample_count() {
        let mut meter = LoudnessMeter::new(48000, 2).unwrap();
        // 5 samples is not divisible by 2 channels
        let samples = vec![100_i16; 5];
        assert!(meter.add_frames_i16(&samples).is_err());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut meter = LoudnessMeter::new(48000, 1).unwrap();
        let block = vec![1000_i16; 48000];
        meter.add_frames_i16(&block).unwrap();
        assert!(meter.samples_processed() > 0);

        meter.reset();
        assert_eq!(meter.samples_processed(), 0);
        assert!(meter.reading().unwrap().short_term.is_none());
    }
}
