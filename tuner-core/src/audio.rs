//! # Audio Source Module
//!
//! This module turns recorded audio files into the mono, normalized sample
//! buffers the analysis pipeline consumes.
//!
//! ## Features
//! - `AudioBuffer`: mono samples in [-1.0, 1.0] plus their sample rate
//! - `AudioSource` trait for anything that can produce a buffer from a path
//! - `WavSource`: PCM WAV decoding with channel downmix and normalization

use hound::{SampleFormat, WavReader};
use std::path::Path;
use tracing::debug;

use crate::error::AnalysisError;

/// A mono audio signal ready for analysis.
///
/// Always holds at least one sample and a non-zero sample rate.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Creates a buffer from already mono, normalized samples.
    ///
    /// # Returns
    /// * `Err(EmptyBuffer)` - `samples` is empty
    /// * `Err(InvalidSampleRate)` - `sample_rate` is zero
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptyBuffer);
        }
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate);
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds (`len / sample_rate`).
    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Produces an [`AudioBuffer`] from a file on disk.
pub trait AudioSource {
    fn load(&self, path: &Path) -> Result<AudioBuffer, AnalysisError>;
}

/// Loads PCM WAV files.
///
/// Integer samples are divided by the format's full-scale magnitude
/// (32768 for 16-bit, 2147483648 for 32-bit) and multi-channel files are
/// averaged down to mono.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavSource;

impl AudioSource for WavSource {
    fn load(&self, path: &Path) -> Result<AudioBuffer, AnalysisError> {
        let mut reader = WavReader::open(path).map_err(|e| AnalysisError::file_load(path, e))?;

        let spec = reader.spec();
        let channels = spec.channels as usize;
        debug!(
            path = %path.display(),
            sample_rate = spec.sample_rate,
            channels,
            bits = spec.bits_per_sample,
            format = ?spec.sample_format,
            "decoding wav"
        );

        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| AnalysisError::file_load(path, e))?,
            (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
                let full_scale = (1u64 << (bits - 1)) as f64;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| (v as f64 / full_scale) as f32))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| AnalysisError::file_load(path, e))?
            }
            (format, bits) => {
                return Err(AnalysisError::file_load(
                    path,
                    format!("unsupported sample encoding: {bits}-bit {format:?}"),
                ));
            }
        };

        AudioBuffer::new(downmix(interleaved, channels), spec.sample_rate)
    }
}

/// Averages interleaved frames into one channel. A trailing partial frame is dropped.
fn downmix(interleaved: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved;
    }
    let inv = 1.0 / channels as f32;
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * inv)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_samples() {
        let err = AudioBuffer::new(Vec::new(), 44100).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyBuffer));
    }

    #[test]
    fn rejects_zero_sample_rate() {
        let err = AudioBuffer::new(vec![0.0; 4], 0).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidSampleRate));
    }

    #[test]
    fn duration_is_len_over_rate() {
        let buffer = AudioBuffer::new(vec![0.0; 88200], 44100).unwrap();
        assert_eq!(buffer.len(), 88200);
        assert!((buffer.duration() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn downmix_averages_channels() {
        let stereo = vec![1.0, 0.0, 0.5, 0.5, -1.0, -0.5];
        assert_eq!(downmix(stereo, 2), vec![0.5, 0.5, -0.75]);
    }

    #[test]
    fn downmix_drops_partial_frame() {
        let stereo = vec![0.2, 0.4, 0.6];
        assert_eq!(downmix(stereo, 2).len(), 1);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = WavSource
            .load(Path::new("/definitely/not/here.wav"))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::FileLoad { .. }));
    }
}
