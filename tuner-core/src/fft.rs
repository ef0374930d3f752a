//! # Fast Fourier Transform (FFT) Module
//!
//! This module turns a block of samples into a one-sided magnitude/phase
//! spectrum with its frequency axis.
//!
//! ## Features
//! - High-performance FFT using RustFFT
//! - Rectangular, Hamming, Hann and Blackman windows
//! - Centered sub-window selection for fundamental-only analysis
//!
//! ## Resolution
//! Bins are spaced `sample_rate / N` Hz apart. That spacing is the floor on
//! how precisely a peak can be located, and the fixed 50 Hz harmonic
//! tolerance used downstream only makes sense while it is much smaller
//! than 50 Hz.

use rustfft::{FftPlanner, num_complex::Complex};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// Weighting applied to the samples before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Rectangular,
    #[default]
    Hamming,
    Hanning,
    Blackman,
}

impl WindowKind {
    pub const ALL: [WindowKind; 4] = [
        WindowKind::Rectangular,
        WindowKind::Hamming,
        WindowKind::Hanning,
        WindowKind::Blackman,
    ];

    /// Weighting coefficient for sample `i` of an `n`-sample window.
    ///
    /// Symmetric windows (the denominator is `n - 1`); a single-sample
    /// window is always 1.0.
    pub fn coefficient(self, i: usize, n: usize) -> f32 {
        if n <= 1 {
            return 1.0;
        }
        let phase = 2.0 * PI * i as f32 / (n - 1) as f32;
        match self {
            WindowKind::Rectangular => 1.0,
            WindowKind::Hamming => 0.54 - 0.46 * phase.cos(),
            WindowKind::Hanning => 0.5 - 0.5 * phase.cos(),
            WindowKind::Blackman => 0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos(),
        }
    }

    /// All `n` coefficients of this window.
    pub fn coefficients(self, n: usize) -> Vec<f32> {
        (0..n).map(|i| self.coefficient(i, n)).collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WindowKind::Rectangular => "rectangular",
            WindowKind::Hamming => "hamming",
            WindowKind::Hanning => "hanning",
            WindowKind::Blackman => "blackman",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rectangular" | "none" => Ok(WindowKind::Rectangular),
            "hamming" => Ok(WindowKind::Hamming),
            "hanning" | "hann" => Ok(WindowKind::Hanning),
            "blackman" => Ok(WindowKind::Blackman),
            other => Err(AnalysisError::Config(format!("unknown window kind '{other}'"))),
        }
    }
}

/// One-sided spectrum of a real signal.
///
/// `frequencies`, `magnitudes` and `phases` all have `N / 2 + 1` entries,
/// where `N` is the number of transformed samples.
#[derive(Debug, Clone)]
pub struct SpectrumFrame {
    pub frequencies: Vec<f32>,
    pub magnitudes: Vec<f32>,
    pub phases: Vec<f32>,
    /// Hz between adjacent bins (`sample_rate / N`).
    pub bin_resolution: f32,
}

impl SpectrumFrame {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Index range of bins whose frequency lies in `(low, high]` when
    /// `low_exclusive` is set, otherwise `[low, high]`.
    ///
    /// The frequency axis is strictly increasing, so both ends are found
    /// by binary search.
    pub fn bin_range(&self, low: f32, high: f32, low_exclusive: bool) -> std::ops::Range<usize> {
        let start = if low_exclusive {
            self.frequencies.partition_point(|&f| f <= low)
        } else {
            self.frequencies.partition_point(|&f| f < low)
        };
        let end = self.frequencies.partition_point(|&f| f <= high);
        start..end.max(start)
    }

    /// Index of the loudest bin in `range`. The lowest index wins ties.
    pub fn peak_in(&self, range: std::ops::Range<usize>) -> Option<usize> {
        let start = range.start;
        self.magnitudes
            .get(range)?
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (offset, &mag)| match best {
                Some((_, best_mag)) if mag <= best_mag => best,
                _ => Some((offset, mag)),
            })
            .map(|(offset, _)| start + offset)
    }
}

/// Returns the centered slice of `signal` that is `window_size` samples long.
///
/// `start = max(0, N/2 - window_size/2)`, `end = min(N, start + window_size)`.
/// A window larger than the signal yields the whole signal.
pub fn centered_window(signal: &[f32], window_size: usize) -> &[f32] {
    let n = signal.len();
    let start = (n / 2).saturating_sub(window_size / 2);
    let end = n.min(start + window_size);
    &signal[start..end]
}

/// Multiplies `signal` by the coefficients of `window`. The output has the
/// same length as the input.
pub fn apply_window(signal: &[f32], window: WindowKind) -> Vec<f32> {
    let n = signal.len();
    let coefficients = window.coefficients(n);
    debug_assert_eq!(coefficients.len(), n);
    signal.iter().zip(coefficients).map(|(&sample, w)| sample * w).collect()
}

/// Windows `signal` and computes its one-sided spectrum.
///
/// This processes the input through the following steps:
/// 1. Multiply by the window coefficients for `window` ([`apply_window`])
/// 2. Forward FFT over all `N` samples ([`spectrum_of`])
/// 3. Keep bins `0..=N/2`, taking magnitude (`|X|`) and phase (`arg X`)
///
/// # Returns
/// * `Err(EmptyBuffer)` - `signal` is empty
/// * `Err(InvalidSampleRate)` - `sample_rate` is zero
pub fn transform(
    signal: &[f32],
    sample_rate: u32,
    window: WindowKind,
) -> Result<SpectrumFrame, AnalysisError> {
    if signal.is_empty() {
        return Err(AnalysisError::EmptyBuffer);
    }
    spectrum_of(&apply_window(signal, window), sample_rate)
}

/// One-sided spectrum of samples that have already been windowed.
pub fn spectrum_of(windowed: &[f32], sample_rate: u32) -> Result<SpectrumFrame, AnalysisError> {
    let n = windowed.len();
    if n == 0 {
        return Err(AnalysisError::EmptyBuffer);
    }
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidSampleRate);
    }

    let mut buffer: Vec<Complex<f32>> = windowed
        .iter()
        .map(|&sample| Complex { re: sample, im: 0.0 })
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let bins = n / 2 + 1;
    let bin_resolution = sample_rate as f32 / n as f32;
    let frequencies = (0..bins)
        .map(|k| (k as f64 * sample_rate as f64 / n as f64) as f32)
        .collect();
    let magnitudes = buffer[..bins].iter().map(|c| c.norm()).collect();
    let phases = buffer[..bins].iter().map(|c| c.arg()).collect();

    Ok(SpectrumFrame {
        frequencies,
        magnitudes,
        phases,
        bin_resolution,
    })
}
