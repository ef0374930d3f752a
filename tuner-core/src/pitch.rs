//! # Pitch Detection Module
//!
//! This module finds the fundamental frequency of a tone from its spectrum.
//! The estimator picks the strongest bin inside the musical band
//! (above 20 Hz, up to and including 5000 Hz), which keeps DC and rumble
//! out and stops it from locking onto an overtone of a low note.
//!
//! ## Features
//! - Peak picking with a deterministic lowest-frequency tie-break
//! - Optional log-parabolic refinement for sub-bin accuracy

use serde::{Deserialize, Serialize};

use crate::fft::SpectrumFrame;

/// Lower edge of the musical band (exclusive).
pub const MIN_FUNDAMENTAL_HZ: f32 = 20.0;
/// Upper edge of the musical band (inclusive).
pub const MAX_FUNDAMENTAL_HZ: f32 = 5000.0;

/// The strongest component found in the musical band.
///
/// `frequency == 0.0` means nothing was found; see [`PitchEstimate::is_detected`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PitchEstimate {
    pub frequency: f32,
    pub magnitude: f32,
}

impl PitchEstimate {
    pub const UNDETECTED: PitchEstimate = PitchEstimate {
        frequency: 0.0,
        magnitude: 0.0,
    };

    pub fn is_detected(&self) -> bool {
        self.frequency > 0.0
    }
}

/// Finds the dominant peak of `spectrum` inside the musical band.
///
/// Returns [`PitchEstimate::UNDETECTED`] when the band holds no bins,
/// e.g. for a sample rate so low that nothing lies above 20 Hz.
pub fn estimate_fundamental(spectrum: &SpectrumFrame) -> PitchEstimate {
    let band = spectrum.bin_range(MIN_FUNDAMENTAL_HZ, MAX_FUNDAMENTAL_HZ, true);
    match spectrum.peak_in(band) {
        Some(bin) => PitchEstimate {
            frequency: spectrum.frequencies[bin],
            magnitude: spectrum.magnitudes[bin],
        },
        None => PitchEstimate::UNDETECTED,
    }
}

/// Refines a peak estimate by fitting a parabola through the log magnitudes
/// of the peak bin and its two neighbours.
///
/// The refined frequency stays within half a bin of the input. If the
/// neighbours are missing or silent the estimate is returned unchanged.
pub fn refine_from_spectrum(spectrum: &SpectrumFrame, estimate: PitchEstimate) -> PitchEstimate {
    if !estimate.is_detected() || spectrum.bin_resolution <= 0.0 {
        return estimate;
    }
    let peak_bin = (estimate.frequency / spectrum.bin_resolution).round() as usize;
    if peak_bin == 0 || peak_bin + 1 >= spectrum.len() {
        return estimate;
    }

    let y1 = spectrum.magnitudes[peak_bin - 1].ln();
    let y2 = spectrum.magnitudes[peak_bin].ln();
    let y3 = spectrum.magnitudes[peak_bin + 1].ln();
    if !y1.is_finite() || !y2.is_finite() || !y3.is_finite() {
        return estimate;
    }

    let denominator = 2.0 * y2 - y1 - y3;
    if denominator.abs() < 1e-6 {
        return estimate;
    }

    let peak_shift = ((y3 - y1) / (2.0 * denominator)).clamp(-0.5, 0.5);
    let frequency = (peak_bin as f32 + peak_shift) * spectrum.bin_resolution;

    if frequency.is_finite() && frequency > 0.0 {
        PitchEstimate {
            frequency,
            magnitude: estimate.magnitude,
        }
    } else {
        estimate
    }
}
