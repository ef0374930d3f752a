//! # Harmonic Tracking Module
//!
//! Locates the overtones of a detected fundamental. For every order `n` the
//! tracker looks for the loudest bin within ±50 Hz of `n * f0`.
//!
//! The tolerance is a fixed width in Hz and does not follow the bin
//! resolution. It is only meaningful while the resolution is well below
//! 50 Hz; coarse spectra can both miss and over-match harmonics.

use serde::{Deserialize, Serialize};

use crate::fft::SpectrumFrame;

/// Half-width of the harmonic search band in Hz.
pub const HARMONIC_TOLERANCE_HZ: f32 = 50.0;

/// Highest order tracked unless configured otherwise.
pub const DEFAULT_MAX_ORDER: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarmonicPeak {
    /// Harmonic number, always >= 2.
    pub order: u32,
    pub frequency: f32,
    /// `order * fundamental`.
    pub expected: f32,
    pub magnitude: f32,
}

impl HarmonicPeak {
    /// Detected minus expected frequency, in Hz.
    pub fn deviation(&self) -> f32 {
        self.frequency - self.expected
    }
}

/// Finds harmonics 2..=`max_order` of `fundamental` in `spectrum`.
///
/// Orders whose search band holds no bins are left out, so the result is
/// ascending but may have gaps. Bands only move up, so the scan stops at the
/// first band that starts above the highest bin.
pub fn track_harmonics(spectrum: &SpectrumFrame, fundamental: f32, max_order: u32) -> Vec<HarmonicPeak> {
    let Some(&top) = spectrum.frequencies.last() else {
        return Vec::new();
    };
    if fundamental <= 0.0 {
        return Vec::new();
    }

    (2..=max_order)
        .map(|order| (order, order as f32 * fundamental))
        .take_while(|&(_, expected)| expected - HARMONIC_TOLERANCE_HZ <= top)
        .filter_map(|(order, expected)| {
            let band = spectrum.bin_range(
                expected - HARMONIC_TOLERANCE_HZ,
                expected + HARMONIC_TOLERANCE_HZ,
                false,
            );
            spectrum.peak_in(band).map(|bin| HarmonicPeak {
                order,
                frequency: spectrum.frequencies[bin],
                expected,
                magnitude: spectrum.magnitudes[bin],
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft::{WindowKind, transform};
    use std::f32::consts::PI;

    /// A tone with decaying partials at integer multiples of `freq`.
    fn generate_rich_tone(sample_rate: u32, freq: f32, partials: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (1..=partials)
                    .map(|n| (0.5 / n as f32) * (2.0 * PI * freq * n as f32 * t).sin())
                    .sum()
            })
            .collect()
    }

    #[test]
    fn finds_each_partial_of_a_rich_tone() {
        let sample_rate = 44100;
        let samples = generate_rich_tone(sample_rate, 220.0, 5, 44100);
        let spectrum = transform(&samples, sample_rate, WindowKind::Hamming).unwrap();
        let harmonics = track_harmonics(&spectrum, 220.0, 5);

        let orders: Vec<u32> = harmonics.iter().map(|h| h.order).collect();
        assert_eq!(orders, vec![2, 3, 4, 5]);
        for h in &harmonics {
            assert!((h.frequency - h.expected).abs() <= spectrum.bin_resolution);
            assert!((h.expected - 220.0 * h.order as f32).abs() < 1e-3);
        }
    }

    #[test]
    fn every_peak_is_within_tolerance() {
        let sample_rate = 8000;
        let samples = generate_rich_tone(sample_rate, 310.0, 3, 4000);
        let spectrum = transform(&samples, sample_rate, WindowKind::Hamming).unwrap();
        for h in track_harmonics(&spectrum, 305.0, 8) {
            assert!(h.deviation().abs() <= HARMONIC_TOLERANCE_HZ, "{h:?}");
        }
    }

    #[test]
    fn orders_past_nyquist_are_omitted() {
        // Nyquist is 4000 Hz: order 2 (3000) fits, order 3 (4500) has no bins
        // within 50 Hz, order 4 (6000) neither.
        let sample_rate = 8000;
        let samples = generate_rich_tone(sample_rate, 1500.0, 2, 8000);
        let spectrum = transform(&samples, sample_rate, WindowKind::Hamming).unwrap();
        let harmonics = track_harmonics(&spectrum, 1500.0, 4);
        assert_eq!(harmonics.len(), 1);
        assert_eq!(harmonics[0].order, 2);
    }

    #[test]
    fn gaps_in_order_numbering_are_preserved() {
        // Hand-built spectrum with bins only near 200 and 400 Hz for f0 = 100.
        let spectrum = SpectrumFrame {
            frequencies: vec![0.0, 100.0, 200.0, 400.0],
            magnitudes: vec![0.0, 1.0, 0.5, 0.25],
            phases: vec![0.0; 4],
            bin_resolution: 100.0,
        };
        let orders: Vec<u32> = track_harmonics(&spectrum, 100.0, 5)
            .iter()
            .map(|h| h.order)
            .collect();
        assert_eq!(orders, vec![2, 4]);
    }

    #[test]
    fn huge_max_order_stops_at_nyquist() {
        let sample_rate = 8000;
        let samples = generate_rich_tone(sample_rate, 440.0, 3, 8000);
        let spectrum = transform(&samples, sample_rate, WindowKind::Hamming).unwrap();
        let harmonics = track_harmonics(&spectrum, 440.0, u32::MAX);

        // 9 * 440 = 3960 is the last band starting below 4000 Hz.
        let orders: Vec<u32> = harmonics.iter().map(|h| h.order).collect();
        assert_eq!(orders, (2..=9).collect::<Vec<u32>>());
    }

    #[test]
    fn max_order_below_two_yields_nothing() {
        let spectrum = SpectrumFrame {
            frequencies: vec![0.0, 100.0, 200.0],
            magnitudes: vec![0.0, 1.0, 1.0],
            phases: vec![0.0; 3],
            bin_resolution: 100.0,
        };
        assert!(track_harmonics(&spectrum, 100.0, 1).is_empty());
        assert!(track_harmonics(&spectrum, 0.0, 5).is_empty());
    }
}
