//! # Inharmonicity Module
//!
//! Stiff strings put their overtones slightly above integer multiples of the
//! fundamental: `f_n = n * f0 * sqrt(1 + B * n^2)`. Squaring and dividing by
//! `n^2` turns this into a straight line in `n^2`, so `B` is the slope over
//! the intercept of a linear regression of `(f_n / n)^2` against `n^2`.

use linreg::linear_regression;
use serde::{Deserialize, Serialize};

use crate::harmonics::HarmonicPeak;
use crate::pitch::PitchEstimate;

/// Harmonics quieter than this fraction of the fundamental (-60 dB) are
/// treated as leakage and left out of the fit.
pub const PARTIAL_FLOOR: f32 = 1e-3;

/// A single measured partial of a note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Partial {
    pub number: u32,    // The partial number (n=1, 2, 3...)
    pub frequency: f32, // The measured frequency in Hz
}

/// Collects the fundamental (n=1) and the audible harmonics as partials.
pub fn partials_from(fundamental: &PitchEstimate, harmonics: &[HarmonicPeak]) -> Vec<Partial> {
    let floor = fundamental.magnitude * PARTIAL_FLOOR;
    std::iter::once(Partial {
        number: 1,
        frequency: fundamental.frequency,
    })
    .chain(harmonics.iter().filter(|h| h.magnitude >= floor).map(|h| Partial {
        number: h.order,
        frequency: h.frequency,
    }))
    .collect()
}

/// Calculates the inharmonicity constant 'B' from a set of partials.
///
/// Needs at least three usable partials; returns `None` otherwise or when
/// the fit is degenerate.
pub fn calculate_b_value(partials: &[Partial]) -> Option<f32> {
    // x = n^2, y = (f_n / n)^2
    let (xs, ys): (Vec<f64>, Vec<f64>) = partials
        .iter()
        .filter(|p| p.number > 0 && p.frequency > 0.0)
        .map(|p| {
            let n = p.number as f64;
            let f_n = p.frequency as f64;
            (n * n, (f_n / n) * (f_n / n))
        })
        .unzip();

    if xs.len() < 3 {
        return None;
    }

    let (slope, intercept) = linear_regression::<_, _, f64>(&xs, &ys).ok()?;
    if intercept.abs() > 1e-6 {
        let b_value = slope / intercept;
        b_value.is_finite().then_some(b_value as f32)
    } else {
        None
    }
}
