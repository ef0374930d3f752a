//! # Pitch Analysis Pipeline
//!
//! Runs one analysis from a loaded buffer to an [`AnalysisResult`]:
//!
//! `Loaded -> Windowed -> Transformed -> PitchEstimated -> HarmonicsTracked
//! -> NoteResolved -> Assembled`, or `Failed(kind)` from any stage.
//!
//! The fundamental may come from a centered sub-window of the buffer; the
//! harmonics are always tracked on the full-buffer spectrum.

use std::fmt;
use tracing::{debug, info, warn};

use crate::audio::AudioBuffer;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, FailureKind};
use crate::fft::{self, SpectrumFrame};
use crate::harmonics::{self, HARMONIC_TOLERANCE_HZ};
use crate::inharmonicity;
use crate::pitch;
use crate::tuning::{EqualTemperament, NoteCatalog, TuningStatus};
use crate::{AnalysisResult, BufferMetadata};

/// Stages of a single analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loaded,
    Windowed,
    Transformed,
    PitchEstimated,
    HarmonicsTracked,
    NoteResolved,
    Assembled,
    Failed(FailureKind),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loaded => "loaded",
            Stage::Windowed => "windowed",
            Stage::Transformed => "transformed",
            Stage::PitchEstimated => "pitch_estimated",
            Stage::HarmonicsTracked => "harmonics_tracked",
            Stage::NoteResolved => "note_resolved",
            Stage::Assembled => "assembled",
            Stage::Failed(kind) => return write!(f, "failed({kind:?})"),
        };
        f.write_str(name)
    }
}

/// Analyses buffers with a fixed configuration and note catalog.
///
/// Holds no per-call state, so one analyzer can be shared freely.
#[derive(Debug, Clone)]
pub struct PitchAnalyzer<C = EqualTemperament> {
    config: AnalysisConfig,
    catalog: C,
}

impl PitchAnalyzer<EqualTemperament> {
    pub fn new(config: AnalysisConfig) -> Self {
        Self::with_catalog(config, EqualTemperament)
    }
}

impl<C: NoteCatalog> PitchAnalyzer<C> {
    pub fn with_catalog(config: AnalysisConfig, catalog: C) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs the full pipeline on `buffer`.
    ///
    /// Either every stage succeeds and a complete result comes back, or
    /// the first failing stage's error is returned.
    pub fn analyze(&self, buffer: &AudioBuffer) -> Result<AnalysisResult, AnalysisError> {
        let mut stage = Stage::Loaded;
        match self.run_stages(buffer, &mut stage) {
            Ok(result) => {
                info!(
                    frequency = result.pitch.frequency,
                    note = %result.note.label,
                    cents = result.note.cents,
                    status = %result.status,
                    harmonics = result.harmonics.len(),
                    "analysis complete"
                );
                Ok(result)
            }
            Err(err) => {
                let failed = Stage::Failed(err.kind());
                warn!(after = %stage, stage = %failed, error = %err, "analysis failed");
                Err(err)
            }
        }
    }

    fn run_stages(&self, buffer: &AudioBuffer, stage: &mut Stage) -> Result<AnalysisResult, AnalysisError> {
        self.config.validate()?;
        let sample_rate = buffer.sample_rate();
        let window = self.config.window;

        let fundamental_signal = match self.config.sub_window {
            Some(size) => fft::centered_window(buffer.samples(), size),
            None => buffer.samples(),
        };
        let uses_sub_window = fundamental_signal.len() != buffer.len();
        debug!(
            samples = fundamental_signal.len(),
            total = buffer.len(),
            %window,
            "selected analysis window"
        );

        let full_windowed = fft::apply_window(buffer.samples(), window);
        let sub_windowed = uses_sub_window.then(|| fft::apply_window(fundamental_signal, window));
        advance(stage, Stage::Windowed);

        let full_spectrum = fft::spectrum_of(&full_windowed, sample_rate)?;
        let sub_spectrum = match &sub_windowed {
            Some(samples) => Some(fft::spectrum_of(samples, sample_rate)?),
            None => None,
        };
        let fundamental_spectrum: &SpectrumFrame = sub_spectrum.as_ref().unwrap_or(&full_spectrum);
        advance(stage, Stage::Transformed);
        debug!(
            bins = fundamental_spectrum.len(),
            resolution_hz = fundamental_spectrum.bin_resolution,
            "spectrum ready"
        );
        if full_spectrum.bin_resolution > HARMONIC_TOLERANCE_HZ / 10.0 {
            warn!(
                resolution_hz = full_spectrum.bin_resolution,
                tolerance_hz = HARMONIC_TOLERANCE_HZ,
                "bin resolution is coarse compared to the harmonic tolerance"
            );
        }

        let mut estimate = pitch::estimate_fundamental(fundamental_spectrum);
        // A zero-magnitude peak means the band is silent.
        if !estimate.is_detected() || estimate.magnitude <= 0.0 {
            return Err(AnalysisError::UndetectedPitch);
        }
        if self.config.refine_peak {
            estimate = pitch::refine_from_spectrum(fundamental_spectrum, estimate);
        }
        advance(stage, Stage::PitchEstimated);
        debug!(frequency = estimate.frequency, magnitude = estimate.magnitude, "fundamental");

        let harmonics = harmonics::track_harmonics(
            &full_spectrum,
            estimate.frequency,
            self.config.max_harmonic_order,
        );
        advance(stage, Stage::HarmonicsTracked);
        debug!(found = harmonics.len(), "harmonics tracked");

        let note = self.catalog.lookup(estimate.frequency);
        advance(stage, Stage::NoteResolved);

        let status = TuningStatus::classify(note.cents);
        let inharmonicity =
            inharmonicity::calculate_b_value(&inharmonicity::partials_from(&estimate, &harmonics));

        let result = AnalysisResult {
            metadata: BufferMetadata {
                sample_rate,
                sample_count: buffer.len(),
                duration_seconds: buffer.duration(),
                bin_resolution: fundamental_spectrum.bin_resolution,
                window,
            },
            pitch: estimate,
            note,
            harmonics,
            status,
            inharmonicity,
        };
        advance(stage, Stage::Assembled);
        Ok(result)
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = %stage, to = %next, "pipeline stage");
    *stage = next;
}
