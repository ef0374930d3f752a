// tuner-core/src/lib.rs

//! The core logic for the instrument tuner.
//! This crate is responsible for loading recorded tones, spectral analysis,
//! fundamental and harmonic detection, and note matching. It is completely
//! headless and contains no presentation code.

pub mod audio;
pub mod config;
pub mod error;
pub mod fft;
pub mod harmonics;
pub mod inharmonicity;
pub mod pipeline;
pub mod pitch;
pub mod tuning;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use audio::{AudioBuffer, AudioSource, WavSource};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, FailureKind};
pub use fft::{SpectrumFrame, WindowKind};
pub use harmonics::HarmonicPeak;
pub use pipeline::{PitchAnalyzer, Stage};
pub use pitch::PitchEstimate;
pub use tuning::{EqualTemperament, FixedNote, NoteCatalog, NoteMatch, TuningStatus};

/// Describes the signal an analysis ran on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferMetadata {
    pub sample_rate: u32,
    pub sample_count: usize,
    pub duration_seconds: f32,
    /// Hz per bin of the spectrum the fundamental was picked from.
    pub bin_resolution: f32,
    pub window: WindowKind,
}

/// The outcome of one successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metadata: BufferMetadata,
    /// The detected fundamental. Always non-zero here.
    pub pitch: PitchEstimate,
    /// The fundamental placed against the note catalog.
    pub note: NoteMatch,
    /// Harmonics found, ascending by order. Missing orders were not detected.
    pub harmonics: Vec<HarmonicPeak>,
    pub status: TuningStatus,
    /// Inharmonicity coefficient B, when enough partials were found.
    pub inharmonicity: Option<f32>,
}

/// Loads a WAV file and analyses it with `config`.
pub fn analyze_file(path: &Path, config: AnalysisConfig) -> Result<AnalysisResult, AnalysisError> {
    let buffer = WavSource.load(path)?;
    PitchAnalyzer::new(config).analyze(&buffer)
}
