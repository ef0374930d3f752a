//! # Musical Tuning Module
//!
//! This module maps detected frequencies onto musical notes and measures how
//! far they are from being in tune.
//!
//! ## Features
//! - `NoteCatalog` trait: frequency to (note, exact frequency, cents)
//! - `EqualTemperament`: nearest note on the 12-TET scale, A4 = 440 Hz, C0 to B8
//! - `FixedNote`: deviation against one chosen note (manual tuning mode)
//! - Cent deviation and in-tune/sharp/flat classification

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::AnalysisError;

/// Reference pitch of A4 in Hz.
pub const A4_FREQUENCY: f32 = 440.0;

/// Deviations strictly inside ±10 cents count as in tune.
pub const IN_TUNE_CENTS: f32 = 10.0;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Represents a single musical note with its name and frequency.
#[derive(Debug, Clone)]
pub struct Note {
    /// Note name (e.g., "A4", "C#3")
    pub name: String,
    /// Frequency in Hz
    pub frequency: f32,
}

/// Equal-temperament notes from C0 to B8.
///
/// C0 sits 57 semitones below A4, so note `i` has frequency
/// `440 * 2^((i - 57) / 12)`.
static NOTES: Lazy<Vec<Note>> = Lazy::new(|| {
    (0..108)
        .map(|i| {
            let frequency = A4_FREQUENCY * 2.0_f32.powf((i as f32 - 57.0) / 12.0);
            let name = format!("{}{}", NOTE_NAMES[i % 12], i / 12);
            Note { name, frequency }
        })
        .collect()
});

/// Note name to table index.
static NOTE_MAP: Lazy<BTreeMap<String, usize>> = Lazy::new(|| {
    NOTES
        .iter()
        .enumerate()
        .map(|(i, note)| (note.name.clone(), i))
        .collect()
});

/// A frequency placed relative to a reference note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteMatch {
    pub label: String,
    /// Exact frequency of `label` in Hz.
    pub exact_frequency: f32,
    /// `1200 * log2(detected / exact_frequency)`.
    pub cents: f32,
}

/// Maps a detected frequency to a note.
///
/// Implementations must be pure. The pipeline never calls `lookup` with an
/// undetected (zero) frequency.
pub trait NoteCatalog {
    fn lookup(&self, frequency: f32) -> NoteMatch;
}

/// Nearest note on the equal-tempered scale referenced to A4 = 440 Hz.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualTemperament;

impl NoteCatalog for EqualTemperament {
    fn lookup(&self, frequency: f32) -> NoteMatch {
        let (label, exact_frequency) = find_nearest_note(frequency);
        NoteMatch {
            cents: calculate_cents_deviation(frequency, exact_frequency),
            label,
            exact_frequency,
        }
    }
}

/// Reports every frequency against one target note, like a tuner locked to
/// a single string.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedNote {
    pub label: String,
    pub frequency: f32,
}

impl FixedNote {
    /// Builds a target from a note label such as `"A4"`, `"C#3"` or `"Bb2"`.
    pub fn from_label(label: &str) -> Result<Self, AnalysisError> {
        let name = sharp_spelling(label.trim())
            .ok_or_else(|| AnalysisError::Config(format!("unknown note '{label}'")))?;
        let frequency = note_frequency(&name)
            .ok_or_else(|| AnalysisError::Config(format!("note '{label}' is outside C0..B8")))?;
        Ok(Self {
            label: name,
            frequency,
        })
    }
}

impl NoteCatalog for FixedNote {
    fn lookup(&self, frequency: f32) -> NoteMatch {
        NoteMatch {
            label: self.label.clone(),
            exact_frequency: self.frequency,
            cents: calculate_cents_deviation(frequency, self.frequency),
        }
    }
}

/// Finds the closest note to `freq`, measured in cents rather than Hz.
///
/// Frequencies outside the table snap to C0 or B8.
///
/// # Returns
/// * `(note_name, target_frequency)`
pub fn find_nearest_note(freq: f32) -> (String, f32) {
    let semitones_from_c0 = (12.0 * (freq / NOTES[0].frequency).log2()).round();
    let index = if semitones_from_c0.is_finite() {
        semitones_from_c0.clamp(0.0, (NOTES.len() - 1) as f32) as usize
    } else {
        0
    };
    let note = &NOTES[index];
    (note.name.clone(), note.frequency)
}

/// Exact frequency of a note by its sharp-spelled name (e.g. `"A4"`, `"F#2"`).
pub fn note_frequency(name: &str) -> Option<f32> {
    NOTE_MAP.get(name).map(|&i| NOTES[i].frequency)
}

/// Rewrites flat spellings into the sharp names used by the table
/// (`"Bb2"` becomes `"A#2"`). Returns `None` for malformed labels.
fn sharp_spelling(label: &str) -> Option<String> {
    let mut chars = label.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let rest: String = chars.collect();
    let position = NOTE_NAMES.iter().position(|n| n.len() == 1 && n.starts_with(letter))?;

    let (step, octave) = match rest.strip_prefix('#') {
        Some(octave) => (1, octave),
        None => match rest.strip_prefix('b') {
            Some(octave) => (-1, octave),
            None => (0, rest.as_str()),
        },
    };
    let octave: i32 = octave.parse().ok()?;

    let semitone = octave * 12 + position as i32 + step;
    if semitone < 0 {
        return None;
    }
    Some(format!(
        "{}{}",
        NOTE_NAMES[(semitone % 12) as usize],
        semitone / 12
    ))
}

/// Calculates the deviation from a target frequency in cents.
///
/// Cents are a logarithmic unit of pitch measurement where:
/// - 100 cents = 1 semitone
/// - 1200 cents = 1 octave
/// - Positive values indicate sharpness, negative values indicate flatness
pub fn calculate_cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}

/// Whether a note is in tune, sharp or flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TuningStatus {
    InTune,
    Sharp,
    Flat,
}

impl TuningStatus {
    /// `|cents| < 10` is in tune, otherwise the sign decides.
    pub fn classify(cents: f32) -> Self {
        if cents.abs() < IN_TUNE_CENTS {
            TuningStatus::InTune
        } else if cents > 0.0 {
            TuningStatus::Sharp
        } else {
            TuningStatus::Flat
        }
    }
}

impl fmt::Display for TuningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TuningStatus::InTune => "in tune",
            TuningStatus::Sharp => "sharp",
            TuningStatus::Flat => "flat",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_spans_c0_to_b8() {
        assert_eq!(NOTES.len(), 108);
        assert_eq!(NOTES[0].name, "C0");
        assert_eq!(NOTES[107].name, "B8");
        assert_eq!(NOTES[57].name, "A4");
        assert_eq!(NOTES[57].frequency, 440.0);
    }

    #[test]
    fn nearest_note_for_reference_pitches() {
        for (freq, name) in [
            (440.0, "A4"),
            (82.41, "E2"),
            (261.63, "C4"),
            (27.5, "A0"),
            (4186.01, "C8"),
            (445.0, "A4"),
            (452.0, "A4"),
            (454.0, "A#4"),
        ] {
            assert_eq!(find_nearest_note(freq).0, name, "{freq} Hz");
        }
    }

    #[test]
    fn out_of_range_frequencies_snap_to_table_ends() {
        assert_eq!(find_nearest_note(5.0).0, "C0");
        assert_eq!(find_nearest_note(20000.0).0, "B8");
    }

    #[test]
    fn cents_are_zero_for_exact_match() {
        for note in NOTES.iter() {
            let cents = calculate_cents_deviation(note.frequency, note.frequency);
            assert!(cents.abs() < 1e-6, "{} gave {cents}", note.name);
        }
    }

    #[test]
    fn cents_for_known_intervals() {
        assert!((calculate_cents_deviation(880.0, 440.0) - 1200.0).abs() < 1e-3);
        assert!((calculate_cents_deviation(445.0, 440.0) - 19.56).abs() < 0.01);
        assert!((calculate_cents_deviation(220.0, 440.0) + 1200.0).abs() < 1e-3);
    }

    #[test]
    fn equal_temperament_lookup() {
        let m = EqualTemperament.lookup(445.0);
        assert_eq!(m.label, "A4");
        assert_eq!(m.exact_frequency, 440.0);
        assert!((m.cents - 19.56).abs() < 0.01);
        assert!(EqualTemperament.lookup(440.0).cents.abs() < 1e-6);
    }

    #[test]
    fn fixed_note_reports_against_target() {
        let target = FixedNote::from_label("E2").unwrap();
        assert_eq!(target.label, "E2");
        assert!((target.frequency - 82.41).abs() < 0.01);
        let m = target.lookup(110.0);
        assert_eq!(m.label, "E2");
        assert!((m.cents - 500.0).abs() < 0.1);
    }

    #[test]
    fn flat_spellings_are_accepted() {
        assert_eq!(FixedNote::from_label("Bb2").unwrap().label, "A#2");
        assert_eq!(FixedNote::from_label("Cb4").unwrap().label, "B3");
        assert_eq!(FixedNote::from_label("a4").unwrap().label, "A4");
        assert!(FixedNote::from_label("H4").is_err());
        assert!(FixedNote::from_label("A").is_err());
        assert!(FixedNote::from_label("C9").is_err());
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(TuningStatus::classify(0.0), TuningStatus::InTune);
        assert_eq!(TuningStatus::classify(9.99), TuningStatus::InTune);
        assert_eq!(TuningStatus::classify(-9.99), TuningStatus::InTune);
        assert_eq!(TuningStatus::classify(10.0), TuningStatus::Sharp);
        assert_eq!(TuningStatus::classify(19.6), TuningStatus::Sharp);
        assert_eq!(TuningStatus::classify(-10.0), TuningStatus::Flat);
        assert_eq!(TuningStatus::InTune.to_string(), "in tune");
    }
}
