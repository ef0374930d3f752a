//! Plain-text rendering of an analysis for the terminal.

use std::fmt;
use tuner_core::AnalysisResult;

/// Text report of one analysis, written through [`fmt::Display`].
pub struct Report<'a>(pub &'a AnalysisResult);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        let meta = &result.metadata;

        writeln!(f, "Detected frequency: {:.2} Hz", result.pitch.frequency)?;
        writeln!(f, "Note:               {}", result.note.label)?;
        writeln!(f, "Exact frequency:    {:.2} Hz", result.note.exact_frequency)?;
        writeln!(f, "Deviation:          {:+.1} cents", result.note.cents)?;
        writeln!(f, "Status:             {}", result.status)?;
        writeln!(f, "Duration:           {:.2} s", meta.duration_seconds)?;
        writeln!(
            f,
            "Sample rate:        {} Hz ({} samples, {:.2} Hz/bin, {} window)",
            meta.sample_rate, meta.sample_count, meta.bin_resolution, meta.window
        )?;
        writeln!(f, "Magnitude:          {:.2}", result.pitch.magnitude)?;

        if !result.harmonics.is_empty() {
            writeln!(f)?;
            writeln!(f, "Harmonics:")?;
            writeln!(f, "  {:<8} {:<15} {:<15} {:<12}", "Order", "Detected", "Expected", "Magnitude")?;
            for h in &result.harmonics {
                writeln!(
                    f,
                    "  {:<8} {:<15.2} {:<15.2} {:<12.2}",
                    h.order, h.frequency, h.expected, h.magnitude
                )?;
            }
        }

        if let Some(b) = result.inharmonicity {
            writeln!(f)?;
            writeln!(f, "Inharmonicity B:    {b:.3e}")?;
        }
        Ok(())
    }
}

pub fn render(result: &AnalysisResult) -> String {
    Report(result).to_string()
}
