use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::AnalysisError;
use crate::fft::WindowKind;
use crate::harmonics::DEFAULT_MAX_ORDER;

/// Settings for one pitch analysis.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// window = "blackman"
/// sub_window = 8192
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Window applied before every transform.
    pub window: WindowKind,
    /// Length of the centered slice used to find the fundamental.
    /// `None` uses the whole buffer. Harmonics always use the whole buffer.
    pub sub_window: Option<usize>,
    /// Highest harmonic order tracked (orders start at 2).
    pub max_harmonic_order: u32,
    /// Interpolate the fundamental between bins.
    pub refine_peak: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: WindowKind::default(),
            sub_window: None,
            max_harmonic_order: DEFAULT_MAX_ORDER,
            refine_peak: false,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, AnalysisError> {
        let config: Self = toml::from_str(text).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AnalysisError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AnalysisError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.sub_window == Some(0) {
            return Err(AnalysisError::Config("sub_window must be at least one sample".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.window, WindowKind::Hamming);
        assert_eq!(config.sub_window, None);
        assert_eq!(config.max_harmonic_order, 5);
        assert!(!config.refine_peak);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AnalysisConfig::from_toml_str("window = \"blackman\"\nsub_window = 4096\n").unwrap();
        assert_eq!(config.window, WindowKind::Blackman);
        assert_eq!(config.sub_window, Some(4096));
        assert_eq!(config.max_harmonic_order, 5);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(AnalysisConfig::from_toml_str("").unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(AnalysisConfig::from_toml_str("window = \"kaiser\"").is_err());
        assert!(AnalysisConfig::from_toml_str("hop = 3").is_err());
        assert!(AnalysisConfig::from_toml_str("sub_window = 0").is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = AnalysisConfig::from_file(Path::new("/no/such/tuner.toml")).unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }
}
