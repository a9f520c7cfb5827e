//! Pipeline settings.
//!
//! Settings come from an optional TOML file, then `FINEPRINT_*` environment
//! variables override individual values:
//!
//! ```toml
//! min_confidence_threshold = 0.3
//! high_confidence_threshold = 0.7
//! max_total_documents = 10000
//! min_text_length = 100
//!
//! [linguistic]
//! enabled = true
//! lexicon_path = "lexicon.toml"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use fineprint::LinguisticConfig;
use serde::Deserialize;

use crate::errors::{PipelineError, PipelineResult};

const ENV_PREFIX: &str = "FINEPRINT_";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Detections below this confidence are not stored as findings.
    pub min_confidence_threshold: f64,
    /// Findings at or above this confidence are logged prominently.
    pub high_confidence_threshold: f64,
    /// Upper bound on documents handled in one run.
    pub max_total_documents: usize,
    /// Documents with fewer characters are rejected as insufficient content.
    pub min_text_length: usize,
    pub linguistic: LinguisticConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_confidence_threshold: 0.3,
            high_confidence_threshold: 0.7,
            max_total_documents: 10_000,
            min_text_length: 100,
            linguistic: LinguisticConfig::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> PipelineResult<Self> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| PipelineError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file.
    pub fn from_file(path: &Path) -> PipelineResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| PipelineError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// File settings (when given) with environment overrides applied.
    pub fn load(path: Option<&Path>) -> PipelineResult<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env_overrides()?;
        Ok(settings)
    }

    /// Override values from `FINEPRINT_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> PipelineResult<()> {
        if let Some(value) = env_parse("MIN_CONFIDENCE_THRESHOLD")? {
            self.min_confidence_threshold = value;
        }
        if let Some(value) = env_parse("HIGH_CONFIDENCE_THRESHOLD")? {
            self.high_confidence_threshold = value;
        }
        if let Some(value) = env_parse("MAX_TOTAL_DOCUMENTS")? {
            self.max_total_documents = value;
        }
        if let Some(value) = env_parse("MIN_TEXT_LENGTH")? {
            self.min_text_length = value;
        }
        if let Some(value) = env_parse("LINGUISTIC_ENABLED")? {
            self.linguistic.enabled = value;
        }
        if let Some(value) = env_var("LEXICON_PATH") {
            self.linguistic.lexicon_path = Some(PathBuf::from(value));
        }
        self.validate()
    }

    pub fn validate(&self) -> PipelineResult<()> {
        for (name, value) in [
            ("min_confidence_threshold", self.min_confidence_threshold),
            ("high_confidence_threshold", self.high_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PipelineError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.high_confidence_threshold < self.min_confidence_threshold {
            return Err(PipelineError::Config(format!(
                "high_confidence_threshold ({}) is below min_confidence_threshold ({})",
                self.high_confidence_threshold, self.min_confidence_threshold
            )));
        }
        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(format!("{}{}", ENV_PREFIX, key)).ok()
}

fn env_parse<T>(key: &str) -> PipelineResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| {
            PipelineError::Config(format!("invalid {}{}: {}", ENV_PREFIX, key, e))
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.min_confidence_threshold, 0.3);
        assert_eq!(settings.high_confidence_threshold, 0.7);
        assert_eq!(settings.max_total_documents, 10_000);
        assert_eq!(settings.min_text_length, 100);
        assert!(settings.linguistic.enabled);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings = Settings::from_toml_str(
            "min_confidence_threshold = 0.2\n[linguistic]\nenabled = false\n",
        )
        .unwrap();
        assert_eq!(settings.min_confidence_threshold, 0.2);
        assert_eq!(settings.high_confidence_threshold, 0.7);
        assert!(!settings.linguistic.enabled);
        assert!(settings.linguistic.lexicon_path.is_none());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = Settings::from_toml_str("min_confidence_threshold = 1.5").unwrap_err();
        assert!(err.to_string().contains("min_confidence_threshold"));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        assert!(Settings::from_toml_str(
            "min_confidence_threshold = 0.8\nhigh_confidence_threshold = 0.5"
        )
        .is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            Settings::from_toml_str("window_width = 900"),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_total_documents = 25").unwrap();
        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.max_total_documents, 25);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Settings::from_file(Path::new("/no/such/fineprint.toml")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn env_overrides_file_values() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::set_var("FINEPRINT_MIN_CONFIDENCE_THRESHOLD", "0.15");
        env::set_var("FINEPRINT_LEXICON_PATH", "/etc/fineprint/lexicon.toml");
        let settings = Settings::load(None).unwrap();
        env::remove_var("FINEPRINT_MIN_CONFIDENCE_THRESHOLD");
        env::remove_var("FINEPRINT_LEXICON_PATH");

        assert_eq!(settings.min_confidence_threshold, 0.15);
        assert_eq!(
            settings.linguistic.lexicon_path,
            Some(PathBuf::from("/etc/fineprint/lexicon.toml"))
        );
    }

    #[test]
    fn env_override_must_parse() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::set_var("FINEPRINT_MAX_TOTAL_DOCUMENTS", "lots");
        let result = Settings::load(None);
        env::remove_var("FINEPRINT_MAX_TOTAL_DOCUMENTS");

        let err = result.unwrap_err();
        assert!(err.to_string().contains("FINEPRINT_MAX_TOTAL_DOCUMENTS"));
    }
}
