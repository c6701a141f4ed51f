//! Configuration and score loading

mod schema;
mod score;

pub use schema::*;
pub use score::{ParameterEvent, Score, ScoreEvent, ScoreValue};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Load configuration from a YAML (or `.json`) file
pub fn load_config(path: &Path) -> Result<SynthConfig> {
    let config: SynthConfig = load_document(path)?;
    config.validate()?;
    debug!(?path, "configuration loaded");
    Ok(config)
}

/// Load a score from a YAML (or `.json`) file
pub fn load_score(path: &Path) -> Result<Score> {
    let score: Score = load_document(path)?;
    score.validate()?;
    debug!(?path, events = score.events.len(), "score loaded");
    Ok(score)
}

fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {:?}", path))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&contents).with_context(|| format!("invalid JSON in {:?}", path))
    } else {
        serde_yaml::from_str(&contents).with_context(|| format!("invalid YAML in {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::Waveform;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
audio:
  sample_rate: 48000
  buffer_size: 256

master:
  volume: 0.7

patch:
  oscillator:
    waveform: triangle
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.master.volume, 0.7);
        assert_eq!(config.patch.oscillator.waveform, Waveform::Triangle);
    }

    #[test]
    fn test_load_json_config() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"midi": {"channel": 2}}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.midi.channel, Some(2));
        assert_eq!(config.audio.sample_rate, 44100);
    }

    #[test]
    fn test_invalid_config_fails_validation() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"master:\n  volume: 3.0\n").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(load_config(Path::new("/nonexistent/monosynth.yaml")).is_err());
    }

    #[test]
    fn test_load_score() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"events:\n  - at: 0.0\n    midi: [144, 60, 100]\n").unwrap();

        let score = load_score(file.path()).unwrap();
        assert_eq!(score.events.len(), 1);
    }
}
