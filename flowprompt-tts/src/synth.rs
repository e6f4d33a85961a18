use crate::gtts::{GttsConfig, GttsSynthesizer};
use crate::piper::{PiperConfig, PiperSynthesizer};
use crate::{TtsError, TtsResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A speech engine that renders text into an audio file.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Short engine name for logs (e.g., "piper")
    fn name(&self) -> &'static str;

    /// Extension of the files this engine writes, without the dot
    fn file_extension(&self) -> &'static str {
        "wav"
    }

    /// Synthesize `text` into a file at `output`
    async fn synthesize(&self, text: &str, output: &Path) -> TtsResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Local neural voice
    #[default]
    Piper,
    /// Hosted Google Translate voice
    Gtts,
}

impl FromStr for Backend {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "piper" => Ok(Backend::Piper),
            "gtts" | "google" => Ok(Backend::Gtts),
            other => Err(TtsError::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Piper => f.write_str("piper"),
            Backend::Gtts => f.write_str("gtts"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SynthesizerConfig {
    pub backend: Backend,
    pub piper: PiperConfig,
    pub gtts: GttsConfig,
}

/// Build the configured engine. Fails before any synthesis when the engine
/// cannot run at all (e.g. the Piper model file is missing).
pub fn build_synthesizer(cfg: &SynthesizerConfig) -> TtsResult<Box<dyn Synthesizer>> {
    Ok(match cfg.backend {
        Backend::Piper => Box::new(PiperSynthesizer::new(cfg.piper.clone())?),
        Backend::Gtts => Box::new(GttsSynthesizer::new(cfg.gtts.clone())?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!("piper".parse::<Backend>().unwrap(), Backend::Piper);
        assert_eq!(" GTTS ".parse::<Backend>().unwrap(), Backend::Gtts);
        assert!(matches!("espeak".parse::<Backend>(), Err(TtsError::UnknownBackend(_))));
        assert_eq!(Backend::Gtts.to_string(), "gtts");
    }

    #[test]
    fn missing_model_fails_before_synthesis() {
        let cfg = SynthesizerConfig {
            backend: Backend::Piper,
            piper: PiperConfig {
                model: "/nonexistent/voice.onnx".into(),
                ..PiperConfig::default()
            },
            ..SynthesizerConfig::default()
        };
        assert!(matches!(build_synthesizer(&cfg), Err(TtsError::ModelNotFound(_))));
    }

    #[test]
    fn gtts_needs_no_model() {
        let cfg = SynthesizerConfig {
            backend: Backend::Gtts,
            ..SynthesizerConfig::default()
        };
        let synth = build_synthesizer(&cfg).unwrap();
        assert_eq!(synth.name(), "gtts");
        assert_eq!(synth.file_extension(), "mp3");
    }
}
