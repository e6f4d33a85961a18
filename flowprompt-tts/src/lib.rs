// Speech backends and the audio dispatch loop

pub mod dispatch;
pub mod gtts;
pub mod piper;
pub mod synth;

pub use dispatch::{DispatchSummary, Dispatcher};
pub use gtts::{GttsConfig, GttsSynthesizer};
pub use piper::{PiperConfig, PiperMode, PiperSynthesizer};
pub use synth::{build_synthesizer, Backend, Synthesizer, SynthesizerConfig};

use flowprompt_core::FlowPromptError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("Voice model not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] FlowPromptError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type TtsResult<T> = std::result::Result<T, TtsError>;
