//! Piper neural TTS backend
//!
//! Two invocation modes:
//! - `module`: the `piper` Python package (`python3 -m piper`), preferred
//! - `cli`: the standalone `piper` executable
//!
//! Both read the text on stdin and write a WAV file via `--output_file`.
//! When the Python package is missing, module mode degrades to the CLI for
//! the remainder of the run.
//!
//! Env overrides:
//! - PIPER_MODEL (or PIPER_VOICE), PIPER_BIN, PIPER_PYTHON
//! - TTS_TIMEOUT_MS (0 disables the per-call timeout)

use crate::synth::Synthesizer;
use crate::{TtsError, TtsResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PiperMode {
    /// Python `piper` package, falling back to the executable
    #[default]
    Module,
    /// Standalone executable only
    Cli,
}

#[derive(Clone, Debug)]
pub struct PiperConfig {
    /// Voice model (.onnx)
    pub model: PathBuf,
    /// Executable; a bare name is resolved through PATH
    pub piper_bin: PathBuf,
    /// Interpreter used for module mode
    pub python_bin: PathBuf,
    pub mode: PiperMode,
    pub timeout_ms: Option<u64>,
}

impl Default for PiperConfig {
    fn default() -> Self {
        let model = std::env::var("PIPER_MODEL")
            .or_else(|_| std::env::var("PIPER_VOICE"))
            .map(PathBuf::from)
            .unwrap_or_default();
        let piper_bin = std::env::var("PIPER_BIN")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("piper"));
        let python_bin = std::env::var("PIPER_PYTHON")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("python3"));
        let timeout_ms = std::env::var("TTS_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60_000);

        Self {
            model,
            piper_bin,
            python_bin,
            mode: PiperMode::default(),
            timeout_ms: (timeout_ms > 0).then_some(timeout_ms),
        }
    }
}

impl PiperConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Locate a binary the way a shell would: path-like strings are taken as is,
/// bare names are searched on PATH.
pub(crate) fn get_from_path(bin: &Path) -> Option<PathBuf> {
    if bin.components().count() > 1 {
        return if bin.exists() {
            Some(bin.to_path_buf())
        } else {
            None
        };
    }

    if let Some(paths_os) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&paths_os) {
            let candidate = dir.join(bin);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }
    None
}

pub struct PiperSynthesizer {
    cfg: PiperConfig,
    module_unavailable: AtomicBool,
}

impl PiperSynthesizer {
    /// Pre-flight: the voice model must exist before any request runs.
    pub fn new(cfg: PiperConfig) -> TtsResult<Self> {
        if cfg.model.as_os_str().is_empty() || !cfg.model.is_file() {
            return Err(TtsError::ModelNotFound(cfg.model));
        }
        info!(target = "tts", model = ?cfg.model, mode = ?cfg.mode, "Using Piper voice model");
        match get_from_path(&cfg.piper_bin) {
            Some(p) => info!(target = "tts", bin = ?p, "Detected Piper binary"),
            None => debug!(target = "tts", bin = ?cfg.piper_bin, "Piper binary not found on PATH"),
        }
        Ok(Self {
            cfg,
            module_unavailable: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &PiperConfig {
        &self.cfg
    }

    fn model_args<'a>(&'a self, out_wav: &'a Path) -> [&'a std::ffi::OsStr; 4] {
        [
            "--model".as_ref(),
            self.cfg.model.as_os_str(),
            "--output_file".as_ref(),
            out_wav.as_os_str(),
        ]
    }

    async fn synth_with_module(&self, text: &str, out_wav: &Path) -> TtsResult<()> {
        let mut cmd = Command::new(&self.cfg.python_bin);
        cmd.arg("-m").arg("piper").args(self.model_args(out_wav));

        let output = run_with_stdin(cmd, text, self.cfg.timeout()).await?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("No module named") {
            return Err(TtsError::Unavailable(format!(
                "python module 'piper' not installed for {}",
                self.cfg.python_bin.display()
            )));
        }
        Err(TtsError::ExecutionFailed(format!(
            "piper module failed: {}",
            stderr.trim()
        )))
    }

    async fn synth_with_cli(&self, text: &str, out_wav: &Path) -> TtsResult<()> {
        let mut cmd = Command::new(&self.cfg.piper_bin);
        cmd.args(self.model_args(out_wav));

        let output = run_with_stdin(cmd, text, self.cfg.timeout()).await?;
        if !output.status.success() {
            return Err(TtsError::ExecutionFailed(format!(
                "Piper failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

async fn run_with_stdin(mut cmd: Command, text: &str, limit: Option<Duration>) -> TtsResult<Output> {
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    debug!(target = "tts", command = ?cmd, "Running piper");
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(TtsError::Unavailable(format!(
                "{} not found",
                cmd.as_std().get_program().to_string_lossy()
            )))
        }
        Err(e) => return Err(e.into()),
    };
    if let Some(mut stdin) = child.stdin.take() {
        // A child that exits early closes the pipe; its status and stderr say why.
        if let Err(e) = stdin.write_all(format!("{text}\n").as_bytes()).await {
            if e.kind() != ErrorKind::BrokenPipe {
                return Err(e.into());
            }
        }
    }

    let output = match limit {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| TtsError::Timeout(limit))??,
        None => child.wait_with_output().await?,
    };
    Ok(output)
}

#[async_trait]
impl Synthesizer for PiperSynthesizer {
    fn name(&self) -> &'static str {
        "piper"
    }

    async fn synthesize(&self, text: &str, output: &Path) -> TtsResult<()> {
        if self.cfg.mode == PiperMode::Module && !self.module_unavailable.load(Ordering::Relaxed) {
            match self.synth_with_module(text, output).await {
                Err(TtsError::Unavailable(reason)) => {
                    warn!(target = "tts", reason = %reason, "Python piper module not available, falling back to CLI");
                    self.module_unavailable.store(true, Ordering::Relaxed);
                }
                other => return other,
            }
        }
        self.synth_with_cli(text, output).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_like_bins_are_not_searched() {
        assert_eq!(get_from_path(Path::new("/nonexistent/piper")), None);
    }

    #[test]
    fn bare_names_search_path() {
        // `sh` is on PATH on every unix CI host
        #[cfg(unix)]
        assert!(get_from_path(Path::new("sh")).is_some());
        assert_eq!(get_from_path(Path::new("definitely-not-a-piper-binary")), None);
    }

    #[test]
    fn model_must_be_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PiperConfig {
            model: dir.path().to_path_buf(),
            ..PiperConfig::default()
        };
        assert!(matches!(PiperSynthesizer::new(cfg), Err(TtsError::ModelNotFound(_))));

        let model = dir.path().join("en_US-joe-medium.onnx");
        std::fs::write(&model, b"onnx").unwrap();
        let synth = PiperSynthesizer::new(PiperConfig {
            model: model.clone(),
            ..PiperConfig::default()
        })
        .unwrap();
        assert_eq!(synth.config().model, model);
        assert_eq!(synth.file_extension(), "wav");
    }
}
