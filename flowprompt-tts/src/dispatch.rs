//! Sequential audio generation over the audio-request manifest.
//!
//! Requests are processed strictly in manifest order. A target file that
//! already exists is skipped, which makes re-running an interrupted batch
//! resume where it stopped. A failed request is logged and counted; it never
//! stops the batch. A target whose existence cannot be checked counts as
//! failed and is not synthesized.

use crate::synth::Synthesizer;
use crate::TtsResult;
use flowprompt_core::{validate_requests, AudioRequest};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl DispatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}

impl fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Success: {}, Failed: {}, Skipped: {}",
            self.succeeded, self.failed, self.skipped
        )
    }
}

pub struct Dispatcher {
    synth: Box<dyn Synthesizer>,
    audio_dir: PathBuf,
}

impl Dispatcher {
    pub fn new(synth: Box<dyn Synthesizer>, audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            synth,
            audio_dir: audio_dir.into(),
        }
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// Target path of a request, with the manifest's `.wav` swapped for the
    /// extension the engine actually writes.
    pub fn output_path(&self, request: &AudioRequest) -> PathBuf {
        self.audio_dir
            .join(Path::new(&request.filename).with_extension(self.synth.file_extension()))
    }

    pub async fn run(&self, requests: &[AudioRequest]) -> TtsResult<DispatchSummary> {
        validate_requests(requests)?;
        fs::create_dir_all(&self.audio_dir).await?;

        let total = requests.len();
        info!(
            target = "dispatch",
            total,
            backend = self.synth.name(),
            dir = %self.audio_dir.display(),
            "Generating audio files"
        );

        let mut summary = DispatchSummary::default();
        for (i, request) in requests.iter().enumerate() {
            let n = i + 1;
            let path = self.output_path(request);
            let filename = path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default();

            match fs::try_exists(&path).await {
                Ok(true) => {
                    info!(target = "dispatch", "[{n}/{total}] SKIP (exists): {filename}");
                    summary.skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    error!(target = "dispatch", error = %e, "[{n}/{total}] FAILED (cannot check target): {filename}");
                    summary.failed += 1;
                    continue;
                }
            }

            match self.synth.synthesize(&request.text, &path).await {
                Ok(()) => {
                    info!(target = "dispatch", "[{n}/{total}] OK: {filename}");
                    summary.succeeded += 1;
                }
                Err(e) => {
                    error!(target = "dispatch", error = %e, "[{n}/{total}] FAILED: {filename}");
                    summary.failed += 1;
                    // a partial file would be skipped on the next run
                    if fs::remove_file(&path).await.is_ok() {
                        debug!(target = "dispatch", path = %path.display(), "Removed partial output");
                    }
                }
            }
        }

        info!(target = "dispatch", %summary, "Done");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TtsError;
    use async_trait::async_trait;
    use flowprompt_core::AudioKind;

    struct Mp3Stub;

    #[async_trait]
    impl Synthesizer for Mp3Stub {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn file_extension(&self) -> &'static str {
            "mp3"
        }

        async fn synthesize(&self, _text: &str, _output: &Path) -> TtsResult<()> {
            Err(TtsError::Unavailable("stub".into()))
        }
    }

    fn request(filename: &str) -> AudioRequest {
        AudioRequest {
            id: filename.to_string(),
            text: "Taxi Flows".into(),
            filename: filename.to_string(),
            flow: "TAXI FLOWS".into(),
            kind: AudioKind::FlowStart,
        }
    }

    #[test]
    fn output_path_swaps_extension() {
        let d = Dispatcher::new(Box::new(Mp3Stub), "audio");
        assert_eq!(
            d.output_path(&request("taxi_flows_start.wav")),
            Path::new("audio").join("taxi_flows_start.mp3")
        );
    }

    #[test]
    fn summary_line() {
        let s = DispatchSummary {
            succeeded: 3,
            failed: 1,
            skipped: 2,
        };
        assert_eq!(s.to_string(), "Success: 3, Failed: 1, Skipped: 2");
        assert_eq!(s.total(), 6);
    }
}
