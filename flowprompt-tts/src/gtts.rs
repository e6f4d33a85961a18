//! Hosted voice through the Google Translate TTS endpoint.
//!
//! The endpoint only accepts short inputs, so text is cut into chunks of at
//! most [`MAX_CHUNK_CHARS`] characters on whitespace; the MP3 frames of all
//! chunks are concatenated into one file.

use crate::synth::Synthesizer;
use crate::{TtsError, TtsResult};
use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const MAX_CHUNK_CHARS: usize = 100;

#[derive(Clone, Debug)]
pub struct GttsConfig {
    /// Language code, e.g. "en"
    pub lang: String,
    /// Top-level domain of the Google host, e.g. "com" or "co.uk"
    pub tld: String,
    pub slow: bool,
    pub timeout_ms: u64,
}

impl Default for GttsConfig {
    fn default() -> Self {
        Self {
            lang: std::env::var("GTTS_LANG").unwrap_or_else(|_| "en".to_string()),
            tld: std::env::var("GTTS_TLD").unwrap_or_else(|_| "com".to_string()),
            slow: false,
            timeout_ms: std::env::var("TTS_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(30_000),
        }
    }
}

pub struct GttsSynthesizer {
    cfg: GttsConfig,
    client: Client,
}

impl GttsSynthesizer {
    pub fn new(cfg: GttsConfig) -> TtsResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .user_agent("Mozilla/5.0 (flowprompt)")
            .build()?;
        Ok(Self { cfg, client })
    }

    fn endpoint(&self) -> String {
        format!("https://translate.google.{}/translate_tts", self.cfg.tld)
    }

    async fn fetch_chunk(&self, chunk: &str, idx: usize, total: usize) -> TtsResult<Vec<u8>> {
        let speed = if self.cfg.slow { "0.3" } else { "1" };
        let query = [
            ("ie", "UTF-8".to_string()),
            ("q", chunk.to_string()),
            ("tl", self.cfg.lang.clone()),
            ("ttsspeed", speed.to_string()),
            ("total", total.to_string()),
            ("idx", idx.to_string()),
            ("textlen", chunk.chars().count().to_string()),
            ("client", "tw-ob".to_string()),
        ];
        debug!(target = "tts", idx, total, chunk = %chunk, "Requesting Google TTS chunk");
        let resp = self
            .client
            .get(self.endpoint())
            .query(&query)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Split on whitespace into chunks of at most `max` characters. A single
/// word longer than `max` is cut on character boundaries.
pub fn chunk_text(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let cut = word
                .char_indices()
                .nth(max)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            chunks.push(word[..cut].to_string());
            word = &word[cut..];
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait]
impl Synthesizer for GttsSynthesizer {
    fn name(&self) -> &'static str {
        "gtts"
    }

    fn file_extension(&self) -> &'static str {
        "mp3"
    }

    async fn synthesize(&self, text: &str, output: &Path) -> TtsResult<()> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(TtsError::ExecutionFailed("no speakable text".into()));
        }
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, idx, chunks.len()).await?);
        }
        tokio::fs::write(output, audio).await?;
        Ok(())
    }
}
