use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use flowprompt_tts::{Backend, GttsConfig, PiperConfig, PiperMode, SynthesizerConfig, TtsError};

/// High-level configuration for the flowprompt CLI
#[derive(Clone, Debug)]
pub struct FlowPromptConfig {
    pub paths: PathsConfig,
    pub tts: SynthesizerConfig,
}

/// Where checklists come from and where manifests and audio go
#[derive(Clone, Debug)]
pub struct PathsConfig {
    /// TOML checklist file; the built-in A320 catalog when unset
    pub checklists: Option<PathBuf>,
    /// TOML expansion rule file; the built-in A320 table when unset
    pub abbreviations: Option<PathBuf>,
    pub manifest_dir: PathBuf,
    pub audio_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            checklists: std::env::var("FLOWPROMPT_CHECKLISTS")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            abbreviations: std::env::var("FLOWPROMPT_ABBREVIATIONS")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            manifest_dir: std::env::var("FLOWPROMPT_MANIFEST_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            audio_dir: std::env::var("FLOWPROMPT_AUDIO_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("audio")),
        }
    }
}

impl Default for FlowPromptConfig {
    fn default() -> Self {
        // Backend modules already read their own env vars
        let backend = match backend_from_env(std::env::var("FLOWPROMPT_BACKEND").ok()) {
            Ok(b) => b.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(target = "flowprompt", error = %e, "Ignoring FLOWPROMPT_BACKEND");
                Backend::default()
            }
        };
        Self {
            paths: PathsConfig::default(),
            tts: SynthesizerConfig {
                backend,
                piper: PiperConfig::default(),
                gtts: GttsConfig::default(),
            },
        }
    }
}

impl FlowPromptConfig {
    /// Load configuration from a TOML file (path via FLOWPROMPT_CONFIG or ./flowprompt.toml),
    /// overlaying values onto env-driven defaults.
    ///
    /// A file named by FLOWPROMPT_CONFIG must exist and parse. The implicit
    /// ./flowprompt.toml is optional, and a broken one only produces a warning.
    ///
    /// An unparseable FLOWPROMPT_BACKEND is an error.
    pub fn load() -> Result<Self, Box<dyn Error>> {
        backend_from_env(std::env::var("FLOWPROMPT_BACKEND").ok())?;

        if let Ok(path) = std::env::var("FLOWPROMPT_CONFIG") {
            return Self::from_file(Path::new(&path), Self::default());
        }

        let default = Self::default();
        let p = Path::new("flowprompt.toml");
        if !p.exists() {
            tracing::debug!(target = "flowprompt", "No TOML config found; using defaults/env");
            return Ok(default);
        }
        match Self::from_file(p, default.clone()) {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                tracing::warn!(target = "flowprompt", error = %e, "Failed to load flowprompt.toml; using defaults");
                Ok(default)
            }
        }
    }

    pub fn from_file(path: &Path, base: Self) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
        let cfg = Self::overlay_str(&s, base)?;
        tracing::info!(target = "flowprompt", path = %path.display(), "Loaded TOML config");
        Ok(cfg)
    }

    pub fn overlay_str(s: &str, base: Self) -> Result<Self, toml::de::Error> {
        Ok(toml::from_str::<FlowPromptToml>(s)?.overlay(base))
    }
}

fn backend_from_env(value: Option<String>) -> Result<Option<Backend>, TtsError> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<Backend>())
        .transpose()
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct FlowPromptToml {
    pub backend: Option<Backend>,
    pub paths: Option<PathsToml>,
    pub piper: Option<PiperToml>,
    pub gtts: Option<GttsToml>,
}

impl FlowPromptToml {
    fn overlay(self, mut base: FlowPromptConfig) -> FlowPromptConfig {
        if let Some(b) = self.backend {
            base.tts.backend = b;
        }
        if let Some(p) = self.paths {
            p.apply(&mut base.paths);
        }
        if let Some(p) = self.piper {
            p.apply(&mut base.tts.piper);
        }
        if let Some(g) = self.gtts {
            g.apply(&mut base.tts.gtts);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct PathsToml {
    pub checklists: Option<PathBuf>,
    pub abbreviations: Option<PathBuf>,
    pub manifest_dir: Option<PathBuf>,
    pub audio_dir: Option<PathBuf>,
}
impl PathsToml {
    fn apply(self, p: &mut PathsConfig) {
        if let Some(x) = self.checklists {
            p.checklists = Some(x);
        }
        if let Some(x) = self.abbreviations {
            p.abbreviations = Some(x);
        }
        if let Some(x) = self.manifest_dir {
            p.manifest_dir = x;
        }
        if let Some(x) = self.audio_dir {
            p.audio_dir = x;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct PiperToml {
    pub model: Option<PathBuf>,
    pub bin: Option<PathBuf>,
    pub python: Option<PathBuf>,
    pub mode: Option<PiperMode>,
    pub timeout_ms: Option<u64>, // 0 = no timeout
}
impl PiperToml {
    fn apply(self, p: &mut PiperConfig) {
        if let Some(x) = self.model {
            p.model = x;
        }
        if let Some(x) = self.bin {
            p.piper_bin = x;
        }
        if let Some(x) = self.python {
            p.python_bin = x;
        }
        if let Some(x) = self.mode {
            p.mode = x;
        }
        if let Some(x) = self.timeout_ms {
            p.timeout_ms = (x > 0).then_some(x);
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct GttsToml {
    pub lang: Option<String>,
    pub tld: Option<String>,
    pub slow: Option<bool>,
    pub timeout_ms: Option<u64>,
}
impl GttsToml {
    fn apply(self, g: &mut GttsConfig) {
        if let Some(x) = self.lang {
            g.lang = x;
        }
        if let Some(x) = self.tld {
            g.tld = x;
        }
        if let Some(x) = self.slow {
            g.slow = x;
        }
        if let Some(x) = self.timeout_ms.filter(|ms| *ms > 0) {
            g.timeout_ms = x;
        }
    }
}
