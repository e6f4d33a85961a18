mod config;
use clap::{Args, Parser, Subcommand};
use config::FlowPromptConfig;
use flowprompt_core::catalog::a320_checklists;
use flowprompt_core::{
    compile, load_audio_requests, load_checklists, validate_requests, AbbreviationTable, Manifest,
    AUDIO_MANIFEST_FILE,
};
use flowprompt_tts::{build_synthesizer, Backend, Dispatcher, PiperMode};
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

const SAMPLE_TEXTS: usize = 15;

#[derive(Parser)]
#[command(version, about = "A320 cockpit flow prompts: compile manifests and synthesize audio")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile checklists into flows.json and audio_files.json
    Compile {
        #[command(flatten)]
        source: SourceArgs,
        /// Directory the manifests are written to
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Synthesize every audio request that has no file yet
    Generate(GenerateArgs),
    /// Print the compile report without writing anything
    Show {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// TOML checklist file instead of the built-in A320 flows
    #[arg(short, long)]
    checklists: Option<PathBuf>,
    /// TOML expansion rules instead of the built-in A320 table
    #[arg(long)]
    abbreviations: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    /// piper (local voice) or gtts (Google Translate)
    #[arg(short, long)]
    backend: Option<Backend>,
    /// audio_files.json to read
    #[arg(long)]
    manifest: Option<PathBuf>,
    #[arg(long)]
    audio_dir: Option<PathBuf>,
    /// Piper voice model (.onnx)
    #[arg(short, long)]
    model: Option<PathBuf>,
    /// Piper executable
    #[arg(short, long)]
    piper: Option<PathBuf>,
    /// Use the piper executable instead of the Python module
    #[arg(long)]
    use_cli: bool,
    /// gTTS language
    #[arg(long)]
    lang: Option<String>,
    /// gTTS slow speech
    #[arg(long)]
    slow: bool,
}

impl SourceArgs {
    fn apply(self, cfg: &mut FlowPromptConfig) {
        if let Some(p) = self.checklists {
            cfg.paths.checklists = Some(p);
        }
        if let Some(p) = self.abbreviations {
            cfg.paths.abbreviations = Some(p);
        }
    }
}

impl GenerateArgs {
    fn apply(self, cfg: &mut FlowPromptConfig) -> Option<PathBuf> {
        if let Some(b) = self.backend {
            cfg.tts.backend = b;
        }
        if let Some(d) = self.audio_dir {
            cfg.paths.audio_dir = d;
        }
        if let Some(m) = self.model {
            cfg.tts.piper.model = m;
        }
        if let Some(p) = self.piper {
            cfg.tts.piper.piper_bin = p;
        }
        if self.use_cli {
            cfg.tts.piper.mode = PiperMode::Cli;
        }
        if let Some(l) = self.lang {
            cfg.tts.gtts.lang = l;
        }
        if self.slow {
            cfg.tts.gtts.slow = true;
        }
        self.manifest
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Logging / tracing
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,flowprompt_core=info,flowprompt_tts=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    // Load configuration (defaults + env + optional TOML overlay); flags win
    let mut cfg = FlowPromptConfig::load()?;

    match cli.command {
        Commands::Compile { source, out } => {
            source.apply(&mut cfg);
            let manifest = build_manifest(&cfg)?;
            report(&manifest);
            let dir = out.unwrap_or_else(|| cfg.paths.manifest_dir.clone());
            let (flows, audio) = manifest.write(&dir)?;
            println!("Saved: {}, {}", flows.display(), audio.display());
        }
        Commands::Show { source } => {
            source.apply(&mut cfg);
            report(&build_manifest(&cfg)?);
        }
        Commands::Generate(args) => {
            let manifest_path = args
                .apply(&mut cfg)
                .unwrap_or_else(|| cfg.paths.manifest_dir.join(AUDIO_MANIFEST_FILE));
            generate(&cfg, manifest_path).await?;
        }
    }

    Ok(())
}

fn build_manifest(cfg: &FlowPromptConfig) -> Result<Manifest, Box<dyn Error>> {
    let defs = match &cfg.paths.checklists {
        Some(path) => load_checklists(path)?,
        None => a320_checklists(),
    };
    let table = match &cfg.paths.abbreviations {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read abbreviations {}: {e}", path.display()))?;
            AbbreviationTable::from_toml_str(&s)?
        }
        None => AbbreviationTable::a320()?,
    };
    info!(
        target = "flowprompt",
        flows = defs.len(),
        rules = table.len(),
        "Compiling checklists"
    );

    let manifest = compile(&defs, &table);
    manifest.validate()?;
    Ok(manifest)
}

fn report(manifest: &Manifest) {
    let rule = "-".repeat(60);
    print!("{}", manifest.summary());
    println!("{rule}");
    println!("SAMPLE AUDIO TEXTS:");
    for r in manifest.audio.iter().take(SAMPLE_TEXTS) {
        println!("  {}", r.text);
    }
    println!("{rule}");
}

async fn generate(cfg: &FlowPromptConfig, manifest_path: PathBuf) -> Result<(), Box<dyn Error>> {
    // Pre-flight: engine and manifest must both be usable before any request runs
    let synth = build_synthesizer(&cfg.tts)?;
    let requests = load_audio_requests(&manifest_path)?;
    validate_requests(&requests)?;

    println!(
        "Generating {} audio files with {}...",
        requests.len(),
        cfg.tts.backend
    );
    let dispatcher = Dispatcher::new(synth, &cfg.paths.audio_dir);
    let summary = dispatcher.run(&requests).await?;

    println!("Done! {summary}");
    println!("Audio files saved in '{}/'", dispatcher.audio_dir().display());
    Ok(())
}
