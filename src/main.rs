use anyhow::{Context, Result};
use chordpad::midi::MidiOutputHandle;
use chordpad::{repl, CommandContext};
use chordpad_core::{ProgressionDatabase, Session, SessionConfig, VoicingMode};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chordpad", about = "Piano chord voicings and jazz progressions")]
#[command(version)]
struct Cli {
    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON progression file merged over the built-in songs (repeatable)
    #[arg(long = "database")]
    databases: Vec<PathBuf>,

    /// Starting voicing: root, smooth or drop2
    #[arg(long)]
    voicing: Option<VoicingMode>,

    /// Connect to the first MIDI output port whose name contains this
    #[arg(long)]
    midi_port: Option<String>,

    /// Log filter, e.g. "chordpad_core=debug" (overrides RUST_LOG)
    #[arg(long)]
    log_filter: Option<String>,
}

fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<SessionConfig> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(voicing) = cli.voicing {
        config.default_voicing = voicing;
    }
    config.database_paths.extend(cli.databases.iter().cloned());
    config.validate()?;
    Ok(config)
}

fn load_database(config: &SessionConfig) -> ProgressionDatabase {
    let mut database = ProgressionDatabase::builtin();
    for path in &config.database_paths {
        match database.merge_json(path) {
            Ok(replaced) if !replaced.is_empty() => {
                tracing::info!(path = %path.display(), ?replaced, "database file replaced songs")
            }
            Ok(_) => {}
            Err(e) => eprintln!("Skipping database file {}: {}", path.display(), e),
        }
    }
    database
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_filter.as_deref());

    let config = load_config(&cli)?;
    let database = load_database(&config);
    tracing::info!(songs = database.len(), "database ready");

    let midi = match MidiOutputHandle::new(config.midi_channel, config.midi_velocity) {
        Ok(handle) => Some(Arc::new(handle)),
        Err(e) => {
            eprintln!("MIDI output unavailable: {}", e);
            None
        }
    };
    if let (Some(handle), Some(port)) = (&midi, &cli.midi_port) {
        match handle.connect(port) {
            Ok(name) => println!("🎹 Connected to MIDI port: {}", name),
            Err(e) => eprintln!("Could not connect to MIDI port '{}': {}", port, e),
        }
    }

    let session = Session::new(config);
    let ctx = match midi {
        Some(handle) => CommandContext::new_with_midi(session, database, handle),
        None => CommandContext::new(session, database),
    };
    repl::start(ctx)
}
