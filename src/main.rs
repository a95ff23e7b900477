//! castplayer binary entry point.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use castplayer::asciicast::AsciicastFile;
use castplayer::cli::{Cli, Commands, ConfigCommands, PlayArgs};
use castplayer::player::render::format_duration;
use castplayer::player::{play_session, PlaybackState, Recording};
use castplayer::{logging, Config};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: {:#}", e);
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Play(args) => handle_play(&args),
        Commands::Info { file } => {
            handle_info(&file)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config(ConfigCommands::Show) => {
            let config = Config::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config(ConfigCommands::Path) => {
            println!("{}", Config::config_path()?.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(not(tarpaulin_include))]
fn handle_play(args: &PlayArgs) -> Result<ExitCode> {
    if !args.file.exists() {
        anyhow::bail!("File not found: {}", args.file.display());
    }
    let config = Config::load()?;
    let outcome = play_session(&args.file, args.player_options(&config))?;

    if outcome.state == PlaybackState::Failed {
        let reason = outcome.load_error.as_deref().unwrap_or("unknown error");
        eprintln!("Error: {}", reason);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_info(path: &std::path::Path) -> Result<()> {
    let cast = AsciicastFile::parse(path)
        .with_context(|| format!("Failed to read recording {}", path.display()))?;
    let recording = Recording::from_cast(&cast)?;

    println!("File:     {}", path.display());
    println!("Version:  {}", cast.version());
    println!("Size:     {}x{}", recording.cols, recording.rows);
    println!(
        "Duration: {} ({:.3}s)",
        format_duration(recording.duration),
        recording.duration
    );
    println!("Events:   {}", cast.events.len());
    println!("Markers:  {}", recording.markers.len());
    if let Some(title) = &cast.header.title {
        println!("Title:    {}", title);
    }
    for marker in &recording.markers {
        println!("  {}  {}", format_duration(marker.time), marker.label);
    }
    Ok(())
}
