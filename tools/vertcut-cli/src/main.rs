//! Vertcut CLI — compile timelines, run local exports, probe media.
//!
//! Usage:
//!   vertcut compile <TIMELINE> --sources <SOURCES>   Print the compiled graph
//!   vertcut export <TIMELINE> --media id=path ...    Render a timeline locally
//!   vertcut probe <FILE>                             Inspect a media file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "vertcut",
    about = "Vertical video export compiler and renderer",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a timeline and print the resulting filter graph
    Compile {
        /// Path to the timeline JSON
        timeline: PathBuf,

        /// Path to a JSON array of media sources (id, path, kind,
        /// duration, audio), as produced by `probe --json`
        #[arg(short, long)]
        sources: PathBuf,

        /// Print the full graph as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Render a timeline to a file on this machine
    Export {
        /// Path to the timeline JSON
        timeline: PathBuf,

        /// Media source mapping, repeatable: id=path
        #[arg(short, long = "media", value_name = "ID=PATH")]
        media: Vec<String>,

        /// Output file path
        #[arg(short, long, default_value = "output.mp4")]
        output: PathBuf,

        /// Produce a lossless intermediate instead of a delivery encode
        #[arg(long)]
        intermediate: bool,
    },

    /// Probe a media file with ffprobe
    Probe {
        /// Path to the media file
        path: PathBuf,

        /// Emit a media-source JSON entry usable with `compile --sources`
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    vertcut_common::logging::init_logging(&vertcut_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Compile {
            timeline,
            sources,
            json,
        } => commands::compile::run(timeline, sources, json).await,
        Commands::Export {
            timeline,
            media,
            output,
            intermediate,
        } => commands::export::run(timeline, media, output, intermediate).await,
        Commands::Probe { path, json } => commands::probe::run(path, json).await,
    }
}
