use anyhow::Result;
use clap::{Parser, Subcommand};
use ir_cli::commands::{self, RenderRequest};
use ir_cli::Settings;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vdpir", about = "Decode video memory snapshots into frames")]
struct Args {
    /// Settings file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Decoder log level: off, error, warn, info, debug, trace
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Composite a snapshot into a PNG
    Render {
        #[arg(long)]
        system: String,
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Comma-separated layer indices
        #[arg(long, value_delimiter = ',')]
        layers: Option<Vec<usize>>,
        /// Write frame metadata JSON here
        #[arg(long)]
        metadata: Option<PathBuf>,
        /// Diff against the captured framebuffer and write the diff PNG here
        #[arg(long)]
        diff: Option<PathBuf>,
    },
    /// Export decoded sprites as a spritesheet
    Sprites {
        #[arg(long)]
        system: String,
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        json: PathBuf,
    },
    /// Print frame metadata and diagnostics as JSON
    Inspect {
        #[arg(long)]
        system: String,
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Compare two PNG files
    Diff {
        a: PathBuf,
        b: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }
    settings.apply_logging();

    match args.command {
        Command::Render {
            system,
            snapshot,
            out,
            layers,
            metadata,
            diff,
        } => {
            let request = RenderRequest {
                system,
                snapshot,
                out,
                layers,
                metadata,
                diff,
            };
            if let Some(score) = commands::render_snapshot(&request, &settings)? {
                println!("{}", serde_json::to_string_pretty(&score)?);
            }
        }
        Command::Sprites {
            system,
            snapshot,
            out,
            json,
        } => {
            let count = commands::export_sprites(&system, &snapshot, &out, &json, &settings)?;
            println!("Exported {} sprites", count);
        }
        Command::Inspect { system, snapshot } => {
            let report = commands::inspect(&system, &snapshot)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Diff { a, b, out } => {
            let score = commands::diff_files(&a, &b, out.as_deref(), &settings)?;
            println!("{}", serde_json::to_string_pretty(&score)?);
        }
    }

    Ok(())
}
