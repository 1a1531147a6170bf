mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pehdr_core::{DecodeOptions, Header, PeImage};
use serde::Serialize;

/// Windows image header inspection CLI
#[derive(Parser)]
#[command(
    name = "pehdr",
    about = "Decode the DOS, COFF, optional and section headers of a PE image",
    version,
    author
)]
struct Cli {
    /// Path to the image file
    #[arg(required = true)]
    path: PathBuf,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Reject images whose DOS header lacks the "MZ" magic
    #[arg(long, global = true)]
    strict: bool,

    /// Log each decode step (overrides RUST_LOG's default level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Show the legacy DOS header
    Dos,
    /// Show the COFF file header
    Coff,
    /// Show the optional header
    Optional,
    /// List the data directory table
    Directories,
    /// List all section headers
    Sections,
    /// Show every header
    All,
}

#[derive(Serialize)]
struct Report<'a> {
    path: &'a std::path::Path,
    format: &'static str,
    image: &'a PeImage,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let buf = std::fs::read(&cli.path)
        .with_context(|| format!("Failed to read {}", cli.path.display()))?;
    log::info!("Loaded {} bytes from {}", buf.len(), cli.path.display());

    let options = DecodeOptions {
        strict_dos_magic: cli.strict,
    };
    let image = PeImage::decode_with(&buf, options)
        .with_context(|| format!("{} is not a decodable PE image", cli.path.display()))?;

    if cli.json {
        print_json(&cli, &image)?;
    } else {
        print_text(cli.command, &image);
    }

    Ok(())
}

fn print_json(cli: &Cli, image: &PeImage) -> Result<()> {
    let out = match cli.command {
        Command::Dos => serde_json::to_string_pretty(&image.dos_header)?,
        Command::Coff => serde_json::to_string_pretty(&image.coff_header)?,
        Command::Optional => serde_json::to_string_pretty(&image.optional_header)?,
        Command::Directories => serde_json::to_string_pretty(image.data_directories())?,
        Command::Sections => serde_json::to_string_pretty(&image.section_headers)?,
        Command::All => serde_json::to_string_pretty(&Report {
            path: &cli.path,
            format: image.format_name(),
            image,
        })?,
    };
    println!("{out}");
    Ok(())
}

fn print_text(command: Command, image: &PeImage) {
    match command {
        Command::Dos => render::dos_header(&image.dos_header),
        Command::Coff => render::coff_header(&image.coff_header),
        Command::Optional => match &image.optional_header {
            Some(optional) => render::optional_header(optional),
            None => println!("No optional header (object file)."),
        },
        Command::Directories => render::data_directories(image.data_directories()),
        Command::Sections => render::section_headers(&image.section_headers),
        Command::All => {
            render::dos_header(&image.dos_header);
            render::coff_header(&image.coff_header);
            if let Some(optional) = &image.optional_header {
                render::optional_header(optional);
                render::data_directories(&optional.data_directories);
            }
            render::section_headers(&image.section_headers);
        }
    }
}
