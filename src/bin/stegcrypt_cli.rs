//! stegcrypt CLI: hide an encrypted message or file in an image, or recover it.

use anyhow::{Context, Result};
use base64::Engine;
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::{info, LevelFilter};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use stegcrypt::{carrier, stego, stego_crypto, Config, Revealed};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to <config dir>/stegcrypt/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt a message or file and hide it in a cover image (output is always PNG)
    Embed(EmbedArgs),
    /// Recover and decrypt the payload hidden in a stego image
    Extract(ExtractArgs),
    /// Show how much data an image can hold
    Capacity(CapacityArgs),
}

#[derive(Args, Debug)]
struct EmbedArgs {
    /// Cover image (PNG, JPEG, BMP, GIF or WebP)
    cover: PathBuf,

    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,

    /// Text message to hide
    #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
    message: Option<String>,

    /// File to hide
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Encryption password
    #[arg(short, long, env = "STEGCRYPT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Stego image produced by `embed`
    image: PathBuf,

    /// Write the recovered bytes to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Password used at embed time
    #[arg(short, long, env = "STEGCRYPT_PASSWORD", hide_env_values = true)]
    password: String,

    /// Print a JSON report instead of the raw payload
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CapacityArgs {
    image: PathBuf,

    /// Print a JSON report
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ExtractReport {
    ok: bool,
    kind: Option<&'static str>,
    payload: Option<String>,
    path: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct CapacityReport {
    width: u32,
    height: u32,
    channels: usize,
    max_payload_bytes: usize,
    max_plaintext_bytes: usize,
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    Builder::new()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("reading config {}", path.display())),
        None => Config::load_default().context("reading default config"),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Command::Embed(args) => run_embed(args, &config),
        Command::Extract(args) => run_extract(args),
        Command::Capacity(args) => run_capacity(args),
    });
    if let Err(e) = result {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run_embed(args: &EmbedArgs, config: &Config) -> Result<()> {
    let plaintext = match (&args.message, &args.file) {
        (Some(message), _) => message.clone().into_bytes(),
        (None, Some(path)) => {
            fs::read(path).with_context(|| format!("reading {}", path.display()))?
        }
        (None, None) => anyhow::bail!("embed requires --message or --file"),
    };
    if plaintext.is_empty() {
        anyhow::bail!("nothing to hide: message or file is empty");
    }

    let grid = carrier::load_grid(&args.cover)
        .with_context(|| format!("loading cover {}", args.cover.display()))?;
    info!(
        "cover {}x{}, room for {} plaintext bytes, hiding {}",
        grid.width(),
        grid.height(),
        stego::max_plaintext_len(&grid),
        plaintext.len()
    );

    let stego = stegcrypt::conceal(&grid, &plaintext, &args.password, config)?;
    carrier::save_png(&stego, &args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    eprintln!("Wrote {}", args.output.display());
    Ok(())
}

fn run_extract(args: &ExtractArgs) -> Result<()> {
    let outcome = carrier::load_grid(&args.image)
        .with_context(|| format!("loading {}", args.image.display()))
        .and_then(|grid| Ok(stegcrypt::reveal(&grid, &args.password)?));

    if args.json {
        let report = match outcome {
            Ok(bytes) => extract_report(bytes, args.output.as_deref())?,
            Err(e) => ExtractReport {
                ok: false,
                kind: None,
                payload: None,
                path: None,
                error: Some(format!("{:#}", e)),
            },
        };
        let json = serde_json::to_string_pretty(&report)?;
        println!("{}", json);
        return Ok(());
    }

    let bytes = outcome?;
    info!("recovered {} bytes", bytes.len());
    if let Some(path) = &args.output {
        fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Wrote {}", path.display());
        return Ok(());
    }
    let rendered = match Revealed::classify(bytes) {
        Revealed::Text(text) => text,
        Revealed::Binary(bytes) => format!(
            "base64:{}",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        ),
    };
    io::stdout().write_all(rendered.as_bytes())?;
    Ok(())
}

fn extract_report(bytes: Vec<u8>, output: Option<&Path>) -> Result<ExtractReport> {
    if let Some(path) = output {
        fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    }
    let (kind, payload) = match Revealed::classify(bytes) {
        Revealed::Text(text) => ("text", text),
        Revealed::Binary(bytes) => (
            "binary",
            base64::engine::general_purpose::STANDARD.encode(bytes),
        ),
    };
    Ok(ExtractReport {
        ok: true,
        kind: Some(kind),
        payload: Some(payload),
        path: output.map(|p| p.display().to_string()),
        error: None,
    })
}

fn run_capacity(args: &CapacityArgs) -> Result<()> {
    let grid = carrier::load_grid(&args.image)
        .with_context(|| format!("loading {}", args.image.display()))?;
    let report = CapacityReport {
        width: grid.width(),
        height: grid.height(),
        channels: grid.channel_count(),
        max_payload_bytes: stego::capacity_bytes(&grid),
        max_plaintext_bytes: stego::max_plaintext_len(&grid),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{}x{} image, {} channel values: up to {} plaintext bytes ({} byte envelope overhead)",
            report.width,
            report.height,
            report.channels,
            report.max_plaintext_bytes,
            stego_crypto::ENVELOPE_OVERHEAD
        );
    }
    Ok(())
}
