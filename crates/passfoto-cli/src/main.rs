// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// passfoto — Passport-photo sheet generator.
//
// The calling boundary: reads a source photo from disk, runs the sheet
// pipeline, and writes the encoded result. Layout settings come from an
// optional JSON config file with per-flag overrides on top.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use passfoto_core::config::SheetConfig;
use passfoto_core::error::PassfotoError;
use passfoto_core::human_errors::humanize_error;
use passfoto_core::types::{OutputFormat, PhysicalSize};
use passfoto_sheet::{CommandSegmenter, NoSegmenter, Segmenter, generate_sheet};

/// Pack one photograph into a printable passport-photo sheet.
#[derive(Parser, Debug)]
#[command(name = "passfoto", version, about)]
struct Cli {
    /// Source photo (JPEG, PNG, ...)
    input: PathBuf,

    /// Output file; extension picks the format unless --png/--jpeg is given
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// JSON sheet configuration file (flags below override its values)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print resolution in pixels per inch
    #[arg(long)]
    dpi: Option<u32>,

    /// Paper width in millimetres
    #[arg(long)]
    paper_width_mm: Option<f64>,

    /// Paper height in millimetres
    #[arg(long)]
    paper_height_mm: Option<f64>,

    /// Photo columns on the sheet
    #[arg(long)]
    cols: Option<u32>,

    /// Photo rows on the sheet
    #[arg(long)]
    rows: Option<u32>,

    /// Desired slot width in millimetres
    #[arg(long)]
    slot_width_mm: Option<f64>,

    /// Desired slot height in millimetres
    #[arg(long)]
    slot_height_mm: Option<f64>,

    /// Minimum separator between photos and at the edges, in pixels
    #[arg(long)]
    min_sep: Option<u32>,

    /// Border thickness around each photo, in pixels
    #[arg(long)]
    border: Option<u32>,

    /// JPEG quality (1-100)
    #[arg(long)]
    quality: Option<u8>,

    /// Write PNG output
    #[arg(long, conflicts_with = "jpeg")]
    png: bool,

    /// Write JPEG output
    #[arg(long)]
    jpeg: bool,

    /// External background-removal command speaking PNG on stdin/stdout
    /// (e.g. "rembg i - -"); omit to skip subject isolation
    #[arg(long)]
    segment_cmd: Option<String>,

    /// Deadline in seconds for the background-removal command
    #[arg(long, default_value_t = 30)]
    segment_timeout: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(path) => {
            info!(path = %path.display(), "sheet written");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let human = humanize_error(&err);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf, PassfotoError> {
    let config = build_config(cli)?;
    let segmenter = build_segmenter(cli);

    let source = std::fs::read(&cli.input)?;
    let sheet = generate_sheet(&source, &config, segmenter.as_ref())?;

    if sheet.isolation == passfoto_core::types::StageOutcome::Fallback {
        warn!("sheet was produced without subject isolation");
    }

    let output = cli.output.clone().unwrap_or_else(|| {
        cli.input
            .with_file_name(format!("passfoto_sheet.{}", sheet.format.extension()))
    });
    std::fs::write(&output, &sheet.bytes)?;
    Ok(output)
}

fn build_config(cli: &Cli) -> Result<SheetConfig, PassfotoError> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str(&text)?
        }
        None => SheetConfig::default(),
    };

    if let Some(dpi) = cli.dpi {
        config.dpi = dpi;
    }
    if cli.paper_width_mm.is_some() || cli.paper_height_mm.is_some() {
        config.paper = PhysicalSize::from_mm(
            cli.paper_width_mm.unwrap_or(config.paper.width_mm),
            cli.paper_height_mm.unwrap_or(config.paper.height_mm),
        );
    }
    if let Some(cols) = cli.cols {
        config.cols = cols;
    }
    if let Some(rows) = cli.rows {
        config.rows = rows;
    }
    if cli.slot_width_mm.is_some() || cli.slot_height_mm.is_some() {
        config.slot = PhysicalSize::from_mm(
            cli.slot_width_mm.unwrap_or(config.slot.width_mm),
            cli.slot_height_mm.unwrap_or(config.slot.height_mm),
        );
    }
    if let Some(min_sep) = cli.min_sep {
        config.min_sep_px = min_sep;
    }
    if let Some(border) = cli.border {
        config.border_px = border;
    }
    if let Some(quality) = cli.quality {
        config.jpeg_quality = quality;
    }

    if cli.png {
        config.format = OutputFormat::Png;
    } else if cli.jpeg {
        config.format = OutputFormat::Jpeg;
    } else if let Some(ext) = cli
        .output
        .as_ref()
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .and_then(OutputFormat::from_extension)
    {
        config.format = ext;
    }

    Ok(config)
}

/// Select the segmentation capability once, at startup.
fn build_segmenter(cli: &Cli) -> Box<dyn Segmenter> {
    match &cli.segment_cmd {
        Some(cmd) => {
            let mut parts = cmd.split_whitespace().map(str::to_owned);
            match parts.next() {
                Some(program) => Box::new(
                    CommandSegmenter::new(program, parts.collect())
                        .with_timeout(Duration::from_secs(cli.segment_timeout)),
                ),
                None => {
                    warn!("--segment-cmd was empty; subject isolation disabled");
                    Box::new(NoSegmenter)
                }
            }
        }
        None => Box::new(NoSegmenter),
    }
}
