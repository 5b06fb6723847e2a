/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! tabattr - Pandoc JSON filter moving caption attributes onto tables

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tabattr::options::{DuplicateIdPolicy, OptionOverrides};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tabattr")]
#[command(version)]
#[command(about = "Move {#id .class key=val} literals from table captions onto the tables")]
struct Args {
    /// Target format, as passed by `pandoc --filter` (ignored)
    target_format: Option<String>,

    /// Read Pandoc JSON from FILE instead of stdin
    #[arg(short = 'i', long)]
    input: Option<String>,

    /// Write Pandoc JSON to FILE instead of stdout
    #[arg(short = 'o', long)]
    output: Option<String>,

    /// How to treat a literal naming more than one identifier
    #[arg(long, value_enum)]
    duplicate_ids: Option<DuplicateIdPolicy>,

    /// Leave every table untouched
    #[arg(long)]
    disable: bool,

    /// Log each extracted table to stderr
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            enabled: self.disable.then_some(false),
            duplicate_ids: self.duplicate_ids,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the document, so logs go to stderr
    let default_filter = if args.verbose {
        "tabattr=debug"
    } else {
        "tabattr=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Some(format) = &args.target_format {
        tracing::debug!(format = %format, "Filtering for target format");
    }

    let mut input: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open input file '{}'", path))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let mut output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file '{}'", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let ctx = tabattr::run_filter(&mut input, &mut output, args.overrides())
        .context("Failed to filter Pandoc document")?;
    ctx.emit();

    Ok(())
}
