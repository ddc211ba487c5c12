// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagestack — merge an ordered set of images into a single PDF.
//
// Entry point. Initialises logging, ingests the files named on the command
// line in order, runs one conversion, and writes the result.

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use pagestack_compose::{AssetStore, Converter};
use pagestack_core::IncomingImage;
use pagestack_core::error::Result;
use pagestack_core::human_errors::humanize_error;

use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "conversion failed");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<PathBuf> {
    let config = args.composer_config()?;
    let converter = Converter::new(config)?;

    let mut files = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let bytes = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        files.push(IncomingImage::new(display_name, cli::mime_for(path), bytes));
    }

    let store = AssetStore::new();
    let report = store.append_many(files);
    for name in &report.rejected {
        eprintln!("Skipping {name}: only PNG and JPEG images can be added.");
    }
    tracing::info!(
        added = report.added.len(),
        rejected = report.rejected.len(),
        "images ingested"
    );

    let document = converter.convert(&store).await?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&document.file_name));
    document.write_to(&output).await?;
    Ok(output)
}
