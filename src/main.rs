// SPDX-FileCopyrightText: Copyright 2025 Au-Zone Technologies
// SPDX-License-Identifier: Apache-2.0

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use log::error;
use motrack::{tracker::DuplicatePolicy, Pipeline, PipelineConfig, Result};

/// Assign persistent identities to per-frame detections.
///
/// Reads one JSON array of boxes per line and writes one JSON object per
/// processed frame with the identity of every box.
#[derive(Parser, Debug)]
#[command(name = "motrack", version)]
struct Args {
    /// Input file in JSON Lines format (stdin if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Matching distance between centroids, in pixels
    #[arg(short, long, default_value_t = motrack::tracker::DEFAULT_DISTANCE_THRESHOLD)]
    threshold: f64,

    /// Emit each identity at most once per frame instead of merging nearby
    /// detections into one identity
    #[arg(long)]
    exclusive: bool,

    /// Process every Nth frame
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    frame_skip: u64,

    /// Drop boxes whose area is not greater than this
    #[arg(long, default_value_t = 0)]
    min_area: i64,

    /// Print a JSON summary to stderr when done
    #[arg(long)]
    summary: bool,
}

fn run(args: Args) -> Result<()> {
    let config = PipelineConfig {
        distance_threshold: args.threshold,
        policy: if args.exclusive {
            DuplicatePolicy::Exclusive
        } else {
            DuplicatePolicy::Merge
        },
        frame_skip: args.frame_skip,
        min_area: args.min_area,
    };
    let mut pipeline = Pipeline::new(config)?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let summary = pipeline.run(reader, writer)?;
    if args.summary {
        eprintln!("{}", serde_json::to_string(&summary)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
