use log::{info, warn};

use clap::Parser;
use snafu::ErrorCompat;
use std::error::Error;

mod args;
mod maps;

use crate::maps::{run_pipeline, RunOptions};

fn main() {
    let args = args::Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let options = RunOptions {
        output_directory: args.out.clone(),
        summary: args.summary.clone(),
        reference: args.reference.clone(),
        basic: args.basic,
        parties: args.party.clone(),
    };

    match run_pipeline(&args.config, &options) {
        Ok(report) => {
            info!(
                "Done: {} states, {} maps written, {} boundaries without data",
                report.states.len(),
                report.written.len(),
                report.join_errors.len()
            );
        }
        Err(e) => {
            warn!("Error occured {:?}", e);
            eprintln!("An error occured ({:?}): {}", e.kind(), e);
            let mut cause = e.source();
            while let Some(c) = cause {
                eprintln!("  caused by: {}", c);
                cause = c.source();
            }
            if let Some(bt) = ErrorCompat::backtrace(&e) {
                eprintln!("trace: {}", bt);
            }
            std::process::exit(1);
        }
    }
}
