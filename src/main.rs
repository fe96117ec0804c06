mod args;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use param_finder::{AutoRuntime, HeaderEmitter, ParamFinder};

fn main() -> Result<()> {
    let args = args::Args::parse();

    // stdout is reserved for the one-line result
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let Some(model_path) = args.model else {
        println!(
            "Error: No model path provided as parameter. Please provide a path \
             as a command-line argument."
        );
        process::exit(1);
    };

    let runtime = match args.format.forced() {
        Some(format) => AutoRuntime::with_format(format),
        None => AutoRuntime::new(),
    };

    let params = ParamFinder::new(runtime)
        .strict_io(args.strict_io)
        .find(&model_path)
        .with_context(|| format!("failed to read parameters from {}", model_path.display()))?;

    let emitter = HeaderEmitter::new(args.output);
    emitter
        .emit(&params)
        .with_context(|| format!("failed to write {}", emitter.output_path().display()))?;

    println!(
        "Model parameters have been saved to {}.",
        emitter.output_path().display()
    );

    Ok(())
}
