use anyhow::Result;
use clap::Parser;

use genmod::cli::{self, Args};
use genmod::logging;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level)?;

    cli::run(&args)
}
