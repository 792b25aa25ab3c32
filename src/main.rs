//! Pagestream CLI: list or unpack the pages of an image archive.

use anyhow::Result;
use clap::Parser;
use pagestream::cli::Cli;
use pagestream::cli::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
