use clap::Parser;
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const OUT: &'static str = ".";
}

/// Unpack an image archive through the on-demand page pipeline.
#[derive(Clone, Parser)]
#[command(name = "pagestream")]
#[command(about = "Decode pages of an image archive; use --list to see the page table.")]
pub struct Cli {
    /// Archive to read (zip/cbz of page images).
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory for decoded pages. Default: current directory.
    #[arg(long, short, default_value = DefaultArgs::OUT)]
    pub out: PathBuf,

    /// Print the naturally-ordered page table (index, entry path) and exit.
    #[arg(long, short)]
    pub list: bool,

    /// Unpack only these page indices. Can specify multiple: -p 0 3 7
    #[arg(long, short, num_args = 1..)]
    pub page: Vec<usize>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Byte capacity of the extraction pipe (at least 1).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub pipe_capacity: Option<u64>,
}
