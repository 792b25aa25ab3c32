//! CLI driver: the stand-in for the interactive collaborator that would
//! otherwise own the pipeline.

pub mod args;
pub mod run;

pub use args::Cli;
pub use run::handle_run;
