//! CLI subcommand implementations.

pub mod archive;
pub mod serve;
