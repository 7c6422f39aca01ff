//! CLI subcommand implementations for the auction-harvest binary.

pub mod harvest_cmd;
pub mod output;
