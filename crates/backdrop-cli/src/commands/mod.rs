//! Subcommand implementations

pub mod appearance;
pub mod catalog;
