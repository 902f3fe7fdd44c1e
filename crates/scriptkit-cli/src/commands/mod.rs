//! Subcommand handlers. Each takes its parsed arguments and an
//! [`OutputManager`](crate::output::OutputManager) and returns a
//! [`CliResult`](crate::error::CliResult).

pub mod completions;
pub mod help;
pub mod inspect;
pub mod parse;
