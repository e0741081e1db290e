pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, ConfigArgs, ValidateArgs};
pub use output::{OutputFormat, OutputFormatter};
