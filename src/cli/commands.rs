use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::output::OutputFormat;

/// Layer-by-layer package inventory reconciliation for container images
#[derive(Parser, Debug)]
#[command(
    name = "strata",
    about = "Layer-by-layer package inventory reconciliation for container images",
    version,
    author,
    long_about = "strata reads per-layer scan results (the namespaces and packages each detector \
                  found in each layer) and reconciles them, base layer first, into the image's \
                  ancestry: the ordered layers and the packages each one introduced."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Build an image ancestry from layer scan results",
        long_about = "Reads a JSON or YAML document listing layer scan results, base layer first, \
                      and prints the reconciled ancestry.\n\n\
                      Examples:\n  \
                      strata build layers.json\n  \
                      strata build layers.yaml --format json --name my-image\n  \
                      strata build - --strict < layers.json"
    )]
    Build(BuildArgs),

    #[command(
        about = "Check layer scan results for malformed detectors and namespaces",
        long_about = "Validates every layer in the input without building an ancestry.\n\n\
                      Examples:\n  \
                      strata validate layers.json"
    )]
    Validate(ValidateArgs),

    #[command(about = "Show the effective configuration")]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(value_name = "FILE", help = "Layer scan results (JSON or YAML), or '-' for stdin")]
    pub input: PathBuf,

    #[arg(
        short = 'n',
        long,
        value_name = "NAME",
        help = "Ancestry name (defaults to a digest of the layer hashes)"
    )]
    pub name: Option<String>,

    #[arg(short = 'f', long, value_enum, help = "Output format")]
    pub format: Option<OutputFormatArg>,

    #[arg(
        long,
        help = "Reject layers whose detector set differs from the base layer"
    )]
    pub strict: bool,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(value_name = "FILE", help = "Layer scan results (JSON or YAML), or '-' for stdin")]
    pub input: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(short = 'f', long, value_enum, help = "Output format")]
    pub format: Option<OutputFormatArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Human => OutputFormat::Human,
        }
    }
}
