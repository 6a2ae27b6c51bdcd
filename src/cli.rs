use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "classpath-dupes")]
#[command(about = "Find classes and resources provided by more than one classpath element")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Disable the built-in resource ignore list.
    #[arg(long, global = true)]
    pub no_default_ignores: bool,

    /// Extra resource ignore pattern (regex, whole path, case-insensitive).
    #[arg(long = "ignore", value_name = "PATTERN", global = true)]
    pub ignore: Vec<String>,

    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Report duplicate classes and resources across the given elements.
    Duplicates {
        #[arg(value_name = "ELEMENT", required = true)]
        elements: Vec<PathBuf>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Log unreadable elements and continue instead of failing.
        #[arg(long)]
        keep_going: bool,
    },
    /// List the elements that provide a class or resource.
    Owners {
        name: String,

        #[arg(value_name = "ELEMENT", required = true)]
        elements: Vec<PathBuf>,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
