use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sisbatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate SIS Import batch files for new staff accounts")]
#[command(
    long_about = "SisBatch asks for each new staff member's details and writes the \
                  001_CreateUser, 002_CreateSandbox and 003_CreateEnrolment CSV files \
                  used by SIS Import, plus a cumulative Enrolment_Log."
)]
#[command(after_help = "EXAMPLES:\n  \
    sisbatch\n  \
    sisbatch --dir ~/sis-batches --no-browser\n  \
    sisbatch --config sisbatch.toml --output-format plain\n  \
    sisbatch --generate-config")]
pub struct Cli {
    /// Directory holding the batch and log files (defaults to the current directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Do not open the follow-up pages in a browser
    #[arg(long)]
    pub no_browser: bool,

    /// Output format for status messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only prompts and errors)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show the files and links that would be used without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_directory(self.dir.clone())
            .with_no_browser(self.no_browser)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
