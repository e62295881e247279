pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod links;
pub mod logging;
pub mod record;
pub mod report;
pub mod session;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{BatchFiles, BrowserConfig, CliOverrides, Config, FilesConfig, SisConfig};
pub use error::{Result, SisBatchError, UserFriendlyError};

// Core functionality re-exports
pub use batch::{AppendProbe, BatchWriter, FileStateManager, LockProbe, ResetOutcome};
pub use links::{BrowserLauncher, CanvasLinks, SystemBrowser};
pub use record::{EnrolmentRow, SandboxRow, UserRecord, UserRow};
pub use report::{CommittedUser, RunReport};
pub use session::{Prompter, Session, SessionState, SessionSummary};
pub use ui::{OutputFormatter, OutputMode};

use std::io::{BufRead, Write};
use std::path::Path;
use tracing::info;
use url::Url;

/// Main library interface for a batch run.
pub struct SisBatch<P: LockProbe = AppendProbe> {
    config: Config,
    output_formatter: OutputFormatter,
    links: CanvasLinks,
    state: FileStateManager<P>,
    writer: BatchWriter,
}

impl SisBatch<AppendProbe> {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        Self::with_probe(config, output_mode, verbose, quiet, AppendProbe)
    }

    /// Create SisBatch instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Self::new(
            config,
            OutputMode::from(&cli_args.output_format),
            cli_args.verbosity_level(),
            cli_args.quiet,
        )
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<Q: AsRef<Path>>(output_path: Q) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(SisBatchError::Io)?;
        Ok(())
    }
}

impl<P: LockProbe> SisBatch<P> {
    pub fn with_probe(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        probe: P,
    ) -> Result<Self> {
        let links = CanvasLinks::from_config(&config.sis)?;
        let files = config.batch_files();

        Ok(Self {
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            links,
            state: FileStateManager::with_probe(files.clone(), probe),
            writer: BatchWriter::new(files, config.sis.clone()),
            config,
        })
    }

    /// Runs one operator session end to end.
    ///
    /// Nothing on disk changes if any target file is locked. Prompts are read
    /// from `input` and written to `output`; status goes through the formatter.
    pub fn run_session<R, W, B>(&self, input: R, output: W, browser: &B) -> Result<RunReport>
    where
        R: BufRead,
        W: Write,
        B: BrowserLauncher + ?Sized,
    {
        self.output_formatter.start_operation("Checking batch files");
        self.state.ensure_available()?;

        for outcome in self.state.reset_batch_files() {
            self.output_formatter.print_reset_outcome(&outcome);
        }

        self.output_formatter.start_operation("Collecting new users");
        let session = Session::new(Prompter::new(input, output), &self.writer, &self.links);
        let summary = session.run()?;

        let mut report = RunReport::from_summary(self.config.files.directory.clone(), &summary);
        for url in self.follow_up_urls(summary.last_user_id.as_deref()) {
            if self.config.browser.enabled {
                match browser.open(&url) {
                    Ok(()) => self.output_formatter.success(&format!("Webpage opened: {}", url)),
                    Err(e) => {
                        self.output_formatter.warning(&e.user_message());
                        report.add_error(e.user_message());
                    }
                }
            } else {
                self.output_formatter.info(&format!("Open: {}", url));
            }
            report.follow_up_urls.push(url.to_string());
        }

        info!(committed = report.committed.len(), "batch run complete");
        Ok(report)
    }

    /// The SIS Import page, then the user search for the last entered ID if any.
    pub fn follow_up_urls(&self, last_user_id: Option<&str>) -> Vec<Url> {
        let mut urls = vec![self.links.sis_import_url()];
        if let Some(user_id) = last_user_id {
            urls.push(self.links.user_search_url(user_id));
        }
        urls
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn links(&self) -> &CanvasLinks {
        &self.links
    }

    pub fn state(&self) -> &FileStateManager<P> {
        &self.state
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &SisBatchError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}
