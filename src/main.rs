use clap::Parser;
use sisbatch::{
    logging, Cli, OutputFormatter, OutputMode, SisBatch, SisBatchError, SystemBrowser,
    UserFriendlyError,
};
use std::io;
use std::process;

fn main() {
    logging::init();
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let sisbatch = match SisBatch::from_cli(&cli) {
        Ok(sisbatch) => sisbatch,
        Err(e) => {
            print_startup_error(&cli, &e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&sisbatch);
    }

    let stdin = io::stdin();
    match sisbatch.run_session(stdin.lock(), io::stdout(), &SystemBrowser) {
        Ok(report) => {
            sisbatch.output_formatter().print_run_report(&report);
            0
        }
        Err(e) => {
            sisbatch.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &SisBatchError) -> i32 {
    match error {
        SisBatchError::Config { .. } | SisBatchError::InvalidUrl { .. } => 2,
        SisBatchError::FilesLocked { .. } => 3,
        SisBatchError::BatchWrite { .. } | SisBatchError::Csv(_) | SisBatchError::Io(_) => 4,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "sisbatch.toml".to_string());

    match SisBatch::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  sisbatch --config {}", config_path);
            println!("\nEdit the file to change the output directory, file names or Canvas address.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(sisbatch: &SisBatch) -> i32 {
    let formatter = sisbatch.output_formatter();
    let config = sisbatch.config();
    let files = sisbatch.state().files();

    formatter.info("DRY RUN MODE - No files will be changed");
    formatter.print_separator();

    formatter.info(&format!("Directory: {}", config.files.directory.display()));
    for path in files.all() {
        let state = if sisbatch.state().is_file_locked(path) {
            "locked"
        } else if path.exists() {
            "present"
        } else {
            "absent"
        };
        formatter.info(&format!("{} ({})", path.display(), state));
    }

    formatter.print_separator();
    for path in files.batch() {
        formatter.info(&format!("Cleared at start: {}", path.display()));
    }
    formatter.info(&format!("Kept across runs: {}", files.log.display()));

    formatter.print_separator();
    formatter.info(&format!("Account: {}", config.sis.account_id));
    formatter.info(&format!("Role: {}", config.sis.role));
    formatter.info(&format!(
        "Course URL: {}",
        sisbatch.links().course_url("<user_id>_sb")
    ));
    for url in sisbatch.follow_up_urls(Some("<user_id>")) {
        formatter.info(&format!("Follow-up: {}", url));
    }
    formatter.info(&format!(
        "Browser: {}",
        if config.browser.enabled { "enabled" } else { "disabled" }
    ));

    formatter.print_separator();

    let locked = sisbatch.state().locked_files();
    if locked.is_empty() {
        formatter.success("Dry run completed successfully");
        0
    } else {
        let error = SisBatchError::FilesLocked { paths: locked };
        formatter.print_user_friendly_error(&error);
        exit_code_for(&error)
    }
}

fn print_startup_error(cli: &Cli, error: &SisBatchError) {
    let formatter = OutputFormatter::new(OutputMode::from(&cli.output_format), 0, false);
    formatter.print_user_friendly_error(error);
}
