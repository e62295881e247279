use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SisBatchError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV operation failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Batch file is open in another program: {}", display_paths(.paths))]
    FilesLocked { paths: Vec<PathBuf> },

    #[error("Required field is empty: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("Failed to open browser for {url}")]
    Browser {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append row to {}", .file.display())]
    BatchWrite {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for SisBatchError {
    fn user_message(&self) -> String {
        match self {
            SisBatchError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            SisBatchError::FilesLocked { paths } => {
                format!(
                    "One or more CSV files are open elsewhere: {}",
                    display_paths(paths)
                )
            }
            SisBatchError::MissingField { field } => {
                format!("{} is required", field)
            }
            SisBatchError::InvalidUrl { url } => {
                format!("Invalid URL: {}", url)
            }
            SisBatchError::Browser { url, source } => {
                format!("Could not open {}: {}", url, source)
            }
            SisBatchError::BatchWrite { file, source } => {
                format!("Could not write to {}: {}", file.display(), source)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            SisBatchError::FilesLocked { .. } => Some(
                "Close the CSV files (for example in Excel) and run the tool again. No files were changed.".to_string()
            ),
            SisBatchError::Config { .. } => Some(
                "Check your configuration file syntax, or run with --generate-config to get a fresh sample.".to_string()
            ),
            SisBatchError::BatchWrite { .. } => Some(
                "The batch is incomplete. Fix the problem and run the tool again to start a clean batch.".to_string()
            ),
            SisBatchError::InvalidUrl { .. } => Some(
                "Set sis.canvas_base_url to an http(s) address such as https://canvas.example.edu".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for SisBatchError {
    fn from(error: toml::de::Error) -> Self {
        SisBatchError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SisBatchError>;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
