use crate::error::{Result, SisBatchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub files: FilesConfig,
    pub sis: SisConfig,
    pub browser: BrowserConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesConfig {
    pub directory: PathBuf,
    pub user: String,
    pub sandbox: String,
    pub enrolment: String,
    pub log: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SisConfig {
    pub account_id: String,
    pub role: String,
    pub canvas_base_url: String,
    pub root_account: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    pub enabled: bool,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            user: "001_CreateUser.csv".to_string(),
            sandbox: "002_CreateSandbox.csv".to_string(),
            enrolment: "003_CreateEnrolment.csv".to_string(),
            log: "Enrolment_Log.csv".to_string(),
        }
    }
}

impl Default for SisConfig {
    fn default() -> Self {
        Self {
            account_id: "ACU_Staff_Sandboxes".to_string(),
            role: "Editing Lecturer".to_string(),
            canvas_base_url: "https://canvas.acu.edu.au".to_string(),
            root_account: "1".to_string(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Resolved locations of the four output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFiles {
    pub user: PathBuf,
    pub sandbox: PathBuf,
    pub enrolment: PathBuf,
    pub log: PathBuf,
}

impl BatchFiles {
    pub fn in_directory<P: AsRef<Path>>(directory: P, files: &FilesConfig) -> Self {
        let directory = directory.as_ref();
        Self {
            user: directory.join(&files.user),
            sandbox: directory.join(&files.sandbox),
            enrolment: directory.join(&files.enrolment),
            log: directory.join(&files.log),
        }
    }

    /// Every file the startup gate checks, in sandbox/user/enrolment/log order.
    pub fn all(&self) -> [&Path; 4] {
        [
            self.sandbox.as_path(),
            self.user.as_path(),
            self.enrolment.as_path(),
            self.log.as_path(),
        ]
    }

    /// The files cleared at session start. The log accumulates across runs.
    pub fn batch(&self) -> [&Path; 3] {
        [
            self.user.as_path(),
            self.sandbox.as_path(),
            self.enrolment.as_path(),
        ]
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SisBatchError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SisBatchError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| SisBatchError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["sisbatch.toml", ".sisbatch.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref directory) = cli_args.directory {
            self.files.directory = directory.clone();
        }

        if cli_args.no_browser {
            self.browser.enabled = false;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| SisBatchError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| SisBatchError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let names = [
            ("files.user", &self.files.user),
            ("files.sandbox", &self.files.sandbox),
            ("files.enrolment", &self.files.enrolment),
            ("files.log", &self.files.log),
        ];

        for (key, name) in &names {
            if name.trim().is_empty() {
                return Err(SisBatchError::Config {
                    message: format!("{} must not be empty", key),
                });
            }
        }

        for (i, (key, name)) in names.iter().enumerate() {
            if let Some((other, _)) = names[i + 1..].iter().find(|(_, n)| n == name) {
                return Err(SisBatchError::Config {
                    message: format!("{} and {} both point to {}", key, other, name),
                });
            }
        }

        if !self.files.directory.is_dir() {
            return Err(SisBatchError::Config {
                message: format!(
                    "Output directory does not exist: {}",
                    self.files.directory.display()
                ),
            });
        }

        if self.sis.account_id.trim().is_empty() {
            return Err(SisBatchError::Config {
                message: "sis.account_id must not be empty".to_string(),
            });
        }

        if self.sis.role.trim().is_empty() {
            return Err(SisBatchError::Config {
                message: "sis.role must not be empty".to_string(),
            });
        }

        if self.sis.root_account.trim().is_empty() {
            return Err(SisBatchError::Config {
                message: "sis.root_account must not be empty".to_string(),
            });
        }

        let base = Url::parse(&self.sis.canvas_base_url).map_err(|_| SisBatchError::InvalidUrl {
            url: self.sis.canvas_base_url.clone(),
        })?;
        if !matches!(base.scheme(), "https" | "http") || base.cannot_be_a_base() {
            return Err(SisBatchError::InvalidUrl {
                url: self.sis.canvas_base_url.clone(),
            });
        }

        Ok(())
    }

    pub fn batch_files(&self) -> BatchFiles {
        BatchFiles::in_directory(&self.files.directory, &self.files)
    }

    pub fn create_sample_config() -> String {
        let mut sample_config = Self::default();
        sample_config.files.directory = PathBuf::from(".");
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub directory: Option<PathBuf>,
    pub no_browser: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directory(mut self, directory: Option<PathBuf>) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_no_browser(mut self, no_browser: bool) -> Self {
        self.no_browser = no_browser;
        self
    }
}
