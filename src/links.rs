//! Canvas page addresses shown or opened around a batch session.

use crate::config::SisConfig;
use crate::error::{Result, SisBatchError};
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct CanvasLinks {
    base: Url,
    root_account: String,
}

impl CanvasLinks {
    pub fn from_config(sis: &SisConfig) -> Result<Self> {
        let invalid = || SisBatchError::InvalidUrl {
            url: sis.canvas_base_url.clone(),
        };
        let base = Url::parse(&sis.canvas_base_url).map_err(|_| invalid())?;
        if base.cannot_be_a_base() {
            return Err(invalid());
        }

        Ok(Self {
            base,
            root_account: sis.root_account.clone(),
        })
    }

    pub fn course_url(&self, course_id: &str) -> Url {
        self.with_segments(&["courses", course_id])
    }

    pub fn sis_import_url(&self) -> Url {
        self.with_segments(&["accounts", self.root_account.as_str(), "sis_import"])
    }

    pub fn user_search_url(&self, user_id: &str) -> Url {
        let mut url = self.with_segments(&["accounts", self.root_account.as_str()]);
        url.query_pairs_mut().append_pair("search_term", user_id);
        url
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

pub trait BrowserLauncher {
    fn open(&self, url: &Url) -> Result<()>;
}

/// Opens pages in the operating system's default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &Url) -> Result<()> {
        debug!(%url, "opening browser");
        webbrowser::open(url.as_str()).map_err(|source| SisBatchError::Browser {
            url: url.to_string(),
            source,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> CanvasLinks {
        CanvasLinks::from_config(&SisConfig::default()).unwrap()
    }

    #[test]
    fn test_default_urls() {
        let links = links();
        assert_eq!(
            links.course_url("jsmith_sb").as_str(),
            "https://canvas.acu.edu.au/courses/jsmith_sb"
        );
        assert_eq!(
            links.sis_import_url().as_str(),
            "https://canvas.acu.edu.au/accounts/1/sis_import"
        );
        assert_eq!(
            links.user_search_url("jsmith").as_str(),
            "https://canvas.acu.edu.au/accounts/1?search_term=jsmith"
        );
    }

    #[test]
    fn test_base_with_path_prefix() {
        let sis = SisConfig {
            canvas_base_url: "https://lms.example.edu/canvas/".to_string(),
            root_account: "7".to_string(),
            ..SisConfig::default()
        };
        let links = CanvasLinks::from_config(&sis).unwrap();
        assert_eq!(
            links.sis_import_url().as_str(),
            "https://lms.example.edu/canvas/accounts/7/sis_import"
        );
    }

    #[test]
    fn test_values_are_encoded() {
        let links = links();
        assert_eq!(
            links.user_search_url("j smith&x").as_str(),
            "https://canvas.acu.edu.au/accounts/1?search_term=j+smith%26x"
        );
        assert_eq!(
            links.course_url("a/b_sb").as_str(),
            "https://canvas.acu.edu.au/courses/a%2Fb_sb"
        );
    }

    #[test]
    fn test_invalid_base_rejected() {
        let sis = SisConfig {
            canvas_base_url: "mailto:admin@example.edu".to_string(),
            ..SisConfig::default()
        };
        assert!(CanvasLinks::from_config(&sis).is_err());

        let sis = SisConfig {
            canvas_base_url: "not a url".to_string(),
            ..SisConfig::default()
        };
        match CanvasLinks::from_config(&sis) {
            Err(error @ SisBatchError::InvalidUrl { .. }) => {
                assert_eq!(error.to_string(), "Invalid URL: not a url");
            }
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }
}
