use crate::record::UserRecord;
use crate::session::SessionSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub directory: PathBuf,
    pub committed: Vec<CommittedUser>,
    pub discarded: usize,
    pub follow_up_urls: Vec<String>,
    pub finished_at: DateTime<Utc>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommittedUser {
    pub user_id: String,
    pub course_id: String,
}

impl From<&UserRecord> for CommittedUser {
    fn from(record: &UserRecord) -> Self {
        Self {
            user_id: record.user_id.clone(),
            course_id: record.course_id(),
        }
    }
}

impl RunReport {
    pub fn from_summary(directory: PathBuf, summary: &SessionSummary) -> Self {
        Self {
            directory,
            committed: summary.committed.iter().map(CommittedUser::from).collect(),
            discarded: summary.discarded,
            follow_up_urls: Vec::new(),
            finished_at: Utc::now(),
            errors: Vec::new(),
        }
    }

    pub fn add_error<S: Into<String>>(&mut self, error: S) {
        self.errors.push(error.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_summary() {
        let summary = SessionSummary {
            committed: vec![
                UserRecord::from_input("JSmith", "Jane", "Smith", "j@x").unwrap(),
                UserRecord::from_input("bkim", "Bo", "Kim", "b@x").unwrap(),
            ],
            discarded: 2,
            last_user_id: Some("bkim".to_string()),
            input_closed: false,
        };

        let mut report = RunReport::from_summary(PathBuf::from("/batches"), &summary);
        report.add_error("browser unavailable");

        assert_eq!(report.committed[0].course_id, "jsmith_sb");
        assert_eq!(report.committed[1].user_id, "bkim");
        assert_eq!(report.discarded, 2);
        assert_eq!(report.errors, vec!["browser unavailable"]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["committed"][0]["user_id"], "JSmith");
        assert_eq!(json["discarded"], 2);
    }
}
