//! Row shapes for the SIS Import batch files.
//!
//! Field order in each struct is the column order written to disk and must
//! match `COLUMNS`.

use crate::config::SisConfig;
use crate::record::UserRecord;
use serde::Serialize;

pub const SANDBOX_STATUS: &str = "active";
pub const ACCOUNT_STATUS: &str = "Active";

pub trait BatchRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRow {
    pub user_id: String,
    pub login_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SandboxRow {
    pub course_id: String,
    pub short_name: String,
    pub long_name: String,
    pub account_id: String,
    pub status: String,
}

/// Shared by the enrolment batch and the cumulative enrolment log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrolmentRow {
    pub course_id: String,
    pub user_id: String,
    pub role: String,
    pub status: String,
}

impl BatchRow for UserRow {
    const COLUMNS: &'static [&'static str] =
        &["user_id", "login_id", "first_name", "last_name", "email", "status"];
}

impl BatchRow for SandboxRow {
    const COLUMNS: &'static [&'static str] =
        &["course_id", "short_name", "long_name", "account_id", "status"];
}

impl BatchRow for EnrolmentRow {
    const COLUMNS: &'static [&'static str] = &["course_id", "user_id", "role", "status"];
}

impl UserRow {
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            user_id: record.user_id.clone(),
            login_id: record.login_id().to_string(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            status: ACCOUNT_STATUS.to_string(),
        }
    }
}

impl SandboxRow {
    pub fn from_record(record: &UserRecord, sis: &SisConfig) -> Self {
        Self {
            course_id: record.course_id(),
            short_name: record.short_name(),
            long_name: record.long_name(),
            account_id: sis.account_id.clone(),
            status: SANDBOX_STATUS.to_string(),
        }
    }
}

impl EnrolmentRow {
    pub fn from_record(record: &UserRecord, sis: &SisConfig) -> Self {
        Self {
            course_id: record.course_id(),
            user_id: record.user_id.clone(),
            role: sis.role.clone(),
            status: ACCOUNT_STATUS.to_string(),
        }
    }
}
