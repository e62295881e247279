use crate::batch::state::ensure_header;
use crate::config::{BatchFiles, SisConfig};
use crate::error::{Result, SisBatchError};
use crate::record::{BatchRow, EnrolmentRow, SandboxRow, UserRecord, UserRow};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::info;

/// Appends confirmed records to the four output files.
pub struct BatchWriter {
    files: BatchFiles,
    sis: SisConfig,
}

impl BatchWriter {
    pub fn new(files: BatchFiles, sis: SisConfig) -> Self {
        Self { files, sis }
    }

    pub fn files(&self) -> &BatchFiles {
        &self.files
    }

    /// Writes one row per file in sandbox, user, enrolment, log order.
    ///
    /// A failure stops at the file that failed. Rows already appended stay.
    pub fn commit(&self, record: &UserRecord) -> Result<()> {
        let enrolment = EnrolmentRow::from_record(record, &self.sis);

        append_row(&self.files.sandbox, &SandboxRow::from_record(record, &self.sis))?;
        append_row(&self.files.user, &UserRow::from_record(record))?;
        append_row(&self.files.enrolment, &enrolment)?;
        append_row(&self.files.log, &enrolment)?;

        info!(user_id = %record.user_id, course_id = %enrolment.course_id, "committed user record");
        Ok(())
    }
}

pub fn append_row<R: BatchRow>(path: &Path, row: &R) -> Result<()> {
    ensure_header(path, R::COLUMNS)?;

    let file = OpenOptions::new().append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(file);

    writer
        .serialize(row)
        .map_err(|source| SisBatchError::BatchWrite {
            file: path.to_path_buf(),
            source,
        })?;
    writer.flush()?;

    Ok(())
}
