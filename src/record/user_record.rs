use crate::error::{Result, SisBatchError};
use serde::Serialize;
use std::fmt;

/// One staff member entered at the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UserRecord {
    pub const FIELD_LABELS: [&'static str; 4] = ["User ID", "First Name", "Last Name", "Email"];

    /// Builds a record from raw console input, trimming every field.
    ///
    /// Fails with the label of the first field left empty. The content is not
    /// validated any further: email shape and ID characters pass through as typed.
    pub fn from_input(user_id: &str, first_name: &str, last_name: &str, email: &str) -> Result<Self> {
        let fields = [user_id.trim(), first_name.trim(), last_name.trim(), email.trim()];

        if let Some(index) = fields.iter().position(|f| f.is_empty()) {
            return Err(SisBatchError::MissingField {
                field: Self::FIELD_LABELS[index],
            });
        }

        Ok(Self {
            user_id: fields[0].to_string(),
            first_name: fields[1].to_string(),
            last_name: fields[2].to_string(),
            email: fields[3].to_string(),
        })
    }

    pub fn course_id(&self) -> String {
        format!("{}_sb", self.user_id.to_lowercase())
    }

    pub fn login_id(&self) -> &str {
        &self.user_id
    }

    pub fn short_name(&self) -> String {
        format!("{}'s Sandbox", self.first_name)
    }

    pub fn long_name(&self) -> String {
        format!("{} {}'s Sandbox", self.first_name, self.last_name)
    }
}

impl fmt::Display for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "User ID: {}", self.user_id)?;
        writeln!(f, "First Name: {}", self.first_name)?;
        writeln!(f, "Last Name: {}", self.last_name)?;
        write!(f, "Email: {}", self.email)
    }
}
