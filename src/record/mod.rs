pub mod rows;
pub mod user_record;

pub use rows::{BatchRow, EnrolmentRow, SandboxRow, UserRow};
pub use user_record::UserRecord;
