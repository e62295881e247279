pub mod machine;
pub mod prompt;

pub use machine::{Session, SessionState, SessionSummary};
pub use prompt::{is_affirmative, Prompter};
