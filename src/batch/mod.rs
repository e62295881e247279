pub mod state;
pub mod writer;

pub use state::{ensure_header, reset_file, AppendProbe, FileStateManager, LockProbe, ResetOutcome};
pub use writer::{append_row, BatchWriter};
