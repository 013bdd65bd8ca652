//! Service process management
//!
//! - Artifact lookup for the prebuilt launch path
//! - Detached spawning in a dedicated process group
//! - Cancellable stdout/stderr draining into per-attempt log files
//! - Log tail reading

pub mod artifact;
pub mod launcher;
pub mod log_drain;
pub mod log_tail;

pub use artifact::find_artifact;
pub use launcher::{ChildProcess, ProcessLauncher};
pub use log_drain::LogDrain;
pub use log_tail::{last_lines, read_log_text, tail_lines};
