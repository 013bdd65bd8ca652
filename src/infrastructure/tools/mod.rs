//! Detection of installed command-line tools

pub mod detector;

pub use detector::{ToolDetector, ToolStatus};
