//! Text layout module
//!
//! Splitting shaped buffers into lines for justification.

mod line;

pub use line::{justify_line, split_into_lines, target_length};
