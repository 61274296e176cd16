//! deploy-deck library
//!
//! Lists the Android devices an app can be deployed to: configured AVDs and
//! attached hardware, reconciled into one ordered list.

pub mod commands;
pub mod render;

// Re-export main entry points
pub use commands::{run_init, run_list, run_watch};
