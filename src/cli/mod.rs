//! Command-line front end helpers

pub mod orchestration;

pub use orchestration::{run_command, Command};
