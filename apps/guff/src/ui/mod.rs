//! Terminal front end: event rendering and the interactive shell.

pub mod render;
pub mod shell;

pub use shell::{run_interactive, run_script};
