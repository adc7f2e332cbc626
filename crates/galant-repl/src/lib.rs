//! Galant REPL - command-line front end for the Galant macro expander
//!
//! This crate provides batch expansion of algorithm files and an interactive
//! REPL with command parsing, multi-line input handling, and per-session
//! function definitions.

pub mod repl;

// Re-export commonly used types for convenience
pub use repl::{DefaultNotifier, Repl, ReplCommand, ReplNotifier};
