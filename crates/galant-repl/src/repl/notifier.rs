//! Output notification system for the REPL
//!
//! Provides a trait-based system for handling REPL output, allowing different
//! output backends (console, editor plugin, test capture) to be plugged in.

use std::sync::{Arc, Mutex};

/// Trait for handling REPL output notifications
pub trait ReplNotifier: Send + Sync {
    /// Handle regular output
    fn on_output(&self, content: &str);

    /// Handle error output
    fn on_error(&self, content: &str);

    /// Handle expanded code with timing information
    fn on_result(&self, output: &str, duration_us: u64, quiet: bool);
}

impl<T: ReplNotifier + ?Sized> ReplNotifier for Arc<T> {
    fn on_output(&self, content: &str) {
        (**self).on_output(content)
    }

    fn on_error(&self, content: &str) {
        (**self).on_error(content)
    }

    fn on_result(&self, output: &str, duration_us: u64, quiet: bool) {
        (**self).on_result(output, duration_us, quiet)
    }
}

/// Default console-based notifier
pub struct DefaultNotifier;

impl DefaultNotifier {
    /// Create a new default notifier
    pub fn new() -> Self {
        Self
    }
}

impl ReplNotifier for DefaultNotifier {
    fn on_output(&self, content: &str) {
        if !content.is_empty() {
            println!("{}", content);
        }
    }

    fn on_error(&self, content: &str) {
        eprintln!("{}", content);
    }

    fn on_result(&self, output: &str, duration_us: u64, quiet: bool) {
        println!("{}", output);
        if !quiet {
            println!("// expanded in {}µs", duration_us);
        }
    }
}

impl Default for DefaultNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Notifier that records everything it is given
#[derive(Default)]
pub struct CapturingNotifier {
    lines: Mutex<Vec<String>>,
}

impl CapturingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far; errors are prefixed with `error: `
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl ReplNotifier for CapturingNotifier {
    fn on_output(&self, content: &str) {
        self.push(content.to_string());
    }

    fn on_error(&self, content: &str) {
        self.push(format!("error: {content}"));
    }

    fn on_result(&self, output: &str, _duration_us: u64, _quiet: bool) {
        self.push(output.to_string());
    }
}
