//! Interactive front end for the Galant macro expander
//!
//! Wraps an [`Expander`] and a [`SourceIntegrator`] with:
//! - Multi-line input collection
//! - REPL commands (.help, .macros, .class, etc.)
//! - Output formatting and notifications
//!
//! Functions defined in one input stay callable in later inputs until
//! `.reset`.

use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use galant_core::macros::MacroRule;
use galant_core::{Expander, GalantConfig, SourceIntegrator};
use tracing::debug;

pub mod commands;
pub mod multiline;
pub mod notifier;

pub use commands::ReplCommand;
pub use multiline::{LineProcessResult, MultiLineCollector};
pub use notifier::{CapturingNotifier, DefaultNotifier, ReplNotifier};

/// Interactive REPL for Galant algorithm code
pub struct Repl {
    /// Session expander; keeps user functions between inputs
    expander: Expander,
    /// Wraps files into classes for `.class`
    integrator: SourceIntegrator,
    /// Current notifier for output
    notifier: Box<dyn ReplNotifier>,
    /// Whether the REPL is running
    running: bool,
    /// Quiet mode (suppress timing info)
    quiet: bool,
    /// Debug mode (append an expansion summary)
    debug: bool,
}

impl Repl {
    /// Create a new REPL from the given configuration
    pub fn new(config: &GalantConfig) -> Self {
        Self {
            expander: config.expander(),
            integrator: config.integrator(),
            notifier: Box::new(DefaultNotifier::new()),
            running: true,
            quiet: false,
            debug: config.debug,
        }
    }

    /// Set the notifier for this REPL
    pub fn set_notifier(&mut self, notifier: Box<dyn ReplNotifier>) {
        self.notifier = notifier;
    }

    /// Get a reference to the current notifier
    pub fn notifier(&self) -> &dyn ReplNotifier {
        self.notifier.as_ref()
    }

    pub fn expander(&self) -> &Expander {
        &self.expander
    }

    /// Check if the REPL is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Set quiet mode
    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    /// Set debug mode
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Parse REPL input into a command
    pub fn parse_input(&self, input: &str) -> Result<ReplCommand> {
        commands::parse_command(input)
    }

    /// Handle a REPL command
    pub fn handle_command(&mut self, command: ReplCommand) -> Result<String> {
        match command {
            ReplCommand::Help => Ok(self.get_help_text()),
            ReplCommand::Quit => {
                self.running = false;
                Ok("Goodbye!".to_string())
            }
            ReplCommand::Clear => {
                print!("\x1B[2J\x1B[1;1H");
                Ok("Screen cleared.".to_string())
            }
            ReplCommand::Quiet => {
                self.quiet = !self.quiet;
                Ok(format!(
                    "Quiet mode: {}",
                    if self.quiet { "on" } else { "off" }
                ))
            }
            ReplCommand::Debug => {
                self.debug = !self.debug;
                Ok(format!(
                    "Debug mode: {}",
                    if self.debug { "on" } else { "off" }
                ))
            }
            ReplCommand::Macros => Ok(self.list_macros()),
            ReplCommand::Reset => {
                let forgotten = self.expander.catalog().dynamic().len();
                self.expander.reset();
                Ok(format!("Forgot {} function(s).", forgotten))
            }
            ReplCommand::Stats => Ok(format_stats(&self.expander)),
            ReplCommand::Load(file) => {
                let (output, _) = self.load_file(&file)?;
                Ok(output)
            }
            ReplCommand::Class { file, name } => self.integrate_file(&file, &name),
        }
    }

    /// Expand code and return the result with timing in microseconds
    pub fn execute(&mut self, code: &str) -> Result<(String, u64)> {
        let start = Instant::now();
        let expanded = self.expander.run(code)?;
        let duration = start.elapsed().as_micros() as u64;

        let mut output = expanded.text;
        if self.debug {
            let summary = &expanded.summary;
            let _ = write!(
                output,
                "\n// {} rewrite(s) in {} pass(es)",
                summary.rewrites, summary.passes
            );
            for (rule, count) in &summary.applied {
                let _ = write!(output, "\n//   {rule}: {count}");
            }
            if !summary.registered.is_empty() {
                let _ = write!(output, "\n// defined: {}", summary.registered.join(", "));
            }
        }
        Ok((output, duration))
    }

    /// Expand the contents of a file with the session expander
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(String, u64)> {
        let path = path.as_ref();
        let code = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        debug!(file = %path.display(), bytes = code.len(), "loading file");
        self.execute(&code)
    }

    /// Wrap a file into a Java class
    fn integrate_file(&mut self, file: &str, name: &str) -> Result<String> {
        let code = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file))?;
        let unit = self.integrator.to_class(&mut self.expander, name, &code)?;
        Ok(unit.source)
    }

    fn list_macros(&self) -> String {
        let catalog = self.expander.catalog();
        let mut listing = String::from("Built-in macros:");
        for rule in catalog.builtins() {
            let _ = write!(listing, "\n  {:<14} {}", rule.name(), rule.description());
        }
        if catalog.dynamic().is_empty() {
            listing.push_str("\nNo functions defined.");
        } else {
            listing.push_str("\nFunctions:");
            for rule in catalog.dynamic() {
                let _ = write!(listing, "\n  {:<14} {}", rule.name(), rule.description());
            }
        }
        listing
    }

    /// Get help text
    fn get_help_text(&self) -> String {
        r#"Galant REPL Commands:
  .help              - Show this help message
  .quit              - Exit the REPL
  .clear             - Clear the screen
  .quiet             - Toggle quiet mode (hide timing info)
  .debug             - Toggle debug mode (show expansion summary)
  .eval              - Enter multi-line evaluation mode (end with '.')
  .macros            - List built-in macros and defined functions
  .reset             - Forget functions defined in this session
  .stats             - Show per-macro statistics
  .load <file>       - Expand a file
  .class <file> <N>  - Wrap a file in the Java class N

Galant Macros:
  - Keywords: algorithm { ... }, bool, numOfNodes n;, nodesList l;
  - Loops: for_nodes(v) { }, for_edges(e) { }, for_outgoing(v, e, w) { }
  - Sorting: sort(list), sort(list, comparator)
  - Functions: function int sq(int x) { return x * x; }

Anything else is expanded and printed as Java."#
            .to_string()
    }

    /// Show exit statistics
    pub fn show_exit_stats(&self) {
        if !self.quiet {
            let applications: u64 = self.expander.stats().values().map(|s| s.applications).sum();
            println!("\nSession complete: {} macro application(s).", applications);
        }
    }
}

/// Per-macro statistics, most applied first
pub fn format_stats(expander: &Expander) -> String {
    let mut stats: Vec<_> = expander.stats().values().collect();
    if stats.is_empty() {
        return "No macros applied yet.".to_string();
    }
    stats.sort_by(|a, b| {
        b.applications
            .cmp(&a.applications)
            .then_with(|| a.rule_name.cmp(&b.rule_name))
    });

    let mut report = String::from("Macro Statistics:");
    for s in stats {
        let _ = write!(
            report,
            "\n  {:<14} applied {:>5}  errors {:>3}  avg {:.1}µs",
            s.rule_name,
            s.applications,
            s.errors,
            s.average_time_us()
        );
    }
    report
}
