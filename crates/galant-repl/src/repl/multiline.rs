//! Multi-line input collection for the REPL
//!
//! Collects lines until the buffered code can be expanded on its own:
//! - Bracket/brace matching
//! - String and character literal handling
//! - `//` line comments
//! - Block macros whose `{` has not been typed yet

use galant_core::macros::builtin::standard_rules;

/// Result of processing a line of input
#[derive(Debug, PartialEq, Eq)]
pub enum LineProcessResult {
    /// Input is complete and ready for expansion
    Complete(String),
    /// More input is needed to complete the statement
    NeedMore,
}

/// Collects multi-line input for complete statements
pub struct MultiLineCollector {
    /// Buffer for collecting lines
    buffer: String,
    /// Current nesting level (for braces, brackets, etc.)
    nesting_level: i32,
    /// Whether we're inside a string literal
    in_string: bool,
    /// String delimiter character (single or double quote)
    string_delimiter: char,
    /// Whether the last character was an escape
    last_was_escape: bool,
    /// Built-in macros that must be followed by a braced block
    block_macros: Vec<String>,
}

impl MultiLineCollector {
    /// Create a new multi-line collector
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            nesting_level: 0,
            in_string: false,
            string_delimiter: '"',
            last_was_escape: false,
            block_macros: standard_rules()
                .iter()
                .filter(|rule| rule.takes_block())
                .map(|rule| rule.name().to_string())
                .collect(),
        }
    }

    /// Get the appropriate prompt for the current state
    pub fn get_prompt(&self) -> &'static str {
        if self.is_collecting() {
            ".. " // Continuation prompt
        } else {
            ">> " // Main prompt
        }
    }

    /// Check if we're currently collecting a multi-line statement
    pub fn is_collecting(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Reset the collector state
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.nesting_level = 0;
        self.in_string = false;
        self.last_was_escape = false;
    }

    /// Process a line of input
    pub fn process_line(&mut self, line: &str) -> LineProcessResult {
        // Add line to buffer
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(line);

        // Update scanning state
        self.update_scan_state(line);

        // Check if we have a complete statement
        if self.is_complete_statement() {
            let complete_code = std::mem::take(&mut self.buffer);
            self.reset();
            LineProcessResult::Complete(complete_code)
        } else {
            LineProcessResult::NeedMore
        }
    }

    /// Update scanning state based on the new line
    fn update_scan_state(&mut self, line: &str) {
        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            if self.in_string {
                if self.last_was_escape {
                    self.last_was_escape = false;
                } else if ch == '\\' {
                    self.last_was_escape = true;
                } else if ch == self.string_delimiter {
                    self.in_string = false;
                }
            } else {
                match ch {
                    '"' | '\'' => {
                        self.in_string = true;
                        self.string_delimiter = ch;
                        self.last_was_escape = false;
                    }
                    '/' if chars.peek() == Some(&'/') => break,
                    '{' | '(' | '[' => {
                        self.nesting_level += 1;
                    }
                    '}' | ')' | ']' => {
                        self.nesting_level -= 1;
                    }
                    _ => {}
                }
            }
        }
        // Java literals never span lines
        self.in_string = false;
    }

    /// Check if the current buffer contains a complete statement
    fn is_complete_statement(&self) -> bool {
        if self.nesting_level > 0 {
            return false;
        }

        let trimmed = self.buffer.trim();

        // Common patterns that suggest more input is needed
        if trimmed.ends_with(',') || trimmed.ends_with('=') {
            return false;
        }

        !self.awaits_block(trimmed)
    }

    /// A block macro was started but its `{` has not arrived yet
    fn awaits_block(&self, trimmed: &str) -> bool {
        let Some(last_line) = trimmed.lines().last() else {
            return false;
        };
        let last_line = last_line.trim();
        if last_line.ends_with('}') || last_line.ends_with(';') {
            return false;
        }
        let first_word: String = last_line
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        self.block_macros.iter().any(|name| *name == first_word)
    }
}

impl Default for MultiLineCollector {
    fn default() -> Self {
        Self::new()
    }
}
