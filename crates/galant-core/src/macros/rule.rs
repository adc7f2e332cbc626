/*!
# Macro Rules

Core trait and utilities for defining macro rules.
*/

use std::sync::Arc;

use regex::{Captures, Regex};

use super::error::MacroResult;
use super::ExpansionContext;

/// Where a rule's trigger pattern matched in the working text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// Byte offset of the first character of the match
    pub start: usize,
    /// Byte offset just past the match
    pub end: usize,
    /// Capture groups of the trigger pattern, group 1 onwards
    pub groups: Vec<Option<String>>,
}

impl Trigger {
    pub fn from_captures(captures: &Captures<'_>) -> Self {
        // group 0 always participates in a successful match
        let whole = captures.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
        Self {
            start: whole.0,
            end: whole.1,
            groups: captures
                .iter()
                .skip(1)
                .map(|g| g.map(|m| m.as_str().to_string()))
                .collect(),
        }
    }

    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }
}

/// Replacement produced by a rule for one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Byte offset just past the last character consumed by the rule.
    /// The text between the trigger start and this offset is replaced.
    pub end: usize,
    pub replacement: String,
}

/// Core trait for macro rules
///
/// A rule finds its trigger in the working text and, once chosen by the
/// driver, rewrites it. Finding and rewriting are separate so the driver can
/// pick the leftmost trigger across the whole catalog before any rule runs.
pub trait MacroRule: Send + Sync {
    /// Name shown in errors and listings
    fn name(&self) -> &str;

    /// Detailed description of what this rule does
    fn description(&self) -> &str;

    /// Whether the replacement text is itself scanned for further macros
    fn recursive(&self) -> bool {
        true
    }

    /// Whether a `{ ... }` block must follow the trigger
    fn takes_block(&self) -> bool {
        false
    }

    /// Leftmost trigger at or after `from` that the rule does not veto
    fn find(&self, source: &str, from: usize) -> Option<Trigger>;

    /// Rewrite the text starting at `trigger`
    fn expand(
        &self,
        source: &str,
        trigger: &Trigger,
        context: &mut ExpansionContext<'_>,
    ) -> MacroResult<Rewrite>;

    /// Find and rewrite in one step
    fn try_apply(
        &self,
        source: &str,
        from: usize,
        context: &mut ExpansionContext<'_>,
    ) -> MacroResult<Option<(Trigger, Rewrite)>> {
        match self.find(source, from) {
            Some(trigger) => {
                let rewrite = self.expand(source, &trigger, context)?;
                Ok(Some((trigger, rewrite)))
            }
            None => Ok(None),
        }
    }
}

pub type SharedRule = Arc<dyn MacroRule>;

/// Whether `ch` can continue a Java identifier
pub fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

pub fn preceding_char(source: &str, offset: usize) -> Option<char> {
    source[..offset].chars().next_back()
}

pub fn following_char(source: &str, offset: usize) -> Option<char> {
    source[offset..].chars().next()
}

/// The match at `start` continues an identifier that begins earlier
pub fn preceded_by_identifier(source: &str, start: usize) -> bool {
    preceding_char(source, start).is_some_and(is_identifier_part)
}

/// The match ending at `end` runs on into a longer identifier
pub fn followed_by_identifier(source: &str, end: usize) -> bool {
    following_char(source, end).is_some_and(is_identifier_part)
}

/// Leftmost match of `pattern` at or after `from` that `veto` accepts.
///
/// Vetoed matches are skipped one character at a time, so a rejected match at
/// `outer_for_nodes` does not hide a real `for_nodes` further on.
pub fn find_guarded<F>(pattern: &Regex, source: &str, from: usize, veto: F) -> Option<Trigger>
where
    F: Fn(&str, usize, usize) -> bool,
{
    let mut at = from;
    while at <= source.len() {
        let captures = pattern.captures_at(source, at)?;
        let whole = captures.get(0)?;
        if !veto(source, whole.start(), whole.end()) {
            return Some(Trigger::from_captures(&captures));
        }
        at = whole.start()
            + following_char(source, whole.start()).map_or(1, char::len_utf8);
    }
    None
}

/// Rule execution statistics
#[derive(Debug, Default, Clone)]
pub struct RuleStats {
    pub rule_name: String,
    pub applications: u64,
    pub errors: u64,
    pub total_time_us: u64,
}

impl RuleStats {
    pub fn new(rule_name: String) -> Self {
        Self {
            rule_name,
            applications: 0,
            errors: 0,
            total_time_us: 0,
        }
    }

    pub fn average_time_us(&self) -> f64 {
        if self.applications == 0 {
            0.0
        } else {
            (self.total_time_us as f64) / (self.applications as f64)
        }
    }
}
