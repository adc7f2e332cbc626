/*!
# Keyword Aliases

Whole-word token substitution, e.g. `algorithm` → `public void run()`.
A keyword that opens a block only matches when `{` follows it, so the word
in a comment or string is left alone.
*/

use regex::Regex;

use crate::macros::error::MacroResult;
use crate::macros::rule::{
    find_guarded, followed_by_identifier, preceded_by_identifier, MacroRule, Rewrite, Trigger,
};
use crate::macros::ExpansionContext;

/// Replaces a keyword with fixed text.
///
/// The keyword only matches as a whole identifier, and the replacement is
/// never rescanned, so an alias may expand to text that contains itself.
pub struct KeywordRule {
    keyword: String,
    pattern: Regex,
    replacement: String,
    description: String,
    opens_block: bool,
}

impl KeywordRule {
    pub fn new(keyword: &str, replacement: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            keyword: keyword.to_string(),
            pattern: Regex::new(&regex::escape(keyword))?,
            replacement: replacement.to_string(),
            description: format!("{keyword} → {replacement}"),
            opens_block: false,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Only match when the next non-whitespace character is `{`
    pub fn opening_block(mut self) -> Self {
        self.opens_block = true;
        self
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}

impl MacroRule for KeywordRule {
    fn name(&self) -> &str {
        &self.keyword
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn recursive(&self) -> bool {
        false
    }

    fn takes_block(&self) -> bool {
        self.opens_block
    }

    fn find(&self, source: &str, from: usize) -> Option<Trigger> {
        find_guarded(&self.pattern, source, from, |s, start, end| {
            preceded_by_identifier(s, start)
                || followed_by_identifier(s, end)
                || (self.opens_block && !s[end..].trim_start().starts_with('{'))
        })
    }

    fn expand(
        &self,
        _source: &str,
        trigger: &Trigger,
        _context: &mut ExpansionContext<'_>,
    ) -> MacroResult<Rewrite> {
        Ok(Rewrite {
            end: trigger.end,
            replacement: self.replacement.clone(),
        })
    }
}
