/*!
# Parameterized Macros

Rules of the form `name(arg, arg, ...)`, optionally followed by a
brace-delimited code block:

```text
for_outgoing(v, e, w) {
    ...
}
```

The name may be a pattern with its own capture groups (the `function` rule
captures an optional return type and the function name). Arguments are split
only at top-level commas, so `f(a, g(b, c))` has two arguments. The whitespace
between the argument list and the block is handed to the rewriter verbatim so
the rewritten text keeps the user's line numbers.
*/

use regex::Regex;
use tracing::trace;

use super::delimiters::scan_nested;
use super::error::{Arity, MacroError, MacroResult};
use super::rule::{find_guarded, is_identifier_part, preceding_char, MacroRule, Rewrite, Trigger};
use super::ExpansionContext;

/// A decomposed `name(args) { block }` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    /// The text matched by the name pattern
    pub name: &'a str,
    /// Capture groups inside the name pattern
    pub groups: &'a [Option<String>],
    /// Trimmed arguments, in order
    pub args: Vec<&'a str>,
    pub block: Option<Block<'a>>,
}

impl<'a> Invocation<'a> {
    pub fn group(&self, index: usize) -> Option<&'a str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }
}

/// Trailing code block of an invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Block<'a> {
    /// Whitespace between `)` and `{`
    pub whitespace: &'a str,
    /// Everything between the braces
    pub body: &'a str,
}

/// Produces the replacement text for a parsed invocation
pub trait Rewriter: Send + Sync {
    fn rewrite(
        &self,
        invocation: &Invocation<'_>,
        context: &mut ExpansionContext<'_>,
    ) -> MacroResult<String>;

    /// Reject a lexical match given the character just before it
    fn vetoes(&self, preceding: Option<char>) -> bool {
        preceding.is_some_and(is_identifier_part)
    }
}

impl<F> Rewriter for F
where
    F: Fn(&Invocation<'_>) -> String + Send + Sync,
{
    fn rewrite(
        &self,
        invocation: &Invocation<'_>,
        _context: &mut ExpansionContext<'_>,
    ) -> MacroResult<String> {
        Ok(self(invocation))
    }
}

/// A rule that parses an argument list, and optionally a block, before
/// handing off to its [`Rewriter`].
pub struct ParameterizedRule<R> {
    name: String,
    description: String,
    trigger: Regex,
    arity: Arity,
    takes_block: bool,
    recursive: bool,
    rewriter: R,
}

impl<R: Rewriter> ParameterizedRule<R> {
    /// Create a rule whose name is the regular expression `name_pattern`.
    ///
    /// Fails if the pattern does not compile.
    pub fn new(
        name: impl Into<String>,
        name_pattern: &str,
        arity: Arity,
        takes_block: bool,
        rewriter: R,
    ) -> Result<Self, regex::Error> {
        let trigger = Regex::new(&format!(r"({name_pattern})\s*\("))?;
        let name = name.into();
        Ok(Self {
            description: format!("{name}(...)"),
            name,
            trigger,
            arity,
            takes_block,
            recursive: true,
            rewriter,
        })
    }

    /// Create a rule for a literal name
    pub fn literal(
        name: impl Into<String>,
        arity: Arity,
        takes_block: bool,
        rewriter: R,
    ) -> Result<Self, regex::Error> {
        let name = name.into();
        let pattern = regex::escape(&name);
        Self::new(name, &pattern, arity, takes_block, rewriter)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Parse the text after the trigger into an invocation and the offset
    /// just past everything it consumed.
    pub fn parse<'a>(
        &self,
        source: &'a str,
        trigger: &'a Trigger,
        context: &ExpansionContext<'_>,
    ) -> MacroResult<(Invocation<'a>, usize)> {
        let after_name = &source[trigger.end..];
        let params = scan_nested(context.delimiters, "(", ")", after_name, &[","])
            .map_err(|e| MacroError::missing_delimiter(&self.name, e))?;
        let Some(after_params) = params.extra else {
            return Err(MacroError::MissingDelimiter {
                rule: self.name.clone(),
                delimiter: ")".to_string(),
            });
        };

        let (block, rest) = if self.takes_block {
            let body_start = after_params.trim_start();
            let whitespace = &after_params[..after_params.len() - body_start.len()];
            let Some(body_text) = body_start.strip_prefix('{') else {
                return Err(MacroError::MissingBlock {
                    rule: self.name.clone(),
                });
            };
            let body = scan_nested(context.delimiters, "{", "}", body_text, &[])
                .map_err(|e| MacroError::missing_delimiter(&self.name, e))?;
            let Some(rest) = body.extra else {
                return Err(MacroError::MissingDelimiter {
                    rule: self.name.clone(),
                    delimiter: "}".to_string(),
                });
            };
            (
                Some(Block {
                    whitespace,
                    body: body.interior,
                }),
                rest,
            )
        } else {
            (None, after_params)
        };

        let args: Vec<&str> = if params.interior.trim().is_empty() {
            Vec::new()
        } else {
            params.split(",").into_iter().map(str::trim).collect()
        };

        if !self.arity.accepts(args.len()) {
            return Err(MacroError::Arity {
                rule: self.name.clone(),
                expected: self.arity,
                actual: args.len(),
            });
        }

        let invocation = Invocation {
            name: trigger.group(0).unwrap_or_default(),
            // group 0 is the whole name; the rest belong to the name pattern
            groups: trigger.groups.get(1..).unwrap_or(&[]),
            args,
            block,
        };
        // `rest` is a suffix of `source`
        Ok((invocation, source.len() - rest.len()))
    }
}

impl<R: Rewriter> MacroRule for ParameterizedRule<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn recursive(&self) -> bool {
        self.recursive
    }

    fn takes_block(&self) -> bool {
        self.takes_block
    }

    fn find(&self, source: &str, from: usize) -> Option<Trigger> {
        find_guarded(&self.trigger, source, from, |s, start, _| {
            self.rewriter.vetoes(preceding_char(s, start))
        })
    }

    fn expand(
        &self,
        source: &str,
        trigger: &Trigger,
        context: &mut ExpansionContext<'_>,
    ) -> MacroResult<Rewrite> {
        let (invocation, end) = self.parse(source, trigger, context)?;
        trace!(
            rule = %self.name,
            args = invocation.args.len(),
            block = invocation.block.is_some(),
            "parsed invocation"
        );
        let replacement = self.rewriter.rewrite(&invocation, context)?;
        Ok(Rewrite { end, replacement })
    }
}
