/*!
# Macro Expansion

Source-to-source rewriting of Galant pseudocode into Java method bodies.

## Architecture

- `delimiters`: top-level delimiter balancing and marker search
- `MacroRule`: trait for a trigger pattern plus a rewrite
- `ParameterizedRule`: `name(args) { block }` parsing on top of `MacroRule`
- `builtin`: the rules every catalog starts with
- `Catalog`: built-in rules plus rules registered while expanding
- `Expander`: the leftmost-first rewrite loop

## Example Usage

```rust
use galant_core::macros::Expander;

let mut expander = Expander::default();
let java = expander.expand("for_nodes(v) { mark(v); }")?;
assert_eq!(java, "for(Node v : getNodes()) { mark(v); }");
# Ok::<(), galant_core::macros::MacroError>(())
```
*/

pub mod builtin;
pub mod catalog;
pub mod delimiters;
pub mod driver;
pub mod error;
pub mod parameterized;
pub mod rule;

// Re-export main types
pub use catalog::Catalog;
pub use delimiters::{scan_nested, DelimiterPair, DelimiterSet, NestedScan};
pub use driver::{ExpandedSource, ExpanderConfig, ExpansionSummary, Expander};
pub use error::{Arity, MacroError, MacroResult};
pub use parameterized::{Block, Invocation, ParameterizedRule, Rewriter};
pub use rule::{MacroRule, Rewrite, RuleStats, SharedRule, Trigger};

/// State handed to a rule while it rewrites one trigger.
pub struct ExpansionContext<'a> {
    pub delimiters: &'a DelimiterSet,
    registered: Vec<SharedRule>,
}

impl<'a> ExpansionContext<'a> {
    pub fn new(delimiters: &'a DelimiterSet) -> Self {
        Self {
            delimiters,
            registered: Vec::new(),
        }
    }

    /// Queue a rule for the catalog; the driver adds it once the current
    /// rewrite has been spliced in.
    pub fn register(&mut self, rule: SharedRule) {
        self.registered.push(rule);
    }

    pub fn take_registered(&mut self) -> Vec<SharedRule> {
        std::mem::take(&mut self.registered)
    }
}
