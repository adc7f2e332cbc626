/*!
# Fetching Macros

Deprecated convenience bindings of the form `name variable;`, which declare
`variable` and initialize it from a graph accessor:

```text
numOfNodes n;      →  int n = getNodes().size();
```
*/

use std::sync::LazyLock;

use regex::Regex;

use crate::macros::error::{MacroError, MacroResult};
use crate::macros::rule::{find_guarded, preceded_by_identifier, MacroRule, Rewrite, Trigger};
use crate::macros::ExpansionContext;

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)([A-Za-z_$][\w$]*)(\s*)$").expect("variable pattern is valid")
});

/// `name variable;` → `type variable = initializer;`
pub struct FetchRule {
    name: String,
    pattern: Regex,
    declared_type: String,
    initializer: String,
    description: String,
}

impl FetchRule {
    pub fn new(name: &str, declared_type: &str, initializer: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.to_string(),
            // the name must be followed by whitespace, then anything up to `;`
            pattern: Regex::new(&format!(r"{}(\s[^;]*);", regex::escape(name)))?,
            declared_type: declared_type.to_string(),
            initializer: initializer.to_string(),
            description: format!("{name} v; → {declared_type} v = {initializer};"),
        })
    }
}

impl MacroRule for FetchRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn find(&self, source: &str, from: usize) -> Option<Trigger> {
        find_guarded(&self.pattern, source, from, |s, start, _| {
            preceded_by_identifier(s, start)
        })
    }

    fn expand(
        &self,
        _source: &str,
        trigger: &Trigger,
        _context: &mut ExpansionContext<'_>,
    ) -> MacroResult<Rewrite> {
        let payload = trigger.group(0).unwrap_or_default();
        let captures = VARIABLE.captures(payload).ok_or_else(|| {
            MacroError::malformed(
                &self.name,
                format!(
                    "expected a single variable name before ';', found '{}'",
                    payload.trim()
                ),
            )
        })?;

        // keep the user's whitespace so line breaks survive
        let leading = captures.get(1).map_or("", |m| m.as_str());
        let variable = captures.get(2).map_or("", |m| m.as_str());
        let trailing = captures.get(3).map_or("", |m| m.as_str());

        Ok(Rewrite {
            end: trigger.end,
            replacement: format!(
                "{}{leading}{variable}{trailing} = {};",
                self.declared_type, self.initializer
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::delimiters::DelimiterSet;

    fn apply(rule: &FetchRule, source: &str) -> MacroResult<String> {
        let delimiters = DelimiterSet::default();
        let mut context = ExpansionContext::new(&delimiters);
        let (trigger, rewrite) = rule
            .try_apply(source, 0, &mut context)?
            .expect("trigger should match");
        Ok(format!(
            "{}{}{}",
            &source[..trigger.start],
            rewrite.replacement,
            &source[rewrite.end..]
        ))
    }

    #[test]
    fn test_declares_and_initializes() {
        let rule = FetchRule::new("numOfNodes", "int", "getNodes().size()").unwrap();
        assert_eq!(
            apply(&rule, "numOfNodes count; algorithm {}").unwrap(),
            "int count = getNodes().size(); algorithm {}"
        );
    }

    #[test]
    fn test_line_breaks_survive() {
        let rule = FetchRule::new("nodesList", "List<Node>", "getNodes()").unwrap();
        assert_eq!(
            apply(&rule, "nodesList\n    all;").unwrap(),
            "List<Node>\n    all = getNodes();"
        );
    }

    #[test]
    fn test_payload_must_be_one_identifier() {
        let rule = FetchRule::new("numOfEdges", "int", "getEdges().size()").unwrap();
        let err = apply(&rule, "numOfEdges a b;").unwrap_err();
        assert!(matches!(err, MacroError::MalformedSyntax { ref rule, .. } if rule == "numOfEdges"));
        assert!(err.to_string().contains("'a b'"));
        assert!(apply(&rule, "numOfEdges x = 3;").is_err());
    }

    #[test]
    fn test_not_part_of_longer_identifier() {
        let rule = FetchRule::new("numOfNodes", "int", "getNodes().size()").unwrap();
        assert!(rule.find("maxNumOfNodes x;", 0).is_none());
        assert!(rule.find("_numOfNodes x;", 0).is_none());
        assert!(rule.find("numOfNodesTotal x;", 0).is_none());
        assert!(rule.find("print(numOfNodes);", 0).is_none());
    }
}
