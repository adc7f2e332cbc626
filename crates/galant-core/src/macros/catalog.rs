/*!
# Rule Catalog

The ordered set of rules the driver consults. Built-in rules are shared by
every catalog; rules registered while expanding (call sites of user
functions) belong to one catalog only, so two expansions never see each
other's functions.
*/

use std::fmt;
use std::sync::Arc;

use super::builtin;
use super::error::{MacroError, MacroResult};
use super::rule::SharedRule;

#[derive(Clone)]
pub struct Catalog {
    builtins: Arc<[SharedRule]>,
    dynamic: Vec<SharedRule>,
}

impl Catalog {
    /// Catalog holding the standard built-in rules
    pub fn standard() -> Self {
        Self::with_builtins(builtin::standard_rules())
    }

    pub fn with_builtins(builtins: Arc<[SharedRule]>) -> Self {
        Self {
            builtins,
            dynamic: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::with_builtins(Arc::from(Vec::new()))
    }

    /// All rules in lookup order: built-ins, then registered rules in
    /// registration order
    pub fn rules(&self) -> impl Iterator<Item = &SharedRule> {
        self.builtins.iter().chain(self.dynamic.iter())
    }

    pub fn builtins(&self) -> &[SharedRule] {
        &self.builtins
    }

    pub fn dynamic(&self) -> &[SharedRule] {
        &self.dynamic
    }

    pub fn len(&self) -> usize {
        self.builtins.len() + self.dynamic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, name: &str) -> Option<&SharedRule> {
        self.rules().find(|r| r.name() == name)
    }

    /// Add a rule for the rest of this catalog's life.
    ///
    /// A registered name must be unique among registered rules: defining the
    /// same function twice is an error.
    pub fn register(&mut self, rule: SharedRule) -> MacroResult<()> {
        if self.dynamic.iter().any(|r| r.name() == rule.name()) {
            return Err(MacroError::malformed(
                rule.name(),
                format!("function {} is defined more than once", rule.name()),
            ));
        }
        self.dynamic.push(rule);
        Ok(())
    }

    /// Add a rule, replacing a registered rule of the same name in place.
    ///
    /// Returns the replaced rule.
    pub fn define(&mut self, rule: SharedRule) -> Option<SharedRule> {
        match self.dynamic.iter_mut().find(|r| r.name() == rule.name()) {
            Some(slot) => Some(std::mem::replace(slot, rule)),
            None => {
                self.dynamic.push(rule);
                None
            }
        }
    }

    /// Drop every registered rule, keeping the built-ins
    pub fn clear_dynamic(&mut self) {
        self.dynamic.clear();
    }

    /// Catalog with the same built-ins and no registered rules
    pub fn fork(&self) -> Self {
        Self::with_builtins(Arc::clone(&self.builtins))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field(
                "builtins",
                &self.builtins.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .field(
                "dynamic",
                &self.dynamic.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::builtin::CallSite;
    use crate::macros::error::Arity;
    use crate::macros::parameterized::ParameterizedRule;

    fn call_site(name: &str) -> SharedRule {
        Arc::new(
            ParameterizedRule::literal(
                name,
                Arity::exactly(1),
                false,
                CallSite {
                    name: name.to_string(),
                },
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_lookup_order() {
        let mut catalog = Catalog::standard();
        let builtins = catalog.len();
        catalog.register(call_site("fact")).unwrap();
        catalog.register(call_site("fib")).unwrap();

        let names: Vec<&str> = catalog.rules().map(|r| r.name()).collect();
        assert_eq!(names.len(), builtins + 2);
        assert_eq!(names[0], "algorithm");
        assert_eq!(&names[builtins..], &["fact", "fib"]);
        assert!(catalog.get("fib").is_some());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut catalog = Catalog::standard();
        catalog.register(call_site("fact")).unwrap();
        let err = catalog.register(call_site("fact")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed macro: fact: function fact is defined more than once"
        );
        assert_eq!(catalog.dynamic().len(), 1);
    }

    #[test]
    fn test_define_replaces_in_place() {
        let mut catalog = Catalog::empty();
        assert!(catalog.define(call_site("fact")).is_none());
        assert!(catalog.define(call_site("fib")).is_none());
        let replacement = call_site("fact");
        let old = catalog.define(Arc::clone(&replacement)).unwrap();

        assert_eq!(old.name(), "fact");
        let names: Vec<&str> = catalog.rules().map(|r| r.name()).collect();
        assert_eq!(names, vec!["fact", "fib"]);
        assert!(Arc::ptr_eq(&catalog.dynamic()[0], &replacement));
    }

    #[test]
    fn test_catalogs_are_independent() {
        let mut first = Catalog::standard();
        first.register(call_site("fact")).unwrap();
        let second = first.fork();
        assert!(second.dynamic().is_empty());
        assert!(Arc::ptr_eq(&first.builtins, &second.builtins));

        first.clear_dynamic();
        assert!(first.get("fact").is_none());
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_empty() {
        let mut catalog = Catalog::empty();
        assert!(catalog.is_empty());
        catalog.register(call_site("f")).unwrap();
        assert_eq!(catalog.len(), 1);
    }
}
