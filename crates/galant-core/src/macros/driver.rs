/*!
# Expansion Driver

Repeatedly rewrites the leftmost macro trigger in the text until none is
left. A rule marked recursive has its own output rescanned; a non-recursive
rule's output is skipped. Because a function may be called before it is
defined, a pass that registers new rules is followed by another pass from the
start of the text.
*/

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::catalog::Catalog;
use super::delimiters::DelimiterSet;
use super::error::{MacroError, MacroResult};
use super::rule::{RuleStats, SharedRule, Trigger};
use super::ExpansionContext;

/// Expansion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpanderConfig {
    /// Upper bound on rewrites in a single run
    pub max_rewrites: usize,
    /// Delimiter pairs tracked by the balancer, e.g. `"()[]{}"`
    pub delimiters: DelimiterSet,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            max_rewrites: 100_000,
            delimiters: DelimiterSet::default(),
        }
    }
}

/// What happened during one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionSummary {
    pub rewrites: usize,
    pub passes: usize,
    /// Rules registered during the run, in registration order
    pub registered: Vec<String>,
    /// Rewrites per rule name
    pub applied: BTreeMap<String, usize>,
}

impl ExpansionSummary {
    pub fn used(&self, rule: &str) -> bool {
        self.applied.contains_key(rule)
    }
}

/// Expanded text together with its summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedSource {
    pub text: String,
    pub summary: ExpansionSummary,
}

/// Rewrites macro source into plain Java.
///
/// Functions defined by a successful run stay in the catalog for later runs
/// on the same expander until [`Expander::reset`] is called.
#[derive(Debug, Clone)]
pub struct Expander {
    catalog: Catalog,
    config: ExpanderConfig,
    stats: HashMap<String, RuleStats>,
}

impl Expander {
    pub fn new(config: ExpanderConfig) -> Self {
        Self::with_catalog(config, Catalog::standard())
    }

    pub fn with_catalog(config: ExpanderConfig, catalog: Catalog) -> Self {
        Self {
            catalog,
            config,
            stats: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ExpanderConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Expand `source`, returning only the text
    pub fn expand(&mut self, source: &str) -> MacroResult<String> {
        Ok(self.run(source)?.text)
    }

    /// Expand `source`, keeping the functions it defines for later runs.
    ///
    /// A function defined again by a later run replaces the earlier
    /// definition. Stops at the first rule error; on error nothing is
    /// returned and the catalog is left as it was before the run.
    pub fn run(&mut self, source: &str) -> MacroResult<ExpandedSource> {
        let (expanded, catalog) = self.run_with(source, self.catalog.clone())?;
        self.catalog = catalog;
        Ok(expanded)
    }

    /// Expand `source` against the built-in rules only.
    ///
    /// Functions registered by earlier runs are not visible, and the ones
    /// `source` defines are dropped afterwards.
    pub fn run_detached(&mut self, source: &str) -> MacroResult<ExpandedSource> {
        let (expanded, _) = self.run_with(source, self.catalog.fork())?;
        Ok(expanded)
    }

    fn run_with(
        &mut self,
        source: &str,
        mut catalog: Catalog,
    ) -> MacroResult<(ExpandedSource, Catalog)> {
        let started = Instant::now();
        let mut text = source.to_string();
        let mut summary = ExpansionSummary::default();

        loop {
            summary.passes += 1;
            let registered_before = summary.registered.len();
            let mut cursor = 0;

            while let Some((rule, trigger)) = leftmost(&catalog, &text, cursor) {
                if summary.rewrites >= self.config.max_rewrites {
                    warn!(
                        limit = self.config.max_rewrites,
                        rule = rule.name(),
                        "rewrite limit reached"
                    );
                    return Err(MacroError::RewriteLimit {
                        limit: self.config.max_rewrites,
                        rule: rule.name().to_string(),
                    });
                }

                let rule_started = Instant::now();
                let mut context = ExpansionContext::new(&self.config.delimiters);
                let result = rule.expand(&text, &trigger, &mut context);

                let stats = self
                    .stats
                    .entry(rule.name().to_string())
                    .or_insert_with(|| RuleStats::new(rule.name().to_string()));
                stats.total_time_us += rule_started.elapsed().as_micros() as u64;
                let rewrite = match result {
                    Ok(rewrite) => {
                        stats.applications += 1;
                        rewrite
                    }
                    Err(e) => {
                        stats.errors += 1;
                        debug!(rule = rule.name(), at = trigger.start, error = %e, "expansion failed");
                        return Err(e);
                    }
                };

                debug!(
                    rule = rule.name(),
                    at = trigger.start,
                    consumed = rewrite.end - trigger.start,
                    "applied macro"
                );
                text.replace_range(trigger.start..rewrite.end, &rewrite.replacement);
                summary.rewrites += 1;
                *summary.applied.entry(rule.name().to_string()).or_default() += 1;

                cursor = if rule.recursive() {
                    trigger.start
                } else {
                    trigger.start + rewrite.replacement.len()
                };

                for registered in context.take_registered() {
                    let name = registered.name().to_string();
                    if summary.registered.contains(&name) {
                        return Err(MacroError::malformed(
                            &name,
                            format!("function {name} is defined more than once"),
                        ));
                    }
                    if catalog.define(registered).is_some() {
                        debug!(function = %name, "replaced earlier definition");
                    }
                    summary.registered.push(name);
                }
            }

            if summary.registered.len() == registered_before {
                break;
            }
        }

        info!(
            rewrites = summary.rewrites,
            passes = summary.passes,
            registered = summary.registered.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "expansion complete"
        );
        Ok((ExpandedSource { text, summary }, catalog))
    }

    /// Forget rules registered by earlier runs
    pub fn reset(&mut self) {
        self.catalog.clear_dynamic();
    }

    pub fn stats(&self) -> &HashMap<String, RuleStats> {
        &self.stats
    }

    pub fn clear_stats(&mut self) {
        self.stats.clear();
    }
}

/// Leftmost trigger at or after `from`; ties go to the earlier rule
fn leftmost(catalog: &Catalog, text: &str, from: usize) -> Option<(SharedRule, Trigger)> {
    let mut best: Option<(SharedRule, Trigger)> = None;
    for rule in catalog.rules() {
        let Some(trigger) = rule.find(text, from) else {
            continue;
        };
        if best.as_ref().map_or(true, |(_, b)| trigger.start < b.start) {
            best = Some((Arc::clone(rule), trigger));
        }
    }
    best
}

impl Default for Expander {
    fn default() -> Self {
        Self::new(ExpanderConfig::default())
    }
}
