/*!
# Built-in Rules

The rules every catalog starts with, in catalog order. They are compiled
once per process and shared between catalogs.
*/

pub mod boxing;
pub mod fetching;
pub mod function;
pub mod iteration;
pub mod keyword;

use std::sync::{Arc, LazyLock};

pub use fetching::FetchRule;
pub use function::{CallSite, ClosureDefinition, MethodDefinition, Param};
pub use iteration::{AdjacencyLoop, GraphLoop, SortCall};
pub use keyword::KeywordRule;

use super::rule::{MacroRule, SharedRule};

/// Name of the keyword that opens the algorithm's `run()` method
pub const ALGORITHM: &str = "algorithm";

static STANDARD_RULES: LazyLock<Arc<[SharedRule]>> = LazyLock::new(|| {
    build_standard_rules()
        .expect("built-in macro patterns are valid")
        .into()
});

/// Shared handle on the built-in rules
pub fn standard_rules() -> Arc<[SharedRule]> {
    Arc::clone(&STANDARD_RULES)
}

fn shared<R: MacroRule + 'static>(rule: R) -> SharedRule {
    Arc::new(rule)
}

/// Compile the built-in rules from scratch
pub fn build_standard_rules() -> Result<Vec<SharedRule>, regex::Error> {
    Ok(vec![
        shared(
            KeywordRule::new(ALGORITHM, "public void run()")?
                .opening_block()
                .with_description("algorithm { ... }: body of the algorithm"),
        ),
        shared(KeywordRule::new("bool", "boolean")?),
        shared(FetchRule::new("numOfNodes", "int", "getNodes().size()")?),
        shared(FetchRule::new("numOfEdges", "int", "getEdges().size()")?),
        shared(FetchRule::new("nodesList", "List<Node>", "getNodes()")?),
        shared(FetchRule::new("edgesList", "List<Edge>", "getEdges()")?),
        shared(iteration::sort_rule()?),
        shared(iteration::adjacency_rule("for_outgoing", "outEdges")?),
        shared(iteration::adjacency_rule("for_incoming", "inEdges")?),
        shared(iteration::adjacency_rule("for_adjacent", "edges")?),
        shared(iteration::graph_loop_rule("for_nodes", "Node", "getNodes")?),
        shared(iteration::graph_loop_rule("for_edges", "Edge", "getEdges")?),
        shared(function::new_function_rule()?),
        shared(function::function_rule()?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_order_and_names() {
        let names: Vec<String> = standard_rules()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "algorithm",
                "bool",
                "numOfNodes",
                "numOfEdges",
                "nodesList",
                "edgesList",
                "sort",
                "for_outgoing",
                "for_incoming",
                "for_adjacent",
                "for_nodes",
                "for_edges",
                "new_function",
                "function",
            ]
        );
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_block_rules() {
        let names: Vec<String> = standard_rules()
            .iter()
            .filter(|r| r.takes_block())
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "algorithm",
                "for_outgoing",
                "for_incoming",
                "for_adjacent",
                "new_function",
                "function",
            ]
        );
    }

    #[test]
    fn test_rules_are_shared() {
        let a = standard_rules();
        let b = standard_rules();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_only_keywords_are_not_recursive() {
        for rule in standard_rules().iter() {
            let keyword = matches!(rule.name(), "algorithm" | "bool");
            assert_eq!(rule.recursive(), !keyword, "{}", rule.name());
        }
    }
}
