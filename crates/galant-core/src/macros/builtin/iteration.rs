/*!
# Graph Iteration Macros

Loops over the graph and over the edges incident to a node, plus the `sort`
shorthand for `Collections.sort`.
*/

use crate::macros::error::{Arity, MacroError, MacroResult};
use crate::macros::parameterized::{Invocation, ParameterizedRule, Rewriter};
use crate::macros::rule::is_identifier_part;
use crate::macros::ExpansionContext;

/// `for_outgoing(v, e, w) { ... }` and friends.
///
/// Binds `e` to each incident edge returned by `accessor(v)` and `w` to the
/// node at the other end of `e`.
#[derive(Debug, Clone, Copy)]
pub struct AdjacencyLoop {
    pub accessor: &'static str,
}

impl Rewriter for AdjacencyLoop {
    fn rewrite(
        &self,
        invocation: &Invocation<'_>,
        _context: &mut ExpansionContext<'_>,
    ) -> MacroResult<String> {
        let [node, edge, adjacent] = invocation.args[..] else {
            return Err(MacroError::Arity {
                rule: invocation.name.to_string(),
                expected: Arity::exactly(3),
                actual: invocation.args.len(),
            });
        };
        let block = invocation.block.unwrap_or_default();
        Ok(format!(
            "for ( Edge {edge} : {}({node}) ){}{{ Node {adjacent} = otherEnd({edge}, {node});{}}}",
            self.accessor, block.whitespace, block.body
        ))
    }
}

/// `for_nodes(v)` / `for_edges(e)`: loop header over every node or edge.
/// The loop body is whatever statement or block follows.
#[derive(Debug, Clone, Copy)]
pub struct GraphLoop {
    pub element: &'static str,
    pub source: &'static str,
}

impl Rewriter for GraphLoop {
    fn rewrite(
        &self,
        invocation: &Invocation<'_>,
        _context: &mut ExpansionContext<'_>,
    ) -> MacroResult<String> {
        Ok(format!(
            "for({} {} : {}())",
            self.element, invocation.args[0], self.source
        ))
    }
}

/// `sort(list[, comparator])` → `Collections.sort(...)`
#[derive(Debug, Clone, Copy, Default)]
pub struct SortCall;

impl Rewriter for SortCall {
    fn rewrite(
        &self,
        invocation: &Invocation<'_>,
        _context: &mut ExpansionContext<'_>,
    ) -> MacroResult<String> {
        Ok(format!("Collections.sort({})", invocation.args.join(", ")))
    }

    // `list.sort(...)` is a method call, and so is our own output
    fn vetoes(&self, preceding: Option<char>) -> bool {
        preceding.is_some_and(|c| c == '.' || is_identifier_part(c))
    }
}

pub fn adjacency_rule(
    name: &str,
    accessor: &'static str,
) -> Result<ParameterizedRule<AdjacencyLoop>, regex::Error> {
    Ok(
        ParameterizedRule::literal(name, Arity::exactly(3), true, AdjacencyLoop { accessor })?
            .with_description(format!(
                "{name}(v, e, w) {{...}}: loop over {accessor}(v), binding w to the other end of e"
            )),
    )
}

pub fn graph_loop_rule(
    name: &str,
    element: &'static str,
    source: &'static str,
) -> Result<ParameterizedRule<GraphLoop>, regex::Error> {
    Ok(
        ParameterizedRule::literal(name, Arity::exactly(1), false, GraphLoop { element, source })?
            .with_description(format!("{name}(x): for({element} x : {source}())")),
    )
}

pub fn sort_rule() -> Result<ParameterizedRule<SortCall>, regex::Error> {
    Ok(
        ParameterizedRule::literal("sort", Arity::between(1, 2), false, SortCall)?
            .with_description("sort(list[, comparator]) → Collections.sort(...)"),
    )
}
