/*!
# Function Macros

`function [type] name(params) { ... }` defines a function that can be called
like an ordinary method from anywhere in the algorithm, including from its
own body. It expands to a `Function<A, R>` closure stored in a `Cell` holder
declared before the closure, so the body can reach the holder while the
closure is still being built:

```text
function int sq(int x) { return x * x; }
```

becomes (on one line)

```text
final Cell<Function<Integer, Integer>> sq = new Cell<Function<Integer, Integer>>();
Function<Integer, Integer> $sq = new Function<Integer, Integer>(){public Integer invoke(Integer $args) {int x = $args; return x * x; }};
{ sq.set($sq); }
```

and registers a call-site rule so that `sq(3)` becomes
`sq.get().invoke(3)`. The assignment sits in a block so the expansion is
valid both as statements of a method and as members of a class.

A function with no return type returns `Void`: `return null;` is appended to
its body and every bare `return;` in the body becomes `return null;`.
Parameters of primitive array type are not supported as closure arguments
(`int[]` is passed as `Integer[]`, which Java will not unbox); use
`new_function` or a boxed array type for those.

`new_function [type] name(params) { ... }` is the plain alternative: it
becomes a method of the generated class and calls need no rewriting.
*/

use std::borrow::Cow;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use super::boxing::{boxed_type, is_unit, UNIT};
use crate::macros::error::{Arity, MacroError, MacroResult};
use crate::macros::parameterized::{Invocation, ParameterizedRule, Rewriter};
use crate::macros::rule::is_identifier_part;
use crate::macros::ExpansionContext;

pub const FUNCTION: &str = "function";
pub const NEW_FUNCTION: &str = "new_function";

/// Holder type that lets the closure body refer to the function
pub const HOLDER_TYPE: &str = "Cell";
pub const FUNCTION_TYPE: &str = "Function";
/// Argument type when a function takes two or more parameters
pub const ARGUMENT_VECTOR: &str = "Object[]";

/// Optional return type followed by the function name. Types may be
/// qualified, generic, or arrays.
const SIGNATURE: &str =
    r"\s+(?:([A-Za-z_$][\w$.]*(?:\s*<[^(){};]*>)?(?:\s*\[\s*\])*)\s+)?([A-Za-z_$][\w$]*)";

/// `return;` without a value
static BARE_RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\breturn\s*;").expect("return pattern is valid"));

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][\w$]*$").expect("identifier pattern is valid"));

/// One declared parameter, `type name`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param<'a> {
    pub declared: &'a str,
    pub name: &'a str,
}

impl<'a> Param<'a> {
    pub fn parse(rule: &str, text: &'a str) -> MacroResult<Self> {
        let text = text.trim();
        let split = text
            .rfind(char::is_whitespace)
            .ok_or_else(|| bad_parameter(rule, text))?;
        let declared = text[..split].trim_end();
        let name = text[split..].trim_start();
        if declared.is_empty() || !IDENTIFIER.is_match(name) {
            return Err(bad_parameter(rule, text));
        }
        Ok(Self { declared, name })
    }
}

fn bad_parameter(rule: &str, text: &str) -> MacroError {
    MacroError::malformed(
        rule,
        format!("parameter '{text}' must be a type followed by a name"),
    )
}

/// Rewrites a `function` definition into a closure and registers the
/// call-site rule for its name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosureDefinition;

impl Rewriter for ClosureDefinition {
    fn rewrite(
        &self,
        invocation: &Invocation<'_>,
        context: &mut ExpansionContext<'_>,
    ) -> MacroResult<String> {
        let name = invocation
            .group(1)
            .ok_or_else(|| MacroError::malformed(FUNCTION, "missing function name"))?;
        let params = invocation
            .args
            .iter()
            .map(|arg| Param::parse(FUNCTION, arg))
            .collect::<MacroResult<Vec<_>>>()?;

        let returns = invocation.group(0).map_or(UNIT.to_string(), boxed_type);
        let argument = match params.as_slice() {
            [] => UNIT.to_string(),
            [single] => boxed_type(single.declared),
            _ => ARGUMENT_VECTOR.to_string(),
        };
        let bindings: String = match params.as_slice() {
            [single] => format!("{} {} = $args;", single.declared, single.name),
            _ => params
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    format!(
                        "{} {} = ({}) $args[{i}];",
                        p.declared,
                        p.name,
                        boxed_type(p.declared)
                    )
                })
                .collect(),
        };
        let block = invocation.block.unwrap_or_default();
        let (body, tail) = if is_unit(&returns) {
            (BARE_RETURN.replace_all(block.body, "return null;"), "return null;")
        } else {
            (Cow::Borrowed(block.body), "")
        };
        let function = format!("{FUNCTION_TYPE}<{argument}, {returns}>");

        let call_site = ParameterizedRule::literal(
            name,
            Arity::exactly(params.len()),
            false,
            CallSite {
                name: name.to_string(),
            },
        )
        .map_err(|e| MacroError::malformed(FUNCTION, e.to_string()))?
        .with_description(format!("call of user function {name}/{}", params.len()));
        context.register(Arc::new(call_site));
        debug!(function = name, params = params.len(), "defined function");

        Ok(format!(
            "final {HOLDER_TYPE}<{function}> {name} = new {HOLDER_TYPE}<{function}>(); \
             {function} ${name} = new {function}(){{public {returns} invoke({argument} $args){}{{{bindings}{}{tail}}}}}; \
             {{ {name}.set(${name}); }}",
            block.whitespace, body
        ))
    }
}

/// Rewrites `name(a, b)` into a call through the holder
#[derive(Debug, Clone)]
pub struct CallSite {
    pub name: String,
}

impl Rewriter for CallSite {
    fn rewrite(
        &self,
        invocation: &Invocation<'_>,
        _context: &mut ExpansionContext<'_>,
    ) -> MacroResult<String> {
        let argument = match invocation.args.as_slice() {
            [] => "null".to_string(),
            [single] => single.to_string(),
            args => format!("new {ARGUMENT_VECTOR}{{{}}}", args.join(", ")),
        };
        Ok(format!("{}.get().invoke({argument})", self.name))
    }

    // `other.name(...)` is a method of some other object
    fn vetoes(&self, preceding: Option<char>) -> bool {
        preceding.is_some_and(|c| c == '.' || is_identifier_part(c))
    }
}

/// Rewrites a `new_function` definition into a method of the algorithm class
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodDefinition;

impl Rewriter for MethodDefinition {
    fn rewrite(
        &self,
        invocation: &Invocation<'_>,
        _context: &mut ExpansionContext<'_>,
    ) -> MacroResult<String> {
        let name = invocation
            .group(1)
            .ok_or_else(|| MacroError::malformed(NEW_FUNCTION, "missing function name"))?;
        for arg in &invocation.args {
            Param::parse(NEW_FUNCTION, arg)?;
        }
        let returns = invocation.group(0).unwrap_or("void");
        let block = invocation.block.unwrap_or_default();
        Ok(format!(
            "public {returns} {name}({}) throws Terminate, GalantException{}{{{}}}",
            invocation.args.join(", "),
            block.whitespace,
            block.body
        ))
    }
}

pub fn function_rule() -> Result<ParameterizedRule<ClosureDefinition>, regex::Error> {
    Ok(ParameterizedRule::new(
        FUNCTION,
        &format!("{FUNCTION}{SIGNATURE}"),
        Arity::any(),
        true,
        ClosureDefinition,
    )?
    .with_description("function [type] name(params) {...}: callable closure"))
}

pub fn new_function_rule() -> Result<ParameterizedRule<MethodDefinition>, regex::Error> {
    Ok(ParameterizedRule::new(
        NEW_FUNCTION,
        &format!("{NEW_FUNCTION}{SIGNATURE}"),
        Arity::any(),
        true,
        MethodDefinition,
    )?
    .with_description("new_function [type] name(params) {...}: method of the algorithm"))
}
