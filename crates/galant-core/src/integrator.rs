/*!
# Source Integrator

Turns a user's algorithm text into a complete Java compilation unit: leading
`import` statements are kept as imports, the rest is macro-expanded and
placed in a class extending `Algorithm`.

The class header is emitted on the same line as the user's first line of
code, so line numbers reported by the Java compiler match the user's file.
*/

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::macros::builtin::ALGORITHM;
use crate::macros::{ExpansionSummary, Expander};
use crate::Result;

/// A leading import statement, with any whitespace before it
static LEADING_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A\s*import\s+(?:static\s+)?[\w$.]+(?:\s*\.\s*\*)?\s*;")
        .expect("import pattern is valid")
});

/// Class name used when the algorithm name has no usable characters
pub const DEFAULT_CLASS_NAME: &str = "UserAlgorithm";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Package of the generated class
    pub package: String,
    /// Imports every generated class starts with
    pub imports: Vec<String>,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            package: "edu.ncsu.csc.Galant.algorithm.code.compiled".to_string(),
            imports: [
                "java.util.*",
                "edu.ncsu.csc.Galant.GalantException",
                "edu.ncsu.csc.Galant.algorithm.Algorithm",
                "edu.ncsu.csc.Galant.algorithm.Terminate",
                "edu.ncsu.csc.Galant.algorithm.code.macro.Cell",
                "edu.ncsu.csc.Galant.algorithm.code.macro.Function",
                "edu.ncsu.csc.Galant.graph.component.Edge",
                "edu.ncsu.csc.Galant.graph.component.Graph",
                "edu.ncsu.csc.Galant.graph.component.GraphState",
                "edu.ncsu.csc.Galant.graph.component.Node",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// A generated Java class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub class_name: String,
    pub qualified_name: String,
    pub source: String,
    pub summary: ExpansionSummary,
}

#[derive(Debug, Clone, Default)]
pub struct SourceIntegrator {
    config: IntegratorConfig,
}

impl SourceIntegrator {
    pub fn new(config: IntegratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// Expand `code` and wrap it in a class named after `algorithm_name`.
    ///
    /// The class only sees the functions `code` defines; none of them are
    /// kept on `expander` afterwards, so the same code can be integrated again.
    pub fn to_class(
        &self,
        expander: &mut Expander,
        algorithm_name: &str,
        code: &str,
    ) -> Result<CompilationUnit> {
        let class_name = class_name(algorithm_name);
        let (imports, body) = split_imports(code);
        let expanded = expander.run_detached(body)?;

        let mut source = format!("package {};", self.config.package);
        for import in &self.config.imports {
            source.push_str(&format!("import {import};"));
        }
        source.push_str(imports);
        source.push_str(&format!("public class {class_name} extends Algorithm{{"));
        if expanded.summary.used(ALGORITHM) {
            source.push_str(&expanded.text);
        } else {
            source.push_str("public void run() {");
            source.push_str(&expanded.text);
            source.push_str("\n}");
        }
        // the user's code may end in a line comment
        source.push_str("\n}");

        let qualified_name = format!("{}.{class_name}", self.config.package);
        debug!(class = %qualified_name, bytes = source.len(), "integrated algorithm");
        Ok(CompilationUnit {
            class_name,
            qualified_name,
            source,
            summary: expanded.summary,
        })
    }
}

/// Java identifier made from `name`, with invalid characters replaced by `_`
pub fn class_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let valid = if i == 0 {
                c.is_alphabetic() || c == '_' || c == '$'
            } else {
                c.is_alphanumeric() || c == '_' || c == '$'
            };
            if valid {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        DEFAULT_CLASS_NAME.to_string()
    } else {
        sanitized
    }
}

/// Split `code` after its leading import statements
pub fn split_imports(code: &str) -> (&str, &str) {
    let mut split = 0;
    while let Some(found) = LEADING_IMPORT.find(&code[split..]) {
        split += found.end();
    }
    code.split_at(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("Dijkstra"), "Dijkstra");
        assert_eq!(class_name("depth first"), "depth_first");
        assert_eq!(class_name("2coloring"), "_coloring");
        assert_eq!(class_name("bfs.alg"), "bfs_alg");
        assert_eq!(class_name(""), DEFAULT_CLASS_NAME);
    }

    #[test]
    fn test_split_imports() {
        let (imports, rest) =
            split_imports("import java.io.*;\nimport static java.lang.Math.max;\nalgorithm { }");
        assert_eq!(imports, "import java.io.*;\nimport static java.lang.Math.max;");
        assert_eq!(rest, "\nalgorithm { }");

        let (imports, rest) = split_imports("algorithm { } import x.Y;");
        assert_eq!(imports, "");
        assert_eq!(rest, "algorithm { } import x.Y;");
    }

    #[test]
    fn test_wraps_code_without_algorithm_keyword() {
        let integrator = SourceIntegrator::new(IntegratorConfig {
            package: "p".to_string(),
            imports: vec!["java.util.*".to_string()],
        });
        let mut expander = Expander::default();
        let unit = integrator
            .to_class(&mut expander, "Test", "for_nodes(v) mark(v);")
            .unwrap();
        assert_eq!(
            unit.source,
            "package p;import java.util.*;public class Test extends Algorithm{public void run() {for(Node v : getNodes()) mark(v);\n}\n}"
        );
        assert_eq!(unit.qualified_name, "p.Test");
    }

    #[test]
    fn test_algorithm_keyword_is_not_wrapped() {
        let integrator = SourceIntegrator::new(IntegratorConfig {
            package: "p".to_string(),
            imports: Vec::new(),
        });
        let mut expander = Expander::default();
        let unit = integrator
            .to_class(&mut expander, "t", "import a.B;\nint n;\nalgorithm {\n}")
            .unwrap();
        assert_eq!(
            unit.source,
            "package p;import a.B;public class t extends Algorithm{\nint n;\npublic void run() {\n}\n}"
        );
        assert!(unit.summary.used(ALGORITHM));
    }

    #[test]
    fn test_algorithm_in_comment_is_wrapped() {
        let integrator = SourceIntegrator::new(IntegratorConfig {
            package: "p".to_string(),
            imports: Vec::new(),
        });
        let unit = integrator
            .to_class(&mut Expander::default(), "U", "// the classic algorithm\nint y = 3;")
            .unwrap();
        assert_eq!(
            unit.source,
            "package p;public class U extends Algorithm{public void run() {// the classic algorithm\nint y = 3;\n}\n}"
        );
        assert!(!unit.summary.used(ALGORITHM));
    }

    #[test]
    fn test_function_outside_algorithm_is_class_level() {
        let code = "function int sq(int x) { return x * x; }\nalgorithm { int y = sq(2); }";
        let unit = SourceIntegrator::default()
            .to_class(&mut Expander::default(), "Square", code)
            .unwrap();
        // field declarations plus an instance initializer, then the method
        assert!(unit.source.ends_with(
            "return x * x; }}; { sq.set($sq); }\npublic void run() { int y = sq.get().invoke(2); }\n}"
        ));
    }

    #[test]
    fn test_integrate_twice_with_one_expander() {
        let code = "function int sq(int x) { return x * x; }\nalgorithm { sq(2); }";
        let integrator = SourceIntegrator::default();
        let mut expander = Expander::default();
        let first = integrator.to_class(&mut expander, "Twice", code).unwrap();
        let second = integrator.to_class(&mut expander, "Twice", code).unwrap();
        assert_eq!(second.source, first.source);
        assert!(expander.catalog().dynamic().is_empty());
    }

    #[test]
    fn test_line_numbers_are_kept() {
        let code = "import java.io.*;\n\nfunction int sq(int x) {\n  return x * x;\n}\nalgorithm {\n  numOfNodes n;\n  sort(getNodes());\n}";
        let unit = SourceIntegrator::default()
            .to_class(&mut Expander::default(), "Lines", code)
            .unwrap();
        // the class's own closing brace is the only added line
        assert_eq!(unit.source.lines().count(), code.lines().count() + 1);
        let line = |text: &str, needle: &str| text.lines().position(|l| l.contains(needle));
        assert_eq!(line(&unit.source, "getNodes().size()"), line(code, "numOfNodes"));
        assert_eq!(line(&unit.source, "Collections.sort"), line(code, "sort("));
    }

    #[test]
    fn test_macro_errors_propagate() {
        let err = SourceIntegrator::default()
            .to_class(&mut Expander::default(), "Bad", "for_outgoing(v) { }")
            .unwrap_err();
        assert!(matches!(err, crate::GalantError::Macro(_)));
        assert!(err.to_string().contains("for_outgoing"));
    }
}
