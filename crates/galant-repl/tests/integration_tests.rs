use std::sync::Arc;

use galant_core::GalantConfig;
use galant_repl::repl::{format_stats, CapturingNotifier, Repl, ReplCommand};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn repl() -> Repl {
    Repl::new(&GalantConfig::default())
}

#[test]
fn test_functions_persist_between_inputs() {
    let mut repl = repl();

    repl.execute("function int sq(int x) { return x * x; }").unwrap();
    let (output, _duration) = repl.execute("print(sq(3));").unwrap();
    assert_eq!(output, "print(sq.get().invoke(3));");

    // a later input may redefine a function
    repl.execute("function int sq(int a, int b) { return a * b; }").unwrap();
    let (output, _) = repl.execute("print(sq(3, 4));").unwrap();
    assert_eq!(output, "print(sq.get().invoke(new Object[]{3, 4}));");
}

#[test]
fn test_retry_after_error() {
    let mut repl = repl();

    assert!(repl.execute("function void f() { } for_nodes(v").is_err());
    assert!(repl.expander().catalog().dynamic().is_empty());
    let (output, _) = repl.execute("function void f() { } for_nodes(v) { }").unwrap();
    assert!(output.ends_with("for(Node v : getNodes()) { }"));
}

#[test]
fn test_class_twice_in_one_session() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("square.alg");
    std::fs::write(&path, "function int sq(int x) { return x * x; }\nalgorithm { sq(2); }").unwrap();
    let command = ReplCommand::Class {
        file: path.display().to_string(),
        name: "Square".to_string(),
    };

    let mut repl = repl();
    let first = repl.handle_command(command.clone()).unwrap();
    let second = repl.handle_command(command).unwrap();
    assert_eq!(second, first);
    assert!(first.contains("{ sq.set($sq); }\npublic void run() { sq.get().invoke(2); }"));
}

#[test]
fn test_reset_forgets_functions() {
    let mut repl = repl();

    repl.execute("function void hello() { }").unwrap();
    let result = repl.handle_command(ReplCommand::Reset).unwrap();
    assert_eq!(result, "Forgot 1 function(s).");

    let (output, _) = repl.execute("hello();").unwrap();
    assert_eq!(output, "hello();");
    assert!(repl.expander().catalog().dynamic().is_empty());
}

#[test]
fn test_macros_lists_builtins_and_functions() {
    let mut repl = repl();

    let listing = repl.handle_command(ReplCommand::Macros).unwrap();
    assert!(listing.contains("for_outgoing"));
    assert!(listing.contains("No functions defined."));

    repl.execute("function int one() { return 1; }").unwrap();
    let listing = repl.handle_command(ReplCommand::Macros).unwrap();
    assert!(listing.contains("Functions:\n  one"));
}

#[test]
fn test_debug_mode_appends_summary() {
    let mut repl = repl();
    repl.set_debug(true);

    let (output, _) = repl.execute("bool done;").unwrap();
    assert_eq!(
        output,
        "boolean done;\n// 1 rewrite(s) in 1 pass(es)\n//   bool: 1"
    );
}

#[test]
fn test_stats_after_expansion() {
    let mut repl = repl();
    assert_eq!(
        repl.handle_command(ReplCommand::Stats).unwrap(),
        "No macros applied yet."
    );

    repl.execute("for_nodes(v) { } for_nodes(u) { }").unwrap();
    let stats = format_stats(repl.expander());
    assert!(stats.starts_with("Macro Statistics:"));
    assert!(stats.contains("for_nodes"));
}

#[test]
fn test_load_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("count.alg");
    std::fs::write(&path, "numOfEdges m;").unwrap();

    let mut repl = repl();
    let output = repl
        .handle_command(ReplCommand::Load(path.display().to_string()))
        .unwrap();
    assert_eq!(output, "int m = getEdges().size();");

    assert!(repl
        .handle_command(ReplCommand::Load("missing.alg".to_string()))
        .is_err());
}

#[test]
fn test_class_wraps_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mark.alg");
    std::fs::write(&path, "for_nodes(v) { v.mark(); }").unwrap();

    let mut repl = repl();
    let source = repl
        .handle_command(ReplCommand::Class {
            file: path.display().to_string(),
            name: "MarkAll".to_string(),
        })
        .unwrap();
    assert!(source.starts_with("package edu.ncsu.csc.Galant.algorithm.code.compiled;"));
    assert!(source.ends_with(
        "public class MarkAll extends Algorithm{public void run() {for(Node v : getNodes()) { v.mark(); }\n}\n}"
    ));
}

#[test]
fn test_quit_and_toggles() {
    let mut repl = repl();
    assert_eq!(
        repl.handle_command(ReplCommand::Quiet).unwrap(),
        "Quiet mode: on"
    );
    assert!(repl.is_quiet());
    assert_eq!(
        repl.handle_command(ReplCommand::Debug).unwrap(),
        "Debug mode: on"
    );

    assert!(repl.is_running());
    repl.handle_command(ReplCommand::Quit).unwrap();
    assert!(!repl.is_running());
}

#[test]
fn test_notifier_capture() {
    let capture = Arc::new(CapturingNotifier::new());
    let mut repl = repl();
    repl.set_notifier(Box::new(Arc::clone(&capture)));

    let (output, duration) = repl.execute("edgesList all;").unwrap();
    repl.notifier().on_result(&output, duration, true);
    repl.notifier().on_error("boom");

    assert_eq!(
        capture.lines(),
        vec!["List<Edge> all = getEdges();".to_string(), "error: boom".to_string()]
    );
}
