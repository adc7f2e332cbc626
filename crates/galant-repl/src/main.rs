use std::{
    fs,
    io::{self, IsTerminal, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use galant_core::{init_tracing, GalantConfig};
use galant_repl::repl::{format_stats, LineProcessResult, MultiLineCollector, Repl};

fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("galant")
        .version(galant_core::VERSION)
        .about("Expands Galant algorithm macros into Java")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Algorithm file to expand; '-' reads stdin")
                .index(1),
        )
        .arg(
            Arg::new("class")
                .long("class")
                .value_name("NAME")
                .help("Wrap the expanded code in a Java class with this name"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("JSON configuration file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .help("Write the result here instead of stdout"),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Print per-macro statistics to stderr")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => GalantConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => GalantConfig::default(),
    };
    config.debug |= matches.get_flag("debug");

    // Initialize logging
    init_tracing(config.debug);

    let input_file = matches.get_one::<String>("file").cloned();
    if input_file.is_some() || !io::stdin().is_terminal() {
        return run_batch(&config, &matches, input_file);
    }

    println!("Galant REPL v{}", galant_core::VERSION);
    if config.debug {
        println!("Debug mode: enabled");
    }
    println!("Type .help for help, .quit to exit");
    println!();

    let mut repl = Repl::new(&config);
    run_repl(&mut repl)
}

/// Expand one file (or stdin) and write the result
fn run_batch(config: &GalantConfig, matches: &ArgMatches, input_file: Option<String>) -> Result<()> {
    let code = match input_file.as_deref() {
        Some("-") | None => {
            let mut code = String::new();
            io::stdin().read_to_string(&mut code)?;
            code
        }
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?
        }
    };

    let mut expander = config.expander();
    let output = match matches.get_one::<String>("class") {
        Some(name) => config.integrator().to_class(&mut expander, name, &code)?.source,
        None => expander.expand(&code)?,
    };

    match matches.get_one::<String>("output") {
        Some(path) => {
            let path = PathBuf::from(path);
            fs::write(&path, &output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => println!("{output}"),
    }

    if matches.get_flag("stats") {
        eprintln!("{}", format_stats(&expander));
    }
    Ok(())
}

fn run_repl(repl: &mut Repl) -> Result<()> {
    use rustyline::{error::ReadlineError, DefaultEditor};

    let mut rl = DefaultEditor::new()?;
    let mut multiline = MultiLineCollector::new();
    let mut in_eval_mode = false;
    let mut eval_buffer = String::new();

    while repl.is_running() {
        let prompt = if in_eval_mode {
            ">> "
        } else {
            multiline.get_prompt()
        };

        match rl.readline(prompt) {
            Ok(line) => {
                if in_eval_mode {
                    // Accumulate until a single '.'
                    if line.trim() == "." {
                        rl.add_history_entry(&eval_buffer)?;
                        match repl.execute(&eval_buffer) {
                            Ok((output, duration)) => {
                                repl.notifier()
                                    .on_result(&output, duration, repl.is_quiet());
                            }
                            Err(e) => repl.notifier().on_error(&format!("Error: {e}")),
                        }
                        eval_buffer.clear();
                        in_eval_mode = false;
                    } else {
                        if !eval_buffer.is_empty() {
                            eval_buffer.push('\n');
                        }
                        eval_buffer.push_str(&line);
                    }
                    continue;
                }

                let trimmed = line.trim();
                if trimmed.is_empty() && !multiline.is_collecting() {
                    continue;
                }

                if trimmed == ".eval" && !multiline.is_collecting() {
                    in_eval_mode = true;
                    repl.notifier()
                        .on_output("Entering eval mode. End with '.' on a line by itself.");
                    continue;
                }

                if trimmed.starts_with('.') && !multiline.is_collecting() {
                    rl.add_history_entry(&line)?;
                    match repl.parse_input(trimmed) {
                        Ok(command) => match repl.handle_command(command) {
                            Ok(output) => repl.notifier().on_output(&output),
                            Err(e) => repl.notifier().on_error(&format!("Error: {e:#}")),
                        },
                        Err(e) => repl.notifier().on_error(&format!("Error: {e}")),
                    }
                    continue;
                }

                match multiline.process_line(&line) {
                    LineProcessResult::Complete(code) => {
                        rl.add_history_entry(&code)?;
                        match repl.execute(&code) {
                            Ok((output, duration)) => {
                                repl.notifier()
                                    .on_result(&output, duration, repl.is_quiet());
                            }
                            Err(e) => repl.notifier().on_error(&format!("Error: {e}")),
                        }
                    }
                    LineProcessResult::NeedMore => {}
                }
            }
            Err(ReadlineError::Interrupted) => {
                if in_eval_mode {
                    println!("^C");
                    eval_buffer.clear();
                    in_eval_mode = false;
                } else if multiline.is_collecting() {
                    println!("^C");
                    multiline.reset();
                } else {
                    println!("Use .quit to exit");
                }
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    repl.show_exit_stats();
    Ok(())
}
