//! REPL command parsing and definitions
//!
//! Handles parsing of dot-commands (.help, .quit, etc.).

use anyhow::{anyhow, Result};

/// Available REPL commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Show help information
    Help,
    /// Exit the REPL
    Quit,
    /// Clear the screen
    Clear,
    /// Toggle quiet mode
    Quiet,
    /// Toggle debug mode
    Debug,
    /// List the macros currently known
    Macros,
    /// Forget functions defined in this session
    Reset,
    /// Show per-macro statistics
    Stats,
    /// Expand a file with the session's expander
    Load(String),
    /// Wrap a file in a Java class named by the second argument
    Class { file: String, name: String },
}

/// Parse a command string into a ReplCommand
pub fn parse_command(input: &str) -> Result<ReplCommand> {
    let trimmed = input.trim();

    let Some(body) = trimmed.strip_prefix('.') else {
        return Err(anyhow!("Commands must start with '.'"));
    };

    let parts: Vec<&str> = body.split_whitespace().collect();

    if parts.is_empty() {
        return Err(anyhow!("Empty command"));
    }

    match parts[0] {
        "help" | "h" => Ok(ReplCommand::Help),
        "quit" | "q" | "exit" => Ok(ReplCommand::Quit),
        "clear" | "cls" => Ok(ReplCommand::Clear),
        "quiet" => Ok(ReplCommand::Quiet),
        "debug" => Ok(ReplCommand::Debug),
        "macros" | "rules" => Ok(ReplCommand::Macros),
        "reset" => Ok(ReplCommand::Reset),
        "stats" | "statistics" => Ok(ReplCommand::Stats),
        "load" => {
            if parts.len() != 2 {
                return Err(anyhow!("Usage: .load <file>"));
            }
            Ok(ReplCommand::Load(parts[1].to_string()))
        }
        "class" => {
            if parts.len() != 3 {
                return Err(anyhow!("Usage: .class <file> <ClassName>"));
            }
            Ok(ReplCommand::Class {
                file: parts[1].to_string(),
                name: parts[2].to_string(),
            })
        }
        _ => Err(anyhow!("Unknown command: .{}", parts[0])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse_command(".help").unwrap(), ReplCommand::Help);
        assert_eq!(parse_command(".h").unwrap(), ReplCommand::Help);
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse_command(".quit").unwrap(), ReplCommand::Quit);
        assert_eq!(parse_command(".q").unwrap(), ReplCommand::Quit);
        assert_eq!(parse_command("  .exit  ").unwrap(), ReplCommand::Quit);
    }

    #[test]
    fn test_parse_session_commands() {
        assert_eq!(parse_command(".macros").unwrap(), ReplCommand::Macros);
        assert_eq!(parse_command(".reset").unwrap(), ReplCommand::Reset);
        assert_eq!(parse_command(".stats").unwrap(), ReplCommand::Stats);
    }

    #[test]
    fn test_parse_load() {
        assert_eq!(
            parse_command(".load dfs.alg").unwrap(),
            ReplCommand::Load("dfs.alg".to_string())
        );
    }

    #[test]
    fn test_parse_class() {
        assert_eq!(
            parse_command(".class dfs.alg DepthFirst").unwrap(),
            ReplCommand::Class {
                file: "dfs.alg".to_string(),
                name: "DepthFirst".to_string()
            }
        );
    }

    #[test]
    fn test_parse_invalid_command() {
        assert!(parse_command(".invalid").is_err());
        assert!(parse_command("help").is_err()); // Missing dot
        assert!(parse_command(".load").is_err()); // Missing argument
        assert!(parse_command(".class a.alg").is_err());
        assert!(parse_command(".").is_err());
    }
}
