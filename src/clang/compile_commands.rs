//! compile_commands.json parsing

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One entry of a JSON compilation database. Either `command` (a single
/// shell string) or `arguments` (pre-split) is present.
#[derive(Debug, Clone, Deserialize)]
pub struct CompileCommand {
    pub directory: String,
    pub file: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
}

impl CompileCommand {
    /// The command as an argv-style token list, preferring the pre-split
    /// `arguments` form when both are present.
    pub fn tokens(&self) -> Vec<String> {
        if let Some(arguments) = &self.arguments {
            if !arguments.is_empty() {
                return arguments.clone();
            }
        }
        self.command
            .as_deref()
            .map(split_command)
            .unwrap_or_default()
    }
}

/// Parses the database at `path` into its ordered command sequence.
pub fn parse_compile_commands(path: &Path) -> Result<Vec<CompileCommand>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open compilation database {}", path.display()))?;
    let commands: Vec<CompileCommand> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse compilation database {}", path.display()))?;
    Ok(commands)
}

/// Splits a shell command string into tokens, honoring double quotes and
/// backslash-escaped spaces. Compilation databases do not nest quoting any
/// deeper than this in practice.
fn split_command(command: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in command.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
