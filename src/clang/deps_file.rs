//! Make-style dependency file generation and parsing
//!
//! Re-runs each compile command with `-M -MF <file>` so the compiler emits
//! the full set of headers the translation unit depends on, then parses the
//! resulting make rule into plain paths.

use super::compile_commands::CompileCommand;
use crate::exec::CommandRunner;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Seam between the resolver and the compiler invocation, so tests can feed
/// canned dependency sets without a toolchain present.
pub trait DependencyFileSource: Send + Sync {
    /// Returns the dependency file paths implied by one compile command.
    /// Failures are contained: a command that cannot be analyzed yields an
    /// empty set.
    fn dependency_file_paths(&self, output_dir: &Path, command: &CompileCommand) -> HashSet<String>;
}

/// [`DependencyFileSource`] that shells out to the command's own compiler.
pub struct CompilerDepsFileManager {
    runner: Arc<dyn CommandRunner>,
    cleanup: bool,
}

impl CompilerDepsFileManager {
    pub fn new(runner: Arc<dyn CommandRunner>, cleanup: bool) -> Self {
        Self { runner, cleanup }
    }
}

impl DependencyFileSource for CompilerDepsFileManager {
    fn dependency_file_paths(&self, output_dir: &Path, command: &CompileCommand) -> HashSet<String> {
        debug!(source = %command.file, "Analyzing source file");

        let tokens = command.tokens();
        let Some((compiler, args)) = tokens.split_first() else {
            warn!(source = %command.file, "Compile command is empty; skipping");
            return HashSet::new();
        };

        let deps_path = output_dir.join(format!("deps_{}.mk", Uuid::new_v4()));
        let mut full_args: Vec<&str> = args.iter().map(String::as_str).collect();
        let deps_path_str = deps_path.to_string_lossy().into_owned();
        full_args.extend(["-M", "-MF", &deps_path_str]);

        let working_dir = PathBuf::from(&command.directory);
        match self.runner.run(compiler, &full_args, &working_dir) {
            Ok(output) if !output.succeeded() => {
                warn!(
                    source = %command.file,
                    exit_code = ?output.exit_code,
                    "Compiler returned nonzero while generating dependency list"
                );
            }
            Err(err) => {
                warn!(source = %command.file, error = %err, "Failed to run compiler for dependency list");
                return HashSet::new();
            }
            Ok(_) => {}
        }

        let paths = match fs::read_to_string(&deps_path) {
            Ok(content) => parse_deps_file(&content),
            Err(err) => {
                warn!(
                    deps_file = %deps_path.display(),
                    error = %err,
                    "Dependency file was not produced"
                );
                HashSet::new()
            }
        };

        if self.cleanup {
            let _ = fs::remove_file(&deps_path);
        }

        paths
    }
}

/// Parses a make rule of the form `target.o: dep1 dep2 \\\n dep3 ...` into
/// the set of dependency paths. The target token and continuation
/// backslashes are discarded.
pub fn parse_deps_file(content: &str) -> HashSet<String> {
    content
        .replace("\\\n", " ")
        .split_whitespace()
        .filter(|token| *token != "\\")
        .filter(|token| !token.ends_with(':'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_line_rule() {
        let parsed = parse_deps_file("main.o: main.c /usr/include/stdio.h");
        assert_eq!(parsed.len(), 2);
        assert!(parsed.contains("main.c"));
        assert!(parsed.contains("/usr/include/stdio.h"));
    }

    #[test]
    fn test_parse_continuation_lines() {
        let content = "main.o: main.c \\\n  /usr/include/stdio.h \\\n  /usr/include/stdlib.h\n";
        let parsed = parse_deps_file(content);
        assert_eq!(parsed.len(), 3);
        assert!(parsed.contains("/usr/include/stdlib.h"));
    }

    #[test]
    fn test_parse_drops_stray_backslash_tokens() {
        let parsed = parse_deps_file("main.o: main.c \\ /usr/include/stdio.h");
        assert!(!parsed.contains("\\"));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_parse_duplicate_paths_collapse() {
        let parsed = parse_deps_file("a.o: x.h x.h\nb.o: x.h");
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_parse_empty_content() {
        assert!(parse_deps_file("").is_empty());
    }
}
