use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ecosystem-agnostic dependency discovery for source trees
#[derive(Parser, Debug)]
#[command(
    name = "bomscout",
    about = "Scans a source tree for build ecosystems and extracts a deduplicated bill of materials",
    version,
    long_about = "bomscout walks a source tree, asks every registered detector (npm, gradle, \
                  conda, clang) whether it recognizes each directory, runs the applicable \
                  extractions, and assembles the results into BOM documents."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Verbose output (debug level)")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Scan a source tree and extract its bill of materials",
        long_about = "Examples:\n  \
                      bomscout scan\n  \
                      bomscout scan /path/to/repo\n  \
                      bomscout scan --aggregate everything\n  \
                      bomscout scan --project-name myapp --project-version 1.2.3"
    )]
    Scan(ScanArgs),

    #[command(about = "List the registered detectors")]
    Detectors,
}

#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    #[arg(
        value_name = "PATH",
        help = "Source tree to scan (defaults to current directory)"
    )]
    pub source_path: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        help = "Directory BOM documents and scratch files are written to"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "N", help = "Maximum directory depth to search")]
    pub depth: Option<usize>,

    #[arg(
        long,
        value_name = "TYPES",
        help = "Comma-separated detector types to skip (clang,conda,gradle,npm)"
    )]
    pub exclude_detectors: Option<String>,

    #[arg(long, value_name = "NAME", help = "Explicit project name")]
    pub project_name: Option<String>,

    #[arg(long, value_name = "VERSION", help = "Explicit project version")]
    pub project_version: Option<String>,

    #[arg(
        long,
        value_name = "TYPE",
        help = "Detector type whose name/version suggestion is preferred"
    )]
    pub preferred_detector: Option<String>,

    #[arg(
        long,
        value_name = "NAME",
        help = "Merge all code locations into one document of this name"
    )]
    pub aggregate: Option<String>,

    #[arg(
        long,
        value_name = "SCHEME",
        help = "Version fallback scheme when nothing declared one (text|timestamp)"
    )]
    pub version_scheme: Option<String>,

    #[arg(
        long,
        value_name = "TEXT",
        help = "Fixed fallback version used by the text scheme"
    )]
    pub version_text: Option<String>,

    #[arg(long, help = "Keep intermediate dependency files after extraction")]
    pub no_cleanup: bool,

    #[arg(long, help = "Disable the interactive progress bar")]
    pub no_progress: bool,
}
