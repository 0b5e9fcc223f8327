//! CLI argument parsing using clap

use std::path::PathBuf;

use clap::Parser;

/// Migrate Material button markup to the Rocket button vocabulary
#[derive(Parser, Debug)]
#[command(name = "retrofit")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Preview what would change in a project
    retrofit "src/**/*.component.ts" "src/**/*.html"

    # Rewrite files in place
    retrofit "src/**/*.ts" --write

    # CI: fail if any file still needs migrating
    retrofit "src/**/*.html" --check

    # Transform a single template from stdin
    cat button.html | retrofit --stdin-kind html

    # Read file paths from stdin
    git ls-files '*.ts' | retrofit --write -o json
"#)]
pub struct Args {
    /// Files to process (supports glob patterns like "src/**/*.ts")
    #[arg()]
    pub files: Vec<String>,

    /// Transform source text from stdin to stdout: html, ts or tsx
    #[arg(long = "stdin-kind")]
    pub stdin_kind: Option<String>,

    /// Write changed files back to disk
    #[arg(short = 'w', long = "write")]
    pub write: bool,

    /// Exit 1 if any file would change
    #[arg(long = "check", conflicts_with = "write")]
    pub check: bool,

    /// Template locator for source files: typed (default) or class
    #[arg(long = "locator", default_value = "typed")]
    pub locator: String,

    /// Migration definition (TOML) replacing the built-in button migration
    #[arg(short = 'm', long = "migration")]
    pub migration: Option<PathBuf>,

    /// Report format: text (default) or json
    #[arg(short = 'o', long = "output", default_value = "text")]
    pub output: String,

    /// Number of parallel workers
    #[arg(short = 'c', long = "concurrency")]
    pub concurrency: Option<usize>,

    /// Show verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["retrofit", "a.html"]);
        assert_eq!(args.files, vec!["a.html"]);
        assert_eq!(args.locator, "typed");
        assert_eq!(args.output, "text");
        assert!(!args.write && !args.check);
    }

    #[test]
    fn test_check_conflicts_with_write() {
        assert!(Args::try_parse_from(["retrofit", "--check", "--write", "a.html"]).is_err());
    }
}
