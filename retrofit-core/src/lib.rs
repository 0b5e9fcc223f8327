//! retrofit-core: template-aware UI vocabulary migrations
//!
//! This library provides:
//! - A declarative migration record (marker attributes and classes, facet
//!   value tables, import rules)
//! - TreeSitter-based markup parsing with byte-preserving round trips
//! - Template location in TypeScript component decorators
//! - Import symbol rewriting
//! - Parallel batch processing with per-file reports

pub mod engine;
pub mod host;
pub mod imports;
pub mod markup;
pub mod migration;
pub mod parallel;
pub mod replace;
pub mod report;
pub mod rewrite;
pub mod source_utils;

pub use engine::{Engine, MarkupRewrite};
pub use host::{
    FileKind, HostError, LocatorKind, Migrator, SourceFile, SourceRewrite, TemplateLocator,
    TemplateSpan, SUPPORTED_EXTENSIONS,
};
pub use markup::{MarkupDocument, MarkupElement, MarkupError};
pub use migration::{ConfigError, Migration};
pub use parallel::{expand_globs, filter_supported_files, migrate_file, process_files_parallel};
pub use replace::{apply_edits, write_if_changed, Edit, ReplaceError};
pub use report::{format_reports, Diagnostic, FileReport, FileStatus, ReportFormat, Summary};
pub use rewrite::RewriteRule;
