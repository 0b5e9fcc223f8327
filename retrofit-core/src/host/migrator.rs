//! File-level adapter: locate templates, run the engine, splice results

use std::path::Path;

use tracing::{debug, warn};

use super::{FileKind, HostError, LocatorKind, MarkupLocator, SourceFile, TemplateLocator};
use crate::engine::Engine;
use crate::imports::{rewrite_component_imports, rewrite_imports};
use crate::replace::{apply_edits, Edit};
use crate::report::Diagnostic;
use crate::source_utils::offset_to_position;

/// Result of migrating one host text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRewrite {
    pub text: String,
    pub templates_rewritten: usize,
    pub elements_rewritten: usize,
    /// Import specifiers, symbols and decorator `imports` entries rewritten
    pub imports_rewritten: usize,
    /// Templates left unchanged because their markup failed to parse
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs one engine over host files
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    engine: Engine,
    locator: LocatorKind,
}

impl Migrator {
    pub fn new(engine: Engine, locator: LocatorKind) -> Self {
        Migrator { engine, locator }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Migrate file text, deciding the host kind from `path`
    pub fn migrate_source(&self, path: &Path, text: &str) -> Result<SourceRewrite, HostError> {
        let kind = FileKind::detect(path)
            .ok_or_else(|| HostError::Unsupported(path.display().to_string()))?;
        self.migrate_text(text, kind)
    }

    /// Migrate host text of a known kind.
    ///
    /// Import edits and template edits are computed against the same parse
    /// and applied together. A template whose markup fails to parse is left
    /// as it was and reported as a diagnostic.
    pub fn migrate_text(&self, text: &str, kind: FileKind) -> Result<SourceRewrite, HostError> {
        let file = SourceFile::parse(text, kind)?;
        let migration = self.engine.migration();
        let locator: &dyn TemplateLocator = match kind {
            FileKind::Markup => &MarkupLocator,
            _ => self.locator.locator(),
        };

        let mut rewrite = SourceRewrite::default();
        let mut edits: Vec<Edit> = Vec::new();

        if kind != FileKind::Markup {
            let configs = locator.component_configs(&file);
            edits.extend(rewrite_imports(&file, migration));
            edits.extend(rewrite_component_imports(&configs, text, migration));
            rewrite.imports_rewritten = edits.len();
        }

        let spans = locator.locate_templates(&file);
        if spans.is_empty() {
            debug!(kind = %kind, locator = %self.locator, "no component template found");
        }

        for span in spans {
            let content = span.unwrap(text);
            match self.engine.try_transform_markup(&content) {
                Ok(result) => {
                    if result.text == content {
                        continue;
                    }
                    edits.push(Edit::new(span.range.clone(), span.wrap(&result.text)));
                    rewrite.templates_rewritten += 1;
                    rewrite.elements_rewritten += result.elements_rewritten;
                }
                Err(e) => {
                    let (line, column) = offset_to_position(text, span.content_start() + e.offset());
                    warn!(line, column, "template left unchanged: {}", e);
                    rewrite.diagnostics.push(Diagnostic {
                        line,
                        column,
                        message: e.to_string(),
                    });
                }
            }
        }

        rewrite.text = apply_edits(text, edits)?;
        Ok(rewrite)
    }
}
