//! Template rewrite engine
//!
//! Parses markup, selects elements with the rewrite rule, rewrites them in
//! place and renders the result. Either the whole pipeline succeeds or the
//! input passes through untouched.
//!
//! Markup the grammar rejects only fails the pipeline when it mentions a
//! legacy marker; anywhere else it is text the rewrite never touches.

use tracing::warn;

use crate::markup::{MarkupDocument, MarkupError};
use crate::migration::{ConfigError, Migration};
use crate::rewrite::RewriteRule;

/// Result of a successful markup transformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupRewrite {
    /// Rendered markup
    pub text: String,
    /// Number of elements the rule matched and rewrote
    pub elements_rewritten: usize,
}

/// Rewrite engine bound to one migration definition
#[derive(Debug, Clone)]
pub struct Engine {
    migration: Migration,
}

impl Engine {
    /// Engine over a migration the caller has already validated
    pub fn new(migration: Migration) -> Self {
        Engine { migration }
    }

    /// Validate `migration`, then build the engine
    pub fn try_new(migration: Migration) -> Result<Self, ConfigError> {
        migration.validate()?;
        Ok(Engine::new(migration))
    }

    pub fn migration(&self) -> &Migration {
        &self.migration
    }

    /// Transform markup, returning the original text on any failure.
    ///
    /// Failures are reported as `warn` events.
    pub fn transform_markup(&self, text: &str) -> String {
        match self.try_transform_markup(text) {
            Ok(rewrite) => rewrite.text,
            Err(e) => {
                warn!(migration = %self.migration.name, "markup left unchanged: {}", e);
                text.to_string()
            }
        }
    }

    /// Transform markup, surfacing parse and render failures
    pub fn try_transform_markup(&self, text: &str) -> Result<MarkupRewrite, MarkupError> {
        let rule = RewriteRule::new(&self.migration);
        let mut document = MarkupDocument::parse(text)?;

        if let Some((offset, _)) = document
            .damaged_text()
            .find(|(_, raw)| rule.mentions_markers(raw))
        {
            return Err(MarkupError::parse_at(text, offset));
        }

        // Select everything first so rewriting never changes what matched
        let selected: Vec<usize> = document
            .elements()
            .iter()
            .enumerate()
            .filter(|(_, element)| rule.matches(element))
            .map(|(i, _)| i)
            .collect();

        for &index in &selected {
            rule.apply(&mut document.elements_mut()[index]);
        }

        Ok(MarkupRewrite {
            text: document.render()?,
            elements_rewritten: selected.len(),
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Migration::builtin().clone())
    }
}
