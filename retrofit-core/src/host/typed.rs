//! Decorator scan over the whole TypeScript tree

use tree_sitter::Node;

use super::{component_config, SourceFile, TemplateLocator};
use crate::source_utils::descendants;

/// Finds every `Component` decorator, wherever it is attached.
///
/// Accepts `@Component(...)` and qualified forms such as
/// `@ng.Component(...)`, and `template` keys written as identifiers or
/// strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedSourceLocator;

impl TemplateLocator for TypedSourceLocator {
    fn component_configs<'t>(&self, file: &'t SourceFile<'_>) -> Vec<Node<'t>> {
        let Some(root) = file.root() else {
            return Vec::new();
        };
        descendants(root, |n| n.kind() == "decorator")
            .into_iter()
            .filter_map(|decorator| component_config(decorator, file.text(), true))
            .collect()
    }
}
