//! Decorator scan anchored on class declarations

use tree_sitter::Node;

use super::{children_of_kind, component_config, property_value, SourceFile, TemplateLocator};
use crate::source_utils::descendants;

const CLASS_KINDS: &[&str] = &["class_declaration", "abstract_class_declaration", "class"];

/// Finds `Component` decorators on classes only.
///
/// Decorators written before `export` attach to the export statement, so
/// both places are checked. The callee must be the plain identifier
/// `Component` and the `template` key an identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassDecoratorLocator;

impl ClassDecoratorLocator {
    fn class_decorators<'t>(class: Node<'t>) -> Vec<Node<'t>> {
        let mut decorators = children_of_kind(class, "decorator");
        if let Some(parent) = class.parent().filter(|p| p.kind() == "export_statement") {
            decorators.extend(children_of_kind(parent, "decorator"));
        }
        decorators
    }
}

impl TemplateLocator for ClassDecoratorLocator {
    fn component_configs<'t>(&self, file: &'t SourceFile<'_>) -> Vec<Node<'t>> {
        let Some(root) = file.root() else {
            return Vec::new();
        };

        let mut configs: Vec<Node<'t>> = descendants(root, |n| CLASS_KINDS.contains(&n.kind()))
            .into_iter()
            .flat_map(Self::class_decorators)
            .filter_map(|decorator| component_config(decorator, file.text(), false))
            .collect();
        configs.sort_by_key(|n| n.start_byte());
        configs
    }

    fn template_literal<'t>(&self, config: Node<'t>, source: &str) -> Option<Node<'t>> {
        let value = property_value(config, source, "template", false)?;
        matches!(value.kind(), "string" | "template_string").then_some(value)
    }
}
