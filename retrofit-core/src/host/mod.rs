//! Host files that carry templates
//!
//! A host is either a markup file (the whole file is the template) or a
//! TypeScript source file whose `Component` decorators hold templates as
//! string or template literals. Locators find those templates; the
//! [`Migrator`] runs the engine over each and splices the results back.

pub mod class_decorators;
pub mod literal;
pub mod markup;
pub mod migrator;
pub mod typed;

pub use class_decorators::ClassDecoratorLocator;
pub use literal::{LiteralKind, TemplateSpan};
pub use markup::MarkupLocator;
pub use migrator::{Migrator, SourceRewrite};
pub use typed::TypedSourceLocator;

use std::path::Path;

use strum_macros::{Display, EnumString, VariantNames};
use thiserror::Error;
use tree_sitter::{Node, Tree};

use crate::replace::ReplaceError;
use crate::source_utils::{first_error, node_text, offset_to_position};

/// Supported host kinds and their extensions
pub static SUPPORTED_EXTENSIONS: &[(FileKind, &[&str])] = &[
    (FileKind::Markup, &["html", "htm"]),
    (FileKind::TypeScript, &["ts", "mts", "cts"]),
    (FileKind::Tsx, &["tsx"]),
];

/// Errors that can occur while handling a host file
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Unsupported file kind: {0}")]
    Unsupported(String),
    #[error("Failed to parse source at {line}:{column}")]
    Parse { line: u32, column: u32 },
    #[error("TreeSitter error: {0}")]
    TreeSitter(String),
    #[error(transparent)]
    Replace(#[from] ReplaceError),
}

/// Kind of host file, decided by path suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FileKind {
    #[strum(to_string = "html", serialize = "htm", serialize = "markup")]
    Markup,
    #[strum(to_string = "ts", serialize = "typescript")]
    TypeScript,
    Tsx,
}

impl FileKind {
    /// Detect the kind from a file path extension
    pub fn detect(path: impl AsRef<Path>) -> Option<FileKind> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        SUPPORTED_EXTENSIONS
            .iter()
            .find(|(_, exts)| exts.contains(&ext.as_str()))
            .map(|(kind, _)| *kind)
    }

    /// Grammar for the host syntax; markup hosts have none
    pub fn language(self) -> Option<tree_sitter::Language> {
        match self {
            FileKind::Markup => None,
            FileKind::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            FileKind::Tsx => Some(tree_sitter_typescript::LANGUAGE_TSX.into()),
        }
    }
}

/// Host text plus its syntax tree (source kinds only)
pub struct SourceFile<'a> {
    text: &'a str,
    kind: FileKind,
    tree: Option<Tree>,
}

impl<'a> SourceFile<'a> {
    /// Parse host text. A source file with any ERROR or MISSING node is
    /// rejected rather than partially rewritten.
    pub fn parse(text: &'a str, kind: FileKind) -> Result<Self, HostError> {
        let Some(language) = kind.language() else {
            return Ok(SourceFile {
                text,
                kind,
                tree: None,
            });
        };

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| HostError::TreeSitter(e.to_string()))?;
        let tree = parser
            .parse(text, None)
            .ok_or_else(|| HostError::TreeSitter("parser produced no tree".to_string()))?;

        if let Some(error) = first_error(tree.root_node()) {
            let (line, column) = offset_to_position(text, error.start_byte());
            return Err(HostError::Parse { line, column });
        }

        Ok(SourceFile {
            text,
            kind,
            tree: Some(tree),
        })
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Root of the host syntax tree; `None` for markup hosts
    pub fn root(&self) -> Option<Node<'_>> {
        self.tree.as_ref().map(Tree::root_node)
    }
}

/// Finds component templates in a host file
pub trait TemplateLocator: Send + Sync {
    /// Object-literal arguments of the qualifying `Component` decorators
    fn component_configs<'t>(&self, file: &'t SourceFile<'_>) -> Vec<Node<'t>>;

    /// The `template` value of one decorator configuration
    fn template_literal<'t>(&self, config: Node<'t>, source: &str) -> Option<Node<'t>> {
        let value = property_value(config, source, "template", true)?;
        matches!(value.kind(), "string" | "template_string").then_some(value)
    }

    /// Template spans in document order. A miss is an empty list.
    fn locate_templates(&self, file: &SourceFile<'_>) -> Vec<TemplateSpan> {
        self.component_configs(file)
            .into_iter()
            .filter_map(|config| self.template_literal(config, file.text()))
            .filter_map(|literal| TemplateSpan::from_literal(literal, file.text()))
            .collect()
    }
}

/// Which decorator scan to run over source hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum LocatorKind {
    /// Every `Component` decorator, qualified names included
    #[default]
    Typed,
    /// Decorators attached to class declarations only
    Class,
}

static TYPED: TypedSourceLocator = TypedSourceLocator;
static CLASS: ClassDecoratorLocator = ClassDecoratorLocator;

impl LocatorKind {
    pub fn locator(self) -> &'static dyn TemplateLocator {
        match self {
            LocatorKind::Typed => &TYPED,
            LocatorKind::Class => &CLASS,
        }
    }
}

/// Object argument of a `Component` decorator call.
///
/// `qualified` also accepts callees like `ng.Component`. Anything that is
/// not a call with an object literal first argument is a miss.
pub(crate) fn component_config<'t>(
    decorator: Node<'t>,
    source: &str,
    qualified: bool,
) -> Option<Node<'t>> {
    let mut cursor = decorator.walk();
    let call = decorator
        .named_children(&mut cursor)
        .find(|n| n.kind() == "call_expression")?;

    let callee = call.child_by_field_name("function")?;
    let name = match callee.kind() {
        "identifier" => node_text(callee, source),
        "member_expression" if qualified => node_text(callee.child_by_field_name("property")?, source),
        _ => return None,
    };
    if name != "Component" {
        return None;
    }

    let arguments = call.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let first = arguments
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;
    (first.kind() == "object").then_some(first)
}

/// Value of the first `key: value` pair in an object literal.
///
/// `string_keys` also accepts quoted keys such as `'template'`.
pub(crate) fn property_value<'t>(
    object: Node<'t>,
    source: &str,
    key: &str,
    string_keys: bool,
) -> Option<Node<'t>> {
    let mut cursor = object.walk();
    let pair = object.named_children(&mut cursor).find(|pair| {
        if pair.kind() != "pair" {
            return false;
        }
        let Some(name) = pair.child_by_field_name("key") else {
            return false;
        };
        match name.kind() {
            "property_identifier" => node_text(name, source) == key,
            "string" if string_keys => {
                let text = node_text(name, source);
                text.len() >= 2 && text.get(1..text.len() - 1) == Some(key)
            }
            _ => false,
        }
    })?;
    pair.child_by_field_name("value")
}

/// Named children of `node` with the given kind
pub(crate) fn children_of_kind<'t>(node: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() == kind)
        .collect()
}
