//! Markup host locator
//!
//! A `.html` file has no decorators to scan; its whole text is the template.

use tree_sitter::Node;

use super::{SourceFile, TemplateLocator, TemplateSpan};

/// Markup hosts: the whole file is one template
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupLocator;

impl TemplateLocator for MarkupLocator {
    fn component_configs<'t>(&self, _file: &'t SourceFile<'_>) -> Vec<Node<'t>> {
        Vec::new()
    }

    fn locate_templates(&self, file: &SourceFile<'_>) -> Vec<TemplateSpan> {
        vec![TemplateSpan::raw(file.text().len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FileKind, LiteralKind};

    #[test]
    fn test_whole_file_is_the_template() {
        let source = "<div>\n  <a mat-button>x</a>\n</div>\n";
        let file = SourceFile::parse(source, FileKind::Markup).unwrap();
        let spans = MarkupLocator.locate_templates(&file);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].range, 0..source.len());
        assert_eq!(spans[0].kind, LiteralKind::Raw);
    }
}
