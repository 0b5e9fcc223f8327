//! Markup parsing and round-trip rendering
//!
//! Markup is parsed with tree-sitter-html into a flat list of
//! [`MarkupElement`]s, one per start tag, in document order. Rendering splices
//! only the attribute regions of modified elements back into the original
//! text, so everything else stays byte-identical.
//!
//! Template text the grammar rejects (`{{ a && b }}`, a bare `&`, a stray end
//! tag) does not fail the parse. Those bytes are recorded as damaged ranges
//! and never rewritten; callers decide whether damage matters to them.

pub mod element;

pub use element::{Attribute, ClassList, MarkupElement, Quote};

use std::ops::Range;

use thiserror::Error;
use tree_sitter::Node;

use crate::replace::{apply_edits, ReplaceError};
use crate::source_utils::{node_text, offset_to_position};

/// Errors that can occur while parsing or rendering markup
#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("Failed to parse markup at {line}:{column}")]
    Parse { offset: usize, line: u32, column: u32 },
    #[error("TreeSitter error: {0}")]
    TreeSitter(String),
    #[error("Failed to render markup: {0}")]
    Render(#[from] ReplaceError),
}

impl MarkupError {
    pub(crate) fn parse_at(source: &str, offset: usize) -> Self {
        let (line, column) = offset_to_position(source, offset);
        MarkupError::Parse {
            offset,
            line,
            column,
        }
    }

    /// Byte offset of the failure within the markup, when known
    pub fn offset(&self) -> usize {
        match self {
            MarkupError::Parse { offset, .. } => *offset,
            _ => 0,
        }
    }
}

/// Parsed markup: the source text plus its elements
#[derive(Debug)]
pub struct MarkupDocument<'a> {
    source: &'a str,
    elements: Vec<MarkupElement>,
    damaged: Vec<Range<usize>>,
}

impl<'a> MarkupDocument<'a> {
    /// Parse markup text.
    ///
    /// Elements are read from start tags the grammar accepted. Everything it
    /// could not structure ends up in [`damaged`](Self::damaged).
    pub fn parse(source: &'a str) -> Result<Self, MarkupError> {
        let language: tree_sitter::Language = tree_sitter_html::LANGUAGE.into();
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| MarkupError::TreeSitter(e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| MarkupError::TreeSitter("parser produced no tree".to_string()))?;

        let mut tags = Vec::new();
        let mut damaged = Vec::new();
        sort_tags(tree.root_node(), false, &mut tags, &mut damaged);

        let elements = tags
            .into_iter()
            .filter_map(|tag| element_from_tag(tag, source))
            .collect();

        Ok(MarkupDocument {
            source,
            elements,
            damaged: merge_ranges(source, damaged),
        })
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn elements(&self) -> &[MarkupElement] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut [MarkupElement] {
        &mut self.elements
    }

    /// Byte ranges the grammar rejected, in document order. No element is
    /// read from them and rendering leaves them as they are.
    pub fn damaged(&self) -> &[Range<usize>] {
        &self.damaged
    }

    /// Damaged text, range by range
    pub fn damaged_text(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        self.damaged
            .iter()
            .filter_map(|range| Some((range.start, self.source.get(range.clone())?)))
    }

    /// Render the document, rewriting only modified elements
    pub fn render(&self) -> Result<String, MarkupError> {
        let edits = self
            .elements
            .iter()
            .filter_map(|element| element.edit(self.source))
            .collect();
        Ok(apply_edits(self.source, edits)?)
    }
}

/// Split a subtree into clean tags and damaged byte ranges.
///
/// A tag with an error inside is damaged as a whole. Outside tags, every
/// token under an ERROR node is damaged, and so is every MISSING token.
fn sort_tags<'t>(
    node: Node<'t>,
    in_error: bool,
    tags: &mut Vec<Node<'t>>,
    damaged: &mut Vec<Range<usize>>,
) {
    if matches!(node.kind(), "start_tag" | "self_closing_tag") {
        if node.has_error() {
            damaged.push(node.byte_range());
        } else {
            tags.push(node);
        }
        return;
    }

    let in_error = in_error || node.is_error();
    if node.child_count() == 0 {
        if in_error || node.is_missing() {
            damaged.push(node.byte_range());
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        sort_tags(child, in_error, tags, damaged);
    }
}

/// Join ranges that touch or are separated by whitespace only; drop empty ones
fn merge_ranges(source: &str, mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.retain(|range| !range.is_empty());
    ranges.sort_by_key(|range| range.start);

    let mut merged: Vec<Range<usize>> = Vec::new();
    for range in ranges {
        if let Some(last) = merged.last_mut() {
            let joined = range.start <= last.end
                || source
                    .get(last.end..range.start)
                    .is_some_and(|gap| gap.trim().is_empty());
            if joined {
                last.end = last.end.max(range.end);
                continue;
            }
        }
        merged.push(range);
    }
    merged
}

fn element_from_tag(tag: Node<'_>, source: &str) -> Option<MarkupElement> {
    let mut cursor = tag.walk();
    let mut tag_name: Option<Node<'_>> = None;
    let mut attributes = Vec::new();
    let mut prev_end = tag.start_byte();

    for child in tag.named_children(&mut cursor) {
        match child.kind() {
            "tag_name" => {
                tag_name = Some(child);
                prev_end = child.end_byte();
            }
            "attribute" => {
                let leading = source.get(prev_end..child.start_byte()).unwrap_or(" ");
                attributes.push(attribute_from_node(child, source, leading));
                prev_end = child.end_byte();
            }
            _ => {}
        }
    }

    let tag_name = tag_name?;
    let region = tag_name.end_byte()..prev_end;
    Some(MarkupElement::new(node_text(tag_name, source), attributes, region))
}

fn attribute_from_node(node: Node<'_>, source: &str, leading: &str) -> Attribute {
    let mut cursor = node.walk();
    let mut name = "";
    let mut value = None;
    let mut quote = None;

    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "attribute_name" => name = node_text(child, source),
            "attribute_value" => value = Some(node_text(child, source)),
            "quoted_attribute_value" => {
                let raw = node_text(child, source);
                quote = raw.chars().next();
                value = Some(raw.get(1..raw.len().saturating_sub(1)).unwrap_or(""));
            }
            _ => {}
        }
    }

    Attribute::parsed(name, value, quote, leading, node.byte_range())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_elements_in_order() {
        let doc = MarkupDocument::parse("<div id=a><button mat-button>x</button><br/></div>").unwrap();
        let names: Vec<&str> = doc.elements().iter().map(|e| e.tag_name()).collect();
        assert_eq!(names, vec!["div", "button", "br"]);
    }

    #[test]
    fn test_parse_attribute_forms() {
        let doc = MarkupDocument::parse(
            r#"<input disabled value=plain title="dq" alt='sq' placeholder="">"#,
        )
        .unwrap();
        let input = &doc.elements()[0];

        assert!(input.attributes().next().unwrap().is_valueless());
        assert_eq!(input.attribute("disabled"), Some(""));
        assert_eq!(input.attribute("value"), Some("plain"));
        assert_eq!(input.attribute("title"), Some("dq"));
        assert_eq!(input.attribute("alt"), Some("sq"));
        assert_eq!(input.attribute("placeholder"), Some(""));
        assert!(!input.attributes().nth(4).unwrap().is_valueless());
    }

    #[test]
    fn test_parse_binding_syntax() {
        let doc = MarkupDocument::parse(
            r#"<button (click)="go()" [attr.data-x]="'y'" *ngIf="ok" #ref>x</button>"#,
        )
        .unwrap();
        let button = &doc.elements()[0];
        assert_eq!(button.attribute("(click)"), Some("go()"));
        assert_eq!(button.attribute("[attr.data-x]"), Some("'y'"));
        assert_eq!(button.attribute("*ngIf"), Some("ok"));
        assert!(button.has_attribute("#ref"));
    }

    #[test]
    fn test_class_list_from_attribute() {
        let doc = MarkupDocument::parse(r#"<a class=" one  two one ">x</a>"#).unwrap();
        let classes: Vec<&str> = doc.elements()[0].classes().iter().collect();
        assert_eq!(classes, vec!["one", "two"]);
    }

    #[test]
    fn test_render_untouched_is_identical() {
        let source = "\n  <p  class=\"a\"\n     title='t'>{{ value }}</p>\n  <!-- note -->\n";
        let doc = MarkupDocument::parse(source).unwrap();
        assert_eq!(doc.render().unwrap(), source);
    }

    #[test]
    fn test_render_modified_element_only() {
        let source = "<p class=\"a\">x</p>\n<p class=\"a\">y</p>";
        let mut doc = MarkupDocument::parse(source).unwrap();
        doc.elements_mut()[1].set_attribute("hidden", None);
        assert_eq!(
            doc.render().unwrap(),
            "<p class=\"a\">x</p>\n<p class=\"a\" hidden>y</p>"
        );
    }

    #[test]
    fn test_unterminated_quote_damages_the_tag() {
        let source = "<div>\n<button class=\"open>x</button></div>";
        let doc = MarkupDocument::parse(source).unwrap();
        assert!(doc.elements().iter().all(|e| e.tag_name() != "button"));
        assert!(doc.damaged_text().any(|(_, text)| text.contains("open")));
    }

    #[test]
    fn test_rejected_text_is_damaged_not_fatal() {
        let source = "<p title=\"t\">{{ a && b }}</p>";
        let doc = MarkupDocument::parse(source).unwrap();
        let names: Vec<&str> = doc.elements().iter().map(|e| e.tag_name()).collect();
        assert_eq!(names, vec!["p"]);
        assert!(!doc.damaged().is_empty());
        assert!(doc.damaged_text().all(|(_, text)| !text.contains("title")));
        assert_eq!(doc.render().unwrap(), source);
    }

    #[test]
    fn test_clean_markup_has_no_damage() {
        let doc = MarkupDocument::parse("<p *ngIf=\"a && b > c\">&amp; {{ x }}</p>").unwrap();
        assert!(doc.damaged().is_empty());
    }

    #[test]
    fn test_merge_ranges() {
        let source = "ab  cd|ef";
        assert_eq!(merge_ranges(source, vec![4..6, 0..2, 3..3]), vec![0..6]);
        assert_eq!(merge_ranges(source, vec![0..2, 7..9]), vec![0..2, 7..9]);
    }
}
