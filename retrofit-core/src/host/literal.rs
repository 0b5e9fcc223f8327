//! Template literal spans: one delimiter layer off for the engine, back on
//! for the splice.

use std::ops::Range;

use tree_sitter::Node;

use crate::source_utils::node_text;

/// How a located template is delimited in its host file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// Backtick template literal
    Template,
    SingleQuoted,
    DoubleQuoted,
    /// Undelimited text (markup files)
    Raw,
}

impl LiteralKind {
    /// Kind of a string or template literal, judged by its opening delimiter
    pub fn of_literal(text: &str) -> Option<LiteralKind> {
        match text.chars().next()? {
            '`' => Some(LiteralKind::Template),
            '\'' => Some(LiteralKind::SingleQuoted),
            '"' => Some(LiteralKind::DoubleQuoted),
            _ => None,
        }
    }

    pub fn delimiter(self) -> Option<char> {
        match self {
            LiteralKind::Template => Some('`'),
            LiteralKind::SingleQuoted => Some('\''),
            LiteralKind::DoubleQuoted => Some('"'),
            LiteralKind::Raw => None,
        }
    }
}

/// A located template: the byte range of the whole literal in the host text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSpan {
    pub range: Range<usize>,
    pub kind: LiteralKind,
}

impl TemplateSpan {
    /// Span over an entire markup document
    pub fn raw(len: usize) -> Self {
        TemplateSpan {
            range: 0..len,
            kind: LiteralKind::Raw,
        }
    }

    /// Span for a `string` or `template_string` node
    pub fn from_literal(node: Node<'_>, source: &str) -> Option<Self> {
        let text = node_text(node, source);
        let kind = LiteralKind::of_literal(text)?;
        if text.len() < 2 {
            return None;
        }
        Some(TemplateSpan {
            range: node.byte_range(),
            kind,
        })
    }

    /// Byte offset in the host text where the template content begins
    pub fn content_start(&self) -> usize {
        match self.kind {
            LiteralKind::Raw => self.range.start,
            _ => self.range.start + 1,
        }
    }

    /// Template content with the delimiters stripped and escaped delimiters
    /// restored
    pub fn unwrap(&self, source: &str) -> String {
        let literal = source.get(self.range.clone()).unwrap_or("");
        let Some(delimiter) = self.kind.delimiter() else {
            return literal.to_string();
        };
        let inner = literal
            .get(1..literal.len().saturating_sub(1))
            .unwrap_or("");

        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some(next) if next == delimiter => out.push(next),
                Some(next) => {
                    out.push(c);
                    out.push(next);
                }
                None => out.push(c),
            }
        }
        out
    }

    /// Literal text for `content`, delimited and escaped like the original
    pub fn wrap(&self, content: &str) -> String {
        let Some(delimiter) = self.kind.delimiter() else {
            return content.to_string();
        };

        let mut out = String::with_capacity(content.len() + 2);
        out.push(delimiter);
        for c in content.chars() {
            if c == delimiter {
                out.push('\\');
            }
            out.push(c);
        }
        out.push(delimiter);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_of(source: &str) -> TemplateSpan {
        TemplateSpan {
            range: 0..source.len(),
            kind: LiteralKind::of_literal(source).unwrap(),
        }
    }

    #[test]
    fn test_unwrap_strips_one_layer() {
        let source = "`<a mat-button>x</a>`";
        assert_eq!(span_of(source).unwrap(source), "<a mat-button>x</a>");

        let source = r#""<b class='c'>""#;
        assert_eq!(span_of(source).unwrap(source), "<b class='c'>");
    }

    #[test]
    fn test_escaped_delimiters() {
        let source = r"'<b title=\'t\'>\n</b>'";
        let span = span_of(source);
        let content = span.unwrap(source);
        assert_eq!(content, r"<b title='t'>\n</b>");
        assert_eq!(span.wrap(&content), source);
    }

    #[test]
    fn test_escaped_backslash_before_delimiter() {
        let source = r"`a\\\`b`";
        let span = span_of(source);
        let content = span.unwrap(source);
        assert_eq!(content, r"a\\`b");
        assert_eq!(span.wrap(&content), source);
    }

    #[test]
    fn test_substitutions_pass_through() {
        let source = "`<p>${title}</p>`";
        let span = span_of(source);
        assert_eq!(span.unwrap(source), "<p>${title}</p>");
        assert_eq!(span.wrap(&span.unwrap(source)), source);
    }

    #[test]
    fn test_raw_span() {
        let source = "<p>\n</p>\n";
        let span = TemplateSpan::raw(source.len());
        assert_eq!(span.content_start(), 0);
        assert_eq!(span.unwrap(source), source);
        assert_eq!(span.wrap("<i></i>"), "<i></i>");
    }

    #[test]
    fn test_wrap_escapes_new_delimiters() {
        let span = TemplateSpan {
            range: 0..2,
            kind: LiteralKind::SingleQuoted,
        };
        assert_eq!(span.wrap("<a size='sm'>"), r"'<a size=\'sm\'>'");
        assert_eq!(span.content_start(), 1);
    }
}
