//! Byte-range text replacement.
//!
//! Edits are computed against the original text and applied in a single
//! ascending pass. The replacement text is used as-is (literal splice; the
//! caller is responsible for escaping/wrapping).

use std::fs;
use std::io;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

/// Replace `range` of the original text with `text`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub text: String,
}

impl Edit {
    pub fn new(range: Range<usize>, text: impl Into<String>) -> Self {
        Edit {
            range,
            text: text.into(),
        }
    }

    /// Zero-width insertion at `offset`
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Edit::new(offset..offset, text)
    }
}

/// Errors that can occur during replacement.
#[derive(Error, Debug)]
pub enum ReplaceError {
    /// I/O error writing a file.
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    /// Two edits overlap, making replacement ambiguous.
    #[error("overlapping edits at {}..{} and {}..{}, replacement is ambiguous", first.0, first.1, second.0, second.1)]
    OverlappingEdits {
        first: (usize, usize),
        second: (usize, usize),
    },
    /// An edit does not fall on character boundaries of the text.
    #[error("edit {start}..{end} is out of bounds for text of length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },
}

/// Apply edits to `content` and return the new text.
///
/// Edits are sorted by position; identical edits are applied once.
///
/// # Errors
///
/// Returns an error if two edits overlap or an edit range is not a valid
/// character range of `content`.
pub fn apply_edits(content: &str, mut edits: Vec<Edit>) -> Result<String, ReplaceError> {
    if edits.is_empty() {
        return Ok(content.to_string());
    }

    // Stable: insertions at the same offset keep their order
    edits.sort_by_key(|e| (e.range.start, e.range.end));
    edits.dedup();

    for edit in &edits {
        let Range { start, end } = edit.range;
        if start > end
            || end > content.len()
            || !content.is_char_boundary(start)
            || !content.is_char_boundary(end)
        {
            return Err(ReplaceError::OutOfBounds {
                start,
                end,
                len: content.len(),
            });
        }
    }

    for pair in edits.windows(2) {
        let (current, next) = (&pair[0].range, &pair[1].range);
        if current.end > next.start {
            return Err(ReplaceError::OverlappingEdits {
                first: (current.start, current.end),
                second: (next.start, next.end),
            });
        }
    }

    let mut result = String::with_capacity(content.len());
    let mut last_end = 0;
    for edit in &edits {
        result.push_str(&content[last_end..edit.range.start]);
        result.push_str(&edit.text);
        last_end = edit.range.end;
    }
    result.push_str(&content[last_end..]);

    Ok(result)
}

/// Write `updated` to `path` only if it differs from `original`.
///
/// Returns whether the file was written.
pub fn write_if_changed(path: &Path, original: &str, updated: &str) -> Result<bool, ReplaceError> {
    if original == updated {
        return Ok(false);
    }
    fs::write(path, updated).map_err(|e| ReplaceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_edits_single() {
        let content = r#"{"key": "old"}"#;
        let result = apply_edits(content, vec![Edit::new(8..13, "\"new\"")]).unwrap();
        assert_eq!(result, r#"{"key": "new"}"#);
    }

    #[test]
    fn test_apply_edits_multiple_unsorted() {
        let edits = vec![Edit::new(8..11, "xxx"), Edit::new(0..3, "xxx")];
        assert_eq!(apply_edits("aaa bbb aaa", edits).unwrap(), "xxx bbb xxx");
    }

    #[test]
    fn test_apply_edits_multiline() {
        let result = apply_edits("line1\nOLD\nline3", vec![Edit::new(6..9, "NEW")]).unwrap();
        assert_eq!(result, "line1\nNEW\nline3");
    }

    #[test]
    fn test_apply_edits_overlapping_error() {
        let edits = vec![Edit::new(0..4, "x"), Edit::new(2..6, "y")];
        let result = apply_edits("abcdefgh", edits);
        assert!(matches!(result, Err(ReplaceError::OverlappingEdits { .. })));
    }

    #[test]
    fn test_apply_edits_dedup() {
        let edits = vec![Edit::new(0..5, "world"), Edit::new(0..5, "world")];
        assert_eq!(apply_edits("hello", edits).unwrap(), "world");
    }

    #[test]
    fn test_apply_edits_insert_before_replace() {
        let edits = vec![Edit::new(7..10, "'b'"), Edit::insert(7, "{ X } from ")];
        assert_eq!(apply_edits("import 'a';", edits).unwrap(), "import { X } from 'b';");
    }

    #[test]
    fn test_apply_edits_empty() {
        assert_eq!(apply_edits("same", Vec::new()).unwrap(), "same");
    }

    #[test]
    fn test_apply_edits_to_empty() {
        assert_eq!(apply_edits("remove_me", vec![Edit::new(0..9, "")]).unwrap(), "");
    }

    #[test]
    fn test_apply_edits_out_of_bounds() {
        let result = apply_edits("ab", vec![Edit::new(1..4, "x")]);
        assert!(matches!(result, Err(ReplaceError::OutOfBounds { .. })));
    }

    #[test]
    fn test_apply_edits_not_char_boundary() {
        let result = apply_edits("é", vec![Edit::new(1..2, "x")]);
        assert!(matches!(result, Err(ReplaceError::OutOfBounds { .. })));
    }

    #[test]
    fn test_write_if_changed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("test.html");
        fs::write(&file, "old").unwrap();

        assert!(!write_if_changed(&file, "old", "old").unwrap());
        assert!(write_if_changed(&file, "old", "new").unwrap());
        assert_eq!(fs::read_to_string(&file).unwrap(), "new");
    }
}
