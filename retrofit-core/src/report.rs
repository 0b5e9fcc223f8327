//! Per-file outcomes and report rendering
//!
//! Formats:
//! - text: one line per changed or failed file, GCC-style diagnostics, summary
//! - json: `{ "files": [...], "summary": {...} }`

use serde::Serialize;
use strum_macros::Display;

use crate::host::SourceRewrite;

/// Outcome of processing one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileStatus {
    Changed,
    Unchanged,
    Failed,
}

/// A problem located in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Everything reported about one file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    pub status: FileStatus,
    pub templates: usize,
    pub elements: usize,
    pub imports: usize,
    /// Whether the new text was written back
    pub written: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    /// Report for a file that could not be read or parsed at all
    pub fn failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        FileReport {
            path: path.into(),
            status: FileStatus::Failed,
            templates: 0,
            elements: 0,
            imports: 0,
            written: false,
            diagnostics: vec![Diagnostic {
                line: 0,
                column: 0,
                message: message.into(),
            }],
        }
    }

    /// Report for a completed rewrite. Any diagnostic marks the file failed,
    /// even when other templates in it were rewritten.
    pub fn from_rewrite(
        path: impl Into<String>,
        original: &str,
        rewrite: SourceRewrite,
        written: bool,
    ) -> Self {
        let status = if !rewrite.diagnostics.is_empty() {
            FileStatus::Failed
        } else if rewrite.text != original {
            FileStatus::Changed
        } else {
            FileStatus::Unchanged
        };

        FileReport {
            path: path.into(),
            status,
            templates: rewrite.templates_rewritten,
            elements: rewrite.elements_rewritten,
            imports: rewrite.imports_rewritten,
            written,
            diagnostics: rewrite.diagnostics,
        }
    }
}

/// Totals over a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Summary {
            total: reports.len(),
            ..Summary::default()
        };
        for report in reports {
            match report.status {
                FileStatus::Changed => summary.changed += 1,
                FileStatus::Unchanged => summary.unchanged += 1,
                FileStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    /// Parse format from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    /// Get list of all valid format names
    pub fn valid_formats() -> &'static [&'static str] {
        &["text", "json"]
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
    summary: Summary,
}

/// Render reports in the requested format
pub fn format_reports(reports: &[FileReport], format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => format_text(reports),
        ReportFormat::Json => format_json(reports),
    }
}

fn format_text(reports: &[FileReport]) -> String {
    let mut output = String::new();
    for report in reports {
        match report.status {
            FileStatus::Unchanged => {}
            FileStatus::Changed => {
                let verb = if report.written { "rewrote" } else { "would rewrite" };
                output.push_str(&format!(
                    "{}: {} {} {}, {} {}, {} {}\n",
                    report.path,
                    verb,
                    report.templates,
                    plural(report.templates, "template"),
                    report.elements,
                    plural(report.elements, "element"),
                    report.imports,
                    plural(report.imports, "import"),
                ));
            }
            FileStatus::Failed => {
                for d in &report.diagnostics {
                    if d.line == 0 {
                        output.push_str(&format!("{}: error: {}\n", report.path, d.message));
                    } else {
                        output.push_str(&format!(
                            "{}:{}:{}: error: {}\n",
                            report.path, d.line, d.column, d.message
                        ));
                    }
                }
            }
        }
    }

    let summary = Summary::from_reports(reports);
    output.push_str(&format!(
        "{} {}: {} changed, {} unchanged, {} failed\n",
        summary.total,
        plural(summary.total, "file"),
        summary.changed,
        summary.unchanged,
        summary.failed
    ));
    output
}

fn format_json(reports: &[FileReport]) -> String {
    let report = JsonReport {
        files: reports,
        summary: Summary::from_reports(reports),
    };
    serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{}s", noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<FileReport> {
        vec![
            FileReport {
                path: "a.component.ts".to_string(),
                status: FileStatus::Changed,
                templates: 1,
                elements: 2,
                imports: 1,
                written: true,
                diagnostics: vec![],
            },
            FileReport {
                path: "b.html".to_string(),
                status: FileStatus::Unchanged,
                templates: 0,
                elements: 0,
                imports: 0,
                written: false,
                diagnostics: vec![],
            },
            FileReport {
                path: "c.html".to_string(),
                status: FileStatus::Failed,
                templates: 0,
                elements: 0,
                imports: 0,
                written: false,
                diagnostics: vec![Diagnostic {
                    line: 3,
                    column: 7,
                    message: "Failed to parse markup at 3:7".to_string(),
                }],
            },
        ]
    }

    #[test]
    fn test_summary() {
        let summary = Summary::from_reports(&sample());
        assert_eq!(
            summary,
            Summary {
                total: 3,
                changed: 1,
                unchanged: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn test_format_text() {
        let output = format_reports(&sample(), ReportFormat::Text);
        assert_eq!(
            output,
            "a.component.ts: rewrote 1 template, 2 elements, 1 import\n\
             c.html:3:7: error: Failed to parse markup at 3:7\n\
             3 files: 1 changed, 1 unchanged, 1 failed\n"
        );
    }

    #[test]
    fn test_format_json() {
        let output = format_reports(&sample(), ReportFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["files"][0]["status"], "changed");
        assert_eq!(value["files"][2]["diagnostics"][0]["line"], 3);
        assert!(value["files"][1].get("diagnostics").is_none());
        assert_eq!(value["summary"]["failed"], 1);
    }

    #[test]
    fn test_failed_without_position() {
        let report = FileReport::failed("x.ts", "Failed to parse source at 1:1");
        let output = format_reports(&[report], ReportFormat::Text);
        assert!(output.starts_with("x.ts: error: Failed to parse source at 1:1\n"));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json));
        assert_eq!(ReportFormat::from_str("xml"), None);
        assert_eq!(FileStatus::Unchanged.to_string(), "unchanged");
    }
}
