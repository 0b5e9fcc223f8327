//! Import symbol rewriting
//!
//! Two passes over a source host, both producing [`Edit`]s against the
//! original text:
//!
//! - import declarations whose module specifier has an import rule get the
//!   replacement specifier and renamed symbols
//! - `imports: [...]` arrays inside `Component` decorator configurations get
//!   renamed symbols (standalone components list their modules there)

use tracing::debug;
use tree_sitter::Node;

use crate::host::{children_of_kind, property_value, SourceFile};
use crate::migration::{ImportRule, Migration};
use crate::replace::Edit;
use crate::source_utils::{descendants, node_text};

/// Edits for every import declaration matched by an import rule
pub fn rewrite_imports(file: &SourceFile<'_>, migration: &Migration) -> Vec<Edit> {
    let Some(root) = file.root() else {
        return Vec::new();
    };
    let source = file.text();

    let mut edits = Vec::new();
    for statement in descendants(root, |n| n.kind() == "import_statement") {
        let Some(specifier) = statement.child_by_field_name("source") else {
            continue;
        };
        let quoted = node_text(specifier, source);
        let Some(rule) = unquote(quoted).and_then(|module| migration.import_rule(module)) else {
            continue;
        };

        let quote = quoted.get(..1).unwrap_or("'");
        edits.push(Edit::new(
            specifier.byte_range(),
            format!("{quote}{}{quote}", rule.replacement),
        ));
        rewrite_clause(statement, specifier, source, rule, &mut edits);
    }
    edits
}

fn rewrite_clause(
    statement: Node<'_>,
    specifier: Node<'_>,
    source: &str,
    rule: &ImportRule,
    edits: &mut Vec<Edit>,
) {
    let Some(clause) = children_of_kind(statement, "import_clause").into_iter().next() else {
        // Side-effect import: `import 'module';`
        if let Some(symbol) = rule.first_symbol() {
            edits.push(Edit::insert(specifier.start_byte(), format!("{{ {symbol} }} from ")));
        }
        return;
    };

    if !children_of_kind(clause, "namespace_import").is_empty() {
        debug!(module = %rule.module, "namespace import, no named import synthesized");
        return;
    }

    let Some(named) = children_of_kind(clause, "named_imports").into_iter().next() else {
        // Default import only: `import Foo from 'module';`
        if let (Some(default), Some(symbol)) = (
            children_of_kind(clause, "identifier").into_iter().next(),
            rule.first_symbol(),
        ) {
            edits.push(Edit::insert(default.end_byte(), format!(", {{ {symbol} }}")));
        }
        return;
    };

    let specifiers = children_of_kind(named, "import_specifier");
    if specifiers.is_empty() {
        if let Some(symbol) = rule.first_symbol() {
            edits.push(Edit::new(named.byte_range(), format!("{{ {symbol} }}")));
        }
        return;
    }

    for item in specifiers {
        let Some(name) = item
            .child_by_field_name("name")
            .filter(|n| n.kind() == "identifier")
        else {
            continue;
        };
        if let Some(renamed) = rule.renamed(node_text(name, source)) {
            edits.push(Edit::new(name.byte_range(), renamed));
        }
    }
}

/// Edits renaming symbols listed in the decorator configurations' `imports`
/// arrays
pub fn rewrite_component_imports(
    configs: &[Node<'_>],
    source: &str,
    migration: &Migration,
) -> Vec<Edit> {
    let mut edits = Vec::new();
    for config in configs {
        let Some(array) = property_value(*config, source, "imports", false)
            .filter(|value| value.kind() == "array")
        else {
            continue;
        };
        for element in children_of_kind(array, "identifier") {
            if let Some(renamed) = migration.renamed_symbol(node_text(element, source)) {
                edits.push(Edit::new(element.byte_range(), renamed));
            }
        }
    }
    edits
}

fn unquote(literal: &str) -> Option<&str> {
    if literal.len() < 2 {
        return None;
    }
    literal.get(1..literal.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FileKind, TemplateLocator, TypedSourceLocator};
    use crate::replace::apply_edits;

    fn imports(source: &str) -> String {
        let file = SourceFile::parse(source, FileKind::TypeScript).unwrap();
        let edits = rewrite_imports(&file, Migration::builtin());
        apply_edits(source, edits).unwrap()
    }

    #[test]
    fn test_module_and_symbol_renamed() {
        assert_eq!(
            imports("import { MatButtonModule } from '@angular/material/button';\n"),
            "import { RktButton } from '@rds/angular-button';\n"
        );
    }

    #[test]
    fn test_quote_style_and_alias_kept() {
        assert_eq!(
            imports(r#"import { MatButtonModule as Buttons, Other } from "@angular/material/button";"#),
            r#"import { RktButton as Buttons, Other } from "@rds/angular-button";"#
        );
    }

    #[test]
    fn test_named_import_synthesized() {
        assert_eq!(
            imports("import '@angular/material/button';"),
            "import { RktButton } from '@rds/angular-button';"
        );
        assert_eq!(
            imports("import Buttons from '@angular/material/button';"),
            "import Buttons, { RktButton } from '@rds/angular-button';"
        );
        assert_eq!(
            imports("import {} from '@angular/material/button';"),
            "import { RktButton } from '@rds/angular-button';"
        );
    }

    #[test]
    fn test_namespace_import_only_moves_module() {
        assert_eq!(
            imports("import * as buttons from '@angular/material/button';"),
            "import * as buttons from '@rds/angular-button';"
        );
    }

    #[test]
    fn test_other_imports_untouched() {
        let source = "import { MatButtonModule } from '@angular/material/core';\nimport { Component } from '@angular/core';\n";
        assert_eq!(imports(source), source);
    }

    #[test]
    fn test_decorator_imports_array() {
        let source = r#"
@Component({
  standalone: true,
  imports: [CommonModule, MatButtonModule],
  template: `<a mat-button></a>`,
})
export class A {}
"#;
        let file = SourceFile::parse(source, FileKind::TypeScript).unwrap();
        let configs = TypedSourceLocator.component_configs(&file);
        let edits = rewrite_component_imports(&configs, source, Migration::builtin());
        let out = apply_edits(source, edits).unwrap();
        assert!(out.contains("imports: [CommonModule, RktButton],"));
        assert!(out.contains("template: `<a mat-button></a>`"));
    }
}
