//! Migration definitions
//!
//! A [`Migration`] names the legacy and target marker vocabularies, the facet
//! attributes the rewriter reads and writes, and the lookup tables it consults.
//! The built-in button migration is available through [`Migration::builtin`];
//! alternative definitions are loaded from TOML and validated before use.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a migration definition
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read migration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid migration syntax: {0}")]
    Syntax(#[from] toml::de::Error),
    #[error("Invalid {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Marker attribute and marker class, legacy and target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Markers {
    pub legacy_attribute: String,
    pub attribute: String,
    pub legacy_class: String,
    pub class: String,
}

/// Attribute names for the color, variant and size facets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FacetAttributes {
    pub color: String,
    pub variant: String,
    pub size: String,
}

impl Default for FacetAttributes {
    fn default() -> Self {
        FacetAttributes {
            color: "color".to_string(),
            variant: "variant".to_string(),
            size: "size".to_string(),
        }
    }
}

/// Values applied when a facet has no table entry.
///
/// Both are unset by default: an unmapped color stays as it is and an element
/// without a size class gets no size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fallback {
    /// Variant used when `color` is present but not a table key
    pub variant: Option<String>,
    /// Size used when no size class was found and no size attribute exists
    pub size: Option<String>,
}

/// One imported symbol rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymbolRename {
    pub from: String,
    pub to: String,
}

/// Module specifier replacement with its symbol renames (in order)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportRule {
    pub module: String,
    pub replacement: String,
    #[serde(default)]
    pub symbols: Vec<SymbolRename>,
}

impl ImportRule {
    /// New name for an imported symbol, if this rule renames it
    pub fn renamed(&self, symbol: &str) -> Option<&str> {
        self.symbols
            .iter()
            .find(|s| s.from == symbol)
            .map(|s| s.to.as_str())
    }

    /// Symbol synthesized for imports that name nothing
    pub fn first_symbol(&self) -> Option<&str> {
        self.symbols.first().map(|s| s.to.as_str())
    }
}

/// An immutable migration definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Migration {
    pub name: String,
    pub markers: Markers,
    #[serde(default)]
    pub attributes: FacetAttributes,
    /// color value -> variant value
    #[serde(default)]
    pub variants: BTreeMap<String, String>,
    /// size class -> size value
    #[serde(default)]
    pub sizes: BTreeMap<String, String>,
    #[serde(default)]
    pub fallback: Fallback,
    #[serde(default)]
    pub imports: Vec<ImportRule>,
}

static BUTTON: Lazy<Migration> = Lazy::new(|| {
    let migration = Migration::button();
    if let Err(e) = migration.validate() {
        panic!("built-in button migration is invalid: {}", e);
    }
    migration
});

impl Migration {
    /// The process-wide built-in button migration, validated on first use
    pub fn builtin() -> &'static Migration {
        &BUTTON
    }

    /// `mat-button` / `rkt-ButtonLink` to `rkt-button` / `rkt-Button`
    pub fn button() -> Migration {
        let pairs = |items: &[(&str, &str)]| -> BTreeMap<String, String> {
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };

        Migration {
            name: "button".to_string(),
            markers: Markers {
                legacy_attribute: "mat-button".to_string(),
                attribute: "rkt-button".to_string(),
                legacy_class: "rkt-ButtonLink".to_string(),
                class: "rkt-Button".to_string(),
            },
            attributes: FacetAttributes::default(),
            variants: pairs(&[
                ("accent", "accent"),
                ("primary", "primary"),
                ("default", "default"),
            ]),
            sizes: pairs(&[
                ("rkt-ButtonLink--is-small", "sm"),
                ("rkt-ButtonLink--is-large", "lg"),
            ]),
            fallback: Fallback::default(),
            imports: vec![ImportRule {
                module: "@angular/material/button".to_string(),
                replacement: "@rds/angular-button".to_string(),
                symbols: vec![SymbolRename {
                    from: "MatButtonModule".to_string(),
                    to: "RktButton".to_string(),
                }],
            }],
        }
    }

    /// Parse and validate a TOML migration definition
    pub fn from_toml_str(source: &str) -> Result<Migration, ConfigError> {
        let migration: Migration = toml::from_str(source)?;
        migration.validate()?;
        Ok(migration)
    }

    /// Load and validate a migration definition from a TOML file
    pub fn load(path: &Path) -> Result<Migration, ConfigError> {
        let source = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Migration::from_toml_str(&source)
    }

    /// Variant mapped from a color value
    pub fn variant_for(&self, color: &str) -> Option<&str> {
        self.variants.get(color).map(String::as_str)
    }

    /// Size mapped from a size-indicating class
    pub fn size_for(&self, class: &str) -> Option<&str> {
        self.sizes.get(class).map(String::as_str)
    }

    /// Import rule whose module specifier is `module`
    pub fn import_rule(&self, module: &str) -> Option<&ImportRule> {
        self.imports.iter().find(|rule| rule.module == module)
    }

    /// New name for `symbol` under any import rule
    pub fn renamed_symbol(&self, symbol: &str) -> Option<&str> {
        self.imports.iter().find_map(|rule| rule.renamed(symbol))
    }

    /// Check every name and value that ends up spliced into source text
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid("name", "must not be empty"));
        }

        let markers = &self.markers;
        check_attribute_name("markers.legacy_attribute", &markers.legacy_attribute)?;
        check_attribute_name("markers.attribute", &markers.attribute)?;
        check_class_token("markers.legacy_class", &markers.legacy_class)?;
        check_class_token("markers.class", &markers.class)?;
        if markers.legacy_attribute == markers.attribute {
            return Err(ConfigError::invalid(
                "markers.attribute",
                "must differ from markers.legacy_attribute",
            ));
        }
        if markers.legacy_class == markers.class {
            return Err(ConfigError::invalid(
                "markers.class",
                "must differ from markers.legacy_class",
            ));
        }

        check_attribute_name("attributes.color", &self.attributes.color)?;
        check_attribute_name("attributes.variant", &self.attributes.variant)?;
        check_attribute_name("attributes.size", &self.attributes.size)?;

        for (color, variant) in &self.variants {
            check_value(&format!("variants.{}", color), variant)?;
        }
        for (class, size) in &self.sizes {
            check_class_token(&format!("sizes.{}", class), class)?;
            check_value(&format!("sizes.{}", class), size)?;
        }
        if let Some(variant) = &self.fallback.variant {
            check_value("fallback.variant", variant)?;
        }
        if let Some(size) = &self.fallback.size {
            check_value("fallback.size", size)?;
        }

        for (i, rule) in self.imports.iter().enumerate() {
            let field = format!("imports[{}]", i);
            check_module(&format!("{}.module", field), &rule.module)?;
            check_module(&format!("{}.replacement", field), &rule.replacement)?;
            for symbol in &rule.symbols {
                check_identifier(&format!("{}.symbols", field), &symbol.from)?;
                check_identifier(&format!("{}.symbols", field), &symbol.to)?;
            }
        }

        Ok(())
    }
}

fn check_attribute_name(field: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::invalid(field, "must not be empty"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '<' | '>' | '/' | '='))
    {
        return Err(ConfigError::invalid(
            field,
            format!("'{}' is not a valid attribute name (contains {:?})", name, c),
        ));
    }
    Ok(())
}

fn check_class_token(field: &str, token: &str) -> Result<(), ConfigError> {
    if token.is_empty() {
        return Err(ConfigError::invalid(field, "must not be empty"));
    }
    if let Some(c) = token
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '<' | '>'))
    {
        return Err(ConfigError::invalid(
            field,
            format!("'{}' is not a single class token (contains {:?})", token, c),
        ));
    }
    Ok(())
}

fn check_value(field: &str, value: &str) -> Result<(), ConfigError> {
    if let Some(c) = value
        .chars()
        .find(|c| matches!(c, '"' | '\'' | '`' | '<' | '>' | '\\' | '$'))
    {
        return Err(ConfigError::invalid(
            field,
            format!("'{}' contains {:?}, which cannot be written into a template", value, c),
        ));
    }
    Ok(())
}

fn check_module(field: &str, module: &str) -> Result<(), ConfigError> {
    if module.is_empty() {
        return Err(ConfigError::invalid(field, "must not be empty"));
    }
    check_value(field, module)
}

fn check_identifier(field: &str, name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map_or(false, |c| c.is_alphabetic() || c == '_' || c == '$');
    if !valid_start || !chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
        return Err(ConfigError::invalid(
            field,
            format!("'{}' is not an identifier", name),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUTTON_TOML: &str = r#"
name = "button"

[markers]
legacy_attribute = "mat-button"
attribute = "rkt-button"
legacy_class = "rkt-ButtonLink"
class = "rkt-Button"

[variants]
accent = "accent"
primary = "primary"
default = "default"

[sizes]
"rkt-ButtonLink--is-small" = "sm"
"rkt-ButtonLink--is-large" = "lg"

[[imports]]
module = "@angular/material/button"
replacement = "@rds/angular-button"
symbols = [{ from = "MatButtonModule", to = "RktButton" }]
"#;

    #[test]
    fn test_builtin_is_valid() {
        assert!(Migration::builtin().validate().is_ok());
        assert_eq!(Migration::builtin().markers.legacy_attribute, "mat-button");
    }

    #[test]
    fn test_toml_matches_builtin() {
        let migration = Migration::from_toml_str(BUTTON_TOML).unwrap();
        assert_eq!(&migration, Migration::builtin());
    }

    #[test]
    fn test_lookups() {
        let migration = Migration::builtin();
        assert_eq!(migration.variant_for("accent"), Some("accent"));
        assert_eq!(migration.variant_for("warn"), None);
        assert_eq!(migration.size_for("rkt-ButtonLink--is-large"), Some("lg"));
        assert_eq!(migration.size_for("rkt-ButtonLink"), None);
        assert_eq!(migration.renamed_symbol("MatButtonModule"), Some("RktButton"));
        assert_eq!(migration.renamed_symbol("MatIconModule"), None);
        assert!(migration.import_rule("@angular/material/button").is_some());
    }

    #[test]
    fn test_fallback_table() {
        let source = format!("{}\n[fallback]\nvariant = \"default\"\nsize = \"md\"\n", BUTTON_TOML);
        let migration = Migration::from_toml_str(&source).unwrap();
        assert_eq!(migration.fallback.variant.as_deref(), Some("default"));
        assert_eq!(migration.fallback.size.as_deref(), Some("md"));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let source = BUTTON_TOML.replace("[variants]", "[variants_typo]");
        assert!(matches!(
            Migration::from_toml_str(&source),
            Err(ConfigError::Syntax(_))
        ));
    }

    #[test]
    fn test_rejects_identical_markers() {
        let source = BUTTON_TOML.replace("attribute = \"rkt-button\"", "attribute = \"mat-button\"");
        let err = Migration::from_toml_str(&source).unwrap_err();
        assert!(err.to_string().contains("markers.attribute"), "{}", err);
    }

    #[test]
    fn test_rejects_class_with_whitespace() {
        let source = BUTTON_TOML.replace("class = \"rkt-Button\"", "class = \"rkt Button\"");
        let err = Migration::from_toml_str(&source).unwrap_err();
        assert!(err.to_string().contains("markers.class"), "{}", err);
    }

    #[test]
    fn test_rejects_quoted_value() {
        let source = BUTTON_TOML.replace("accent = \"accent\"", "accent = \"a\\\"b\"");
        let err = Migration::from_toml_str(&source).unwrap_err();
        assert!(err.to_string().contains("variants.accent"), "{}", err);
    }

    #[test]
    fn test_rejects_bad_symbol() {
        let source = BUTTON_TOML.replace("to = \"RktButton\"", "to = \"1Button\"");
        assert!(Migration::from_toml_str(&source).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Migration::load(Path::new("/nonexistent/migration.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
