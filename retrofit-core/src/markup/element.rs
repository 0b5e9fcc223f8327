//! Mutable view of one markup element's start tag
//!
//! Attributes keep their original source text until they are changed, so an
//! element renders back byte-identical unless the rewriter touched it.

use std::ops::Range;

use crate::replace::Edit;

/// Quote character around an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
    None,
}

impl Quote {
    fn from_char(c: char) -> Quote {
        match c {
            '"' => Quote::Double,
            '\'' => Quote::Single,
            _ => Quote::None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Quote::Double => "\"",
            Quote::Single => "'",
            Quote::None => "",
        }
    }
}

/// A single attribute of a start tag
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    value: Option<String>,
    quote: Quote,
    /// Whitespace between the previous token and this attribute
    leading: String,
    /// Byte range in the parsed source; `None` for added attributes
    span: Option<Range<usize>>,
    changed: bool,
    /// Removed original attribute, kept so a re-add lands in the same place
    removed: bool,
}

impl Attribute {
    pub(crate) fn parsed(
        name: &str,
        value: Option<&str>,
        quote_char: Option<char>,
        leading: &str,
        span: Range<usize>,
    ) -> Self {
        Attribute {
            name: name.to_string(),
            value: value.map(str::to_string),
            quote: quote_char.map_or(Quote::None, Quote::from_char),
            leading: leading.to_string(),
            span: Some(span),
            changed: false,
            removed: false,
        }
    }

    fn added(name: &str, value: Option<&str>) -> Self {
        Attribute {
            name: name.to_string(),
            value: value.map(str::to_string),
            quote: Quote::None,
            leading: String::new(),
            span: None,
            changed: true,
            removed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value; valueless attributes read as the empty string
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn is_valueless(&self) -> bool {
        self.value.is_none()
    }

    fn render(&self, out: &mut String, preferred: Quote) {
        out.push_str(&self.name);
        let Some(value) = &self.value else {
            return;
        };
        let quote = match self.quote {
            Quote::None if self.span.is_some() && !needs_quotes(value) => Quote::None,
            Quote::None => preferred,
            quote => quote,
        };
        out.push('=');
        out.push_str(quote.as_str());
        out.push_str(value);
        out.push_str(quote.as_str());
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`'))
}

/// Ordered, duplicate-free class tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    tokens: Vec<String>,
}

impl ClassList {
    pub fn parse(value: &str) -> Self {
        let mut list = ClassList::default();
        for token in value.split_whitespace() {
            list.add(token);
        }
        list
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Space-separated attribute value
    pub fn to_value(&self) -> String {
        self.tokens.join(" ")
    }

    fn add(&mut self, token: &str) -> bool {
        if self.contains(token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }

    fn remove(&mut self, token: &str) -> bool {
        let before = self.tokens.len();
        self.tokens.retain(|t| t != token);
        self.tokens.len() != before
    }
}

const CLASS: &str = "class";

/// A start tag (or self-closing tag) with its attributes and class list
#[derive(Debug, Clone)]
pub struct MarkupElement {
    tag_name: String,
    attributes: Vec<Attribute>,
    classes: ClassList,
    /// Source range from the end of the tag name to the end of the last attribute
    region: Range<usize>,
    /// Separator used in front of appended attributes
    separator: String,
    modified: bool,
}

impl MarkupElement {
    pub(crate) fn new(tag_name: &str, attributes: Vec<Attribute>, region: Range<usize>) -> Self {
        let separator = attributes
            .last()
            .map(|a| a.leading.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| " ".to_string());
        let classes = attributes
            .iter()
            .find(|a| a.name == CLASS)
            .map(|a| ClassList::parse(a.value()))
            .unwrap_or_default();

        MarkupElement {
            tag_name: tag_name.to_string(),
            attributes,
            classes,
            region,
            separator,
            modified: false,
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Present attributes in source order, appended ones last
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| !a.removed)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes().any(|a| a.name == name)
    }

    /// Value of the first attribute called `name`
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .find(|a| a.name == name)
            .map(Attribute::value)
    }

    /// Set an attribute in place, or append it when absent.
    ///
    /// `None` writes a valueless attribute.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) {
        self.put_attribute(name, value);
        if name == CLASS {
            self.classes = ClassList::parse(value.unwrap_or(""));
        }
    }

    /// Remove every attribute called `name`. Returns whether one was present.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let removed = self.drop_attribute(name);
        if removed && name == CLASS {
            self.classes = ClassList::default();
        }
        removed
    }

    pub fn classes(&self) -> &ClassList {
        &self.classes
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.classes.contains(token)
    }

    pub fn add_class(&mut self, token: &str) -> bool {
        let added = self.classes.add(token);
        if added {
            self.sync_class_attribute();
        }
        added
    }

    pub fn remove_class(&mut self, token: &str) -> bool {
        let removed = self.classes.remove(token);
        if removed {
            self.sync_class_attribute();
        }
        removed
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// An emptied class list removes the attribute instead of leaving `class=""`
    fn sync_class_attribute(&mut self) {
        if self.classes.is_empty() {
            self.drop_attribute(CLASS);
        } else {
            let value = self.classes.to_value();
            self.put_attribute(CLASS, Some(&value));
        }
    }

    fn put_attribute(&mut self, name: &str, value: Option<&str>) {
        if let Some(attr) = self.attributes.iter_mut().find(|a| a.name == name && !a.removed) {
            if attr.value.as_deref() != value {
                attr.value = value.map(str::to_string);
                attr.changed = true;
                self.modified = true;
            }
            return;
        }

        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(tombstone) => {
                tombstone.value = value.map(str::to_string);
                tombstone.removed = false;
                tombstone.changed = true;
            }
            None => self.attributes.push(Attribute::added(name, value)),
        }
        self.modified = true;
    }

    fn drop_attribute(&mut self, name: &str) -> bool {
        let mut removed = false;
        for attr in self.attributes.iter_mut().filter(|a| a.name == name && !a.removed) {
            attr.removed = true;
            removed = true;
        }
        // Appended attributes have no place to keep
        self.attributes.retain(|a| !(a.removed && a.span.is_none()));
        self.modified |= removed;
        removed
    }

    /// Quote style of the element's first quoted attribute
    fn preferred_quote(&self) -> Quote {
        self.attributes
            .iter()
            .filter(|a| a.span.is_some())
            .map(|a| a.quote)
            .find(|q| *q != Quote::None)
            .unwrap_or(Quote::Double)
    }

    /// Replacement for the attribute region, or `None` when untouched
    pub(crate) fn edit(&self, source: &str) -> Option<Edit> {
        if !self.modified {
            return None;
        }

        let preferred = self.preferred_quote();
        let mut out = String::new();
        for attr in self.attributes() {
            match &attr.span {
                Some(span) if !attr.changed => {
                    out.push_str(&attr.leading);
                    out.push_str(source.get(span.clone()).unwrap_or(""));
                }
                Some(_) => {
                    out.push_str(&attr.leading);
                    attr.render(&mut out, preferred);
                }
                None => {
                    out.push_str(&self.separator);
                    attr.render(&mut out, preferred);
                }
            }
        }

        Some(Edit::new(self.region.clone(), out))
    }
}
