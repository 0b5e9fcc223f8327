//! The button rewrite rule: selector predicate and element rewrite

use tracing::trace;

use crate::markup::MarkupElement;
use crate::migration::Migration;

/// One rewrite rule over markup elements, parameterised by a migration
#[derive(Debug, Clone, Copy)]
pub struct RewriteRule<'m> {
    migration: &'m Migration,
}

impl<'m> RewriteRule<'m> {
    pub fn new(migration: &'m Migration) -> Self {
        RewriteRule { migration }
    }

    /// Legacy marker attribute (any value) or legacy marker class
    pub fn matches(&self, element: &MarkupElement) -> bool {
        let markers = &self.migration.markers;
        element.has_attribute(&markers.legacy_attribute) || element.has_class(&markers.legacy_class)
    }

    /// Whether unparsed markup names either legacy marker, so an element the
    /// rule would select may be hiding in it
    pub fn mentions_markers(&self, raw: &str) -> bool {
        let markers = &self.migration.markers;
        raw.contains(markers.legacy_attribute.as_str()) || raw.contains(markers.legacy_class.as_str())
    }

    /// Rewrite a matched element in place.
    ///
    /// Phases run in a fixed order; later phases read state that earlier
    /// ones change.
    pub fn apply(&self, element: &mut MarkupElement) {
        let migration = self.migration;
        let markers = &migration.markers;
        let facets = &migration.attributes;

        // Must be read before the marker swap
        let class_based = element.has_class(&markers.legacy_class)
            && !element.has_attribute(&markers.legacy_attribute);

        if element.has_attribute(&markers.legacy_attribute) {
            element.set_attribute(&markers.attribute, None);
            element.remove_attribute(&markers.legacy_attribute);
        }

        if let Some(color) = element.attribute(&facets.color).map(str::to_string) {
            let variant = migration
                .variant_for(&color)
                .or(migration.fallback.variant.as_deref());
            if let Some(variant) = variant {
                element.set_attribute(&facets.variant, Some(variant));
                element.remove_attribute(&facets.color);
            }
        }

        let mut sized = false;
        let classes: Vec<String> = element.classes().iter().map(str::to_string).collect();
        for class in &classes {
            if let Some(size) = migration.size_for(class) {
                element.remove_class(class);
                element.set_attribute(&facets.size, Some(size));
                sized = true;
            }
        }
        if !sized && !element.has_attribute(&facets.size) {
            if let Some(size) = migration.fallback.size.as_deref() {
                element.set_attribute(&facets.size, Some(size));
            }
        }

        element.remove_class(&markers.legacy_class);
        if class_based {
            element.add_class(&markers.class);
        }

        trace!(tag = element.tag_name(), class_based, "rewrote element");
    }
}
