use crate::model::AttributeModel;
use std::fmt;

///
/// EntityModel
/// Minimal, statically declared runtime model for one store entity.
///

pub struct EntityModel {
    /// Stable external name used in explain output and diagnostics.
    pub entity_name: &'static str,
    /// Attribute holding the row identifier (correlates sub-queries).
    pub primary_key: &'static str,
    /// Ordered attribute list (authoritative for path navigation).
    pub attributes: &'static [AttributeModel],
}

impl EntityModel {
    /// Look up one attribute by its exact store name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&'static AttributeModel> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

// Models reference each other cyclically (target → tag → target), so only the
// name is printed.
impl fmt::Debug for EntityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityModel").field(&self.entity_name).finish()
    }
}

impl PartialEq for EntityModel {
    fn eq(&self, other: &Self) -> bool {
        self.entity_name == other.entity_name
    }
}

impl Eq for EntityModel {}
