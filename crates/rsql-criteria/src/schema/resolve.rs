use crate::{
    PATH_SEPARATOR,
    error::FilterError,
    schema::{FieldDescriptor, FieldSchema, MapShape},
};
use tracing::debug;

///
/// ResolvedPath
///
/// A selector checked against the field schema.
/// Every segment after the field name is a declared sub attribute (in its
/// declared casing), except the trailing map key of a map field.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedPath<F> {
    pub field: F,
    pub sub_attributes: Vec<&'static str>,
    pub map_key: Option<String>,
    pub map_shape: Option<MapShape>,
    navigation: Vec<&'static str>,
}

impl<F: FieldDescriptor> ResolvedPath<F> {
    /// Store segments to navigate from the root; never includes the map key.
    #[must_use]
    pub fn navigation(&self) -> &[&'static str] {
        &self.navigation
    }

    /// A simple field needs no traversal beyond one attribute of the root
    /// (the map key does not count as traversal).
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.navigation.len() == 1
    }

    /// Dotted store property, including the map key when present.
    #[must_use]
    pub fn property(&self) -> String {
        let mut segments: Vec<&str> = self.navigation.clone();
        if let Some(key) = &self.map_key {
            segments.push(key);
        }

        let separator = PATH_SEPARATOR.to_string();
        segments.join(separator.as_str())
    }
}

impl<F: FieldDescriptor> FieldSchema<F> {
    /// Resolve one selector (`field`, `field.sub`, `map.key`).
    pub fn resolve(&self, selector: &str) -> Result<ResolvedPath<F>, FilterError> {
        let graph: Vec<&str> = selector.split(PATH_SEPARATOR).collect();
        let name = graph.first().copied().unwrap_or(selector);
        debug!(selector, field = name, "resolving filter field");

        let entry = self
            .entry(name)
            .ok_or_else(|| FilterError::unknown_field(selector, &self.expected))?;
        let field = entry.descriptor;

        if field.is_map() && (graph.len() != 2 || graph[1].is_empty()) {
            return Err(FilterError::syntax(format!(
                "The syntax of the given map search parameter field {{{selector}}} is wrong. Syntax is: <enum name>.<key name>"
            )));
        }

        // sub entities are never addressed by their own name
        if !field.sub_attributes().is_empty() && graph.len() < 2 {
            return Err(FilterError::unknown_field(selector, &self.expected));
        }

        let mut navigation = entry.store_segments.clone();
        let mut sub_attributes = Vec::new();
        let mut map_key = None;

        for (position, segment) in graph.iter().enumerate().skip(1) {
            // the key of a map is not part of the graph
            if field.is_map() && position + 1 == graph.len() {
                map_key = Some((*segment).to_string());
                continue;
            }

            let attribute = field
                .sub_attributes()
                .iter()
                .copied()
                .find(|attribute| attribute.eq_ignore_ascii_case(segment))
                .ok_or_else(|| FilterError::unknown_field(selector, &self.expected))?;

            sub_attributes.push(attribute);
            navigation.push(attribute);
        }

        Ok(ResolvedPath {
            field,
            sub_attributes,
            map_key,
            map_shape: entry.map_shape,
            navigation,
        })
    }
}
