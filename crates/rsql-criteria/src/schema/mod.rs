//! Filterable field declarations.
//!
//! Each filterable entity exposes a closed enum implementing
//! [`FieldDescriptor`]. A [`FieldSchema`] binds that enum to the store model
//! once, rejects declarations the store cannot serve, and afterwards answers
//! selector resolution for any number of concurrent compilations.

mod resolve;


pub use resolve::ResolvedPath;

use crate::{
    PATH_SEPARATOR,
    error::SchemaError,
    model::{AttributeKind, EntityModel},
    value::Value,
};
use derive_more::{Deref, IntoIterator};
use std::fmt;

///
/// FieldDescriptor
///
/// Capability surface of one logical filter field.
/// Implemented by a closed enum; `FIELDS` lists every member in declaration
/// order, which is also the order of diagnostic listings.
///

pub trait FieldDescriptor: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    const FIELDS: &'static [Self];

    /// Logical field name, matched case-insensitively against selectors.
    fn name(self) -> &'static str;

    /// Dotted store path from the entity root.
    fn store_path(self) -> &'static str;

    /// Attributes reachable below `store_path`; empty for terminal fields.
    fn sub_attributes(self) -> &'static [&'static str] {
        &[]
    }

    /// Whether the field is addressed by a dynamic key (`field.<key>`).
    fn is_map(self) -> bool {
        false
    }

    /// Key/value attribute names when the map is stored as tuple entities.
    fn map_tuple(self) -> Option<MapTuple> {
        None
    }

    /// Attribute correlating a negation sub-query with the outer row.
    fn identifier_field(self) -> &'static str {
        "id"
    }

    /// Custom conversion of raw arguments into domain values.
    fn value_converter(self) -> Option<ValueConverter> {
        None
    }
}

///
/// MapTuple
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MapTuple {
    pub key: &'static str,
    pub value: &'static str,
}

impl MapTuple {
    #[must_use]
    pub const fn new(key: &'static str, value: &'static str) -> Self {
        Self { key, value }
    }
}

///
/// ValueConverter
///
/// `convert` returns `None` for input outside the accepted set; the compiler
/// then reports `possible_values`.
///

#[derive(Clone, Copy, Debug)]
pub struct ValueConverter {
    pub convert: fn(&str) -> Option<Value>,
    pub possible_values: &'static [&'static str],
}

///
/// MapShape
/// How a validated map field is stored.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MapShape {
    Native,
    Tuple(MapTuple),
}

///
/// ExpectedFields
///
/// Flattened listing of every legal selector, used in diagnostics.
/// Map fields contribute `<name>.keyName`, sub-entity fields one entry per
/// sub attribute.
///

#[derive(Clone, Debug, Deref, Eq, IntoIterator, PartialEq)]
pub struct ExpectedFields(Vec<String>);

impl ExpectedFields {
    fn collect<F: FieldDescriptor>() -> Self {
        let plain = F::FIELDS
            .iter()
            .filter(|field| field.sub_attributes().is_empty())
            .map(|field| {
                let name = field.name().to_lowercase();
                if field.is_map() {
                    format!("{name}{PATH_SEPARATOR}keyName")
                } else {
                    name
                }
            });

        let nested = F::FIELDS
            .iter()
            .filter(|field| !field.sub_attributes().is_empty())
            .flat_map(|field| {
                let name = field.name().to_lowercase();
                field
                    .sub_attributes()
                    .iter()
                    .map(move |sub| format!("{name}{PATH_SEPARATOR}{sub}"))
            });

        Self(plain.chain(nested).collect())
    }
}

///
/// FieldEntry
/// One validated declaration with its store path pre-split.
///

#[derive(Clone, Debug)]
struct FieldEntry<F> {
    descriptor: F,
    store_segments: Vec<&'static str>,
    map_shape: Option<MapShape>,
}

///
/// FieldSchema
///
/// Validated, immutable field registry for one entity.
/// This is the *only* schema surface the compiler depends on.
///

#[derive(Clone, Debug)]
pub struct FieldSchema<F: FieldDescriptor> {
    model: &'static EntityModel,
    entries: Vec<FieldEntry<F>>,
    expected: ExpectedFields,
}

impl<F: FieldDescriptor> FieldSchema<F> {
    /// Register `F` against the store model of its root entity.
    pub fn new(model: &'static EntityModel) -> Result<Self, SchemaError> {
        let mut entries: Vec<FieldEntry<F>> = Vec::with_capacity(F::FIELDS.len());

        for &descriptor in F::FIELDS {
            if entries
                .iter()
                .any(|entry| entry.descriptor.name().eq_ignore_ascii_case(descriptor.name()))
            {
                return Err(SchemaError::DuplicateField {
                    field: descriptor.name(),
                });
            }

            entries.push(validate_descriptor(model, descriptor)?);
        }

        Ok(Self {
            model,
            entries,
            expected: ExpectedFields::collect::<F>(),
        })
    }

    #[must_use]
    pub const fn model(&self) -> &'static EntityModel {
        self.model
    }

    #[must_use]
    pub const fn expected_fields(&self) -> &ExpectedFields {
        &self.expected
    }

    /// Case-insensitive lookup by logical field name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<F> {
        self.entry(name).map(|entry| entry.descriptor)
    }

    fn entry(&self, name: &str) -> Option<&FieldEntry<F>> {
        self.entries
            .iter()
            .find(|entry| entry.descriptor.name().eq_ignore_ascii_case(name))
    }
}

// Check one declaration against the store model.
fn validate_descriptor<F: FieldDescriptor>(
    model: &'static EntityModel,
    descriptor: F,
) -> Result<FieldEntry<F>, SchemaError> {
    let field = descriptor.name();

    if descriptor.is_map() && !descriptor.sub_attributes().is_empty() {
        return Err(SchemaError::MapWithSubAttributes { field });
    }

    if !model.has_attribute(descriptor.identifier_field()) {
        return Err(SchemaError::UnknownIdentifier {
            field,
            identifier: descriptor.identifier_field(),
            entity: model.entity_name,
        });
    }

    let store_segments: Vec<&'static str> =
        descriptor.store_path().split(PATH_SEPARATOR).collect();
    let unknown_path = |entity: &EntityModel| SchemaError::UnknownStorePath {
        field,
        path: descriptor.store_path(),
        entity: entity.entity_name,
    };

    let mut entity = model;
    let mut terminal = None;
    for (position, segment) in store_segments.iter().enumerate() {
        let attribute = entity
            .attribute(segment)
            .ok_or_else(|| unknown_path(entity))?;

        if position + 1 < store_segments.len() {
            entity = attribute
                .kind
                .target_entity()
                .ok_or_else(|| unknown_path(entity))?;
        }
        terminal = Some(attribute);
    }
    let terminal = terminal.ok_or_else(|| unknown_path(entity))?;

    if let Some(target) = terminal.kind.target_entity() {
        for &attribute in descriptor.sub_attributes() {
            if !target.has_attribute(attribute) {
                return Err(SchemaError::UnknownSubAttribute {
                    field,
                    attribute,
                    entity: target.entity_name,
                });
            }
        }
    } else if let Some(&attribute) = descriptor.sub_attributes().first() {
        return Err(SchemaError::UnknownSubAttribute {
            field,
            attribute,
            entity: entity.entity_name,
        });
    }

    let map_shape = if descriptor.is_map() {
        Some(validate_map_shape(descriptor, terminal.kind)?)
    } else {
        None
    };

    Ok(FieldEntry {
        descriptor,
        store_segments,
        map_shape,
    })
}

fn validate_map_shape<F: FieldDescriptor>(
    descriptor: F,
    kind: AttributeKind,
) -> Result<MapShape, SchemaError> {
    let field = descriptor.name();

    if matches!(kind, AttributeKind::Map { .. }) {
        return Ok(MapShape::Native);
    }

    let (Some(tuple), Some(target)) = (descriptor.map_tuple(), kind.target_entity()) else {
        return Err(SchemaError::MapWithoutTuple { field });
    };

    for attribute in [tuple.key, tuple.value] {
        if !target.has_attribute(attribute) {
            return Err(SchemaError::UnknownTupleAttribute {
                field,
                attribute,
                entity: target.entity_name,
            });
        }
    }

    Ok(MapShape::Tuple(tuple))
}
