//! Store metamodel definitions.
//!
//! This module describes *what the store can navigate*: entities, their
//! attributes and how each attribute is reached (direct access versus join).
//! Filter field declarations (`schema`) are validated against it, and the
//! join planner consults it for every path segment.
//!
//! In general:
//! - `schema` defines *what callers may name*
//! - `model` defines *what the store holds*
mod attribute;
mod entity;

pub use attribute::{AttributeKind, AttributeModel, EnumModel, ScalarType};
pub use entity::EntityModel;
