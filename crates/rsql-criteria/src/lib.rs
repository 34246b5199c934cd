//! RSQL filter compilation: resolves user-supplied selectors against a
//! declared field schema, coerces raw arguments, and lowers the filter tree
//! into an outer-join aware criteria predicate.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod ast;
pub mod compile;
pub mod config;
pub mod criteria;
pub mod error;
pub mod model;
pub mod schema;
pub mod store;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Separator between the segments of a selector and of a store path.
pub const PATH_SEPARATOR: char = '.';

/// Wildcard marker accepted in `==` / `!=` arguments.
pub const LIKE_WILDCARD: char = '*';

/// Escape character used in generated LIKE patterns.
pub const ESCAPE_CHAR: char = '\\';

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No stores or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        ast::{ComparisonNode, ComparisonOperator, Node},
        compile::FilterCompiler,
        config::{CompilerConfig, Dialect},
        criteria::{CriteriaQuery, Expr, Predicate},
        error::{FilterError, SchemaError},
        model::{AttributeKind, AttributeModel, EntityModel, EnumModel, ScalarType},
        schema::{FieldDescriptor, FieldSchema, MapTuple, ValueConverter},
        value::Value,
    };
}
