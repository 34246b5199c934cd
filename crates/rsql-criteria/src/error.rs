use thiserror::Error as ThisError;

///
/// ErrorClass
///
/// Stable classification of failures, used by callers to map errors onto
/// transport responses without matching on individual variants.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// The filter expression itself is wrong; never retryable.
    UserInput,
    /// The field declarations disagree with the store model.
    Configuration,
}

///
/// FilterError
///
/// Failures raised while compiling one filter expression.
/// All variants abort the whole compilation; no partial predicate is returned.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FilterError {
    #[error("{message}")]
    UnsupportedField { message: String },

    #[error("Operator symbol {{{operator}}} is either not supported or not implemented")]
    UnsupportedOperator { operator: String },

    #[error("{message}")]
    Syntax { message: String },
}

impl FilterError {
    pub(crate) fn unsupported_field(message: impl Into<String>) -> Self {
        Self::UnsupportedField {
            message: message.into(),
        }
    }

    /// Unknown selector, with the full listing of legal selectors.
    pub(crate) fn unknown_field(selector: &str, expected: &[String]) -> Self {
        Self::unsupported_field(format!(
            "The given search parameter field {{{selector}}} does not exist, must be one of the following fields [{}]",
            expected.join(", ")
        ))
    }

    /// Coerced value outside the closed set the field accepts.
    pub(crate) fn unexpected_value(selector: &str, allowed: &[String]) -> Self {
        Self::unsupported_field(format!(
            "field {{{selector}}} must be one of the following values {{[{}]}}",
            allowed.join(", ")
        ))
    }

    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    pub(crate) fn unsupported_operator(operator: &str) -> Self {
        Self::UnsupportedOperator {
            operator: operator.to_string(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::UserInput
    }
}

///
/// SchemaError
///
/// Field declarations that cannot be served by the store model.
/// Raised once, when a `FieldSchema` is registered.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("field '{field}' is declared twice")]
    DuplicateField { field: &'static str },

    #[error(
        "field '{field}' is a map with sub-entity attributes; use a key/value tuple entity instead"
    )]
    MapWithSubAttributes { field: &'static str },

    #[error("field '{field}' maps to unknown store path '{path}' on entity '{entity}'")]
    UnknownStorePath {
        field: &'static str,
        path: &'static str,
        entity: &'static str,
    },

    #[error("field '{field}' declares sub attribute '{attribute}' unknown to entity '{entity}'")]
    UnknownSubAttribute {
        field: &'static str,
        attribute: &'static str,
        entity: &'static str,
    },

    #[error(
        "map field '{field}' is neither a native map attribute nor a declared key/value tuple"
    )]
    MapWithoutTuple { field: &'static str },

    #[error("map field '{field}' declares tuple attribute '{attribute}' unknown to entity '{entity}'")]
    UnknownTupleAttribute {
        field: &'static str,
        attribute: &'static str,
        entity: &'static str,
    },

    #[error("field '{field}' correlates on identifier '{identifier}' unknown to entity '{entity}'")]
    UnknownIdentifier {
        field: &'static str,
        identifier: &'static str,
        entity: &'static str,
    },
}

impl SchemaError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Configuration
    }
}
