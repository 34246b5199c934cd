//! Module: compile::coerce
//! Responsibility: raw filter argument -> runtime `Value`.
//! Does not own: operator semantics or pattern handling.

use crate::{
    error::FilterError,
    model::ScalarType,
    schema::FieldDescriptor,
    value::{Value, ValueEnum},
};
use tracing::{debug, info};

/// Coerce one raw argument for `field`, whose path ends in `terminal`.
///
/// Enum columns win over converters, converters over booleans; anything
/// else passes through as text and is compared by the store.
pub(crate) fn coerce<F: FieldDescriptor>(
    selector: &str,
    field: F,
    terminal: Option<ScalarType>,
    raw: &str,
) -> Result<Value, FilterError> {
    if let Some(ScalarType::Enum(model)) = terminal {
        return model
            .variant(raw)
            .map(|variant| Value::Enum(ValueEnum::new(model.path, variant)))
            .ok_or_else(|| {
                info!(
                    value = %raw.to_uppercase(),
                    enum_path = model.path,
                    "given value cannot be transformed into the enum type"
                );
                debug!(selector, "value cannot be transformed to an enum");

                let allowed: Vec<String> =
                    model.variants.iter().map(|v| v.to_lowercase()).collect();
                FilterError::unexpected_value(selector, &allowed)
            });
    }

    if let Some(converter) = field.value_converter() {
        return (converter.convert)(raw).ok_or_else(|| {
            let allowed: Vec<String> = converter
                .possible_values
                .iter()
                .map(ToString::to_string)
                .collect();
            FilterError::unexpected_value(selector, &allowed)
        });
    }

    if matches!(terminal, Some(ScalarType::Bool)) {
        return parse_bool(raw).map(Value::Bool).ok_or_else(|| {
            FilterError::syntax(format!(
                "The value of the given search parameter field {{{selector}}} is not well formed. Only a boolean (true or false) value will be expected"
            ))
        });
    }

    Ok(Value::text(raw))
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

///
/// TESTS
///
