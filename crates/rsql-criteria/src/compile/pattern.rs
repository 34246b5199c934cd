//! Module: compile::pattern
//! Responsibility: wildcard detection and LIKE pattern construction.
//! Does not own: case normalization (applied by the caller).

use crate::{ESCAPE_CHAR, LIKE_WILDCARD, config::Dialect};

/// True when `value` contains at least one unescaped wildcard.
#[must_use]
pub(crate) fn is_pattern(value: &str) -> bool {
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c == ESCAPE_CHAR {
            // an escaped wildcard is a literal asterisk; skip it
            if chars.clone().next() == Some(LIKE_WILDCARD) {
                chars.next();
            }
        } else if c == LIKE_WILDCARD {
            return true;
        }
    }

    false
}

/// Turn a filter argument into a LIKE pattern for `dialect`.
///
/// Literal `%` and `_` are escaped, `*` becomes `%`, and an escaped `\*`
/// stays an escaped literal asterisk. Any other escape character is doubled
/// so it matches itself.
#[must_use]
pub(crate) fn to_like_pattern(value: &str, dialect: Dialect) -> String {
    let mut pattern = String::with_capacity(value.len() + 8);
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            _ if c == ESCAPE_CHAR && chars.peek() == Some(&LIKE_WILDCARD) => {
                chars.next();
                pattern.push(ESCAPE_CHAR);
                pattern.push(LIKE_WILDCARD);
            }
            _ if c == ESCAPE_CHAR => {
                pattern.push(ESCAPE_CHAR);
                pattern.push(ESCAPE_CHAR);
            }
            _ if c == LIKE_WILDCARD => pattern.push('%'),
            '%' | '_' => match dialect {
                Dialect::Standard => {
                    pattern.push(ESCAPE_CHAR);
                    pattern.push(c);
                }
                Dialect::SqlServer => {
                    pattern.push('[');
                    pattern.push(c);
                    pattern.push(']');
                }
            },
            _ => pattern.push(c),
        }
    }

    pattern
}

/// Drop the escapes of literal asterisks for plain equality.
#[must_use]
pub(crate) fn unescape_wildcards(value: &str) -> String {
    let escaped: String = [ESCAPE_CHAR, LIKE_WILDCARD].iter().collect();

    value.replace(escaped.as_str(), &LIKE_WILDCARD.to_string())
}

/// Numeric literal detection.
///
/// Accepts optionally signed decimal numbers with fraction and exponent,
/// hexadecimal literals (`0x1F`, `#1F`), and a trailing type suffix
/// (`10L`, `1.5f`). Numeric arguments are compared as-is: no pattern
/// matching, no empty-string handling and no case normalization.
#[must_use]
pub(crate) fn is_numeric(value: &str) -> bool {
    let unsigned = value
        .strip_prefix(['-', '+'])
        .unwrap_or(value);

    if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
        .or_else(|| unsigned.strip_prefix('#'))
    {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }

    let (body, suffix) = match unsigned.char_indices().last() {
        Some((index, c)) if matches!(c, 'l' | 'L' | 'f' | 'F' | 'd' | 'D') => {
            (&unsigned[..index], Some(c))
        }
        _ => (unsigned, None),
    };

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(index) => (&body[..index], Some(&body[index + 1..])),
        None => (body, None),
    };

    let (integral, fraction) = match mantissa.split_once('.') {
        Some((integral, fraction)) => (integral, Some(fraction)),
        None => (mantissa, None),
    };

    let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !digits(integral) || !fraction.is_none_or(digits) {
        return false;
    }
    if integral.is_empty() && fraction.is_none_or(str::is_empty) {
        return false;
    }

    if let Some(exponent) = exponent {
        let exponent = exponent.strip_prefix(['-', '+']).unwrap_or(exponent);
        if exponent.is_empty() || !digits(exponent) {
            return false;
        }
    }

    // long suffix only on integral literals
    !(matches!(suffix, Some('l' | 'L')) && (fraction.is_some() || exponent.is_some()))
}

///
/// TESTS
///
