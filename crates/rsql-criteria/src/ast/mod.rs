use std::{fmt, str::FromStr};

///
/// Filter AST
///
/// Parser-agnostic representation of an RSQL filter as handed over by the
/// text parser. Selectors, operator symbols and arguments stay raw strings;
/// all interpretation happens in the compiler:
///
/// - field resolution (schema-aware)
/// - value coercion
/// - predicate lowering
///

///
/// Node
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    And(Vec<Self>),
    Or(Vec<Self>),
    Comparison(ComparisonNode),
    /// A node kind the compiler does not interpret.
    /// Skipped (and logged) when it appears below a logical node.
    Unrecognized(String),
}

impl Node {
    #[must_use]
    pub const fn and(children: Vec<Self>) -> Self {
        Self::And(children)
    }

    #[must_use]
    pub const fn or(children: Vec<Self>) -> Self {
        Self::Or(children)
    }

    /// Build a comparison node from raw parser output.
    #[must_use]
    pub fn comparison<I, S>(selector: &str, operator: &str, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Comparison(ComparisonNode::new(selector, operator, arguments))
    }

    #[must_use]
    pub fn eq(selector: &str, argument: &str) -> Self {
        Self::comparison(selector, "==", [argument])
    }

    #[must_use]
    pub fn ne(selector: &str, argument: &str) -> Self {
        Self::comparison(selector, "!=", [argument])
    }

    #[must_use]
    pub fn in_(selector: &str, arguments: &[&str]) -> Self {
        Self::comparison(selector, "=in=", arguments.iter().copied())
    }

    #[must_use]
    pub fn out(selector: &str, arguments: &[&str]) -> Self {
        Self::comparison(selector, "=out=", arguments.iter().copied())
    }
}

///
/// ComparisonNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComparisonNode {
    pub selector: String,
    pub operator: String,
    pub arguments: Vec<String>,
}

impl ComparisonNode {
    #[must_use]
    pub fn new<I, S>(selector: &str, operator: &str, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selector: selector.to_string(),
            operator: operator.to_string(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for ComparisonNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arguments.as_slice() {
            [single] => write!(f, "{}{}{single}", self.selector, self.operator),
            many => write!(f, "{}{}({})", self.selector, self.operator, many.join(",")),
        }
    }
}

///
/// ComparisonOperator
///
/// Closed operator set; the compiler matches on it exhaustively.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ComparisonOperator {
    Equal = 0x01,
    NotEqual = 0x02,
    GreaterThan = 0x03,
    GreaterThanOrEqual = 0x04,
    LessThan = 0x05,
    LessThanOrEqual = 0x06,
    In = 0x07,
    NotIn = 0x08,
}

impl ComparisonOperator {
    pub const ALL: [Self; 8] = [
        Self::Equal,
        Self::NotEqual,
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
        Self::In,
        Self::NotIn,
    ];

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterThan => "=gt=",
            Self::GreaterThanOrEqual => "=ge=",
            Self::LessThan => "=lt=",
            Self::LessThanOrEqual => "=le=",
            Self::In => "=in=",
            Self::NotIn => "=out=",
        }
    }

    /// Negating operators never require the joins built while navigating:
    /// relationship negation is answered by a correlated sub-query.
    #[must_use]
    pub const fn is_negation(self) -> bool {
        matches!(self, Self::NotEqual | Self::NotIn)
    }
}

impl FromStr for ComparisonOperator {
    type Err = String;

    fn from_str(symbol: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.symbol() == symbol)
            .ok_or_else(|| symbol.to_string())
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

///
/// TESTS
///
