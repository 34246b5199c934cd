use crate::{
    criteria::{Expr, FromId, SubqueryId},
    value::Value,
};
use std::ops::{BitAnd, BitOr};

///
/// Predicate
///
/// Composable boolean condition over the sources of one `CriteriaQuery`.
/// Evaluation follows SQL three-valued logic: comparisons against NULL are
/// unknown, which is why negations are paired with explicit IS NULL tests.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Predicate {
    True,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    IsNull(Expr),
    IsNotNull(Expr),
    Equal(Expr, Value),
    NotEqual(Expr, Value),
    /// Equality between two expressions (sub-query correlation).
    EqualExpr(Expr, Expr),
    Like {
        expr: Expr,
        pattern: String,
        escape: char,
    },
    NotLike {
        expr: Expr,
        pattern: String,
        escape: char,
    },
    In(Expr, Vec<Value>),
    Compare {
        expr: Expr,
        op: OrderOp,
        value: Value,
    },
    Exists(SubqueryId),
}

///
/// OrderOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrderOp {
    Gt,
    Ge,
    Lt,
    Le,
}

impl OrderOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

impl Predicate {
    /// Conjunction; an empty list is vacuously true.
    #[must_use]
    pub fn and(preds: Vec<Self>) -> Self {
        if preds.is_empty() {
            Self::True
        } else {
            Self::And(preds)
        }
    }

    /// Disjunction; an empty list is vacuously true, matching an empty `or` node.
    #[must_use]
    pub fn or(preds: Vec<Self>) -> Self {
        if preds.is_empty() {
            Self::True
        } else {
            Self::Or(preds)
        }
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(pred: Self) -> Self {
        Self::Not(Box::new(pred))
    }

    #[must_use]
    pub const fn is_null(expr: Expr) -> Self {
        Self::IsNull(expr)
    }

    #[must_use]
    pub const fn is_not_null(expr: Expr) -> Self {
        Self::IsNotNull(expr)
    }

    #[must_use]
    pub fn equal(expr: Expr, value: impl Into<Value>) -> Self {
        Self::Equal(expr, value.into())
    }

    #[must_use]
    pub fn not_equal(expr: Expr, value: impl Into<Value>) -> Self {
        Self::NotEqual(expr, value.into())
    }

    #[must_use]
    pub fn like(expr: Expr, pattern: impl Into<String>) -> Self {
        Self::Like {
            expr,
            pattern: pattern.into(),
            escape: crate::ESCAPE_CHAR,
        }
    }

    #[must_use]
    pub fn not_like(expr: Expr, pattern: impl Into<String>) -> Self {
        Self::NotLike {
            expr,
            pattern: pattern.into(),
            escape: crate::ESCAPE_CHAR,
        }
    }

    #[must_use]
    pub const fn in_(expr: Expr, values: Vec<Value>) -> Self {
        Self::In(expr, values)
    }

    #[must_use]
    pub const fn compare(expr: Expr, op: OrderOp, value: Value) -> Self {
        Self::Compare { expr, op, value }
    }

    /// Sources read directly by this predicate (sub-query bodies excluded).
    #[must_use]
    pub fn referenced_froms(&self) -> Vec<FromId> {
        let mut froms = Vec::new();
        self.collect_froms(&mut froms);
        froms.sort_unstable();
        froms.dedup();

        froms
    }

    fn collect_froms(&self, out: &mut Vec<FromId>) {
        match self {
            Self::True | Self::Exists(_) => {}
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_froms(out);
                }
            }
            Self::Not(inner) => inner.collect_froms(out),
            Self::IsNull(expr)
            | Self::IsNotNull(expr)
            | Self::Equal(expr, _)
            | Self::NotEqual(expr, _)
            | Self::Like { expr, .. }
            | Self::NotLike { expr, .. }
            | Self::In(expr, _)
            | Self::Compare { expr, .. } => out.push(expr.from_id()),
            Self::EqualExpr(left, right) => {
                out.push(left.from_id());
                out.push(right.from_id());
            }
        }
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}
