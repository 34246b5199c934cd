//! Deterministic, read-only rendering of compiled criteria; must not evaluate.

use crate::criteria::{
    CriteriaQuery, Expr, FromKind, JoinType, Predicate, Scope, SubqueryId,
};
use std::fmt::Write;

impl CriteriaQuery {
    /// Render the query and one predicate as JPQL-like text.
    ///
    /// Sources are aliased by id (`s0` is the root), so two compilations of
    /// the same filter render identically.
    #[must_use]
    pub fn explain(&self, predicate: &Predicate) -> String {
        let mut out = String::new();
        self.write_select(&mut out, Scope::Outer);
        out.push_str(" WHERE ");
        self.write_predicate(&mut out, predicate);

        out
    }

    fn write_select(&self, out: &mut String, scope: Scope) {
        for (id, node) in self.active_froms(scope) {
            match node.kind {
                FromKind::Root { entity } => {
                    let _ = write!(out, "SELECT {id} FROM {} {id}", entity.entity_name);
                }
                FromKind::Join {
                    parent,
                    attribute,
                    join_type,
                } => {
                    let kind = match join_type {
                        JoinType::Inner => "JOIN",
                        JoinType::Left => "LEFT JOIN",
                    };
                    let _ = write!(out, " {kind} {parent}.{} {id}", attribute.name);
                }
            }
        }
    }

    fn write_subquery(&self, out: &mut String, subquery: SubqueryId) {
        out.push('(');
        self.write_select(out, Scope::Subquery(subquery));
        out.push_str(" WHERE ");
        self.write_predicate(out, &self.subquery_def(subquery).restriction);
        out.push(')');
    }

    fn write_predicate(&self, out: &mut String, predicate: &Predicate) {
        match predicate {
            Predicate::True => out.push_str("1 = 1"),
            Predicate::And(children) => self.write_junction(out, children, " AND "),
            Predicate::Or(children) => self.write_junction(out, children, " OR "),
            Predicate::Not(inner) => {
                if let Predicate::Exists(subquery) = inner.as_ref() {
                    out.push_str("NOT EXISTS ");
                    self.write_subquery(out, *subquery);
                } else {
                    out.push_str("NOT (");
                    self.write_predicate(out, inner);
                    out.push(')');
                }
            }
            Predicate::IsNull(expr) => {
                let _ = write!(out, "{} IS NULL", render_expr(expr));
            }
            Predicate::IsNotNull(expr) => {
                let _ = write!(out, "{} IS NOT NULL", render_expr(expr));
            }
            Predicate::Equal(expr, value) => {
                let _ = write!(out, "{} = {value}", render_expr(expr));
            }
            Predicate::NotEqual(expr, value) => {
                let _ = write!(out, "{} <> {value}", render_expr(expr));
            }
            Predicate::EqualExpr(left, right) => {
                let _ = write!(out, "{} = {}", render_expr(left), render_expr(right));
            }
            Predicate::Like {
                expr,
                pattern,
                escape,
            } => {
                let _ = write!(out, "{} LIKE '{pattern}' ESCAPE '{escape}'", render_expr(expr));
            }
            Predicate::NotLike {
                expr,
                pattern,
                escape,
            } => {
                let _ = write!(
                    out,
                    "{} NOT LIKE '{pattern}' ESCAPE '{escape}'",
                    render_expr(expr)
                );
            }
            Predicate::In(expr, values) => {
                let values: Vec<String> = values.iter().map(ToString::to_string).collect();
                let _ = write!(out, "{} IN ({})", render_expr(expr), values.join(", "));
            }
            Predicate::Compare { expr, op, value } => {
                let _ = write!(out, "{} {} {value}", render_expr(expr), op.symbol());
            }
            Predicate::Exists(subquery) => {
                out.push_str("EXISTS ");
                self.write_subquery(out, *subquery);
            }
        }
    }

    fn write_junction(&self, out: &mut String, children: &[Predicate], separator: &str) {
        out.push('(');
        for (index, child) in children.iter().enumerate() {
            if index > 0 {
                out.push_str(separator);
            }
            self.write_predicate(out, child);
        }
        out.push(')');
    }
}

fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Attribute { from, name } => format!("{from}.{name}"),
        Expr::Element(from) => from.to_string(),
        Expr::MapKey(from) => format!("KEY({from})"),
        Expr::MapValue(from) => format!("VALUE({from})"),
        Expr::Upper(inner) => format!("UPPER({})", render_expr(inner)),
    }
}
