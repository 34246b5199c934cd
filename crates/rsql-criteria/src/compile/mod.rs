//! Filter compilation: AST -> one criteria `Predicate`.
//!
//! A [`FilterCompiler`] is built per compile call. It resolves every
//! comparison against the field schema, coerces its arguments, materializes
//! the store path through the join planner, and lowers the operator into
//! predicate combinators. Negations over multi-valued relationships become
//! correlated NOT EXISTS sub-queries so that a row is excluded as soon as
//! any related element matches.

mod coerce;
mod pattern;
mod planner;
mod replace;


pub use replace::{MacroReplacer, ValueReplacer};

use crate::{
    ast::{ComparisonNode, ComparisonOperator, Node},
    config::CompilerConfig,
    criteria::{CriteriaQuery, Expr, FromId, OrderOp, Predicate},
    error::FilterError,
    model::{AttributeKind, ScalarType},
    schema::{FieldDescriptor, FieldSchema, MapShape, ResolvedPath},
    value::Value,
};
use coerce::coerce;
use pattern::{is_numeric, is_pattern, to_like_pattern, unescape_wildcards};
use planner::{JoinPlanner, NavigatedPath};
use tracing::debug;

///
/// TerminalExprs
/// Expressions a comparison reads in one scope.
///

struct TerminalExprs {
    value: Expr,
    map_key: Option<Expr>,
}

///
/// FilterCompiler
///
/// Single-use compiler bound to one `CriteriaQuery`.
/// `compile` consumes it; join caches never outlive one compilation.
///

pub struct FilterCompiler<'a, F: FieldDescriptor> {
    schema: &'a FieldSchema<F>,
    config: CompilerConfig,
    replacer: Option<&'a dyn ValueReplacer>,
    planner: JoinPlanner<'a>,
    joins_needed: bool,
}

impl<'a, F: FieldDescriptor> FilterCompiler<'a, F> {
    /// Bind a compiler to `query`, whose root must be the schema's entity.
    pub fn new(
        schema: &'a FieldSchema<F>,
        query: &'a mut CriteriaQuery,
        config: CompilerConfig,
    ) -> Self {
        Self {
            schema,
            config,
            replacer: None,
            planner: JoinPlanner::new(query),
            joins_needed: false,
        }
    }

    /// Rewrite ordering arguments (virtual properties) before comparison.
    #[must_use]
    pub fn with_replacer(mut self, replacer: &'a dyn ValueReplacer) -> Self {
        self.replacer = Some(replacer);
        self
    }

    /// Compile `node` into one predicate over the bound query.
    pub fn compile(mut self, node: &Node) -> Result<Predicate, FilterError> {
        if self.planner.query().root_entity() != self.schema.model() {
            return Err(FilterError::unsupported_field(format!(
                "query root {} does not match the filter schema of {}",
                self.planner.query().root_entity().entity_name,
                self.schema.model().entity_name
            )));
        }

        let predicate = self.visit(node)?.unwrap_or_else(|| {
            debug!(?node, "filter could not be interpreted, not restricting");
            Predicate::True
        });

        // joins navigated only for a negation are never read by the outer query
        self.planner.discard_unused_joins();

        Ok(predicate)
    }

    /// Singleton-list form of [`Self::compile`].
    pub fn compile_all(self, node: &Node) -> Result<Vec<Predicate>, FilterError> {
        self.compile(node).map(|predicate| vec![predicate])
    }

    // `None` for nodes the compiler does not interpret.
    fn visit(&mut self, node: &Node) -> Result<Option<Predicate>, FilterError> {
        match node {
            Node::And(children) => self.visit_and(children).map(Some),
            Node::Or(children) => self.visit_or(children).map(Some),
            Node::Comparison(comparison) => self.visit_comparison(comparison).map(Some),
            Node::Unrecognized(_) => Ok(None),
        }
    }

    // Conjuncts never share a joined row, even under a disjunction.
    fn visit_and(&mut self, children: &[Node]) -> Result<Predicate, FilterError> {
        let enclosing = self.planner.enter_conjunction();
        let children = self.visit_children(children);
        self.planner.restore_cache(enclosing);

        Ok(Predicate::and(children?))
    }

    fn visit_or(&mut self, children: &[Node]) -> Result<Predicate, FilterError> {
        let enclosing = self.planner.enter_disjunction();
        let children = self.visit_children(children);
        self.planner.restore_cache(enclosing);

        Ok(Predicate::or(children?))
    }

    fn visit_children(&mut self, children: &[Node]) -> Result<Vec<Predicate>, FilterError> {
        let mut predicates = Vec::with_capacity(children.len());

        for child in children {
            match self.visit(child)? {
                Some(predicate) => predicates.push(predicate),
                None => debug!(?child, "visit logical node children but could not parse it, ignoring"),
            }
        }

        Ok(predicates)
    }

    fn visit_comparison(&mut self, node: &ComparisonNode) -> Result<Predicate, FilterError> {
        debug!(selector = %node.selector, operator = %node.operator, "lowering comparison");

        let resolved = self.schema.resolve(&node.selector)?;
        debug!(property = %resolved.property(), "resolved filter field");
        let root = self.planner.query().root();
        let path = self.planner.navigate(root, resolved.navigation())?;

        let terminal = terminal_type(&path, resolved.map_shape);
        let values = node
            .arguments
            .iter()
            .map(|raw| coerce(&node.selector, resolved.field, terminal, raw))
            .collect::<Result<Vec<_>, _>>()?;

        let operator = node.operator.parse::<ComparisonOperator>();
        self.joins_needed |= !matches!(operator, Ok(op) if op.is_negation());
        let operator = operator.map_err(|symbol| FilterError::unsupported_operator(&symbol))?;

        let (Some(first_raw), Some(first)) = (node.arguments.first(), values.first()) else {
            return Err(FilterError::syntax(format!(
                "The given search parameter field {{{}}} has no argument",
                node.selector
            )));
        };

        let exprs = terminal_exprs(&path, resolved.map_shape);
        let predicate = match operator {
            ComparisonOperator::Equal => {
                self.with_map_key(&exprs, &resolved, self.equal_to(&exprs.value, first))
            }
            ComparisonOperator::NotEqual => self.not_equal_to(&exprs, &resolved, first),
            ComparisonOperator::GreaterThan => self.ordering(&exprs, &resolved, OrderOp::Gt, first_raw),
            ComparisonOperator::GreaterThanOrEqual => {
                self.ordering(&exprs, &resolved, OrderOp::Ge, first_raw)
            }
            ComparisonOperator::LessThan => self.ordering(&exprs, &resolved, OrderOp::Lt, first_raw),
            ComparisonOperator::LessThanOrEqual => {
                self.ordering(&exprs, &resolved, OrderOp::Le, first_raw)
            }
            ComparisonOperator::In => {
                self.with_map_key(&exprs, &resolved, self.in_(&exprs.value, &values))
            }
            ComparisonOperator::NotIn => self.out(&exprs, &resolved, &values),
        };
        let predicate = match predicate {
            Lowered::Done(predicate) => predicate,
            Lowered::NotExists(body) => self.not_exists(&resolved, body)?,
        };

        let query = self.planner.query_mut();
        for from in predicate.referenced_froms() {
            query.mark_referenced(from);
        }

        Ok(predicate)
    }

    //
    // operator lowering
    //

    fn equal_to(&self, expr: &Expr, value: &Value) -> Predicate {
        match value {
            Value::Null => Predicate::is_null(expr.clone()),
            Value::Text(text) if !is_numeric(text) => {
                if text.is_empty() {
                    Predicate::or(vec![
                        Predicate::is_null(expr.clone()),
                        Predicate::equal(expr.clone(), ""),
                    ])
                } else if is_pattern(text) {
                    Predicate::like(self.case_expr(expr), self.case_text(&self.like_pattern(text)))
                } else {
                    Predicate::equal(self.case_expr(expr), self.case_text(&unescape_wildcards(text)))
                }
            }
            other => Predicate::equal(expr.clone(), other.clone()),
        }
    }

    fn not_equal_to(
        &self,
        exprs: &TerminalExprs,
        resolved: &ResolvedPath<F>,
        value: &Value,
    ) -> Lowered {
        let expr = &exprs.value;

        match value {
            Value::Null => self.with_map_key(exprs, resolved, Predicate::is_not_null(expr.clone())),
            Value::Text(text) if !is_numeric(text) && text.is_empty() => self.with_map_key(
                exprs,
                resolved,
                Predicate::and(vec![
                    Predicate::is_not_null(expr.clone()),
                    Predicate::not_equal(expr.clone(), ""),
                ]),
            ),
            _ if resolved.is_simple() => {
                let inner = match value {
                    Value::Text(text) if !is_numeric(text) && is_pattern(text) => {
                        Predicate::not_like(self.case_expr(expr), self.case_text(&self.like_pattern(text)))
                    }
                    Value::Text(text) if !is_numeric(text) => Predicate::not_equal(
                        self.case_expr(expr),
                        self.case_text(&unescape_wildcards(text)),
                    ),
                    Value::Text(text) => {
                        Predicate::not_equal(self.case_expr(expr), self.case_text(text))
                    }
                    other => Predicate::not_equal(expr.clone(), other.clone()),
                };

                self.with_map_key(
                    exprs,
                    resolved,
                    Predicate::or(vec![Predicate::is_null(expr.clone()), inner]),
                )
            }
            _ => Lowered::NotExists(Body::Equal(value.clone())),
        }
    }

    fn in_(&self, expr: &Expr, values: &[Value]) -> Predicate {
        let texts: Vec<Value> = values
            .iter()
            .filter_map(Value::as_text)
            .map(|text| Value::Text(self.case_text(text)))
            .collect();

        if texts.is_empty() {
            Predicate::in_(expr.clone(), values.to_vec())
        } else {
            Predicate::in_(self.case_expr(expr), texts)
        }
    }

    fn out(
        &self,
        exprs: &TerminalExprs,
        resolved: &ResolvedPath<F>,
        values: &[Value],
    ) -> Lowered {
        if !resolved.is_simple() {
            return Lowered::NotExists(Body::In(values.to_vec()));
        }

        let expr = &exprs.value;
        self.with_map_key(
            exprs,
            resolved,
            Predicate::or(vec![
                Predicate::is_null(expr.clone()),
                Predicate::not(self.in_(expr, values)),
            ]),
        )
    }

    fn ordering(
        &self,
        exprs: &TerminalExprs,
        resolved: &ResolvedPath<F>,
        op: OrderOp,
        raw: &str,
    ) -> Lowered {
        let value = self
            .replacer
            .map_or_else(|| raw.to_string(), |replacer| replacer.replace(raw));

        self.with_map_key(
            exprs,
            resolved,
            Predicate::compare(exprs.value.clone(), op, Value::Text(value)),
        )
    }

    // Conjoin the map key test, when the field is a map.
    fn with_map_key(
        &self,
        exprs: &TerminalExprs,
        resolved: &ResolvedPath<F>,
        predicate: Predicate,
    ) -> Lowered {
        Lowered::Done(match (&exprs.map_key, &resolved.map_key) {
            (Some(key_expr), Some(key)) => Predicate::and(vec![
                Predicate::equal(self.case_expr(key_expr), self.case_text(key)),
                predicate,
            ]),
            _ => predicate,
        })
    }

    // NOT EXISTS (same entity, correlated by identifier, path re-joined inside).
    fn not_exists(
        &mut self,
        resolved: &ResolvedPath<F>,
        body: Body,
    ) -> Result<Predicate, FilterError> {
        if !self.joins_needed {
            self.planner.discard_unused_joins();
        }

        let outer_root = self.planner.query().root();
        let entity = self.planner.query().root_entity();
        let identifier = resolved.field.identifier_field();
        let (subquery, sub_root) = self.planner.query_mut().subquery(entity);

        let path = self.planner.navigate(sub_root, resolved.navigation())?;
        let exprs = terminal_exprs(&path, resolved.map_shape);

        let test = match body {
            Body::Equal(value) => match value {
                Value::Text(text) if !is_numeric(&text) && is_pattern(&text) => Predicate::like(
                    self.case_expr(&exprs.value),
                    self.case_text(&self.like_pattern(&text)),
                ),
                Value::Text(text) if !is_numeric(&text) => Predicate::equal(
                    self.case_expr(&exprs.value),
                    self.case_text(&unescape_wildcards(&text)),
                ),
                Value::Text(text) => {
                    Predicate::equal(self.case_expr(&exprs.value), self.case_text(&text))
                }
                other => Predicate::equal(exprs.value.clone(), other),
            },
            Body::In(values) => self.in_(&exprs.value, &values),
        };

        let mut restriction = vec![Predicate::EqualExpr(
            Expr::attribute(outer_root, identifier),
            Expr::attribute(sub_root, identifier),
        )];
        if let (Some(key_expr), Some(key)) = (&exprs.map_key, &resolved.map_key) {
            restriction.push(Predicate::equal(self.case_expr(key_expr), self.case_text(key)));
        }
        restriction.push(test);

        self.planner
            .query_mut()
            .set_subquery_restriction(subquery, Predicate::and(restriction));

        Ok(Predicate::not(Predicate::Exists(subquery)))
    }

    //
    // case normalization
    //

    fn case_expr(&self, expr: &Expr) -> Expr {
        if self.config.ensure_ignore_case {
            expr.clone().upper()
        } else {
            expr.clone()
        }
    }

    fn case_text(&self, text: &str) -> String {
        if self.config.ensure_ignore_case {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    }

    fn like_pattern(&self, text: &str) -> String {
        to_like_pattern(text, self.config.dialect)
    }
}

///
/// Lowered
/// Result of lowering one operator before sub-query materialization.
///

enum Lowered {
    Done(Predicate),
    NotExists(Body),
}

///
/// Body
/// Element test placed inside a NOT EXISTS sub-query.
///

enum Body {
    Equal(Value),
    In(Vec<Value>),
}

// Scalar type the arguments are coerced to.
fn terminal_type(path: &NavigatedPath, map_shape: Option<MapShape>) -> Option<ScalarType> {
    if let Some(MapShape::Tuple(tuple)) = map_shape {
        return path
            .attribute
            .kind
            .target_entity()
            .and_then(|entity| entity.attribute(tuple.value))
            .and_then(|attribute| attribute.kind.scalar_type());
    }

    path.attribute.kind.scalar_type()
}

// Value (and map key) expressions at the end of a navigated path.
fn terminal_exprs(path: &NavigatedPath, map_shape: Option<MapShape>) -> TerminalExprs {
    let from: FromId = path.from;

    match (map_shape, path.joined, path.attribute.kind) {
        (Some(MapShape::Tuple(tuple)), _, _) => TerminalExprs {
            value: Expr::attribute(from, tuple.value),
            map_key: Some(Expr::attribute(from, tuple.key)),
        },
        (_, true, AttributeKind::Map { .. }) => TerminalExprs {
            value: Expr::MapValue(from),
            map_key: Some(Expr::MapKey(from)),
        },
        (_, true, _) => TerminalExprs {
            value: Expr::Element(from),
            map_key: None,
        },
        (_, false, _) => TerminalExprs {
            value: Expr::attribute(from, path.attribute.name),
            map_key: None,
        },
    }
}
