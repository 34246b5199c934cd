use crate::{
    criteria::{CriteriaQuery, Expr, FromId, FromKind, JoinType, OrderOp, Predicate, Scope},
    model::{AttributeKind, AttributeModel, EntityModel},
    store::{FieldValue, MemoryStore, Record, StoreError, like_matches},
    value::Value,
};
use std::{cmp::Ordering, collections::BTreeMap};

///
/// Binding
/// What one source is bound to in the current row combination.
///

#[derive(Clone, Debug)]
enum Binding<'s> {
    Row {
        entity: &'static EntityModel,
        record: &'s Record,
    },
    Element(Value),
    Entry {
        key: String,
        value: Value,
    },
}

// `None` is the NULL-extended side of an outer join.
type Env<'s> = BTreeMap<FromId, Option<Binding<'s>>>;

// Three-valued truth: `None` is UNKNOWN.
type Truth = Option<bool>;

///
/// Evaluator
///

pub(super) struct Evaluator<'s> {
    store: &'s MemoryStore,
    query: &'s CriteriaQuery,
}

impl<'s> Evaluator<'s> {
    pub(super) const fn new(store: &'s MemoryStore, query: &'s CriteriaQuery) -> Self {
        Self { store, query }
    }

    pub(super) fn select(&self, predicate: &Predicate) -> Result<Vec<i64>, StoreError> {
        let froms = self.scope_froms(Scope::Outer);
        let root = self.query.root();
        let mut selected = Vec::new();

        self.expand(&froms, 0, &mut Env::new(), &mut |env| {
            if self.eval(env, predicate)? == Some(true)
                && let Some(Some(Binding::Row { record, .. })) = env.get(&root)
            {
                selected.push(record.id);
            }

            Ok(false)
        })?;

        Ok(selected)
    }

    fn scope_froms(&self, scope: Scope) -> Vec<FromId> {
        self.query.active_froms(scope).map(|(id, _)| id).collect()
    }

    // Enumerate every row combination of `froms[index..]`; `visit` returns
    // true to stop early.
    fn expand(
        &self,
        froms: &[FromId],
        index: usize,
        env: &mut Env<'s>,
        visit: &mut dyn FnMut(&Env<'s>) -> Result<bool, StoreError>,
    ) -> Result<bool, StoreError> {
        let Some(&from) = froms.get(index) else {
            return visit(env);
        };

        for candidate in self.candidates(from, env)? {
            env.insert(from, candidate);
            let stop = self.expand(froms, index + 1, env, visit)?;
            env.remove(&from);
            if stop {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn candidates(&self, from: FromId, env: &Env<'s>) -> Result<Vec<Option<Binding<'s>>>, StoreError> {
        match self.query.from(from).kind {
            FromKind::Root { entity } => Ok(self
                .store
                .rows(entity)
                .map(|record| Some(Binding::Row { entity, record }))
                .collect()),
            FromKind::Join {
                parent,
                attribute,
                join_type,
            } => {
                let parent = env
                    .get(&parent)
                    .ok_or(StoreError::UnboundSource { from: parent })?;
                let children = match parent {
                    Some(binding) => self.children(binding, attribute)?,
                    None => Vec::new(),
                };

                Ok(match (children.is_empty(), join_type) {
                    (true, JoinType::Left) => vec![None],
                    (true, JoinType::Inner) => Vec::new(),
                    (false, _) => children.into_iter().map(Some).collect(),
                })
            }
        }
    }

    fn children(
        &self,
        parent: &Binding<'s>,
        attribute: &'static AttributeModel,
    ) -> Result<Vec<Binding<'s>>, StoreError> {
        let Binding::Row { entity, record } = parent else {
            return Err(StoreError::NotJoinable {
                entity: "<element>",
                attribute: attribute.name,
            });
        };
        let not_joinable = || StoreError::NotJoinable {
            entity: entity.entity_name,
            attribute: attribute.name,
        };

        match (attribute.kind, record.field(attribute.name)) {
            (AttributeKind::Basic(_), _) => Err(not_joinable()),
            (_, None) => Ok(Vec::new()),
            (AttributeKind::Reference(target), Some(FieldValue::Reference(id))) => id
                .iter()
                .map(|id| self.row(target, *id))
                .collect(),
            (AttributeKind::Collection(target), Some(FieldValue::Collection(ids))) => {
                ids.iter().map(|id| self.row(target, *id)).collect()
            }
            (AttributeKind::ElementCollection(_), Some(FieldValue::Elements(values))) => {
                Ok(values.iter().cloned().map(Binding::Element).collect())
            }
            (AttributeKind::Map { .. }, Some(FieldValue::Map(entries))) => Ok(entries
                .iter()
                .map(|(key, value)| Binding::Entry {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect()),
            _ => Err(not_joinable()),
        }
    }

    fn row(&self, entity: &'static EntityModel, id: i64) -> Result<Binding<'s>, StoreError> {
        Ok(Binding::Row {
            entity,
            record: self.store.record(entity, id)?,
        })
    }

    fn eval(&self, env: &Env<'s>, predicate: &Predicate) -> Result<Truth, StoreError> {
        Ok(match predicate {
            Predicate::True => Some(true),
            Predicate::And(children) => {
                let mut truth = Some(true);
                for child in children {
                    match self.eval(env, child)? {
                        Some(false) => return Ok(Some(false)),
                        None => truth = None,
                        Some(true) => {}
                    }
                }
                truth
            }
            Predicate::Or(children) => {
                let mut truth = Some(false);
                for child in children {
                    match self.eval(env, child)? {
                        Some(true) => return Ok(Some(true)),
                        None => truth = None,
                        Some(false) => {}
                    }
                }
                truth
            }
            Predicate::Not(inner) => self.eval(env, inner)?.map(|truth| !truth),
            Predicate::IsNull(expr) => Some(self.expr(env, expr)?.is_none()),
            Predicate::IsNotNull(expr) => Some(self.expr(env, expr)?.is_some()),
            Predicate::Equal(expr, value) => self
                .expr(env, expr)?
                .and_then(|left| sql_equal(&left, value)),
            Predicate::NotEqual(expr, value) => self
                .expr(env, expr)?
                .and_then(|left| sql_equal(&left, value))
                .map(|equal| !equal),
            Predicate::EqualExpr(left, right) => {
                match (self.expr(env, left)?, self.expr(env, right)?) {
                    (Some(left), Some(right)) => sql_equal(&left, &right),
                    _ => None,
                }
            }
            Predicate::Like {
                expr,
                pattern,
                escape,
            } => self.like(env, expr, pattern, *escape)?,
            Predicate::NotLike {
                expr,
                pattern,
                escape,
            } => self.like(env, expr, pattern, *escape)?.map(|truth| !truth),
            Predicate::In(expr, values) => self.expr(env, expr)?.and_then(|left| {
                let mut truth = Some(false);
                for value in values {
                    match sql_equal(&left, value) {
                        Some(true) => return Some(true),
                        None => truth = None,
                        Some(false) => {}
                    }
                }
                truth
            }),
            Predicate::Compare { expr, op, value } => self
                .expr(env, expr)?
                .and_then(|left| compare(&left, value))
                .map(|ordering| match op {
                    OrderOp::Gt => ordering == Ordering::Greater,
                    OrderOp::Ge => ordering != Ordering::Less,
                    OrderOp::Lt => ordering == Ordering::Less,
                    OrderOp::Le => ordering != Ordering::Greater,
                }),
            Predicate::Exists(subquery) => {
                let restriction = &self.query.subquery_def(*subquery).restriction;
                let froms = self.scope_froms(Scope::Subquery(*subquery));
                let mut inner = env.clone();

                Some(self.expand(&froms, 0, &mut inner, &mut |env| {
                    Ok(self.eval(env, restriction)? == Some(true))
                })?)
            }
        })
    }

    fn like(
        &self,
        env: &Env<'s>,
        expr: &Expr,
        pattern: &str,
        escape: char,
    ) -> Result<Truth, StoreError> {
        Ok(self
            .expr(env, expr)?
            .map(|value| like_matches(&as_text(&value), pattern, escape, self.store.dialect)))
    }

    // `None` is SQL NULL.
    fn expr(&self, env: &Env<'s>, expr: &Expr) -> Result<Option<Value>, StoreError> {
        let from = expr.from_id();
        let binding = env.get(&from).ok_or(StoreError::UnboundSource { from })?;
        let Some(binding) = binding else {
            return Ok(None);
        };

        Ok(match (expr, binding) {
            (Expr::Upper(inner), _) => self
                .expr(env, inner)?
                .map(|value| Value::Text(as_text(&value).to_uppercase())),
            (Expr::Attribute { name, .. }, Binding::Row { entity, record }) => {
                attribute_value(entity, record, name)
            }
            (Expr::Element(_), Binding::Row { record, .. }) => Some(Value::Int(record.id)),
            (Expr::Element(_), Binding::Element(value))
            | (Expr::MapValue(_), Binding::Entry { value, .. }) => non_null(value.clone()),
            (Expr::MapKey(_), Binding::Entry { key, .. }) => Some(Value::Text(key.clone())),
            _ => None,
        })
    }
}

fn attribute_value(entity: &EntityModel, record: &Record, name: &str) -> Option<Value> {
    if name == entity.primary_key {
        return Some(Value::Int(record.id));
    }

    match record.field(name)? {
        FieldValue::Scalar(value) => non_null(value.clone()),
        FieldValue::Reference(id) => id.map(Value::Int),
        FieldValue::Collection(_) | FieldValue::Elements(_) | FieldValue::Map(_) => None,
    }
}

fn non_null(value: Value) -> Option<Value> {
    (!value.is_null()).then_some(value)
}

fn as_text(value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::Enum(value) => value.variant.clone(),
        Value::Null => String::new(),
        Value::Bool(value) => value.to_string(),
        Value::Int(value) => value.to_string(),
    }
}

fn sql_equal(left: &Value, right: &Value) -> Option<bool> {
    compare(left, right).map(|ordering| ordering == Ordering::Equal)
}

// Typed comparison; textual literals bind to the column type the way a
// database binds string parameters. Incomparable pairs are UNKNOWN.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Text(left), Value::Text(right)) => Some(left.cmp(right)),
        (Value::Int(left), Value::Int(right)) => Some(left.cmp(right)),
        (Value::Bool(left), Value::Bool(right)) => Some(left.cmp(right)),
        (Value::Enum(left), Value::Enum(right)) => {
            (left.path == right.path).then(|| left.variant.cmp(&right.variant))
        }
        (Value::Int(left), Value::Text(right)) => {
            right.parse::<i64>().ok().map(|right| left.cmp(&right))
        }
        (Value::Bool(left), Value::Text(right)) => {
            right.parse::<bool>().ok().map(|right| left.cmp(&right))
        }
        (Value::Enum(left), Value::Text(right)) => Some(left.variant.as_str().cmp(right)),
        (Value::Text(_), Value::Int(_) | Value::Bool(_) | Value::Enum(_)) => {
            compare(right, left).map(Ordering::reverse)
        }
        _ => None,
    }
}
