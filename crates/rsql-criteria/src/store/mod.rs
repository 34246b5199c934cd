//! In-memory reference store.
//!
//! Executes a compiled `CriteriaQuery` over plain records with outer-join
//! row expansion and SQL three-valued logic. It is the oracle the compiler's
//! semantics are checked against, not a storage engine: no indexes, no
//! persistence, full scans only.

mod eval;
mod like;


pub use like::like_matches;

use crate::{
    config::Dialect,
    criteria::{CriteriaQuery, FromId, Predicate},
    model::EntityModel,
    value::Value,
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// FieldValue
/// Stored shape of one attribute of one record.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldValue {
    Scalar(Value),
    Reference(Option<i64>),
    Collection(Vec<i64>),
    Elements(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl FieldValue {
    /// Textual map from key/value pairs.
    pub fn map<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), Value::text(value)))
                .collect(),
        )
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

///
/// Record
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    pub id: i64,
    fields: BTreeMap<&'static str, FieldValue>,
}

impl Record {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, attribute: &'static str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(attribute, value.into());
        self
    }

    #[must_use]
    pub fn field(&self, attribute: &str) -> Option<&FieldValue> {
        self.fields.get(attribute)
    }
}

///
/// StoreError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("record {id} of entity '{entity}' does not exist")]
    UnknownRecord { entity: &'static str, id: i64 },

    #[error("predicate reads source {from} which is not bound in its scope")]
    UnboundSource { from: FromId },

    #[error("attribute '{attribute}' of entity '{entity}' cannot be joined")]
    NotJoinable {
        entity: &'static str,
        attribute: &'static str,
    },
}

///
/// MemoryStore
///

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    dialect: Dialect,
    tables: BTreeMap<&'static str, BTreeMap<i64, Record>>,
}

impl MemoryStore {
    #[must_use]
    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            tables: BTreeMap::new(),
        }
    }

    /// Insert or replace one record of `entity`.
    pub fn insert(&mut self, entity: &'static EntityModel, record: Record) {
        self.tables
            .entry(entity.entity_name)
            .or_default()
            .insert(record.id, record);
    }

    pub(crate) fn rows(&self, entity: &EntityModel) -> impl Iterator<Item = &Record> {
        self.tables
            .get(entity.entity_name)
            .into_iter()
            .flat_map(BTreeMap::values)
    }

    pub(crate) fn record(&self, entity: &EntityModel, id: i64) -> Result<&Record, StoreError> {
        self.tables
            .get(entity.entity_name)
            .and_then(|table| table.get(&id))
            .ok_or(StoreError::UnknownRecord {
                entity: entity.entity_name,
                id,
            })
    }

    /// Root identifiers of every produced row where `predicate` holds.
    ///
    /// Rows are produced per join combination, so a root can appear more than
    /// once, exactly like a SQL SELECT without DISTINCT.
    pub fn select(
        &self,
        query: &CriteriaQuery,
        predicate: &Predicate,
    ) -> Result<Vec<i64>, StoreError> {
        eval::Evaluator::new(self, query).select(predicate)
    }

    /// Like [`Self::select`], deduplicated and sorted.
    pub fn select_distinct(
        &self,
        query: &CriteriaQuery,
        predicate: &Predicate,
    ) -> Result<Vec<i64>, StoreError> {
        let mut ids = self.select(query, predicate)?;
        ids.sort_unstable();
        ids.dedup();

        Ok(ids)
    }
}
