//! Module: compile::planner
//! Responsibility: materialize store paths as joins in a `CriteriaQuery`.
//! Does not own: predicate construction.
//! Boundary: the only place the compiler creates or discards joins.

use crate::{
    criteria::{CriteriaQuery, FromId, JoinType},
    error::FilterError,
    model::AttributeModel,
};
use std::collections::BTreeMap;
use tracing::trace;

///
/// JoinKey
/// Identity of a reusable join: attribute name and joined type.
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub(crate) struct JoinKey {
    attribute: &'static str,
    target: &'static str,
}

impl JoinKey {
    const fn of(attribute: &'static AttributeModel) -> Self {
        let target = match attribute.kind.target_entity() {
            Some(entity) => entity.entity_name,
            None => attribute.name,
        };

        Self {
            attribute: attribute.name,
            target,
        }
    }
}

pub(crate) type JoinCache = BTreeMap<JoinKey, FromId>;

///
/// NavigatedPath
///
/// End of a navigation: the source the terminal attribute is read from.
/// `joined` is set when the terminal attribute itself was joined (relations,
/// collections and maps); `from` is then the join.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct NavigatedPath {
    pub from: FromId,
    pub attribute: &'static AttributeModel,
    pub joined: bool,
}

///
/// JoinPlanner
///

pub(crate) struct JoinPlanner<'q> {
    query: &'q mut CriteriaQuery,
    // `Some` while inside a disjunction
    cache: Option<JoinCache>,
}

impl<'q> JoinPlanner<'q> {
    pub(crate) const fn new(query: &'q mut CriteriaQuery) -> Self {
        Self { query, cache: None }
    }

    pub(crate) fn query(&self) -> &CriteriaQuery {
        &*self.query
    }

    pub(crate) fn query_mut(&mut self) -> &mut CriteriaQuery {
        &mut *self.query
    }

    /// Open a disjunction scope with an empty cache; returns the enclosing one.
    pub(crate) fn enter_disjunction(&mut self) -> Option<JoinCache> {
        self.cache.replace(JoinCache::new())
    }

    /// Open a conjunction scope: no reuse until `restore_cache`.
    pub(crate) fn enter_conjunction(&mut self) -> Option<JoinCache> {
        self.cache.take()
    }

    /// Close a scope, restoring what `enter_disjunction`/`enter_conjunction` returned.
    pub(crate) fn restore_cache(&mut self, enclosing: Option<JoinCache>) {
        self.cache = enclosing;
    }

    /// Walk `segments` from `start`, joining every non-basic attribute.
    pub(crate) fn navigate(
        &mut self,
        start: FromId,
        segments: &[&'static str],
    ) -> Result<NavigatedPath, FilterError> {
        let mut from = start;
        let mut reached = None;

        for (position, segment) in segments.iter().copied().enumerate() {
            let entity = self.query.from(from).entity().ok_or_else(|| {
                FilterError::unsupported_field(format!(
                    "RSQL field path segment {{{segment}}} cannot be navigated"
                ))
            })?;
            let attribute = entity.attribute(segment).ok_or_else(|| {
                FilterError::unsupported_field(format!(
                    "RSQL field path segment {{{segment}}} does not exist on {}",
                    entity.entity_name
                ))
            })?;
            let last = position + 1 == segments.len();

            if attribute.kind.is_basic() {
                if !last {
                    return Err(FilterError::unsupported_field(format!(
                        "RSQL field path segment {{{segment}}} is not a relation"
                    )));
                }
                reached = Some(NavigatedPath {
                    from,
                    attribute,
                    joined: false,
                });
            } else {
                from = self.join(from, attribute);
                reached = Some(NavigatedPath {
                    from,
                    attribute,
                    joined: true,
                });
            }
        }

        reached.ok_or_else(|| FilterError::unsupported_field("RSQL field path cannot be empty"))
    }

    // LEFT join, reused from the cache only for outer-root joins in a disjunction.
    fn join(&mut self, parent: FromId, attribute: &'static AttributeModel) -> FromId {
        let cacheable = parent == self.query.root();

        if let (true, Some(cache)) = (cacheable, self.cache.as_mut()) {
            let key = JoinKey::of(attribute);
            if let Some(&join) = cache.get(&key) {
                trace!(join = join.index(), attribute = attribute.name, "reusing join");
                return join;
            }

            let join = self.query.join(parent, attribute, JoinType::Left);
            cache.insert(key, join);
            return join;
        }

        self.query.join(parent, attribute, JoinType::Left)
    }

    /// Drop outer joins nothing references and forget them in the cache.
    pub(crate) fn discard_unused_joins(&mut self) {
        let discarded = self.query.discard_unused_root_joins();

        if let Some(cache) = self.cache.as_mut() {
            cache.retain(|_, join| !discarded.contains(join));
        }
    }
}
