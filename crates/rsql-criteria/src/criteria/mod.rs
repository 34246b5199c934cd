//! Criteria queries: the store-side target of filter compilation.
//!
//! A [`CriteriaQuery`] is an arena of query sources (the root, joins and
//! correlated sub-query roots). Compiled predicates refer to sources by
//! [`FromId`], so a predicate is only meaningful together with the query it
//! was compiled into.

mod explain;
mod predicate;


pub use predicate::{OrderOp, Predicate};

use crate::model::{AttributeModel, EntityModel};
use std::fmt;
use tracing::trace;

///
/// FromId
/// Handle to one query source inside a `CriteriaQuery`.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FromId(usize);

impl FromId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

///
/// SubqueryId
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SubqueryId(usize);

///
/// JoinType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinType {
    Inner,
    Left,
}

///
/// Scope
/// Which SELECT a source belongs to.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    Outer,
    Subquery(SubqueryId),
}

///
/// FromKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FromKind {
    Root {
        entity: &'static EntityModel,
    },
    Join {
        parent: FromId,
        attribute: &'static AttributeModel,
        join_type: JoinType,
    },
}

///
/// FromNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FromNode {
    pub kind: FromKind,
    pub scope: Scope,
    discarded: bool,
    referenced: bool,
}

impl FromNode {
    /// Entity rows this source ranges over, if it ranges over entities.
    #[must_use]
    pub const fn entity(&self) -> Option<&'static EntityModel> {
        match self.kind {
            FromKind::Root { entity } => Some(entity),
            FromKind::Join { attribute, .. } => attribute.kind.target_entity(),
        }
    }

    #[must_use]
    pub const fn parent(&self) -> Option<FromId> {
        match self.kind {
            FromKind::Root { .. } => None,
            FromKind::Join { parent, .. } => Some(parent),
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.discarded
    }
}

///
/// Subquery
/// Correlated sub-select; its restriction may reference outer sources.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subquery {
    pub root: FromId,
    pub restriction: Predicate,
}

///
/// Expr
/// Scalar expression over the sources of a query.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expr {
    /// Named attribute of an entity source.
    Attribute { from: FromId, name: &'static str },
    /// The joined element itself (element collections, joined entities).
    Element(FromId),
    /// Key component of a native map join.
    MapKey(FromId),
    /// Value component of a native map join.
    MapValue(FromId),
    Upper(Box<Self>),
}

impl Expr {
    #[must_use]
    pub const fn attribute(from: FromId, name: &'static str) -> Self {
        Self::Attribute { from, name }
    }

    #[must_use]
    pub fn upper(self) -> Self {
        Self::Upper(Box::new(self))
    }

    /// Source the expression reads from.
    #[must_use]
    pub fn from_id(&self) -> FromId {
        match self {
            Self::Attribute { from, .. }
            | Self::Element(from)
            | Self::MapKey(from)
            | Self::MapValue(from) => *from,
            Self::Upper(inner) => inner.from_id(),
        }
    }
}

///
/// CriteriaQuery
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CriteriaQuery {
    entity: &'static EntityModel,
    froms: Vec<FromNode>,
    subqueries: Vec<Subquery>,
}

impl CriteriaQuery {
    /// Start a query selecting rows of `entity`.
    #[must_use]
    pub fn new(entity: &'static EntityModel) -> Self {
        Self {
            entity,
            froms: vec![FromNode {
                kind: FromKind::Root { entity },
                scope: Scope::Outer,
                discarded: false,
                referenced: true,
            }],
            subqueries: Vec::new(),
        }
    }

    #[must_use]
    pub const fn root(&self) -> FromId {
        FromId(0)
    }

    #[must_use]
    pub const fn root_entity(&self) -> &'static EntityModel {
        self.entity
    }

    /// Borrow one source; ids are only minted by this query.
    #[must_use]
    pub fn from(&self, id: FromId) -> &FromNode {
        &self.froms[id.0]
    }

    /// Add a join below `parent`, in the parent's scope.
    pub fn join(
        &mut self,
        parent: FromId,
        attribute: &'static AttributeModel,
        join_type: JoinType,
    ) -> FromId {
        let id = FromId(self.froms.len());
        let scope = self.froms[parent.0].scope;
        trace!(join = id.0, parent = parent.0, attribute = attribute.name, "adding join");

        self.froms.push(FromNode {
            kind: FromKind::Join {
                parent,
                attribute,
                join_type,
            },
            scope,
            discarded: false,
            referenced: false,
        });

        id
    }

    /// Open a correlated sub-query over `entity`; its restriction starts vacuous.
    pub fn subquery(&mut self, entity: &'static EntityModel) -> (SubqueryId, FromId) {
        let subquery = SubqueryId(self.subqueries.len());
        let root = FromId(self.froms.len());

        self.froms.push(FromNode {
            kind: FromKind::Root { entity },
            scope: Scope::Subquery(subquery),
            discarded: false,
            referenced: true,
        });
        self.subqueries.push(Subquery {
            root,
            restriction: Predicate::True,
        });

        (subquery, root)
    }

    pub fn set_subquery_restriction(&mut self, subquery: SubqueryId, restriction: Predicate) {
        self.subqueries[subquery.0].restriction = restriction;
    }

    #[must_use]
    pub fn subquery_def(&self, subquery: SubqueryId) -> &Subquery {
        &self.subqueries[subquery.0]
    }

    /// Active sources of one scope, parents before children.
    pub fn active_froms(&self, scope: Scope) -> impl Iterator<Item = (FromId, &FromNode)> {
        self.froms
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.scope == scope && node.is_active())
            .map(|(index, node)| (FromId(index), node))
    }

    /// Active joins of the outer query.
    #[must_use]
    pub fn root_joins(&self) -> Vec<FromId> {
        self.active_froms(Scope::Outer)
            .filter(|(_, node)| node.parent().is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// Record that an emitted predicate reads `from` (and therefore its ancestors).
    pub fn mark_referenced(&mut self, from: FromId) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = &mut self.froms[id.0];
            node.referenced = true;
            current = node.parent();
        }
    }

    /// Drop outer joins no emitted predicate reads; returns the dropped ids.
    pub fn discard_unused_root_joins(&mut self) -> Vec<FromId> {
        let mut discarded = Vec::new();

        for (index, node) in self.froms.iter_mut().enumerate() {
            if node.scope == Scope::Outer && node.parent().is_some() && !node.referenced {
                node.discarded = true;
                discarded.push(FromId(index));
            }
        }
        if !discarded.is_empty() {
            trace!(count = discarded.len(), "discarded unused root joins");
        }

        discarded
    }
}

impl fmt::Display for FromId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}
