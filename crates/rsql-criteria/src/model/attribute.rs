use crate::model::EntityModel;

///
/// AttributeModel
/// Runtime attribute metadata used by path navigation and coercion.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AttributeModel {
    /// Attribute name as used in store paths.
    pub name: &'static str,
    /// Persistence shape of the attribute.
    pub kind: AttributeKind,
}

impl AttributeModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: AttributeKind) -> Self {
        Self { name, kind }
    }
}

///
/// AttributeKind
///
/// Persistence shape of one attribute.
/// Only `Basic` attributes are reached by direct access; every other kind
/// needs a join.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttributeKind {
    /// Scalar column on the owning row.
    Basic(ScalarType),

    /// Single-valued relationship (many-to-one / one-to-one).
    Reference(&'static EntityModel),

    /// Multi-valued relationship (one-to-many / many-to-many).
    Collection(&'static EntityModel),

    /// Multi-valued scalar collection owned by the row.
    ElementCollection(ScalarType),

    /// Native key/value map owned by the row; keys are textual.
    Map { value: ScalarType },
}

impl AttributeKind {
    #[must_use]
    pub const fn is_basic(&self) -> bool {
        matches!(self, Self::Basic(_))
    }

    /// Entity reached by navigating through this attribute, if any.
    #[must_use]
    pub const fn target_entity(&self) -> Option<&'static EntityModel> {
        match self {
            Self::Reference(entity) | Self::Collection(entity) => Some(*entity),
            Self::Basic(_) | Self::ElementCollection(_) | Self::Map { .. } => None,
        }
    }

    /// Scalar type produced when this attribute terminates a path.
    #[must_use]
    pub const fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Self::Basic(scalar) | Self::ElementCollection(scalar) => Some(*scalar),
            Self::Map { value } => Some(*value),
            Self::Reference(_) | Self::Collection(_) => None,
        }
    }
}

///
/// ScalarType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScalarType {
    Bool,
    Int,
    Text,
    Enum(&'static EnumModel),
}

///
/// EnumModel
/// Closed set of constants a store enum column accepts.
///

#[derive(Debug, Eq, PartialEq)]
pub struct EnumModel {
    pub path: &'static str,
    pub variants: &'static [&'static str],
}

impl EnumModel {
    /// Case-insensitive variant lookup returning the declared spelling.
    #[must_use]
    pub fn variant(&self, name: &str) -> Option<&'static str> {
        self.variants
            .iter()
            .copied()
            .find(|variant| variant.eq_ignore_ascii_case(name))
    }
}
