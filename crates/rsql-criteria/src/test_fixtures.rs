//! Store models, field declarations and rows shared by unit tests.

use crate::{
    model::{AttributeKind, AttributeModel, EntityModel, EnumModel, ScalarType},
    schema::{FieldDescriptor, FieldSchema, MapTuple, ValueConverter},
    store::{FieldValue, MemoryStore, Record},
    value::{Value, ValueEnum},
};

pub(crate) static UPDATE_STATUS: EnumModel = EnumModel {
    path: "UpdateStatus",
    variants: &["UNKNOWN", "IN_SYNC", "PENDING", "ERROR", "REGISTERED"],
};

pub(crate) static TAG: EntityModel = EntityModel {
    entity_name: "Tag",
    primary_key: "id",
    attributes: &[
        AttributeModel::new("id", AttributeKind::Basic(ScalarType::Int)),
        AttributeModel::new("name", AttributeKind::Basic(ScalarType::Text)),
        AttributeModel::new("colour", AttributeKind::Basic(ScalarType::Text)),
    ],
};

pub(crate) static METADATA: EntityModel = EntityModel {
    entity_name: "TargetMetadata",
    primary_key: "id",
    attributes: &[
        AttributeModel::new("id", AttributeKind::Basic(ScalarType::Int)),
        AttributeModel::new("key", AttributeKind::Basic(ScalarType::Text)),
        AttributeModel::new("value", AttributeKind::Basic(ScalarType::Text)),
    ],
};

pub(crate) static DISTRIBUTION_SET: EntityModel = EntityModel {
    entity_name: "DistributionSet",
    primary_key: "id",
    attributes: &[
        AttributeModel::new("id", AttributeKind::Basic(ScalarType::Int)),
        AttributeModel::new("name", AttributeKind::Basic(ScalarType::Text)),
        AttributeModel::new("version", AttributeKind::Basic(ScalarType::Text)),
    ],
};

pub(crate) static TARGET: EntityModel = EntityModel {
    entity_name: "Target",
    primary_key: "id",
    attributes: &[
        AttributeModel::new("id", AttributeKind::Basic(ScalarType::Int)),
        AttributeModel::new("name", AttributeKind::Basic(ScalarType::Text)),
        AttributeModel::new("description", AttributeKind::Basic(ScalarType::Text)),
        AttributeModel::new(
            "updateStatus",
            AttributeKind::Basic(ScalarType::Enum(&UPDATE_STATUS)),
        ),
        AttributeModel::new("requestAttributes", AttributeKind::Basic(ScalarType::Bool)),
        AttributeModel::new("priority", AttributeKind::Basic(ScalarType::Int)),
        AttributeModel::new("tags", AttributeKind::Collection(&TAG)),
        AttributeModel::new("metadata", AttributeKind::Collection(&METADATA)),
        AttributeModel::new(
            "controllerAttributes",
            AttributeKind::Map {
                value: ScalarType::Text,
            },
        ),
        AttributeModel::new(
            "assignedDistributionSet",
            AttributeKind::Reference(&DISTRIBUTION_SET),
        ),
    ],
};

///
/// TargetField
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TargetField {
    Id,
    Name,
    Description,
    UpdateStatus,
    RequestAttributes,
    Priority,
    Tag,
    Attribute,
    Metadata,
    AssignedDs,
}

fn convert_priority(raw: &str) -> Option<Value> {
    match raw.to_ascii_lowercase().as_str() {
        "low" => Some(Value::Int(1)),
        "medium" => Some(Value::Int(2)),
        "high" => Some(Value::Int(3)),
        _ => None,
    }
}

impl FieldDescriptor for TargetField {
    const FIELDS: &'static [Self] = &[
        Self::Id,
        Self::Name,
        Self::Description,
        Self::UpdateStatus,
        Self::RequestAttributes,
        Self::Priority,
        Self::Tag,
        Self::Attribute,
        Self::Metadata,
        Self::AssignedDs,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Name => "NAME",
            Self::Description => "DESCRIPTION",
            Self::UpdateStatus => "UPDATESTATUS",
            Self::RequestAttributes => "REQUESTATTRIBUTES",
            Self::Priority => "PRIORITY",
            Self::Tag => "TAG",
            Self::Attribute => "ATTRIBUTE",
            Self::Metadata => "METADATA",
            Self::AssignedDs => "ASSIGNEDDS",
        }
    }

    fn store_path(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Description => "description",
            Self::UpdateStatus => "updateStatus",
            Self::RequestAttributes => "requestAttributes",
            Self::Priority => "priority",
            Self::Tag => "tags",
            Self::Attribute => "controllerAttributes",
            Self::Metadata => "metadata",
            Self::AssignedDs => "assignedDistributionSet",
        }
    }

    fn sub_attributes(self) -> &'static [&'static str] {
        match self {
            Self::Tag => &["name", "colour"],
            Self::AssignedDs => &["name", "version"],
            _ => &[],
        }
    }

    fn is_map(self) -> bool {
        matches!(self, Self::Attribute | Self::Metadata)
    }

    fn map_tuple(self) -> Option<MapTuple> {
        matches!(self, Self::Metadata).then_some(MapTuple::new("key", "value"))
    }

    fn value_converter(self) -> Option<ValueConverter> {
        matches!(self, Self::Priority).then_some(ValueConverter {
            convert: convert_priority,
            possible_values: &["low", "medium", "high"],
        })
    }
}

pub(crate) fn target_schema() -> FieldSchema<TargetField> {
    FieldSchema::new(&TARGET).expect("target fixture schema must register")
}

pub(crate) fn status(variant: &str) -> Value {
    Value::Enum(ValueEnum::new(UPDATE_STATUS.path, variant))
}

///
/// Fixture rows
///
/// 1 "application" tags {alpha}      attrs {os: linux}  meta {env: prod}
/// 2 "app"         tags {beta, gamma} attrs {os: win}   meta {}
/// 3 "my-app"      tags {}           attrs {}           meta {env: dev}
/// 4 "100%_done"   tags {alpha, beta} attrs {}           meta {}
///
/// Descriptions: 1 "first", 2 "", 3 and 4 null.
///

pub(crate) fn target_store() -> MemoryStore {
    let mut store = MemoryStore::default();

    for (id, name, colour) in [
        (11, "alpha", "red"),
        (12, "beta", "blue"),
        (13, "gamma", "red"),
    ] {
        store.insert(
            &TAG,
            Record::new(id)
                .with("name", Value::text(name))
                .with("colour", Value::text(colour)),
        );
    }
    for (id, key, value) in [(21, "env", "prod"), (22, "env", "dev")] {
        store.insert(
            &METADATA,
            Record::new(id)
                .with("key", Value::text(key))
                .with("value", Value::text(value)),
        );
    }
    store.insert(
        &DISTRIBUTION_SET,
        Record::new(31)
            .with("name", Value::text("ds-one"))
            .with("version", Value::text("1.0")),
    );

    store.insert(
        &TARGET,
        Record::new(1)
            .with("name", Value::text("application"))
            .with("description", Value::text("first"))
            .with("updateStatus", status("IN_SYNC"))
            .with("requestAttributes", Value::Bool(true))
            .with("priority", Value::Int(3))
            .with("tags", FieldValue::Collection(vec![11]))
            .with("metadata", FieldValue::Collection(vec![21]))
            .with("controllerAttributes", FieldValue::map([("os", "linux")]))
            .with("assignedDistributionSet", FieldValue::Reference(Some(31))),
    );
    store.insert(
        &TARGET,
        Record::new(2)
            .with("name", Value::text("app"))
            .with("description", Value::text(""))
            .with("updateStatus", status("PENDING"))
            .with("requestAttributes", Value::Bool(false))
            .with("priority", Value::Int(1))
            .with("tags", FieldValue::Collection(vec![12, 13]))
            .with("controllerAttributes", FieldValue::map([("os", "win")])),
    );
    store.insert(
        &TARGET,
        Record::new(3)
            .with("name", Value::text("my-app"))
            .with("updateStatus", status("ERROR"))
            .with("requestAttributes", Value::Bool(false))
            .with("priority", Value::Int(2))
            .with("metadata", FieldValue::Collection(vec![22])),
    );
    store.insert(
        &TARGET,
        Record::new(4)
            .with("name", Value::text("100%_done"))
            .with("updateStatus", status("IN_SYNC"))
            .with("requestAttributes", Value::Bool(true))
            .with("tags", FieldValue::Collection(vec![11, 12])),
    );

    store
}
