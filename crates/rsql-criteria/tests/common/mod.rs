#![allow(dead_code)]

use rsql_criteria::{
    prelude::*,
    store::{FieldValue, MemoryStore, Record, StoreError},
    value::ValueEnum,
};
use tracing_subscriber::EnvFilter;

pub static DEVICE_KIND: EnumModel = EnumModel {
    path: "DeviceKind",
    variants: &["SENSOR", "GATEWAY"],
};

pub static LABEL: EntityModel = EntityModel {
    entity_name: "Label",
    primary_key: "id",
    attributes: &[
        AttributeModel::new("id", AttributeKind::Basic(ScalarType::Int)),
        AttributeModel::new("name", AttributeKind::Basic(ScalarType::Text)),
    ],
};

pub static DEVICE: EntityModel = EntityModel {
    entity_name: "Device",
    primary_key: "id",
    attributes: &[
        AttributeModel::new("id", AttributeKind::Basic(ScalarType::Int)),
        AttributeModel::new("name", AttributeKind::Basic(ScalarType::Text)),
        AttributeModel::new("kind", AttributeKind::Basic(ScalarType::Enum(&DEVICE_KIND))),
        AttributeModel::new("a", AttributeKind::Basic(ScalarType::Int)),
        AttributeModel::new("b", AttributeKind::Basic(ScalarType::Int)),
        AttributeModel::new("labels", AttributeKind::Collection(&LABEL)),
        AttributeModel::new(
            "attributes",
            AttributeKind::Map {
                value: ScalarType::Text,
            },
        ),
    ],
};

///
/// DeviceField
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeviceField {
    Id,
    Name,
    Kind,
    A,
    B,
    Label,
    Attribute,
}

impl FieldDescriptor for DeviceField {
    const FIELDS: &'static [Self] = &[
        Self::Id,
        Self::Name,
        Self::Kind,
        Self::A,
        Self::B,
        Self::Label,
        Self::Attribute,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Name => "NAME",
            Self::Kind => "KIND",
            Self::A => "A",
            Self::B => "B",
            Self::Label => "LABEL",
            Self::Attribute => "ATTRIBUTE",
        }
    }

    fn store_path(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Kind => "kind",
            Self::A => "a",
            Self::B => "b",
            Self::Label => "labels",
            Self::Attribute => "attributes",
        }
    }

    fn sub_attributes(self) -> &'static [&'static str] {
        match self {
            Self::Label => &["name"],
            _ => &[],
        }
    }

    fn is_map(self) -> bool {
        matches!(self, Self::Attribute)
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn device_schema() -> FieldSchema<DeviceField> {
    FieldSchema::new(&DEVICE).expect("device schema registers")
}

fn kind(variant: &str) -> Value {
    Value::Enum(ValueEnum::new(DEVICE_KIND.path, variant))
}

///
/// Rows
///
/// 1 "application" labels {v}    attributes {key1: v}          a=1 b=2 SENSOR
/// 2 "app"         labels {w}    attributes {key1: w, key2: v} a=1 b=3 GATEWAY
/// 3 "my-app"      labels {}     attributes {}                 a=2 b=2 SENSOR
/// 4 "100%_done"   labels {v, w} attributes {}                 a=1 b=4 (no kind)
///

pub struct DeviceRow {
    pub id: i64,
    pub name: &'static str,
    pub labels: &'static [&'static str],
    pub attributes: &'static [(&'static str, &'static str)],
    pub a: i64,
    pub b: i64,
    pub kind: Option<&'static str>,
}

pub const ROWS: &[DeviceRow] = &[
    DeviceRow {
        id: 1,
        name: "application",
        labels: &["v"],
        attributes: &[("key1", "v")],
        a: 1,
        b: 2,
        kind: Some("SENSOR"),
    },
    DeviceRow {
        id: 2,
        name: "app",
        labels: &["w"],
        attributes: &[("key1", "w"), ("key2", "v")],
        a: 1,
        b: 3,
        kind: Some("GATEWAY"),
    },
    DeviceRow {
        id: 3,
        name: "my-app",
        labels: &[],
        attributes: &[],
        a: 2,
        b: 2,
        kind: Some("SENSOR"),
    },
    DeviceRow {
        id: 4,
        name: "100%_done",
        labels: &["v", "w"],
        attributes: &[],
        a: 1,
        b: 4,
        kind: None,
    },
];

const LABELS: &[(i64, &str)] = &[(101, "v"), (102, "w"), (103, "x")];

pub fn device_store() -> MemoryStore {
    let mut store = MemoryStore::default();

    for &(id, name) in LABELS {
        store.insert(&LABEL, Record::new(id).with("name", Value::text(name)));
    }

    for row in ROWS {
        let label_ids: Vec<i64> = row
            .labels
            .iter()
            .filter_map(|label| LABELS.iter().find(|(_, name)| name == label).map(|(id, _)| *id))
            .collect();

        let mut record = Record::new(row.id)
            .with("name", Value::text(row.name))
            .with("a", Value::Int(row.a))
            .with("b", Value::Int(row.b))
            .with("labels", FieldValue::Collection(label_ids))
            .with("attributes", FieldValue::map(row.attributes.iter().copied()));
        if let Some(variant) = row.kind {
            record = record.with("kind", kind(variant));
        }

        store.insert(&DEVICE, record);
    }

    store
}

///
/// Compiled
/// One filter compiled into its own fresh query.
///

pub struct Compiled {
    pub query: CriteriaQuery,
    pub predicate: Predicate,
}

impl Compiled {
    pub fn explain(&self) -> String {
        self.query.explain(&self.predicate)
    }

    pub fn select(&self, store: &MemoryStore) -> Result<Vec<i64>, StoreError> {
        store.select(&self.query, &self.predicate)
    }

    pub fn select_distinct(&self, store: &MemoryStore) -> Result<Vec<i64>, StoreError> {
        store.select_distinct(&self.query, &self.predicate)
    }
}

pub fn compile_with(config: CompilerConfig, node: &Node) -> Result<Compiled, FilterError> {
    let schema = device_schema();
    let mut query = CriteriaQuery::new(&DEVICE);
    let predicate = FilterCompiler::new(&schema, &mut query, config).compile(node)?;

    Ok(Compiled { query, predicate })
}

pub fn compile(node: &Node) -> Result<Compiled, FilterError> {
    compile_with(CompilerConfig::default(), node)
}

/// Distinct ids selected by `node` over the device rows.
pub fn matching(node: &Node) -> Vec<i64> {
    compile(node)
        .expect("filter compiles")
        .select_distinct(&device_store())
        .expect("store evaluates")
}
