mod common;

use common::{DeviceRow, ROWS, compile, device_store, matching};
use proptest::prelude::*;
use rsql_criteria::prelude::*;

///
/// Leaf
/// One comparison over the device rows, paired with a direct evaluation.
///

#[derive(Clone, Debug)]
enum Leaf {
    Name(&'static str),
    NamePrefix(&'static str),
    A { value: i64, negated: bool },
    Label { value: &'static str, negated: bool },
    LabelIn(Vec<&'static str>),
    LabelOut(Vec<&'static str>),
    Attribute { key: &'static str, value: &'static str, negated: bool },
    Kind { variant: &'static str, negated: bool },
}

impl Leaf {
    // negations and scalar comparisons only; nothing joins the outer query
    const fn is_join_free(&self) -> bool {
        match self {
            Self::Label { negated, .. } => *negated,
            Self::LabelIn(_) | Self::Attribute { .. } => false,
            _ => true,
        }
    }

    fn to_node(&self) -> Node {
        let operator = |negated: bool| if negated { "!=" } else { "==" };

        match self {
            Self::Name(value) => Node::eq("name", value),
            Self::NamePrefix(prefix) => Node::eq("name", &format!("{prefix}*")),
            Self::A { value, negated } => {
                Node::comparison("a", operator(*negated), [value.to_string()])
            }
            Self::Label { value, negated } => {
                Node::comparison("label.name", operator(*negated), [*value])
            }
            Self::LabelIn(values) => Node::in_("label.name", values),
            Self::LabelOut(values) => Node::out("label.name", values),
            Self::Attribute {
                key,
                value,
                negated,
            } => Node::comparison(&format!("attribute.{key}"), operator(*negated), [*value]),
            Self::Kind { variant, negated } => Node::comparison(
                "kind",
                operator(*negated),
                [variant.to_lowercase()],
            ),
        }
    }

    fn holds(&self, row: &DeviceRow) -> bool {
        match self {
            Self::Name(value) => row.name == *value,
            Self::NamePrefix(prefix) => row.name.starts_with(prefix),
            Self::A { value, negated } => (row.a == *value) != *negated,
            Self::Label { value, negated } => row.labels.contains(value) != *negated,
            Self::LabelIn(values) => row.labels.iter().any(|label| values.contains(label)),
            Self::LabelOut(values) => !row.labels.iter().any(|label| values.contains(label)),
            // simple map negation still needs the key to be present
            Self::Attribute {
                key,
                value,
                negated,
            } => row
                .attributes
                .iter()
                .any(|(k, v)| k == key && (v == value) != *negated),
            Self::Kind { variant, negated } => (row.kind == Some(*variant)) != *negated,
        }
    }
}

///
/// Filter
///

#[derive(Clone, Debug)]
enum Filter {
    Leaf(Leaf),
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl Filter {
    fn to_node(&self) -> Node {
        match self {
            Self::Leaf(leaf) => leaf.to_node(),
            Self::And(children) => Node::and(children.iter().map(Self::to_node).collect()),
            Self::Or(children) => Node::or(children.iter().map(Self::to_node).collect()),
        }
    }

    fn holds(&self, row: &DeviceRow) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.holds(row),
            Self::And(children) => children.iter().all(|child| child.holds(row)),
            Self::Or(children) => children.iter().any(|child| child.holds(row)),
        }
    }

    fn expected(&self) -> Vec<i64> {
        ROWS.iter()
            .filter(|row| self.holds(row))
            .map(|row| row.id)
            .collect()
    }
}

//
// strategies
//

fn arb_label() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("v"), Just("w"), Just("x")]
}

fn arb_leaf() -> impl Strategy<Value = Leaf> {
    prop_oneof![
        prop_oneof![Just("app"), Just("my-app"), Just("nomatch")].prop_map(Leaf::Name),
        prop_oneof![Just("a"), Just("my"), Just("100%_")].prop_map(Leaf::NamePrefix),
        (1i64..4, any::<bool>()).prop_map(|(value, negated)| Leaf::A { value, negated }),
        (arb_label(), any::<bool>()).prop_map(|(value, negated)| Leaf::Label { value, negated }),
        prop::collection::vec(arb_label(), 1..3).prop_map(Leaf::LabelIn),
        prop::collection::vec(arb_label(), 1..3).prop_map(Leaf::LabelOut),
        (
            prop_oneof![Just("key1"), Just("key2")],
            prop_oneof![Just("v"), Just("w")],
            any::<bool>()
        )
            .prop_map(|(key, value, negated)| Leaf::Attribute {
                key,
                value,
                negated
            }),
        (prop_oneof![Just("SENSOR"), Just("GATEWAY")], any::<bool>())
            .prop_map(|(variant, negated)| Leaf::Kind { variant, negated }),
    ]
}

fn arb_tree(leaf: impl Strategy<Value = Leaf> + 'static) -> impl Strategy<Value = Filter> {
    leaf.prop_map(Filter::Leaf).prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Filter::And),
            prop::collection::vec(inner, 1..4).prop_map(Filter::Or),
        ]
    })
}

fn arb_filter() -> impl Strategy<Value = Filter> {
    arb_tree(arb_leaf())
}

fn arb_join_free_filter() -> impl Strategy<Value = Filter> {
    arb_tree(arb_leaf().prop_filter("joins the outer query", Leaf::is_join_free))
}

//
// properties
//

proptest! {
    #[test]
    fn compiling_twice_yields_the_same_query(filter in arb_filter()) {
        let store = device_store();
        let node = filter.to_node();
        let first = compile(&node).expect("filter compiles");
        let second = compile(&node).expect("filter compiles");

        prop_assert_eq!(first.explain(), second.explain());
        prop_assert_eq!(first.select(&store), second.select(&store));
    }

    #[test]
    fn nested_filters_match_direct_evaluation(filter in arb_filter()) {
        prop_assert_eq!(matching(&filter.to_node()), filter.expected());
    }

    #[test]
    fn join_free_filters_never_duplicate_rows(filter in arb_join_free_filter()) {
        let store = device_store();
        let compiled = compile(&filter.to_node()).expect("filter compiles");

        prop_assert_eq!(compiled.select(&store), Ok(filter.expected()));
    }

    #[test]
    fn relationship_negation_excludes_every_holder(
        label in prop_oneof![Just("v"), Just("w"), Just("x"), Just("y")]
    ) {
        let expected: Vec<i64> = ROWS
            .iter()
            .filter(|row| !row.labels.contains(&label))
            .map(|row| row.id)
            .collect();

        prop_assert_eq!(matching(&Node::ne("label.name", label)), expected);
    }
}
