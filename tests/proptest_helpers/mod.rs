#![allow(dead_code)]

use idskit::ir::{Document, IfcVersion, Rule, RuleId, RuleKind, RuleType, SpecInfo};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Non-empty text, including characters XML must escape and line breaks.
pub fn arb_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_&<>'\" \t\r\n]{1,12}"
}

pub fn arb_field() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(arb_text())
}

pub fn arb_rule_id() -> impl Strategy<Value = RuleId> {
    "id_[a-z0-9]{7}".prop_map(RuleId::from)
}

pub fn arb_ifc_version() -> BoxedStrategy<Option<IfcVersion>> {
    prop_oneof![
        Just(None),
        arb_text().prop_map(|v| Some(IfcVersion::Single(v))),
        proptest::collection::vec(arb_text(), 1..4).prop_map(|v| Some(IfcVersion::List(v))),
    ]
    .boxed()
}

pub fn arb_spec() -> BoxedStrategy<SpecInfo> {
    (arb_field(), arb_field(), arb_ifc_version(), arb_field())
        .prop_map(|(title, description, ifc_version, name)| SpecInfo {
            title,
            description,
            ifc_version,
            name,
        })
        .boxed()
}

fn arb_entity() -> BoxedStrategy<RuleKind> {
    (arb_field(), arb_field())
        .prop_map(|(entity, predefined_type)| RuleKind::Entity {
            entity,
            predefined_type,
        })
        .boxed()
}

fn arb_property() -> BoxedStrategy<RuleKind> {
    (arb_field(), arb_field(), arb_field(), arb_field())
        .prop_map(
            |(property_name, property_set, data_type, value)| RuleKind::Property {
                property_name,
                property_set,
                data_type,
                value,
            },
        )
        .boxed()
}

fn arb_part_of() -> BoxedStrategy<RuleKind> {
    (arb_field(), arb_field(), arb_field())
        .prop_map(|(relation, entity, predefined_type)| RuleKind::PartOf {
            relation,
            entity,
            predefined_type,
        })
        .boxed()
}

fn arb_material() -> BoxedStrategy<RuleKind> {
    (arb_field(), arb_field())
        .prop_map(|(material, value)| RuleKind::Material { material, value })
        .boxed()
}

fn arb_classification() -> BoxedStrategy<RuleKind> {
    (arb_field(), arb_field())
        .prop_map(|(system, value)| RuleKind::Classification { system, value })
        .boxed()
}

fn arb_attribute() -> BoxedStrategy<RuleKind> {
    (arb_field(), arb_field())
        .prop_map(|(name, value)| RuleKind::Attribute { name, value })
        .boxed()
}

/// Any rule payload, unrecognized types included.
pub fn arb_rule_kind() -> BoxedStrategy<RuleKind> {
    prop_oneof![
        arb_entity(),
        arb_property(),
        arb_part_of(),
        arb_material(),
        arb_classification(),
        arb_attribute(),
        Just(RuleKind::Unknown),
    ]
    .boxed()
}

/// Rule payloads IDS XML reads back one-to-one (no partOf, attribute or
/// unknown).
pub fn arb_xml_rule_kind() -> BoxedStrategy<RuleKind> {
    prop_oneof![
        arb_entity(),
        arb_property(),
        arb_material(),
        arb_classification(),
    ]
    .boxed()
}

pub fn arb_document_with(kinds: BoxedStrategy<RuleKind>, max_rules: usize) -> BoxedStrategy<Document> {
    let rule = (proptest::option::of(arb_rule_id()), kinds)
        .prop_map(|(id, kind)| Rule { id, kind });
    (arb_spec(), proptest::collection::vec(rule, 0..=max_rules))
        .prop_map(|(spec, applicability)| Document {
            spec,
            applicability,
        })
        .boxed()
}

pub fn arb_document(max_rules: usize) -> BoxedStrategy<Document> {
    arb_document_with(arb_rule_kind(), max_rules)
}

pub fn rule_types(doc: &Document) -> Vec<RuleType> {
    doc.applicability
        .iter()
        .filter_map(Rule::rule_type)
        .collect()
}

/// Stable sort of `rules` by position of their type in `order`; types not in
/// `order` are dropped.
pub fn grouped<'a>(rules: &'a [Rule], order: &[RuleType]) -> Vec<&'a Rule> {
    let mut kept: Vec<(usize, &Rule)> = rules
        .iter()
        .filter_map(|rule| {
            let rule_type = rule.rule_type()?;
            let rank = order.iter().position(|t| *t == rule_type)?;
            Some((rank, rule))
        })
        .collect();
    kept.sort_by_key(|(rank, _)| *rank);
    kept.into_iter().map(|(_, rule)| rule).collect()
}
