//! Integration tests for IDS XML support.

use std::path::Path;

use idskit::ir::io_ids_xml::{decode_xml, encode_xml, read_ids_xml, write_ids_xml};
use idskit::ir::io_namespaced_json::encode_namespaced_json;
use idskit::ir::{Document, IfcVersion, Rule, RuleKind, RuleType, SpecInfo};
use idskit::IdsError;

const FIXTURE: &str = "tests/fixtures/sample.ids.xml";

fn kinds(doc: &Document) -> Vec<RuleKind> {
    doc.applicability.iter().map(|rule| rule.kind.clone()).collect()
}

#[test]
fn fixture_decodes_grouped_by_scan_order() {
    let doc = read_ids_xml(Path::new(FIXTURE)).expect("read fixture");

    assert_eq!(doc.spec.title.as_deref(), Some("Load bearing walls"));
    assert_eq!(doc.spec.name.as_deref(), Some("Walls"));
    assert_eq!(doc.spec.ifc_version, Some(IfcVersion::Single("IFC4".into())));

    // Document order is entity, property, material.
    assert_eq!(
        kinds(&doc),
        vec![
            RuleKind::Property {
                property_name: Some("LoadBearing".into()),
                property_set: Some("Pset_WallCommon".into()),
                data_type: Some("IFCBOOLEAN".into()),
                value: Some("TRUE".into()),
            },
            RuleKind::material("Concrete"),
            RuleKind::Entity {
                entity: Some("IFCWALL".into()),
                predefined_type: Some("SOLIDWALL".into()),
            },
        ]
    );
    assert!(doc.applicability.iter().all(|rule| rule.id.is_some()));
}

#[test]
fn decoded_fixture_is_a_fixed_point() {
    let first = read_ids_xml(Path::new(FIXTURE)).expect("read fixture");

    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("ids.xml");
    write_ids_xml(&path, &first).expect("write xml");
    let second = read_ids_xml(&path).expect("read back");

    assert_eq!(first.spec, second.spec);
    assert_eq!(kinds(&first), kinds(&second));
}

#[test]
fn interleaved_rules_come_back_grouped() {
    let doc = Document::new_default()
        .with_rule(Rule::new(RuleKind::entity("IfcWall")))
        .with_rule(Rule::new(RuleKind::property("FireRating")))
        .with_rule(Rule::new(RuleKind::entity("IfcSlab")));

    let back = decode_xml(&encode_xml(&doc)).expect("decode");
    let types: Vec<_> = back.applicability.iter().map(Rule::rule_type).collect();
    assert_eq!(
        types,
        vec![
            Some(RuleType::Property),
            Some(RuleType::Entity),
            Some(RuleType::Entity),
        ]
    );
    assert_eq!(back.applicability[1].kind, RuleKind::entity("IfcWall"));
    assert_eq!(back.applicability[2].kind, RuleKind::entity("IfcSlab"));
}

#[test]
fn part_of_nested_entity_is_also_read_as_entity() {
    let doc = Document::default().with_rule(Rule::new(RuleKind::PartOf {
        relation: Some("IFCRELAGGREGATES".into()),
        entity: Some("IfcBuildingStorey".into()),
        predefined_type: None,
    }));

    let back = decode_xml(&encode_xml(&doc)).expect("decode");
    assert_eq!(back.applicability.len(), 2);
    assert_eq!(back.applicability[0].kind, doc.applicability[0].kind);
    assert_eq!(
        back.applicability[1].kind,
        RuleKind::entity("IfcBuildingStorey")
    );
}

#[test]
fn ifc_version_defaults_differ_between_codecs() {
    let doc = Document::default();

    let xml = encode_xml(&doc);
    assert!(xml.contains("ifcVersion=\"IFC4\""));

    let tree = encode_namespaced_json(&doc);
    assert_eq!(
        tree["ids"]["specifications"]["specification"]["_ifcVersion"],
        ""
    );
}

#[test]
fn material_fields_encode_identically() {
    let from_value = Document::default().with_rule(Rule::anonymous(RuleKind::Material {
        material: None,
        value: Some("Steel".into()),
    }));
    let from_material =
        Document::default().with_rule(Rule::anonymous(RuleKind::material("Steel")));

    let xml = encode_xml(&from_value);
    assert_eq!(xml, encode_xml(&from_material));
    assert!(xml.contains("<ids:simpleValue>Steel</ids:simpleValue>"));
}

#[test]
fn unprefixed_elements_are_read() {
    let xml = r#"<ids xmlns="http://standards.buildingsmart.org/IDS">
  <info><title>Plain</title></info>
  <specifications>
    <specification ifcVersion="IFC4X3" name="n">
      <applicability>
        <classification>
          <system><simpleValue>Uniclass</simpleValue></system>
          <value><simpleValue>EF_25_10</simpleValue></value>
        </classification>
      </applicability>
    </specification>
  </specifications>
</ids>"#;

    let doc = decode_xml(xml).expect("decode");
    assert_eq!(
        doc.spec,
        SpecInfo {
            title: Some("Plain".into()),
            description: None,
            ifc_version: Some(IfcVersion::Single("IFC4X3".into())),
            name: Some("n".into()),
        }
    );
    assert_eq!(
        doc.applicability[0].kind,
        RuleKind::Classification {
            system: Some("Uniclass".into()),
            value: Some("EF_25_10".into()),
        }
    );
}

#[test]
fn empty_document_decodes_to_defaults() {
    let doc = decode_xml("<xml></xml>").expect("decode");
    assert_eq!(doc, Document::default());
}

#[test]
fn malformed_xml_reports_parser_message() {
    let err = decode_xml("<ids:ids xmlns:ids=\"urn:x\"><ids:info></ids:ids>").unwrap_err();
    match &err {
        IdsError::XmlParse { message } => {
            assert!(!message.is_empty());
            assert_eq!(err.to_string(), format!("XML parse error: {message}"));
        }
        other => panic!("expected XmlParse, got {other:?}"),
    }
}

#[test]
fn escaped_text_survives() {
    let doc = Document {
        spec: SpecInfo {
            title: Some("Walls & <slabs>".into()),
            ..Default::default()
        },
        applicability: vec![Rule::anonymous(RuleKind::property("Name \"A\""))],
    };
    let back = decode_xml(&encode_xml(&doc)).expect("decode");
    assert_eq!(back.spec.title.as_deref(), Some("Walls & <slabs>"));
    assert_eq!(back.applicability[0].kind, RuleKind::property("Name \"A\""));
}

#[test]
fn line_breaks_and_tabs_in_text_survive() {
    let doc = Document {
        spec: SpecInfo {
            title: Some("line one\nline two".into()),
            name: Some("tab\there\r\n".into()),
            ..Default::default()
        },
        applicability: vec![
            Rule::anonymous(RuleKind::entity("Ifc\nWall")),
            Rule::anonymous(RuleKind::material("  padded  ")),
        ],
    };

    let xml = encode_xml(&doc);
    assert!(xml.contains("<ids:title>line one&#10;line two</ids:title>"));
    assert!(xml.contains("name=\"tab&#9;here&#13;&#10;\""));
    // Closing tags stay aligned with their opening tags.
    assert!(xml.contains("\n        </ids:entity>\n"));

    let back = decode_xml(&xml).expect("decode");
    assert_eq!(back.spec.title, doc.spec.title);
    assert_eq!(back.spec.name, doc.spec.name);
    assert_eq!(
        kinds(&back),
        vec![
            RuleKind::material("  padded  "),
            RuleKind::entity("Ifc\nWall"),
        ]
    );
}
