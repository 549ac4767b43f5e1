//! Import, export, and conversion reporting.
//!
//! Import sniffs the text, routes it to the matching codec and normalizes the
//! result the way an editor expects it. Export routes a document to one of
//! three targets. [`build_conversion_report`] tells, before an export, which
//! information the target keeps, drops, or reshapes.

pub mod report;

pub use report::{
    ConversionCounts, ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity,
};

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::IdsError;
use crate::ir::io_namespaced_json::is_truthy;
use crate::ir::{
    io_ids_xml, io_json, io_namespaced_json, Document, IfcVersion, Rule, RuleId, RuleKind,
    RuleType, DEFAULT_IFC_VERSION,
};

/// Title given to an imported specification that has none.
pub const IMPORTED_TITLE: &str = "Imported Specification";

/// Format identifier for import, export and conversion reporting.
///
/// This mirrors the CLI's format argument but is decoupled from clap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// Flat internal JSON.
    Json,
    /// Namespaced JSON mirroring IDS XML.
    NamespacedJson,
    /// IDS XML.
    Xml,
}

impl Format {
    /// Every format, in menu order.
    pub const ALL: [Format; 3] = [Format::Json, Format::NamespacedJson, Format::Xml];

    /// Human-readable name for the format.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::NamespacedJson => "namespaced-json",
            Format::Xml => "xml",
        }
    }

    /// Default file name for an export.
    pub fn file_name(&self) -> &'static str {
        match self {
            Format::Json => "ids.json",
            Format::NamespacedJson => "ids-namespaced.json",
            Format::Xml => "ids.xml",
        }
    }

    /// MIME type of an export.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Json | Format::NamespacedJson => "application/json",
            Format::Xml => "application/xml",
        }
    }

    /// Infers the format implied by a file name, if any.
    pub fn from_path(path: &Path) -> Option<Format> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with("-namespaced.json") || name.ends_with(".namespaced.json") {
            Some(Format::NamespacedJson)
        } else if name.ends_with(".json") {
            Some(Format::Json)
        } else if name.ends_with(".xml") || name.ends_with(".ids") {
            Some(Format::Xml)
        } else {
            None
        }
    }

    /// Order in which reading this format back groups rules, or `None` if the
    /// format keeps list order.
    pub fn decode_order(&self) -> Option<&'static [RuleType]> {
        match self {
            Format::Json => None,
            Format::NamespacedJson => Some(&io_namespaced_json::DECODE_ORDER),
            Format::Xml => Some(&io_ids_xml::DECODE_ORDER),
        }
    }

    /// Returns true if the format has a representation for `kind`.
    pub fn expresses(&self, kind: &RuleKind) -> bool {
        match kind {
            RuleKind::Unknown => false,
            RuleKind::Attribute { .. } => *self != Format::Xml,
            _ => true,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sniff `text` and decode it with the matching codec, without normalizing.
///
/// Leading `{` or `[` selects JSON, leading `<` selects XML. JSON with a
/// truthy root `ids` is namespaced; JSON with an `applicability` key is the
/// flat shape.
///
/// # Errors
/// - [`IdsError::InvalidJson`] / [`IdsError::XmlParse`] for malformed input.
/// - [`IdsError::StructureMismatch`] for anything that is none of the formats.
pub fn decode_text(text: &str) -> Result<(Format, Document), IdsError> {
    let trimmed = text.trim();
    match trimmed.chars().next() {
        Some('{') | Some('[') => {
            let value: Value =
                serde_json::from_str(trimmed).map_err(|source| IdsError::InvalidJson { source })?;
            decode_json_value(value)
        }
        Some('<') => Ok((Format::Xml, io_ids_xml::decode_xml(trimmed)?)),
        _ => Err(IdsError::StructureMismatch {
            message: "input is neither JSON nor XML".to_string(),
        }),
    }
}

fn decode_json_value(mut value: Value) -> Result<(Format, Document), IdsError> {
    if value.get("ids").is_some_and(is_truthy) {
        return Ok((
            Format::NamespacedJson,
            io_namespaced_json::decode_namespaced_json(&value),
        ));
    }

    if value.get("applicability").is_none() {
        return Err(IdsError::StructureMismatch {
            message: "JSON has neither an `ids` root nor an `applicability` list".to_string(),
        });
    }

    // A null `spec` or `applicability` reads as absent.
    if let Some(object) = value.as_object_mut() {
        object.retain(|_, field| !field.is_null());
    }
    let doc = serde_json::from_value(value).map_err(|source| IdsError::InvalidJson { source })?;
    Ok((Format::Json, doc))
}

/// Decode `text` as the given format, without sniffing or normalizing.
///
/// # Errors
/// Returns the codec's parse error.
pub fn decode_as(text: &str, format: Format) -> Result<Document, IdsError> {
    match format {
        Format::Json => {
            io_json::from_json_str(text).map_err(|source| IdsError::InvalidJson { source })
        }
        Format::NamespacedJson => io_namespaced_json::from_namespaced_json_str(text),
        Format::Xml => io_ids_xml::decode_xml(text),
    }
}

/// Sniff, decode and normalize `text`.
///
/// # Errors
/// See [`decode_text`].
pub fn import_text(text: &str) -> Result<(Format, Document), IdsError> {
    let (format, doc) = decode_text(text)?;
    Ok((format, normalize_import(doc)))
}

/// Brings a freshly decoded document into editor shape.
///
/// `ifcVersion` becomes a list (`["IFC4"]` when empty), an empty title
/// becomes [`IMPORTED_TITLE`], a missing description becomes `""`, and every
/// rule without an id gets one.
pub fn normalize_import(mut doc: Document) -> Document {
    let mut versions = doc
        .spec
        .ifc_version
        .take()
        .map(IfcVersion::into_list)
        .unwrap_or_default();
    if versions.is_empty() {
        versions.push(DEFAULT_IFC_VERSION.to_string());
    }
    doc.spec.ifc_version = Some(IfcVersion::List(versions));

    if doc.spec.title.as_deref().map_or(true, str::is_empty) {
        doc.spec.title = Some(IMPORTED_TITLE.to_string());
    }
    if doc.spec.description.is_none() {
        doc.spec.description = Some(String::new());
    }

    for rule in &mut doc.applicability {
        if rule.id.is_none() {
            rule.id = Some(RuleId::generate());
        }
    }

    doc
}

/// Serialize `doc` for the given target. Rules of unrecognized type are left
/// out; JSON targets are pretty-printed with two-space indentation.
///
/// # Errors
/// Returns [`IdsError::JsonSerialize`] if JSON serialization fails.
pub fn export(doc: &Document, format: Format) -> Result<String, IdsError> {
    let exported = Document {
        spec: doc.spec.clone(),
        applicability: doc
            .applicability
            .iter()
            .filter(|rule| rule.kind != RuleKind::Unknown)
            .cloned()
            .collect(),
    };

    match format {
        Format::Json => io_json::to_json_string(&exported)
            .map_err(|source| IdsError::JsonSerialize { source }),
        Format::NamespacedJson => io_namespaced_json::to_namespaced_json_string(&exported)
            .map_err(|source| IdsError::JsonSerialize { source }),
        Format::Xml => Ok(io_ids_xml::encode_xml(&exported)),
    }
}

/// Export `doc` and write the result to `path`.
///
/// # Errors
/// Returns an error if serialization or the write fails.
pub fn write_export(path: &Path, doc: &Document, format: Format) -> Result<(), IdsError> {
    let text = export(doc, format)?;
    fs::write(path, text).map_err(IdsError::Io)
}

/// Build a conversion report analyzing what an export will do.
///
/// This examines the document and target format to determine:
/// - Input/output rule counts
/// - What information will be lost (warnings)
/// - What policy decisions apply (info notes)
pub fn build_conversion_report(doc: &Document, from: Format, to: Format) -> ConversionReport {
    let mut report = ConversionReport::new(from.name(), to.name());

    let kept: Vec<&Rule> = doc
        .applicability
        .iter()
        .filter(|rule| to.expresses(&rule.kind))
        .collect();

    let input = ConversionCounts::from_rules(&doc.applicability);
    analyze_dropped_rules(&input, to, &mut report);
    report.input = input;
    report.output = ConversionCounts::from_rules(kept.iter().copied());

    if to != Format::Json {
        analyze_grammar_target(doc, &kept, to, &mut report);
    }

    if to == Format::Xml {
        add_xml_writer_policy(doc, &mut report);
    }

    match from {
        Format::Xml => report.add(ConversionIssue::info(
            ConversionIssueCode::XmlReaderIdAssignment,
            "the XML reader assigned fresh random ids to every rule",
        )),
        Format::NamespacedJson => report.add(ConversionIssue::info(
            ConversionIssueCode::NamespacedReaderEmptyDefaults,
            "the namespaced JSON reader filled missing fields with empty strings",
        )),
        Format::Json => {}
    }

    report
}

fn analyze_dropped_rules(input: &ConversionCounts, to: Format, report: &mut ConversionReport) {
    if input.unknown > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::DropUnknownRules,
            format!(
                "{} rule(s) of unrecognized type will be dropped",
                input.unknown
            ),
        ));
    }

    if to == Format::Xml && input.attribute > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::DropAttributeRules,
            format!(
                "{} attribute rule(s) have no IDS XML element and will be dropped",
                input.attribute
            ),
        ));
    }
}

/// Checks shared by the two external grammars.
fn analyze_grammar_target(doc: &Document, kept: &[&Rule], to: Format, report: &mut ConversionReport) {
    if doc
        .spec
        .description
        .as_deref()
        .is_some_and(|description| !description.is_empty())
    {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::DropDescription,
            format!("{} has no place for the description; it will be dropped", to),
        ));
    }

    if let Some(order) = to.decode_order() {
        if !is_grouped_in(kept, order) {
            let names: Vec<&str> = order.iter().map(|t| t.name()).collect();
            report.add(ConversionIssue::warning(
                ConversionIssueCode::RegroupRulesByType,
                format!(
                    "reading {} back groups rules by type ({}); the current order is not kept",
                    to,
                    names.join(", ")
                ),
            ));
        }
    }

    let with_ids = kept.iter().filter(|rule| rule.id.is_some()).count();
    if with_ids > 0 {
        report.add(ConversionIssue::info(
            ConversionIssueCode::RuleIdsNotPreserved,
            format!("{} does not store rule ids; {} id(s) will not be written", to, with_ids),
        ));
    }
}

fn add_xml_writer_policy(doc: &Document, report: &mut ConversionReport) {
    if doc.spec.ifc_version.as_ref().map_or(true, IfcVersion::is_blank) {
        report.add(ConversionIssue::info(
            ConversionIssueCode::XmlDefaultIfcVersion,
            format!("no IFC version is set; the XML writer emits ifcVersion=\"{DEFAULT_IFC_VERSION}\""),
        ));
    }

    if report.output.part_of > 0 {
        report.add(ConversionIssue::info(
            ConversionIssueCode::XmlPartOfEntityRescan,
            format!(
                "{} partOf rule(s) carry a nested entity that the XML reader also reads as an entity rule",
                report.output.part_of
            ),
        ));
    }
}

/// True if the rules' types already appear in `order`.
fn is_grouped_in(rules: &[&Rule], order: &[RuleType]) -> bool {
    let ranks: Vec<usize> = rules
        .iter()
        .filter_map(|rule| rule.rule_type())
        .filter_map(|rule_type| order.iter().position(|t| *t == rule_type))
        .collect();
    ranks.windows(2).all(|pair| pair[0] <= pair[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::SpecInfo;

    fn sample_document() -> Document {
        Document {
            spec: SpecInfo {
                title: Some("Walls".into()),
                description: Some(String::new()),
                ifc_version: Some(IfcVersion::List(vec!["IFC4".into()])),
                name: None,
            },
            applicability: vec![
                Rule::with_id("id_a", RuleKind::entity("IfcWall")),
                Rule::with_id("id_b", RuleKind::property("LoadBearing")),
            ],
        }
    }

    #[test]
    fn decode_text_detects_flat_json() {
        let (format, doc) =
            decode_text(r#"  {"spec": {"title": "T"}, "applicability": []}"#).unwrap();
        assert_eq!(format, Format::Json);
        assert_eq!(doc.spec.title.as_deref(), Some("T"));
    }

    #[test]
    fn decode_text_detects_namespaced_json() {
        let text = r#"{"ids": {"info": {"title": {"__text": "N"}}}}"#;
        let (format, doc) = decode_text(text).unwrap();
        assert_eq!(format, Format::NamespacedJson);
        assert_eq!(doc.spec.title.as_deref(), Some("N"));
    }

    #[test]
    fn decode_text_detects_xml() {
        let text = "\n<ids:ids xmlns:ids=\"http://standards.buildingsmart.org/IDS\"><ids:info><ids:title>X</ids:title></ids:info></ids:ids>";
        let (format, doc) = decode_text(text).unwrap();
        assert_eq!(format, Format::Xml);
        assert_eq!(doc.spec.title.as_deref(), Some("X"));
    }

    #[test]
    fn falsy_ids_is_not_namespaced() {
        let err = decode_text(r#"{"ids": 0}"#).unwrap_err();
        assert!(matches!(err, IdsError::StructureMismatch { .. }));
    }

    #[test]
    fn unrecognized_text_is_structure_mismatch() {
        for text in ["hello", "", "[1, 2]", r#"{"other": true}"#] {
            let err = decode_text(text).unwrap_err();
            assert!(
                matches!(err, IdsError::StructureMismatch { .. }),
                "unexpected error for {text:?}: {err}"
            );
        }
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        assert!(matches!(
            decode_text("{not json").unwrap_err(),
            IdsError::InvalidJson { .. }
        ));
        assert!(matches!(
            decode_text("<ids><unclosed></ids>").unwrap_err(),
            IdsError::XmlParse { .. }
        ));
    }

    #[test]
    fn null_applicability_reads_as_empty() {
        let (_, doc) = decode_text(r#"{"spec": null, "applicability": null}"#).unwrap();
        assert!(doc.applicability.is_empty());
        assert_eq!(doc.spec, SpecInfo::default());
    }

    #[test]
    fn import_normalizes_metadata() {
        let (_, doc) = import_text(r#"{"applicability": [{"type": "Entity", "entity": "IfcWall"}]}"#)
            .unwrap();
        assert_eq!(doc.spec.title.as_deref(), Some(IMPORTED_TITLE));
        assert_eq!(doc.spec.description.as_deref(), Some(""));
        assert_eq!(
            doc.spec.ifc_version,
            Some(IfcVersion::List(vec!["IFC4".into()]))
        );
        assert!(doc.applicability[0].id.is_some());
    }

    #[test]
    fn import_wraps_bare_ifc_version() {
        let text = r#"{"spec": {"title": "T", "ifcVersion": "IFC2X3"}, "applicability": []}"#;
        let (_, doc) = import_text(text).unwrap();
        assert_eq!(
            doc.spec.ifc_version,
            Some(IfcVersion::List(vec!["IFC2X3".into()]))
        );
        assert_eq!(doc.spec.title.as_deref(), Some("T"));
    }

    #[test]
    fn import_accepts_edited_rules_and_drops_untyped_on_export() {
        let text = r#"{"spec": {"title": "T"}, "applicability": [
            {"id": "id_1", "entity": "IfcWall"},
            {"id": "id_2", "type": "Entity", "name": "IfcWall", "entity": "IfcDoor"}
        ]}"#;
        let (format, doc) = import_text(text).unwrap();
        assert_eq!(format, Format::Json);
        assert_eq!(doc.applicability[0].kind, RuleKind::Unknown);
        assert_eq!(doc.applicability[1].kind, RuleKind::entity("IfcDoor"));

        let xml = export(&doc, Format::Xml).unwrap();
        assert!(xml.contains("<ids:simpleValue>IfcDoor</ids:simpleValue>"));
        assert!(!xml.contains("IfcWall"));
    }

    #[test]
    fn import_keeps_existing_ids() {
        let text = r#"{"applicability": [{"id": "id_keep", "type": "Entity"}]}"#;
        let (_, doc) = import_text(text).unwrap();
        assert_eq!(doc.applicability[0].id, Some(RuleId::new("id_keep")));
    }

    #[test]
    fn import_of_namespaced_assigns_ids() {
        let doc = sample_document();
        let text = export(&doc, Format::NamespacedJson).unwrap();
        let (format, imported) = import_text(&text).unwrap();
        assert_eq!(format, Format::NamespacedJson);
        assert!(imported.applicability.iter().all(|rule| rule.id.is_some()));
        assert_eq!(
            imported.spec.ifc_version,
            Some(IfcVersion::List(vec!["IFC4".into()]))
        );
    }

    #[test]
    fn decode_as_skips_sniffing() {
        let doc = decode_as(r#"{"spec": {"title": "T"}}"#, Format::Json).unwrap();
        assert!(doc.applicability.is_empty());
        let doc = decode_as(r#"{"spec": {}}"#, Format::NamespacedJson).unwrap();
        assert_eq!(doc, Document::default());
    }

    #[test]
    fn export_targets_have_fixed_names() {
        assert_eq!(Format::Json.file_name(), "ids.json");
        assert_eq!(Format::NamespacedJson.file_name(), "ids-namespaced.json");
        assert_eq!(Format::Xml.file_name(), "ids.xml");
        assert_eq!(Format::NamespacedJson.mime_type(), "application/json");
        assert_eq!(Format::Xml.mime_type(), "application/xml");
    }

    #[test]
    fn format_is_inferred_from_file_name() {
        let cases = [
            ("ids.json", Some(Format::Json)),
            ("out/ids-namespaced.json", Some(Format::NamespacedJson)),
            ("walls.namespaced.JSON", Some(Format::NamespacedJson)),
            ("walls.ids", Some(Format::Xml)),
            ("walls.xml", Some(Format::Xml)),
            ("walls.txt", None),
        ];
        for (name, expected) in cases {
            assert_eq!(Format::from_path(Path::new(name)), expected, "{name}");
        }
    }

    #[test]
    fn export_json_is_two_space_indented_and_skips_unknown() {
        let doc = sample_document().with_rule(Rule::anonymous(RuleKind::Unknown));
        let text = export(&doc, Format::Json).unwrap();
        assert!(text.contains("\n  \"spec\": {"));
        assert!(!text.contains("Unknown"));
        let back = io_json::from_json_str(&text).unwrap();
        assert_eq!(back, sample_document());
    }

    #[test]
    fn export_xml_round_trips_through_import() {
        let text = export(&sample_document(), Format::Xml).unwrap();
        assert!(text.starts_with("<?xml"));
        let (format, doc) = import_text(&text).unwrap();
        assert_eq!(format, Format::Xml);
        let types: Vec<_> = doc.applicability.iter().map(Rule::rule_type).collect();
        assert_eq!(types, vec![Some(RuleType::Property), Some(RuleType::Entity)]);
    }

    #[test]
    fn write_export_creates_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(Format::Xml.file_name());
        write_export(&path, &sample_document(), Format::Xml).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("<ids:ids"));
    }

    #[test]
    fn to_json_is_not_lossy() {
        let report = build_conversion_report(&sample_document(), Format::Json, Format::Json);
        assert!(!report.is_lossy());
        assert_eq!(report.input, report.output);
    }

    #[test]
    fn unknown_rules_are_lossy_everywhere() {
        let doc = sample_document().with_rule(Rule::anonymous(RuleKind::Unknown));
        for to in Format::ALL {
            let report = build_conversion_report(&doc, Format::Json, to);
            assert!(report.has(ConversionIssueCode::DropUnknownRules), "{to}");
            assert_eq!(report.output.rules, 2);
        }
    }

    #[test]
    fn attribute_rules_are_lossy_only_for_xml() {
        let doc = Document::new_default().with_rule(Rule::new(RuleKind::Attribute {
            name: Some("Name".into()),
            value: Some("W1".into()),
        }));
        let to_xml = build_conversion_report(&doc, Format::Json, Format::Xml);
        assert!(to_xml.has(ConversionIssueCode::DropAttributeRules));
        assert_eq!(to_xml.output.attribute, 0);

        let to_namespaced = build_conversion_report(&doc, Format::Json, Format::NamespacedJson);
        assert!(!to_namespaced.is_lossy());
    }

    #[test]
    fn description_is_lossy_for_external_grammars() {
        let mut doc = sample_document();
        doc.spec.description = Some("Load bearing walls".into());
        let report = build_conversion_report(&doc, Format::Json, Format::NamespacedJson);
        assert!(report.has(ConversionIssueCode::DropDescription));
        let report = build_conversion_report(&doc, Format::Json, Format::Json);
        assert!(!report.has(ConversionIssueCode::DropDescription));
    }

    #[test]
    fn regrouping_depends_on_target_order() {
        // entity before property: grouped for namespaced JSON, not for XML.
        let doc = sample_document();
        let namespaced = build_conversion_report(&doc, Format::Json, Format::NamespacedJson);
        assert!(!namespaced.has(ConversionIssueCode::RegroupRulesByType));
        let xml = build_conversion_report(&doc, Format::Json, Format::Xml);
        assert!(xml.has(ConversionIssueCode::RegroupRulesByType));
    }

    #[test]
    fn xml_policy_notes() {
        let mut doc = sample_document().with_rule(Rule::new(RuleKind::PartOf {
            relation: None,
            entity: Some("IfcBuildingStorey".into()),
            predefined_type: None,
        }));
        doc.spec.ifc_version = None;
        let report = build_conversion_report(&doc, Format::Xml, Format::Xml);
        assert!(report.has(ConversionIssueCode::XmlDefaultIfcVersion));
        assert!(report.has(ConversionIssueCode::XmlPartOfEntityRescan));
        assert!(report.has(ConversionIssueCode::XmlReaderIdAssignment));
        assert!(report.has(ConversionIssueCode::RuleIdsNotPreserved));
    }

    #[test]
    fn namespaced_source_adds_policy_note() {
        let report = build_conversion_report(
            &Document::default(),
            Format::NamespacedJson,
            Format::Json,
        );
        assert!(report.has(ConversionIssueCode::NamespacedReaderEmptyDefaults));
        assert!(!report.is_lossy());
    }
}
