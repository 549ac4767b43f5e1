//! IDS XML reader and writer.
//!
//! The writer emits one element per rule at its list position, wrapping every
//! leaf value in `<ids:simpleValue>` and omitting absent fields entirely. The
//! reader scans the `applicability` subtree once per rule tag (property,
//! partOf, material, classification, entity), so its output is grouped by
//! type in that order.
//!
//! Element names are matched by local name, which accepts both `ids:`-prefixed
//! elements and producers that rely on a default namespace instead.

use std::fs;
use std::path::Path;

use roxmltree::Node;

use super::model::{
    non_empty, Document, IfcVersion, Rule, RuleKind, RuleType, SpecInfo, DEFAULT_IFC_VERSION,
};
use super::namespaces::ROOT_ATTRIBUTES;
use super::pretty_xml::format_xml;
use super::RuleId;
use crate::error::IdsError;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Rule tags scanned by the reader, in scan order.
const RULE_SCAN_ORDER: [&str; 5] = ["property", "partOf", "material", "classification", "entity"];

/// Rule types in the order [`decode_xml`] groups them.
pub const DECODE_ORDER: [RuleType; 5] = [
    RuleType::Property,
    RuleType::PartOf,
    RuleType::Material,
    RuleType::Classification,
    RuleType::Entity,
];

/// Serialize a document as pretty-printed IDS XML.
///
/// Rules of a type the grammar has no element for (attribute rules and
/// unrecognized types) are skipped.
pub fn encode_xml(doc: &Document) -> String {
    let mut raw = String::from(XML_DECLARATION);
    build_ids_element(doc).write_to(&mut raw);
    format_xml(&raw)
}

/// Decode IDS XML text into a document.
///
/// # Errors
/// Returns [`IdsError::XmlParse`] if the text is not well-formed XML.
pub fn decode_xml(text: &str) -> Result<Document, IdsError> {
    let document = roxmltree::Document::parse(text).map_err(|source| IdsError::XmlParse {
        message: source.to_string(),
    })?;

    let root = document.root();
    let mut spec = SpecInfo::default();

    if let Some(title) = find_descendant(root, "title") {
        spec.title = Some(text_content(title));
    }

    if let Some(specification) = find_descendant(root, "specification") {
        spec.ifc_version = Some(IfcVersion::Single(
            specification
                .attribute("ifcVersion")
                .unwrap_or_default()
                .to_string(),
        ));
        spec.name = Some(specification.attribute("name").unwrap_or_default().to_string());
    }

    let mut applicability = Vec::new();
    if let Some(appl) = find_descendant(root, "applicability") {
        for tag in RULE_SCAN_ORDER {
            for node in find_descendants(appl, tag) {
                applicability.push(Rule {
                    id: Some(RuleId::generate()),
                    kind: decode_rule(tag, node),
                });
            }
        }
    }

    tracing::debug!(
        rules = applicability.len(),
        has_title = spec.title.is_some(),
        "decoded IDS XML"
    );

    Ok(Document {
        spec,
        applicability,
    })
}

/// Decode IDS XML from bytes.
///
/// The input must be valid UTF-8.
pub fn decode_xml_slice(bytes: &[u8]) -> Result<Document, IdsError> {
    let text = std::str::from_utf8(bytes).map_err(|source| IdsError::XmlParse {
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    decode_xml(text)
}

/// Read an IDS XML file.
pub fn read_ids_xml(path: &Path) -> Result<Document, IdsError> {
    let text = fs::read_to_string(path).map_err(IdsError::Io)?;
    decode_xml(&text)
}

/// Write a document as an IDS XML file.
pub fn write_ids_xml(path: &Path, doc: &Document) -> Result<(), IdsError> {
    fs::write(path, encode_xml(doc)).map_err(IdsError::Io)
}

fn decode_rule(tag: &str, node: Node<'_, '_>) -> RuleKind {
    match tag {
        "property" => RuleKind::Property {
            property_name: child_simple_value(node, "name"),
            property_set: child_simple_value(node, "propertySet"),
            data_type: child_simple_value(node, "dataType"),
            value: child_simple_value(node, "value"),
        },
        "partOf" => {
            let entity = find_descendant(node, "entity");
            RuleKind::PartOf {
                relation: Some(node.attribute("relation").unwrap_or_default().to_string()),
                entity: entity.and_then(|entity| child_simple_value(entity, "name")),
                predefined_type: entity
                    .and_then(|entity| child_simple_value(entity, "predefinedType")),
            }
        }
        "material" => RuleKind::Material {
            material: child_simple_value(node, "value"),
            value: None,
        },
        "classification" => RuleKind::Classification {
            system: child_simple_value(node, "system"),
            value: child_simple_value(node, "value"),
        },
        "entity" => RuleKind::Entity {
            entity: child_simple_value(node, "name"),
            predefined_type: child_simple_value(node, "predefinedType"),
        },
        _ => RuleKind::Unknown,
    }
}

/// First descendant element (excluding `node`) with the given local name.
fn find_descendant<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

/// All descendant elements (excluding `node`) with the given local name, in
/// document order.
fn find_descendants<'a, 'input, 't>(
    node: Node<'a, 'input>,
    tag: &'t str,
) -> impl Iterator<Item = Node<'a, 'input>> + 't
where
    'a: 't,
    'input: 't,
{
    node.descendants()
        .skip(1)
        .filter(move |child| child.is_element() && child.tag_name().name() == tag)
}

/// Text of the leaf `<tag>` under `node`, unwrapped from `<simpleValue>`.
///
/// `None` if `<tag>` is absent. A present `<tag>` without a `<simpleValue>`
/// yields an empty string.
fn child_simple_value(node: Node<'_, '_>, tag: &str) -> Option<String> {
    find_descendant(node, tag).map(|leaf| {
        find_descendant(leaf, "simpleValue")
            .map(text_content)
            .unwrap_or_default()
    })
}

/// Concatenated text of all descendant text nodes.
fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}

/// Minimal element tree used by the writer.
#[derive(Debug)]
struct Element {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends `<tag><ids:simpleValue>text</ids:simpleValue></tag>` when
    /// the field is present and non-empty.
    fn simple_value_child(self, name: &'static str, field: Option<&str>) -> Self {
        match field {
            Some(text) => {
                let simple_value = Element::new("ids:simpleValue").text(text);
                self.child(Element::new(name).child(simple_value))
            }
            None => self,
        }
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&xml_escape(value));
            out.push('"');
        }

        let text = self.text.as_deref().filter(|text| !text.is_empty());
        if text.is_none() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        if let Some(text) = text {
            out.push_str(&xml_escape(text));
        }
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str("</");
        out.push_str(self.name);
        out.push('>');
    }
}

fn build_ids_element(doc: &Document) -> Element {
    let spec = &doc.spec;

    let mut root = Element::new("ids:ids");
    for (name, value) in ROOT_ATTRIBUTES {
        root = root.attr(name, value);
    }

    let info = Element::new("ids:info").child(
        Element::new("ids:title").text(spec.title.clone().unwrap_or_default()),
    );

    let ifc_version = spec
        .ifc_version
        .as_ref()
        .filter(|version| !version.is_blank())
        .map_or_else(|| DEFAULT_IFC_VERSION.to_string(), IfcVersion::to_attribute_value);

    let mut applicability = Element::new("ids:applicability")
        .attr("minOccurs", "0")
        .attr("maxOccurs", "unbounded");
    for rule in &doc.applicability {
        match encode_rule(&rule.kind) {
            Some(element) => applicability = applicability.child(element),
            None => tracing::warn!(
                rule_type = rule.kind.type_name(),
                id = rule.id.as_ref().map(RuleId::as_str),
                "IDS XML has no element for this rule type; rule dropped"
            ),
        }
    }

    let specification = Element::new("ids:specification")
        .attr("ifcVersion", ifc_version)
        .attr("name", spec.name.clone().unwrap_or_default())
        .child(applicability);

    root.child(info)
        .child(Element::new("ids:specifications").child(specification))
}

fn encode_rule(kind: &RuleKind) -> Option<Element> {
    let element = match kind {
        RuleKind::Property {
            property_name,
            property_set,
            data_type,
            value,
        } => Element::new("ids:property")
            .simple_value_child("ids:name", non_empty(property_name))
            .simple_value_child("ids:propertySet", non_empty(property_set))
            .simple_value_child("ids:dataType", non_empty(data_type))
            .simple_value_child("ids:value", non_empty(value)),
        RuleKind::PartOf {
            relation,
            entity,
            predefined_type,
        } => {
            let mut part_of = Element::new("ids:partOf");
            if let Some(relation) = non_empty(relation) {
                part_of = part_of.attr("relation", relation);
            }
            part_of.child(
                Element::new("ids:entity")
                    .simple_value_child("ids:name", non_empty(entity))
                    .simple_value_child("ids:predefinedType", non_empty(predefined_type)),
            )
        }
        RuleKind::Material { material, value } => Element::new("ids:material")
            .simple_value_child("ids:value", non_empty(material).or(non_empty(value))),
        RuleKind::Classification { system, value } => Element::new("ids:classification")
            .simple_value_child("ids:system", non_empty(system))
            .simple_value_child("ids:value", non_empty(value)),
        RuleKind::Entity {
            entity,
            predefined_type,
        } => Element::new("ids:entity")
            .simple_value_child("ids:name", non_empty(entity))
            .simple_value_child("ids:predefinedType", non_empty(predefined_type)),
        RuleKind::Attribute { .. } | RuleKind::Unknown => return None,
    };
    Some(element)
}

/// Escapes markup characters, and writes line breaks and tabs as character
/// references so parsers neither normalize them nor see them as layout.
fn xml_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            other => escaped.push(other),
        }
    }
    escaped
}
