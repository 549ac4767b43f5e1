//! Namespaced IDS JSON: a JSON tree mirroring the IDS XML structure.
//!
//! The convention follows common XML-to-JSON mappers: element text lives
//! under `__text`, the namespace prefix under `__prefix`, and attributes are
//! keys with a leading underscore (`_ifcVersion`, `_relation`). A repeated
//! child element is an array; a single one is a bare object.
//!
//! ```text
//! { "ids": { "info": { "title": { "__text": "..." } },
//!            "specifications": { "specification": {
//!                "_ifcVersion": "IFC4", "_name": "...",
//!                "applicability": { "entity": { "name": { "simpleValue": { "__text": "IfcWall" } } } }
//! } } } }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde_json::{json, Map, Value};

use super::model::{non_empty, Document, IfcVersion, Rule, RuleKind, RuleType, SpecInfo};
use super::namespaces::{IDS_PREFIX, ROOT_ATTRIBUTES};
use crate::error::IdsError;

const TEXT_KEY: &str = "__text";
const PREFIX_KEY: &str = "__prefix";

/// Rule types in the order [`decode_namespaced_json`] groups them.
pub const DECODE_ORDER: [RuleType; 6] = [
    RuleType::Entity,
    RuleType::PartOf,
    RuleType::Classification,
    RuleType::Attribute,
    RuleType::Material,
    RuleType::Property,
];

/// Decode a namespaced tree into a document.
///
/// Never fails: a tree without a truthy root `ids` decodes to an empty
/// document, and every missing field defaults to an empty string. Rules are
/// grouped by collection in the order entity, partOf, classification,
/// attribute, material, property.
pub fn decode_namespaced_json(tree: &Value) -> Document {
    let Some(ids) = tree.get("ids").filter(|ids| is_truthy(ids)) else {
        return Document::default();
    };

    let title = ids
        .get("info")
        .and_then(|info| info.get("title"))
        .and_then(node_text)
        .unwrap_or_default();

    let specification = ids
        .get("specifications")
        .and_then(|specs| specs.get("specification"))
        .and_then(|spec| as_list(spec).into_iter().next());

    let spec = SpecInfo {
        title: Some(title),
        description: None,
        ifc_version: Some(
            specification
                .and_then(|spec| spec.get("_ifcVersion"))
                .and_then(ifc_version_from_value)
                .unwrap_or_else(|| IfcVersion::Single(String::new())),
        ),
        name: Some(
            specification
                .and_then(|spec| spec.get("_name"))
                .and_then(scalar_text)
                .unwrap_or_default(),
        ),
    };

    let mut applicability = Vec::new();
    if let Some(appl) = specification.and_then(|spec| spec.get("applicability")) {
        for node in collection(appl, "entity") {
            applicability.push(Rule::anonymous(RuleKind::Entity {
                entity: Some(leaf_text(node.get("name"))),
                predefined_type: Some(leaf_text(node.get("predefinedType"))),
            }));
        }

        for node in collection(appl, "partOf") {
            let entity = node.get("entity");
            applicability.push(Rule::anonymous(RuleKind::PartOf {
                relation: Some(node.get("_relation").and_then(scalar_text).unwrap_or_default()),
                entity: Some(leaf_text(entity.and_then(|e| e.get("name")))),
                predefined_type: Some(leaf_text(entity.and_then(|e| e.get("predefinedType")))),
            }));
        }

        for node in collection(appl, "classification") {
            applicability.push(Rule::anonymous(RuleKind::Classification {
                system: Some(leaf_text(node.get("system"))),
                value: Some(leaf_text(node.get("value"))),
            }));
        }

        for node in collection(appl, "attribute") {
            applicability.push(Rule::anonymous(RuleKind::Attribute {
                name: Some(leaf_text(node.get("name"))),
                value: Some(leaf_text(node.get("value"))),
            }));
        }

        for node in collection(appl, "material") {
            let mut value = leaf_text(node.get("value"));
            if value.is_empty() {
                value = leaf_text(node.get("material"));
            }
            applicability.push(Rule::anonymous(RuleKind::Material {
                material: None,
                value: Some(value),
            }));
        }

        for node in collection(appl, "property") {
            applicability.push(Rule::anonymous(RuleKind::Property {
                property_name: Some(leaf_text(node.get("name"))),
                property_set: Some(leaf_text(node.get("propertySet"))),
                data_type: Some(leaf_text(node.get("dataType"))),
                value: Some(leaf_text(node.get("value"))),
            }));
        }
    }

    tracing::debug!(rules = applicability.len(), "decoded namespaced IDS JSON");

    Document {
        spec,
        applicability,
    }
}

/// Encode a document as a namespaced tree.
///
/// The output always has the full shape: missing metadata becomes `""`, and
/// every node carries `__prefix: "ids"`. Unknown rule types are dropped.
pub fn encode_namespaced_json(doc: &Document) -> Value {
    let spec = &doc.spec;

    let mut appl = Map::new();
    for rule in &doc.applicability {
        let Some((key, node)) = encode_rule(&rule.kind) else {
            tracing::warn!(
                rule_type = rule.kind.type_name(),
                "namespaced IDS JSON has no collection for this rule type; rule dropped"
            );
            continue;
        };
        push_collection(&mut appl, key, node);
    }

    if appl.is_empty() {
        appl.insert(PREFIX_KEY.into(), json!(IDS_PREFIX));
    } else {
        appl.insert("_minOccurs".into(), json!("0"));
        appl.insert("_maxOccurs".into(), json!("unbounded"));
        appl.insert(PREFIX_KEY.into(), json!(IDS_PREFIX));
    }

    let ifc_version = match &spec.ifc_version {
        Some(IfcVersion::Single(version)) => json!(version),
        Some(IfcVersion::List(versions)) => json!(versions),
        None => json!(""),
    };

    let specification = json!({
        "__prefix": IDS_PREFIX,
        "_ifcVersion": ifc_version,
        "_name": spec.name.clone().unwrap_or_default(),
        "applicability": Value::Object(appl),
        "requirements": { "__prefix": IDS_PREFIX },
    });

    let mut ids = Map::new();
    ids.insert(
        "info".into(),
        json!({
            "title": {
                "__prefix": IDS_PREFIX,
                "__text": spec.title.clone().unwrap_or_default(),
            },
            "__prefix": IDS_PREFIX,
        }),
    );
    ids.insert(
        "specifications".into(),
        json!({
            "specification": specification,
            "__prefix": IDS_PREFIX,
        }),
    );
    for (name, value) in ROOT_ATTRIBUTES {
        ids.insert(format!("_{name}"), json!(value));
    }
    ids.insert(PREFIX_KEY.into(), json!(IDS_PREFIX));

    json!({ "ids": Value::Object(ids) })
}

/// Decode namespaced JSON text.
///
/// # Errors
/// Returns [`IdsError::InvalidJson`] only if the text is not JSON at all.
pub fn from_namespaced_json_str(json: &str) -> Result<Document, IdsError> {
    let tree: Value =
        serde_json::from_str(json).map_err(|source| IdsError::InvalidJson { source })?;
    Ok(decode_namespaced_json(&tree))
}

/// Decode namespaced JSON bytes.
pub fn from_namespaced_json_slice(bytes: &[u8]) -> Result<Document, IdsError> {
    let tree: Value =
        serde_json::from_slice(bytes).map_err(|source| IdsError::InvalidJson { source })?;
    Ok(decode_namespaced_json(&tree))
}

/// Encode a document as pretty-printed namespaced JSON text.
pub fn to_namespaced_json_string(doc: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&encode_namespaced_json(doc))
}

/// Reads a namespaced IDS JSON file.
pub fn read_namespaced_json(path: &Path) -> Result<Document, IdsError> {
    let file = File::open(path).map_err(IdsError::Io)?;
    let tree: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| IdsError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(decode_namespaced_json(&tree))
}

/// Writes a document as a namespaced IDS JSON file.
pub fn write_namespaced_json(path: &Path, doc: &Document) -> Result<(), IdsError> {
    let file = File::create(path).map_err(IdsError::Io)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &encode_namespaced_json(doc)).map_err(
        |source| IdsError::JsonWrite {
            path: path.to_path_buf(),
            source,
        },
    )
}

/// Builds the collection key and node for one rule.
fn encode_rule(kind: &RuleKind) -> Option<(&'static str, Value)> {
    let mut node = prefixed_node();
    let key = match kind {
        RuleKind::Entity {
            entity,
            predefined_type,
        } => {
            insert_leaf(&mut node, "name", entity);
            insert_leaf(&mut node, "predefinedType", predefined_type);
            "entity"
        }
        RuleKind::PartOf {
            relation,
            entity,
            predefined_type,
        } => {
            let mut related = prefixed_node();
            insert_leaf(&mut related, "name", entity);
            insert_leaf(&mut related, "predefinedType", predefined_type);

            node = Map::new();
            node.insert("entity".into(), Value::Object(related));
            node.insert(PREFIX_KEY.into(), json!(IDS_PREFIX));
            if let Some(relation) = relation.as_deref().filter(|r| !r.is_empty()) {
                node.insert("_relation".into(), json!(relation));
            }
            "partOf"
        }
        RuleKind::Classification { system, value } => {
            insert_leaf(&mut node, "value", value);
            insert_leaf(&mut node, "system", system);
            "classification"
        }
        RuleKind::Attribute { name, value } => {
            insert_leaf(&mut node, "name", name);
            insert_leaf(&mut node, "value", value);
            "attribute"
        }
        RuleKind::Material { material, value } => {
            // Same preference as the XML writer: `material`, then `value`.
            let chosen = if non_empty(material).is_some() || value.is_none() {
                material
            } else {
                value
            };
            insert_leaf(&mut node, "value", chosen);
            "material"
        }
        RuleKind::Property {
            property_name,
            property_set,
            data_type,
            value,
        } => {
            insert_leaf(&mut node, "name", property_name);
            insert_leaf(&mut node, "propertySet", property_set);
            insert_leaf(&mut node, "dataType", data_type);
            insert_leaf(&mut node, "value", value);
            "property"
        }
        RuleKind::Unknown => return None,
    };
    Some((key, Value::Object(node)))
}

/// Adds `node` under `key`, turning a bare node into an array on the second
/// occurrence and appending on later ones.
fn push_collection(map: &mut Map<String, Value>, key: &str, node: Value) {
    match map.get_mut(key) {
        None => {
            map.insert(key.to_string(), node);
        }
        Some(Value::Array(items)) => items.push(node),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, node]);
        }
    }
}

fn prefixed_node() -> Map<String, Value> {
    let mut node = Map::new();
    node.insert(PREFIX_KEY.into(), json!(IDS_PREFIX));
    node
}

/// Inserts `{ "simpleValue": { "__prefix": "ids", "__text": ... }, "__prefix": "ids" }`
/// when the field is present (empty strings included).
fn insert_leaf(node: &mut Map<String, Value>, key: &str, field: &Option<String>) {
    if let Some(text) = field {
        node.insert(
            key.to_string(),
            json!({
                "simpleValue": { "__prefix": IDS_PREFIX, "__text": text },
                "__prefix": IDS_PREFIX,
            }),
        );
    }
}

/// Normalizes a single node or an array of nodes into a list.
fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn collection<'a>(appl: &'a Value, key: &str) -> Vec<&'a Value> {
    appl.get(key).map(as_list).unwrap_or_default()
}

/// Text of a leaf node: `simpleValue.__text` first, then `__text`, else `""`.
fn leaf_text(node: Option<&Value>) -> String {
    let Some(node) = node else {
        return String::new();
    };
    let text = match node.get("simpleValue") {
        Some(simple_value) if is_truthy(simple_value) => node_text(simple_value),
        _ => node_text(node),
    };
    text.unwrap_or_default()
}

/// Fuzz-only entrypoint for leaf extraction.
#[cfg(feature = "fuzzing")]
pub fn fuzz_leaf_text(node: &Value) -> String {
    leaf_text(Some(node))
}

/// `__text` of an element node. A bare string counts as its own text.
fn node_text(node: &Value) -> Option<String> {
    match node {
        Value::String(text) => Some(text.clone()),
        other => other.get(TEXT_KEY).and_then(scalar_text),
    }
}

/// Renders a JSON scalar as text; objects, arrays and null yield `None`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn ifc_version_from_value(value: &Value) -> Option<IfcVersion> {
    match value {
        Value::Array(items) => Some(IfcVersion::List(
            items.iter().filter_map(scalar_text).collect(),
        )),
        other => scalar_text(other).map(IfcVersion::Single),
    }
}

/// JavaScript truthiness of a JSON value.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64() != Some(0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}
