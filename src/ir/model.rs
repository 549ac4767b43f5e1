//! Core document model for IDS applicability specifications.
//!
//! This module defines the flat internal representation every codec targets.
//! The namespaced-JSON codec and the XML codec never call each other; they
//! both decode into and encode from [`Document`].

use serde::{Deserialize, Serialize};

use super::ids::RuleId;

/// Title given to a freshly created specification.
pub const DEFAULT_TITLE: &str = "New Specification";

/// IFC schema assumed when a specification names none.
pub const DEFAULT_IFC_VERSION: &str = "IFC4";

/// A complete IDS specification: metadata plus ordered applicability rules.
///
/// List order is meaningful to editors, but neither external grammar keeps
/// cross-type order: both codecs group rules by type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Specification metadata.
    #[serde(default)]
    pub spec: SpecInfo,

    /// Applicability rules in editor order.
    #[serde(default)]
    pub applicability: Vec<Rule>,
}

impl Document {
    /// Builds the document an editor starts from: default title, no
    /// description, `IFC4`, and no rules.
    pub fn new_default() -> Self {
        Self {
            spec: SpecInfo {
                title: Some(DEFAULT_TITLE.to_string()),
                description: Some(String::new()),
                ifc_version: Some(IfcVersion::List(vec![DEFAULT_IFC_VERSION.to_string()])),
                name: None,
            },
            applicability: Vec::new(),
        }
    }

    /// Returns a copy with `rule` appended.
    pub fn with_rule(&self, rule: Rule) -> Self {
        let mut next = self.clone();
        next.applicability.push(rule);
        next
    }

    /// Returns a copy where the rule identified by `id` is replaced.
    ///
    /// The replacement keeps its position. If no rule has that id the copy is
    /// identical to `self`.
    pub fn with_rule_replaced(&self, id: &RuleId, rule: Rule) -> Self {
        let applicability = self
            .applicability
            .iter()
            .map(|existing| {
                if existing.id.as_ref() == Some(id) {
                    rule.clone()
                } else {
                    existing.clone()
                }
            })
            .collect();
        Self {
            spec: self.spec.clone(),
            applicability,
        }
    }

    /// Returns a copy without the rule identified by `id`.
    pub fn without_rule(&self, id: &RuleId) -> Self {
        Self {
            spec: self.spec.clone(),
            applicability: self
                .applicability
                .iter()
                .filter(|rule| rule.id.as_ref() != Some(id))
                .cloned()
                .collect(),
        }
    }

    /// Returns a copy with the rule at `from` moved to index `to`.
    ///
    /// Out-of-range indices leave the order unchanged.
    pub fn with_rule_moved(&self, from: usize, to: usize) -> Self {
        let mut next = self.clone();
        let len = next.applicability.len();
        if from < len && to < len && from != to {
            let rule = next.applicability.remove(from);
            next.applicability.insert(to, rule);
        }
        next
    }

    /// Finds a rule by id.
    pub fn rule(&self, id: &RuleId) -> Option<&Rule> {
        self.applicability
            .iter()
            .find(|rule| rule.id.as_ref() == Some(id))
    }
}

/// Specification metadata.
///
/// Every field is optional: a document decoded from input with no
/// `<title>`/`<specification>` has an entirely empty `SpecInfo`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecInfo {
    /// Human readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Free-form description (only carried by the flat JSON format).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Target IFC schema version(s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifc_version: Option<IfcVersion>,

    /// Specification name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// IFC version as either a bare string or a list of strings.
///
/// Editors normalize to the list form, but both external formats may carry
/// either shape, so both are accepted and emitted as given.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IfcVersion {
    Single(String),
    List(Vec<String>),
}

impl IfcVersion {
    /// Returns true if the value names no version at all.
    pub fn is_blank(&self) -> bool {
        match self {
            IfcVersion::Single(version) => version.trim().is_empty(),
            IfcVersion::List(versions) => versions.iter().all(|v| v.trim().is_empty()),
        }
    }

    /// Renders the value as an XML attribute (list items space-separated).
    pub fn to_attribute_value(&self) -> String {
        match self {
            IfcVersion::Single(version) => version.clone(),
            IfcVersion::List(versions) => versions.join(" "),
        }
    }

    /// Converts to the list form. An empty bare string becomes an empty list.
    pub fn into_list(self) -> Vec<String> {
        match self {
            IfcVersion::Single(version) if version.is_empty() => Vec::new(),
            IfcVersion::Single(version) => vec![version],
            IfcVersion::List(versions) => versions,
        }
    }
}

impl From<&str> for IfcVersion {
    fn from(version: &str) -> Self {
        IfcVersion::Single(version.to_string())
    }
}

/// One applicability rule: an optional id plus the typed payload.
///
/// Reading goes through a flat wire struct, so a rule with a missing, null or
/// unrecognized `type` is kept as [`RuleKind::Unknown`] instead of failing
/// the whole document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRule")]
pub struct Rule {
    /// UI key; see [`RuleId`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RuleId>,

    #[serde(flatten)]
    pub kind: RuleKind,
}

impl Rule {
    /// Creates a rule with a freshly generated id.
    pub fn new(kind: RuleKind) -> Self {
        Self {
            id: Some(RuleId::generate()),
            kind,
        }
    }

    /// Creates a rule with the given id.
    pub fn with_id(id: impl Into<RuleId>, kind: RuleKind) -> Self {
        Self {
            id: Some(id.into()),
            kind,
        }
    }

    /// Creates a rule without an id.
    pub fn anonymous(kind: RuleKind) -> Self {
        Self { id: None, kind }
    }

    /// The rule's type, or `None` for an unrecognized one.
    pub fn rule_type(&self) -> Option<RuleType> {
        self.kind.rule_type()
    }
}

/// Wire shape of a flat-JSON rule: every field any rule type uses, all
/// optional.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    #[serde(default)]
    id: Option<RuleId>,
    #[serde(default, rename = "type")]
    rule_type: Option<String>,
    #[serde(default)]
    property_name: Option<String>,
    #[serde(default)]
    property_set: Option<String>,
    #[serde(default)]
    data_type: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    relation: Option<String>,
    #[serde(default)]
    entity: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    predefined_type: Option<String>,
    #[serde(default)]
    material: Option<String>,
    #[serde(default)]
    system: Option<String>,
}

impl From<RawRule> for Rule {
    fn from(raw: RawRule) -> Self {
        let kind = match raw.rule_type.as_deref() {
            Some("Property" | "property") => RuleKind::Property {
                property_name: raw.property_name,
                property_set: raw.property_set,
                data_type: raw.data_type,
                value: raw.value,
            },
            Some("Part of" | "part of" | "partOf" | "PartOf" | "partof") => RuleKind::PartOf {
                relation: raw.relation,
                entity: entity_or_name(raw.entity, raw.name),
                predefined_type: raw.predefined_type,
            },
            Some("Material" | "material") => RuleKind::Material {
                material: raw.material,
                value: raw.value,
            },
            Some("Classification" | "classification") => RuleKind::Classification {
                system: raw.system,
                value: raw.value,
            },
            Some("Entity" | "entity") => RuleKind::Entity {
                entity: entity_or_name(raw.entity, raw.name),
                predefined_type: raw.predefined_type,
            },
            Some("Attribute" | "attribute") => RuleKind::Attribute {
                name: raw.name,
                value: raw.value,
            },
            _ => RuleKind::Unknown,
        };
        Rule { id: raw.id, kind }
    }
}

/// `entity` wins unless it is empty; `name` is the fallback.
fn entity_or_name(entity: Option<String>, name: Option<String>) -> Option<String> {
    match (entity, name) {
        (Some(entity), _) if !entity.is_empty() => Some(entity),
        (entity, None) => entity,
        (_, name) => name,
    }
}

/// Rule payload, discriminated by the JSON `type` field.
///
/// The variants share nothing but the tag. Tags the model does not know
/// read as [`RuleKind::Unknown`], which every encoder skips.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum RuleKind {
    #[serde(rename_all = "camelCase")]
    Property {
        #[serde(skip_serializing_if = "Option::is_none")]
        property_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        property_set: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        data_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    #[serde(rename = "Part of", rename_all = "camelCase")]
    PartOf {
        /// Relation class, e.g. `IFCRELAGGREGATES`.
        #[serde(skip_serializing_if = "Option::is_none")]
        relation: Option<String>,
        /// Name of the related entity.
        #[serde(skip_serializing_if = "Option::is_none")]
        entity: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        predefined_type: Option<String>,
    },

    /// Material name may arrive under `material` or `value`.
    Material {
        #[serde(skip_serializing_if = "Option::is_none")]
        material: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    Classification {
        #[serde(skip_serializing_if = "Option::is_none")]
        system: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Entity {
        /// Entity class name; producers also call this `name`.
        #[serde(skip_serializing_if = "Option::is_none")]
        entity: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        predefined_type: Option<String>,
    },

    /// Only the namespaced JSON format carries attribute rules.
    Attribute {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    Unknown,
}

impl RuleKind {
    /// Entity rule with only a name.
    pub fn entity(name: impl Into<String>) -> Self {
        RuleKind::Entity {
            entity: Some(name.into()),
            predefined_type: None,
        }
    }

    /// Property rule with only a property name.
    pub fn property(name: impl Into<String>) -> Self {
        RuleKind::Property {
            property_name: Some(name.into()),
            property_set: None,
            data_type: None,
            value: None,
        }
    }

    /// Material rule carrying the name under `material`.
    pub fn material(material: impl Into<String>) -> Self {
        RuleKind::Material {
            material: Some(material.into()),
            value: None,
        }
    }

    pub fn rule_type(&self) -> Option<RuleType> {
        match self {
            RuleKind::Property { .. } => Some(RuleType::Property),
            RuleKind::PartOf { .. } => Some(RuleType::PartOf),
            RuleKind::Material { .. } => Some(RuleType::Material),
            RuleKind::Classification { .. } => Some(RuleType::Classification),
            RuleKind::Entity { .. } => Some(RuleType::Entity),
            RuleKind::Attribute { .. } => Some(RuleType::Attribute),
            RuleKind::Unknown => None,
        }
    }

    /// Display name as used in the `type` field.
    pub fn type_name(&self) -> &'static str {
        self.rule_type().map_or("Unknown", RuleType::name)
    }
}

/// Discriminant of a recognized rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RuleType {
    Property,
    #[serde(rename = "Part of")]
    PartOf,
    Material,
    Classification,
    Entity,
    Attribute,
}

impl RuleType {
    /// Name as used in the `type` field.
    pub fn name(self) -> &'static str {
        match self {
            RuleType::Property => "Property",
            RuleType::PartOf => "Part of",
            RuleType::Material => "Material",
            RuleType::Classification => "Classification",
            RuleType::Entity => "Entity",
            RuleType::Attribute => "Attribute",
        }
    }
}

/// Returns the string if it is present and non-empty.
pub(crate) fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|text| !text.is_empty())
}
