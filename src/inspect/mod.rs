//! Document inspection.
//!
//! Summarizes a decoded document as-is: no import normalization is applied,
//! so the report shows exactly what a reader produced.

mod report;

pub use report::{InspectReport, RuleLine, SummarySection};

use crate::conversion::{ConversionCounts, Format};
use crate::ir::{Document, IfcVersion, Rule, RuleKind};

/// Options for document inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Width of histogram bars (in characters).
    pub bar_width: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self { bar_width: 20 }
    }
}

/// Inspect a document and produce a report.
pub fn inspect_document(doc: &Document, format: Format, opts: &InspectOptions) -> InspectReport {
    let spec = &doc.spec;

    let summary = SummarySection {
        title: spec.title.clone().unwrap_or_default(),
        name: spec.name.clone().unwrap_or_default(),
        description: spec.description.clone().unwrap_or_default(),
        ifc_versions: spec
            .ifc_version
            .clone()
            .map(IfcVersion::into_list)
            .unwrap_or_default(),
    };

    InspectReport {
        format: format.name().to_string(),
        summary,
        counts: ConversionCounts::from_rules(&doc.applicability),
        rules: doc.applicability.iter().map(describe_rule).collect(),
        bar_width: opts.bar_width,
    }
}

fn describe_rule(rule: &Rule) -> RuleLine {
    let text = |field: &Option<String>| field.clone().unwrap_or_default();

    let detail = match &rule.kind {
        RuleKind::Entity {
            entity,
            predefined_type,
        } => with_predefined(text(entity), predefined_type),
        RuleKind::PartOf {
            relation,
            entity,
            predefined_type,
        } => {
            let target = with_predefined(text(entity), predefined_type);
            match relation.as_deref().filter(|r| !r.is_empty()) {
                Some(relation) => format!("{} via {}", target, relation),
                None => target,
            }
        }
        RuleKind::Property {
            property_name,
            property_set,
            data_type,
            value,
        } => {
            let mut detail = match property_set.as_deref().filter(|s| !s.is_empty()) {
                Some(set) => format!("{}.{}", set, text(property_name)),
                None => text(property_name),
            };
            if let Some(data_type) = data_type.as_deref().filter(|t| !t.is_empty()) {
                detail.push_str(&format!(" ({})", data_type));
            }
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                detail.push_str(&format!(" = {}", value));
            }
            detail
        }
        RuleKind::Material { material, value } => material
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| text(value)),
        RuleKind::Classification { system, value } => {
            format!("{} {}", text(system), text(value)).trim().to_string()
        }
        RuleKind::Attribute { name, value } => format!("{} = {}", text(name), text(value)),
        RuleKind::Unknown => String::new(),
    };

    RuleLine {
        rule_type: rule.kind.type_name(),
        id: rule.id.as_ref().map(|id| id.as_str().to_string()),
        detail,
    }
}

fn with_predefined(entity: String, predefined_type: &Option<String>) -> String {
    match predefined_type.as_deref().filter(|p| !p.is_empty()) {
        Some(predefined) => format!("{} [{}]", entity, predefined),
        None => entity,
    }
}
