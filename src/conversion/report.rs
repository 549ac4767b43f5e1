//! Conversion report types for tracking lossiness and policy decisions.
//!
//! A report lists what an export to a given format keeps, drops, or
//! reshapes, so that callers can refuse lossy conversions up front.

use serde::Serialize;
use std::fmt;

use crate::ir::{Rule, RuleKind};

/// A report generated before exporting a document to another format.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Source format name.
    pub from: String,
    /// Target format name.
    pub to: String,
    /// Rule counts in the input document.
    pub input: ConversionCounts,
    /// Rule counts the target will contain.
    pub output: ConversionCounts,
    /// Issues discovered during conversion analysis.
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    /// Create a new empty report for a conversion between formats.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Default::default()
        }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    /// Count of warning-level issues (true lossiness).
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .count()
    }

    /// Count of info-level issues (policy decisions, notes).
    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Info)
            .count()
    }

    /// Returns true if this conversion would lose information.
    pub fn is_lossy(&self) -> bool {
        self.warning_count() > 0
    }

    /// Returns true if an issue with `code` was recorded.
    pub fn has(&self, code: ConversionIssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    /// Iterate over warning messages.
    pub fn lossy_messages(&self) -> impl Iterator<Item = &str> {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .map(|i| i.message.as_str())
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  {}", self.input)?;

        if self.output != self.input {
            writeln!(f, "  output: {}", self.output)?;
        }

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for message in self.lossy_messages() {
                writeln!(f, "  - {}", message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Info)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Rule counts, in total and per type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConversionCounts {
    pub rules: usize,
    pub entity: usize,
    pub part_of: usize,
    pub property: usize,
    pub material: usize,
    pub classification: usize,
    pub attribute: usize,
    pub unknown: usize,
}

impl ConversionCounts {
    /// Tally a sequence of rules.
    pub fn from_rules<'a>(rules: impl IntoIterator<Item = &'a Rule>) -> Self {
        let mut counts = Self::default();
        for rule in rules {
            counts.rules += 1;
            match rule.kind {
                RuleKind::Entity { .. } => counts.entity += 1,
                RuleKind::PartOf { .. } => counts.part_of += 1,
                RuleKind::Property { .. } => counts.property += 1,
                RuleKind::Material { .. } => counts.material += 1,
                RuleKind::Classification { .. } => counts.classification += 1,
                RuleKind::Attribute { .. } => counts.attribute += 1,
                RuleKind::Unknown => counts.unknown += 1,
            }
        }
        counts
    }
}

impl fmt::Display for ConversionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rule(s)", self.rules)?;

        let per_type = [
            ("entity", self.entity),
            ("part of", self.part_of),
            ("property", self.property),
            ("material", self.material),
            ("classification", self.classification),
            ("attribute", self.attribute),
            ("unknown", self.unknown),
        ];
        let parts: Vec<String> = per_type
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(name, count)| format!("{count} {name}"))
            .collect();
        if !parts.is_empty() {
            write!(f, " ({})", parts.join(", "))?;
        }
        Ok(())
    }
}

/// A single issue discovered during conversion analysis.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    /// Create a warning-level issue (indicates lossiness).
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Create an info-level issue (policy note, does not block).
    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

/// Severity level for conversion issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    /// A warning indicates information loss; requires `--allow-lossy`.
    Warning,
    /// An info note describes policy decisions; does not block conversion.
    Info,
}

/// Stable issue codes for programmatic consumption.
///
/// These codes are part of the JSON report and should remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    // Lossiness (Warning level)
    /// Rules of unrecognized type are left out of every export.
    DropUnknownRules,
    /// Attribute rules have no IDS XML element.
    DropAttributeRules,
    /// The description has no place in namespaced JSON or IDS XML.
    DropDescription,
    /// Reading the output back groups rules by type, changing their order.
    RegroupRulesByType,

    // Policy decisions (Info level)
    /// Rule ids are not written; the reader leaves or generates fresh ones.
    RuleIdsNotPreserved,
    /// XML writer emits `ifcVersion="IFC4"` when none is set.
    XmlDefaultIfcVersion,
    /// XML reader also reads the entity nested in each partOf as an entity rule.
    XmlPartOfEntityRescan,
    /// XML reader assigns fresh random ids.
    XmlReaderIdAssignment,
    /// Namespaced reader fills every missing field with an empty string.
    NamespacedReaderEmptyDefaults,
}
