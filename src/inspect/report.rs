//! Inspect report types and terminal formatting.

use serde::Serialize;
use std::fmt;

use crate::conversion::ConversionCounts;

/// The result of inspecting a decoded document.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    /// Format the document was read from.
    pub format: String,
    /// Metadata summary.
    pub summary: SummarySection,
    /// Rule counts per type.
    pub counts: ConversionCounts,
    /// One line per rule, in list order.
    pub rules: Vec<RuleLine>,
    #[serde(skip)]
    pub(crate) bar_width: usize,
}

/// Specification metadata as decoded.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SummarySection {
    pub title: String,
    pub name: String,
    pub description: String,
    pub ifc_versions: Vec<String>,
}

/// A single rule rendered as text.
#[derive(Clone, Debug, Serialize)]
pub struct RuleLine {
    /// Type name as used in the flat JSON `type` field.
    pub rule_type: &'static str,
    /// Rule id, if the reader produced one.
    pub id: Option<String>,
    /// Human-readable payload.
    pub detail: String,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌─ Summary ({}) ", self.format)?;
        writeln!(f, "│   Title:         {}", display_or_dash(&self.summary.title))?;
        if !self.summary.name.is_empty() {
            writeln!(f, "│   Name:          {}", self.summary.name)?;
        }
        if !self.summary.description.is_empty() {
            writeln!(f, "│   Description:   {}", self.summary.description)?;
        }
        writeln!(
            f,
            "│   IFC versions:  {}",
            display_or_dash(&self.summary.ifc_versions.join(", "))
        )?;
        writeln!(f, "│   Rules:         {}", self.counts.rules)?;
        writeln!(f, "└─")?;
        writeln!(f)?;

        self.fmt_distribution(f)?;

        if !self.rules.is_empty() {
            writeln!(f)?;
            writeln!(f, "┌─ Applicability ")?;
            for (index, line) in self.rules.iter().enumerate() {
                write!(f, "│   {:>3}. {:<15} {}", index + 1, line.rule_type, line.detail)?;
                if let Some(id) = &line.id {
                    write!(f, "  [{}]", id)?;
                }
                writeln!(f)?;
            }
            writeln!(f, "└─")?;
        }

        Ok(())
    }
}

impl InspectReport {
    fn fmt_distribution(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counts;
        let entries = [
            ("Entity", c.entity),
            ("Part of", c.part_of),
            ("Property", c.property),
            ("Material", c.material),
            ("Classification", c.classification),
            ("Attribute", c.attribute),
            ("Unknown", c.unknown),
        ];

        writeln!(f, "┌─ Rule types ")?;
        if c.rules == 0 {
            writeln!(f, "│   No applicability rules.")?;
        } else {
            let max_count = entries.iter().map(|(_, n)| *n).max().unwrap_or(1);
            for (name, count) in entries.iter().filter(|(_, n)| *n > 0) {
                writeln!(
                    f,
                    "│   {:<15} {:>5}  {}",
                    name,
                    count,
                    render_bar(*count, max_count, self.bar_width)
                )?;
            }
        }
        writeln!(f, "└─")
    }
}

fn display_or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

/// Render a horizontal bar scaled to `max`.
fn render_bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = (count * width).div_ceil(max);
    "█".repeat(filled)
}
