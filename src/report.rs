//! Section and report text model.
//!
//! Collectors build a [`Section`] and hand back its lines; assemblers wrap
//! one or more sections in a [`Report`] with a title and timestamp.

use chrono::Local;

use crate::error::CollectError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default)]
pub struct Section {
    lines: Vec<String>,
}

impl Section {
    pub fn new(heading: &str) -> Self {
        Self {
            lines: vec![format!("## {}", heading)],
        }
    }

    /// Start a `##` section preceded by a blank line, for sections that
    /// follow another one in a combined report.
    pub fn spaced(heading: &str) -> Self {
        Self {
            lines: vec![format!("\n## {}", heading)],
        }
    }

    pub fn field(&mut self, key: &str, value: impl std::fmt::Display) -> &mut Self {
        self.lines.push(format!("- **{}**: {}", key, value));
        self
    }

    /// A field that opens a new visual block.
    pub fn spaced_field(&mut self, key: &str, value: impl std::fmt::Display) -> &mut Self {
        self.lines.push(format!("\n- **{}**: {}", key, value));
        self
    }

    pub fn sub_field(&mut self, key: &str, value: impl std::fmt::Display) -> &mut Self {
        self.lines.push(format!("  - **{}**: {}", key, value));
        self
    }

    pub fn subheading(&mut self, title: &str) -> &mut Self {
        self.lines.push(format!("\n### {}", title));
        self
    }

    pub fn item(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- **{}**", text));
        self
    }

    pub fn table(&mut self, headers: &[&str]) -> &mut Self {
        self.lines.push(format!("| {} |", headers.join(" | ")));
        let rule: Vec<String> = headers.iter().map(|h| "-".repeat(h.len() + 2)).collect();
        self.lines.push(format!("|{}|", rule.join("|")));
        self
    }

    pub fn row(&mut self, cells: &[String]) -> &mut Self {
        self.lines.push(format!("| {} |", cells.join(" | ")));
        self
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(text.into());
        self
    }

    pub fn extend(&mut self, lines: Vec<String>) -> &mut Self {
        self.lines.extend(lines);
        self
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Inline warning used wherever a failure is rendered instead of raised.
pub fn warning_line(label: &str, message: impl std::fmt::Display) -> String {
    format!("⚠️ **{}**: {}", label, message)
}

#[derive(Debug)]
pub struct Report {
    lines: Vec<String>,
}

impl Report {
    pub fn new(title: &str) -> Self {
        Self {
            lines: vec![
                format!("# {}", title),
                format!("*Generated: {}*\n", Local::now().format(TIMESTAMP_FORMAT)),
            ],
        }
    }

    pub fn extend(&mut self, lines: Vec<String>) {
        self.lines.extend(lines);
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Close the error boundary: whatever was collected stays, a fault
    /// becomes one trailing warning line.
    pub fn settle(&mut self, outcome: Result<(), CollectError>, label: &str) {
        if let Err(e) = outcome {
            self.lines.push(warning_line(label, e));
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}
