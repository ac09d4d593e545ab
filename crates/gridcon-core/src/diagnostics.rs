//! Diagnostics collected while validating a network or inspecting a solution.
//!
//! Issues carry a severity, a category for grouping ("structure", "shape",
//! "physical", "reference", "solution"), and optional references to the
//! entity and timestep they concern.
//!
//! # Example
//!
//! ```
//! use gridcon_core::diagnostics::Diagnostics;
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning_at_timestep("solution", "Slack source supplied 3.2 kWh", 17);
//! diag.add_error_with_entity("structure", "Sink must draw from exactly one bus", "demand");
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.error_count(), 1);
//! ```

use serde::Serialize;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The run continues but the result deserves a look
    Warning,
    /// The model cannot be solved as given
    Error,
}

/// A single diagnostic issue
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Category for grouping (e.g. "structure", "shape", "solution")
    pub category: String,
    pub message: String,
    /// Optional timestep the issue refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestep: Option<usize>,
    /// Optional entity reference (e.g. "b_el_lv", "storage")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            timestep: None,
            entity: None,
        }
    }

    pub fn with_timestep(mut self, timestep: usize) -> Self {
        self.timestep = Some(timestep);
        self
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        if let Some(t) = self.timestep {
            write!(f, " at timestep {}", t)?;
        }

        Ok(())
    }
}

/// Collection of diagnostic issues
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Warning Methods
    // =========================================================================

    pub fn add_warning_at_timestep(&mut self, category: &str, message: &str, timestep: usize) {
        self.issues.push(
            DiagnosticIssue::new(Severity::Warning, category, message).with_timestep(timestep),
        );
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    // =========================================================================
    // Error Methods
    // =========================================================================

    pub fn add_error(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message));
    }

    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// Merge another diagnostics into this one
    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }

    /// Get summary string
    pub fn summary(&self) -> String {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        match (self.warning_count(), self.error_count()) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => format!("{} warning{}", w, plural(w)),
            (0, e) => format!("{} error{}", e, plural(e)),
            (w, e) => format!("{} warning{}, {} error{}", w, plural(w), e, plural(e)),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_counts() {
        let mut diag = Diagnostics::new();
        assert!(!diag.has_issues());

        diag.add_warning_with_entity("structure", "Bus has no flows", "b_el_mv");
        diag.add_error("structure", "no buses");
        diag.add_warning_at_timestep("solution", "slack used", 3);

        assert_eq!(diag.warning_count(), 2);
        assert_eq!(diag.error_count(), 1);
        assert!(diag.has_issues());
        assert!(diag.has_errors());
    }

    #[test]
    fn test_diagnostics_serialization() {
        let mut diag = Diagnostics::new();
        diag.add_warning_at_timestep("solution", "Slack source used", 47);
        diag.add_error_with_entity("shape", "Profile too short", "pv");

        let json = serde_json::to_string_pretty(&diag).unwrap();
        assert!(json.contains("\"warning\""));
        assert!(json.contains("\"timestep\": 47"));
        assert!(json.contains("\"entity\": \"pv\""));

        assert_eq!(serde_json::to_string(&Diagnostics::new()).unwrap(), "{}");
    }

    #[test]
    fn test_diagnostic_issue_display() {
        let issue = DiagnosticIssue::new(Severity::Error, "physical", "Invalid efficiency")
            .with_entity("transformer_forward")
            .with_timestep(42);

        let display = format!("{}", issue);
        assert!(display.contains("error"));
        assert!(display.contains("physical"));
        assert!(display.contains("transformer_forward"));
        assert!(display.contains("timestep 42"));
    }

    #[test]
    fn test_diagnostics_summary_and_display() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.summary(), "No issues");

        diag.add_warning_at_timestep("solution", "Slack source supplied 1.000 kWh", 5);
        assert_eq!(diag.summary(), "1 warning");

        diag.add_error("structure", "error");
        assert_eq!(diag.summary(), "1 warning, 1 error");

        diag.add_warning_at_timestep("solution", "Slack source supplied 2.000 kWh", 6);
        assert_eq!(diag.summary(), "2 warnings, 1 error");

        let text = diag.to_string();
        assert!(text.starts_with("Diagnostics: 2 warnings, 1 error\n"));
        assert!(text.contains("  [warning:solution] Slack source supplied 2.000 kWh at timestep 6"));
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut build = Diagnostics::new();
        build.add_warning_with_entity("economics", "negative cost", "storage");

        let mut solution = Diagnostics::new();
        solution.add_warning_at_timestep("solution", "slack", 0);

        build.merge(solution);
        let categories: Vec<&str> = build.issues.iter().map(|i| i.category.as_str()).collect();
        assert_eq!(categories, vec!["economics", "solution"]);
    }
}
