//! Findings a run reports without failing.
//!
//! Fatal problems are [`crate::Error`] values. Diagnostics cover what the
//! run worked around (a keyless table, a query shadowed by a CRUD method)
//! and what it planned.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Part of the output was skipped or degraded
    Warning,
    Info,
}

impl Severity {
    pub fn is_warning(self) -> bool {
        self == Self::Warning
    }

    fn label(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One finding, tagged with the phase that raised it and usually with the
/// table or query it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub phase: String,
    pub message: String,
    /// Generation unit, such as `table public.posts` or `query ListPosts`
    pub unit: Option<String>,
}

impl Diagnostic {
    fn new(severity: Severity, phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            phase: phase.into(),
            message: message.into(),
            unit: None,
        }
    }

    pub fn warning(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, phase, message)
    }

    pub fn info(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, phase, message)
    }

    pub fn on(self, unit: impl Into<String>) -> Self {
        Self {
            unit: Some(unit.into()),
            ..self
        }
    }
}

/// `warning [table public.logs]: no primary key`
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{} [{unit}]: {}", self.severity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let keyless = Diagnostic::warning("adapt", "no primary key").on("table public.logs");
        assert!(keyless.severity.is_warning());
        assert_eq!(keyless.to_string(), "warning [table public.logs]: no primary key");

        let planned = Diagnostic::info("plan", "12 files planned");
        assert!(!planned.severity.is_warning());
        assert_eq!(planned.to_string(), "info: 12 files planned");
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Diagnostic::warning("adapt", "x")).unwrap();
        assert!(json.contains("\"severity\":\"warning\""));
    }
}
