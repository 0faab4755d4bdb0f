//! Audit and partial-failure reporting types.
//!
//! These are the structured outputs used to explain a computation
//! ([`AuditStep`]), flag soft anomalies ([`AuditWarning`]) and report
//! per-employee gaps in a batch ([`SkippedEmployee`]).

use serde::{Deserialize, Serialize};

/// A single step in the audit trail of a computation.
///
/// # Example
///
/// ```
/// use settlement_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "gross_salary".to_string(),
///     rule_name: "Gross Salary".to_string(),
///     input: serde_json::json!({"basic_salary": "200000"}),
///     output: serde_json::json!({"gross": "250000"}),
///     reasoning: "Basic salary plus five allowances".to_string(),
/// };
/// assert_eq!(step.step_number, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// Severity of an [`AuditWarning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    /// Informational.
    Low,
    /// Worth a look before approval.
    Medium,
    /// Likely a data or configuration error.
    High,
}

/// A soft anomaly that did not stop the computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level.
    pub severity: WarningSeverity,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(code: impl Into<String>, message: impl Into<String>, severity: WarningSeverity) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
        }
    }
}

/// An employee left out of a batch, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEmployee {
    /// The employee that was skipped.
    pub employee_id: String,
    /// Machine-readable reason code (e.g. `MISSING_SALARY_STRUCTURE`).
    pub code: String,
    /// Human-readable reason.
    pub reason: String,
}

impl SkippedEmployee {
    /// Creates a skipped-employee entry.
    pub fn new(employee_id: impl Into<String>, code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            code: code.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_severity_serialization() {
        let warning = AuditWarning::new("NEGATIVE_NET", "net below zero", WarningSeverity::High);
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["severity"], "high");
        assert_eq!(json["code"], "NEGATIVE_NET");
    }

    #[test]
    fn test_skipped_employee_new() {
        let skipped = SkippedEmployee::new("VAE-0009", "MISSING_JOB_ROLE", "no job role assigned");
        assert_eq!(skipped.employee_id, "VAE-0009");
        assert_eq!(skipped.code, "MISSING_JOB_ROLE");
    }
}
