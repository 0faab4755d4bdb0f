//! Performance summary model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Month;

/// Probation outcome derived from the monthly score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbationStatus {
    /// Satisfactory; confirmation recommended.
    Pass,
    /// Improvement required; probation may be extended.
    Extend,
    /// Unsatisfactory.
    Fail,
}

/// The ranked monthly performance of one employee.
///
/// A locked summary is never touched by a recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// The employee.
    pub employee_id: String,
    /// The month ranked.
    pub month: Month,
    /// Department the rank is relative to.
    pub department_id: String,
    /// Weighted KPI score.
    pub total_score: Decimal,
    /// Rating label from the configured scale.
    pub performance_rating: String,
    /// 1-based position within the department.
    pub department_rank: u32,
    /// Set only for employees on probation during the month.
    pub probation_status: Option<ProbationStatus>,
    /// When true, recomputes leave this record unchanged.
    pub is_locked: bool,
}
