//! KPI template, entry and score models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AuditWarning, Month};

/// One weighted line of a KPI template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiTemplateItem {
    /// Unique identifier for the item.
    pub id: String,
    /// Display name of the KPI.
    pub kpi_name: String,
    /// Share of the nominal 100-point score carried by this item.
    pub weight_points: Decimal,
    /// Inactive items are ignored by scoring.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// The ordered KPI set for a job role.
///
/// Active item weights are expected to sum to 100. A mismatch is reported as
/// a warning; scoring still runs proportionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiTemplate {
    /// Unique identifier for the template.
    pub id: String,
    /// Job role the template applies to.
    pub job_role_id: String,
    /// Display name.
    pub name: String,
    /// Only active templates are used for scoring.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Template items in display order.
    pub items: Vec<KpiTemplateItem>,
}

impl KpiTemplate {
    /// Iterates the active items in order.
    pub fn active_items(&self) -> impl Iterator<Item = &KpiTemplateItem> {
        self.items.iter().filter(|item| item.is_active)
    }

    /// Sum of the active item weights.
    pub fn active_weight_total(&self) -> Decimal {
        self.active_items().map(|item| item.weight_points).sum()
    }
}

/// An employee's target and actual points for one template item in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeKpiEntry {
    /// The employee.
    pub employee_id: String,
    /// The template item scored.
    pub template_item_id: String,
    /// The month scored.
    pub month: Month,
    /// Points expected.
    pub target_points: Decimal,
    /// Points achieved.
    pub actual_points: Decimal,
}

/// A template item joined with the employee's entry (or its defaults).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiLine {
    /// The template item.
    pub template_item_id: String,
    /// Display name of the KPI.
    pub kpi_name: String,
    /// Item weight.
    pub weight_points: Decimal,
    /// Target points (100 when no entry exists).
    pub target_points: Decimal,
    /// Actual points (0 when no entry exists).
    pub actual_points: Decimal,
    /// True when no entry existed and defaults were used.
    pub defaulted: bool,
    /// `actual / target x weight`, or zero when the target is zero.
    pub contribution: Decimal,
}

/// The computed monthly KPI score of one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiScore {
    /// The employee.
    pub employee_id: String,
    /// The month scored.
    pub month: Month,
    /// The template used.
    pub template_id: String,
    /// One line per active template item.
    pub lines: Vec<KpiLine>,
    /// Sum of contributions rounded to 2 dp. Not clamped at 100.
    pub total_score: Decimal,
    /// Sum of active item weights.
    pub weight_total: Decimal,
    /// Soft anomalies found while scoring.
    pub warnings: Vec<AuditWarning>,
}

fn default_true() -> bool {
    true
}
