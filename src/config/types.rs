//! Configuration types for the settlement engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every struct has a
//! `Default` matching the shipped `config/default` directory.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ReferenceData;

/// Lateness thresholds used by the attendance classifier and the QUERY rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceRules {
    /// Delays below this many minutes are ON_TIME without any tolerance.
    pub on_time_grace_minutes: i64,
    /// Delays from this many minutes are LATE_30.
    pub late_threshold_minutes: i64,
    /// Delays from this many minutes are LATE_1HR.
    pub severe_late_threshold_minutes: i64,
    /// LATE_1HR/ABSENT events per QUERY. Zero disables the rule.
    pub query_trigger_count: u32,
}

impl Default for AttendanceRules {
    fn default() -> Self {
        Self {
            on_time_grace_minutes: 1,
            late_threshold_minutes: 30,
            severe_late_threshold_minutes: 60,
            query_trigger_count: 3,
        }
    }
}

impl AttendanceRules {
    /// Checks that `0 <= grace <= late < severe`.
    pub fn check(&self) -> Result<(), String> {
        if self.on_time_grace_minutes < 0 {
            return Err(format!(
                "on_time_grace_minutes {} is negative",
                self.on_time_grace_minutes
            ));
        }
        if self.late_threshold_minutes < self.on_time_grace_minutes {
            return Err(format!(
                "late_threshold_minutes {} is below on_time_grace_minutes {}",
                self.late_threshold_minutes, self.on_time_grace_minutes
            ));
        }
        if self.severe_late_threshold_minutes <= self.late_threshold_minutes {
            return Err(format!(
                "severe_late_threshold_minutes {} must exceed late_threshold_minutes {}",
                self.severe_late_threshold_minutes, self.late_threshold_minutes
            ));
        }
        Ok(())
    }
}

/// Late-day counts that escalate to a disciplinary action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisciplineRules {
    /// More late days than this earns a WARNING.
    pub warning_after_late_days: u32,
    /// More late days than this earns an HR_REVIEW.
    pub hr_review_after_late_days: u32,
}

impl Default for DisciplineRules {
    fn default() -> Self {
        Self {
            warning_after_late_days: 3,
            hr_review_after_late_days: 5,
        }
    }
}

/// One rating cut point: scores at or above `min_score` get `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingBand {
    /// Inclusive lower bound.
    pub min_score: Decimal,
    /// Rating label.
    pub label: String,
}

/// Ordered score-to-rating mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingScale {
    /// Cut points; evaluated highest first regardless of file order.
    pub bands: Vec<RatingBand>,
    /// Label for scores below every band.
    pub floor_label: String,
}

impl Default for RatingScale {
    fn default() -> Self {
        let band = |min: i64, label: &str| RatingBand {
            min_score: Decimal::new(min, 0),
            label: label.to_string(),
        };
        Self {
            bands: vec![
                band(90, "EXCELLENT"),
                band(75, "VERY GOOD"),
                band(60, "GOOD"),
                band(40, "AVERAGE"),
            ],
            floor_label: "POOR".to_string(),
        }
    }
}

/// Probation cut points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbationRules {
    /// Scores at or above this pass probation.
    pub pass_score: Decimal,
    /// Scores at or above this (and below `pass_score`) extend probation.
    pub extend_score: Decimal,
}

impl Default for ProbationRules {
    fn default() -> Self {
        Self {
            pass_score: Decimal::new(70, 0),
            extend_score: Decimal::new(50, 0),
        }
    }
}

/// Performance configuration section of `engine.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceRules {
    /// Score-to-rating mapping.
    pub ratings: RatingScale,
    /// Probation outcome thresholds.
    pub probation: ProbationRules,
}

/// Contents of `engine.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineRules {
    /// Attendance classification thresholds.
    pub attendance: AttendanceRules,
    /// Disciplinary escalation thresholds.
    pub discipline: DisciplineRules,
    /// Rating and probation thresholds.
    pub performance: PerformanceRules,
}

impl EngineRules {
    /// Checks the invariants of every section.
    pub fn check(&self) -> Result<(), String> {
        self.attendance.check()?;
        if self.discipline.hr_review_after_late_days < self.discipline.warning_after_late_days {
            return Err(format!(
                "hr_review_after_late_days {} is below warning_after_late_days {}",
                self.discipline.hr_review_after_late_days,
                self.discipline.warning_after_late_days
            ));
        }
        if self.performance.probation.pass_score < self.performance.probation.extend_score {
            return Err("probation pass_score is below extend_score".to_string());
        }
        Ok(())
    }
}

/// One progressive tax bracket. Income above `threshold` (up to the next
/// bracket's threshold) is taxed at `rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Annual lower bound of the bracket.
    pub threshold: Decimal,
    /// Marginal rate as a fraction (0.07 for 7%).
    pub rate: Decimal,
}

/// Contents of `tax.yaml`: the progressive bracket table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTable {
    /// Name of the tax regime.
    pub regime: String,
    /// Pay periods per year used to annualize a period's gross.
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
    /// Brackets in ascending threshold order.
    pub brackets: Vec<TaxBracket>,
}

impl Default for TaxTable {
    /// The Nigeria Tax Act 2025 PAYE table.
    fn default() -> Self {
        let bracket = |threshold: i64, rate_pct: i64| TaxBracket {
            threshold: Decimal::new(threshold, 0),
            rate: Decimal::new(rate_pct, 2),
        };
        Self {
            regime: "NTA-2025".to_string(),
            periods_per_year: 12,
            brackets: vec![
                bracket(0, 0),
                bracket(800_000, 7),
                bracket(1_100_000, 11),
                bracket(1_400_000, 15),
                bracket(1_900_000, 19),
                bracket(2_400_000, 21),
                bracket(4_000_000, 24),
            ],
        }
    }
}

fn default_periods_per_year() -> u32 {
    12
}

impl TaxTable {
    /// Checks the table's invariants, returning a description of the first
    /// violation.
    pub fn check(&self) -> Result<(), String> {
        if self.periods_per_year == 0 {
            return Err("periods_per_year must be positive".to_string());
        }
        if self.brackets.is_empty() {
            return Err("at least one bracket is required".to_string());
        }
        if self.brackets[0].threshold != Decimal::ZERO {
            return Err("the first bracket must start at 0".to_string());
        }
        for pair in self.brackets.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(format!(
                    "bracket thresholds must be strictly ascending ({} then {})",
                    pair[0].threshold, pair[1].threshold
                ));
            }
        }
        if let Some(bad) = self
            .brackets
            .iter()
            .find(|b| b.rate < Decimal::ZERO || b.rate > Decimal::ONE)
        {
            return Err(format!("rate {} is outside 0..=1", bad.rate));
        }
        Ok(())
    }
}

/// The complete configuration of one engine instance.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Thresholds from `engine.yaml`.
    pub rules: EngineRules,
    /// Bracket table from `tax.yaml`.
    pub tax: TaxTable,
    /// Reference data from `organization.yaml`.
    pub reference: ReferenceData,
}
