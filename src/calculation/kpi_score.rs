//! Weighted KPI scoring.
//!
//! Scoring is done in two explicit steps: the active items of a template
//! are joined with the employee's entries (missing entries get the default
//! target of 100 and actual of 0), then each joined line contributes
//! `actual / target x weight`.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{
    AuditWarning, EmployeeKpiEntry, KpiLine, KpiScore, KpiTemplate, KpiTemplateItem, Month,
    WarningSeverity,
};

/// Target points used when an employee has no entry for an item.
pub const DEFAULT_TARGET_POINTS: Decimal = Decimal::ONE_HUNDRED;

/// Actual points used when an employee has no entry for an item.
pub const DEFAULT_ACTUAL_POINTS: Decimal = Decimal::ZERO;

/// The weight total a template is expected to have.
pub const EXPECTED_WEIGHT_TOTAL: Decimal = Decimal::ONE_HUNDRED;

/// Largest target or actual a KPI entry may carry.
pub const MAX_KPI_POINTS: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Smallest non-zero target a KPI entry may carry (0.01).
pub const MIN_NONZERO_TARGET_POINTS: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// A template item paired with the employee's entry, or the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedKpiItem<'a> {
    /// The template item.
    pub item: &'a KpiTemplateItem,
    /// Target points from the entry, or [`DEFAULT_TARGET_POINTS`].
    pub target_points: Decimal,
    /// Actual points from the entry, or [`DEFAULT_ACTUAL_POINTS`].
    pub actual_points: Decimal,
    /// True when no entry existed.
    pub defaulted: bool,
}

/// Joins the active items of `template` with `entries`.
///
/// Entries whose item is not an active item of the template are ignored.
/// The output follows template item order.
pub fn join_entries_with_defaults<'a>(
    template: &'a KpiTemplate,
    entries: &[EmployeeKpiEntry],
) -> Vec<JoinedKpiItem<'a>> {
    template
        .active_items()
        .map(|item| match entries.iter().find(|e| e.template_item_id == item.id) {
            Some(entry) => JoinedKpiItem {
                item,
                target_points: entry.target_points,
                actual_points: entry.actual_points,
                defaulted: false,
            },
            None => JoinedKpiItem {
                item,
                target_points: DEFAULT_TARGET_POINTS,
                actual_points: DEFAULT_ACTUAL_POINTS,
                defaulted: true,
            },
        })
        .collect()
}

/// Contribution of one item: `actual / target x weight`, zero when the
/// target is zero. Returns `None` if the result does not fit a `Decimal`.
///
/// # Examples
///
/// ```
/// use settlement_engine::calculation::item_contribution;
/// use rust_decimal::Decimal;
///
/// let c = item_contribution(Decimal::new(80, 0), Decimal::new(100, 0), Decimal::new(40, 0));
/// assert_eq!(c, Some(Decimal::new(32, 0)));
///
/// let zero = item_contribution(Decimal::new(80, 0), Decimal::ZERO, Decimal::new(40, 0));
/// assert_eq!(zero, Some(Decimal::ZERO));
///
/// let huge = item_contribution(Decimal::MAX, Decimal::new(1, 28), Decimal::new(40, 0));
/// assert_eq!(huge, None);
/// ```
pub fn item_contribution(actual: Decimal, target: Decimal, weight: Decimal) -> Option<Decimal> {
    if target.is_zero() {
        return Some(Decimal::ZERO);
    }
    actual.checked_div(target)?.checked_mul(weight)
}

/// Scores one employee's month against a template.
///
/// The total is rounded to 2 decimal places and is not clamped, so actuals
/// above target push the score past 100. A weight total other than 100 and
/// any zero target are reported as warnings; neither stops the scoring.
/// A line whose contribution overflows, or would overflow the running
/// total, contributes zero and raises a `CONTRIBUTION_OVERFLOW` warning.
pub fn score_template(
    employee_id: &str,
    month: Month,
    template: &KpiTemplate,
    entries: &[EmployeeKpiEntry],
) -> KpiScore {
    let mut warnings = Vec::new();
    let mut total = Decimal::ZERO;

    let lines: Vec<KpiLine> = join_entries_with_defaults(template, entries)
        .into_iter()
        .map(|joined| {
            if joined.target_points.is_zero() {
                warnings.push(AuditWarning::new(
                    "ZERO_TARGET",
                    format!(
                        "KPI '{}' has a zero target; it contributes nothing",
                        joined.item.kpi_name
                    ),
                    WarningSeverity::Low,
                ));
            }
            let contribution = item_contribution(
                joined.actual_points,
                joined.target_points,
                joined.item.weight_points,
            )
            .and_then(|c| total.checked_add(c).map(|sum| (c, sum)));
            let contribution = match contribution {
                Some((c, sum)) => {
                    total = sum;
                    c
                }
                None => {
                    warnings.push(AuditWarning::new(
                        "CONTRIBUTION_OVERFLOW",
                        format!(
                            "KPI '{}' (actual {}, target {}) overflows; it contributes nothing",
                            joined.item.kpi_name, joined.actual_points, joined.target_points
                        ),
                        WarningSeverity::High,
                    ));
                    Decimal::ZERO
                }
            };
            KpiLine {
                template_item_id: joined.item.id.clone(),
                kpi_name: joined.item.kpi_name.clone(),
                weight_points: joined.item.weight_points,
                target_points: joined.target_points,
                actual_points: joined.actual_points,
                defaulted: joined.defaulted,
                contribution,
            }
        })
        .collect();

    let weight_total = template.active_weight_total();
    if weight_total != EXPECTED_WEIGHT_TOTAL {
        warnings.push(AuditWarning::new(
            "WEIGHT_TOTAL_MISMATCH",
            format!(
                "template '{}' active weights sum to {}, expected {}",
                template.id, weight_total, EXPECTED_WEIGHT_TOTAL
            ),
            WarningSeverity::Medium,
        ));
    }

    let total_score = total
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    KpiScore {
        employee_id: employee_id.to_string(),
        month,
        template_id: template.id.clone(),
        lines,
        total_score,
        weight_total,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn month() -> Month {
        Month::new(2025, 3).unwrap()
    }

    fn template(weights: &[&str]) -> KpiTemplate {
        KpiTemplate {
            id: "tpl_cashier".to_string(),
            job_role_id: "role_cashier".to_string(),
            name: "Cashier Scorecard".to_string(),
            is_active: true,
            items: weights
                .iter()
                .enumerate()
                .map(|(i, w)| KpiTemplateItem {
                    id: format!("item_{}", i + 1),
                    kpi_name: format!("KPI {}", i + 1),
                    weight_points: dec(w),
                    is_active: true,
                })
                .collect(),
        }
    }

    fn entry(item: &str, target: &str, actual: &str) -> EmployeeKpiEntry {
        EmployeeKpiEntry {
            employee_id: "EMP-001".to_string(),
            template_item_id: item.to_string(),
            month: month(),
            target_points: dec(target),
            actual_points: dec(actual),
        }
    }

    /// KPI-001: all actuals at target on a 100-point template score 100
    #[test]
    fn test_full_marks() {
        let tpl = template(&["40", "35", "25"]);
        let entries = vec![
            entry("item_1", "100", "100"),
            entry("item_2", "20", "20"),
            entry("item_3", "7", "7"),
        ];
        let score = score_template("EMP-001", month(), &tpl, &entries);
        assert_eq!(score.total_score, dec("100"));
        assert!(score.warnings.is_empty());
    }

    /// KPI-002: missing entries default to target 100, actual 0
    #[test]
    fn test_missing_entries_default() {
        let tpl = template(&["60", "40"]);
        let entries = vec![entry("item_1", "100", "50")];
        let score = score_template("EMP-001", month(), &tpl, &entries);
        assert_eq!(score.total_score, dec("30"));
        assert!(!score.lines[0].defaulted);
        assert!(score.lines[1].defaulted);
        assert_eq!(score.lines[1].target_points, dec("100"));
        assert_eq!(score.lines[1].actual_points, Decimal::ZERO);
    }

    /// KPI-003: a zero target contributes zero and warns
    #[test]
    fn test_zero_target() {
        let tpl = template(&["50", "50"]);
        let entries = vec![entry("item_1", "0", "80"), entry("item_2", "10", "10")];
        let score = score_template("EMP-001", month(), &tpl, &entries);
        assert_eq!(score.lines[0].contribution, Decimal::ZERO);
        assert_eq!(score.total_score, dec("50"));
        assert!(score.warnings.iter().any(|w| w.code == "ZERO_TARGET"));
    }

    /// KPI-004: stretch performance is not clamped
    #[test]
    fn test_stretch_not_clamped() {
        let tpl = template(&["100"]);
        let entries = vec![entry("item_1", "100", "150")];
        let score = score_template("EMP-001", month(), &tpl, &entries);
        assert_eq!(score.total_score, dec("150"));
    }

    /// KPI-005: weights off 100 warn but still score proportionally
    #[test]
    fn test_weight_mismatch_warns() {
        let tpl = template(&["50", "30"]);
        let entries = vec![entry("item_1", "100", "100"), entry("item_2", "100", "100")];
        let score = score_template("EMP-001", month(), &tpl, &entries);
        assert_eq!(score.total_score, dec("80"));
        assert_eq!(score.weight_total, dec("80"));
        assert!(score.warnings.iter().any(|w| w.code == "WEIGHT_TOTAL_MISMATCH"));
    }

    /// KPI-006: orphaned entries and inactive items are ignored
    #[test]
    fn test_orphans_and_inactive_items_ignored() {
        let mut tpl = template(&["100", "10"]);
        tpl.items[1].is_active = false;
        let entries = vec![
            entry("item_1", "100", "90"),
            entry("item_2", "100", "100"),
            entry("item_removed", "100", "100"),
        ];
        let score = score_template("EMP-001", month(), &tpl, &entries);
        assert_eq!(score.lines.len(), 1);
        assert_eq!(score.total_score, dec("90"));
    }

    /// KPI-007: totals are rounded to 2 decimal places
    #[test]
    fn test_rounding() {
        let tpl = template(&["100"]);
        let entries = vec![entry("item_1", "3", "1")];
        let score = score_template("EMP-001", month(), &tpl, &entries);
        assert_eq!(score.total_score, dec("33.33"));
    }

    /// KPI-008: an overflowing contribution scores zero and warns
    #[test]
    fn test_contribution_overflow() {
        let tpl = template(&["60", "40"]);
        let entries = vec![
            EmployeeKpiEntry {
                target_points: Decimal::new(1, 28),
                actual_points: Decimal::MAX,
                ..entry("item_1", "1", "1")
            },
            entry("item_2", "100", "50"),
        ];
        let score = score_template("EMP-001", month(), &tpl, &entries);
        assert_eq!(score.lines[0].contribution, Decimal::ZERO);
        assert_eq!(score.total_score, dec("20"));
        let warning = score
            .warnings
            .iter()
            .find(|w| w.code == "CONTRIBUTION_OVERFLOW")
            .unwrap();
        assert_eq!(warning.severity, WarningSeverity::High);
    }

    /// KPI-009: a running total that would overflow drops the offending line
    #[test]
    fn test_total_overflow() {
        let tpl = template(&["1", "1"]);
        let entries = vec![
            entry("item_1", "1", &Decimal::MAX.to_string()),
            entry("item_2", "1", &Decimal::MAX.to_string()),
        ];
        let score = score_template("EMP-001", month(), &tpl, &entries);
        assert_eq!(score.lines[0].contribution, Decimal::MAX);
        assert_eq!(score.lines[1].contribution, Decimal::ZERO);
        assert_eq!(
            score.warnings.iter().filter(|w| w.code == "CONTRIBUTION_OVERFLOW").count(),
            1
        );
    }

    proptest! {
        #[test]
        fn prop_actual_equals_target_scores_100(
            split in prop::collection::vec(1u32..50, 1..6),
            targets in prop::collection::vec(1u32..10_000, 6),
        ) {
            // weights: the generated parts, with the remainder making 100
            let mut weights: Vec<Decimal> = Vec::new();
            let mut remaining = 100u32;
            for part in split {
                if part >= remaining {
                    break;
                }
                weights.push(Decimal::from(part));
                remaining -= part;
            }
            weights.push(Decimal::from(remaining));

            let tpl = KpiTemplate {
                id: "tpl".to_string(),
                job_role_id: "role".to_string(),
                name: "Generated".to_string(),
                is_active: true,
                items: weights
                    .iter()
                    .enumerate()
                    .map(|(i, w)| KpiTemplateItem {
                        id: format!("item_{}", i),
                        kpi_name: format!("KPI {}", i),
                        weight_points: *w,
                        is_active: true,
                    })
                    .collect(),
            };
            let entries: Vec<EmployeeKpiEntry> = (0..weights.len())
                .map(|i| {
                    let t = Decimal::from(targets[i % targets.len()]);
                    EmployeeKpiEntry {
                        employee_id: "EMP".to_string(),
                        template_item_id: format!("item_{}", i),
                        month: month(),
                        target_points: t,
                        actual_points: t,
                    }
                })
                .collect();

            let score = score_template("EMP", month(), &tpl, &entries);
            prop_assert_eq!(score.total_score, Decimal::ONE_HUNDRED);
        }

        #[test]
        fn prop_zero_target_contributes_zero(actual in 0u32..10_000, weight in 0u32..100) {
            let c = item_contribution(Decimal::from(actual), Decimal::ZERO, Decimal::from(weight));
            prop_assert_eq!(c, Some(Decimal::ZERO));
        }
    }
}
