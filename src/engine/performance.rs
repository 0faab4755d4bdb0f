//! KPI entries, monthly scores and department ranking.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calculation::{
    DEFAULT_ACTUAL_POINTS, DEFAULT_TARGET_POINTS, MAX_KPI_POINTS, MIN_NONZERO_TARGET_POINTS,
    probation_status, rate_score, score_template,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, EmployeeKpiEntry, KpiScore, KpiTemplate, Month, PerformanceSummary, SkippedEmployee,
};

use super::SettlementEngine;

/// Result of one ranking run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingReport {
    /// The month ranked.
    pub month: Month,
    /// The department ranked, or `None` for all departments.
    pub department_id: Option<String>,
    /// Ranked summaries, ordered by department then rank. Locked summaries
    /// appear exactly as stored.
    pub summaries: Vec<PerformanceSummary>,
    /// Employees in scope that have no score for the month.
    pub skipped: Vec<SkippedEmployee>,
}

struct Candidate<'a> {
    employee: &'a Employee,
    score: Decimal,
    locked: Option<PerformanceSummary>,
}

impl SettlementEngine {
    fn employee_or_not_found(&self, employee_id: &str) -> EngineResult<&Employee> {
        self.reference
            .employee(employee_id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "Employee",
                id: employee_id.to_string(),
            })
    }

    fn template_for(&self, employee: &Employee) -> Result<&KpiTemplate, SkippedEmployee> {
        let role_id = employee.job_role_id.as_deref().ok_or_else(|| {
            SkippedEmployee::new(&employee.id, "MISSING_JOB_ROLE", "no job role assigned")
        })?;
        self.reference.active_kpi_template(role_id).ok_or_else(|| {
            SkippedEmployee::new(
                &employee.id,
                "MISSING_KPI_TEMPLATE",
                format!("job role '{}' has no active KPI template", role_id),
            )
        })
    }

    fn template_or_error(&self, employee: &Employee) -> EngineResult<&KpiTemplate> {
        self.template_for(employee)
            .map_err(|skip| EngineError::MissingConfiguration {
                employee_id: skip.employee_id,
                missing: skip.reason,
            })
    }

    /// Creates or updates an employee's entry for one template item.
    ///
    /// The item must belong to the active KPI template of the employee's
    /// job role. Both points must lie in `0..=MAX_KPI_POINTS`, and a
    /// non-zero target must be at least `MIN_NONZERO_TARGET_POINTS`.
    pub fn save_kpi_entry(&self, entry: EmployeeKpiEntry) -> EngineResult<EmployeeKpiEntry> {
        let employee = self.employee_or_not_found(&entry.employee_id)?;
        let template = self.template_or_error(employee)?;

        let mut problems = Vec::new();
        if !template.items.iter().any(|i| i.id == entry.template_item_id) {
            problems.push(format!(
                "template item '{}' is not part of template '{}'",
                entry.template_item_id, template.id
            ));
        }
        if entry.target_points < Decimal::ZERO {
            problems.push(format!("target_points {} is negative", entry.target_points));
        } else if entry.target_points > MAX_KPI_POINTS {
            problems.push(format!(
                "target_points {} exceeds {}",
                entry.target_points, MAX_KPI_POINTS
            ));
        } else if !entry.target_points.is_zero() && entry.target_points < MIN_NONZERO_TARGET_POINTS {
            problems.push(format!(
                "target_points {} is below {}",
                entry.target_points, MIN_NONZERO_TARGET_POINTS
            ));
        }
        if entry.actual_points < Decimal::ZERO {
            problems.push(format!("actual_points {} is negative", entry.actual_points));
        } else if entry.actual_points > MAX_KPI_POINTS {
            problems.push(format!(
                "actual_points {} exceeds {}",
                entry.actual_points, MAX_KPI_POINTS
            ));
        }
        if !problems.is_empty() {
            return Err(EngineError::Validation {
                message: format!("KPI entry for employee '{}' rejected", entry.employee_id),
                details: problems,
            });
        }

        let key = (
            entry.employee_id.clone(),
            entry.template_item_id.clone(),
            entry.month,
        );
        let previous = self.ledger().kpi_entries.insert(key, entry.clone());
        debug!(
            employee_id = %entry.employee_id,
            template_item_id = %entry.template_item_id,
            month = %entry.month,
            created = previous.is_none(),
            "KPI entry saved"
        );
        Ok(entry)
    }

    /// Creates default entries (target 100, actual 0) for every active item
    /// of the employee's template that has no entry for `month`. Returns the
    /// entries created.
    pub fn assign_role_kpis(
        &self,
        employee_id: &str,
        month: Month,
    ) -> EngineResult<Vec<EmployeeKpiEntry>> {
        let employee = self.employee_or_not_found(employee_id)?;
        let template = self.template_or_error(employee)?;

        let mut ledger = self.ledger();
        let mut created = Vec::new();
        for item in template.active_items() {
            let key = (employee_id.to_string(), item.id.clone(), month);
            if ledger.kpi_entries.contains_key(&key) {
                continue;
            }
            let entry = EmployeeKpiEntry {
                employee_id: employee_id.to_string(),
                template_item_id: item.id.clone(),
                month,
                target_points: DEFAULT_TARGET_POINTS,
                actual_points: DEFAULT_ACTUAL_POINTS,
            };
            ledger.kpi_entries.insert(key, entry.clone());
            created.push(entry);
        }
        info!(
            employee_id = %employee_id,
            month = %month,
            template_id = %template.id,
            created = created.len(),
            "Role KPIs assigned"
        );
        Ok(created)
    }

    /// The stored KPI entries of one employee for `month`.
    pub fn kpi_entries(&self, employee_id: &str, month: Month) -> Vec<EmployeeKpiEntry> {
        self.ledger()
            .kpi_entries
            .values()
            .filter(|e| e.employee_id == employee_id && e.month == month)
            .cloned()
            .collect()
    }

    /// Scores one employee's month.
    ///
    /// Returns `Ok(None)` when the employee's role has no active template:
    /// such an employee has no score, which is not the same as a zero score.
    pub fn compute_monthly_score(
        &self,
        employee_id: &str,
        month: Month,
    ) -> EngineResult<Option<KpiScore>> {
        let employee = self.employee_or_not_found(employee_id)?;
        Ok(self
            .template_for(employee)
            .ok()
            .map(|template| self.score_employee(employee, month, template)))
    }

    fn score_employee(&self, employee: &Employee, month: Month, template: &KpiTemplate) -> KpiScore {
        let entries = self.kpi_entries(&employee.id, month);
        let score = score_template(&employee.id, month, template, &entries);
        for warning in &score.warnings {
            warn!(
                employee_id = %employee.id,
                month = %month,
                code = %warning.code,
                message = %warning.message,
                "KPI scoring warning"
            );
        }
        score
    }

    /// Ranks employees by KPI score within their department.
    ///
    /// Every active employee of the department (or of all departments) with
    /// a template is scored. Employees are ordered by descending score, ties
    /// broken by employee id; an unlocked summary takes its position as
    /// `department_rank`. Locked summaries take part in the ordering with
    /// their stored score but are never modified. Employees without a
    /// template are skipped and any unlocked summary they had is removed.
    pub fn rank(&self, month: Month, department_id: Option<&str>) -> EngineResult<RankingReport> {
        if let Some(id) = department_id {
            if self.reference.department(id).is_none() {
                return Err(EngineError::NotFound {
                    entity: "Department",
                    id: id.to_string(),
                });
            }
        }

        self.with_month_lock(month, || {
            let stored: BTreeMap<String, PerformanceSummary> = self
                .ledger()
                .performance
                .values()
                .filter(|s| s.month == month)
                .map(|s| (s.employee_id.clone(), s.clone()))
                .collect();

            let mut by_department: BTreeMap<&str, Vec<Candidate<'_>>> = BTreeMap::new();
            let mut skipped = Vec::new();
            for employee in self
                .reference
                .active_employees()
                .filter(|e| department_id.is_none_or(|d| e.department_id == d))
            {
                let candidate = match stored.get(&employee.id).filter(|s| s.is_locked) {
                    Some(locked) => Candidate {
                        employee,
                        score: locked.total_score,
                        locked: Some(locked.clone()),
                    },
                    None => match self.template_for(employee) {
                        Ok(template) => Candidate {
                            employee,
                            score: self.score_employee(employee, month, template).total_score,
                            locked: None,
                        },
                        Err(skip) => {
                            skipped.push(skip);
                            continue;
                        }
                    },
                };
                by_department
                    .entry(employee.department_id.as_str())
                    .or_default()
                    .push(candidate);
            }

            let probation_date = month.first_day();
            let mut summaries = Vec::new();
            for (department, mut candidates) in by_department {
                candidates.sort_by(|a, b| {
                    b.score
                        .cmp(&a.score)
                        .then_with(|| a.employee.id.cmp(&b.employee.id))
                });
                for (position, candidate) in candidates.into_iter().enumerate() {
                    let summary = match candidate.locked {
                        Some(locked) => locked,
                        None => PerformanceSummary {
                            employee_id: candidate.employee.id.clone(),
                            month,
                            department_id: department.to_string(),
                            total_score: candidate.score,
                            performance_rating: rate_score(
                                candidate.score,
                                &self.rules.performance.ratings,
                            ),
                            department_rank: position as u32 + 1,
                            probation_status: candidate
                                .employee
                                .on_probation_at(probation_date)
                                .then(|| {
                                    probation_status(
                                        candidate.score,
                                        &self.rules.performance.probation,
                                    )
                                }),
                            is_locked: false,
                        },
                    };
                    summaries.push(summary);
                }
            }

            {
                let mut ledger = self.ledger();
                for skip in &skipped {
                    let key = (skip.employee_id.clone(), month);
                    if ledger.performance.get(&key).is_some_and(|s| !s.is_locked) {
                        ledger.performance.remove(&key);
                    }
                }
                for summary in summaries.iter().filter(|s| !s.is_locked) {
                    ledger
                        .performance
                        .insert((summary.employee_id.clone(), month), summary.clone());
                }
            }

            info!(
                month = %month,
                department_id = department_id.unwrap_or("ALL"),
                ranked = summaries.len(),
                locked = summaries.iter().filter(|s| s.is_locked).count(),
                skipped = skipped.len(),
                "Performance ranked"
            );

            Ok(RankingReport {
                month,
                department_id: department_id.map(str::to_string),
                summaries,
                skipped,
            })
        })
    }

    /// Flips the lock flag of a stored summary without recomputing it.
    pub fn toggle_lock(&self, employee_id: &str, month: Month) -> EngineResult<PerformanceSummary> {
        self.with_month_lock(month, || {
            let mut ledger = self.ledger();
            let summary = ledger
                .performance
                .get_mut(&(employee_id.to_string(), month))
                .ok_or_else(|| EngineError::NotFound {
                    entity: "PerformanceSummary",
                    id: format!("{}/{}", employee_id, month),
                })?;
            summary.is_locked = !summary.is_locked;
            info!(
                employee_id = %employee_id,
                month = %month,
                is_locked = summary.is_locked,
                "Performance lock toggled"
            );
            Ok(summary.clone())
        })
    }

    /// The stored performance summary of one employee for `month`.
    pub fn performance_summary(&self, employee_id: &str, month: Month) -> Option<PerformanceSummary> {
        self.ledger()
            .performance
            .get(&(employee_id.to_string(), month))
            .cloned()
    }
}
