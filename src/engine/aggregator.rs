//! Monthly attendance aggregation.

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calculation::summarize_month;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, Month, MonthlyAttendanceSummary, SkippedEmployee};

use super::SettlementEngine;

/// Result of one attendance processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceReport {
    /// The month processed.
    pub month: Month,
    /// The branch processed, or `None` for all branches.
    pub branch_id: Option<String>,
    /// One summary per processed employee, ordered by employee id.
    pub summaries: Vec<MonthlyAttendanceSummary>,
    /// Employees in scope that could not be processed.
    pub skipped: Vec<SkippedEmployee>,
}

impl SettlementEngine {
    /// Recomputes the monthly attendance summaries of the employees in scope.
    ///
    /// Without a branch filter every active employee is in scope and the
    /// month must be ready: if any active branch has not uploaded, the call
    /// fails with [`EngineError::InvalidState`] naming the pending branches.
    /// With a filter only that branch's active employees are processed and
    /// the readiness gate is bypassed.
    ///
    /// Each summary is rebuilt from the stored records and replaces the
    /// previous one, so repeated runs over unchanged data give identical
    /// summaries. Employees without a job role, shift policy or salary
    /// structure are skipped and reported; their stale summaries are
    /// removed.
    pub fn process_month(
        &self,
        month: Month,
        branch_filter: Option<&str>,
    ) -> EngineResult<AttendanceReport> {
        if let Some(branch_id) = branch_filter {
            if self.reference.branch(branch_id).is_none() {
                return Err(EngineError::NotFound {
                    entity: "Branch",
                    id: branch_id.to_string(),
                });
            }
        }

        self.with_month_lock(month, || {
            let start_time = Instant::now();

            // the readiness check and the summaries share one month lock
            if branch_filter.is_none() {
                let pending = self.pending_branches(month);
                if !pending.is_empty() {
                    warn!(month = %month, pending = ?pending, "Attendance processing blocked");
                    return Err(EngineError::invalid_state(format!(
                        "attendance for {} is not ready; pending branches: {}",
                        month,
                        pending.join(", ")
                    )));
                }
            }

            let mut records_by_employee: HashMap<String, Vec<AttendanceRecord>> = HashMap::new();
            for record in self
                .ledger()
                .attendance
                .values()
                .filter(|r| month.contains(r.date))
            {
                records_by_employee
                    .entry(record.employee_id.clone())
                    .or_default()
                    .push(record.clone());
            }

            let mut summaries = Vec::new();
            let mut skipped = Vec::new();
            for employee in self
                .reference
                .active_employees()
                .filter(|e| branch_filter.is_none_or(|b| e.branch_id == b))
            {
                let Some(role) = employee
                    .job_role_id
                    .as_deref()
                    .and_then(|id| self.reference.job_role(id))
                else {
                    skipped.push(SkippedEmployee::new(
                        &employee.id,
                        "MISSING_JOB_ROLE",
                        "no job role assigned",
                    ));
                    continue;
                };
                let Some(policy) = role.shift_policy.as_ref() else {
                    skipped.push(SkippedEmployee::new(
                        &employee.id,
                        "MISSING_SHIFT_POLICY",
                        format!("job role '{}' has no shift policy", role.id),
                    ));
                    continue;
                };
                let Some(salary) = self.reference.salary_structure(&role.id) else {
                    skipped.push(SkippedEmployee::new(
                        &employee.id,
                        "MISSING_SALARY_STRUCTURE",
                        format!("job role '{}' has no salary structure", role.id),
                    ));
                    continue;
                };

                let records = records_by_employee
                    .get(&employee.id)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let summary = summarize_month(
                    &employee.id,
                    month,
                    records,
                    policy,
                    salary,
                    &self.rules.attendance,
                    &self.rules.discipline,
                );
                debug!(
                    employee_id = %employee.id,
                    month = %month,
                    late_days = summary.total_late_days,
                    absent_days = summary.absent_days,
                    queries = summary.total_query,
                    deduction = %summary.salary_deduction_amount,
                    "Attendance summarised"
                );
                summaries.push(summary);
            }

            {
                let mut ledger = self.ledger();
                for skip in &skipped {
                    ledger
                        .attendance_summaries
                        .remove(&(skip.employee_id.clone(), month));
                }
                for summary in &summaries {
                    ledger
                        .attendance_summaries
                        .insert((summary.employee_id.clone(), month), summary.clone());
                }
            }

            for skip in &skipped {
                warn!(
                    employee_id = %skip.employee_id,
                    month = %month,
                    code = %skip.code,
                    reason = %skip.reason,
                    "Employee skipped in attendance processing"
                );
            }
            info!(
                month = %month,
                branch_id = branch_filter.unwrap_or("ALL"),
                processed = summaries.len(),
                skipped = skipped.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Attendance month processed"
            );

            Ok(AttendanceReport {
                month,
                branch_id: branch_filter.map(str::to_string),
                summaries,
                skipped,
            })
        })
    }

    /// The stored attendance summary of one employee for `month`.
    pub fn attendance_summary(
        &self,
        employee_id: &str,
        month: Month,
    ) -> Option<MonthlyAttendanceSummary> {
        self.ledger()
            .attendance_summaries
            .get(&(employee_id.to_string(), month))
            .cloned()
    }
}
