//! The payroll run lifecycle: DRAFT, then APPROVED.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::compute_payroll_record;
use crate::error::{EngineError, EngineResult};
use crate::models::{MonthlyAttendanceSummary, Month, PayrollRun, PayrollStatus, SkippedEmployee};

use super::{ENGINE_VERSION, SettlementEngine};

impl SettlementEngine {
    /// Computes the payroll run of `month`.
    ///
    /// Creates a DRAFT run if none exists, or fully replaces the records of
    /// an existing DRAFT run (keeping its id and creation time). Fails with
    /// [`EngineError::InvalidState`] if the month's run is already APPROVED.
    ///
    /// Unless `force_replace` is set, every active branch must have uploaded
    /// attendance for the month. Employees without a job role or salary
    /// structure are skipped and listed on the run; employees without an
    /// attendance summary are paid without attendance deductions and their
    /// record carries a warning.
    pub fn process_payroll(&self, month: Month, force_replace: bool) -> EngineResult<PayrollRun> {
        self.with_month_lock(month, || {
            let start_time = Instant::now();

            let existing = self.ledger().payroll_runs.get(&month).cloned();
            if let Some(run) = existing.as_ref().filter(|r| r.is_approved()) {
                warn!(month = %month, run_id = %run.id, "Reprocessing of approved payroll rejected");
                return Err(EngineError::invalid_state(format!(
                    "payroll run {} for {} is approved and cannot be reprocessed",
                    run.id, month
                )));
            }

            if !force_replace {
                let pending = self.pending_branches(month);
                if !pending.is_empty() {
                    warn!(month = %month, pending = ?pending, "Payroll processing blocked");
                    return Err(EngineError::invalid_state(format!(
                        "attendance for {} is not ready; pending branches: {}",
                        month,
                        pending.join(", ")
                    )));
                }
            }

            let summaries: HashMap<String, MonthlyAttendanceSummary> = self
                .ledger()
                .attendance_summaries
                .iter()
                .filter(|((_, summary_month), _)| *summary_month == month)
                .map(|((employee_id, _), summary)| (employee_id.clone(), summary.clone()))
                .collect();
            let mut records = Vec::new();
            let mut skipped = Vec::new();
            for employee in self.reference.active_employees() {
                let Some(role_id) = employee.job_role_id.as_deref() else {
                    skipped.push(SkippedEmployee::new(
                        &employee.id,
                        "MISSING_JOB_ROLE",
                        "no job role assigned",
                    ));
                    continue;
                };
                let Some(salary) = self.reference.salary_structure(role_id) else {
                    skipped.push(SkippedEmployee::new(
                        &employee.id,
                        "MISSING_SALARY_STRUCTURE",
                        format!("job role '{}' has no salary structure", role_id),
                    ));
                    continue;
                };
                let summary = summaries.get(&employee.id);
                let record = compute_payroll_record(employee, salary, summary, &self.tax);
                debug!(
                    employee_id = %employee.id,
                    month = %month,
                    gross = %record.gross_salary,
                    tax = %record.tax_deduction,
                    net = %record.net_salary,
                    "Payroll record computed"
                );
                records.push(record);
            }

            for skip in &skipped {
                warn!(
                    employee_id = %skip.employee_id,
                    month = %month,
                    code = %skip.code,
                    reason = %skip.reason,
                    "Employee skipped in payroll"
                );
            }

            let now = Utc::now();
            let (id, created_at) = existing
                .map(|r| (r.id, r.created_at))
                .unwrap_or_else(|| (Uuid::new_v4(), now));
            let run = PayrollRun {
                id,
                month,
                status: PayrollStatus::Draft,
                records,
                skipped,
                engine_version: ENGINE_VERSION.to_string(),
                created_at,
                processed_at: now,
                approved_at: None,
            };
            self.ledger().payroll_runs.insert(month, run.clone());

            let totals = run.totals();
            info!(
                month = %month,
                run_id = %run.id,
                headcount = totals.headcount,
                skipped = run.skipped.len(),
                gross = %totals.gross,
                net = %totals.net,
                forced = force_replace,
                duration_us = start_time.elapsed().as_micros(),
                "Payroll processed"
            );
            Ok(run)
        })
    }

    /// Approves a DRAFT run. Fails with [`EngineError::InvalidState`] for a
    /// run that is not DRAFT and with [`EngineError::NotFound`] for an
    /// unknown id.
    pub fn approve_payroll(&self, run_id: Uuid) -> EngineResult<PayrollRun> {
        let month = self
            .payroll_run_by_id(run_id)
            .map(|r| r.month)
            .ok_or_else(|| EngineError::NotFound {
                entity: "PayrollRun",
                id: run_id.to_string(),
            })?;

        self.with_month_lock(month, || {
            let mut ledger = self.ledger();
            let run = ledger
                .payroll_runs
                .get_mut(&month)
                .filter(|r| r.id == run_id)
                .ok_or_else(|| EngineError::NotFound {
                    entity: "PayrollRun",
                    id: run_id.to_string(),
                })?;
            if run.status != PayrollStatus::Draft {
                warn!(run_id = %run_id, month = %month, status = ?run.status, "Approval rejected");
                return Err(EngineError::invalid_state(format!(
                    "payroll run {} for {} is {:?}, only DRAFT runs can be approved",
                    run_id, month, run.status
                )));
            }
            run.status = PayrollStatus::Approved;
            run.approved_at = Some(Utc::now());
            info!(run_id = %run_id, month = %month, headcount = run.records.len(), "Payroll approved");
            Ok(run.clone())
        })
    }

    /// The payroll run of `month`, if one exists.
    pub fn payroll_run(&self, month: Month) -> Option<PayrollRun> {
        self.ledger().payroll_runs.get(&month).cloned()
    }

    /// Looks up a payroll run by id.
    pub fn payroll_run_by_id(&self, run_id: Uuid) -> Option<PayrollRun> {
        self.ledger()
            .payroll_runs
            .values()
            .find(|r| r.id == run_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;
    use std::thread;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// RUN-001: a new month gets a DRAFT run with one record per payable employee
    #[test]
    fn test_process_creates_draft() {
        let engine = engine();
        upload_all(&engine);
        engine.process_month(march(), None).unwrap();
        let run = engine.process_payroll(march(), false).unwrap();
        assert_eq!(run.status, PayrollStatus::Draft);
        assert_eq!(run.records.len(), 3);
        assert_eq!(run.skipped.len(), 1);
        assert_eq!(run.skipped[0].code, "MISSING_JOB_ROLE");
        assert_eq!(run.records[0].gross_salary, dec("250000"));
        assert_eq!(run.records[0].tax_deduction, dec("29166.67"));
        assert_eq!(run.engine_version, ENGINE_VERSION);
        assert_eq!(engine.payroll_run(march()), Some(run));
    }

    /// RUN-002: processing requires readiness unless forced
    #[test]
    fn test_gate_and_force() {
        let engine = engine();
        engine.record_upload("B1", march(), "b1.csv", weekday_entries("E1", time(9, 0))).unwrap();
        let result = engine.process_payroll(march(), false);
        assert!(matches!(result, Err(EngineError::InvalidState { .. })));
        let run = engine.process_payroll(march(), true).unwrap();
        // nobody has a summary yet
        assert!(run.records.iter().all(|r| r.warnings.iter().any(|w| w.code == "MISSING_ATTENDANCE_SUMMARY")));
    }

    /// RUN-003: reprocessing a DRAFT replaces its records and keeps its id
    #[test]
    fn test_reprocess_draft_replaces() {
        let engine = engine();
        upload_all(&engine);
        let first = engine.process_payroll(march(), false).unwrap();
        engine.process_month(march(), None).unwrap();
        let second = engine.process_payroll(march(), false).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.records.len(), first.records.len());
        assert!(second.records.iter().all(|r| r.warnings.is_empty()));
    }

    /// RUN-004: approve transitions DRAFT to APPROVED exactly once
    #[test]
    fn test_approve_once() {
        let engine = engine();
        upload_all(&engine);
        let run = engine.process_payroll(march(), false).unwrap();
        let approved = engine.approve_payroll(run.id).unwrap();
        assert_eq!(approved.status, PayrollStatus::Approved);
        assert!(approved.approved_at.is_some());
        assert_eq!(approved.records, run.records);

        let again = engine.approve_payroll(run.id);
        assert!(matches!(again, Err(EngineError::InvalidState { .. })));
    }

    /// RUN-005: an approved month cannot be reprocessed, even when forced
    #[test]
    fn test_approved_rejects_reprocess() {
        let engine = engine();
        upload_all(&engine);
        let run = engine.process_payroll(march(), false).unwrap();
        engine.approve_payroll(run.id).unwrap();
        assert!(matches!(
            engine.process_payroll(march(), false),
            Err(EngineError::InvalidState { .. })
        ));
        assert!(matches!(
            engine.process_payroll(march(), true),
            Err(EngineError::InvalidState { .. })
        ));
        assert_eq!(engine.payroll_run(march()).unwrap().status, PayrollStatus::Approved);
    }

    /// RUN-006: unknown run id
    #[test]
    fn test_approve_unknown_run() {
        let engine = engine();
        let result = engine.approve_payroll(Uuid::new_v4());
        assert!(matches!(result, Err(EngineError::NotFound { entity: "PayrollRun", .. })));
    }

    /// RUN-007: attendance deductions flow into the records
    #[test]
    fn test_deductions_applied() {
        let engine = engine();
        engine.record_upload("B1", march(), "b1.csv", weekday_entries("E1", time(9, 40))).unwrap();
        engine.record_upload("B2", march(), "b2.csv", vec![]).unwrap();
        engine.process_month(march(), None).unwrap();
        let run = engine.process_payroll(march(), false).unwrap();
        let e1 = run.records.iter().find(|r| r.employee_id == "E1").unwrap();
        assert_eq!(e1.late_deductions, dec("10500"));
        assert_eq!(e1.absent_deductions, Decimal::ZERO);
        assert_eq!(e1.net_salary, dec("250000") - dec("10500") - dec("29166.67"));
        let totals = run.totals();
        assert_eq!(totals.headcount, 3);
    }

    /// RUN-009: summaries of other months do not reach the run
    #[test]
    fn test_other_month_summaries_ignored() {
        let engine = engine();
        engine.record_upload("B1", march(), "b1.csv", weekday_entries("E1", time(9, 40))).unwrap();
        engine.record_upload("B2", march(), "b2.csv", vec![]).unwrap();
        engine.process_month(march(), None).unwrap();
        {
            let mut ledger = engine.ledger();
            let mut summary = ledger.attendance_summaries[&("E1".to_string(), march())].clone();
            summary.month = march().next();
            ledger.attendance_summaries.insert(("E1".to_string(), march().next()), summary);
            ledger.attendance_summaries.remove(&("E1".to_string(), march()));
        }
        let run = engine.process_payroll(march(), false).unwrap();
        let e1 = run.records.iter().find(|r| r.employee_id == "E1").unwrap();
        assert_eq!(e1.late_deductions, Decimal::ZERO);
        assert_eq!(e1.absent_deductions, Decimal::ZERO);
    }

    /// RUN-008: concurrent approvals of one run succeed exactly once
    #[test]
    fn test_concurrent_approvals() {
        let engine = Arc::new(engine());
        upload_all(&engine);
        let run_id = engine.process_payroll(march(), false).unwrap().id;
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || engine.approve_payroll(run_id).is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
    }
}
