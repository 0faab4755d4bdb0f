//! Branch uploads, manual entries and the month readiness gate.
//!
//! Each (month, branch) pair has at most one [`BranchUploadStatus`]. An
//! upload replaces the branch's previously uploaded records for the month
//! in one step; manual entries are never overwritten by an upload.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceEntry, AttendanceRecord, AttendanceSource, BranchUploadStatus, Employee, Month,
};

use super::SettlementEngine;

/// An uploaded row that was not stored because a manual record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupersededRecord {
    /// The employee.
    pub employee_id: String,
    /// The date of the manual record that was kept.
    pub date: NaiveDate,
}

/// Outcome of a successful branch upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    /// The branch's status after the upload.
    pub status: BranchUploadStatus,
    /// Rows stored from this batch.
    pub accepted: usize,
    /// Previously uploaded rows of this branch and month that were removed.
    pub replaced: usize,
    /// Rows skipped in favour of existing manual records.
    pub superseded: Vec<SupersededRecord>,
}

/// Upload state of one branch for a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchReadiness {
    /// The branch.
    pub branch_id: String,
    /// Display name.
    pub branch_name: String,
    /// True once a batch has been ingested.
    pub is_uploaded: bool,
    /// Source file of the current batch.
    pub file_name: Option<String>,
    /// When the current batch was ingested.
    pub uploaded_at: Option<DateTime<Utc>>,
    /// Rows in the current batch.
    pub record_count: usize,
}

/// Upload state of every active branch for a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthReadiness {
    /// The month.
    pub month: Month,
    /// True when every active branch has uploaded.
    pub ready: bool,
    /// One entry per active branch, ordered by branch id.
    pub branches: Vec<BranchReadiness>,
    /// Ids of the branches still to upload.
    pub pending: Vec<String>,
}

/// Outcome of an explicit attendance correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceCorrection {
    /// The record now stored.
    pub record: AttendanceRecord,
    /// The record it replaced, if there was one.
    pub replaced: Option<AttendanceRecord>,
    /// Why the correction was made.
    pub reason: String,
}

impl SettlementEngine {
    /// Ingests a branch's normalized attendance batch for a month.
    ///
    /// The whole batch is validated first; any problem rejects it with a
    /// [`EngineError::Validation`] listing every offending row, and nothing
    /// changes. Checked per row: a non-empty employee id, a date inside
    /// `month`, a known employee assigned to `branch_id`, and no second row
    /// for the same (employee, date).
    ///
    /// On success the branch's uploaded records for the month are replaced
    /// by the batch and its status is set to uploaded. Rows that collide
    /// with a manual record are skipped and listed in the receipt.
    pub fn record_upload(
        &self,
        branch_id: &str,
        month: Month,
        file_name: &str,
        batch: Vec<AttendanceEntry>,
    ) -> EngineResult<UploadReceipt> {
        if self.reference.branch(branch_id).is_none() {
            return Err(EngineError::NotFound {
                entity: "Branch",
                id: branch_id.to_string(),
            });
        }
        self.validate_batch(branch_id, month, &batch)?;

        self.with_month_lock(month, || {
            let mut ledger = self.ledger();

            let before = ledger.attendance.len();
            ledger.attendance.retain(|_, r| {
                !(r.source == AttendanceSource::Upload
                    && r.branch_id == branch_id
                    && month.contains(r.date))
            });
            let replaced = before - ledger.attendance.len();

            let mut accepted = 0;
            let mut superseded = Vec::new();
            for entry in batch {
                let key = (entry.employee_id.clone(), entry.date);
                if ledger
                    .attendance
                    .get(&key)
                    .is_some_and(|r| r.source == AttendanceSource::Manual)
                {
                    superseded.push(SupersededRecord {
                        employee_id: entry.employee_id,
                        date: entry.date,
                    });
                    continue;
                }
                ledger.attendance.insert(
                    key,
                    AttendanceRecord::from_entry(entry, branch_id, AttendanceSource::Upload),
                );
                accepted += 1;
            }

            let status = BranchUploadStatus {
                branch_id: branch_id.to_string(),
                month,
                is_uploaded: true,
                file_name: file_name.to_string(),
                uploaded_at: Utc::now(),
                record_count: accepted,
            };
            ledger
                .uploads
                .insert((month, branch_id.to_string()), status.clone());

            info!(
                branch_id = %branch_id,
                month = %month,
                file_name = %file_name,
                accepted,
                replaced,
                superseded = superseded.len(),
                "Attendance upload recorded"
            );

            Ok(UploadReceipt {
                status,
                accepted,
                replaced,
                superseded,
            })
        })
    }

    fn validate_batch(
        &self,
        branch_id: &str,
        month: Month,
        batch: &[AttendanceEntry],
    ) -> EngineResult<()> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();

        for (row, entry) in batch.iter().enumerate() {
            let row = row + 1;
            if entry.employee_id.trim().is_empty() {
                problems.push(format!("row {}: employee id is empty", row));
                continue;
            }
            if !month.contains(entry.date) {
                problems.push(format!(
                    "row {}: date {} is outside {}",
                    row, entry.date, month
                ));
            }
            match self.reference.employee(&entry.employee_id) {
                None => problems.push(format!(
                    "row {}: unknown employee '{}'",
                    row, entry.employee_id
                )),
                Some(employee) if employee.branch_id != branch_id => problems.push(format!(
                    "row {}: employee '{}' is assigned to branch '{}', not '{}'",
                    row, entry.employee_id, employee.branch_id, branch_id
                )),
                Some(_) => {}
            }
            if !seen.insert((entry.employee_id.as_str(), entry.date)) {
                problems.push(format!(
                    "row {}: duplicate record for employee '{}' on {}",
                    row, entry.employee_id, entry.date
                ));
            }
        }

        if problems.is_empty() {
            return Ok(());
        }
        warn!(
            branch_id = %branch_id,
            month = %month,
            rejected = problems.len(),
            "Attendance upload rejected"
        );
        Err(EngineError::Validation {
            message: format!(
                "{} attendance row(s) rejected for branch '{}' in {}",
                problems.len(),
                branch_id,
                month
            ),
            details: problems,
        })
    }

    /// Returns true iff every branch in `branches` has uploaded for `month`.
    pub fn is_month_ready(&self, month: Month, branches: &[String]) -> bool {
        let ledger = self.ledger();
        branches.iter().all(|b| {
            ledger
                .uploads
                .get(&(month, b.clone()))
                .is_some_and(|s| s.is_uploaded)
        })
    }

    /// Active branches that have not uploaded for `month`.
    pub fn pending_branches(&self, month: Month) -> Vec<String> {
        let ledger = self.ledger();
        self.reference
            .active_branch_ids()
            .into_iter()
            .filter(|b| {
                !ledger
                    .uploads
                    .get(&(month, b.clone()))
                    .is_some_and(|s| s.is_uploaded)
            })
            .collect()
    }

    /// Upload state of every active branch for `month`.
    pub fn month_readiness(&self, month: Month) -> MonthReadiness {
        let ledger = self.ledger();
        let branches: Vec<BranchReadiness> = self
            .reference
            .active_branch_ids()
            .into_iter()
            .map(|id| {
                let name = self
                    .reference
                    .branch(&id)
                    .map(|b| b.name.clone())
                    .unwrap_or_default();
                match ledger.uploads.get(&(month, id.clone())) {
                    Some(status) => BranchReadiness {
                        branch_id: id,
                        branch_name: name,
                        is_uploaded: status.is_uploaded,
                        file_name: Some(status.file_name.clone()),
                        uploaded_at: Some(status.uploaded_at),
                        record_count: status.record_count,
                    },
                    None => BranchReadiness {
                        branch_id: id,
                        branch_name: name,
                        is_uploaded: false,
                        file_name: None,
                        uploaded_at: None,
                        record_count: 0,
                    },
                }
            })
            .collect();
        let pending: Vec<String> = branches
            .iter()
            .filter(|b| !b.is_uploaded)
            .map(|b| b.branch_id.clone())
            .collect();

        MonthReadiness {
            month,
            ready: pending.is_empty(),
            branches,
            pending,
        }
    }

    /// Removes a branch's uploaded records for `month` and marks the branch
    /// as not uploaded. Manual records are kept.
    pub fn clear_upload(&self, branch_id: &str, month: Month) -> EngineResult<BranchUploadStatus> {
        self.with_month_lock(month, || {
            let mut guard = self.ledger();
            let ledger = &mut *guard;
            let status = ledger
                .uploads
                .get_mut(&(month, branch_id.to_string()))
                .ok_or_else(|| EngineError::NotFound {
                    entity: "Upload",
                    id: format!("{}/{}", branch_id, month),
                })?;

            let before = ledger.attendance.len();
            ledger.attendance.retain(|_, r| {
                !(r.source == AttendanceSource::Upload
                    && r.branch_id == branch_id
                    && month.contains(r.date))
            });
            let removed = before - ledger.attendance.len();

            status.is_uploaded = false;
            status.record_count = 0;
            status.uploaded_at = Utc::now();
            let status = status.clone();

            info!(branch_id = %branch_id, month = %month, removed, "Attendance upload cleared");
            Ok(status)
        })
    }

    /// Records a manual attendance entry.
    ///
    /// Fails with [`EngineError::InvalidState`] if a record already exists
    /// for the employee and date; use
    /// [`correct_attendance`](Self::correct_attendance) to overwrite one.
    pub fn record_manual_entry(&self, entry: AttendanceEntry) -> EngineResult<AttendanceRecord> {
        let employee = self.manual_entry_employee(&entry)?;
        let month = Month::of(entry.date);

        self.with_month_lock(month, || {
            let mut ledger = self.ledger();
            let key = (entry.employee_id.clone(), entry.date);
            if let Some(existing) = ledger.attendance.get(&key) {
                warn!(
                    employee_id = %entry.employee_id,
                    date = %entry.date,
                    "Manual entry rejected: record exists"
                );
                return Err(EngineError::invalid_state(format!(
                    "attendance for employee '{}' on {} already exists ({:?}); submit a correction to replace it",
                    entry.employee_id, entry.date, existing.source
                )));
            }
            let record =
                AttendanceRecord::from_entry(entry, &employee.branch_id, AttendanceSource::Manual);
            ledger.attendance.insert(key, record.clone());
            info!(employee_id = %record.employee_id, date = %record.date, "Manual attendance recorded");
            Ok(record)
        })
    }

    /// Stores a manual record for the employee and date, replacing whatever
    /// was there. The replaced record, if any, is returned.
    pub fn correct_attendance(
        &self,
        entry: AttendanceEntry,
        reason: &str,
    ) -> EngineResult<AttendanceCorrection> {
        if reason.trim().is_empty() {
            return Err(EngineError::validation("a correction requires a reason"));
        }
        let employee = self.manual_entry_employee(&entry)?;
        let month = Month::of(entry.date);

        self.with_month_lock(month, || {
            let mut ledger = self.ledger();
            let key = (entry.employee_id.clone(), entry.date);
            let record =
                AttendanceRecord::from_entry(entry, &employee.branch_id, AttendanceSource::Manual);
            let replaced = ledger.attendance.insert(key, record.clone());
            info!(
                employee_id = %record.employee_id,
                date = %record.date,
                replaced = replaced.is_some(),
                reason = %reason,
                "Attendance corrected"
            );
            Ok(AttendanceCorrection {
                record,
                replaced,
                reason: reason.to_string(),
            })
        })
    }

    fn manual_entry_employee(&self, entry: &AttendanceEntry) -> EngineResult<&Employee> {
        if entry.employee_id.trim().is_empty() {
            return Err(EngineError::validation("employee id is empty"));
        }
        self.reference
            .employee(&entry.employee_id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "Employee",
                id: entry.employee_id.clone(),
            })
    }

    /// The stored records of one employee for `month`, in date order.
    pub fn attendance_records(&self, employee_id: &str, month: Month) -> Vec<AttendanceRecord> {
        let ledger = self.ledger();
        ledger
            .attendance
            .range((employee_id.to_string(), month.first_day())..=(employee_id.to_string(), month.last_day()))
            .map(|(_, r)| r.clone())
            .collect()
    }
}
