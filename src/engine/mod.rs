//! The stateful settlement engine.
//!
//! [`SettlementEngine`] owns the ledger of attendance records, upload
//! statuses, monthly summaries, KPI entries, performance summaries and
//! payroll runs, and exposes the month-scoped operations over it:
//!
//! - branch uploads and the month readiness gate ([`upload_gate`])
//! - monthly attendance aggregation ([`aggregator`])
//! - KPI scoring and department ranking ([`performance`])
//! - the DRAFT to APPROVED payroll run lifecycle ([`payroll_run`])
//!
//! Every operation takes its month explicitly. Operations that change a
//! month's state hold that month's lock for their whole duration; the
//! per-employee computations in between are the pure functions of
//! [`crate::calculation`].
//!
//! # Example
//!
//! ```no_run
//! use settlement_engine::config::ConfigLoader;
//! use settlement_engine::engine::SettlementEngine;
//! use settlement_engine::models::Month;
//!
//! let engine = SettlementEngine::new(ConfigLoader::load("./config/default")?.into_config());
//! let month: Month = "2025-03".parse()?;
//! println!("ready: {}", engine.month_readiness(month).ready);
//! # Ok::<(), settlement_engine::error::EngineError>(())
//! ```

pub mod aggregator;
mod locks;
pub mod payroll_run;
pub mod performance;
pub mod upload_gate;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::config::{EngineConfig, EngineRules, TaxTable};
use crate::models::{
    AttendanceRecord, BranchUploadStatus, EmployeeKpiEntry, Month, MonthlyAttendanceSummary,
    PayrollRun, PerformanceSummary, ReferenceData,
};

use locks::{MonthLocks, acquire};

pub use aggregator::AttendanceReport;
pub use performance::RankingReport;
pub use upload_gate::{
    AttendanceCorrection, BranchReadiness, MonthReadiness, SupersededRecord, UploadReceipt,
};

/// Version stamped on every payroll run.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the engine stores, keyed the way it is looked up.
#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    /// At most one record per (employee, date).
    pub(crate) attendance: BTreeMap<(String, NaiveDate), AttendanceRecord>,
    /// At most one status per (month, branch).
    pub(crate) uploads: BTreeMap<(Month, String), BranchUploadStatus>,
    pub(crate) attendance_summaries: BTreeMap<(String, Month), MonthlyAttendanceSummary>,
    /// Keyed by (employee, template item, month).
    pub(crate) kpi_entries: BTreeMap<(String, String, Month), EmployeeKpiEntry>,
    pub(crate) performance: BTreeMap<(String, Month), PerformanceSummary>,
    /// At most one run per month.
    pub(crate) payroll_runs: BTreeMap<Month, PayrollRun>,
}

/// The attendance-to-payroll settlement engine.
///
/// Safe to share between threads (for example behind an `Arc` in the HTTP
/// adapter). Reference data and rules are fixed at construction.
#[derive(Debug)]
pub struct SettlementEngine {
    rules: EngineRules,
    tax: TaxTable,
    reference: ReferenceData,
    ledger: Mutex<LedgerState>,
    month_locks: MonthLocks,
}

impl SettlementEngine {
    /// Creates an engine with an empty ledger.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            rules: config.rules,
            tax: config.tax,
            reference: config.reference,
            ledger: Mutex::new(LedgerState::default()),
            month_locks: MonthLocks::default(),
        }
    }

    /// Attendance, discipline and performance thresholds.
    pub fn rules(&self) -> &EngineRules {
        &self.rules
    }

    /// The tax bracket table.
    pub fn tax_table(&self) -> &TaxTable {
        &self.tax
    }

    /// Read-only organisation data.
    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    fn ledger(&self) -> MutexGuard<'_, LedgerState> {
        acquire(&self.ledger)
    }

    /// Runs `f` while holding `month`'s lock.
    fn with_month_lock<T>(&self, month: Month, f: impl FnOnce() -> T) -> T {
        let handle = self.month_locks.handle(month);
        let _guard = acquire(&handle);
        f()
    }
}

#[cfg(test)]
impl SettlementEngine {
    /// Lets tests outside the engine hold a month lock.
    pub(crate) fn month_lock_handle(&self, month: Month) -> std::sync::Arc<std::sync::Mutex<()>> {
        self.month_locks.handle(month)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for the engine tests.

    use chrono::{Datelike, NaiveDate, NaiveTime};
    use rust_decimal::Decimal;

    use super::SettlementEngine;
    use crate::config::EngineConfig;
    use crate::models::{
        AttendanceEntry, Branch, Department, Employee, EmploymentStatus, JobRole, KpiTemplate,
        KpiTemplateItem, Month, OrganizationData, ReferenceData, SalaryStructure, ShiftPolicy,
        WorkDaysType,
    };

    pub(crate) fn march() -> Month {
        Month::new(2025, 3).unwrap()
    }

    pub(crate) fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    pub(crate) fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn employee(id: &str, dept: &str, branch: &str, role: Option<&str>) -> Employee {
        Employee {
            id: id.to_string(),
            full_name: format!("Employee {}", id),
            department_id: dept.to_string(),
            branch_id: branch.to_string(),
            job_role_id: role.map(str::to_string),
            employment_status: EmploymentStatus::Active,
            probation_end_date: None,
        }
    }

    /// Two branches, one department, a cashier role with a 09:00-17:00
    /// Monday-to-Friday shift, a salary structure and a 60/40 KPI template.
    ///
    /// - `E1`, `E2` at branch `B1`; `E3` at `B2`, all cashiers.
    /// - `E4` at `B2` has no job role.
    pub(crate) fn organization() -> OrganizationData {
        OrganizationData {
            branches: vec![
                Branch { id: "B1".to_string(), name: "Ogbomosho".to_string(), location: None, is_active: true },
                Branch { id: "B2".to_string(), name: "Osogbo".to_string(), location: None, is_active: true },
            ],
            departments: vec![Department { id: "D1".to_string(), name: "Operations".to_string() }],
            job_roles: vec![JobRole {
                id: "R1".to_string(),
                name: "Cashier".to_string(),
                department_id: "D1".to_string(),
                shift_policy: Some(ShiftPolicy::new(time(9, 0), time(17, 0), WorkDaysType::MonFri).unwrap()),
            }],
            employees: vec![
                employee("E1", "D1", "B1", Some("R1")),
                employee("E2", "D1", "B1", Some("R1")),
                employee("E3", "D1", "B2", Some("R1")),
                employee("E4", "D1", "B2", None),
            ],
            salary_structures: vec![SalaryStructure {
                job_role_id: "R1".to_string(),
                basic_salary: Decimal::new(200_000, 0),
                housing_allowance: Decimal::new(20_000, 0),
                transport_allowance: Decimal::new(15_000, 0),
                medical_allowance: Decimal::new(5_000, 0),
                utility_allowance: Decimal::new(5_000, 0),
                other_allowances: Decimal::new(5_000, 0),
                late_deduction_rate: Decimal::new(500, 0),
                absent_deduction_rate: Decimal::new(1000, 0),
            }],
            kpi_templates: vec![KpiTemplate {
                id: "T1".to_string(),
                job_role_id: "R1".to_string(),
                name: "Cashier Scorecard".to_string(),
                is_active: true,
                items: vec![
                    KpiTemplateItem {
                        id: "K1".to_string(),
                        kpi_name: "Cash Accuracy".to_string(),
                        weight_points: Decimal::new(60, 0),
                        is_active: true,
                    },
                    KpiTemplateItem {
                        id: "K2".to_string(),
                        kpi_name: "Customer Service".to_string(),
                        weight_points: Decimal::new(40, 0),
                        is_active: true,
                    },
                ],
            }],
        }
    }

    pub(crate) fn engine_with(data: OrganizationData) -> SettlementEngine {
        SettlementEngine::new(EngineConfig {
            reference: ReferenceData::new(data).unwrap(),
            ..EngineConfig::default()
        })
    }

    pub(crate) fn engine() -> SettlementEngine {
        engine_with(organization())
    }

    /// A check-in at `check_in` for every weekday of March 2025.
    pub(crate) fn weekday_entries(employee_id: &str, check_in: NaiveTime) -> Vec<AttendanceEntry> {
        march()
            .days()
            .filter(|d| d.weekday().number_from_monday() <= 5)
            .map(|d| AttendanceEntry {
                employee_id: employee_id.to_string(),
                date: d,
                check_in: Some(check_in),
                check_out: Some(time(17, 0)),
            })
            .collect()
    }

    /// Uploads an on-time month for every employee of both branches.
    pub(crate) fn upload_all(engine: &SettlementEngine) {
        let mut b1 = weekday_entries("E1", time(8, 55));
        b1.extend(weekday_entries("E2", time(8, 55)));
        engine.record_upload("B1", march(), "b1.csv", b1).unwrap();
        let mut b2 = weekday_entries("E3", time(8, 55));
        b2.extend(weekday_entries("E4", time(8, 55)));
        engine.record_upload("B2", march(), "b2.csv", b2).unwrap();
    }
}
