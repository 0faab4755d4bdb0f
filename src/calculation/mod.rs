//! Calculation logic for the Settlement Engine.
//!
//! Every function here is pure: work-day calendars, single-day attendance
//! classification, monthly attendance summaries with the QUERY rule and
//! deductions, weighted KPI scoring, rating and probation mapping,
//! progressive tax and the payroll record itself. State and ordering live in
//! [`crate::engine`].

mod attendance_classifier;
mod attendance_summary;
mod kpi_score;
mod payroll_record;
mod rating;
mod tax;
mod work_calendar;

pub use attendance_classifier::{check_in_delay_minutes, classify_day};
pub use attendance_summary::{disciplinary_action, query_trigger_dates, summarize_month};
pub use kpi_score::{
    DEFAULT_ACTUAL_POINTS, DEFAULT_TARGET_POINTS, EXPECTED_WEIGHT_TOTAL, JoinedKpiItem,
    MAX_KPI_POINTS, MIN_NONZERO_TARGET_POINTS, item_contribution, join_entries_with_defaults,
    score_template,
};
pub use payroll_record::compute_payroll_record;
pub use rating::{probation_status, rate_score};
pub use tax::{TaxBandCharge, TaxComputation, compute_monthly_tax};
pub use work_calendar::{ROTATION_CYCLE_DAYS, ROTATION_ON_DAYS, is_scheduled_day, scheduled_days_in};
