//! Attendance-to-payroll settlement engine.
//!
//! This crate turns branch attendance uploads into monthly attendance
//! summaries, scores employees against their role's KPI template, ranks
//! them within departments and settles a monthly payroll run whose records
//! carry attendance deductions and progressive PAYE tax.
//!
//! The [`engine::SettlementEngine`] holds the mutable ledger; the
//! [`calculation`] module holds the pure functions it is built from, and
//! [`api`] exposes the engine over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
