//! Net salary computation for one employee and month.
//!
//! Combines a salary structure, the month's attendance summary and the tax
//! table into a [`PayrollRecord`] with an audit trail.

use rust_decimal::Decimal;

use crate::config::TaxTable;
use crate::models::{
    AuditStep, AuditWarning, Employee, MonthlyAttendanceSummary, PayrollRecord, SalaryStructure,
    WarningSeverity,
};

use super::compute_monthly_tax;

/// Computes one payroll record.
///
/// - Gross is the basic salary plus the five allowances.
/// - Late and absent deductions are copied from the attendance summary's
///   cause components, so together they equal its
///   `salary_deduction_amount`. Without a summary both are zero and the
///   record carries a `MISSING_ATTENDANCE_SUMMARY` warning.
/// - Tax is charged on the full gross via [`compute_monthly_tax`].
/// - Net is gross minus late, absent and tax deductions. A negative net is
///   kept as computed and flagged with a `NEGATIVE_NET_SALARY` warning.
///
/// The result depends only on the arguments.
///
/// # Examples
///
/// ```
/// use settlement_engine::calculation::compute_payroll_record;
/// use settlement_engine::config::TaxTable;
/// use settlement_engine::models::{Employee, EmploymentStatus, SalaryStructure};
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "EMP-001".to_string(),
///     full_name: "Adebayo Ogunleye".to_string(),
///     department_id: "dept_ops".to_string(),
///     branch_id: "br_ogb".to_string(),
///     job_role_id: Some("role_cashier".to_string()),
///     employment_status: EmploymentStatus::Active,
///     probation_end_date: None,
/// };
/// let salary = SalaryStructure {
///     job_role_id: "role_cashier".to_string(),
///     basic_salary: Decimal::new(60_000, 0),
///     housing_allowance: Decimal::ZERO,
///     transport_allowance: Decimal::ZERO,
///     medical_allowance: Decimal::ZERO,
///     utility_allowance: Decimal::ZERO,
///     other_allowances: Decimal::ZERO,
///     late_deduction_rate: Decimal::new(500, 0),
///     absent_deduction_rate: Decimal::new(1000, 0),
/// };
///
/// let record = compute_payroll_record(&employee, &salary, None, &TaxTable::default());
/// assert_eq!(record.net_salary, Decimal::new(60_000, 0));
/// assert_eq!(record.warnings[0].code, "MISSING_ATTENDANCE_SUMMARY");
/// ```
pub fn compute_payroll_record(
    employee: &Employee,
    salary: &SalaryStructure,
    summary: Option<&MonthlyAttendanceSummary>,
    tax_table: &TaxTable,
) -> PayrollRecord {
    let mut audit_steps = Vec::new();
    let mut warnings = Vec::new();

    let total_allowances = salary.total_allowances();
    let gross_salary = salary.gross();
    audit_steps.push(AuditStep {
        step_number: 1,
        rule_id: "gross_salary".to_string(),
        rule_name: "Gross Salary".to_string(),
        input: serde_json::json!({
            "job_role_id": salary.job_role_id,
            "basic_salary": salary.basic_salary.to_string(),
            "housing_allowance": salary.housing_allowance.to_string(),
            "transport_allowance": salary.transport_allowance.to_string(),
            "medical_allowance": salary.medical_allowance.to_string(),
            "utility_allowance": salary.utility_allowance.to_string(),
            "other_allowances": salary.other_allowances.to_string()
        }),
        output: serde_json::json!({
            "total_allowances": total_allowances.to_string(),
            "gross_salary": gross_salary.to_string()
        }),
        reasoning: format!(
            "Basic {} plus allowances {} = gross {}",
            salary.basic_salary, total_allowances, gross_salary
        ),
    });

    let (late_deductions, absent_deductions) = match summary {
        Some(s) => {
            audit_steps.push(AuditStep {
                step_number: 2,
                rule_id: "attendance_deductions".to_string(),
                rule_name: "Attendance Deductions".to_string(),
                input: serde_json::json!({
                    "total_late_days": s.total_late_days,
                    "absent_days": s.absent_days,
                    "late_deduction_rate": salary.late_deduction_rate.to_string(),
                    "absent_deduction_rate": salary.absent_deduction_rate.to_string(),
                    "salary_deduction_amount": s.salary_deduction_amount.to_string()
                }),
                output: serde_json::json!({
                    "late_deductions": s.late_deduction_amount.to_string(),
                    "absent_deductions": s.absent_deduction_amount.to_string()
                }),
                reasoning: format!(
                    "{} late day(s) and {} absent day(s) from the {} attendance summary",
                    s.total_late_days, s.absent_days, s.month
                ),
            });
            (s.late_deduction_amount, s.absent_deduction_amount)
        }
        None => {
            warnings.push(AuditWarning::new(
                "MISSING_ATTENDANCE_SUMMARY",
                format!(
                    "no attendance summary for employee '{}'; attendance deductions are zero",
                    employee.id
                ),
                WarningSeverity::Medium,
            ));
            audit_steps.push(AuditStep {
                step_number: 2,
                rule_id: "attendance_deductions".to_string(),
                rule_name: "Attendance Deductions".to_string(),
                input: serde_json::json!({ "summary": null }),
                output: serde_json::json!({
                    "late_deductions": "0",
                    "absent_deductions": "0"
                }),
                reasoning: "No attendance summary; no attendance deductions applied".to_string(),
            });
            (Decimal::ZERO, Decimal::ZERO)
        }
    };
    let attendance_deduction = late_deductions + absent_deductions;

    let tax = compute_monthly_tax(gross_salary, tax_table);
    audit_steps.push(AuditStep {
        step_number: 3,
        rule_id: "paye_tax".to_string(),
        rule_name: "Progressive PAYE Tax".to_string(),
        input: serde_json::json!({
            "regime": tax_table.regime,
            "monthly_gross": gross_salary.to_string(),
            "periods_per_year": tax_table.periods_per_year
        }),
        output: serde_json::json!({
            "annual_gross": tax.annual_gross.to_string(),
            "annual_tax": tax.annual_tax.to_string(),
            "monthly_tax": tax.monthly_tax.to_string(),
            "bands": tax.bands
        }),
        reasoning: format!(
            "Annual gross {} taxed across {} band(s) = {} per year, {} per period",
            tax.annual_gross,
            tax.bands.len(),
            tax.annual_tax,
            tax.monthly_tax
        ),
    });

    let net_salary = gross_salary - late_deductions - absent_deductions - tax.monthly_tax;
    audit_steps.push(AuditStep {
        step_number: 4,
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "late_deductions": late_deductions.to_string(),
            "absent_deductions": absent_deductions.to_string(),
            "tax_deduction": tax.monthly_tax.to_string()
        }),
        output: serde_json::json!({ "net_salary": net_salary.to_string() }),
        reasoning: format!(
            "{} - {} - {} - {} = {}",
            gross_salary, late_deductions, absent_deductions, tax.monthly_tax, net_salary
        ),
    });

    if net_salary < Decimal::ZERO {
        warnings.push(AuditWarning::new(
            "NEGATIVE_NET_SALARY",
            format!("net salary {} is below zero", net_salary),
            WarningSeverity::High,
        ));
    }

    PayrollRecord {
        employee_id: employee.id.clone(),
        employee_name: employee.full_name.clone(),
        basic_salary: salary.basic_salary,
        housing_allowance: salary.housing_allowance,
        transport_allowance: salary.transport_allowance,
        medical_allowance: salary.medical_allowance,
        utility_allowance: salary.utility_allowance,
        other_allowances: salary.other_allowances,
        total_allowances,
        gross_salary,
        late_deductions,
        absent_deductions,
        attendance_deduction,
        tax_deduction: tax.monthly_tax,
        net_salary,
        audit_steps,
        warnings,
    }
}
