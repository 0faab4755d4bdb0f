//! Indexed read-only reference data.
//!
//! [`ReferenceData`] bundles the organisation lookups the engine needs and
//! indexes them by id. It is built once (usually by the config loader) and
//! never mutated by the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::{Branch, Department, Employee, JobRole, KpiTemplate, SalaryStructure};

/// Flat, serializable form of the reference data (the `organization.yaml` layout).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationData {
    /// All branches.
    #[serde(default)]
    pub branches: Vec<Branch>,
    /// All departments.
    #[serde(default)]
    pub departments: Vec<Department>,
    /// All job roles, with their shift policies.
    #[serde(default)]
    pub job_roles: Vec<JobRole>,
    /// All employees.
    #[serde(default)]
    pub employees: Vec<Employee>,
    /// Salary structures, at most one per job role.
    #[serde(default)]
    pub salary_structures: Vec<SalaryStructure>,
    /// KPI templates.
    #[serde(default)]
    pub kpi_templates: Vec<KpiTemplate>,
}

/// Indexed reference data.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    branches: BTreeMap<String, Branch>,
    departments: BTreeMap<String, Department>,
    job_roles: BTreeMap<String, JobRole>,
    employees: BTreeMap<String, Employee>,
    salary_structures: BTreeMap<String, SalaryStructure>,
    kpi_templates: Vec<KpiTemplate>,
}

impl ReferenceData {
    /// Indexes and validates organisation data.
    ///
    /// Fails with a validation error on duplicate ids, on a second salary
    /// structure for the same role, on dangling references and on shift
    /// policies whose window is not ordered.
    pub fn new(data: OrganizationData) -> EngineResult<Self> {
        let mut problems = Vec::new();

        let branches = index_unique(data.branches, |b| b.id.clone(), "branch", &mut problems);
        let departments =
            index_unique(data.departments, |d| d.id.clone(), "department", &mut problems);
        let job_roles = index_unique(data.job_roles, |r| r.id.clone(), "job role", &mut problems);
        let employees = index_unique(data.employees, |e| e.id.clone(), "employee", &mut problems);
        let salary_structures = index_unique(
            data.salary_structures,
            |s| s.job_role_id.clone(),
            "salary structure for job role",
            &mut problems,
        );

        for role in job_roles.values() {
            if !departments.contains_key(&role.department_id) {
                problems.push(format!(
                    "job role '{}' references unknown department '{}'",
                    role.id, role.department_id
                ));
            }
            if let Some(policy) = &role.shift_policy {
                if let Err(err) = policy.validate() {
                    problems.push(format!("job role '{}': {}", role.id, err));
                }
            }
        }

        for employee in employees.values() {
            if !branches.contains_key(&employee.branch_id) {
                problems.push(format!(
                    "employee '{}' references unknown branch '{}'",
                    employee.id, employee.branch_id
                ));
            }
            if !departments.contains_key(&employee.department_id) {
                problems.push(format!(
                    "employee '{}' references unknown department '{}'",
                    employee.id, employee.department_id
                ));
            }
            if let Some(role_id) = &employee.job_role_id {
                if !job_roles.contains_key(role_id) {
                    problems.push(format!(
                        "employee '{}' references unknown job role '{}'",
                        employee.id, role_id
                    ));
                }
            }
        }

        if !problems.is_empty() {
            return Err(EngineError::Validation {
                message: format!("{} reference data problem(s)", problems.len()),
                details: problems,
            });
        }

        let mut kpi_templates = data.kpi_templates;
        kpi_templates.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(Self {
            branches,
            departments,
            job_roles,
            employees,
            salary_structures,
            kpi_templates,
        })
    }

    /// Looks up an employee.
    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.get(id)
    }

    /// Iterates all employees ordered by id.
    pub fn employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.values()
    }

    /// Iterates active employees ordered by id.
    pub fn active_employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.values().filter(|e| e.is_active())
    }

    /// Looks up a branch.
    pub fn branch(&self, id: &str) -> Option<&Branch> {
        self.branches.get(id)
    }

    /// Ids of the branches that must report before a month can close.
    pub fn active_branch_ids(&self) -> Vec<String> {
        self.branches
            .values()
            .filter(|b| b.is_active)
            .map(|b| b.id.clone())
            .collect()
    }

    /// Looks up a department.
    pub fn department(&self, id: &str) -> Option<&Department> {
        self.departments.get(id)
    }

    /// Looks up a job role.
    pub fn job_role(&self, id: &str) -> Option<&JobRole> {
        self.job_roles.get(id)
    }

    /// The salary structure of a job role.
    pub fn salary_structure(&self, job_role_id: &str) -> Option<&SalaryStructure> {
        self.salary_structures.get(job_role_id)
    }

    /// The active KPI template of a job role. The lowest template id wins if
    /// more than one is active.
    pub fn active_kpi_template(&self, job_role_id: &str) -> Option<&KpiTemplate> {
        self.kpi_templates
            .iter()
            .find(|t| t.is_active && t.job_role_id == job_role_id)
    }
}

fn index_unique<T>(
    items: Vec<T>,
    key: impl Fn(&T) -> String,
    label: &str,
    problems: &mut Vec<String>,
) -> BTreeMap<String, T> {
    let mut index = BTreeMap::new();
    for item in items {
        let id = key(&item);
        if index.contains_key(&id) {
            problems.push(format!("duplicate {} '{}'", label, id));
            continue;
        }
        index.insert(id, item);
    }
    index
}
