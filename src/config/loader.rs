//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from a directory of YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::{OrganizationData, ReferenceData};

use super::types::{EngineConfig, EngineRules, TaxTable};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml        # Attendance, discipline and performance thresholds
/// ├── tax.yaml           # Progressive PAYE bracket table
/// └── organization.yaml  # Branches, departments, roles, employees, salaries, KPI templates
/// ```
///
/// # Example
///
/// ```no_run
/// use settlement_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Tax regime: {}", loader.config().tax.regime);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any file is missing or contains invalid YAML, if
    /// the tax table is malformed, or if the organisation data has
    /// duplicate ids or dangling references.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let rules_path = path.join("engine.yaml");
        let rules = Self::load_yaml::<EngineRules>(&rules_path)?;
        rules.check().map_err(|message| EngineError::ConfigParseError {
            path: rules_path.display().to_string(),
            message,
        })?;

        let tax_path = path.join("tax.yaml");
        let tax = Self::load_yaml::<TaxTable>(&tax_path)?;
        tax.check().map_err(|message| EngineError::ConfigParseError {
            path: tax_path.display().to_string(),
            message,
        })?;

        let organization = Self::load_yaml::<OrganizationData>(&path.join("organization.yaml"))?;
        let reference = ReferenceData::new(organization)?;

        Ok(Self {
            config: EngineConfig {
                rules,
                tax,
                reference,
            },
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the indexed reference data.
    pub fn reference(&self) -> &ReferenceData {
        &self.config.reference
    }

    /// Consumes the loader, yielding the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::path::PathBuf;

    fn config_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/default")
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "settlement-config-{}-{}",
            name,
            uuid::Uuid::new_v4()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// CFG-001: default directory loads
    #[test]
    fn test_load_default_config() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.config().tax.regime, "NTA-2025");
        assert_eq!(loader.config().rules.attendance.query_trigger_count, 3);
        assert!(loader.reference().active_employees().count() >= 6);
        assert_eq!(loader.reference().active_branch_ids().len(), 3);
    }

    /// CFG-002: shipped tax table matches the built-in default
    #[test]
    fn test_default_tax_yaml_matches_default() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.config().tax, TaxTable::default());
        assert_eq!(loader.config().rules, EngineRules::default());
    }

    /// CFG-003: missing directory
    #[test]
    fn test_missing_directory() {
        let result = ConfigLoader::load("/nonexistent/settlement/config");
        assert!(matches!(result, Err(EngineError::ConfigNotFound { .. })));
    }

    /// CFG-004: invalid YAML surfaces the path
    #[test]
    fn test_invalid_yaml() {
        let dir = scratch_dir("invalid");
        fs::write(dir.join("engine.yaml"), "attendance: [unclosed").unwrap();
        match ConfigLoader::load(&dir) {
            Err(EngineError::ConfigParseError { path, .. }) => {
                assert!(path.ends_with("engine.yaml"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
        let _ = fs::remove_dir_all(dir);
    }

    /// CFG-005: malformed tax brackets are a parse error
    #[test]
    fn test_unsorted_tax_brackets_rejected() {
        let dir = scratch_dir("tax");
        fs::write(dir.join("engine.yaml"), "{}").unwrap();
        fs::write(
            dir.join("tax.yaml"),
            "regime: TEST\nbrackets:\n  - { threshold: \"0\", rate: \"0\" }\n  - { threshold: \"500\", rate: \"0.1\" }\n  - { threshold: \"100\", rate: \"0.2\" }\n",
        )
        .unwrap();
        fs::write(dir.join("organization.yaml"), "{}").unwrap();
        match ConfigLoader::load(&dir) {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("ascending"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
        let _ = fs::remove_dir_all(dir);
    }

    /// CFG-007: inverted lateness thresholds are a parse error
    #[test]
    fn test_inverted_attendance_thresholds_rejected() {
        let dir = scratch_dir("thresholds");
        fs::write(
            dir.join("engine.yaml"),
            "attendance:\n  late_threshold_minutes: 90\n  severe_late_threshold_minutes: 60\n",
        )
        .unwrap();
        match ConfigLoader::load(&dir) {
            Err(EngineError::ConfigParseError { path, message }) => {
                assert!(path.ends_with("engine.yaml"));
                assert!(message.contains("severe_late_threshold_minutes"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
        let _ = fs::remove_dir_all(dir);
    }

    /// CFG-006: empty organisation is allowed
    #[test]
    fn test_minimal_directory() {
        let dir = scratch_dir("minimal");
        fs::write(dir.join("engine.yaml"), "{}").unwrap();
        fs::write(
            dir.join("tax.yaml"),
            "regime: FLAT\nbrackets:\n  - { threshold: \"0\", rate: \"0.1\" }\n",
        )
        .unwrap();
        fs::write(dir.join("organization.yaml"), "{}").unwrap();
        let loader = ConfigLoader::load(&dir).unwrap();
        assert_eq!(loader.config().tax.periods_per_year, 12);
        assert_eq!(loader.config().tax.brackets[0].rate, Decimal::new(1, 1));
        assert_eq!(loader.reference().employees().count(), 0);
        let _ = fs::remove_dir_all(dir);
    }
}
