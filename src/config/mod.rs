//! Configuration loading for the Settlement Engine.
//!
//! Thresholds, the tax table and the organisation's reference data are
//! read from YAML files in a single directory.
//!
//! # Example
//!
//! ```no_run
//! use settlement_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Brackets: {}", config.config().tax.brackets.len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AttendanceRules, DisciplineRules, EngineConfig, EngineRules, PerformanceRules, ProbationRules,
    RatingBand, RatingScale, TaxBracket, TaxTable,
};
