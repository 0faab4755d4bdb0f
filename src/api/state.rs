//! Application state for the Settlement Engine API.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::engine::SettlementEngine;

/// Shared application state.
///
/// Holds the one engine instance all handlers operate on.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<SettlementEngine>,
}

impl AppState {
    /// Wraps an engine for sharing across handlers.
    pub fn new(engine: SettlementEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Creates the state from a loaded configuration directory.
    pub fn from_config(loader: ConfigLoader) -> Self {
        Self::new(SettlementEngine::new(loader.into_config()))
    }

    /// Returns the engine.
    pub fn engine(&self) -> &SettlementEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }
}
