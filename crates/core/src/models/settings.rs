use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default number of trading days in the value transition series.
pub const DEFAULT_TRANSITION_WINDOW: usize = 100;

/// User-configurable settings, stored inside the encrypted portfolio file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Optional API keys for price sources that require them.
    /// Keys: source name (e.g., "rapidapi").
    /// Values: the API key string.
    pub api_keys: HashMap<String, String>,

    /// Trading days covered by the transition series.
    #[serde(default = "default_transition_window")]
    pub transition_window: usize,
}

fn default_transition_window() -> usize {
    DEFAULT_TRANSITION_WINDOW
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_keys: HashMap::new(),
            transition_window: DEFAULT_TRANSITION_WINDOW,
        }
    }
}
