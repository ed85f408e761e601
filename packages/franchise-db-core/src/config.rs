//! Database configuration.

use std::path::PathBuf;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Maximum length of any text field, in characters
    pub max_text_len: usize,
    /// Position title that qualifies an employee to manage a location
    pub manager_position_title: String,
    /// Prefix of the sentinel title written by a soft-clear
    pub soft_clear_prefix: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Response timeout in milliseconds
    pub response_timeout_ms: u64,
    /// Optional JSON snapshot loaded at startup
    pub seed_path: Option<PathBuf>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            max_text_len: 50,
            manager_position_title: "Manager".to_string(),
            soft_clear_prefix: "Unassigned".to_string(),
            request_timeout_ms: 5000,   // 5 seconds default
            response_timeout_ms: 10000, // 10 seconds default
            seed_path: None,
        }
    }
}
