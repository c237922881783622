//! Error types for the forge.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a forge run.
#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("database not found at {}", .0.display())]
    DatabaseNotFound(PathBuf),

    /// Required tables are absent; nothing was touched.
    #[error("missing required tables: {}", .0.join(", "))]
    MissingTables(Vec<String>),

    /// Invocation input is unusable; reported before any mutation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("expression {expression_id} does not belong to power {power_id}")]
    IntegrityViolation {
        expression_id: String,
        power_id: String,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ForgeResult<T> = Result<T, ForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tables_lists_every_name() {
        let err = ForgeError::MissingTables(vec!["power_tag".into(), "power_text".into()]);
        assert_eq!(err.to_string(), "missing required tables: power_tag, power_text");
    }

    #[test]
    fn test_integrity_message() {
        let err = ForgeError::IntegrityViolation {
            expression_id: "abc".into(),
            power_id: "7".into(),
        };
        assert_eq!(err.to_string(), "expression abc does not belong to power 7");
    }
}
