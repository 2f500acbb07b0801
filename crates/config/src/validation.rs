//! Checks serde cannot express
//!
//! Run after CLI overrides are applied, so `--path` can fill in a file that
//! omits `[sink] path`.

use std::path::Path;

use crate::Config;
use crate::error::{ConfigError, Result};

pub fn validate_config(config: &Config) -> Result<()> {
    validate_sink_path(&config.sink.path)
}

fn validate_sink_path(path: &str) -> Result<()> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingPath);
    }

    // Path::file_name ignores a trailing separator, so check it first
    if trimmed.ends_with(['/', '\\']) || Path::new(trimmed).file_name().is_none() {
        return Err(ConfigError::BadPath {
            path: path.to_string(),
            reason: "names a directory, not a file",
        });
    }

    if trimmed != path {
        return Err(ConfigError::BadPath {
            path: path.to_string(),
            reason: "has leading or trailing whitespace",
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_path_is_missing() {
        assert!(matches!(validate_sink_path(""), Err(ConfigError::MissingPath)));
        assert!(matches!(validate_sink_path("  "), Err(ConfigError::MissingPath)));
    }

    #[test]
    fn test_directory_paths_rejected() {
        for path in ["logs/", "logs\\", "..", "/"] {
            assert!(
                matches!(validate_sink_path(path), Err(ConfigError::BadPath { .. })),
                "{path}"
            );
        }
    }

    #[test]
    fn test_padded_path_rejected() {
        let err = validate_sink_path(" app.log").unwrap_err();
        assert!(err.to_string().contains("whitespace"));
    }

    #[test]
    fn test_file_paths_accepted() {
        for path in ["app.log", "logs/app.log", "/var/log/svc.log"] {
            assert!(validate_sink_path(path).is_ok(), "{path}");
        }
    }
}
