use std::path::PathBuf;
use thiserror::Error;

use crate::types::Kind;

#[derive(Debug, Error)]
pub enum OverfigError {
    #[error("Invalid override for '{key}': cannot parse {text:?} as {kind}")]
    Coerce { key: String, text: String, kind: Kind },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Unknown key '{key}' in overlay document")]
    UnknownKey { key: String },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("'{path}' is indexed like an array but holds a different shape")]
    ContainerMismatch { path: String },

    #[error("Configuration must serialize to a JSON object at the root")]
    RootNotObject,

    #[error("Member name at '{path}' contains characters reserved for addressing ('.', '[', ']', '=')")]
    InvalidKey { path: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_formats_key_text_and_kind() {
        let err = OverfigError::Coerce {
            key: "server.port".into(),
            text: "not-a-number".into(),
            kind: Kind::Int,
        };
        let msg = err.to_string();
        assert!(msg.contains("server.port"));
        assert!(msg.contains("not-a-number"));
        assert!(msg.contains("integer"));
    }

    #[test]
    fn key_not_found_formats() {
        let err = OverfigError::KeyNotFound("database.url".into());
        assert!(err.to_string().contains("database.url"));
    }

    #[test]
    fn container_mismatch_names_the_path() {
        let err = OverfigError::ContainerMismatch {
            path: "tags".into(),
        };
        assert!(err.to_string().contains("tags"));
    }

    #[test]
    fn invalid_key_names_the_path() {
        let err = OverfigError::InvalidKey {
            path: "bad.na[me".into(),
        };
        assert!(err.to_string().contains("bad.na[me"));
    }
}
