use thiserror::Error;

/// Failures of the serialization boundary around cached values.
///
/// Callers log these and continue as if the cache were empty.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to encode value for `{key}`")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cached value under `{key}` could not be decoded")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    pub fn key(&self) -> &str {
        match self {
            Self::Encode { key, .. } | Self::Decode { key, .. } => key,
        }
    }
}
