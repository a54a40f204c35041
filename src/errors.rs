use thiserror::Error;

/// Crate-wide error taxonomy.
///
/// Only `NotFound` and `Validation` are hard failures. `Storage` is caught
/// per sub-query by the analytics layer and treated as "no data";
/// `Enrichment` and `Cache` are logged and swallowed at their call sites.
#[derive(Debug, Error)]
pub enum DevPulseError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("enrichment failure: {0}")]
    Enrichment(String),

    #[error("cache failure: {0}")]
    Cache(String),
}

impl DevPulseError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DevPulseError>;

#[cfg(feature = "database")]
impl From<sqlx::Error> for DevPulseError {
    fn from(err: sqlx::Error) -> Self {
        DevPulseError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for DevPulseError {
    fn from(err: serde_json::Error) -> Self {
        DevPulseError::Storage(format!("serialization: {err}"))
    }
}
