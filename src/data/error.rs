use thiserror::Error;

/// Failures of a catalog extraction. Either variant aborts the whole call;
/// no partial record set is ever returned.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The service could not be reached, answered with an error status, or
    /// sent a body that is not a STAC item collection.
    #[error("catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },

    /// An item in the result has no usable identifier.
    #[error("malformed item #{index}: {reason}")]
    MalformedItem { index: usize, reason: String },
}

impl CatalogError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        CatalogError::CatalogUnavailable {
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::unavailable(err.to_string())
    }
}

/// A storm-center string that is not a well-formed WKT point.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid geometry {input:?}: {reason}")]
pub struct InvalidGeometry {
    pub input: String,
    pub reason: &'static str,
}
