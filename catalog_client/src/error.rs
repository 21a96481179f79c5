use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogApiError {
    #[error("Could not initialize the catalog client. {0}")]
    Initialization(String),
    #[error("Product {0} does not exist in the catalog")]
    ProductNotFound(i64),
    #[error("The catalog circuit breaker is open; not attempting the call")]
    CircuitOpen,
    #[error("The catalog did not respond in time. {0}")]
    Timeout(String),
    #[error("Error sending request to the catalog. {0}")]
    RequestError(String),
    #[error("The catalog returned status {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not deserialize the catalog response. {0}")]
    JsonError(String),
}

impl CatalogApiError {
    /// Transient failures are worth retrying; client errors such as a 404 are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::RequestError(_) => true,
            Self::QueryError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
