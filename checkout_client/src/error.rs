use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckoutApiError {
    #[error("Could not initialize the checkout client. {0}")]
    Initialization(String),
    #[error("Error sending request to the payment provider. {0}")]
    RequestError(String),
    #[error("The payment provider returned status {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not deserialize the provider response. {0}")]
    JsonError(String),
    #[error("The provider returned a session without a redirect url")]
    MissingRedirectUrl,
}
