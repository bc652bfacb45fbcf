/// A [`reqwest::Error`] with its URL removed, as URLs of remote nodes
/// frequently contain API keys.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ReqwestError(reqwest::Error);

impl From<reqwest::Error> for ReqwestError {
    fn from(value: reqwest::Error) -> Self {
        Self(value.without_url())
    }
}

/// A [`reqwest_middleware::Error`] with its URL removed.
#[derive(Debug, thiserror::Error)]
pub enum MiddlewareError {
    /// An error raised by a middleware
    #[error(transparent)]
    Middleware(anyhow::Error),
    /// An error raised by the HTTP client
    #[error(transparent)]
    Reqwest(ReqwestError),
}

impl From<reqwest_middleware::Error> for MiddlewareError {
    fn from(value: reqwest_middleware::Error) -> Self {
        match value {
            reqwest_middleware::Error::Middleware(error) => Self::Middleware(error),
            reqwest_middleware::Error::Reqwest(error) => Self::Reqwest(error.into()),
        }
    }
}
