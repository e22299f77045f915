use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Invalid date format: '{0}'. Use 'YYYY-MM-DD' or 'YYYY-MM-DD to YYYY-MM-DD'.")]
    InvalidDateFormat(String),

    #[error("Search query cannot be empty.")]
    EmptyQuery,

    #[error("Elasticsearch is unreachable: {0}")]
    BackendUnreachable(String),

    #[error("Elasticsearch client is not initialized.")]
    BackendUninitialized,

    #[error("Unexpected Elasticsearch error: {0}")]
    UnexpectedBackendError(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::BackendUnreachable(err.to_string())
        } else {
            Self::UnexpectedBackendError(err.to_string())
        }
    }
}
