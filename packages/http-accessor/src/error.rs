/// Longest response body kept in [`Error::Status`].
const MAX_STATUS_BODY: usize = 256;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A placeholder is malformed or has no binding.
    #[error("template error: {message}")]
    Template { message: String },

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    /// Declared parameters do not match the templates.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("request timed out: {0}")]
    Timeout(reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid HTTP method: {method}")]
    InvalidMethod { method: String },

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("expected {expected} values, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Error::Timeout(error)
        } else {
            Error::Transport(error)
        }
    }
}

impl Error {
    pub(crate) fn template(message: impl Into<String>) -> Self {
        Error::Template {
            message: message.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Build a status error, truncating the body for diagnostics.
    pub(crate) fn status(status: u16, body: &str) -> Self {
        let mut end = body.len().min(MAX_STATUS_BODY);
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        Error::Status {
            status,
            body: body[..end].to_string(),
        }
    }

    /// Whether re-invoking the accessor may succeed.
    ///
    /// Only connectivity failures and timeouts qualify; template, URL and
    /// configuration errors are bugs in the setup, and status errors are
    /// left for the caller to judge.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_body_is_truncated() {
        let body = "x".repeat(1000);
        match Error::status(500, &body) {
            Error::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), MAX_STATUS_BODY);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn status_truncation_respects_char_boundaries() {
        let body = "ä".repeat(200);
        match Error::status(502, &body) {
            Error::Status { body, .. } => {
                assert!(body.len() <= MAX_STATUS_BODY);
                assert!(body.chars().all(|c| c == 'ä'));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn only_network_errors_are_retryable() {
        assert!(!Error::template("x").is_retryable());
        assert!(!Error::configuration("x").is_retryable());
        assert!(!Error::status(503, "").is_retryable());
        assert!(!Error::ArgumentCount {
            expected: 1,
            actual: 2
        }
        .is_retryable());
    }
}
