use crate::error::{Error, Result};
use crate::types::HttpResponse;

/// Turn a response into its body, failing on any non-2xx status.
pub fn extract(response: HttpResponse) -> Result<String> {
    if !response.is_success() {
        return Err(Error::status(response.status, &response.body));
    }
    Ok(response.body)
}

/// Check the status of a response whose body is not needed.
pub fn drain(response: HttpResponse) -> Result<()> {
    extract(response).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn success_returns_whole_body() {
        let body = "line one\nline two\n";
        assert_eq!(extract(response(200, body)).unwrap(), body);
        assert_eq!(extract(response(204, "")).unwrap(), "");
    }

    #[test]
    fn redirect_status_is_an_error() {
        let err = extract(response(302, "moved")).unwrap_err();
        assert!(matches!(err, Error::Status { status: 302, .. }));
    }

    #[test]
    fn error_status_carries_body() {
        match extract(response(500, "boom")).unwrap_err() {
            Error::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn drain_discards_body() {
        assert!(drain(response(201, "created")).is_ok());
        assert!(matches!(
            drain(response(404, "")),
            Err(Error::Status { status: 404, .. })
        ));
    }
}
