//! HTTP execution abstraction.
//!
//! Accessors hand their expanded requests to an [`HttpExecutor`]. The
//! production implementation wraps a blocking reqwest client; unit tests
//! swap in a mock that records requests without touching the network.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::Result;
use crate::types::{HttpRequest, HttpResponse};

/// Trait for executing HTTP requests.
pub trait HttpExecutor: Send + Sync {
    /// Execute a request and return the response with its body fully read.
    ///
    /// Connectivity failures map to `Error::Transport`, an exceeded
    /// deadline to `Error::Timeout`. Non-2xx statuses are not errors here.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Production HTTP executor using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    /// Create an executor whose round trips are bounded by `timeout`.
    ///
    /// With `insecure` set, TLS certificates are not verified.
    pub fn new(timeout: Duration, insecure: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure)
            .build()?;

        Ok(Self { client })
    }
}

impl HttpExecutor for ReqwestExecutor {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let method: http::Method = request.method.into();

        let mut req_builder = self.client.request(method, request.url.clone());
        req_builder = req_builder.headers(request.headers.clone());

        if let Some(auth) = &request.auth {
            req_builder = req_builder.basic_auth(&auth.user, Some(&auth.password));
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        let response = req_builder.send()?;

        let status = response.status().as_u16();

        // Reading to the end releases the connection back to the pool.
        let body = response.text()?;

        Ok(HttpResponse { status, body })
    }
}
