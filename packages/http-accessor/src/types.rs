use std::fmt;
use std::str::FromStr;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// HTTP method for requests
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => http::Method::GET,
            Method::POST => http::Method::POST,
            Method::PUT => http::Method::PUT,
            Method::DELETE => http::Method::DELETE,
            Method::PATCH => http::Method::PATCH,
            Method::HEAD => http::Method::HEAD,
            Method::OPTIONS => http::Method::OPTIONS,
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    /// Parse a verb case-insensitively; an empty string means GET.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "PATCH" => Ok(Method::PATCH),
            "HEAD" => Ok(Method::HEAD),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(Error::InvalidMethod {
                method: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&http::Method::from(*self), f)
    }
}

/// Credentials sent as an `Authorization: Basic` header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BasicAuth {
    pub user: String,
    #[serde(default)]
    pub password: String,
}

/// A fully expanded request, ready for an [`HttpExecutor`](crate::HttpExecutor).
///
/// Built fresh for every accessor call and dropped once the response has
/// been extracted.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub auth: Option<BasicAuth>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Build a request from an already expanded URL and body.
    ///
    /// The URL is parsed as-is; existing percent-escapes are kept.
    pub fn build(
        method: Method,
        expanded_url: &str,
        expanded_body: Option<String>,
        headers: &HeaderMap,
    ) -> Result<Self> {
        let url = Url::parse(expanded_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl {
                message: format!("unsupported scheme {:?} in {expanded_url}", url.scheme()),
            });
        }

        Ok(Self {
            method,
            url,
            headers: headers.clone(),
            auth: None,
            body: expanded_body,
        })
    }

    pub fn with_auth(mut self, auth: Option<BasicAuth>) -> Self {
        self.auth = auth;
        self
    }
}

/// Validate configured header pairs into a [`HeaderMap`].
pub fn header_map<'a, I>(pairs: I) -> Result<HeaderMap>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let header_name = HeaderName::try_from(name.as_str())?;
        let header_value = HeaderValue::try_from(value.as_str())?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Complete body, read to the end
    pub body: String,
}

impl HttpResponse {
    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
