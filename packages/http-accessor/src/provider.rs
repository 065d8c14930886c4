//! Getter and setter construction from a static endpoint description.
//!
//! [`HttpProvider`] is configured once. [`HttpProvider::string_getter`] and
//! [`HttpProvider::string_setter`] validate the templates against the
//! declared parameters and return small accessor objects that share the
//! immutable endpoint. Every call expands the templates, builds a fresh
//! request, runs it through the executor and extracts the result; nothing
//! is carried over between calls.

use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, trace, warn, Span};

use crate::cache::CachedGetter;
use crate::config::EndpointConfig;
use crate::error::{Error, Result};
use crate::executor::{HttpExecutor, ReqwestExecutor};
use crate::extract::{drain, extract};
use crate::template::{Bindings, Template};
use crate::types::{header_map, BasicAuth, HttpRequest, HttpResponse, Method};

/// Something that reads a string value.
pub trait Getter: Send + Sync {
    fn get(&self) -> Result<String>;
}

/// Something that pushes values, one per declared parameter.
pub trait Setter: Send + Sync {
    fn set(&self, values: &[&str]) -> Result<()>;
}

impl<F> Getter for F
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn get(&self) -> Result<String> {
        self()
    }
}

/// Immutable endpoint shared by all accessors built from one provider.
#[derive(Debug, Clone)]
struct Endpoint {
    method: Method,
    url: Template,
    body: Option<Template>,
    headers: HeaderMap,
    auth: Option<BasicAuth>,
    bindings: Bindings,
}

impl Endpoint {
    fn has_placeholder(&self, name: &str) -> bool {
        self.url.has_placeholder(name)
            || self.body.as_ref().is_some_and(|b| b.has_placeholder(name))
    }

    fn placeholders(&self) -> Vec<&str> {
        let mut names = self.url.placeholders();
        if let Some(body) = &self.body {
            for name in body.placeholders() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// Factory for HTTP getters and setters.
///
/// ```ignore
/// let provider = HttpProvider::new(Method::GET, "http://10.0.0.5/relay/0?turn={{.state}}", false)?
///     .with_timeout(Duration::from_secs(2));
///
/// let set_relay = provider.string_setter(&["state"])?;
/// set_relay.set(&["on"])?;
/// ```
#[derive(Clone)]
pub struct HttpProvider {
    endpoint: Endpoint,
    insecure: bool,
    timeout: Duration,
    cache: Duration,
    scale: f64,
    executor: Option<Arc<dyn HttpExecutor>>,
    span: Span,
}

impl HttpProvider {
    /// Create a provider for `uri`, a URL template.
    pub fn new(method: Method, uri: &str, insecure: bool) -> Result<Self> {
        let mut config = EndpointConfig::new(uri);
        config.method = method;
        config.insecure = insecure;
        Self::from_config(config)
    }

    /// Create a provider from a loaded configuration.
    pub fn from_config(config: EndpointConfig) -> Result<Self> {
        let url = Template::parse_url(&config.uri)?;
        let body = config.body.as_deref().map(Template::parse).transpose()?;
        let headers = header_map(&config.headers)?;

        Ok(Self {
            endpoint: Endpoint {
                method: config.method,
                url,
                body,
                headers,
                auth: config.auth,
                bindings: Bindings::new(),
            },
            insecure: config.insecure,
            timeout: config.timeout,
            cache: config.cache,
            scale: config.scale,
            executor: None,
            span: Span::none(),
        })
    }

    /// Attach a body template, expanded with the same values as the URL.
    pub fn with_body(mut self, body: &str) -> Result<Self> {
        self.endpoint.body = Some(Template::parse(body)?);
        Ok(self)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        self.endpoint
            .headers
            .insert(HeaderName::try_from(name)?, HeaderValue::try_from(value)?);
        Ok(self)
    }

    pub fn with_basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.endpoint.auth = Some(BasicAuth {
            user: user.into(),
            password: password.into(),
        });
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache(mut self, cache: Duration) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Bind a placeholder at construction time.
    pub fn with_binding(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.endpoint.bindings.insert(name.into(), value.into());
        self
    }

    /// Span entered around every call; carries the caller's context.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Replace the reqwest transport.
    pub fn with_executor(mut self, executor: impl HttpExecutor + 'static) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    pub fn method(&self) -> Method {
        self.endpoint.method
    }

    pub fn uri(&self) -> &str {
        self.endpoint.url.as_str()
    }

    pub fn insecure(&self) -> bool {
        self.insecure
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Cache duration for a decorator such as [`CachedGetter`].
    pub fn cache(&self) -> Duration {
        self.cache
    }

    /// Scale factor for callers converting values; not applied here.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Build a getter. Every placeholder must already be bound.
    pub fn string_getter(&self) -> Result<StringGetter> {
        let unbound: Vec<&str> = self
            .endpoint
            .placeholders()
            .into_iter()
            .filter(|name| !self.endpoint.bindings.contains_key(*name))
            .collect();
        if !unbound.is_empty() {
            return Err(Error::configuration(format!(
                "getter for {} has unbound placeholders: {}",
                self.endpoint.url.as_str(),
                unbound.join(", ")
            )));
        }

        Ok(StringGetter {
            call: self.call()?,
        })
    }

    /// Build a getter wrapped in a [`CachedGetter`] honoring [`cache`](Self::cache).
    pub fn cached_getter(&self) -> Result<CachedGetter<StringGetter>> {
        Ok(CachedGetter::new(self.string_getter()?, self.cache))
    }

    /// Build a setter taking one value per name in `params`, in order.
    pub fn string_setter(&self, params: &[&str]) -> Result<StringSetter> {
        for (i, name) in params.iter().enumerate() {
            if params[..i].contains(name) {
                return Err(Error::configuration(format!(
                    "parameter {name:?} declared twice"
                )));
            }
            if !self.endpoint.has_placeholder(name) {
                return Err(Error::configuration(format!(
                    "parameter {name:?} does not appear in url or body template"
                )));
            }
            if self.endpoint.bindings.contains_key(*name) {
                return Err(Error::configuration(format!(
                    "parameter {name:?} is already bound"
                )));
            }
        }

        Ok(StringSetter {
            call: self.call()?,
            params: params.iter().map(|p| p.to_string()).collect(),
        })
    }

    fn call(&self) -> Result<Call> {
        let executor: Arc<dyn HttpExecutor> = match &self.executor {
            Some(executor) => executor.clone(),
            None => Arc::new(ReqwestExecutor::new(self.timeout, self.insecure)?),
        };

        Ok(Call {
            endpoint: Arc::new(self.endpoint.clone()),
            executor,
            span: self.span.clone(),
        })
    }
}

/// One expand-build-execute round trip over a shared endpoint.
#[derive(Clone)]
struct Call {
    endpoint: Arc<Endpoint>,
    executor: Arc<dyn HttpExecutor>,
    span: Span,
}

impl Call {
    fn perform(&self, bindings: &Bindings) -> Result<HttpResponse> {
        let _entered = self.span.enter();
        let endpoint = &self.endpoint;

        let url = endpoint.url.expand_url(bindings)?;
        let body = endpoint
            .body
            .as_ref()
            .map(|b| b.expand_body(bindings))
            .transpose()?;
        let request = HttpRequest::build(endpoint.method, &url, body, &endpoint.headers)?
            .with_auth(endpoint.auth.clone());

        debug!(method = %request.method, url = %request.url, "sending request");

        let response = self.executor.execute(&request).inspect_err(|err| {
            warn!(url = %request.url, error = %err, "request failed");
        })?;

        trace!(status = response.status, bytes = response.body.len(), "received response");
        if !response.is_success() {
            warn!(url = %request.url, status = response.status, "unexpected status");
        }

        Ok(response)
    }
}

/// Zero-argument accessor returning the response body.
#[derive(Clone)]
pub struct StringGetter {
    call: Call,
}

impl StringGetter {
    pub fn get(&self) -> Result<String> {
        extract(self.call.perform(&self.call.endpoint.bindings)?)
    }
}

impl Getter for StringGetter {
    fn get(&self) -> Result<String> {
        StringGetter::get(self)
    }
}

/// Accessor binding values positionally to its declared parameters.
#[derive(Clone)]
pub struct StringSetter {
    call: Call,
    params: Vec<String>,
}

impl StringSetter {
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Send the values; success is decided by the status code alone.
    pub fn set(&self, values: &[&str]) -> Result<()> {
        if values.len() != self.params.len() {
            return Err(Error::ArgumentCount {
                expected: self.params.len(),
                actual: values.len(),
            });
        }

        let mut bindings = self.call.endpoint.bindings.clone();
        for (name, value) in self.params.iter().zip(values) {
            bindings.insert(name.clone(), value.to_string());
        }

        drain(self.call.perform(&bindings)?)
    }
}

impl Setter for StringSetter {
    fn set(&self, values: &[&str]) -> Result<()> {
        StringSetter::set(self, values)
    }
}
