//! # http-accessor
//!
//! Configuration-driven access to HTTP devices and services.
//!
//! An [`HttpProvider`] is built once from a method and a URL template (plus
//! optional body template, headers and tuning values). It hands out two
//! kinds of accessors:
//!
//! - [`StringGetter`]: issues the request and returns the response body.
//! - [`StringSetter`]: substitutes its arguments into the templates, issues
//!   the request and reports success by status code.
//!
//! Templates use `{{.name}}` placeholders. Substituted values are escaped
//! for the part of the URL they land in, while the literal template text is
//! sent exactly as written:
//!
//! ```ignore
//! use http_accessor::{HttpProvider, Method};
//!
//! let provider = HttpProvider::new(Method::GET, "http://10.0.0.7/cm?cmd=Power%20{{.state}}", false)?;
//!
//! let switch = provider.string_setter(&["state"])?;
//! switch.set(&["on"])?; // GET /cm?cmd=Power%20on
//! ```
//!
//! Accessors are cheap to clone and safe to call from many threads at once;
//! each call builds its own request and shares nothing mutable with other
//! calls. Diagnostics go through `tracing`, inside the span passed to
//! [`HttpProvider::with_span`].

pub mod cache;
pub mod config;
pub mod error;
pub mod executor;
pub mod extract;
pub mod provider;
pub mod template;
pub mod types;

pub use cache::CachedGetter;
pub use config::EndpointConfig;
pub use error::{Error, Result};
pub use executor::{HttpExecutor, ReqwestExecutor};
pub use provider::{Getter, HttpProvider, Setter, StringGetter, StringSetter};
pub use template::{Bindings, Template, Zone};
pub use types::{BasicAuth, HttpRequest, HttpResponse, Method};
