//! Placeholder templates for URLs and request bodies.
//!
//! A template is literal text interleaved with `{{.name}}` placeholders.
//! Expansion replaces each placeholder with its bound value and leaves the
//! literal text exactly as written, so percent-escapes typed by the author
//! (`cmd=Status%208`) survive untouched. Only substituted values are escaped,
//! using the rules of the URL zone the placeholder sits in.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use url::form_urlencoded;

use crate::error::{Error, Result};

/// Placeholder name to substitution value.
pub type Bindings = HashMap<String, String>;

/// The part of a URL a placeholder appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Path,
    Query,
    Fragment,
}

impl Zone {
    /// Zone in effect after the given literal text.
    fn after(self, literal: &str) -> Zone {
        match self {
            Zone::Fragment => Zone::Fragment,
            _ if literal.contains('#') => Zone::Fragment,
            Zone::Path if literal.contains('?') => Zone::Query,
            zone => zone,
        }
    }

    /// Escape a substituted value for this zone.
    ///
    /// `.` and `..` are refused in the path: URL parsing resolves them as
    /// dot segments whether or not they are percent-encoded.
    fn escape(self, value: &str) -> Result<String> {
        match self {
            Zone::Path if value == "." || value == ".." => Err(Error::template(format!(
                "path value {value:?} would change the path structure"
            ))),
            Zone::Path => Ok(urlencoding::encode(value).into_owned()),
            Zone::Query | Zone::Fragment => {
                Ok(form_urlencoded::byte_serialize(value.as_bytes()).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder { name: String, zone: Zone },
}

/// A parsed template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template, rejecting malformed placeholders.
    pub fn parse(source: &str) -> Result<Self> {
        lazy_static! {
            static ref PLACEHOLDER: Regex =
                Regex::new(r"^\{\{\s*\.?([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap();
        }

        let mut segments = Vec::new();
        let mut zone = Zone::Path;
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            let literal = &rest[..start];
            if !literal.is_empty() {
                segments.push(Segment::Literal(literal.to_string()));
            }
            zone = zone.after(literal);

            let tail = &rest[start..];
            let captures = PLACEHOLDER.captures(tail).ok_or_else(|| {
                let snippet: String = tail.chars().take(24).collect();
                Error::template(format!("malformed placeholder near {snippet:?}"))
            })?;
            segments.push(Segment::Placeholder {
                name: captures[1].to_string(),
                zone,
            });
            rest = &tail[captures[0].len()..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Parse a URL template. Placeholders must come after the host.
    pub fn parse_url(source: &str) -> Result<Self> {
        let template = Self::parse(source)?;

        let mut prefix = String::new();
        for segment in &template.segments {
            match segment {
                Segment::Literal(text) => prefix.push_str(text),
                Segment::Placeholder { name, .. } if in_authority(&prefix) => {
                    return Err(Error::template(format!(
                        "placeholder {name:?} in scheme or host of {source}"
                    )));
                }
                Segment::Placeholder { .. } => {}
            }
        }

        Ok(template)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Distinct placeholder names, in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder { name, .. } = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn has_placeholder(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Placeholder { name: n, .. } if n == name))
    }

    /// Expand as a URL, escaping each value for its zone.
    pub fn expand_url(&self, bindings: &Bindings) -> Result<String> {
        self.expand(bindings, |zone, value| zone.escape(value))
    }

    /// Expand as a request body; values are inserted verbatim.
    pub fn expand_body(&self, bindings: &Bindings) -> Result<String> {
        self.expand(bindings, |_, value| Ok(value.to_string()))
    }

    fn expand<F>(&self, bindings: &Bindings, render: F) -> Result<String>
    where
        F: Fn(Zone, &str) -> Result<String>,
    {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { name, zone } => {
                    let value = bindings.get(name).ok_or_else(|| {
                        Error::template(format!("no value for placeholder {name:?}"))
                    })?;
                    out.push_str(&render(*zone, value)?);
                }
            }
        }
        Ok(out)
    }
}

/// Whether text following `prefix` is still scheme, userinfo or host.
fn in_authority(prefix: &str) -> bool {
    let after_scheme = match prefix.find("://") {
        Some(i) => &prefix[i + 3..],
        None => prefix,
    };
    !after_scheme.contains(|c: char| matches!(c, '/' | '?' | '#'))
}
