//! Outbound request model.

use url::form_urlencoded;
use url::Url;

use crate::error::{PageWireError, Result};

/// How a request leaves the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Payload in the query string.
    Get,
    /// Payload as `application/x-www-form-urlencoded` body.
    Post,
    /// Native form submission into a hidden frame; never parsed as an envelope.
    Multipart,
}

impl Method {
    /// `data-method` style attribute: `post` selects POST, anything else GET.
    pub fn from_attr(attr: Option<&str>) -> Self {
        match attr {
            Some(m) if m.eq_ignore_ascii_case("post") => Method::Post,
            _ => Method::Get,
        }
    }

    /// Form `method` + `enctype` attributes.
    pub fn from_form(method: Option<&str>, enctype: Option<&str>) -> Self {
        match Method::from_attr(method) {
            Method::Post
                if enctype.is_some_and(|e| e.eq_ignore_ascii_case("multipart/form-data")) =>
            {
                Method::Multipart
            }
            m => m,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Multipart => "MULTIPART",
        }
    }
}

/// Ordered name/value pairs, serialized the way browsers encode forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    pairs: Vec<(String, String)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// First value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// `application/x-www-form-urlencoded` serialization.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// One user-triggered call, fully described before dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRequest {
    pub method: Method,
    /// Destination, absolute or relative to the page base URL.
    pub target: String,
    pub payload: FormPayload,
    /// Field ids that must be non-empty (after trim), in document order.
    pub required_fields: Vec<String>,
    /// Where to go after a navigating success; always present.
    pub redirect: String,
}

impl InteractionRequest {
    pub fn new(method: Method, target: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            payload: FormPayload::new(),
            required_fields: Vec::new(),
            redirect: redirect.into(),
        }
    }

    pub fn with_payload(mut self, payload: FormPayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_required(mut self, fields: Vec<String>) -> Self {
        self.required_fields = fields;
        self
    }

    /// Resolve `target` against `base`; GET requests carry the payload in
    /// the query string, appended after any query already on the target.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = resolve_target(base, &self.target)?;
        if self.method == Method::Get && !self.payload.is_empty() {
            url.query_pairs_mut().extend_pairs(self.payload.iter());
        }
        Ok(url)
    }
}

/// Join a possibly-relative target onto the page base URL.
pub fn resolve_target(base: &Url, target: &str) -> Result<Url> {
    let target = target.trim();
    if target.is_empty() {
        return Err(PageWireError::BadConfig("empty request target".into()));
    }
    base.join(target)
        .map_err(|e| PageWireError::BadConfig(format!("invalid target {target}: {e}")))
}
