use crate::application::body_selector::ResolvedBody;
use crate::domain::entities::{Method, Request};
use crate::domain::errors::CliError;
use crate::domain::value_objects::{ParamMap, Url};
use std::time::Duration;

const CONTENT_TYPE: &str = "content-type";

pub struct RequestBuilder {
    method: Method,
    url: Option<Url>,
    headers: ParamMap,
    query: ParamMap,
    body: Option<ResolvedBody>,
    timeout: Option<Duration>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::Get,
            url: None,
            headers: ParamMap::new(),
            query: ParamMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn url(mut self, raw_url: &str) -> Result<Self, CliError> {
        self.url = Some(Url::new(raw_url)?);
        Ok(self)
    }

    /// Headers are expected to be merged already, keys lower-cased
    pub fn headers(mut self, headers: Option<ParamMap>) -> Self {
        self.headers = headers.unwrap_or_default();
        self
    }

    pub fn query(mut self, query: Option<ParamMap>) -> Self {
        self.query = query.unwrap_or_default();
        self
    }

    pub fn body(mut self, body: Option<ResolvedBody>) -> Self {
        self.body = body;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fills in the body's default content-type unless the user set one.
    pub fn build(self) -> Result<Request, CliError> {
        let url = self
            .url
            .ok_or_else(|| CliError::InvalidRequest("URL is required".to_string()))?;

        let mut headers = self.headers;
        let body = self.body.map(|resolved| {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, resolved.content_type);
            }
            resolved.payload
        });

        tracing::debug!(content_type = ?headers.get(CONTENT_TYPE), "request assembled");

        Ok(Request {
            method: self.method,
            url,
            headers,
            query: self.query,
            body,
            timeout: self.timeout,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
