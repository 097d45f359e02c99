//! Fluent request builder.
//!
//! # Design
//! `Request` is plain data: URL, method, headers, body and transport options.
//! Builders validate the URL up front so a bad URL fails before any libcurl
//! handle exists. `run` consumes the request, so one builder value drives
//! exactly one transfer, and the handle is released on every exit path.

use std::time::Duration;

use url::Url;

use crate::error::RequestError;
use crate::headers::{HeaderSet, Headers};
use crate::http::{Body, Endpoint, Method};
use crate::options::TransportOptions;
use crate::response::Response;
use crate::transport::Transport;
use crate::validate::{resolve_endpoint, validate_url};

/// A single HTTP request, executed synchronously with libcurl.
#[derive(Debug, Clone)]
pub struct Request {
    url: Url,
    method: Method,
    headers: HeaderSet,
    body: Option<Body>,
    options: TransportOptions,
}

impl Request {
    /// Start a request with `method` against `url`.
    pub fn custom(url: &str, method: Method) -> Result<Self, RequestError> {
        Ok(Self {
            url: validate_url(url)?,
            method,
            headers: HeaderSet::new(),
            body: None,
            options: TransportOptions::default(),
        })
    }

    pub fn get(url: &str) -> Result<Self, RequestError> {
        Self::custom(url, Method::Get)
    }

    pub fn post(url: &str, body: impl Into<Body>) -> Result<Self, RequestError> {
        Ok(Self::custom(url, Method::Post)?.set_body(body))
    }

    pub fn set_url(mut self, url: &str) -> Result<Self, RequestError> {
        self.url = validate_url(url)?;
        Ok(self)
    }

    pub fn set_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Merge `headers` into the request. Names are case-insensitive and the
    /// latest value for a name wins.
    pub fn set_headers<K, V, I>(mut self, headers: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.headers.merge(headers);
        self
    }

    pub fn add_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn set_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn set_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout_ms = whole_millis(timeout);
        self
    }

    pub fn set_timeout_secs(self, seconds: u64) -> Self {
        self.set_timeout(Duration::from_secs(seconds))
    }

    pub fn set_ms_timeout(self, milliseconds: u64) -> Self {
        self.set_timeout(Duration::from_millis(milliseconds))
    }

    pub fn set_connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout_ms = whole_millis(timeout);
        self
    }

    pub fn set_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options.user_agent = user_agent.into();
        self
    }

    pub fn set_follow_location(mut self, follow: bool) -> Self {
        self.options.follow_location = follow;
        self
    }

    /// Replace the transport defaults wholesale.
    pub fn set_options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Body bytes as they will be sent, honoring an explicit content type.
    pub fn encoded_body(&self) -> Option<Vec<u8>> {
        self.body
            .as_ref()
            .map(|body| body.encode(self.headers.get("content-type")))
    }

    /// Header lines for libcurl: the caller's headers plus a content type
    /// implied by the body when the caller did not set one.
    pub fn header_lines(&self) -> Vec<String> {
        let mut headers = self.headers.clone();
        if let Some(content_type) = self.body.as_ref().and_then(Body::default_content_type) {
            if !headers.contains("content-type") {
                headers.insert("content-type", content_type);
            }
        }
        headers.to_lines()
    }

    /// Execute against the configured URL.
    pub fn run(self) -> Result<Response, RequestError> {
        let url = self.url.clone();
        self.execute(url)
    }

    /// Execute against the configured URL with `endpoint` appended.
    pub fn run_endpoint(self, endpoint: impl Into<Endpoint>) -> Result<Response, RequestError> {
        let url = resolve_endpoint(&self.url, &endpoint.into());
        self.execute(url)
    }

    fn execute(self, url: Url) -> Result<Response, RequestError> {
        log::debug!("{} {}", self.method, url);

        let mut transport = Transport::open();
        let result = transport
            .prepare(&self, &url)
            .and_then(|()| transport.perform());
        transport.close();

        let exchange = result.inspect_err(|err| log::debug!("{} {} failed: {err}", self.method, url))?;
        log::debug!(
            "{} {} -> {} in {:?}",
            self.method,
            url,
            exchange.info.http_code,
            exchange.info.total_time
        );

        Ok(Response::new(
            exchange.body,
            Headers::parse(&exchange.request_headers),
            Headers::parse(&exchange.response_headers),
            exchange.info,
        ))
    }
}

/// libcurl reads 0 as "no timeout", so a non-zero duration never rounds down to it.
fn whole_millis(duration: Duration) -> u64 {
    match u64::try_from(duration.as_millis()).unwrap_or(u64::MAX) {
        0 if !duration.is_zero() => 1,
        millis => millis,
    }
}
