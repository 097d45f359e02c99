//! libcurl transport: one easy handle per request.
//!
//! # Design
//! `Transport` owns the handle in an `Option` so release is explicit and
//! idempotent: `close` takes it out, `Drop` calls `close`, and a second
//! release is a no-op. The handle's callbacks write into a `Collector` owned
//! by the handle itself. After `perform` the collector is moved out whole and
//! the raw header blocks are parsed by the caller, so nothing is shared or
//! mutated behind a closure.

use std::time::Duration;

use curl::easy::{Easy2, Handler, InfoType, List, WriteError};
use serde::Serialize;
use url::Url;

use crate::error::RequestError;
use crate::http::Method;
use crate::request::Request;

/// `CURLE_FAILED_INIT`, reported when a released handle is used again.
const FAILED_INIT: i32 = 2;

/// Accumulates everything libcurl hands back during one transfer.
#[derive(Debug, Default)]
pub struct Collector {
    body: Vec<u8>,
    response_headers: String,
    request_headers: String,
}

impl Handler for Collector {
    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.body.extend_from_slice(data);
        Ok(data.len())
    }

    fn header(&mut self, data: &[u8]) -> bool {
        self.response_headers.push_str(&String::from_utf8_lossy(data));
        true
    }

    // Only called with verbose enabled; that is how the outgoing header
    // block is captured.
    fn debug(&mut self, kind: InfoType, data: &[u8]) {
        match kind {
            InfoType::HeaderOut => self.request_headers.push_str(&String::from_utf8_lossy(data)),
            InfoType::Text => log::trace!("curl: {}", String::from_utf8_lossy(data).trim_end()),
            _ => {}
        }
    }
}

/// Transfer metadata reported by libcurl after a completed request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransportInfo {
    pub http_code: u32,
    pub effective_url: Option<String>,
    pub content_type: Option<String>,
    pub redirect_count: u32,
    pub total_time: Duration,
    pub namelookup_time: Duration,
    pub connect_time: Duration,
    pub primary_ip: Option<String>,
    pub primary_port: u16,
    pub download_size: f64,
}

impl TransportInfo {
    fn collect(handle: &mut Easy2<Collector>) -> Result<Self, RequestError> {
        Ok(Self {
            http_code: handle.response_code()?,
            effective_url: handle.effective_url()?.map(str::to_string),
            content_type: handle.content_type()?.map(str::to_string),
            redirect_count: handle.redirect_count()?,
            total_time: handle.total_time()?,
            namelookup_time: handle.namelookup_time()?,
            connect_time: handle.connect_time()?,
            primary_ip: handle.primary_ip()?.map(str::to_string),
            primary_port: handle.primary_port()?,
            download_size: handle.download_size()?,
        })
    }

    /// Name/value pairs in a fixed order, for diagnostics.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            ("http_code", self.http_code.to_string()),
            ("url", opt(&self.effective_url)),
            ("content_type", opt(&self.content_type)),
            ("redirect_count", self.redirect_count.to_string()),
            ("total_time", format!("{:.6}", self.total_time.as_secs_f64())),
            ("namelookup_time", format!("{:.6}", self.namelookup_time.as_secs_f64())),
            ("connect_time", format!("{:.6}", self.connect_time.as_secs_f64())),
            ("primary_ip", opt(&self.primary_ip)),
            ("primary_port", self.primary_port.to_string()),
            ("size_download", self.download_size.to_string()),
        ]
    }

    /// Single field by the name used in `fields`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.fields()
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

/// Raw results of one transfer, before header parsing.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub body: Vec<u8>,
    pub request_headers: String,
    pub response_headers: String,
    pub info: TransportInfo,
}

/// Scoped owner of a libcurl easy handle.
pub struct Transport {
    handle: Option<Easy2<Collector>>,
}

impl Transport {
    pub fn open() -> Self {
        Self {
            handle: Some(Easy2::new(Collector::default())),
        }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn handle(&mut self) -> Result<&mut Easy2<Collector>, RequestError> {
        self.handle.as_mut().ok_or_else(|| RequestError::Transport {
            code: FAILED_INIT,
            message: "transport handle already released".to_string(),
        })
    }

    /// Apply the request's options, method, headers and body to the handle.
    pub fn prepare(&mut self, request: &Request, url: &Url) -> Result<(), RequestError> {
        let handle = self.handle()?;
        let options = request.options();

        handle.url(url.as_str())?;
        handle.useragent(&options.user_agent)?;
        handle.follow_location(options.follow_location)?;
        handle.autoreferer(options.auto_referer)?;
        if let Some(max) = options.max_redirects {
            handle.max_redirections(max)?;
        }
        handle.connect_timeout(options.connect_timeout())?;
        handle.timeout(options.timeout())?;
        handle.ssl_verify_peer(options.verify_peer)?;
        handle.ssl_verify_host(options.verify_peer)?;
        handle.verbose(true)?;

        let body = request.encoded_body();
        match request.method() {
            Method::Head => handle.nobody(true)?,
            Method::Get if body.is_none() => handle.get(true)?,
            Method::Post => handle.post(true)?,
            other => handle.custom_request(other.as_str())?,
        }
        match body {
            Some(bytes) => handle.post_fields_copy(&bytes)?,
            None if request.method() == Method::Post => handle.post_fields_copy(&[])?,
            None => {}
        }

        let mut list = List::new();
        for line in request.header_lines() {
            list.append(&line)?;
        }
        handle.http_headers(list)?;
        Ok(())
    }

    /// Run the transfer. The handle stays open; the caller releases it.
    pub fn perform(&mut self) -> Result<Exchange, RequestError> {
        let handle = self.handle()?;
        handle.perform()?;

        let info = TransportInfo::collect(handle)?;
        let collector = std::mem::take(handle.get_mut());
        Ok(Exchange {
            body: collector.body,
            request_headers: collector.request_headers,
            response_headers: collector.response_headers,
            info,
        })
    }

    /// Release the handle. Safe to call any number of times.
    pub fn close(&mut self) {
        if self.handle.take().is_some() {
            log::trace!("transport handle released");
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.close();
    }
}
