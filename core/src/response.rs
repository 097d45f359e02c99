//! Completed request: body, parsed header blocks and transfer metadata.

use std::borrow::Cow;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::RequestError;
use crate::headers::Headers;
use crate::transport::TransportInfo;

/// Response body, either as received or after an explicit JSON decode.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Raw(Vec<u8>),
    Json(Value),
}

/// Request and response header blocks together.
#[derive(Debug, Clone, Serialize)]
pub struct AllHeaders<'a> {
    pub request: &'a Headers,
    pub response: &'a Headers,
}

/// Result of one executed request.
///
/// Immutable apart from the debug flag and `to_json`, which swaps the raw
/// body for its decoded value.
#[derive(Debug, Clone)]
pub struct Response {
    body: ResponseBody,
    request_headers: Headers,
    response_headers: Headers,
    info: TransportInfo,
    debug: bool,
}

impl Response {
    pub fn new(
        body: Vec<u8>,
        request_headers: Headers,
        response_headers: Headers,
        info: TransportInfo,
    ) -> Self {
        Self {
            body: ResponseBody::Raw(body),
            request_headers,
            response_headers,
            info,
            debug: false,
        }
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Body as text: the raw bytes (lossy UTF-8) or the decoded JSON re-serialized.
    pub fn text(&self) -> Cow<'_, str> {
        match &self.body {
            ResponseBody::Raw(bytes) => String::from_utf8_lossy(bytes),
            ResponseBody::Json(value) => Cow::Owned(value.to_string()),
        }
    }

    /// Decode the body as JSON and keep the decoded value in place.
    ///
    /// On failure the raw body is left untouched. Calling again after a
    /// successful decode returns the stored value.
    pub fn to_json(&mut self) -> Result<&Value, RequestError> {
        if let ResponseBody::Raw(bytes) = &self.body {
            let value: Value = serde_json::from_slice(bytes)
                .map_err(|e| RequestError::JsonDecode(e.to_string()))?;
            self.body = ResponseBody::Json(value);
        }
        match &self.body {
            ResponseBody::Json(value) => Ok(value),
            ResponseBody::Raw(_) => Err(RequestError::JsonDecode("body was not decoded".to_string())),
        }
    }

    /// Deserialize the body into `T` without changing the stored body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        let decoded = match &self.body {
            ResponseBody::Raw(bytes) => serde_json::from_slice(bytes),
            ResponseBody::Json(value) => T::deserialize(value),
        };
        decoded.map_err(|e| RequestError::JsonDecode(e.to_string()))
    }

    pub fn request_headers(&self) -> &Headers {
        &self.request_headers
    }

    pub fn response_headers(&self) -> &Headers {
        &self.response_headers
    }

    pub fn all_headers(&self) -> AllHeaders<'_> {
        AllHeaders {
            request: &self.request_headers,
            response: &self.response_headers,
        }
    }

    /// Values of a header that was sent.
    pub fn header_request(&self, name: &str) -> &[String] {
        self.request_headers.get(name)
    }

    /// Values of a header that was received.
    pub fn header_response(&self, name: &str) -> &[String] {
        self.response_headers.get(name)
    }

    pub fn http_code(&self) -> u32 {
        self.info.http_code
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.info.http_code)
    }

    pub fn info(&self) -> &TransportInfo {
        &self.info
    }

    /// Make `Display` render `debug_info` instead of the body.
    pub fn set_debug(&mut self, debug: bool) -> &mut Self {
        self.debug = debug;
        self
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Human-readable dump of both header blocks, the transfer metadata and the body.
    pub fn debug_info(&self) -> String {
        let mut out = String::from("# Headers-request\n");
        write_headers(&mut out, &self.request_headers);
        out.push_str("\n# Headers-response\n");
        write_headers(&mut out, &self.response_headers);
        out.push_str("\n# Curl information\n");
        for (key, value) in self.info.fields() {
            out.push_str(&format!("{key}: {value}\n"));
        }
        out.push_str("\n# Body\n");
        out.push_str(&self.text());
        out
    }
}

fn write_headers(out: &mut String, headers: &Headers) {
    for (name, values) in headers {
        out.push_str(&format!("{name}: {}\n", values.join(",")));
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.debug {
            f.write_str(&self.debug_info())
        } else {
            f.write_str(&self.text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: &str) -> Response {
        Response::new(
            body.as_bytes().to_vec(),
            Headers::parse("GET /todos HTTP/1.1\r\nHost: localhost\r\nAccept: */*\r\n"),
            Headers::parse("HTTP/1.1 200 OK\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n"),
            TransportInfo {
                http_code: 200,
                ..TransportInfo::default()
            },
        )
    }

    #[test]
    fn to_json_replaces_body() {
        let mut resp = response(r#"{"a":1}"#);
        assert_eq!(resp.to_json().unwrap(), &json!({"a": 1}));
        assert_eq!(resp.body(), &ResponseBody::Json(json!({"a": 1})));
        // second call returns the stored value
        assert_eq!(resp.to_json().unwrap(), &json!({"a": 1}));
    }

    #[test]
    fn to_json_failure_keeps_raw_body() {
        let mut resp = response("not json");
        let err = resp.to_json().unwrap_err();
        assert!(matches!(err, RequestError::JsonDecode(_)));
        assert_eq!(resp.body(), &ResponseBody::Raw(b"not json".to_vec()));
        assert_eq!(resp.text(), "not json");
    }

    #[test]
    fn typed_json_works_before_and_after_decode() {
        #[derive(serde::Deserialize, PartialEq, Debug)]
        struct Item {
            a: u32,
        }
        let mut resp = response(r#"{"a":7}"#);
        assert_eq!(resp.json::<Item>().unwrap(), Item { a: 7 });
        resp.to_json().unwrap();
        assert_eq!(resp.json::<Item>().unwrap(), Item { a: 7 });
    }

    #[test]
    fn header_accessors() {
        let resp = response("");
        assert_eq!(resp.header_response("Set-Cookie"), ["a=1", "b=2"]);
        assert_eq!(resp.header_request("accept"), ["*/*"]);
        assert!(resp.header_response("missing").is_empty());
        let all = resp.all_headers();
        assert_eq!(all.request.scheme(), ["GET /todos HTTP/1.1"]);
        assert_eq!(all.response.scheme(), ["HTTP/1.1 200 OK"]);
    }

    #[test]
    fn status_is_reported_not_raised() {
        let resp = Response::new(
            b"gone".to_vec(),
            Headers::default(),
            Headers::default(),
            TransportInfo {
                http_code: 410,
                ..TransportInfo::default()
            },
        );
        assert_eq!(resp.http_code(), 410);
        assert!(!resp.is_success());
    }

    #[test]
    fn display_switches_on_debug_flag() {
        let mut resp = response("hello");
        assert_eq!(resp.to_string(), "hello");

        resp.set_debug(true);
        assert!(resp.is_debug());
        let dump = resp.to_string();
        assert!(dump.starts_with("# Headers-request\n"));
        assert!(dump.contains("accept: */*\n"));
        assert!(dump.contains("# Headers-response\nscheme: HTTP/1.1 200 OK\nset-cookie: a=1,b=2\n"));
        assert!(dump.contains("# Curl information\nhttp_code: 200\n"));
        assert!(dump.ends_with("# Body\nhello"));
    }
}
