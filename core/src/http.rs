//! Plain data types describing the outgoing request.
//!
//! # Design
//! `Method`, `Body` and `Endpoint` carry no transport state. The request
//! builder stores them as values and only hands them to libcurl when the
//! request runs, so they can be inspected and tested without any network.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::RequestError;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RequestError;

    /// Case-insensitive; anything outside the six supported verbs is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            _ => Err(RequestError::InvalidMethod(s.to_string())),
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Sent verbatim.
    Bytes(Vec<u8>),
    /// Serialized with `serde_json`.
    Json(Value),
    /// Key/value fields, urlencoded unless the content type says JSON.
    Form(Vec<(String, String)>),
}

impl Body {
    /// Build a form body from any iterator of pairs.
    pub fn form<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Body::Form(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Content type implied by the body variant, if any.
    pub fn default_content_type(&self) -> Option<&'static str> {
        match self {
            Body::Bytes(_) => None,
            Body::Json(_) => Some(CONTENT_TYPE_JSON),
            Body::Form(_) => Some(CONTENT_TYPE_FORM),
        }
    }

    /// Encode for the wire. `content_type` is the caller's explicit header,
    /// which switches form fields to a JSON object when it is `application/json`.
    pub fn encode(&self, content_type: Option<&str>) -> Vec<u8> {
        match self {
            Body::Bytes(bytes) => bytes.clone(),
            Body::Json(value) => value.to_string().into_bytes(),
            Body::Form(fields) if is_json(content_type) => {
                let object: Map<String, Value> = fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                Value::Object(object).to_string().into_bytes()
            }
            Body::Form(fields) => url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(fields)
                .finish()
                .into_bytes(),
        }
    }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().eq_ignore_ascii_case(CONTENT_TYPE_JSON))
        .unwrap_or(false)
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Bytes(s.into_bytes())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

/// Suffix appended to the request URL at run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Literal string appended as-is, e.g. `/users/1`.
    Path(String),
    /// Query parameters, urlencoded into `?k=v&...`.
    Query(Vec<(String, String)>),
}

impl Endpoint {
    pub fn query<K, V, I>(params: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Endpoint::Query(params.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<&str> for Endpoint {
    fn from(s: &str) -> Self {
        Endpoint::Path(s.to_string())
    }
}

impl From<String> for Endpoint {
    fn from(s: String) -> Self {
        Endpoint::Path(s)
    }
}
