//! Fluent, blocking HTTP requests on top of libcurl.
//!
//! # Overview
//! Build a `Request` with a constructor per verb, chain setters for headers,
//! body and timeouts, then `run` it. The result is a `Response` holding the
//! raw body, both parsed header blocks and libcurl's transfer metadata.
//!
//! ```no_run
//! use fluent_curl::Request;
//!
//! let mut response = Request::get("https://example.com/api")?
//!     .add_header("Accept", "application/json")
//!     .set_timeout_secs(10)
//!     .run()?;
//! println!("{}", response.http_code());
//! let value = response.to_json()?;
//! # let _ = value;
//! # Ok::<(), fluent_curl::RequestError>(())
//! ```
//!
//! # Design
//! - One request, one libcurl handle, one blocking transfer. `run` consumes
//!   the builder and always releases the handle before returning.
//! - Non-2xx statuses are data, not errors; only transport failures are.
//! - Header names are lowercased everywhere. Lines without a `:` (status and
//!   request lines) are kept under `SCHEME_KEY`.

pub mod error;
pub mod headers;
pub mod http;
pub mod options;
pub mod request;
pub mod response;
pub mod transport;
pub mod validate;

pub use error::RequestError;
pub use headers::{HeaderSet, Headers, SCHEME_KEY};
pub use http::{Body, Endpoint, Method};
pub use options::TransportOptions;
pub use request::Request;
pub use response::{Response, ResponseBody};
pub use transport::{Transport, TransportInfo};
pub use validate::validate_url;
