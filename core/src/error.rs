//! Error types for request construction, execution and response decoding.
//!
//! # Design
//! Every failure is returned synchronously to the caller; nothing is retried.
//! A non-2xx status is not an error and never shows up here: the caller reads
//! it from `Response::http_code`.

/// Errors returned by `Request` builders, `Request::run` and `Response` decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The URL is empty, unparsable, has no host or is not http(s).
    /// Raised before any transport handle is created.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// libcurl reported a connection or protocol level failure.
    #[error("curl error ({code}): {message}")]
    Transport { code: i32, message: String },

    /// The response body is not valid JSON.
    #[error("failed to decode json body: {0}")]
    JsonDecode(String),

    /// The method name does not match any supported HTTP verb.
    #[error("invalid http method: {0}")]
    InvalidMethod(String),
}

impl RequestError {
    /// Numeric libcurl code for transport failures.
    pub fn code(&self) -> Option<i32> {
        match self {
            RequestError::Transport { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<curl::Error> for RequestError {
    fn from(err: curl::Error) -> Self {
        let message = match err.extra_description() {
            Some(extra) if !extra.is_empty() => format!("{} ({extra})", err.description()),
            _ => err.description().to_string(),
        };
        RequestError::Transport {
            code: err.code() as i32,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display_carries_code() {
        let err = RequestError::Transport {
            code: 7,
            message: "Couldn't connect to server".to_string(),
        };
        assert_eq!(err.to_string(), "curl error (7): Couldn't connect to server");
        assert_eq!(err.code(), Some(7));
    }

    #[test]
    fn curl_error_converts_with_description() {
        let err: RequestError = curl::Error::new(7).into();
        match err {
            RequestError::Transport { code, message } => {
                assert_eq!(code, 7);
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_transport_errors_have_no_code() {
        assert_eq!(RequestError::InvalidUrl("x".into()).code(), None);
        assert_eq!(RequestError::JsonDecode("x".into()).code(), None);
    }
}
