//! URL validation and endpoint resolution.

use url::Url;

use crate::error::RequestError;
use crate::http::Endpoint;

/// Parse and check a request URL.
///
/// Rejects empty input, anything `url` cannot parse as an absolute URL, and
/// URLs that are not `http`/`https` or carry no host.
pub fn validate_url(raw: &str) -> Result<Url, RequestError> {
    let invalid = || RequestError::InvalidUrl(raw.to_string());

    if raw.trim().is_empty() {
        return Err(invalid());
    }
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid()),
    }
}

/// Append `endpoint` to `base`.
///
/// If the joined string is not a valid URL the base URL is used unchanged.
pub fn resolve_endpoint(base: &Url, endpoint: &Endpoint) -> Url {
    let joined = match endpoint {
        Endpoint::Path(path) => format!("{}{path}", join_base(base, path)),
        Endpoint::Query(params) if params.is_empty() => return base.clone(),
        Endpoint::Query(params) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params)
                .finish();
            let separator = if base.query().is_some() { '&' } else { '?' };
            format!("{}{separator}{query}", base.as_str())
        }
    };

    match validate_url(&joined) {
        Ok(url) => url,
        Err(_) => {
            log::warn!("endpoint {endpoint:?} does not form a valid url with {base}, using base url");
            base.clone()
        }
    }
}

/// `Url` always serializes an empty path as `/`; drop it so a leading `/`
/// on the endpoint does not double up.
fn join_base<'a>(base: &'a Url, path: &str) -> &'a str {
    let bare = base.path() == "/" && base.query().is_none() && base.fragment().is_none();
    if bare && path.starts_with('/') {
        base.as_str().trim_end_matches('/')
    } else {
        base.as_str()
    }
}
