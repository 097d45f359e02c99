//! Header blocks: parsing what libcurl reports and merging what the caller sets.
//!
//! # Design
//! Both maps use lowercase names. `Headers` is the read side: a raw header
//! block (one or more, across redirects) becomes name -> ordered values, with
//! colon-free lines such as status lines kept under `SCHEME_KEY`. `HeaderSet`
//! is the write side: at most one value per name, last write wins.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Serialize;

/// Bucket holding lines without a `:` separator (status and request lines).
pub const SCHEME_KEY: &str = "scheme";

/// Parsed header block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Headers(BTreeMap<String, Vec<String>>);

impl Headers {
    /// Parse a raw header block. Never fails; malformed input yields a
    /// partial or empty map.
    pub fn parse(raw: &str) -> Self {
        let mut headers = Headers::default();
        for line in raw.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
            headers.push_line(line);
        }
        headers
    }

    fn push_line(&mut self, line: &str) {
        match line.split_once(':') {
            Some((name, value)) => self
                .0
                .entry(name.trim().to_ascii_lowercase())
                .or_default()
                .push(value.trim().to_string()),
            None => self
                .0
                .entry(SCHEME_KEY.to_string())
                .or_default()
                .push(line.to_string()),
        }
    }

    /// All values for `name`, in the order they were received.
    pub fn get(&self, name: &str) -> &[String] {
        self.0
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).first().map(String::as_str)
    }

    /// Status and request lines, one per header block.
    pub fn scheme(&self) -> &[String] {
        self.get(SCHEME_KEY)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_ascii_lowercase())
    }

    /// Number of distinct names, including the scheme bucket.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Outgoing request headers.
///
/// Names are lowercased on insert. Setting a name that already exists
/// replaces its value in place, so the latest call wins and each name appears
/// exactly once in the lines handed to libcurl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Merge caller-supplied headers on top of the current ones.
    pub fn merge<K, V, I>(&mut self, headers: I)
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (name, value) in headers {
            self.insert(name.as_ref(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `name: value` lines in insertion order, the shape libcurl expects.
    pub fn to_lines(&self) -> Vec<String> {
        self.entries.iter().map(|(k, v)| format!("{k}: {v}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_line_and_repeated_headers() {
        let raw = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n";
        let headers = Headers::parse(raw);

        let mut expected = BTreeMap::new();
        expected.insert("content-type".to_string(), vec!["text/plain".to_string()]);
        expected.insert("set-cookie".to_string(), vec!["a=1".to_string(), "b=2".to_string()]);
        expected.insert("scheme".to_string(), vec!["HTTP/1.1 200 OK".to_string()]);
        assert_eq!(headers.into_inner(), expected);
    }

    #[test]
    fn splits_on_first_colon_only() {
        let headers = Headers::parse("Location: http://example.com:8080/next\r\n");
        assert_eq!(headers.first("location"), Some("http://example.com:8080/next"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let headers = Headers::parse("X-Request-Id: abc\r\n");
        assert_eq!(headers.get("X-REQUEST-ID"), ["abc".to_string()]);
        assert!(headers.contains("x-request-id"));
        assert!(headers.get("missing").is_empty());
    }

    #[test]
    fn mixed_case_names_share_one_key() {
        let headers = Headers::parse("Vary: Accept\r\nvary: Origin\r\nVARY: Cookie\r\n");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("vary"), ["Accept", "Origin", "Cookie"]);
    }

    #[test]
    fn multiple_blocks_keep_every_status_line() {
        let raw = "HTTP/1.1 302 Found\r\nLocation: /next\r\n\r\nHTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n";
        let headers = Headers::parse(raw);
        assert_eq!(headers.scheme(), ["HTTP/1.1 302 Found", "HTTP/1.1 200 OK"]);
        assert_eq!(headers.first("content-length"), Some("0"));
    }

    #[test]
    fn bare_lf_line_endings_are_accepted() {
        let headers = Headers::parse("GET / HTTP/1.1\nHost: localhost\n");
        assert_eq!(headers.scheme(), ["GET / HTTP/1.1"]);
        assert_eq!(headers.first("host"), Some("localhost"));
    }

    #[test]
    fn empty_and_blank_input_yield_empty_map() {
        assert!(Headers::parse("").is_empty());
        assert!(Headers::parse("\r\n\r\n  \n").is_empty());
    }

    #[test]
    fn empty_value_is_kept() {
        let headers = Headers::parse("X-Empty:\r\n");
        assert_eq!(headers.get("x-empty"), [String::new()]);
    }

    #[test]
    fn header_set_last_write_wins_case_insensitively() {
        let mut set = HeaderSet::new();
        set.insert("Content-Type", "text/plain");
        set.insert("content-type", "application/json");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(set.to_lines(), vec!["content-type: application/json".to_string()]);
    }

    #[test]
    fn header_set_merge_keeps_first_position() {
        let mut set = HeaderSet::new();
        set.merge([("Accept", "*/*"), ("X-Trace", "1")]);
        set.merge([("x-trace", "2"), ("Authorization", "Bearer t")]);
        assert_eq!(
            set.to_lines(),
            vec![
                "accept: */*".to_string(),
                "x-trace: 2".to_string(),
                "authorization: Bearer t".to_string(),
            ]
        );
    }

    #[test]
    fn header_set_iter_yields_lowercase_names() {
        let mut set = HeaderSet::new();
        set.insert(" User-Agent ", "fluent");
        let pairs: Vec<_> = set.iter().collect();
        assert_eq!(pairs, vec![("user-agent", "fluent")]);
        assert!(set.contains("user-agent"));
    }
}
