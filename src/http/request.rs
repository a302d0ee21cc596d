use std::collections::HashMap;

/// HTTP request methods.
///
/// Only the two methods the server actually handles are represented.
/// Anything else fails parsing and the connection is closed without a
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a file from the document root
    GET,
    /// POST - Submit a body to be logged
    POST,
}

impl Method {
    /// Parses an HTTP method from a string (case-sensitive, per the wire format).
    ///
    /// # Example
    ///
    /// ```
    /// # use portico::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("PUT"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
        }
    }
}

/// Represents a parsed HTTP request from a client.
///
/// The target is kept three ways: `raw_path` exactly as received, and the
/// `path`/`query` halves split at the first `?`. Neither half is
/// percent-decoded; the query is matched by substring downstream.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET or POST)
    pub method: Method,
    /// The request target exactly as it appeared on the request line
    pub raw_path: String,
    /// The target up to (not including) the first `?`
    pub path: String,
    /// Everything after the first `?`, empty when there was none
    pub query: String,
    /// HTTP version (typically "HTTP/1.1")
    pub version: String,
    /// Request headers as key-value pairs
    pub headers: HashMap<String, String>,
    /// Request body for POST requests
    pub body: Vec<u8>,
    /// Whether the raw header block contained the literal
    /// `Accept-Encoding: gzip` (substring match, not a token parse)
    pub accepts_gzip: bool,
}

impl Request {
    /// Retrieves a header value by name, case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// Case-insensitive substring match against the raw query string.
    ///
    /// This is how `download=gzip` and `download=sitezip` are recognized;
    /// `needle` must be lowercase.
    pub fn query_contains(&self, needle: &str) -> bool {
        self.query.to_ascii_lowercase().contains(needle)
    }
}
