use crate::domain::errors::TransportError;
use crate::domain::value_objects::{ParamMap, Url};
use anyhow::{Result, anyhow};
use futures::stream::BoxStream;
use hyper::StatusCode;
use hyper::body::Bytes;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// HTTP methods accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl FromStr for Method {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(anyhow!(
                "Unsupported HTTP method: '{}' (choose from GET, POST, PATCH, DELETE, PUT)",
                other
            )),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which repeatable argument a key/value pair came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Header,
    Query,
}

impl ParamKind {
    /// Separates several pairs inside one argument occurrence
    pub fn pair_separator(&self) -> char {
        match self {
            ParamKind::Header => ',',
            ParamKind::Query => '&',
        }
    }

    /// Separates a key from its value
    pub fn key_delimiter(&self) -> char {
        match self {
            ParamKind::Header => ':',
            ParamKind::Query => '=',
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Header => f.write_str("header"),
            ParamKind::Query => f.write_str("query parameter"),
        }
    }
}

/// Where the request body comes from. At most one source per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BodySource {
    #[default]
    None,
    Raw(String),
    Json(String),
    File(PathBuf),
}

/// Fully resolved outbound request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: ParamMap,
    pub query: ParamMap,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

impl Request {
    /// Target URL with the merged query parameters appended
    pub fn target(&self) -> url::Url {
        self.url.with_query(&self.query)
    }
}

/// Single-pass stream of response body chunks
pub type BodyStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Represents an HTTP response whose body has not been read yet
pub struct Response {
    pub status: StatusCode,
    /// Header lines in the order the server sent them
    pub headers: Vec<(String, String)>,
    pub body: BodyStream,
}

impl Response {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Declared body size; absent, unparseable and zero all mean unknown
    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|len| *len > 0)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
