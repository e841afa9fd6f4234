use crate::domain::errors::CliError;
use indexmap::IndexMap;

/// Represents a validated absolute http(s) URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url(pub url::Url);

impl Url {
    /// Creates a new Url with validation
    ///
    /// The URL must carry a scheme, an empty authority separator and a host,
    /// i.e. at least three `/`-separated segments, and must use http or https.
    pub fn new(url: &str) -> Result<Self, CliError> {
        if url.split('/').count() < 3 {
            return Err(CliError::MalformedUrl);
        }
        let parsed = url::Url::parse(url).map_err(|_| CliError::MalformedUrl)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CliError::MalformedUrl);
        }
        match parsed.host_str() {
            Some(host) if !host.is_empty() => Ok(Url(parsed)),
            _ => Err(CliError::MalformedUrl),
        }
    }

    /// Returns a copy with `params` appended to whatever query is already present
    pub fn with_query(&self, params: &ParamMap) -> url::Url {
        let mut target = self.0.clone();
        if !params.is_empty() {
            let mut pairs = target.query_pairs_mut();
            for (key, value) in params.iter() {
                pairs.append_pair(key, value);
            }
        }
        target
    }
}

/// Insertion-ordered map with unique keys, used for headers and query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap(IndexMap<String, String>);

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites, returning the value that was replaced.
    /// An overwritten key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ParamMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
