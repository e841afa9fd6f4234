use crate::domain::entities::BodySource;
use crate::domain::errors::{CliError, Warning};
use hyper::body::Bytes;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Request payload together with the content-type its source implies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBody {
    pub payload: Bytes,
    pub content_type: &'static str,
    pub warning: Option<Warning>,
}

/// Turns the selected body source into bytes.
///
/// Inline data and JSON are sent verbatim even when they do not parse; only a
/// missing body file is fatal.
pub struct BodySelector;

impl BodySelector {
    pub async fn resolve(source: &BodySource) -> Result<Option<ResolvedBody>, CliError> {
        let resolved = match source {
            BodySource::None => return Ok(None),
            BodySource::Raw(data) => ResolvedBody {
                payload: Bytes::from(data.clone()),
                content_type: FORM_CONTENT_TYPE,
                warning: (!is_url_encoded(data)).then_some(Warning::NotUrlEncoded),
            },
            BodySource::Json(json) => ResolvedBody {
                payload: Bytes::from(json.clone()),
                content_type: JSON_CONTENT_TYPE,
                warning: serde_json::from_str::<Value>(json)
                    .err()
                    .map(|_| Warning::NotJson),
            },
            BodySource::File(path) => ResolvedBody {
                payload: read_body_file(path).await?,
                content_type: FILE_CONTENT_TYPE,
                warning: None,
            },
        };
        tracing::debug!(
            bytes = resolved.payload.len(),
            content_type = resolved.content_type,
            "resolved request body"
        );
        Ok(Some(resolved))
    }
}

/// Strict form syntax: every `&`-separated field needs a `=`.
/// An empty body has no fields and passes.
fn is_url_encoded(body: &str) -> bool {
    body.is_empty() || body.split('&').all(|field| field.contains('='))
}

/// Async so that an interrupt can abandon a read that never finishes, e.g. from a FIFO
async fn read_body_file(path: &Path) -> Result<Bytes, CliError> {
    tokio::fs::read(path).await.map(Bytes::from).map_err(|source| match source.kind() {
        ErrorKind::NotFound => CliError::FileNotFound(path.to_path_buf()),
        _ => CliError::BodyFile {
            path: path.to_path_buf(),
            source,
        },
    })
}
