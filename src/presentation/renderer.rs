//! Response rendering
//!
//! The response content-type picks one of two paths. Known binary types are
//! streamed to a fixed file name and only the header block plus a
//! confirmation is printed. Everything else, including a missing
//! content-type, is buffered through a transient file, decoded and printed
//! under a `BODY:` label. Either way the header block comes after the body
//! has been consumed.

use crate::application::decoding::{declared_encoding, decode};
use crate::domain::entities::{BodyStream, Response};
use crate::domain::errors::CliError;
use crate::infrastructure::artifact::FileGuard;
use crate::infrastructure::config::ClientConfig;
use crate::presentation::progress::{ProgressMode, TransferProgress};

use futures::StreamExt;
use hyper::StatusCode;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

pub const BODY_LABEL: &str = "BODY:";

/// Content-types saved to disk instead of printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    Png,
    Jpeg,
    Pdf,
    Webm,
}

impl BinaryKind {
    /// Exact match only; parameters such as `; charset=` disqualify
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/png" => Some(BinaryKind::Png),
            "image/jpeg" => Some(BinaryKind::Jpeg),
            "application/pdf" => Some(BinaryKind::Pdf),
            "video/webm" => Some(BinaryKind::Webm),
            _ => None,
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            BinaryKind::Png => "received_png.png",
            BinaryKind::Jpeg => "received_jpeg.jpeg",
            BinaryKind::Pdf => "received_pdf.pdf",
            BinaryKind::Webm => "received_webm.webm",
        }
    }

    /// Word used in the confirmation line
    pub fn label(&self) -> &'static str {
        match self {
            BinaryKind::Png => "png",
            BinaryKind::Jpeg => "jpeg",
            BinaryKind::Pdf => "pdf",
            BinaryKind::Webm => "video",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPath {
    SaveBinary(BinaryKind),
    BufferText,
}

pub fn classify(content_type: Option<&str>) -> RenderPath {
    content_type
        .and_then(BinaryKind::from_content_type)
        .map_or(RenderPath::BufferText, RenderPath::SaveBinary)
}

/// Reason phrase in the `NOT_FOUND` style; `UNKNOWN` for unregistered codes
pub fn status_text(status: StatusCode) -> String {
    // Older names that the canonical phrases have since replaced
    let legacy = match status.as_u16() {
        203 => Some("NON_AUTHORITATIVE_INFO"),
        413 => Some("REQUEST_ENTITY_TOO_LARGE"),
        414 => Some("REQUEST_URI_TOO_LARGE"),
        416 => Some("REQUESTED_RANGE_NOT_SATISFIABLE"),
        _ => None,
    };
    if let Some(name) = legacy {
        return name.to_string();
    }

    match status.canonical_reason() {
        Some(reason) => reason.to_uppercase().replace([' ', '-'], "_").replace('\'', ""),
        None => "UNKNOWN".to_string(),
    }
}

/// Status line followed by one `name: value` line per header, in order
pub fn write_header_block(
    out: &mut impl Write,
    status: StatusCode,
    headers: &[(String, String)],
) -> std::io::Result<()> {
    writeln!(out, "HTTP/1.1 {} {}", status.as_u16(), status_text(status))?;
    for (name, value) in headers {
        writeln!(out, "{}: {}", name, value)?;
    }
    Ok(())
}

/// What a completed render produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Saved { path: PathBuf, bytes: u64 },
    Printed { bytes: u64 },
}

pub struct ResponseRenderer<W: Write> {
    out: W,
    config: ClientConfig,
}

impl<W: Write> ResponseRenderer<W> {
    pub fn new(out: W, config: ClientConfig) -> Self {
        Self { out, config }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn progress_mode(&self) -> ProgressMode {
        ProgressMode::from_flag(self.config.show_progress)
    }

    /// Consumes the response. When `cancel` fires mid-stream, whatever was
    /// written to disk is removed and nothing is printed.
    pub async fn render(&mut self, response: Response, cancel: &CancellationToken) -> Result<Rendered, CliError> {
        let total = response.content_length();
        let content_type = response.content_type().map(str::to_owned);
        let Response { status, headers, body } = response;

        let route = classify(content_type.as_deref());
        tracing::debug!(?route, content_type = ?content_type, ?total, "rendering response");

        match route {
            RenderPath::SaveBinary(kind) => {
                let output = FileGuard::new(self.config.place(kind.file_name()));
                let bytes = self.stream_to_file(output.path(), body, total, cancel).await?;
                let path = output.keep();

                write_header_block(&mut self.out, status, &headers)?;
                writeln!(
                    self.out,
                    "** The downloaded {} file has been saved in {}",
                    kind.label(),
                    path.display()
                )?;
                Ok(Rendered::Saved { path, bytes })
            }
            RenderPath::BufferText => {
                let mut artifact = FileGuard::new(self.config.transient_artifact());
                let bytes = self.stream_to_file(artifact.path(), body, total, cancel).await?;
                let buffered = tokio::fs::read(artifact.path())
                    .await
                    .map_err(|source| CliError::Output {
                        path: artifact.path().to_path_buf(),
                        source,
                    })?;
                artifact.discard();

                let encoding = declared_encoding(content_type.as_deref());
                let text = decode(&buffered, encoding.as_deref());

                write_header_block(&mut self.out, status, &headers)?;
                writeln!(self.out, "{}", BODY_LABEL)?;
                writeln!(self.out, "{}", text)?;
                Ok(Rendered::Printed { bytes })
            }
        }
    }

    async fn stream_to_file(
        &self,
        path: &Path,
        mut body: BodyStream,
        total: Option<u64>,
        cancel: &CancellationToken,
    ) -> Result<u64, CliError> {
        let output_error = |source: std::io::Error| CliError::Output {
            path: path.to_path_buf(),
            source,
        };
        let mut file = tokio::fs::File::create(path).await.map_err(output_error)?;
        let progress = TransferProgress::start(total, self.progress_mode());

        let pumped: Result<(), CliError> = async {
            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(CliError::Interrupted),
                    next = body.next() => next,
                };
                let Some(chunk) = next else {
                    break;
                };
                let chunk = chunk?;
                file.write_all(&chunk).await.map_err(output_error)?;
                progress.advance(chunk.len() as u64);
            }
            file.flush().await.map_err(output_error)
        }
        .await;

        match pumped {
            Ok(()) => {
                progress.finish();
                tracing::debug!(path = %path.display(), bytes = progress.position(), "response body stored");
                Ok(progress.position())
            }
            Err(e) => {
                progress.abandon();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::TransportError;
    use crate::infrastructure::config::TRANSIENT_ARTIFACT;
    use futures::stream;
    use hyper::body::Bytes;
    use std::time::Duration;
    use tempfile::TempDir;

    fn response(status: u16, headers: &[(&str, &str)], body: BodyStream) -> Response {
        Response {
            status: StatusCode::from_u16(status).unwrap(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body,
        }
    }

    fn chunks(parts: Vec<Vec<u8>>) -> BodyStream {
        stream::iter(parts.into_iter().map(|p| Ok(Bytes::from(p)))).boxed()
    }

    fn renderer(dir: &TempDir) -> ResponseRenderer<Vec<u8>> {
        let config = ClientConfig::new(None, Some(dir.path().to_path_buf())).show_progress(false);
        ResponseRenderer::new(Vec::new(), config)
    }

    fn cancel_after(token: &CancellationToken, delay: Duration) {
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trigger.cancel();
        });
    }

    #[test]
    fn classifies_known_binaries_exactly() {
        assert_eq!(classify(Some("image/png")), RenderPath::SaveBinary(BinaryKind::Png));
        assert_eq!(classify(Some("video/webm")), RenderPath::SaveBinary(BinaryKind::Webm));
        assert_eq!(classify(Some("image/png; q=1")), RenderPath::BufferText);
        assert_eq!(classify(Some("image/gif")), RenderPath::BufferText);
        assert_eq!(classify(None), RenderPath::BufferText);
    }

    #[test]
    fn status_text_is_upper_snake_case() {
        assert_eq!(status_text(StatusCode::OK), "OK");
        assert_eq!(status_text(StatusCode::NOT_FOUND), "NOT_FOUND");
        assert_eq!(status_text(StatusCode::INTERNAL_SERVER_ERROR), "INTERNAL_SERVER_ERROR");
        assert_eq!(status_text(StatusCode::IM_A_TEAPOT), "IM_A_TEAPOT");
        assert_eq!(status_text(StatusCode::from_u16(599).unwrap()), "UNKNOWN");
    }

    #[test]
    fn status_text_keeps_legacy_names() {
        assert_eq!(status_text(StatusCode::NON_AUTHORITATIVE_INFORMATION), "NON_AUTHORITATIVE_INFO");
        assert_eq!(status_text(StatusCode::PAYLOAD_TOO_LARGE), "REQUEST_ENTITY_TOO_LARGE");
        assert_eq!(status_text(StatusCode::URI_TOO_LONG), "REQUEST_URI_TOO_LARGE");
        assert_eq!(status_text(StatusCode::RANGE_NOT_SATISFIABLE), "REQUESTED_RANGE_NOT_SATISFIABLE");
    }

    #[test]
    fn header_block_format() {
        let mut out = Vec::new();
        let headers = vec![
            ("content-type".to_string(), "text/html".to_string()),
            ("x-id".to_string(), "7".to_string()),
        ];
        write_header_block(&mut out, StatusCode::CREATED, &headers).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "HTTP/1.1 201 CREATED\ncontent-type: text/html\nx-id: 7\n"
        );
    }

    #[tokio::test]
    async fn png_is_saved_without_body_label() {
        let dir = TempDir::new().unwrap();
        let body = chunks(vec![vec![0xAB; 10_000]; 50]);
        let resp = response(200, &[("content-type", "image/png"), ("content-length", "500000")], body);

        let mut renderer = renderer(&dir);
        let rendered = renderer.render(resp, &CancellationToken::new()).await.unwrap();

        let saved = dir.path().join("received_png.png");
        assert_eq!(rendered, Rendered::Saved { path: saved.clone(), bytes: 500_000 });
        assert_eq!(std::fs::metadata(&saved).unwrap().len(), 500_000);

        let printed = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(printed.starts_with("HTTP/1.1 200 OK\ncontent-type: image/png\ncontent-length: 500000\n"));
        assert!(printed.ends_with(&format!(
            "** The downloaded png file has been saved in {}\n",
            saved.display()
        )));
        assert!(!printed.contains(BODY_LABEL));
    }

    #[tokio::test]
    async fn webm_without_length_is_still_written() {
        let dir = TempDir::new().unwrap();
        let resp = response(200, &[("content-type", "video/webm")], chunks(vec![vec![1, 2, 3]]));

        let mut renderer = renderer(&dir);
        renderer.render(resp, &CancellationToken::new()).await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("received_webm.webm")).unwrap(), vec![1, 2, 3]);
        let printed = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(printed.contains("** The downloaded video file has been saved in"));
    }

    #[tokio::test]
    async fn text_is_buffered_decoded_and_printed() {
        let dir = TempDir::new().unwrap();
        let resp = response(
            200,
            &[("content-type", "text/plain"), ("content-length", "11")],
            chunks(vec![b"hello ".to_vec(), b"world".to_vec()]),
        );

        let mut renderer = renderer(&dir);
        let rendered = renderer.render(resp, &CancellationToken::new()).await.unwrap();

        assert_eq!(rendered, Rendered::Printed { bytes: 11 });
        assert_eq!(
            String::from_utf8(renderer.into_inner()).unwrap(),
            "HTTP/1.1 200 OK\ncontent-type: text/plain\ncontent-length: 11\nBODY:\nhello world\n"
        );
        assert!(!dir.path().join(TRANSIENT_ARTIFACT).exists());
    }

    #[tokio::test]
    async fn missing_content_type_takes_text_path() {
        let dir = TempDir::new().unwrap();
        let resp = response(404, &[], chunks(vec![vec![0x6E, 0x6F, 0xFF]]));

        let mut renderer = renderer(&dir);
        renderer.render(resp, &CancellationToken::new()).await.unwrap();

        assert_eq!(
            String::from_utf8(renderer.into_inner()).unwrap(),
            "HTTP/1.1 404 NOT_FOUND\nBODY:\nno\u{FFFD}\n"
        );
        assert!(!dir.path().join(TRANSIENT_ARTIFACT).exists());
    }

    #[tokio::test]
    async fn declared_charset_is_used() {
        let dir = TempDir::new().unwrap();
        let resp = response(
            200,
            &[("content-type", "text/plain; charset=utf-8")],
            chunks(vec!["naïve".as_bytes().to_vec()]),
        );

        let mut renderer = renderer(&dir);
        renderer.render(resp, &CancellationToken::new()).await.unwrap();
        let printed = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(printed.ends_with("BODY:\nnaïve\n"));
    }

    #[tokio::test]
    async fn interrupt_mid_stream_leaves_no_artifact() {
        let dir = TempDir::new().unwrap();
        let body = stream::iter(vec![Ok(Bytes::from(vec![b'x'; 4096]))])
            .chain(stream::pending())
            .boxed();
        let resp = response(200, &[("content-type", "application/octet-stream")], body);

        let cancel = CancellationToken::new();
        cancel_after(&cancel, Duration::from_millis(50));

        let mut renderer = renderer(&dir);
        let err = renderer.render(resp, &cancel).await.unwrap_err();

        assert!(matches!(err, CliError::Interrupted));
        assert!(!dir.path().join(TRANSIENT_ARTIFACT).exists());
        assert!(renderer.into_inner().is_empty());
    }

    #[tokio::test]
    async fn interrupt_during_binary_save_removes_partial_file() {
        let dir = TempDir::new().unwrap();
        let body = stream::iter(vec![Ok(Bytes::from(vec![0u8; 1024]))])
            .chain(stream::pending())
            .boxed();
        let resp = response(200, &[("content-type", "application/pdf"), ("content-length", "9000")], body);

        let cancel = CancellationToken::new();
        cancel_after(&cancel, Duration::from_millis(50));

        let mut renderer = renderer(&dir);
        let err = renderer.render(resp, &cancel).await.unwrap_err();

        assert!(matches!(err, CliError::Interrupted));
        assert!(!dir.path().join("received_pdf.pdf").exists());
    }

    #[tokio::test]
    async fn stream_failure_cleans_up_and_propagates() {
        let dir = TempDir::new().unwrap();
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(TransportError::Timeout),
        ])
        .boxed();
        let resp = response(200, &[("content-type", "text/html")], body);

        let mut renderer = renderer(&dir);
        let err = renderer.render(resp, &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, CliError::Timeout));
        assert!(!dir.path().join(TRANSIENT_ARTIFACT).exists());
        assert!(renderer.into_inner().is_empty());
    }
}
