//! Text decoding of an already buffered response body

use encoding_rs::Encoding;

/// Encoding implied by a response content-type.
///
/// An explicit `charset` parameter wins. Without one, `text/*` bodies are
/// ISO-8859-1 and JSON is UTF-8; anything else has no declared encoding.
pub fn declared_encoding(content_type: Option<&str>) -> Option<String> {
    let content_type = content_type?;
    let mut parts = content_type.split(';');
    let mime = parts.next().unwrap_or_default().trim().to_ascii_lowercase();

    let charset = parts.find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
    });
    if charset.is_some() {
        return charset;
    }

    if mime.contains("text") {
        Some("ISO-8859-1".to_string())
    } else if mime.contains("application/json") {
        Some("utf-8".to_string())
    } else {
        None
    }
}

/// Decodes `bytes` with the declared encoding, replacing undecodable sequences.
/// A missing or unknown label falls back to lossy UTF-8.
pub fn decode(bytes: &[u8], declared: Option<&str>) -> String {
    match declared.and_then(|label| Encoding::for_label(label.trim().as_bytes())) {
        Some(encoding) => {
            let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
            if had_errors {
                tracing::debug!(encoding = encoding.name(), "replaced undecodable bytes");
            }
            text.into_owned()
        }
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}
