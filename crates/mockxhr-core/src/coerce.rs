//! Response-type coercion
//!
//! Converts the raw response bytes into the representation the caller
//! requested. Coercion never raises an error: a payload that cannot be
//! interpreted as the requested kind coerces to [`ResponseBody::Null`].

use core::fmt;
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Response Kind
// ----------------------------------------------------------------------------

/// Caller-selected representation for the completed response body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKind {
    /// Empty-string kind, treated as text
    #[default]
    Default,
    Text,
    Json,
    ArrayBuffer,
    Blob,
    Document,
}

impl ResponseKind {
    /// Kind identifier as exposed on the native property surface
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseKind::Default => "",
            ResponseKind::Text => "text",
            ResponseKind::Json => "json",
            ResponseKind::ArrayBuffer => "arraybuffer",
            ResponseKind::Blob => "blob",
            ResponseKind::Document => "document",
        }
    }

    /// Parse a kind identifier; unknown identifiers are `None`
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "" => Some(ResponseKind::Default),
            "text" => Some(ResponseKind::Text),
            "json" => Some(ResponseKind::Json),
            "arraybuffer" => Some(ResponseKind::ArrayBuffer),
            "blob" => Some(ResponseKind::Blob),
            "document" => Some(ResponseKind::Document),
            _ => None,
        }
    }

    /// Whether the coerced value is textual (default and text kinds)
    pub fn is_textual(self) -> bool {
        matches!(self, ResponseKind::Default | ResponseKind::Text)
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ----------------------------------------------------------------------------
// Coerced Representations
// ----------------------------------------------------------------------------

/// Opaque binary container (blob kind)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Vec<u8>,
    content_type: String,
}

impl Blob {
    pub fn new(bytes: Vec<u8>, content_type: &str) -> Self {
        Self {
            bytes,
            content_type: content_type.to_owned(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// Parsed structured-markup tree (document kind)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupDocument {
    html: String,
}

impl MarkupDocument {
    /// Serialized form of the parsed tree (normalized by the parser)
    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Tagged union over the response-kind variants
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Coercion failed for the requested kind, or no response yet
    Null,
    Text(String),
    Json(serde_json::Value),
    Buffer(Vec<u8>),
    Blob(Blob),
    Document(MarkupDocument),
}

impl ResponseBody {
    pub fn is_null(&self) -> bool {
        matches!(self, ResponseBody::Null)
    }

    /// Text view, available for the text variant only
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Coercion
// ----------------------------------------------------------------------------

/// Coerce raw response bytes into the requested kind.
///
/// Failures are swallowed: the only failure signal is [`ResponseBody::Null`].
pub fn coerce(raw: &[u8], kind: ResponseKind, content_type: Option<&str>) -> ResponseBody {
    match kind {
        ResponseKind::Default | ResponseKind::Text => {
            ResponseBody::Text(String::from_utf8_lossy(raw).into_owned())
        }
        ResponseKind::ArrayBuffer => ResponseBody::Buffer(raw.to_vec()),
        ResponseKind::Blob => ResponseBody::Blob(Blob::new(
            raw.to_vec(),
            content_type.unwrap_or("application/octet-stream"),
        )),
        ResponseKind::Json => match core::str::from_utf8(raw) {
            Ok(text) => match serde_json::from_str(text) {
                Ok(value) => ResponseBody::Json(value),
                Err(_) => ResponseBody::Null,
            },
            Err(_) => ResponseBody::Null,
        },
        ResponseKind::Document => parse_document(raw),
    }
}

/// Parse the payload as a markup document; unparseable payloads are `Null`.
///
/// The HTML5 parser is forgiving, so "unparseable" means bytes that are not
/// valid UTF-8 text or input the parser reports errors for.
fn parse_document(raw: &[u8]) -> ResponseBody {
    let text = match core::str::from_utf8(raw) {
        Ok(text) => text,
        Err(_) => return ResponseBody::Null,
    };

    let document = scraper::Html::parse_document(text);
    if !document.errors.is_empty() {
        return ResponseBody::Null;
    }

    ResponseBody::Document(MarkupDocument {
        html: document.root_element().html(),
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_identifiers_round_trip() {
        for kind in [
            ResponseKind::Default,
            ResponseKind::Text,
            ResponseKind::Json,
            ResponseKind::ArrayBuffer,
            ResponseKind::Blob,
            ResponseKind::Document,
        ] {
            assert_eq!(ResponseKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ResponseKind::parse("msgpack"), None);
    }

    #[test]
    fn test_text_coercion_never_fails() {
        // Invalid UTF-8 decodes lossily instead of failing
        let body = coerce(&[0xFF, 0xFE, b'h', b'i'], ResponseKind::Text, None);
        match body {
            ResponseBody::Text(text) => assert!(text.ends_with("hi")),
            other => panic!("Expected Text, got {:?}", other),
        }
    }

    #[test]
    fn test_arraybuffer_always_succeeds() {
        let raw = vec![0u8, 1, 2, 0xFF];
        assert_eq!(
            coerce(&raw, ResponseKind::ArrayBuffer, None),
            ResponseBody::Buffer(raw)
        );
    }

    #[test]
    fn test_blob_keeps_content_type() {
        let body = coerce(b"\x00\x01", ResponseKind::Blob, Some("image/png"));
        match body {
            ResponseBody::Blob(blob) => {
                assert_eq!(blob.bytes(), b"\x00\x01");
                assert_eq!(blob.content_type(), "image/png");
            }
            other => panic!("Expected Blob, got {:?}", other),
        }
    }

    #[test]
    fn test_json_coercion() {
        let body = coerce(br#"{"ok":true}"#, ResponseKind::Json, None);
        match body {
            ResponseBody::Json(value) => assert_eq!(value["ok"], serde_json::json!(true)),
            other => panic!("Expected Json, got {:?}", other),
        }
    }

    #[test]
    fn test_json_parse_failure_is_null() {
        assert!(coerce(b"not json", ResponseKind::Json, None).is_null());
        assert!(coerce(&[0xFF, 0xFF], ResponseKind::Json, None).is_null());
    }

    #[test]
    fn test_document_coercion() {
        let body = coerce(
            b"<html><body><p>hi</p></body></html>",
            ResponseKind::Document,
            Some("text/html"),
        );
        match body {
            ResponseBody::Document(doc) => assert!(doc.html().contains("<p>hi</p>")),
            other => panic!("Expected Document, got {:?}", other),
        }
    }

    #[test]
    fn test_document_on_binary_payload_is_null_not_error() {
        let body = coerce(&[0x89, 0x50, 0x4E, 0x47, 0xFF], ResponseKind::Document, None);
        assert!(body.is_null());
    }
}
