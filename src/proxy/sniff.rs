//! Deterministic content-type detection for response bodies.
//!
//! Looks at no more than the first 512 bytes and always returns a content type.

const SNIFF_LEN: usize = 512;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"BM", "image/bmp"),
    (b"\x1f\x8b\x08", "application/x-gzip"),
    (b"PK\x03\x04", "application/zip"),
    (b"Rar!\x1a\x07", "application/x-rar-compressed"),
    (b"\x00asm", "application/wasm"),
    (b"OggS\x00", "application/ogg"),
];

/// Classifies `data` by its leading bytes.
#[must_use]
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    if data.starts_with(b"\xef\xbb\xbf") {
        return TEXT_PLAIN;
    }
    if data.starts_with(b"\xfe\xff") {
        return "text/plain; charset=utf-16be";
    }
    if data.starts_with(b"\xff\xfe") {
        return "text/plain; charset=utf-16le";
    }

    let start = data
        .iter()
        .position(|byte| !is_whitespace(*byte))
        .unwrap_or(data.len());
    let trimmed = &data[start..];

    if HTML_TAGS.iter().any(|tag| is_html_tag(trimmed, tag)) {
        return "text/html; charset=utf-8";
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    if let Some(&(_, content_type)) = SIGNATURES.iter().find(|(sig, _)| data.starts_with(sig)) {
        return content_type;
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return "image/webp";
    }

    if data.iter().any(|byte| is_binary(*byte)) {
        return OCTET_STREAM;
    }
    if matches!(trimmed.first(), Some(b'{' | b'[')) && is_utf8_prefix(data) {
        return "application/json";
    }
    TEXT_PLAIN
}

/// Valid UTF-8, allowing a multibyte character cut off by the sniff window.
fn is_utf8_prefix(data: &[u8]) -> bool {
    std::str::from_utf8(data).map_or_else(|err| err.error_len().is_none(), |_| true)
}

const fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b'\t' | b'\n' | b'\x0c' | b'\r' | b' ')
}

/// Control bytes that never appear in text.
const fn is_binary(byte: u8) -> bool {
    matches!(byte, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}

/// Case-insensitive tag match that must be followed by a space or `>`.
fn is_html_tag(data: &[u8], tag: &[u8]) -> bool {
    data.len() > tag.len()
        && data[..tag.len()].eq_ignore_ascii_case(tag)
        && matches!(data[tag.len()], b' ' | b'>')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_markup() {
        assert_eq!(
            detect_content_type(b"  <!doctype html><html></html>"),
            "text/html; charset=utf-8"
        );
        assert_eq!(detect_content_type(b"<p>hi</p>"), "text/html; charset=utf-8");
        assert_eq!(
            detect_content_type(b"<?xml version=\"1.0\"?><a/>"),
            "text/xml; charset=utf-8"
        );
        assert_eq!(detect_content_type(b"<pre>"), TEXT_PLAIN);
    }

    #[test]
    fn test_detects_json_and_text() {
        assert_eq!(detect_content_type(b"{\"a\": 1}"), "application/json");
        assert_eq!(detect_content_type(b"\n[1, 2]"), "application/json");
        assert_eq!(detect_content_type(b"pong"), TEXT_PLAIN);
        assert_eq!(detect_content_type(b""), TEXT_PLAIN);
        assert_eq!(detect_content_type(b"\xef\xbb\xbfhello"), TEXT_PLAIN);
    }

    #[test]
    fn test_detects_binary() {
        assert_eq!(
            detect_content_type(b"\x89PNG\r\n\x1a\n\x00\x00"),
            "image/png"
        );
        assert_eq!(detect_content_type(b"%PDF-1.7"), "application/pdf");
        assert_eq!(
            detect_content_type(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
            "image/webp"
        );
        assert_eq!(detect_content_type(&[0x00, 0x01, 0x02]), OCTET_STREAM);
        assert_eq!(
            detect_content_type(&[0xff, 0xfe, 0xfd]),
            "text/plain; charset=utf-16le"
        );
    }

    #[test]
    fn test_only_prefix_is_inspected() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0x00);
        assert_eq!(detect_content_type(&data), TEXT_PLAIN);
    }

    #[test]
    fn test_json_with_character_split_at_window() {
        let mut data = b"{\"name\": \"".to_vec();
        data.resize(SNIFF_LEN - 1, b'x');
        data.extend_from_slice("é\"}".as_bytes());
        assert_eq!(data[SNIFF_LEN - 1], 0xc3);
        assert_eq!(detect_content_type(&data), "application/json");

        let mut invalid = b"[".to_vec();
        invalid.extend_from_slice(&[0xc3, b'x', b']']);
        assert_eq!(detect_content_type(&invalid), TEXT_PLAIN);
    }
}
