//! Text decoding and clock helpers with platform-specific implementations.

use std::borrow::Cow;

/// Current time as seconds since the Unix epoch.
///
/// On WASM this reads `js_sys::Date::now()`.
#[cfg(not(target_arch = "wasm32"))]
pub fn time_now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
pub fn time_now_secs() -> u64 {
    // milliseconds as f64
    (js_sys::Date::now() / 1000.0) as u64
}

/// Decode a TEI file to text.
///
/// UTF-8 (with or without BOM) is tried first. Malformed input is decoded with
/// the encoding named in the XML declaration, and Windows-1252 when there is
/// none: older transcriptions of Golden Age texts are often Latin-1.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    if let Some(label) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes())
    {
        tracing::debug!(encoding = encoding.name(), "decoding with declared encoding");
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    tracing::debug!("input is not UTF-8, falling back to windows-1252");
    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Encoding label from an `<?xml ... encoding="..."?>` prolog.
///
/// Only the first 100 bytes are inspected.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let head = &bytes[..bytes.len().min(100)];

    let decl = head.windows(5).position(|w| w == b"<?xml")?;
    let decl = &head[decl..];
    let attr = decl
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let rest = &decl[attr + 9..];

    let (&quote, rest) = rest.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let len = rest.iter().position(|&b| b == quote)?;
    std::str::from_utf8(&rest[..len]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_xml_encoding() {
        assert_eq!(
            extract_xml_encoding(br#"<?xml version="1.0" encoding="ISO-8859-1"?><TEI/>"#),
            Some("ISO-8859-1")
        );
        assert_eq!(
            extract_xml_encoding(b"<?xml version='1.0' encoding='utf-8'?>"),
            Some("utf-8")
        );
        assert_eq!(extract_xml_encoding(b"<TEI/>"), None);
        assert_eq!(extract_xml_encoding(b"<?xml version=\"1.0\" encoding="), None);
    }

    #[test]
    fn test_decode_latin1_with_hint() {
        // "señor" in ISO-8859-1
        let bytes = b"se\xf1or";
        assert_eq!(decode_text(bytes, Some("ISO-8859-1")), "señor");
        assert_eq!(decode_text(bytes, None), "señor");
    }

    #[test]
    fn test_decode_utf8_borrows() {
        let bytes = "Fuenteovejuna".as_bytes();
        assert!(matches!(decode_text(bytes, None), Cow::Borrowed(_)));
    }
}
