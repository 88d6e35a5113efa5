//! Result codec: turn an [`InferenceResult`] into persisted and returned JSON.
//!
//! Two encodings are produced from the same result:
//!
//! * the **artifact** written next to the source object, where non-ASCII
//!   text stays as-is so the Japanese field labels remain readable;
//! * the **response body** returned to the caller, where non-ASCII is
//!   escaped as `\uXXXX`.
//!
//! Both use `", "` and `": "` separators; consumers of the artifacts compare
//! them textually against fixtures produced with that layout.
//!
//! For text results the codec only *validates*: well-formed JSON text is
//! persisted byte-for-byte, anything else is wrapped as a JSON string. There
//! is no schema check.

use crate::error::ReceiptError;
use crate::pipeline::llm::InferenceResult;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;
use std::io;
use tracing::debug;

/// JSON formatter with spaced separators and optional ASCII escaping.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpacedFormatter {
    ensure_ascii: bool,
}

impl SpacedFormatter {
    /// Keep non-ASCII characters unescaped.
    pub fn unicode() -> Self {
        Self { ensure_ascii: false }
    }

    /// Escape every non-ASCII character as `\uXXXX` (surrogate pairs above
    /// the BMP).
    pub fn ascii() -> Self {
        Self { ensure_ascii: true }
    }
}

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if !self.ensure_ascii || fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Serialise any value with the given formatter.
pub fn to_string_with<T: Serialize + ?Sized>(
    value: &T,
    formatter: SpacedFormatter,
) -> Result<String, ReceiptError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| ReceiptError::EncodeFailed(format!("JSON serialisation failed: {e}")))?;
    String::from_utf8(buf).map_err(|e| ReceiptError::EncodeFailed(e.to_string()))
}

/// Canonical artifact text for a result.
///
/// "Valid JSON" means strict RFC 8259 as `serde_json` reads it. The
/// non-standard literals `NaN`, `Infinity` and `-Infinity`, and escapes
/// holding a lone UTF-16 surrogate, are not JSON here: such text is wrapped
/// as a string rather than persisted verbatim.
pub fn to_persistable(result: &InferenceResult) -> Result<String, ReceiptError> {
    match result {
        InferenceResult::Structured(map) => to_string_with(map, SpacedFormatter::unicode()),
        InferenceResult::Text(text) => {
            if serde_json::from_str::<Value>(text).is_ok() {
                debug!("Result text is valid JSON; persisting verbatim");
                Ok(text.clone())
            } else {
                debug!("Result text is not JSON; wrapping as a string");
                to_string_with(text.as_str(), SpacedFormatter::unicode())
            }
        }
    }
}

/// Response-body text for a result: the result itself serialised as JSON,
/// ASCII-escaped. Text results are always quoted, valid JSON or not.
pub fn to_response_body(result: &InferenceResult) -> Result<String, ReceiptError> {
    match result {
        InferenceResult::Structured(map) => to_string_with(map, SpacedFormatter::ascii()),
        InferenceResult::Text(text) => to_string_with(text.as_str(), SpacedFormatter::ascii()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn structured(value: Value) -> InferenceResult {
        match value {
            Value::Object(map) => InferenceResult::Structured(map),
            _ => unreachable!("test helper takes objects"),
        }
    }

    fn text(s: &str) -> InferenceResult {
        InferenceResult::Text(s.to_string())
    }

    #[test]
    fn structured_uses_spaced_separators() {
        assert_eq!(to_persistable(&structured(json!({"a": 1}))).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn structured_preserves_key_order() {
        let mut map = Map::new();
        map.insert("z".into(), json!(1));
        map.insert("a".into(), json!([1, 2]));
        map.insert("m".into(), json!({"y": null, "b": true}));
        assert_eq!(
            to_persistable(&InferenceResult::Structured(map)).unwrap(),
            r#"{"z": 1, "a": [1, 2], "m": {"y": null, "b": true}}"#
        );
    }

    #[test]
    fn structured_keeps_non_ascii() {
        let out = to_persistable(&structured(json!({"領収金額": "100円"}))).unwrap();
        assert_eq!(out, r#"{"領収金額": "100円"}"#);
    }

    #[test]
    fn valid_json_text_is_byte_identical() {
        for raw in [r#"{"a":1}"#, "  [1,2 , 3]\n", r#""quoted""#, "42", "null"] {
            assert_eq!(to_persistable(&text(raw)).unwrap(), raw);
        }
    }

    #[test]
    fn invalid_json_text_is_wrapped() {
        assert_eq!(to_persistable(&text("not json")).unwrap(), r#""not json""#);
        assert_eq!(to_persistable(&text("")).unwrap(), r#""""#);
        assert_eq!(
            to_persistable(&text("```json\n{\"a\": 1}\n```")).unwrap(),
            r#""```json\n{\"a\": 1}\n```""#
        );
    }

    #[test]
    fn non_standard_json_literals_are_wrapped() {
        assert_eq!(to_persistable(&text("NaN")).unwrap(), r#""NaN""#);
        assert_eq!(
            to_persistable(&text(r#"{"a": Infinity}"#)).unwrap(),
            r#""{\"a\": Infinity}""#
        );
        assert_eq!(
            to_persistable(&text(r#""\ud800""#)).unwrap(),
            r#""\"\\ud800\"""#
        );
    }

    #[test]
    fn wrapped_text_keeps_non_ascii_and_escapes_controls() {
        let out = to_persistable(&text("領収者氏名：空野太郎\n警告：なし")).unwrap();
        assert_eq!(out, "\"領収者氏名：空野太郎\\n警告：なし\"");
    }

    #[test]
    fn persisting_is_idempotent() {
        for raw in ["not json", r#"{"a":1}"#, "領収者氏名：空野太郎"] {
            let once = to_persistable(&text(raw)).unwrap();
            let twice = to_persistable(&text(&once)).unwrap();
            assert_eq!(once, twice, "input {raw:?}");
        }
    }

    #[test]
    fn response_body_escapes_non_ascii() {
        assert_eq!(
            to_response_body(&text("円")).unwrap(),
            r#""\u5186""#
        );
        // Outside the BMP: surrogate pair.
        assert_eq!(
            to_response_body(&text("😀")).unwrap(),
            r#""\ud83d\ude00""#
        );
    }

    #[test]
    fn response_body_always_quotes_text() {
        assert_eq!(to_response_body(&text(r#"{"a":1}"#)).unwrap(), r#""{\"a\":1}""#);
        assert_eq!(
            to_response_body(&structured(json!({"a": [1, "é"]}))).unwrap(),
            r#"{"a": [1, "\u00e9"]}"#
        );
    }
}
