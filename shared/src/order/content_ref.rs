//! Content-record references
//!
//! For historical reasons, `linkInsertion` orders store the id of the
//! associated content record in the `linkInsertionId` field, not the id of
//! a distinct link-insertion entity. On top of that, legacy rows carry the
//! value in whatever shape the old API wrote it: a bare number, a numeric
//! string, or a serialized populated object. Both quirks are contained
//! here: readers get a [`ContentRef`] and one normalization function
//! instead of type-sniffing at every call site.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Which field of an order points at its content record
///
/// Both variants resolve through the same post lookup; the distinction
/// only records where the id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRef {
    /// `postId`, the straightforward pointer
    Post(i64),
    /// `linkInsertionId` on a linkInsertion order: a content-record id
    /// living under a misleading name
    LegacyLinkInsertionPost(i64),
}

impl ContentRef {
    /// The content-record id, regardless of which field carried it
    pub fn post_id(&self) -> i64 {
        match *self {
            ContentRef::Post(id) | ContentRef::LegacyLinkInsertionPost(id) => id,
        }
    }
}

/// Normalize a JSON value to a content-record id
///
/// Accepts the three shapes the legacy data contains:
/// - a number: `184`
/// - a numeric string: `"184"`
/// - a populated object: `{"_id": 184, ...}` or `{"id": "184", ...}`
pub fn normalize_content_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Object(map) => map
            .get("id")
            .or_else(|| map.get("_id"))
            .and_then(normalize_content_id),
        _ => None,
    }
}

/// Normalize a raw stored reference (TEXT column) to a content-record id
///
/// The column may hold the id as plain text or as any JSON shape accepted
/// by [`normalize_content_id`]. Returns None for anything unparseable;
/// callers degrade to "no content assigned".
pub fn parse_legacy_ref(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(id) = trimmed.parse::<i64>() {
        return Some(id);
    }
    serde_json::from_str::<Value>(trimmed)
        .ok()
        .as_ref()
        .and_then(normalize_content_id)
}

/// A normalized content-record id supplied by a client
///
/// Deserializes from any of the legacy shapes, so cart payloads produced
/// by old clients keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentId(pub i64);

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        normalize_content_id(&value)
            .map(ContentId)
            .ok_or_else(|| D::Error::custom("expected a content id (number, string, or object)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_number() {
        assert_eq!(normalize_content_id(&json!(184)), Some(184));
    }

    #[test]
    fn test_normalize_string() {
        assert_eq!(normalize_content_id(&json!("184")), Some(184));
        assert_eq!(normalize_content_id(&json!(" 184 ")), Some(184));
        assert_eq!(normalize_content_id(&json!("not-an-id")), None);
    }

    #[test]
    fn test_normalize_populated_object() {
        assert_eq!(
            normalize_content_id(&json!({"_id": 184, "title": "Guest post"})),
            Some(184)
        );
        assert_eq!(
            normalize_content_id(&json!({"id": "184", "title": "Guest post"})),
            Some(184)
        );
        // `id` wins over `_id` when both are present
        assert_eq!(
            normalize_content_id(&json!({"id": 1, "_id": 2})),
            Some(1)
        );
        assert_eq!(normalize_content_id(&json!({"title": "no id here"})), None);
    }

    #[test]
    fn test_normalize_rejects_other_shapes() {
        assert_eq!(normalize_content_id(&json!(null)), None);
        assert_eq!(normalize_content_id(&json!(1.5)), None);
        assert_eq!(normalize_content_id(&json!([184])), None);
        assert_eq!(normalize_content_id(&json!(true)), None);
    }

    #[test]
    fn test_parse_legacy_ref_shapes() {
        assert_eq!(parse_legacy_ref("184"), Some(184));
        assert_eq!(parse_legacy_ref("\"184\""), Some(184));
        assert_eq!(
            parse_legacy_ref(r#"{"_id": 184, "title": "Guest post"}"#),
            Some(184)
        );
        assert_eq!(parse_legacy_ref(""), None);
        assert_eq!(parse_legacy_ref("   "), None);
        assert_eq!(parse_legacy_ref("garbage"), None);
    }

    #[test]
    fn test_content_id_deserialize() {
        let id: ContentId = serde_json::from_value(json!(184)).unwrap();
        assert_eq!(id, ContentId(184));
        let id: ContentId = serde_json::from_value(json!("184")).unwrap();
        assert_eq!(id, ContentId(184));
        let id: ContentId = serde_json::from_value(json!({"_id": 184})).unwrap();
        assert_eq!(id, ContentId(184));
        assert!(serde_json::from_value::<ContentId>(json!([184])).is_err());
    }

    #[test]
    fn test_content_ref_post_id() {
        assert_eq!(ContentRef::Post(5).post_id(), 5);
        assert_eq!(ContentRef::LegacyLinkInsertionPost(5).post_id(), 5);
    }
}
