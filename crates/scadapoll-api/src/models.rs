// Wire models for the item read/write endpoints
//
// The server uses PascalCase field names throughout. These types mirror
// the JSON exactly; `scadapoll-core` converts them into domain types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ── Values ───────────────────────────────────────────────────────────

/// A scalar item value as carried on the wire.
///
/// Numbers keep their integer/float form through `serde_json::Number`,
/// so a value written as `50` goes back out as `50`, not `50.0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl ItemValue {
    /// Interpret free-form user input: booleans and numbers are recognized,
    /// anything else is sent as text.
    pub fn infer(input: &str) -> Self {
        match input {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => serde_json::from_str::<serde_json::Number>(input)
                .map_or_else(|_| Self::Text(input.to_owned()), Self::Number),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ItemValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ItemValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for ItemValue {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<String> for ItemValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ItemValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

// ── Read ─────────────────────────────────────────────────────────────

/// Which items a read request asks for.
///
/// A pattern is matched server-side (regular expression syntax); an item
/// list names the items explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    Pattern(String),
    Items(Vec<String>),
}

impl Selector {
    /// Last path component of the read URL, percent-encoded.
    ///
    /// Names are joined with `,` after encoding each one. `urlencoding`
    /// also escapes `*`, `!`, `'`, `(` and `)`, so `.*` goes out as
    /// `.%2A`; the server decodes both spellings alike.
    pub fn path_segment(&self) -> String {
        match self {
            Self::Pattern(pattern) => urlencoding::encode(pattern).into_owned(),
            Self::Items(names) => names
                .iter()
                .map(|n| urlencoding::encode(n))
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// `true` when the path component is `.` or `..`. URL parsing folds
    /// those away whether escaped or not, so no request can carry them.
    pub fn is_dot_segment(&self) -> bool {
        matches!(self.path_segment().as_str(), "." | "..")
    }

    /// Path below the base URL.
    pub fn read_path(&self) -> String {
        let kind = match self {
            Self::Pattern(_) => "patterns",
            Self::Items(_) => "items",
        };
        format!("/read/{kind}/{}", self.path_segment())
    }
}

/// One item as returned by `GET /read/...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawItem {
    pub name: String,
    /// OPC status byte: quality, status and limit bits.
    #[serde(default, deserialize_with = "null_as_default")]
    pub quality: u8,
    /// `/Date(ms)/` string; empty when the server sent none.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default)]
    pub value: ItemValue,
    #[serde(default, deserialize_with = "null_as_default")]
    pub write_permission: bool,
}

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

// ── Write ────────────────────────────────────────────────────────────

/// One entry of the `POST /write/items` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WriteItem {
    pub name: String,
    pub value: ItemValue,
    pub quality: u8,
    pub timestamp: String,
}

/// Response of `POST /write/items`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WriteResponse {
    #[serde(default)]
    pub error_infos: Vec<ErrorInfo>,
    #[serde(default)]
    pub written_items: u32,
}

/// Per-item failure reported by a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorInfo {
    pub error_code: i64,
    pub name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_item_reads_pascal_case() {
        let item: RawItem = serde_json::from_value(json!({
            "Name": "Tag1",
            "Quality": 192,
            "Timestamp": "/Date(1609459200000)/",
            "Value": "42",
            "WritePermission": true
        }))
        .unwrap();

        assert_eq!(item.name, "Tag1");
        assert_eq!(item.quality, 192);
        assert_eq!(item.value, ItemValue::Text("42".into()));
        assert!(item.write_permission);
    }

    #[test]
    fn raw_item_tolerates_missing_optional_fields() {
        let item: RawItem = serde_json::from_value(json!({ "Name": "Bare" })).unwrap();
        assert_eq!(item.quality, 0);
        assert!(item.timestamp.is_empty());
        assert!(item.value.is_null());
        assert!(!item.write_permission);
    }

    #[test]
    fn raw_item_tolerates_null_fields() {
        let item: RawItem = serde_json::from_value(json!({
            "Name": "Odd",
            "Quality": null,
            "Timestamp": null,
            "Value": null,
            "WritePermission": null
        }))
        .unwrap();
        assert_eq!(item.quality, 0);
        assert!(item.timestamp.is_empty());
        assert!(item.value.is_null());
        assert!(!item.write_permission);
    }

    #[test]
    fn values_keep_their_json_shape() {
        assert_eq!(serde_json::to_value(ItemValue::from(50_i64)).unwrap(), json!(50));
        assert_eq!(serde_json::to_value(ItemValue::from(2.5_f64)).unwrap(), json!(2.5));
        assert_eq!(serde_json::to_value(ItemValue::from(true)).unwrap(), json!(true));
        assert_eq!(serde_json::to_value(ItemValue::Null).unwrap(), json!(null));
    }

    #[test]
    fn infer_recognizes_scalars() {
        assert_eq!(ItemValue::infer("true"), ItemValue::Bool(true));
        assert_eq!(ItemValue::infer("17"), ItemValue::from(17_i64));
        assert_eq!(ItemValue::infer("-0.5"), ItemValue::from(-0.5_f64));
        assert_eq!(ItemValue::infer("open"), ItemValue::Text("open".into()));
    }

    #[test]
    fn pattern_path_is_encoded() {
        let sel = Selector::Pattern("Line 1/.*".into());
        assert_eq!(sel.read_path(), "/read/patterns/Line%201%2F.%2A");
    }

    #[test]
    fn item_path_joins_encoded_names() {
        let sel = Selector::Items(vec!["Tank A".into(), "a,b".into(), "Pump".into()]);
        assert_eq!(sel.read_path(), "/read/items/Tank%20A,a%2Cb,Pump");
    }

    #[test]
    fn only_lone_dot_segments_are_flagged() {
        assert!(Selector::Pattern(".".into()).is_dot_segment());
        assert!(Selector::Pattern("..".into()).is_dot_segment());
        assert!(Selector::Items(vec!["..".into()]).is_dot_segment());

        assert!(!Selector::Pattern("...".into()).is_dot_segment());
        assert!(!Selector::Pattern(".*".into()).is_dot_segment());
        assert!(!Selector::Items(vec![".".into(), ".".into()]).is_dot_segment());
    }

    #[test]
    fn write_response_reads_pascal_case() {
        let resp: WriteResponse = serde_json::from_value(json!({
            "ErrorInfos": [{ "ErrorCode": -5, "Name": "Locked" }],
            "WrittenItems": 2
        }))
        .unwrap();
        assert_eq!(resp.written_items, 2);
        assert_eq!(resp.error_infos[0].error_code, -5);
        assert_eq!(resp.error_infos[0].name, "Locked");
    }
}
