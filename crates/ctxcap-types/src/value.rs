use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Error as _, Serialize, Serializer};

use crate::document::Document;

/// Concrete runtime type tag of a present value.
///
/// The tag is fixed when the value is constructed; nothing is inferred later
/// by inspecting the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Document,
    /// A value of a type the capture pipeline does not model.
    Other,
}

impl ValueKind {
    /// The tag name used in type descriptors and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::List => "list",
            Self::Document => "document",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single value held under a document key.
///
/// Lists are opaque leaves: they are never merged element-wise.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An absent slot. Carries the statically known wrapped type when the
    /// producer had one (a typed-but-nil field), `None` otherwise.
    Null(Option<ValueKind>),
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Document(Document),
    /// An opaque value. It takes part in indexing and merging but can never
    /// be serialized.
    Other { type_name: String },
}

impl Value {
    /// An absent slot with no type information.
    pub const fn null() -> Self {
        Self::Null(None)
    }

    /// An absent slot whose wrapped type is known.
    pub const fn typed_null(kind: ValueKind) -> Self {
        Self::Null(Some(kind))
    }

    /// An opaque value of the named host type.
    pub fn opaque(type_name: impl Into<String>) -> Self {
        Self::Other {
            type_name: type_name.into(),
        }
    }

    /// The concrete type tag, or `None` for an absent slot.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Null(_) => None,
            Self::Bool(_) => Some(ValueKind::Boolean),
            Self::Integer(_) => Some(ValueKind::Integer),
            Self::Float(_) => Some(ValueKind::Float),
            Self::String(_) => Some(ValueKind::String),
            Self::List(_) => Some(ValueKind::List),
            Self::Document(_) => Some(ValueKind::Document),
            Self::Other { .. } => Some(ValueKind::Other),
        }
    }

    /// Returns `true` if this is an absent slot.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null(_) => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => items.serialize(serializer),
            Self::Document(doc) => doc.serialize(serializer),
            Self::Other { type_name } => Err(S::Error::custom(format!(
                "opaque value of type `{type_name}` cannot be serialized"
            ))),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        // Values past i64::MAX keep their magnitude as a float.
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::null())
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::null())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut doc = Document::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            doc.insert(key, value);
        }
        Ok(Value::Document(doc))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::null(),
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Document(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Self::Document(doc)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_tags() {
        assert_eq!(Value::from("x").kind(), Some(ValueKind::String));
        assert_eq!(Value::from(5).kind(), Some(ValueKind::Integer));
        assert_eq!(Value::from(1.5).kind(), Some(ValueKind::Float));
        assert_eq!(Value::from(true).kind(), Some(ValueKind::Boolean));
        assert_eq!(Value::List(vec![]).kind(), Some(ValueKind::List));
        assert_eq!(Value::Document(Document::new()).kind(), Some(ValueKind::Document));
        assert_eq!(Value::opaque("Date").kind(), Some(ValueKind::Other));
        assert_eq!(Value::null().kind(), None);
        assert_eq!(Value::typed_null(ValueKind::String).kind(), None);
    }

    #[test]
    fn kind_names() {
        assert_eq!(ValueKind::Integer.to_string(), "integer");
        assert_eq!(ValueKind::Document.as_str(), "document");
        assert_eq!(serde_json::to_string(&ValueKind::Boolean).unwrap(), "\"boolean\"");
    }

    #[test]
    fn from_json_numbers() {
        assert_eq!(Value::from(json!(5)), Value::Integer(5));
        assert_eq!(Value::from(json!(-5)), Value::Integer(-5));
        assert_eq!(Value::from(json!(2.5)), Value::Float(2.5));
        assert_eq!(Value::from(json!(null)), Value::null());
    }

    #[test]
    fn deserialize_large_unsigned_as_float() {
        let v: Value = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(v.kind(), Some(ValueKind::Float));
    }

    #[test]
    fn deserialize_nested() {
        let v: Value = serde_json::from_str(r#"{"a": [1, "b", null], "c": {"d": false}}"#).unwrap();
        let doc = v.as_document().unwrap();
        assert_eq!(
            doc.get("a"),
            Some(&Value::List(vec![Value::Integer(1), Value::from("b"), Value::null()]))
        );
        let inner = doc.get("c").and_then(Value::as_document).unwrap();
        assert_eq!(inner.get("d").and_then(Value::as_bool), Some(false));
    }

    #[test]
    fn typed_null_serializes_as_null() {
        let text = serde_json::to_string(&Value::typed_null(ValueKind::Integer)).unwrap();
        assert_eq!(text, "null");
    }

    #[test]
    fn opaque_value_refuses_serialization() {
        let err = serde_json::to_string(&Value::opaque("NSDate")).unwrap_err();
        assert!(err.to_string().contains("NSDate"));
    }

    #[test]
    fn opaque_value_inside_list_refuses_serialization() {
        let v = Value::List(vec![Value::from(1), Value::opaque("Data")]);
        assert!(serde_json::to_string(&v).is_err());
    }
}
