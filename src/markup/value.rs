//! Generic structured value produced by the XML deserializer and consumed by the serializer.

use indexmap::IndexMap;
use indexmap::map::{IntoIter, Iter, Keys};
use serde::{Deserialize, Serialize};

/// A value folded from (or unfolded into) an XML document.
///
/// Leaves are always strings: XML carries no type information, so numbers and
/// booleans stay textual.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuredValue {
    /// Empty or absent content
    #[default]
    Null,
    /// String leaf
    Text(String),
    /// Repeated elements, or every element field under force-array
    Sequence(Vec<StructuredValue>),
    /// Element and attribute names mapped to their values, in document order
    Object(Object),
}

impl StructuredValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns the string if this is a text leaf, None otherwise
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the items if this is a sequence, None otherwise
    pub fn as_sequence(&self) -> Option<&[StructuredValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the object if this is an object, None otherwise
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Looks up a field when this value is an object.
    pub fn get(&self, key: &str) -> Option<&StructuredValue> {
        self.as_object().and_then(|object| object.get(key))
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Sequence(_) => "sequence",
            Self::Object(_) => "object",
        }
    }
}

impl From<String> for StructuredValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for StructuredValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Object> for StructuredValue {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<StructuredValue>> for StructuredValue {
    fn from(items: Vec<StructuredValue>) -> Self {
        Self::Sequence(items)
    }
}

impl<T: Into<StructuredValue>> From<Option<T>> for StructuredValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Numbers and booleans become text leaves; JSON null becomes `Null`.
impl From<serde_json::Value> for StructuredValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Text(b.to_string()),
            serde_json::Value::Number(n) => Self::Text(n.to_string()),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<StructuredValue> for serde_json::Value {
    fn from(value: StructuredValue) -> Self {
        match value {
            StructuredValue::Null => serde_json::Value::Null,
            StructuredValue::Text(text) => serde_json::Value::String(text),
            StructuredValue::Sequence(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            StructuredValue::Object(object) => serde_json::Value::Object(
                object
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}

/// An order-preserving map of element/attribute names to values
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object(IndexMap<String, StructuredValue>);

impl Object {
    /// Creates an empty object.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, key: &str) -> Option<&StructuredValue> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value of a field, if present.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut StructuredValue> {
        self.0.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts a field, returning the previous value when the key already existed.
    /// A replaced key keeps its original position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<StructuredValue>,
    ) -> Option<StructuredValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes a field, preserving the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<StructuredValue> {
        self.0.shift_remove(key)
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> Keys<'_, String, StructuredValue> {
        self.0.keys()
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> Iter<'_, String, StructuredValue> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a StructuredValue);
    type IntoIter = Iter<'a, String, StructuredValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Object {
    type Item = (String, StructuredValue);
    type IntoIter = IntoIter<String, StructuredValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>, V: Into<StructuredValue>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patient() -> StructuredValue {
        Object::from_iter([
            ("id", StructuredValue::from("1")),
            (
                "demographics",
                Object::from_iter([("first", "Bozo"), ("last", "Clown")]).into(),
            ),
        ])
        .into()
    }

    #[test]
    fn object_keeps_insertion_order() {
        let mut object = Object::new();
        object.insert("zeta", "1");
        object.insert("alpha", "2");
        object.insert("mid", "3");

        let keys: Vec<&String> = object.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);

        object.remove("alpha");
        let keys: Vec<&String> = object.keys().collect();
        assert_eq!(keys, vec!["zeta", "mid"]);
    }

    #[test]
    fn accessors_match_variants() {
        let value = patient();

        assert!(value.is_object());
        assert_eq!(value.get("id").and_then(StructuredValue::as_text), Some("1"));
        assert_eq!(
            value
                .get("demographics")
                .and_then(|d| d.get("last"))
                .and_then(StructuredValue::as_text),
            Some("Clown")
        );
        assert!(value.get("missing").is_none());
        assert!(StructuredValue::Null.get("id").is_none());
        assert_eq!(StructuredValue::Null.kind(), "null");
        assert_eq!(
            StructuredValue::from(vec![StructuredValue::from("a")])
                .as_sequence()
                .map(<[StructuredValue]>::len),
            Some(1)
        );
    }

    #[test]
    fn json_values_become_text_leaves() {
        let value = StructuredValue::from(json!({
            "id": 1,
            "active": true,
            "tags": ["a", "b"],
            "note": null
        }));

        assert_eq!(value.get("id"), Some(&StructuredValue::from("1")));
        assert_eq!(value.get("active"), Some(&StructuredValue::from("true")));
        assert_eq!(
            value.get("tags"),
            Some(&StructuredValue::Sequence(vec!["a".into(), "b".into()]))
        );
        assert_eq!(value.get("note"), Some(&StructuredValue::Null));
    }

    #[test]
    fn converts_back_to_json_preserving_order() {
        let json: serde_json::Value = patient().into();

        assert_eq!(
            json,
            json!({"id": "1", "demographics": {"first": "Bozo", "last": "Clown"}})
        );
        assert_eq!(
            serde_json::to_string(&patient()).unwrap(),
            r#"{"id":"1","demographics":{"first":"Bozo","last":"Clown"}}"#
        );
    }

    #[test]
    fn deserializes_untagged_json() {
        let value: StructuredValue =
            serde_json::from_str(r#"{"patient":[{"id":"1"},{"id":"2"}],"empty":null}"#).unwrap();

        let patients = value.get("patient").and_then(StructuredValue::as_sequence).unwrap();
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[1].get("id"), Some(&StructuredValue::from("2")));
        assert!(value.get("empty").unwrap().is_null());
    }
}
