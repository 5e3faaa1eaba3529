//! Configuration records for the XML deserializer and serializer.
//!
//! Both records are plain data and can be loaded with serde from whatever
//! configuration source the host pipeline uses. Missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::BatchError;

/// Tag of the synthetic wrapper element written when no root name is configured.
pub const DEFAULT_ROOT_NAME: &str = "opt";

/// Object key holding the text of an element that also has attributes or children.
pub const DEFAULT_CONTENT_KEY: &str = "content";

/// Tag used for sequence items that have no field name of their own.
pub const DEFAULT_ANONYMOUS_TAG: &str = "anon";

/// Deepest element nesting read or written, the root element being at depth 1.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options applied by [`crate::markup::XmlDeserializer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlDeserializerConfig {
    /// Wrap every element field in a sequence, even when the tag appears once
    #[serde(alias = "forceArray")]
    pub force_array: bool,
    #[serde(alias = "contentKey")]
    pub content_key: String,
    /// Documents nesting deeper than this are rejected with a parse error
    #[serde(alias = "maxDepth")]
    pub max_depth: usize,
}

impl Default for XmlDeserializerConfig {
    fn default() -> Self {
        Self {
            force_array: false,
            content_key: DEFAULT_CONTENT_KEY.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Options applied by [`crate::markup::XmlSerializer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlSerializerConfig {
    /// Emit every field as a nested element, never as an attribute
    #[serde(
        alias = "noAttributes",
        alias = "suppress_attributes",
        alias = "suppressAttributes"
    )]
    pub no_attributes: bool,
    /// Tag of the wrapper element; `None` or empty means [`DEFAULT_ROOT_NAME`]
    #[serde(alias = "rootName")]
    pub root_name: Option<String>,
    #[serde(alias = "contentKey")]
    pub content_key: String,
    #[serde(alias = "anonymousTag")]
    pub anonymous_tag: String,
    /// Values nesting deeper than this are rejected with a serialization error
    #[serde(alias = "maxDepth")]
    pub max_depth: usize,
}

impl Default for XmlSerializerConfig {
    fn default() -> Self {
        Self {
            no_attributes: true,
            root_name: None,
            content_key: DEFAULT_CONTENT_KEY.to_string(),
            anonymous_tag: DEFAULT_ANONYMOUS_TAG.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl XmlSerializerConfig {
    /// The wrapper tag actually written: the configured root name, unless absent or empty.
    pub fn effective_root_name(&self) -> &str {
        match self.root_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_ROOT_NAME,
        }
    }

    /// Checks that the tags this configuration writes on its own are usable XML names.
    pub fn validate(&self) -> Result<(), BatchError> {
        validate_tag("root name", self.effective_root_name())?;
        validate_tag("anonymous tag", &self.anonymous_tag)
    }
}

fn validate_tag(what: &str, tag: &str) -> Result<(), BatchError> {
    if !is_xml_name(tag) {
        return Err(BatchError::Configuration(format!(
            "{} '{}' is not a valid XML tag name",
            what, tag
        )));
    }
    Ok(())
}

/// Whether `name` can be written as an element or attribute name.
///
/// A name starts with a letter, `_` or `:` and goes on with letters, digits,
/// `-`, `.`, `_` or `:`. Non-ASCII letters and digits are accepted anywhere a
/// letter is.
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start(first) => {
            chars.all(|c| is_name_start(c) || c.is_alphanumeric() || c == '-' || c == '.')
        }
        _ => false,
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_documented_values() {
        let deserializer = XmlDeserializerConfig::default();
        assert!(!deserializer.force_array);
        assert_eq!(deserializer.content_key, "content");

        let serializer = XmlSerializerConfig::default();
        assert!(serializer.no_attributes);
        assert_eq!(serializer.root_name, None);
        assert_eq!(serializer.effective_root_name(), "opt");
        assert_eq!(serializer.anonymous_tag, "anon");
        assert_eq!(deserializer.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(serializer.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn empty_root_name_falls_back_to_default() {
        let config = XmlSerializerConfig {
            root_name: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(config.effective_root_name(), DEFAULT_ROOT_NAME);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_from_json_with_missing_fields() {
        let deserializer: XmlDeserializerConfig =
            serde_json::from_str(r#"{"forceArray": true}"#).unwrap();
        assert!(deserializer.force_array);
        assert_eq!(deserializer.content_key, DEFAULT_CONTENT_KEY);

        let serializer: XmlSerializerConfig =
            serde_json::from_str(r#"{"root_name": "patients"}"#).unwrap();
        assert!(serializer.no_attributes);
        assert_eq!(serializer.effective_root_name(), "patients");

        let serializer: XmlSerializerConfig =
            serde_json::from_str(r#"{"suppressAttributes": false}"#).unwrap();
        assert!(!serializer.no_attributes);
        assert_eq!(serializer.anonymous_tag, DEFAULT_ANONYMOUS_TAG);
    }

    #[test]
    fn rejects_unusable_tag_names() {
        for name in ["has space", "1st", "<tag>", "a/b", "-x", "a=b", "semi;colon", "q?"] {
            let config = XmlSerializerConfig {
                root_name: Some(name.to_string()),
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(BatchError::Configuration(_))),
                "{} should be rejected",
                name
            );
        }

        let config = XmlSerializerConfig {
            root_name: Some("ns:patients".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn xml_names() {
        for name in ["patients", "first_name", "ns:tag", "_x", "a-b.c1", "prénom"] {
            assert!(is_xml_name(name), "{} should be accepted", name);
        }
        for name in ["", "first name", "a/b", "9lives", ".dot", "a&b"] {
            assert!(!is_xml_name(name), "{} should be rejected", name);
        }
    }
}
