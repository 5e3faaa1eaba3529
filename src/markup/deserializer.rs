use log::debug;

use crate::core::item::{ItemProcessor, ItemProcessorResult};
use crate::error::BatchError;
use crate::markup::config::XmlDeserializerConfig;
use crate::markup::fold::fold_document;
use crate::markup::tree::{QuickXmlCodec, XmlTreeCodec};
use crate::markup::value::StructuredValue;

/// Turns XML documents into [`StructuredValue`]s.
///
/// The configuration is fixed at construction; the deserializer keeps no state
/// between calls and can be shared across threads.
///
/// # Examples
///
/// ```
/// use markup_batch_rs::markup::{StructuredValue, XmlDeserializerBuilder};
///
/// let deserializer = XmlDeserializerBuilder::new().build();
///
/// let value = deserializer
///     .deserialize(Some("<patients><patient><id>1</id></patient><patient><id>2</id></patient></patients>"))
///     .unwrap();
///
/// let patients = value.get("patient").and_then(StructuredValue::as_sequence).unwrap();
/// assert_eq!(patients.len(), 2);
/// assert_eq!(patients[0].get("id"), Some(&StructuredValue::from("1")));
///
/// // Nothing to parse is not an error
/// assert_eq!(deserializer.deserialize(None).unwrap(), StructuredValue::Null);
/// assert_eq!(deserializer.deserialize(Some("")).unwrap(), StructuredValue::Null);
/// ```
#[derive(Debug, Clone)]
pub struct XmlDeserializer<C = QuickXmlCodec> {
    config: XmlDeserializerConfig,
    codec: C,
}

impl<C: XmlTreeCodec> XmlDeserializer<C> {
    /// Creates a deserializer parsing documents with `codec`.
    pub fn with_codec(config: XmlDeserializerConfig, codec: C) -> Self {
        Self { config, codec }
    }

    /// Returns the configuration applied to every document.
    pub fn config(&self) -> &XmlDeserializerConfig {
        &self.config
    }

    /// Deserializes `input`.
    ///
    /// Absent or empty input yields [`StructuredValue::Null`] without parsing.
    /// Anything else must be a well-formed document, otherwise
    /// [`BatchError::Parse`] is returned.
    pub fn deserialize(&self, input: Option<&str>) -> Result<StructuredValue, BatchError> {
        match input {
            None | Some("") => {
                debug!("No XML content to deserialize");
                Ok(StructuredValue::Null)
            }
            Some(xml) => self.deserialize_str(xml),
        }
    }

    /// Deserializes a document, treating the empty string as no content.
    pub fn deserialize_str(&self, xml: &str) -> Result<StructuredValue, BatchError> {
        if xml.is_empty() {
            return Ok(StructuredValue::Null);
        }

        let root = self.codec.parse_to_tree(xml)?;
        debug!(
            "Folding <{}> (force_array: {})",
            root.name, self.config.force_array
        );
        fold_document(&root, &self.config)
    }
}

impl<C: XmlTreeCodec> ItemProcessor<String, StructuredValue> for XmlDeserializer<C> {
    fn process(&self, item: &String) -> ItemProcessorResult<StructuredValue> {
        self.deserialize_str(item)
    }
}

/// Builder for [`XmlDeserializer`].
///
/// # Examples
///
/// ```
/// use markup_batch_rs::markup::{StructuredValue, XmlDeserializerBuilder};
///
/// let deserializer = XmlDeserializerBuilder::new().force_array(true).build();
///
/// let value = deserializer.deserialize(Some("<r><id>1</id></r>")).unwrap();
/// assert_eq!(
///     value.get("id"),
///     Some(&StructuredValue::Sequence(vec![StructuredValue::from("1")]))
/// );
/// ```
#[derive(Debug, Default)]
pub struct XmlDeserializerBuilder {
    config: XmlDeserializerConfig,
}

impl XmlDeserializerBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration record.
    pub fn config(mut self, config: XmlDeserializerConfig) -> Self {
        self.config = config;
        self
    }

    /// Wraps every element field in a sequence, even when the tag appears once.
    pub fn force_array(mut self, force_array: bool) -> Self {
        self.config.force_array = force_array;
        self
    }

    /// Key holding the text of elements that also carry attributes or children.
    pub fn content_key<S: Into<String>>(mut self, content_key: S) -> Self {
        self.config.content_key = content_key.into();
        self
    }

    /// Nesting limit, the root element being at depth 1.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Builds a deserializer parsing documents with `quick-xml`.
    pub fn build(self) -> XmlDeserializer {
        let codec = QuickXmlCodec::with_max_depth(self.config.max_depth);
        XmlDeserializer::with_codec(self.config, codec)
    }

    /// Builds a deserializer parsing documents with a custom codec.
    pub fn build_with_codec<C: XmlTreeCodec>(self, codec: C) -> XmlDeserializer<C> {
        XmlDeserializer::with_codec(self.config, codec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::config::DEFAULT_MAX_DEPTH;
    use crate::markup::value::Object;

    const PATIENTS: &str = r#"
<patients>
  <patient>
    <id>1</id>
    <demographics>
      <first>Bozo</first>
      <last>Clown</last>
    </demographics>
  </patient>
  <patient>
    <id>2</id>
    <demographics>
      <first>Frank</first>
      <last>Rizzo</last>
    </demographics>
  </patient>
</patients>
"#;

    fn text(value: &str) -> StructuredValue {
        StructuredValue::from(value)
    }

    fn patient(id: &str, first: &str, last: &str) -> StructuredValue {
        Object::from_iter([
            ("id", text(id)),
            (
                "demographics",
                Object::from_iter([("first", first), ("last", last)]).into(),
            ),
        ])
        .into()
    }

    #[test]
    fn deserializes_repeated_patients() {
        let value = XmlDeserializerBuilder::new()
            .build()
            .deserialize(Some(PATIENTS))
            .unwrap();

        let expected: StructuredValue = Object::from_iter([(
            "patient",
            StructuredValue::Sequence(vec![
                patient("1", "Bozo", "Clown"),
                patient("2", "Frank", "Rizzo"),
            ]),
        )])
        .into();
        assert_eq!(value, expected);
    }

    #[test]
    fn attributes_give_the_same_shape_as_elements() {
        let xml = r#"<patients>
  <patient id="1">
    <demographics first="Bozo" last="Clown"/>
  </patient>
  <patient id="2">
    <demographics first="Frank" last="Rizzo"/>
  </patient>
</patients>"#;

        let with_attributes = XmlDeserializerBuilder::new()
            .build()
            .deserialize(Some(xml))
            .unwrap();
        let with_elements = XmlDeserializerBuilder::new()
            .build()
            .deserialize(Some(PATIENTS))
            .unwrap();

        assert_eq!(with_attributes, with_elements);
    }

    #[test]
    fn force_array_wraps_nested_fields() {
        let value = XmlDeserializerBuilder::new()
            .force_array(true)
            .build()
            .deserialize(Some(PATIENTS))
            .unwrap();

        let wrap = |value: StructuredValue| StructuredValue::Sequence(vec![value]);
        let forced_patient = |id: &str, first: &str, last: &str| -> StructuredValue {
            Object::from_iter([
                ("id", wrap(text(id))),
                (
                    "demographics",
                    wrap(
                        Object::from_iter([("first", wrap(text(first))), ("last", wrap(text(last)))])
                            .into(),
                    ),
                ),
            ])
            .into()
        };
        let expected: StructuredValue = Object::from_iter([(
            "patient",
            StructuredValue::Sequence(vec![
                forced_patient("1", "Bozo", "Clown"),
                forced_patient("2", "Frank", "Rizzo"),
            ]),
        )])
        .into();

        assert_eq!(value, expected);
    }

    #[test]
    fn empty_input_is_null_but_blank_input_is_malformed() {
        let deserializer = XmlDeserializerBuilder::new().build();

        assert_eq!(deserializer.deserialize(None).unwrap(), StructuredValue::Null);
        assert_eq!(deserializer.deserialize(Some("")).unwrap(), StructuredValue::Null);
        assert!(matches!(
            deserializer.deserialize(Some("  \n")),
            Err(BatchError::Parse(_))
        ));
    }

    #[test]
    fn malformed_input_carries_parser_diagnostic() {
        let result = XmlDeserializerBuilder::new()
            .build()
            .deserialize(Some("<patients><patient></patients>"));

        match result {
            Err(BatchError::Parse(message)) => assert!(!message.is_empty()),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn custom_content_key() {
        let value = XmlDeserializerBuilder::new()
            .content_key("#text")
            .build()
            .deserialize(Some(r#"<r><price currency="EUR">9.99</price></r>"#))
            .unwrap();

        assert_eq!(
            value.get("price").and_then(|price| price.get("#text")),
            Some(&text("9.99"))
        );
    }

    #[test]
    fn works_as_item_processor() {
        let deserializer = XmlDeserializerBuilder::new().build();

        let value = deserializer.process(&"<r><id>1</id></r>".to_string()).unwrap();
        assert_eq!(value.get("id"), Some(&text("1")));
        assert!(deserializer.process(&String::new()).unwrap().is_null());
    }

    #[test]
    fn shared_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<XmlDeserializer>();

        let deserializer = XmlDeserializerBuilder::new().build();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let deserializer = &deserializer;
                    scope.spawn(move || {
                        let xml = format!("<r><id>{}</id></r>", i);
                        deserializer.deserialize(Some(&xml)).unwrap()
                    })
                })
                .collect();

            for (i, handle) in handles.into_iter().enumerate() {
                let value = handle.join().unwrap();
                assert_eq!(value.get("id"), Some(&text(&i.to_string())));
            }
        });
    }

    fn nested(depth: usize) -> String {
        format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth))
    }

    #[test]
    fn default_depth_limit_is_inclusive() {
        let deserializer = XmlDeserializerBuilder::new().build();

        assert!(deserializer.deserialize(Some(&nested(DEFAULT_MAX_DEPTH))).is_ok());
        match deserializer.deserialize(Some(&nested(DEFAULT_MAX_DEPTH + 1))) {
            Err(BatchError::Parse(message)) => assert!(message.contains("nests deeper")),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn deeply_nested_document_fails_on_a_small_stack() {
        // Stays well within a small thread stack whatever the input depth
        let result = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                XmlDeserializerBuilder::new()
                    .build()
                    .deserialize(Some(&nested(20_000)))
                    .is_err()
            })
            .unwrap()
            .join()
            .unwrap();

        assert!(result);
    }

    #[test]
    fn custom_depth_limit() {
        let deserializer = XmlDeserializerBuilder::new().max_depth(2).build();

        assert!(deserializer.deserialize(Some("<r><id>1</id></r>")).is_ok());
        assert!(matches!(
            deserializer.deserialize(Some("<r><p><id>1</id></p></r>")),
            Err(BatchError::Parse(_))
        ));
    }
}
