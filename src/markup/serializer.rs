use log::debug;

use crate::core::item::{ItemProcessor, ItemProcessorResult};
use crate::error::BatchError;
use crate::markup::config::XmlSerializerConfig;
use crate::markup::fold::unfold_document;
use crate::markup::tree::{QuickXmlCodec, XmlTreeCodec};
use crate::markup::value::StructuredValue;

/// Turns [`StructuredValue`]s into pretty-printed XML documents.
///
/// The value is wrapped in a root element named after the configured root name
/// (`opt` by default). With `no_attributes` disabled, text fields are written as
/// attributes of their enclosing element.
///
/// # Examples
///
/// ```
/// use markup_batch_rs::markup::{Object, StructuredValue, XmlSerializerBuilder};
///
/// let serializer = XmlSerializerBuilder::new()
///     .root_name("patients")
///     .build()
///     .unwrap();
///
/// let patient: StructuredValue = Object::from_iter([("id", "1")]).into();
/// let value: StructuredValue = Object::from_iter([("patient", patient)]).into();
///
/// assert_eq!(
///     serializer.serialize(&value).unwrap(),
///     "<patients>\n  <patient>\n    <id>1</id>\n  </patient>\n</patients>\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct XmlSerializer<C = QuickXmlCodec> {
    config: XmlSerializerConfig,
    codec: C,
}

impl<C: XmlTreeCodec> XmlSerializer<C> {
    /// Creates a serializer writing documents with `codec`.
    ///
    /// Fails when the root name or anonymous tag cannot be used as an XML tag.
    pub fn with_codec(config: XmlSerializerConfig, codec: C) -> Result<Self, BatchError> {
        config.validate()?;
        Ok(Self { config, codec })
    }

    /// Returns the configuration applied to every value.
    pub fn config(&self) -> &XmlSerializerConfig {
        &self.config
    }

    /// Serializes `value`. `Null` is written as an empty root element.
    ///
    /// # Errors
    /// Returns `BatchError::Serialize` when a key is not an XML name or the value
    /// nests deeper than the configured `max_depth`.
    pub fn serialize(&self, value: &StructuredValue) -> Result<String, BatchError> {
        let root = unfold_document(value, &self.config)?;
        debug!(
            "Serializing {} value under <{}> (no_attributes: {})",
            value.kind(),
            root.name,
            self.config.no_attributes
        );
        self.codec.tree_to_xml_string(&root)
    }
}

impl<C: XmlTreeCodec> ItemProcessor<StructuredValue, String> for XmlSerializer<C> {
    fn process(&self, item: &StructuredValue) -> ItemProcessorResult<String> {
        self.serialize(item)
    }
}

/// Builder for [`XmlSerializer`].
#[derive(Debug, Default)]
pub struct XmlSerializerBuilder {
    config: XmlSerializerConfig,
}

impl XmlSerializerBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration record.
    pub fn config(mut self, config: XmlSerializerConfig) -> Self {
        self.config = config;
        self
    }

    /// When true (the default) every field becomes a nested element.
    pub fn no_attributes(mut self, no_attributes: bool) -> Self {
        self.config.no_attributes = no_attributes;
        self
    }

    /// Tag of the wrapper element. An empty name selects the default.
    pub fn root_name<S: Into<String>>(mut self, root_name: S) -> Self {
        self.config.root_name = Some(root_name.into());
        self
    }

    /// Key whose text is written as the element's own text rather than as a field.
    pub fn content_key<S: Into<String>>(mut self, content_key: S) -> Self {
        self.config.content_key = content_key.into();
        self
    }

    /// Tag of sequence items that have no field name, such as items of nested sequences.
    pub fn anonymous_tag<S: Into<String>>(mut self, anonymous_tag: S) -> Self {
        self.config.anonymous_tag = anonymous_tag.into();
        self
    }

    /// Nesting limit, the root element being at depth 1.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Builds a serializer writing documents with `quick-xml`.
    ///
    /// # Errors
    /// Returns `BatchError::Configuration` when the root name or anonymous tag is
    /// not a usable tag.
    pub fn build(self) -> Result<XmlSerializer, BatchError> {
        let codec = QuickXmlCodec::with_max_depth(self.config.max_depth);
        XmlSerializer::with_codec(self.config, codec)
    }

    /// Builds a serializer writing documents with a custom codec.
    pub fn build_with_codec<C: XmlTreeCodec>(self, codec: C) -> Result<XmlSerializer<C>, BatchError> {
        XmlSerializer::with_codec(self.config, codec)
    }
}
