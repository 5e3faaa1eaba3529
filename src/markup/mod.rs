//! XML to structured data, and back.
//!
//! This module holds the two conversion components of the crate:
//!
//! - [`XmlDeserializer`] folds an XML document into a [`StructuredValue`]
//! - [`XmlSerializer`] unfolds a [`StructuredValue`] into an XML document
//!
//! Both are configured once and then reused; neither keeps state between calls.
//! Parsing and writing go through the [`XmlTreeCodec`] trait (backed by `quick-xml`),
//! while the folding rules live in [`fold`] and only ever see trees.
//!
//! # Examples
//!
//! ```
//! use markup_batch_rs::markup::{XmlDeserializerBuilder, XmlSerializerBuilder};
//!
//! let xml = r#"
//! <patients>
//!   <patient>
//!     <id>1</id>
//!     <demographics>
//!       <first>Bozo</first>
//!       <last>Clown</last>
//!     </demographics>
//!   </patient>
//! </patients>
//! "#;
//!
//! let value = XmlDeserializerBuilder::new().build().deserialize(Some(xml)).unwrap();
//!
//! let out = XmlSerializerBuilder::new()
//!     .root_name("patients")
//!     .no_attributes(false)
//!     .build()
//!     .unwrap()
//!     .serialize(&value)
//!     .unwrap();
//!
//! assert_eq!(
//!     out,
//!     "<patients>\n  <patient id=\"1\">\n    <demographics first=\"Bozo\" last=\"Clown\" />\n  </patient>\n</patients>\n"
//! );
//! ```

pub mod config;
pub mod deserializer;
pub mod fold;
pub mod serializer;
pub mod tree;
pub mod value;

pub use config::{
    DEFAULT_ANONYMOUS_TAG, DEFAULT_CONTENT_KEY, DEFAULT_MAX_DEPTH, DEFAULT_ROOT_NAME,
    XmlDeserializerConfig, XmlSerializerConfig, is_xml_name,
};
pub use deserializer::{XmlDeserializer, XmlDeserializerBuilder};
pub use serializer::{XmlSerializer, XmlSerializerBuilder};
pub use tree::{QuickXmlCodec, XmlElement, XmlNode, XmlTreeCodec};
pub use value::{Object, StructuredValue};
