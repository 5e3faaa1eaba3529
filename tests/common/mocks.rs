//! Mock version of the XML tree codec.
use mockall::mock;

use markup_batch_rs::{
    BatchError,
    markup::{XmlElement, XmlTreeCodec},
};

mock! {
    pub Codec {}
    impl XmlTreeCodec for Codec {
        fn parse_to_tree(&self, input: &str) -> Result<XmlElement, BatchError>;
        fn tree_to_xml_string(&self, root: &XmlElement) -> Result<String, BatchError>;
    }
}
