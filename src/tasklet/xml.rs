//! # XML Tasklets
//!
//! Tasklets converting the content of a [`Payload`] register between XML text and
//! [`StructuredValue`]s. Each tasklet reads its register, converts the value and
//! overwrites the register with the result.
//!
//! - [`DeserializeXmlTasklet`] replaces XML text with the structured value it describes
//! - [`SerializeXmlTasklet`] replaces a structured value with its XML text
//!
//! # Examples
//!
//! ```
//! use markup_batch_rs::core::payload::Payload;
//! use markup_batch_rs::core::step::{StepExecution, Tasklet};
//! use markup_batch_rs::markup::StructuredValue;
//! use markup_batch_rs::tasklet::xml::DeserializeXmlTaskletBuilder;
//!
//! # fn example() -> Result<(), markup_batch_rs::BatchError> {
//! let payload = Payload::new().with_register("patients", "<patients><patient><id>1</id></patient></patients>");
//!
//! let tasklet = DeserializeXmlTaskletBuilder::new()
//!     .register("patients")
//!     .payload(&payload)
//!     .build()?;
//!
//! tasklet.execute(&StepExecution::new("deserialize"))?;
//!
//! let patient = payload.get("patients");
//! assert_eq!(
//!     patient.get("patient").and_then(|p| p.get("id")),
//!     Some(&StructuredValue::from("1"))
//! );
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use log::{debug, info};

use crate::BatchError;
use crate::core::build_name;
use crate::core::payload::{DEFAULT_REGISTER, Payload};
use crate::core::step::{RepeatStatus, StepExecution, Tasklet};
use crate::markup::{
    StructuredValue, XmlDeserializer, XmlDeserializerBuilder, XmlDeserializerConfig,
    XmlSerializer, XmlSerializerBuilder, XmlSerializerConfig,
};

/// Parses the XML text held in a register and stores the resulting value in its place.
///
/// An empty or never written register becomes [`StructuredValue::Null`].
pub struct DeserializeXmlTasklet<'a> {
    name: String,
    register: String,
    deserializer: XmlDeserializer,
    payload: &'a Payload,
}

impl DeserializeXmlTasklet<'_> {
    /// Name used in the tasklet's log messages.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Register read and overwritten on each execution.
    pub fn register(&self) -> &str {
        &self.register
    }
}

impl Tasklet for DeserializeXmlTasklet<'_> {
    /// # Returns
    /// - `Ok(RepeatStatus::Finished)`: The register now holds the deserialized value
    /// - `Err(BatchError::Register)`: The register holds an object or a sequence
    /// - `Err(BatchError::Parse)`: The register holds malformed XML
    fn execute(&self, step_execution: &StepExecution) -> Result<RepeatStatus, BatchError> {
        info!(
            "Deserializing XML register '{}' in step {}",
            self.register, step_execution.name
        );

        let value = match self.payload.get(&self.register) {
            StructuredValue::Null => StructuredValue::Null,
            StructuredValue::Text(xml) => self.deserializer.deserialize(Some(&xml))?,
            other => {
                return Err(BatchError::Register(format!(
                    "register '{}' holds {} where XML text is expected",
                    self.register,
                    other.kind()
                )));
            }
        };

        debug!(
            "Tasklet {} stores {} value in register '{}'",
            self.name,
            value.kind(),
            self.register
        );
        self.payload.set(self.register.as_str(), value);

        Ok(RepeatStatus::Finished)
    }
}

/// Builder for [`DeserializeXmlTasklet`].
#[derive(Default)]
pub struct DeserializeXmlTaskletBuilder<'a> {
    name: Option<String>,
    register: Option<String>,
    deserializer: XmlDeserializerBuilder,
    payload: Option<&'a Payload>,
}

impl<'a> DeserializeXmlTaskletBuilder<'a> {
    /// Creates a builder reading the default register.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name used in log messages. A random name is generated when not set.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Register read and overwritten by the tasklet. Defaults to [`DEFAULT_REGISTER`].
    pub fn register<S: Into<String>>(mut self, register: S) -> Self {
        self.register = Some(register.into());
        self
    }

    /// Wraps every element field in a sequence, even when the tag appears once.
    pub fn force_array(mut self, force_array: bool) -> Self {
        self.deserializer = self.deserializer.force_array(force_array);
        self
    }

    /// Replaces the whole deserializer configuration.
    pub fn config(mut self, config: XmlDeserializerConfig) -> Self {
        self.deserializer = self.deserializer.config(config);
        self
    }

    /// Payload holding the register. Required.
    pub fn payload(mut self, payload: &'a Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// # Errors
    /// Returns `BatchError::Configuration` when no payload was given.
    pub fn build(self) -> Result<DeserializeXmlTasklet<'a>, BatchError> {
        let payload = self.payload.ok_or_else(|| {
            BatchError::Configuration("Payload is required for XML deserialization".to_string())
        })?;

        Ok(DeserializeXmlTasklet {
            name: self.name.unwrap_or_else(build_name),
            register: self
                .register
                .unwrap_or_else(|| DEFAULT_REGISTER.to_string()),
            deserializer: self.deserializer.build(),
            payload,
        })
    }
}

/// Writes the value held in a register as XML text and stores the text in its place.
///
/// A never written register is serialized as an empty object, giving an empty
/// wrapper element.
pub struct SerializeXmlTasklet<'a> {
    name: String,
    register: String,
    serializer: XmlSerializer,
    payload: &'a Payload,
}

impl SerializeXmlTasklet<'_> {
    /// Name used in the tasklet's log messages.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Register read and overwritten on each execution.
    pub fn register(&self) -> &str {
        &self.register
    }
}

impl Tasklet for SerializeXmlTasklet<'_> {
    fn execute(&self, step_execution: &StepExecution) -> Result<RepeatStatus, BatchError> {
        info!(
            "Serializing register '{}' to XML in step {}",
            self.register, step_execution.name
        );

        let value = self.payload.get(&self.register);
        let xml = self.serializer.serialize(&value)?;

        debug!(
            "Tasklet {} stores {} bytes of XML in register '{}'",
            self.name,
            xml.len(),
            self.register
        );
        self.payload
            .set(self.register.as_str(), StructuredValue::Text(xml));

        Ok(RepeatStatus::Finished)
    }
}

/// Builder for [`SerializeXmlTasklet`].
///
/// # Examples
///
/// ```
/// use markup_batch_rs::core::payload::Payload;
/// use markup_batch_rs::core::step::{StepExecution, Tasklet};
/// use markup_batch_rs::markup::Object;
/// use markup_batch_rs::tasklet::xml::SerializeXmlTaskletBuilder;
///
/// # fn example() -> Result<(), markup_batch_rs::BatchError> {
/// let payload = Payload::new().with_register("row", Object::from_iter([("id", "7")]));
///
/// let tasklet = SerializeXmlTaskletBuilder::new()
///     .register("row")
///     .root_name("row")
///     .no_attributes(false)
///     .payload(&payload)
///     .build()?;
///
/// tasklet.execute(&StepExecution::new("serialize"))?;
/// assert_eq!(payload.get("row").as_text(), Some("<row id=\"7\" />\n"));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Default)]
pub struct SerializeXmlTaskletBuilder<'a> {
    name: Option<String>,
    register: Option<String>,
    serializer: XmlSerializerBuilder,
    payload: Option<&'a Payload>,
}

impl<'a> SerializeXmlTaskletBuilder<'a> {
    /// Creates a builder reading the default register.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name used in log messages. A random name is generated when not set.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Register read and overwritten by the tasklet. Defaults to [`DEFAULT_REGISTER`].
    pub fn register<S: Into<String>>(mut self, register: S) -> Self {
        self.register = Some(register.into());
        self
    }

    /// When true (the default) every field becomes a nested element.
    pub fn no_attributes(mut self, no_attributes: bool) -> Self {
        self.serializer = self.serializer.no_attributes(no_attributes);
        self
    }

    /// Tag of the wrapper element. An empty name selects `opt`.
    pub fn root_name<S: Into<String>>(mut self, root_name: S) -> Self {
        self.serializer = self.serializer.root_name(root_name);
        self
    }

    /// Replaces the whole serializer configuration.
    pub fn config(mut self, config: XmlSerializerConfig) -> Self {
        self.serializer = self.serializer.config(config);
        self
    }

    /// Payload holding the register. Required.
    pub fn payload(mut self, payload: &'a Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// # Errors
    /// Returns `BatchError::Configuration` when no payload was given or when the
    /// root name is not a usable tag.
    pub fn build(self) -> Result<SerializeXmlTasklet<'a>, BatchError> {
        let payload = self.payload.ok_or_else(|| {
            BatchError::Configuration("Payload is required for XML serialization".to_string())
        })?;

        Ok(SerializeXmlTasklet {
            name: self.name.unwrap_or_else(build_name),
            register: self
                .register
                .unwrap_or_else(|| DEFAULT_REGISTER.to_string()),
            serializer: self.serializer.build()?,
            payload,
        })
    }
}
