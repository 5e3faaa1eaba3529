use crate::error::BatchError;

/// Result of processing a single item.
pub type ItemProcessorResult<W> = Result<W, BatchError>;

/// Transforms an item of type `R` into an item of type `W`.
///
/// Both XML components implement this trait, so a pipeline can use them as
/// per-item processors:
/// - `XmlDeserializer`: `String` to `StructuredValue`
/// - `XmlSerializer`: `StructuredValue` to `String`
pub trait ItemProcessor<R, W> {
    fn process(&self, item: &R) -> ItemProcessorResult<W>;
}
