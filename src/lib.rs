#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # Markup Batch for Rust

 XML deserialization and serialization jobs for batch pipelines.

 Documents travel between the steps of a job in the registers of a shared
 [`Payload`](core::payload::Payload). A deserialization step replaces the XML
 text of a register with a [`StructuredValue`](markup::StructuredValue), a tree of
 text, sequences and string-keyed objects. A serialization step does the
 opposite.

 ## Core Concepts

- **Job:** Represents the entire batch process. A `Job` is composed of one or more `Step`s run in order.
- **Step:** An independent, sequential phase of a batch job. Each step here runs a `Tasklet`.
- **Tasklet:** A single task, such as converting the content of one register.
- **ItemProcessor:** The business logic turning one item into another. Both XML
  components can be used as processors outside of a job.

 ## Folding rules

- Attributes and child elements become fields of an object, in document order.
- A tag repeated under the same parent becomes a sequence.
- An element holding only text becomes that text.
- With `force_array`, every element field is a sequence, even for a single occurrence.
- Serialization wraps the value in a root element (`opt` unless a root name is given)
  and writes every field as a nested element unless attributes are allowed.

 ## Getting Started

```rust
# use markup_batch_rs::{
#     core::{
#         job::{Job, JobBuilder},
#         payload::Payload,
#         step::{StepBuilder, StepStatus},
#     },
#     markup::StructuredValue,
#     tasklet::xml::{DeserializeXmlTaskletBuilder, SerializeXmlTaskletBuilder},
#     BatchError,
# };
fn main() -> Result<(), BatchError> {
    let xml = r#"
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

    let payload = Payload::new().with_register("patients", xml);

    let deserialize = DeserializeXmlTaskletBuilder::new()
        .register("patients")
        .payload(&payload)
        .build()?;

    let serialize = SerializeXmlTaskletBuilder::new()
        .register("patients")
        .root_name("patients")
        .no_attributes(false)
        .payload(&payload)
        .build()?;

    let read_step = StepBuilder::new("read-patients").tasklet(&deserialize).build();
    let write_step = StepBuilder::new("write-patients").tasklet(&serialize).build();

    let job = JobBuilder::new().start(&read_step).next(&write_step).build();
    let execution = job.run()?;

    assert!(execution
        .step_executions
        .iter()
        .all(|step| step.status == StepStatus::Success));

    assert_eq!(
        payload.get("patients"),
        StructuredValue::from(
            r#"<patients>
  <patient id="1">
    <demographics first="Bozo" last="Clown" />
  </patient>
  <patient id="2">
    <demographics first="Frank" last="Rizzo" />
  </patient>
</patients>
"#
        )
    );

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

pub use error::*;

/// Conversion between XML documents and structured values
pub mod markup;

/// Tasklets binding the XML components to payload registers
pub mod tasklet;
