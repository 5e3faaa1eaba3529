#![allow(dead_code)]

pub mod mocks;

use markup_batch_rs::markup::{Object, StructuredValue};

pub const PATIENTS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
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

pub const PATIENTS_ATTRIBUTES_XML: &str = r#"<patients>
  <patient id="1">
    <demographics first="Bozo" last="Clown" />
  </patient>
  <patient id="2">
    <demographics first="Frank" last="Rizzo" />
  </patient>
</patients>
"#;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn patient(id: &str, first: &str, last: &str) -> StructuredValue {
    Object::from_iter([
        ("id", StructuredValue::from(id)),
        (
            "demographics",
            Object::from_iter([("first", first), ("last", last)]).into(),
        ),
    ])
    .into()
}

/// The value both patient fixtures fold to.
pub fn patients() -> StructuredValue {
    Object::from_iter([(
        "patient",
        StructuredValue::Sequence(vec![
            patient("1", "Bozo", "Clown"),
            patient("2", "Frank", "Rizzo"),
        ]),
    )])
    .into()
}
