//! Folding policy between XML trees and [`StructuredValue`]s.
//!
//! Reading (`fold_document`):
//! - the root element is a wrapper; its content becomes the result
//! - attributes and child elements share the key space of one object
//! - repeated tags collapse into a sequence, in document order
//! - under force-array every child element field is a sequence
//! - a leaf element with text folds to a text value, an empty one to an empty object
//! - text mixed with attributes or children lands under the content key, trimmed
//!
//! Writing (`unfold_document`) is the inverse, wrapping the value in the configured
//! root element and optionally turning text fields into attributes. Keys that are
//! not XML names are refused rather than written out as broken markup.
//!
//! Both directions stop at the configured `max_depth`, the root element being at
//! depth 1.

use crate::error::BatchError;
use crate::markup::config::{XmlDeserializerConfig, XmlSerializerConfig, is_xml_name};
use crate::markup::tree::{XmlElement, XmlNode};
use crate::markup::value::{Object, StructuredValue};

/// Folds a parsed document into a value, discarding the root wrapper.
pub fn fold_document(
    root: &XmlElement,
    config: &XmlDeserializerConfig,
) -> Result<StructuredValue, BatchError> {
    fold_element(root, config, 1)
}

fn fold_element(
    element: &XmlElement,
    config: &XmlDeserializerConfig,
    depth: usize,
) -> Result<StructuredValue, BatchError> {
    if depth > config.max_depth {
        return Err(BatchError::Parse(format!(
            "document nests deeper than {} elements at <{}>",
            config.max_depth, element.name
        )));
    }

    let text = element.text();
    let has_text = !text.trim().is_empty();

    if element.attributes.is_empty() && element.child_elements().next().is_none() {
        return Ok(if has_text {
            StructuredValue::Text(text)
        } else {
            StructuredValue::Object(Object::new())
        });
    }

    let mut object = Object::new();

    for (key, value) in &element.attributes {
        merge_field(&mut object, key, StructuredValue::from(value.as_str()), false);
    }

    for child in element.child_elements() {
        let value = fold_element(child, config, depth + 1)?;
        merge_field(&mut object, &child.name, value, config.force_array);
    }

    // Mixed text is indented by the writer, only its trimmed form survives
    if has_text {
        let content = StructuredValue::from(text.trim());
        merge_field(&mut object, &config.content_key, content, false);
    }

    Ok(StructuredValue::Object(object))
}

/// Adds `value` under `key`. A key seen before turns into a sequence of every value
/// it received; with `wrap` a first occurrence already starts a sequence.
///
/// Attributes go through here too, so an attribute and a same-named child element
/// end up as `[attribute, child, ...]`.
fn merge_field(object: &mut Object, key: &str, value: StructuredValue, wrap: bool) {
    match object.get_mut(key) {
        None if wrap => {
            object.insert(key, StructuredValue::Sequence(vec![value]));
        }
        None => {
            object.insert(key, value);
        }
        Some(StructuredValue::Sequence(items)) => items.push(value),
        Some(existing) => {
            let first = std::mem::take(existing);
            *existing = StructuredValue::Sequence(vec![first, value]);
        }
    }
}

/// Builds the document tree for `value`, wrapped in the configured root element.
/// `Null` produces an empty root.
///
/// # Errors
/// Returns `BatchError::Serialize` when a key is not an XML name or when the value
/// nests deeper than `max_depth` elements.
pub fn unfold_document(
    value: &StructuredValue,
    config: &XmlSerializerConfig,
) -> Result<XmlElement, BatchError> {
    let mut root = XmlElement::new(config.effective_root_name());
    unfold_into(&mut root, value, config, 1)?;
    Ok(root)
}

fn unfold_into(
    element: &mut XmlElement,
    value: &StructuredValue,
    config: &XmlSerializerConfig,
    depth: usize,
) -> Result<(), BatchError> {
    match value {
        StructuredValue::Null => {}
        StructuredValue::Text(text) => element.children.push(XmlNode::Text(text.clone())),
        StructuredValue::Sequence(items) => {
            for item in items {
                push_child(element, &config.anonymous_tag, item, config, depth)?;
            }
        }
        StructuredValue::Object(object) => {
            for (key, field) in object {
                match field {
                    StructuredValue::Text(text) if *key == config.content_key => {
                        element.children.push(XmlNode::Text(text.clone()));
                    }
                    StructuredValue::Text(text) if !config.no_attributes => {
                        ensure_name(key)?;
                        element.attributes.push((key.clone(), text.clone()));
                    }
                    StructuredValue::Sequence(items) => {
                        for item in items {
                            push_child(element, key, item, config, depth)?;
                        }
                    }
                    other => push_child(element, key, other, config, depth)?,
                }
            }
        }
    }
    Ok(())
}

fn push_child(
    parent: &mut XmlElement,
    name: &str,
    value: &StructuredValue,
    config: &XmlSerializerConfig,
    parent_depth: usize,
) -> Result<(), BatchError> {
    ensure_name(name)?;
    if parent_depth >= config.max_depth {
        return Err(BatchError::Serialize(format!(
            "value nests deeper than {} elements at <{}>",
            config.max_depth, name
        )));
    }

    let mut child = XmlElement::new(name);
    unfold_into(&mut child, value, config, parent_depth + 1)?;
    parent.children.push(XmlNode::Element(child));
    Ok(())
}

fn ensure_name(key: &str) -> Result<(), BatchError> {
    if is_xml_name(key) {
        Ok(())
    } else {
        Err(BatchError::Serialize(format!(
            "key '{}' is not a valid XML name",
            key
        )))
    }
}
