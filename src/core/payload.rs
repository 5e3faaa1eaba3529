use std::cell::RefCell;
use std::collections::HashMap;

use crate::markup::StructuredValue;

/// Register used by tasklets when none is configured.
pub const DEFAULT_REGISTER: &str = "default";

/// Named slots shared by the steps of a job.
///
/// Tasklets read a register, transform its value and overwrite it in place.
/// A register that was never written reads as [`StructuredValue::Null`].
///
/// # Examples
///
/// ```
/// use markup_batch_rs::core::payload::Payload;
/// use markup_batch_rs::markup::StructuredValue;
///
/// let payload = Payload::new().with_register("patients", "<patients/>");
///
/// assert_eq!(payload.get("patients"), StructuredValue::from("<patients/>"));
/// assert!(payload.get("missing").is_null());
///
/// payload.set("patients", StructuredValue::Null);
/// assert!(payload.contains("patients"));
/// ```
#[derive(Debug, Default)]
pub struct Payload {
    registers: RefCell<HashMap<String, StructuredValue>>,
}

impl Payload {
    /// Creates a payload with no registers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a register while building the payload.
    pub fn with_register<K, V>(self, register: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<StructuredValue>,
    {
        self.registers
            .borrow_mut()
            .insert(register.into(), value.into());
        self
    }

    /// Returns a copy of the register's value, or `Null` when it was never written.
    pub fn get(&self, register: &str) -> StructuredValue {
        self.registers
            .borrow()
            .get(register)
            .cloned()
            .unwrap_or_default()
    }

    /// Overwrites the register.
    pub fn set<K: Into<String>>(&self, register: K, value: StructuredValue) {
        self.registers.borrow_mut().insert(register.into(), value);
    }

    /// Whether the register was ever written, even with `Null`.
    pub fn contains(&self, register: &str) -> bool {
        self.registers.borrow().contains_key(register)
    }

    /// Clears the register, returning its last value.
    pub fn remove(&self, register: &str) -> Option<StructuredValue> {
        self.registers.borrow_mut().remove(register)
    }
}
