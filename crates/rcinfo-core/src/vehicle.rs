//! Read-only view over the raw vehicle detail object returned upstream.
//!
//! The upstream payload is irregular: fields come and go, nest under
//! `full_details` / `ds_details[0]`, and switch between strings, numbers and
//! booleans. Nothing is validated here; fields are addressed by JSON pointer
//! and anything null or empty reads as absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleRecord(Value);

impl VehicleRecord {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Raw value at a JSON pointer (`/full_details/engineNo`), present or not.
    pub fn value(&self, pointer: &str) -> Option<&Value> {
        self.0.pointer(pointer).filter(|v| !is_blank(v))
    }

    /// Display text of the value at `pointer`, if present.
    pub fn text(&self, pointer: &str) -> Option<String> {
        self.value(pointer).and_then(display_text)
    }

    /// First present alternative, in priority order.
    pub fn first_text(&self, pointers: &[&str]) -> Option<String> {
        pointers.iter().find_map(|p| self.text(p))
    }

    pub fn registration_number(&self) -> Option<String> {
        self.text("/registrationNumber")
    }

    pub fn make_display(&self) -> Option<String> {
        self.text("/brand/make_display")
    }

    pub fn model_display(&self) -> Option<String> {
        self.text("/model/model_display")
    }

    pub fn fuel_type(&self) -> Option<String> {
        self.text("/fuelType")
    }

    pub fn model_image_url(&self) -> Option<String> {
        self.text("/modelImageUrl")
    }

    pub fn make_logo(&self) -> Option<String> {
        self.text("/makeLogo")
    }

    /// `"{make} {model}"` with whatever parts are known, for captions and headings.
    pub fn make_and_model(&self) -> String {
        let make = self.make_display().unwrap_or_default();
        let model = self.model_display().unwrap_or_default();
        format!("{make} {model}").trim().to_string()
    }
}

impl From<Value> for VehicleRecord {
    fn from(raw: Value) -> Self {
        Self(raw)
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Scalars render as text; arrays and objects have no display form.
pub(crate) fn display_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
