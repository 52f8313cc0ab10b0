//! Field descriptors
//!
//! Declarative description of one form control, deserializable from the
//! usual JSON config shape:
//!
//! ```json
//! { "type": "checkbox", "key": "skills", "label": "Skills",
//!   "options": [{ "value": "rust", "innerText": "Rust" }] }
//! ```

use crate::form::error::{DescriptorError, FormError, FormResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Kind of control a descriptor produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Number,
    Password,
    Date,
    #[serde(alias = "datetime-local")]
    Datetime,
    Time,
    Url,
    Search,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Hidden,
    Submit,
    Reset,
}

impl FieldType {
    /// `type` attribute for single-line inputs; `None` for everything else
    pub fn input_type(&self) -> Option<&'static str> {
        match self {
            FieldType::Text => Some("text"),
            FieldType::Email => Some("email"),
            FieldType::Tel => Some("tel"),
            FieldType::Number => Some("number"),
            FieldType::Password => Some("password"),
            FieldType::Date => Some("date"),
            FieldType::Datetime => Some("datetime-local"),
            FieldType::Time => Some("time"),
            FieldType::Url => Some("url"),
            FieldType::Search => Some("search"),
            _ => None,
        }
    }

    /// Select, checkbox and radio need options
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Checkbox | FieldType::Radio)
    }

    pub fn is_button(&self) -> bool {
        matches!(self, FieldType::Submit | FieldType::Reset)
    }

    /// Whether the control contributes a value on submit
    pub fn is_value_bearing(&self) -> bool {
        !self.is_button() && *self != FieldType::Hidden
    }

    /// Default visible text for buttons
    pub fn action_word(&self) -> Option<&'static str> {
        match self {
            FieldType::Submit => Some("Submit"),
            FieldType::Reset => Some("Reset"),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Hidden => "hidden",
            FieldType::Submit => "submit",
            FieldType::Reset => "reset",
            other => other.input_type().unwrap_or("text"),
        };
        write!(f, "{}", name)
    }
}

/// Extra attributes for one option
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionAttr {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "className", alias = "class")]
    pub class_name: Option<String>,
}

/// One choice of a select, checkbox or radio field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
    #[serde(default, alias = "innerText")]
    pub label: Option<String>,
    #[serde(default)]
    pub attr: Option<OptionAttr>,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: Some(label.into()),
            attr: None,
        }
    }

    /// Visible text; falls back to the value
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

/// Declarative description of one form control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attr: Map<String, Value>,
}

impl FieldDescriptor {
    pub fn new(field_type: FieldType, key: impl Into<String>) -> Self {
        Self {
            field_type,
            key: key.into(),
            label: None,
            value: None,
            options: Vec::new(),
            attr: Map::new(),
        }
    }

    /// Builder method: set the label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builder method: set the initial value
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Builder method: add an option
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(FieldOption::new(value, label));
        self
    }

    /// Builder method: add an attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attr.insert(name.into(), value.into());
        self
    }

    /// Shape checks for a single descriptor
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.key.trim().is_empty() {
            return Err(DescriptorError::EmptyKey);
        }
        if self.field_type.is_choice() && self.options.is_empty() {
            return Err(DescriptorError::MissingOptions {
                key: self.key.clone(),
                field_type: self.field_type,
            });
        }
        Ok(())
    }
}

/// Parse a JSON list of descriptors, dropping entries that do not parse
///
/// Fails only when the payload is not JSON or not a list.
pub fn parse_descriptors(json: &str) -> FormResult<Vec<FieldDescriptor>> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(FormError::MalformedFields("expected a JSON array".to_string()));
    };

    let mut out = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<FieldDescriptor>(item) {
            Ok(descriptor) => out.push(descriptor),
            Err(e) => {
                let reason = DescriptorError::Unparseable(e.to_string());
                tracing::warn!("Skipping field descriptor #{}: {}", idx, reason);
            }
        }
    }
    Ok(out)
}

/// Keep descriptors that pass `validate` and have a key not seen before
pub fn sanitize_descriptors(descriptors: Vec<FieldDescriptor>) -> Vec<FieldDescriptor> {
    let mut seen = HashSet::new();
    descriptors
        .into_iter()
        .filter(|d| {
            let verdict = d.validate().and_then(|_| {
                if seen.insert(d.key.clone()) {
                    Ok(())
                } else {
                    Err(DescriptorError::DuplicateKey(d.key.clone()))
                }
            });
            match verdict {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Skipping invalid field descriptor: {}", e);
                    false
                }
            }
        })
        .collect()
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "option value must be a scalar, found {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_shape() {
        let json = r#"[
            { "type": "text", "key": "name", "label": "Name", "attr": { "placeholder": "Ada" } },
            { "type": "datetime-local", "key": "start" },
            { "type": "radio", "key": "level", "options": [
                { "value": 1, "innerText": "Junior" },
                { "value": "2", "label": "Senior", "attr": { "id": "lvl-2", "className": "pill" } }
            ] }
        ]"#;

        let fields = parse_descriptors(json).unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[1].field_type, FieldType::Datetime);
        assert_eq!(fields[2].options[0].value, "1");
        assert_eq!(fields[2].options[0].display_label(), "Junior");
        assert_eq!(
            fields[2].options[1].attr.as_ref().unwrap().class_name.as_deref(),
            Some("pill")
        );
    }

    #[test]
    fn test_parse_skips_unknown_types() {
        let json = r#"[{ "type": "color", "key": "c" }, { "type": "email", "key": "e" }]"#;
        let fields = parse_descriptors(json).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].key, "e");
    }

    #[test]
    fn test_parse_rejects_non_list() {
        let err = parse_descriptors(r#"{ "type": "text", "key": "a" }"#).unwrap_err();
        assert!(matches!(err, FormError::MalformedFields(_)));
    }

    #[test]
    fn test_validate_choice_needs_options() {
        let err = FieldDescriptor::new(FieldType::Select, "color").validate().unwrap_err();
        assert!(matches!(err, DescriptorError::MissingOptions { .. }));

        assert!(FieldDescriptor::new(FieldType::Select, "color")
            .option("red", "Red")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_sanitize_drops_invalid_and_duplicates() {
        let kept = sanitize_descriptors(vec![
            FieldDescriptor::new(FieldType::Text, "name"),
            FieldDescriptor::new(FieldType::Text, " "),
            FieldDescriptor::new(FieldType::Email, "name"),
            FieldDescriptor::new(FieldType::Checkbox, "skills"),
            FieldDescriptor::new(FieldType::Tel, "phone"),
        ]);
        let keys: Vec<_> = kept.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "phone"]);
    }

    #[test]
    fn test_field_type_display() {
        assert_eq!(FieldType::Datetime.to_string(), "datetime-local");
        assert_eq!(FieldType::Textarea.to_string(), "textarea");
        assert_eq!(FieldType::Submit.action_word(), Some("Submit"));
    }
}
