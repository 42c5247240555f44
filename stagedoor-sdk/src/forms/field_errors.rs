use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field-keyed validation messages.
///
/// One type carries both client-side schema failures and the backend's `422` error map, so
/// a form renders either source the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field`. Duplicate messages are kept once.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        let messages = self.0.entry(field.into()).or_default();
        let message = message.into();
        if !messages.contains(&message) {
            messages.push(message);
        }
        self
    }

    /// Record `message` against `field` unless `ok`. A field keeps its first failure only.
    pub fn check(&mut self, field: &str, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok && !self.contains(field) {
            self.add(field, message);
        }
        self
    }

    /// Fold `other` into `self`, field by field.
    pub fn merge(&mut self, other: FieldErrors) -> &mut Self {
        for (field, messages) in other.0 {
            for message in messages {
                self.add(field.clone(), message);
            }
        }
        self
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// The message shown next to `field`.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn clear_field(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Read the `errors` member of a `422` body.
    ///
    /// Accepts `{field: ["msg", ..]}` as well as `{field: "msg"}`; anything else is ignored.
    pub fn from_response_body(body: &Value) -> Self {
        let mut errors = FieldErrors::new();
        let Some(map) = body.get("errors").and_then(Value::as_object) else {
            return errors;
        };
        for (field, value) in map {
            match value {
                Value::String(message) => {
                    errors.add(field.clone(), message.clone());
                }
                Value::Array(items) => {
                    for message in items.iter().filter_map(Value::as_str) {
                        errors.add(field.clone(), message);
                    }
                }
                _ => {}
            }
        }
        errors
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_both_error_map_shapes() {
        let body = json!({
            "message": "The given data was invalid.",
            "errors": {
                "email": ["The email has already been taken."],
                "phone": "The phone format is invalid.",
                "ignored": 42
            }
        });
        let errors = FieldErrors::from_response_body(&body);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first("email"), Some("The email has already been taken."));
        assert_eq!(errors.first("phone"), Some("The phone format is invalid."));
        assert!(!errors.contains("ignored"));
    }

    #[test]
    fn merge_keeps_messages_once() {
        let mut client = FieldErrors::new();
        client.add("email", "Email is required");
        let mut server = FieldErrors::new();
        server.add("email", "Email is required");
        server.add("password", "Too weak");

        client.merge(server);
        assert_eq!(client.get("email").len(), 1);
        assert_eq!(client.first("password"), Some("Too weak"));
        assert_eq!(
            client.to_string(),
            "email: Email is required; password: Too weak"
        );
    }

    #[test]
    fn missing_errors_member_is_empty() {
        assert!(FieldErrors::from_response_body(&json!({"message": "nope"})).is_empty());
    }
}
