//! Shapes of the form storage endpoint's JSON replies.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Keys under which the backend reports errors that concern the whole form.
pub const FORM_WIDE_KEYS: &[&str] = &["__all__", "non_field_errors"];

#[must_use]
pub fn is_form_wide(key: &str) -> bool {
	FORM_WIDE_KEYS.contains(&key)
}

/// Body of a 2xx reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuccessResponse {
	pub message: String,
}

impl SuccessResponse {
	/// # Errors
	///
	/// Iff `body` isn't a JSON object with a string `message`.
	pub fn parse(body: &str) -> serde_json::Result<Self> {
		serde_json::from_str(body)
	}
}

/// Body of a failed submission: messages per field, in the order the server listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorResponse {
	entries: Vec<(String, Vec<String>)>,
}

impl ErrorResponse {
	/// Accepts lists of strings as well as single strings per key.
	/// Nested serializer errors are flattened to their JSON text rather than rejected.
	///
	/// # Errors
	///
	/// Iff `body` isn't a JSON object.
	pub fn parse(body: &str) -> serde_json::Result<Self> {
		let map: Map<String, Value> = serde_json::from_str(body)?;
		Ok(map.into_iter().map(|(field, value)| (field, messages(value))).collect())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.entries.iter().map(|(field, messages)| (field.as_str(), messages.as_slice()))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl core::iter::FromIterator<(String, Vec<String>)> for ErrorResponse {
	fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
		Self { entries: iter.into_iter().collect() }
	}
}

fn messages(value: Value) -> Vec<String> {
	match value {
		Value::Array(items) => items.into_iter().map(message).collect(),
		Value::Null => Vec::new(),
		other => vec![message(other)],
	}
}

fn message(value: Value) -> String {
	match value {
		Value::String(message) => message,
		other => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn success_message() {
		assert_eq!(SuccessResponse::parse(r#"{"message": "Saved.", "id": 3}"#).unwrap().message, "Saved.");
		assert!(SuccessResponse::parse(r#"{"id": 3}"#).is_err());
	}

	#[test]
	fn keeps_response_order() {
		let response = ErrorResponse::parse(r#"{"zip": ["a"], "email": ["b", "c"], "__all__": ["d"]}"#).unwrap();
		let fields: Vec<_> = response.iter().map(|(field, _)| field).collect();
		assert_eq!(fields, ["zip", "email", "__all__"]);
		assert_eq!(response.iter().nth(1).unwrap().1, ["b", "c"]);
	}

	#[test]
	fn single_string_is_one_message() {
		let response = ErrorResponse::parse(r#"{"detail": "CSRF Failed."}"#).unwrap();
		assert_eq!(response.iter().next().unwrap().1, ["CSRF Failed."]);
	}

	#[test]
	fn nested_errors_are_flattened() {
		let response = ErrorResponse::parse(r#"{"address": [{"zip": ["bad"]}]}"#).unwrap();
		assert_eq!(response.iter().next().unwrap().1, [r#"{"zip":["bad"]}"#]);
	}

	#[test]
	fn rejects_non_objects() {
		assert!(ErrorResponse::parse("[]").is_err());
		assert!(ErrorResponse::parse("<html>").is_err());
	}

	#[test]
	fn form_wide_keys() {
		assert!(is_form_wide("__all__"));
		assert!(is_form_wide("non_field_errors"));
		assert!(!is_form_wide("email"));
	}
}
