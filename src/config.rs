//! Per-form options.
//!
//! The page can configure a form through a `data-options` JSON attribute on the form container:
//!
//! ```json
//! {"endpoint": "/forms/12/submit/", "company": "8d3c…", "unmatchedErrors": "discard", "revealSubmit": false}
//! ```
//!
//! Older pages instead declare the `storageApiUrl` and `companyId` globals, which are honored
//! whenever `data-options` does not override them.

use crate::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, instrument};
use wasm_bindgen::JsValue;

pub const DEFAULT_ENDPOINT: &str = "/api/v2/core/formstorages/?format=json";
pub const DEFAULT_CONTAINER_SELECTOR: &str = "#form-builder";
pub const DEFAULT_SCHEMA_ATTRIBUTE: &str = "data-config";
pub const OPTIONS_ATTRIBUTE: &str = "data-options";

const ENDPOINT_GLOBAL: &str = "storageApiUrl";
const COMPANY_GLOBAL: &str = "companyId";

/// What happens to validation messages that can't be placed next to a rendered field.
///
/// This covers the form-wide `__all__` key as well as field names the rendered form doesn't contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnmatchedErrors {
	/// List them in the form's `.all-errors` container and reveal it.
	Surface,
	/// Drop them. They are still logged at `DEBUG` level.
	Discard,
}

impl Default for UnmatchedErrors {
	fn default() -> Self {
		Self::Surface
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
	endpoint: String,
	company: Option<String>,
	unmatched_errors: UnmatchedErrors,
	reveal_submit: bool,
	container_selector: String,
	schema_attribute: String,
}

impl Default for FormConfig {
	fn default() -> Self {
		Self {
			endpoint: DEFAULT_ENDPOINT.to_owned(),
			company: None,
			unmatched_errors: UnmatchedErrors::default(),
			reveal_submit: true,
			container_selector: DEFAULT_CONTAINER_SELECTOR.to_owned(),
			schema_attribute: DEFAULT_SCHEMA_ATTRIBUTE.to_owned(),
		}
	}
}

impl FormConfig {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = endpoint.into();
		self
	}

	/// Every submission then carries a `company` field with this value, replacing any the form itself contains.
	#[must_use]
	pub fn with_company(mut self, company: impl Into<String>) -> Self {
		self.company = Some(company.into());
		self
	}

	#[must_use]
	pub fn with_unmatched_errors(mut self, unmatched_errors: UnmatchedErrors) -> Self {
		self.unmatched_errors = unmatched_errors;
		self
	}

	#[must_use]
	pub fn with_reveal_submit(mut self, reveal_submit: bool) -> Self {
		self.reveal_submit = reveal_submit;
		self
	}

	#[must_use]
	pub fn with_container_selector(mut self, container_selector: impl Into<String>) -> Self {
		self.container_selector = container_selector.into();
		self
	}

	#[must_use]
	pub fn with_schema_attribute(mut self, schema_attribute: impl Into<String>) -> Self {
		self.schema_attribute = schema_attribute.into();
		self
	}

	#[must_use]
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	#[must_use]
	pub fn company(&self) -> Option<&str> {
		self.company.as_deref()
	}

	#[must_use]
	pub fn unmatched_errors(&self) -> UnmatchedErrors {
		self.unmatched_errors
	}

	#[must_use]
	pub fn reveal_submit(&self) -> bool {
		self.reveal_submit
	}

	#[must_use]
	pub fn container_selector(&self) -> &str {
		&self.container_selector
	}

	#[must_use]
	pub fn schema_attribute(&self) -> &str {
		&self.schema_attribute
	}

	/// Overrides whatever `options` sets, leaving the rest untouched.
	#[must_use]
	pub fn merge(mut self, options: PageOptions) -> Self {
		let PageOptions {
			endpoint,
			company,
			unmatched_errors,
			reveal_submit,
			schema_attribute,
		} = options;
		if let Some(endpoint) = endpoint {
			self.endpoint = endpoint;
		}
		if company.is_some() {
			self.company = company;
		}
		if let Some(unmatched_errors) = unmatched_errors {
			self.unmatched_errors = unmatched_errors;
		}
		if let Some(reveal_submit) = reveal_submit {
			self.reveal_submit = reveal_submit;
		}
		if let Some(schema_attribute) = schema_attribute {
			self.schema_attribute = schema_attribute;
		}
		self
	}

	/// Reads the legacy page globals first and then the container's `data-options`, so the latter wins.
	///
	/// # Errors
	///
	/// Iff `data-options` is present but not valid JSON of the expected shape.
	#[instrument(skip(self, container))]
	pub fn with_page_options(self, container: &web_sys::Element) -> Result<Self, Error> {
		let mut config = self;
		if let Some(window) = web_sys::window() {
			config = config.merge(PageOptions::from_globals(window.as_ref()));
		}
		match container.get_attribute(OPTIONS_ATTRIBUTE) {
			Some(json) => {
				debug!("Applying {} from the form container.", OPTIONS_ATTRIBUTE);
				Ok(config.merge(PageOptions::parse(&json)?))
			}
			None => Ok(config),
		}
	}
}

/// The subset of [`FormConfig`] a page may set.
///
/// The container selector isn't part of it, as it's needed to find these options in the first place.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PageOptions {
	pub endpoint: Option<String>,
	#[serde(default, deserialize_with = "company_id")]
	pub company: Option<String>,
	pub unmatched_errors: Option<UnmatchedErrors>,
	pub reveal_submit: Option<bool>,
	pub schema_attribute: Option<String>,
}

impl PageOptions {
	/// # Errors
	///
	/// Iff `json` isn't an object of the expected shape.
	pub fn parse(json: &str) -> Result<Self, Error> {
		serde_json::from_str(json).map_err(Error::Config)
	}

	fn from_globals(global: &JsValue) -> Self {
		let get = |name: &str| js_sys::Reflect::get(global, &JsValue::from_str(name)).ok().filter(|value| !value.is_undefined() && !value.is_null());
		Self {
			endpoint: get(ENDPOINT_GLOBAL).and_then(|value| value.as_string()),
			company: get(COMPANY_GLOBAL).and_then(|value| value.as_string().or_else(|| value.as_f64().map(format_number))),
			..Self::default()
		}
	}
}

/// Company identifiers are primary keys, which pages emit both quoted and unquoted.
fn company_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
	Ok(match Option::<Value>::deserialize(deserializer)? {
		None | Some(Value::Null) => None,
		Some(Value::String(company)) => Some(company),
		Some(other) => Some(other.to_string()),
	})
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(number: f64) -> String {
	if number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 {
		format!("{}", number as i64)
	} else {
		number.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = FormConfig::default();
		assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
		assert_eq!(config.company(), None);
		assert_eq!(config.unmatched_errors(), UnmatchedErrors::Surface);
		assert!(config.reveal_submit());
		assert_eq!(config.container_selector(), "#form-builder");
		assert_eq!(config.schema_attribute(), "data-config");
	}

	#[test]
	fn page_options_override_only_what_they_set() {
		let options = PageOptions::parse(r#"{"endpoint": "/forms/3/", "unmatchedErrors": "discard"}"#).unwrap();
		let config = FormConfig::new().with_company("7").merge(options);
		assert_eq!(config.endpoint(), "/forms/3/");
		assert_eq!(config.company(), Some("7"));
		assert_eq!(config.unmatched_errors(), UnmatchedErrors::Discard);
		assert!(config.reveal_submit());
	}

	#[test]
	fn numeric_company() {
		let options = PageOptions::parse(r#"{"company": 42}"#).unwrap();
		assert_eq!(options.company.as_deref(), Some("42"));

		let options = PageOptions::parse(r#"{"company": null}"#).unwrap();
		assert_eq!(options.company, None);
	}

	#[test]
	fn unknown_options_are_rejected() {
		assert!(matches!(PageOptions::parse(r#"{"endpiont": "/typo/"}"#), Err(Error::Config(_))));
	}

	#[test]
	fn whole_numbers_format_without_fraction() {
		assert_eq!(format_number(12.0), "12");
		assert_eq!(format_number(1.5), "1.5");
	}
}
