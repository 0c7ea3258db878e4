use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong while rendering or submitting a form, except validation errors.
///
/// Validation errors returned by the server are not failures of this crate.
/// They are reported as [`SubmitOutcome::Invalid`](`crate::submit::SubmitOutcome::Invalid`) instead.
#[derive(Debug, Error)]
pub enum Error {
	#[error("no `window` available")]
	MissingWindow,

	#[error("no `document` available")]
	MissingDocument,

	#[error("no element matches {0:?}")]
	MissingContainer(String),

	#[error("the form container has no {0:?} attribute")]
	MissingAttribute(String),

	#[error("the form container is not placed inside a <form>")]
	MissingForm,

	#[error("invalid form schema: {0}")]
	Schema(#[source] serde_json::Error),

	#[error("invalid page configuration: {0}")]
	Config(#[source] serde_json::Error),

	#[error("form rendering plugin failed: {0}")]
	Plugin(String),

	#[error("date-picker failed: {0}")]
	DatePicker(String),

	#[error("request failed: {0}")]
	Transport(String),

	#[error("unexpected response with status {status}: {reason}")]
	UnexpectedResponse { status: u16, reason: String },

	#[error("DOM operation failed: {0}")]
	Dom(String),
}

impl Error {
	pub(crate) fn dom(js: JsValue) -> Self {
		Self::Dom(describe(&js))
	}

	pub(crate) fn plugin(js: JsValue) -> Self {
		Self::Plugin(describe(&js))
	}

	pub(crate) fn transport(js: JsValue) -> Self {
		Self::Transport(describe(&js))
	}
}

impl From<Error> for JsValue {
	fn from(error: Error) -> Self {
		JsValue::from_str(&error.to_string())
	}
}

/// Thrown JavaScript values are usually `Error` instances, which format poorly through [`JsValue`]'s `Debug`.
fn describe(js: &JsValue) -> String {
	match js.as_string() {
		Some(message) => message,
		None => match js_sys::Reflect::get(js, &JsValue::from_str("message")).ok().and_then(|message| message.as_string()) {
			Some(message) => message,
			None => format!("{:?}", js),
		},
	}
}
