//! The anti-forgery token travels from the form's hidden input to a request header.

use tracing::warn;
use wasm_bindgen::JsCast;

/// The form field name Django renders its CSRF token into.
pub const CSRF_FORM_FIELD: &str = "csrfmiddlewaretoken";

/// The header name Django expects CSRF tokens under in AJAX requests.
pub const CSRF_HEADER_NAME: &str = "X-CSRFToken";

/// Reads the token from `<input name="csrfmiddlewaretoken">` inside `form`.
#[must_use]
pub fn csrf_token(form: &web_sys::Element) -> Option<String> {
	let selector = format!("input[name=\"{}\"]", CSRF_FORM_FIELD);
	let input = match form.query_selector(&selector) {
		Ok(Some(input)) => input,
		Ok(None) => {
			warn!("No CSRF token input in the form; Submitting without {} header.", CSRF_HEADER_NAME);
			return None;
		}
		Err(error) => {
			warn!("CSRF token lookup failed: {:?}", error);
			return None;
		}
	};
	let input: web_sys::HtmlInputElement = input.dyn_into().ok()?;
	Some(input.value())
}
