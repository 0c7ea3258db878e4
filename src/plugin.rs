//! The third-party widgets a page brings along.
//!
//! Production pages load the jQuery `formRender` and jQuery UI `datepicker` plugins,
//! which [`JqueryFormRender`] and [`JqueryDatePicker`] call into.

use crate::{render::FormSchema, Error};
use js_sys::{Array, Object, Reflect};
use tracing::{debug, instrument};
use wasm_bindgen::{prelude::wasm_bindgen, JsValue};

/// Turns a schema into form markup.
pub trait FormRenderPlugin {
	/// Renders `schema` into `host`, which is detached from the document.
	///
	/// # Errors
	///
	/// Iff the plugin rejects the schema or fails otherwise.
	fn render(&self, host: &web_sys::Element, schema: &FormSchema) -> Result<(), Error>;
}

/// Turns text inputs into date pickers.
pub trait DatePicker {
	/// # Errors
	///
	/// Iff the widget can't be attached.
	fn attach(&self, inputs: &[web_sys::HtmlInputElement]) -> Result<(), Error>;
}

#[wasm_bindgen]
extern "C" {
	type JQuery;

	#[wasm_bindgen(catch, js_name = jQuery)]
	fn jquery(target: &JsValue) -> Result<JQuery, JsValue>;

	#[wasm_bindgen(method, catch, js_name = formRender)]
	fn form_render(this: &JQuery, options: &JsValue) -> Result<JsValue, JsValue>;

	#[wasm_bindgen(method, catch)]
	fn datepicker(this: &JQuery) -> Result<JsValue, JsValue>;
}

/// `{dataType: "json", formData: <schema>}`
///
/// # Errors
///
/// Iff the schema can't be converted into a JavaScript value.
pub fn render_options(schema: &FormSchema) -> Result<JsValue, Error> {
	let options = Object::new();
	let form_data = js_sys::JSON::parse(schema.raw()).map_err(Error::plugin)?;
	Reflect::set(&options, &JsValue::from_str("dataType"), &JsValue::from_str("json")).map_err(Error::plugin)?;
	Reflect::set(&options, &JsValue::from_str("formData"), &form_data).map_err(Error::plugin)?;
	Ok(options.into())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JqueryFormRender;

impl FormRenderPlugin for JqueryFormRender {
	#[instrument(skip(host, schema))]
	fn render(&self, host: &web_sys::Element, schema: &FormSchema) -> Result<(), Error> {
		let options = render_options(schema)?;
		jquery(host.as_ref()).and_then(|host| host.form_render(&options)).map_err(Error::plugin)?;
		debug!("formRender done.");
		Ok(())
	}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JqueryDatePicker;

impl DatePicker for JqueryDatePicker {
	#[instrument(skip(inputs), fields(inputs = inputs.len()))]
	fn attach(&self, inputs: &[web_sys::HtmlInputElement]) -> Result<(), Error> {
		if inputs.is_empty() {
			return Ok(());
		}
		let elements: Array = inputs.iter().collect();
		jquery(elements.as_ref()).and_then(|inputs| inputs.datepicker()).map(drop).map_err(|error| Error::DatePicker(format!("{:?}", error)))
	}
}
