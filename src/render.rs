//! Form Renderer: schema in, interactive form out.

use crate::{
	config::FormConfig,
	fields::{FieldIndex, FormWideErrors, HIDDEN_CLASS},
	plugin::{DatePicker, FormRenderPlugin},
	Error,
};
use tracing::{debug, info, instrument, warn};
use wasm_bindgen::JsCast;

/// Class the date-picker is activated on.
pub const DATE_PICKER_CLASS: &str = "datapicker";

/// Suffix the rendering plugin appends to multi-select names.
pub const ARRAY_MARKER: &str = "[]";

/// The page's form definition. Opaque to this crate beyond being JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
	raw: String,
	value: serde_json::Value,
}

impl FormSchema {
	/// # Errors
	///
	/// Iff `raw` isn't JSON.
	pub fn parse(raw: impl Into<String>) -> Result<Self, Error> {
		let raw = raw.into();
		let value = serde_json::from_str(&raw).map_err(Error::Schema)?;
		Ok(Self { raw, value })
	}

	#[must_use]
	pub fn raw(&self) -> &str {
		&self.raw
	}

	#[must_use]
	pub fn value(&self) -> &serde_json::Value {
		&self.value
	}
}

/// A rendered form and the handles needed to annotate it.
#[derive(Debug)]
pub struct RenderedForm {
	form: web_sys::HtmlFormElement,
	container: web_sys::Element,
	fields: FieldIndex,
	form_wide: Option<FormWideErrors>,
}

impl RenderedForm {
	/// Indexes an already rendered form.
	///
	/// # Errors
	///
	/// Iff `container` isn't inside a `<form>` or indexing fails.
	pub fn bind(container: web_sys::Element) -> Result<Self, Error> {
		let form = container
			.closest("form")
			.map_err(Error::dom)?
			.and_then(|form| form.dyn_into::<web_sys::HtmlFormElement>().ok())
			.ok_or(Error::MissingForm)?;
		let fields = FieldIndex::build(&form)?;
		let form_wide = FormWideErrors::find(&form)?;
		Ok(Self { form, container, fields, form_wide })
	}

	#[must_use]
	pub fn form(&self) -> &web_sys::HtmlFormElement {
		&self.form
	}

	#[must_use]
	pub fn container(&self) -> &web_sys::Element {
		&self.container
	}

	#[must_use]
	pub fn fields(&self) -> &FieldIndex {
		&self.fields
	}

	pub fn fields_mut(&mut self) -> &mut FieldIndex {
		&mut self.fields
	}

	#[must_use]
	pub fn form_wide(&self) -> Option<&FormWideErrors> {
		self.form_wide.as_ref()
	}

	pub fn form_wide_mut(&mut self) -> Option<&mut FormWideErrors> {
		self.form_wide.as_mut()
	}

	/// Removes all field error containers and empties and hides the form-wide list.
	pub fn clear_errors(&mut self) {
		self.fields.clear_errors();
		if let Some(form_wide) = &mut self.form_wide {
			form_wide.clear()
		}
	}

	/// Drops the handles into content that is about to be replaced.
	pub(crate) fn forget_content(&mut self) {
		self.fields.clear();
		self.form_wide = None;
	}
}

/// Renders the schema held by `container` into it.
///
/// # Errors
///
/// Iff the schema is missing or malformed, a plugin fails, `container` isn't inside a `<form>` or a DOM operation fails.
#[instrument(skip(container, config, plugin, date_picker))]
pub fn render_form(container: &web_sys::Element, config: &FormConfig, plugin: &dyn FormRenderPlugin, date_picker: &dyn DatePicker) -> Result<RenderedForm, Error> {
	let raw = container
		.get_attribute(config.schema_attribute())
		.ok_or_else(|| Error::MissingAttribute(config.schema_attribute().to_owned()))?;
	let schema = FormSchema::parse(raw)?;

	let document = container.owner_document().ok_or(Error::MissingDocument)?;
	let host = document.create_element("div").map_err(Error::dom)?;
	plugin.render(&host, &schema)?;

	let date_inputs = convert_date_inputs(&host)?;
	let renamed = strip_multi_select_names(&host)?;
	debug!("Converted {} date input(s), renamed {} select(s).", date_inputs.len(), renamed);

	move_rendered_children(&host, container)?;
	date_picker.attach(&date_inputs)?;

	let rendered = RenderedForm::bind(container.clone())?;
	if config.reveal_submit() {
		reveal_submit_controls(rendered.form())?;
	}
	info!("Rendered form with {} field(s).", rendered.fields().len());
	Ok(rendered)
}

/// Native date inputs conflict with the date-picker's own widget, so they become tagged text inputs.
///
/// # Errors
///
/// Iff the selector query fails.
pub fn convert_date_inputs(root: &web_sys::Element) -> Result<Vec<web_sys::HtmlInputElement>, Error> {
	let nodes = root.query_selector_all("input[type=date]").map_err(Error::dom)?;
	let mut converted = Vec::with_capacity(nodes.length() as usize);
	for i in 0..nodes.length() {
		let input = match nodes.get(i).and_then(|node| node.dyn_into::<web_sys::HtmlInputElement>().ok()) {
			Some(input) => input,
			None => continue,
		};
		input.set_type("text");
		input.class_list().add_1(DATE_PICKER_CLASS).map_err(Error::dom)?;
		converted.push(input);
	}
	Ok(converted)
}

/// The backend matches multi-select values and errors by the bare field name.
///
/// Returns how many selects were renamed.
///
/// # Errors
///
/// Iff the selector query fails.
pub fn strip_multi_select_names(root: &web_sys::Element) -> Result<usize, Error> {
	let nodes = root.query_selector_all("select[name]").map_err(Error::dom)?;
	let mut renamed = 0;
	for i in 0..nodes.length() {
		let select = match nodes.get(i).and_then(|node| node.dyn_into::<web_sys::HtmlSelectElement>().ok()) {
			Some(select) => select,
			None => continue,
		};
		if let Some(name) = array_marker_stripped(&select.name()) {
			select.set_name(name);
			renamed += 1;
		}
	}
	Ok(renamed)
}

#[must_use]
pub fn array_marker_stripped(name: &str) -> Option<&str> {
	name.strip_suffix(ARRAY_MARKER)
}

/// The plugin wraps its output in one root element, which is left behind.
fn move_rendered_children(host: &web_sys::Element, container: &web_sys::Element) -> Result<(), Error> {
	let source: web_sys::Element = match host.first_element_child() {
		Some(root) if host.child_element_count() == 1 => root,
		_ => {
			warn!("Unexpected plugin output layout; Moving all of it.");
			host.clone()
		}
	};

	container.set_text_content(None);
	while let Some(child) = source.first_child() {
		container.append_child(&child).map_err(Error::dom)?;
	}
	Ok(())
}

fn reveal_submit_controls(form: &web_sys::HtmlFormElement) -> Result<(), Error> {
	let controls = form.query_selector_all("input[type=submit], button[type=submit]").map_err(Error::dom)?;
	for i in 0..controls.length() {
		if let Some(control) = controls.get(i).and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok()) {
			control.style().remove_property("display").map_err(Error::dom)?;
			control.set_hidden(false);
			control.class_list().remove_1(HIDDEN_CLASS).map_err(Error::dom)?;
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_trailing_array_marker_only() {
		assert_eq!(array_marker_stripped("colours[]"), Some("colours"));
		assert_eq!(array_marker_stripped("colours"), None);
		assert_eq!(array_marker_stripped("a[]b"), None);
		assert_eq!(array_marker_stripped("[]"), Some(""));
	}

	#[test]
	fn schema_must_be_json() {
		assert!(FormSchema::parse(r#"[{"type": "text", "name": "email"}]"#).is_ok());
		assert!(matches!(FormSchema::parse("[{"), Err(Error::Schema(_))));
	}
}
