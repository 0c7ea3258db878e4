//! Page-load wiring.

use crate::{
	config::FormConfig,
	plugin::{DatePicker, FormRenderPlugin, JqueryDatePicker, JqueryFormRender},
	render::render_form,
	submit::FormSubmitter,
	transport::{FetchTransport, Transport},
	Error,
};
use core::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, error, info, instrument};
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};

thread_local! {
	static MOUNTED: RefCell<Vec<Rc<FormSubmitter>>> = RefCell::new(Vec::new());
}

/// Renders the form inside the element matching the configured container selector and takes over its submission.
///
/// # Errors
///
/// Iff there's no matching container, the page's options are malformed, or rendering fails.
#[instrument(skip(document, config, plugin, date_picker, transport))]
pub fn mount(document: &web_sys::Document, config: FormConfig, plugin: &dyn FormRenderPlugin, date_picker: &dyn DatePicker, transport: Box<dyn Transport>) -> Result<Rc<FormSubmitter>, Error> {
	let container = find_container(document, &config)?;
	mount_into(&container, config, plugin, date_picker, transport)
}

/// Like [`mount`], but a container that was already mounted this way keeps its existing [`FormSubmitter`].
///
/// Submitters mounted here stay alive for the rest of the page's life.
///
/// # Errors
///
/// As [`mount`].
#[instrument(skip(document, config, plugin, date_picker, transport))]
pub fn mount_once(document: &web_sys::Document, config: FormConfig, plugin: &dyn FormRenderPlugin, date_picker: &dyn DatePicker, transport: Box<dyn Transport>) -> Result<Rc<FormSubmitter>, Error> {
	let container = find_container(document, &config)?;
	let existing = MOUNTED.with(|mounted| {
		mounted
			.borrow()
			.iter()
			.find(|submitter| submitter.rendered().container().is_same_node(Some(container.as_ref())))
			.cloned()
	});
	if let Some(existing) = existing {
		debug!("Form container is already mounted.");
		return Ok(existing);
	}

	let submitter = mount_into(&container, config, plugin, date_picker, transport)?;
	MOUNTED.with(|mounted| mounted.borrow_mut().push(Rc::clone(&submitter)));
	Ok(submitter)
}

fn find_container(document: &web_sys::Document, config: &FormConfig) -> Result<web_sys::Element, Error> {
	document
		.query_selector(config.container_selector())
		.map_err(Error::dom)?
		.ok_or_else(|| Error::MissingContainer(config.container_selector().to_owned()))
}

fn mount_into(container: &web_sys::Element, config: FormConfig, plugin: &dyn FormRenderPlugin, date_picker: &dyn DatePicker, transport: Box<dyn Transport>) -> Result<Rc<FormSubmitter>, Error> {
	let config = config.with_page_options(container)?;
	let rendered = render_form(container, &config, plugin, date_picker)?;
	let submitter = FormSubmitter::new(rendered, config, transport);
	submitter.install()?;
	Ok(submitter)
}

/// Runs `f` once the document is parsed.
///
/// # Errors
///
/// Iff there's no document or the `DOMContentLoaded` listener can't be added.
pub fn when_ready(f: impl 'static + FnOnce()) -> Result<(), Error> {
	let document = web_sys::window().ok_or(Error::MissingWindow)?.document().ok_or(Error::MissingDocument)?;
	if document.ready_state() != "loading" {
		f();
		return Ok(());
	}
	on_content_loaded(&document, f)
}

/// Runs `f` on `document`'s next `DOMContentLoaded` event, at most once.
///
/// # Errors
///
/// Iff the listener can't be added.
pub fn on_content_loaded(document: &web_sys::Document, f: impl 'static + FnOnce()) -> Result<(), Error> {
	let options = web_sys::AddEventListenerOptions::new();
	options.set_once(true);
	let listener = Closure::once_into_js(f);
	document
		.add_event_listener_with_callback_and_add_event_listener_options("DOMContentLoaded", listener.unchecked_ref(), &options)
		.map_err(Error::dom)
}

/// Mounts the page's form with the jQuery plugins and `fetch`, keeping it alive for the rest of the page's life.
///
/// Calling this again doesn't mount the same form twice.
///
/// # Errors
///
/// Iff there's no document.
/// Failures while mounting happen after the document is ready and are logged instead.
#[wasm_bindgen(js_name = bootFormBuilder)]
pub fn boot_form_builder() -> Result<(), JsValue> {
	#[cfg(feature = "console-log")]
	{
		if tracing_wasm::try_set_as_global_default().is_err() {
			debug!("A global tracing subscriber is already set.");
		}
	}

	when_ready(|| {
		let document = match web_sys::window().and_then(|window| window.document()) {
			Some(document) => document,
			None => return error!("Document went away before it was ready."),
		};
		match mount_once(&document, FormConfig::default(), &JqueryFormRender, &JqueryDatePicker, Box::new(FetchTransport)) {
			Ok(_) => info!("Form builder mounted."),
			Err(error) => error!("Could not mount the form builder: {}", error),
		}
	})
	.map_err(Into::into)
}
