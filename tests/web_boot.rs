#![cfg(target_arch = "wasm32")]

use form_builder_dom::{
	boot::{mount, mount_once, on_content_loaded, when_ready},
	config::{FormConfig, UnmatchedErrors},
	submit::Phase,
	Error,
};
use js_sys::Reflect;
use std::{cell::Cell, rc::Rc};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

use web_fixture_::{document, next_tick, FakeFormRender, Page, RecordingDatePicker, ScriptedTransport, SCHEMA};

/// Sets page globals for as long as it lives.
struct Globals(Vec<&'static str>);

impl Globals {
	fn set(values: &[(&'static str, JsValue)]) -> Self {
		let window = web_sys::window().unwrap();
		for (name, value) in values {
			Reflect::set(&window, &JsValue::from_str(name), value).unwrap();
		}
		Self(values.iter().map(|&(name, _)| name).collect())
	}
}

impl Drop for Globals {
	fn drop(&mut self) {
		let window = web_sys::window().unwrap();
		for name in &self.0 {
			Reflect::delete_property(&window, &JsValue::from_str(name)).unwrap();
		}
	}
}

#[wasm_bindgen_test]
async fn mounts_with_container_options() {
	let page = Page::with_options(SCHEMA, r#"{"endpoint": "/forms/3/", "company": 42, "unmatchedErrors": "discard"}"#);
	let transport = ScriptedTransport::default();
	transport.reply(201, r#"{"message": "Saved."}"#);

	let submitter = mount(&document(), FormConfig::default(), &FakeFormRender, &RecordingDatePicker::default(), Box::new(transport.clone())).unwrap();
	assert_eq!(submitter.config().endpoint(), "/forms/3/");
	assert_eq!(submitter.config().company(), Some("42"));
	assert_eq!(submitter.config().unmatched_errors(), UnmatchedErrors::Discard);
	assert_eq!(page.count("#form-builder .form-group"), 6);

	submitter.submit().await.unwrap();
	assert_eq!(submitter.phase(), Phase::Succeeded);
	transport.last_sent(|sent| {
		assert_eq!(sent.url, "/forms/3/");
		assert_eq!(sent.field("company").unwrap(), "42");
	});
}

#[wasm_bindgen_test]
fn legacy_globals_are_honoured() {
	let _globals = Globals::set(&[("storageApiUrl", JsValue::from_str("/legacy/")), ("companyId", JsValue::from_f64(9.0))]);
	let _page = Page::new(SCHEMA);

	let submitter = mount(&document(), FormConfig::default(), &FakeFormRender, &RecordingDatePicker::default(), Box::new(ScriptedTransport::default())).unwrap();
	assert_eq!(submitter.config().endpoint(), "/legacy/");
	assert_eq!(submitter.config().company(), Some("9"));
}

#[wasm_bindgen_test]
fn container_options_win_over_globals() {
	let _globals = Globals::set(&[("storageApiUrl", JsValue::from_str("/legacy/")), ("companyId", JsValue::from_str("9"))]);
	let _page = Page::with_options(SCHEMA, r#"{"company": "12"}"#);

	let submitter = mount(&document(), FormConfig::default(), &FakeFormRender, &RecordingDatePicker::default(), Box::new(ScriptedTransport::default())).unwrap();
	assert_eq!(submitter.config().endpoint(), "/legacy/");
	assert_eq!(submitter.config().company(), Some("12"));
}

#[wasm_bindgen_test]
fn missing_container() {
	let _page = Page::new(SCHEMA);
	let config = FormConfig::new().with_container_selector("#no-such-form");

	let result = mount(&document(), config, &FakeFormRender, &RecordingDatePicker::default(), Box::new(ScriptedTransport::default()));
	assert!(matches!(result, Err(Error::MissingContainer(selector)) if selector == "#no-such-form"));
}

#[wasm_bindgen_test]
fn malformed_container_options() {
	let page = Page::with_options(SCHEMA, r#"{"endpont": "/typo/"}"#);

	let result = mount(&document(), FormConfig::default(), &FakeFormRender, &RecordingDatePicker::default(), Box::new(ScriptedTransport::default()));
	assert!(matches!(result, Err(Error::Config(_))));
	assert_eq!(page.count(".form-group"), 0);
}

#[wasm_bindgen_test]
fn custom_schema_attribute() {
	let page = Page::with_options(r#"[{"type": "text", "name": "ignored"}]"#, r#"{"schemaAttribute": "data-schema"}"#);
	page.container().set_attribute("data-schema", r#"[{"type": "text", "name": "email", "label": "Email"}]"#).unwrap();

	let submitter = mount(&document(), FormConfig::default(), &FakeFormRender, &RecordingDatePicker::default(), Box::new(ScriptedTransport::default())).unwrap();
	assert!(submitter.rendered().fields().contains("email"));
	assert!(!submitter.rendered().fields().contains("ignored"));
}

#[wasm_bindgen_test]
fn runs_immediately_once_parsed() {
	let ran = Rc::new(Cell::new(false));
	when_ready({
		let ran = Rc::clone(&ran);
		move || ran.set(true)
	})
	.unwrap();
	assert!(ran.get());
}

#[wasm_bindgen_test]
fn deferred_until_content_loaded() {
	let loading = web_sys::Document::new().unwrap();
	let ran = Rc::new(Cell::new(0));
	on_content_loaded(&loading, {
		let ran = Rc::clone(&ran);
		move || ran.set(ran.get() + 1)
	})
	.unwrap();
	assert_eq!(ran.get(), 0);

	loading.dispatch_event(&web_sys::Event::new("DOMContentLoaded").unwrap()).unwrap();
	assert_eq!(ran.get(), 1);

	loading.dispatch_event(&web_sys::Event::new("DOMContentLoaded").unwrap()).unwrap();
	assert_eq!(ran.get(), 1);
}

#[wasm_bindgen_test]
async fn mounting_again_keeps_the_first_submitter() {
	let page = Page::new(SCHEMA);
	let transport = ScriptedTransport::default();
	transport.reply(201, r#"{"message": "Saved."}"#);

	let first = mount_once(&document(), FormConfig::default(), &FakeFormRender, &RecordingDatePicker::default(), Box::new(transport.clone())).unwrap();
	let second = mount_once(&document(), FormConfig::default(), &FakeFormRender, &RecordingDatePicker::default(), Box::new(transport.clone())).unwrap();
	assert!(Rc::ptr_eq(&first, &second));
	assert_eq!(page.count("#form-builder .form-group"), 6);

	let init = web_sys::EventInit::new();
	init.set_cancelable(true);
	page.form().dispatch_event(&web_sys::Event::new_with_event_init_dict("submit", &init).unwrap()).unwrap();
	while first.phase() != Phase::Succeeded {
		next_tick().await;
	}
	next_tick().await;
	assert_eq!(transport.sent_count(), 1);
}
