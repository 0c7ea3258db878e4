#![cfg(target_arch = "wasm32")]

use form_builder_dom::{
	feedback::{with_error_paragraphs, with_list_items},
	lignin::{Attribute, Element, ElementCreationOptions, Node, ThreadBound},
	reconcile::{ChildReconciler, DEFAULT_DEPTH_LIMIT},
};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);


fn host() -> (web_sys::Element, ChildReconciler) {
	web_fixture_::init_logging();
	let host = web_fixture_::document().create_element("div").unwrap();
	(host.clone(), ChildReconciler::new_for_element_child_nodes(host))
}

fn strings(messages: &[&str]) -> Vec<String> {
	messages.iter().map(|&message| message.to_owned()).collect()
}

fn apply(reconciler: &mut ChildReconciler, old: &[&str], new: &[&str]) {
	with_error_paragraphs(&strings(old), |old| {
		with_error_paragraphs(&strings(new), |new| reconciler.update_child_nodes(&[old], &[new], DEFAULT_DEPTH_LIMIT))
	})
}

fn banner<'a>(attributes: &'a [Attribute<'a>]) -> Element<'a, ThreadBound> {
	Element {
		name: "DIV",
		creation_options: ElementCreationOptions::new(),
		attributes,
		content: Node::Text { text: "Saved.", dom_binding: None },
		event_bindings: &[],
	}
}

#[wasm_bindgen_test]
fn creates_paragraphs() {
	let (host, mut reconciler) = host();
	apply(&mut reconciler, &[], &["Required.", "<b>Too short.</b>"]);

	assert_eq!(host.inner_html(), r#"<p class="label label-danger">Required.</p><p class="label label-danger">&lt;b&gt;Too short.&lt;/b&gt;</p>"#);
}

#[wasm_bindgen_test]
fn keeps_surviving_nodes() {
	let (host, mut reconciler) = host();
	apply(&mut reconciler, &[], &["Required.", "Too short."]);
	let first = host.first_child().unwrap();

	apply(&mut reconciler, &["Required.", "Too short."], &["Required."]);
	assert_eq!(host.child_nodes().length(), 1);
	assert!(first.is_same_node(host.first_child().as_ref()));

	apply(&mut reconciler, &["Required."], &["Invalid."]);
	assert!(first.is_same_node(host.first_child().as_ref()));
	assert_eq!(host.text_content().unwrap(), "Invalid.");
}

#[wasm_bindgen_test]
fn removes_everything() {
	let (host, mut reconciler) = host();
	apply(&mut reconciler, &[], &["Required.", "Too short."]);
	apply(&mut reconciler, &["Required.", "Too short."], &[]);
	assert_eq!(host.child_nodes().length(), 0);
}

#[wasm_bindgen_test]
fn switches_element_kind() {
	let (host, mut reconciler) = host();
	apply(&mut reconciler, &[], &["Required."]);

	with_error_paragraphs(&strings(&["Required."]), |old| {
		with_list_items(&strings(&["Required."]), |new| reconciler.update_child_nodes(&[old], &[new], DEFAULT_DEPTH_LIMIT))
	});
	assert_eq!(host.inner_html(), "<li>Required.</li>");
}

#[wasm_bindgen_test]
fn updates_attributes_in_place() {
	let (host, mut reconciler) = host();
	let before = [Attribute { name: "class", value: "alert" }, Attribute { name: "role", value: "alert" }];
	let after = [Attribute { name: "class", value: "alert alert-success" }];
	let (before, after) = (banner(&before), banner(&after));

	reconciler.update_child_nodes(&[], &[Node::HtmlElement { element: &before, dom_binding: None }], DEFAULT_DEPTH_LIMIT);
	let live = host.first_element_child().unwrap();
	reconciler.update_child_nodes(
		&[Node::HtmlElement { element: &before, dom_binding: None }],
		&[Node::HtmlElement { element: &after, dom_binding: None }],
		DEFAULT_DEPTH_LIMIT,
	);

	let current: web_sys::Node = host.first_element_child().unwrap().into();
	assert!(live.is_same_node(Some(&current)));
	assert_eq!(live.get_attribute("class").unwrap(), "alert alert-success");
	assert!(!live.has_attribute("role"));
}

#[wasm_bindgen_test]
fn recovers_from_foreign_changes() {
	let (host, mut reconciler) = host();
	apply(&mut reconciler, &[], &["Required."]);
	host.set_inner_html("<span>someone else's</span>");

	apply(&mut reconciler, &["Required."], &["Too short."]);
	assert_eq!(host.inner_html(), r#"<p class="label label-danger">Too short.</p>"#);
}
