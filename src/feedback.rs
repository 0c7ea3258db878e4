//! VDOM for everything this crate puts into the rendered form.
//!
//! Server-supplied text only ever ends up in [`Node::Text`], so it's never parsed as markup.

use lignin::{Attribute, Element, ElementCreationOptions, Node, ThreadBound};

const ERROR_PARAGRAPH_ATTRIBUTES: &[Attribute<'static>] = &[Attribute { name: "class", value: "label label-danger" }];
const SUCCESS_BANNER_ATTRIBUTES: &[Attribute<'static>] = &[Attribute { name: "class", value: "alert alert-success" }, Attribute { name: "role", value: "alert" }];

fn element<'a>(name: &'a str, attributes: &'a [Attribute<'a>], text: &'a str) -> Element<'a, ThreadBound> {
	Element {
		name,
		creation_options: ElementCreationOptions::new(),
		attributes,
		content: Node::Text { text, dom_binding: None },
		event_bindings: &[],
	}
}

fn with_elements<R>(elements: &[Element<'_, ThreadBound>], f: impl FnOnce(Node<'_, ThreadBound>) -> R) -> R {
	let nodes: Vec<_> = elements.iter().map(|element| Node::HtmlElement { element, dom_binding: None }).collect();
	f(Node::Multi(&nodes))
}

/// `<p class="label label-danger">` per message, in order.
pub fn with_error_paragraphs<R>(messages: &[String], f: impl FnOnce(Node<'_, ThreadBound>) -> R) -> R {
	let elements: Vec<_> = messages.iter().map(|message| element("P", ERROR_PARAGRAPH_ATTRIBUTES, message)).collect();
	with_elements(&elements, f)
}

/// `<li>` per item, in order.
pub fn with_list_items<R>(items: &[String], f: impl FnOnce(Node<'_, ThreadBound>) -> R) -> R {
	let elements: Vec<_> = items.iter().map(|item| element("LI", &[], item)).collect();
	with_elements(&elements, f)
}

/// `<div class="alert alert-success" role="alert">`.
pub fn with_success_banner<R>(message: &str, f: impl FnOnce(Node<'_, ThreadBound>) -> R) -> R {
	let banner = element("DIV", SUCCESS_BANNER_ATTRIBUTES, message);
	f(Node::HtmlElement { element: &banner, dom_binding: None })
}

/// How a message that isn't shown next to a field reads in the form-wide list.
#[must_use]
pub fn form_wide_item(field: &str, message: &str, form_wide: bool) -> String {
	if form_wide {
		message.to_owned()
	} else {
		format!("{}: {}", field, message)
	}
}
