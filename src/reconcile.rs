use core::{convert::TryInto, slice};
use lignin::{Node, ThreadBound};
use tracing::{error, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};
use wasm_bindgen::{JsCast, UnwrapThrowExt};

/// Deep enough for everything [`crate::feedback`] builds, with some headroom.
pub const DEFAULT_DEPTH_LIMIT: usize = 8;

/// Attached to a specific [`web_sys::Element`], this `struct` updates its [***childNodes***](https://developer.mozilla.org/en-US/docs/Web/API/Node/childNodes)
/// from one VDOM state to the next.
///
/// Only the node kinds the feedback markup uses are supported: [`Node::HtmlElement`], [`Node::Text`] and [`Node::Multi`].
/// Anything else is logged as error and skipped. Event bindings aren't attached.
///
/// # Correct Use
///
/// The previous VDOM passed to [`ChildReconciler::update_child_nodes`] must be the one that was last applied.
/// Unexpected live DOM is logged and replaced where that's possible.
#[derive(Debug, Clone)]
pub struct ChildReconciler {
	element: web_sys::Element,
}

impl ChildReconciler {
	#[must_use]
	pub fn new_for_element_child_nodes(element: web_sys::Element) -> Self {
		Self { element }
	}

	#[must_use]
	pub fn element(&self) -> &web_sys::Element {
		&self.element
	}

	#[instrument(skip(vdom_a, vdom_b))]
	pub fn update_child_nodes(&mut self, vdom_a: &[Node<'_, ThreadBound>], vdom_b: &[Node<'_, ThreadBound>], depth_limit: usize) {
		let element = self.element.clone();
		let child_nodes = element.child_nodes();
		let owner_document = element.owner_document().expect_throw("form-builder-dom: No owner document found for reconciled element.");
		let mut i = 0;
		self.diff_splice_node_list(&owner_document, vdom_a, vdom_b, &element, &child_nodes, &mut i, depth_limit);
		debug_assert_eq!(i, TryInto::<u32>::try_into(Node::Multi(vdom_b).dom_len()).unwrap_throw());
		trace!("Reconciled {} child node(s).", i);
	}

	#[allow(clippy::too_many_arguments)]
	#[instrument(skip(vdom_a, vdom_b))]
	fn diff_splice_node_list(
		&mut self,
		document: &web_sys::Document,
		mut vdom_a: &[Node<'_, ThreadBound>],
		mut vdom_b: &[Node<'_, ThreadBound>],
		parent_element: &web_sys::Element,
		dom_slice: &web_sys::NodeList,
		i: &mut u32,
		depth_limit: usize,
	) {
		if depth_limit == 0 {
			return error!("Depth limit reached");
		}

		while !vdom_a.is_empty() && !vdom_b.is_empty() {
			match (vdom_a[0], vdom_b[0]) {
				(Node::Multi(n_1), Node::Multi(n_2)) => {
					let span = trace_span!("Diffing multi", "n_1.len()" = n_1.len(), "n_2.len()" = n_2.len());
					let _enter = span.enter();
					if !n_1.is_empty() || !n_2.is_empty() {
						self.diff_splice_node_list(document, n_1, n_2, parent_element, dom_slice, i, depth_limit - 1)
					}
				}

				(Node::Text { text: t_1, .. }, Node::Text { text: t_2, .. }) => {
					let span = if cfg!(feature = "dangerous-logging") {
						trace_span!("Diffing text node", t_1, t_2)
					} else {
						trace_span!("Diffing text node", "t_1.len()" = t_1.len(), "t_2.len()" = t_2.len())
					};
					let _enter = span.enter();
					let node = match dom_slice.get(*i) {
						Some(node) => node,
						None => {
							error!("Expected text beyond end of `web_sys::NodeList`. Switching to insertions.");
							return self.diff_splice_node_list(document, &[], vdom_b, parent_element, dom_slice, i, depth_limit);
						}
					};

					match node.dyn_ref::<web_sys::Text>() {
						Some(text) => {
							if STATIC_MAX_LEVEL >= Level::WARN && text.data() != t_1 {
								if cfg!(feature = "dangerous-logging") {
									warn!("Unexpected text data: Expected {:?} but found {:?}", t_1, text.data())
								} else {
									warn!("Unexpected text data.")
								}
							}
							if t_1 != t_2 {
								text.set_data(t_2)
							}
							*i += 1;
						}
						None => {
							error!("Expected to update `web_sys::Text` but found {:?}; Recreating the node.", node);
							self.replace(document, &vdom_a[0], &vdom_b[0], parent_element, dom_slice, i, depth_limit);
						}
					}
				}

				(Node::HtmlElement { element: e_1, .. }, Node::HtmlElement { element: e_2, .. }) if e_1.name == e_2.name => {
					let span = trace_span!("Diffing HTML element", tag = e_1.name);
					let _enter = span.enter();
					let node = match dom_slice.get(*i) {
						Some(node) => node,
						None => {
							error!("Expected <{}> beyond end of `web_sys::NodeList`. Switching to insertions.", e_1.name);
							return self.diff_splice_node_list(document, &[], vdom_b, parent_element, dom_slice, i, depth_limit);
						}
					};

					match node.dyn_ref::<web_sys::HtmlElement>() {
						Some(html_element) if html_element.tag_name().eq_ignore_ascii_case(e_1.name) => {
							self.update_element(document, e_1, e_2, html_element, depth_limit);
							*i += 1;
						}
						Some(html_element) => {
							error!("Expected to update <{}> but found <{}>; Recreating the HTML element.", e_1.name, html_element.tag_name());
							self.replace(document, &vdom_a[0], &vdom_b[0], parent_element, dom_slice, i, depth_limit);
						}
						None => {
							error!("Expected to update `web_sys::HtmlElement` but found {:?}; Recreating the node.", node);
							self.replace(document, &vdom_a[0], &vdom_b[0], parent_element, dom_slice, i, depth_limit);
						}
					}
				}

				(a, b) => self.replace(document, &a, &b, parent_element, dom_slice, i, depth_limit),
			}

			vdom_a = &vdom_a[1..];
			vdom_b = &vdom_b[1..];
		}

		for removed in vdom_a {
			self.remove_node(removed, parent_element, dom_slice, *i, depth_limit);
		}

		for added in vdom_b {
			self.insert_node(document, added, parent_element, dom_slice, i, depth_limit);
		}
	}

	#[allow(clippy::too_many_arguments)]
	fn replace(&mut self, document: &web_sys::Document, a: &Node<'_, ThreadBound>, b: &Node<'_, ThreadBound>, parent_element: &web_sys::Element, dom_slice: &web_sys::NodeList, i: &mut u32, depth_limit: usize) {
		self.diff_splice_node_list(document, slice::from_ref(a), &[], parent_element, dom_slice, i, depth_limit);
		self.diff_splice_node_list(document, &[], slice::from_ref(b), parent_element, dom_slice, i, depth_limit);
	}

	/// Removes the DOM nodes `node` occupies starting at `i`, which stays in place as the node list is live.
	#[instrument(skip(node))]
	fn remove_node(&mut self, node: &Node<'_, ThreadBound>, parent_element: &web_sys::Element, dom_slice: &web_sys::NodeList, i: u32, depth_limit: usize) {
		if depth_limit == 0 {
			return error!("Depth limit reached");
		}

		match *node {
			Node::Multi(nodes) => {
				for node in nodes {
					self.remove_node(node, parent_element, dom_slice, i, depth_limit - 1)
				}
			}
			Node::Text { .. } | Node::HtmlElement { .. } => match dom_slice.get(i) {
				Some(dom_node) => {
					if let Err(error) = parent_element.remove_child(&dom_node) {
						error!("Failed to remove node: {:?}", error)
					}
				}
				None => error!("Expected to remove node beyond end of `web_sys::NodeList`. Skipping."),
			},
			_ => error!("Unsupported VDOM node kind; Nothing removed."),
		}
	}

	#[instrument(skip(node))]
	fn insert_node(&mut self, document: &web_sys::Document, node: &Node<'_, ThreadBound>, parent_element: &web_sys::Element, dom_slice: &web_sys::NodeList, i: &mut u32, depth_limit: usize) {
		if depth_limit == 0 {
			return error!("Depth limit reached");
		}

		let created: web_sys::Node = match *node {
			Node::Multi(nodes) => {
				for node in nodes {
					self.insert_node(document, node, parent_element, dom_slice, i, depth_limit - 1)
				}
				return;
			}
			Node::Text { text, .. } => document.create_text_node(text).into(),
			Node::HtmlElement { element, .. } => {
				let span = trace_span!("Creating HTML element", tag = element.name);
				let _enter = span.enter();
				let html_element = match document.create_element(element.name) {
					Ok(html_element) => html_element,
					Err(error) => return error!("Failed to create <{}>: {:?}", element.name, error),
				};
				for &lignin::Attribute { name, value } in element.attributes {
					if let Err(error) = html_element.set_attribute(name, value) {
						error!("Could not add attribute {:?}={:?}: {:?}", name, value, error)
					}
				}
				if !element.event_bindings.is_empty() {
					error!("Event bindings aren't supported; Ignoring {} binding(s).", element.event_bindings.len())
				}
				self.diff_splice_node_list(document, &[], slice::from_ref(&element.content), &html_element, &html_element.child_nodes(), &mut 0, depth_limit - 1);
				html_element.into()
			}
			_ => return error!("Unsupported VDOM node kind; Nothing inserted."),
		};

		let next_sibling = dom_slice.get(*i);
		match parent_element.insert_before(&created, next_sibling.as_ref()) {
			Ok(_) => *i += 1,
			Err(error) => error!("Failed to insert node: {:?}", error),
		}
	}

	#[allow(clippy::similar_names)]
	#[instrument(skip(e_1, e_2))]
	fn update_element(&mut self, document: &web_sys::Document, e_1: &lignin::Element<'_, ThreadBound>, e_2: &lignin::Element<'_, ThreadBound>, element: &web_sys::Element, depth_limit: usize) {
		let mut a_1 = e_1.attributes;
		let mut a_2 = e_2.attributes;
		while !a_1.is_empty() && a_1.first() == a_2.first() {
			a_1 = &a_1[1..];
			a_2 = &a_2[1..];
		}
		while !a_1.is_empty() && a_1.last() == a_2.last() {
			a_1 = &a_1[..a_1.len() - 1];
			a_2 = &a_2[..a_2.len() - 1];
		}
		for removed in a_1 {
			if let Err(error) = element.remove_attribute(removed.name) {
				warn!("Could not remove attribute with name {:?}: {:?}", removed.name, error)
			}
		}
		for added in a_2 {
			if let Err(error) = element.set_attribute(added.name, added.value) {
				error!("Could not add attribute {:?}={:?}: {:?}", added.name, added.value, error)
			}
		}

		self.diff_splice_node_list(document, slice::from_ref(&e_1.content), slice::from_ref(&e_2.content), element, &element.child_nodes(), &mut 0, depth_limit - 1);
	}
}
