//! Where validation messages go.
//!
//! [`FieldIndex`] is built once after rendering, so mapping a server reply onto the form never has to search the live tree by name.

use crate::{
	csrf::CSRF_FORM_FIELD,
	feedback::{with_error_paragraphs, with_list_items},
	reconcile::{ChildReconciler, DEFAULT_DEPTH_LIMIT},
	Error,
};
use hashbrown::HashMap;
use tracing::{debug, instrument, trace, warn};
use wasm_bindgen::JsCast;

pub const FIELD_GROUP_SELECTOR: &str = ".form-group";
pub const FORM_WIDE_CONTAINER_SELECTOR: &str = ".all-errors";
pub const HIDDEN_CLASS: &str = "hidden";
const ERRORS_CLASS: &str = "errors";

/// The error container of one field: a `<div class="errors">` holding one paragraph per message.
#[derive(Debug)]
pub struct ErrorSlot {
	reconciler: ChildReconciler,
	messages: Vec<String>,
}

impl ErrorSlot {
	fn create(document: &web_sys::Document) -> Result<Self, Error> {
		let element = document.create_element("div").map_err(Error::dom)?;
		element.set_class_name(ERRORS_CLASS);
		Ok(Self::adopt(element))
	}

	/// Takes over an error container that came with the markup. Its current content is discarded.
	fn adopt(element: web_sys::Element) -> Self {
		element.set_text_content(None);
		Self {
			reconciler: ChildReconciler::new_for_element_child_nodes(element),
			messages: Vec::new(),
		}
	}

	#[must_use]
	pub fn element(&self) -> &web_sys::Element {
		self.reconciler.element()
	}

	#[must_use]
	pub fn messages(&self) -> &[String] {
		&self.messages
	}

	#[must_use]
	pub fn is_attached(&self) -> bool {
		self.element().parent_node().is_some()
	}

	/// Replaces the shown messages with `messages`.
	pub fn show(&mut self, messages: Vec<String>) {
		let reconciler = &mut self.reconciler;
		with_error_paragraphs(&self.messages, |previous| {
			with_error_paragraphs(&messages, |next| reconciler.update_child_nodes(&[previous], &[next], DEFAULT_DEPTH_LIMIT))
		});
		self.messages = messages;
	}

	/// Empties the container and takes it out of the document.
	pub fn clear(&mut self) {
		self.show(Vec::new());
		self.element().remove();
	}
}

/// A named control inside a `.form-group`, as the rendering plugin lays fields out.
#[derive(Debug)]
pub struct FieldBinding {
	name: String,
	group: web_sys::Element,
	label: Option<web_sys::Element>,
	control: web_sys::Element,
	slot: Option<ErrorSlot>,
}

impl FieldBinding {
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub fn group(&self) -> &web_sys::Element {
		&self.group
	}

	#[must_use]
	pub fn label(&self) -> Option<&web_sys::Element> {
		self.label.as_ref()
	}

	#[must_use]
	pub fn control(&self) -> &web_sys::Element {
		&self.control
	}

	#[must_use]
	pub fn slot(&self) -> Option<&ErrorSlot> {
		self.slot.as_ref()
	}

	/// Shows `messages` directly after the field's label, creating the error container on first use.
	///
	/// # Errors
	///
	/// Iff the container can't be created or inserted.
	#[instrument(skip(self, messages), fields(count = messages.len()))]
	pub fn show_errors(&mut self, messages: Vec<String>) -> Result<(), Error> {
		if cfg!(feature = "dangerous-logging") {
			trace!("Showing errors for {:?}.", self.name);
		}
		let slot = match self.slot.take() {
			Some(slot) => slot,
			None => ErrorSlot::create(&self.group.owner_document().ok_or(Error::MissingDocument)?)?,
		};
		let slot = self.slot.insert(slot);

		if !slot.is_attached() {
			let after_label = self.label.as_ref().and_then(|label| label.next_sibling());
			match &self.label {
				Some(_) => self.group.insert_before(slot.element(), after_label.as_ref()),
				None => {
					trace!("No label; Appending the error container to the group.");
					self.group.append_child(slot.element())
				}
			}
			.map_err(Error::dom)?;
		}

		slot.show(messages);
		Ok(())
	}

	pub fn clear_errors(&mut self) {
		if let Some(slot) = &mut self.slot {
			slot.clear()
		}
	}
}

#[derive(Debug, Default)]
pub struct FieldIndex {
	fields: HashMap<String, FieldBinding>,
}

impl FieldIndex {
	/// Indexes every named control inside a `.form-group` of `form`, except the CSRF token.
	///
	/// Controls sharing a name (radio and checkbox groups) are indexed once, by the first of them.
	///
	/// # Errors
	///
	/// Iff a selector query fails.
	#[instrument(skip(form))]
	pub fn build(form: &web_sys::Element) -> Result<Self, Error> {
		let mut fields = HashMap::new();
		let controls = form.query_selector_all(&format!("{} [name]", FIELD_GROUP_SELECTOR)).map_err(Error::dom)?;
		for i in 0..controls.length() {
			let control = match controls.get(i).and_then(|node| node.dyn_into::<web_sys::Element>().ok()) {
				Some(control) => control,
				None => continue,
			};
			let name = match control.get_attribute("name") {
				Some(name) if !name.is_empty() && name != CSRF_FORM_FIELD => name,
				_ => continue,
			};
			if fields.contains_key(&name) {
				continue;
			}
			let group = match control.closest(FIELD_GROUP_SELECTOR).map_err(Error::dom)? {
				Some(group) => group,
				None => continue,
			};
			let label = group.query_selector(":scope > label").map_err(Error::dom)?;
			let slot = group.query_selector(&format!(":scope > div.{}", ERRORS_CLASS)).map_err(Error::dom)?.map(ErrorSlot::adopt);
			fields.insert(name.clone(), FieldBinding { name, group, label, control, slot });
		}
		debug!("Indexed {} field(s).", fields.len());
		Ok(Self { fields })
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&FieldBinding> {
		self.fields.get(name)
	}

	pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldBinding> {
		self.fields.get_mut(name)
	}

	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.fields.contains_key(name)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.fields.keys().map(String::as_str)
	}

	pub fn clear_errors(&mut self) {
		for field in self.fields.values_mut() {
			field.clear_errors()
		}
	}

	/// Forgets every field, for when the form's content is gone.
	pub fn clear(&mut self) {
		self.fields.clear()
	}
}

/// The `.all-errors` container and its list, for messages no field claims.
#[derive(Debug)]
pub struct FormWideErrors {
	container: web_sys::Element,
	list: ChildReconciler,
	items: Vec<String>,
}

impl FormWideErrors {
	/// Finds `.all-errors` inside `form`. Its `<ul>` is created if missing.
	///
	/// # Errors
	///
	/// Iff a DOM operation fails.
	#[instrument(skip(form))]
	pub fn find(form: &web_sys::Element) -> Result<Option<Self>, Error> {
		let container = match form.query_selector(FORM_WIDE_CONTAINER_SELECTOR).map_err(Error::dom)? {
			Some(container) => container,
			None => {
				debug!("No form-wide error container.");
				return Ok(None);
			}
		};
		let list = match container.query_selector("ul").map_err(Error::dom)? {
			Some(list) => list,
			None => {
				let document = container.owner_document().ok_or(Error::MissingDocument)?;
				let list = document.create_element("ul").map_err(Error::dom)?;
				container.append_child(&list).map_err(Error::dom)?;
				list
			}
		};
		list.set_text_content(None);
		Ok(Some(Self {
			container,
			list: ChildReconciler::new_for_element_child_nodes(list),
			items: Vec::new(),
		}))
	}

	#[must_use]
	pub fn container(&self) -> &web_sys::Element {
		&self.container
	}

	#[must_use]
	pub fn items(&self) -> &[String] {
		&self.items
	}

	#[must_use]
	pub fn is_visible(&self) -> bool {
		!self.container.class_list().contains(HIDDEN_CLASS)
	}

	/// Appends `items` to the list and reveals the container.
	pub fn push(&mut self, items: impl IntoIterator<Item = String>) {
		let mut next = self.items.clone();
		next.extend(items);
		self.set_items(next);
		if let Err(error) = self.container.class_list().remove_1(HIDDEN_CLASS) {
			warn!("Could not reveal the form-wide error container: {:?}", error)
		}
	}

	/// Empties the list and hides the container.
	pub fn clear(&mut self) {
		self.set_items(Vec::new());
		if let Err(error) = self.container.class_list().add_1(HIDDEN_CLASS) {
			warn!("Could not hide the form-wide error container: {:?}", error)
		}
	}

	fn set_items(&mut self, items: Vec<String>) {
		let list = &mut self.list;
		with_list_items(&self.items, |previous| with_list_items(&items, |next| list.update_child_nodes(&[previous], &[next], DEFAULT_DEPTH_LIMIT)));
		self.items = items;
	}
}
