//! Form Submitter: sends the form and reconciles the reply into the page.
//!
//! Each form tracks its own [`Phase`]:
//!
//! ```text
//! Idle ──submit──▶ Submitting ──2xx──────────▶ Succeeded (form replaced, final)
//!  ▲                 │    │
//!  │                 │    └──validation errors──▶ Failed ──submit──▶ Submitting
//!  └──network error──┘
//! ```
//!
//! Submitting again while a request is in flight is rejected.

use crate::{
	config::{FormConfig, UnmatchedErrors},
	csrf::csrf_token,
	feedback::{form_wide_item, with_success_banner},
	reconcile::{ChildReconciler, DEFAULT_DEPTH_LIMIT},
	render::RenderedForm,
	response::{is_form_wide, ErrorResponse, SuccessResponse},
	transport::{Reply, Submission, Transport},
	Error,
};
use core::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, instrument, trace_span, warn};
use wasm_bindgen::{closure::Closure, JsCast};

/// Field name the configured company identifier is submitted under.
pub const COMPANY_FIELD: &str = "company";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	Idle,
	Submitting,
	Succeeded,
	Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
	/// The form was replaced by the success banner.
	Succeeded,
	/// The server rejected the submission. Counts are of keys placed next to fields and of those that weren't.
	Invalid { fields: usize, unmatched: usize },
	/// Another submission of this form is still in flight.
	Rejected,
	/// The form was already submitted successfully and no longer exists.
	Finished,
}

pub struct FormSubmitter {
	config: FormConfig,
	transport: Box<dyn Transport>,
	rendered: RefCell<RenderedForm>,
	phase: Cell<Phase>,
	listener: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>>,
}

impl core::fmt::Debug for FormSubmitter {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("FormSubmitter")
			.field("config", &self.config)
			.field("phase", &self.phase.get())
			.field("installed", &self.listener.borrow().is_some())
			.finish()
	}
}

impl FormSubmitter {
	#[must_use]
	pub fn new(rendered: RenderedForm, config: FormConfig, transport: Box<dyn Transport>) -> Rc<Self> {
		Rc::new(Self {
			config,
			transport,
			rendered: RefCell::new(rendered),
			phase: Cell::new(Phase::Idle),
			listener: RefCell::new(None),
		})
	}

	#[must_use]
	pub fn phase(&self) -> Phase {
		self.phase.get()
	}

	#[must_use]
	pub fn config(&self) -> &FormConfig {
		&self.config
	}

	/// Read access to the rendered form. Don't hold on to it across a submission.
	#[must_use]
	pub fn rendered(&self) -> core::cell::Ref<'_, RenderedForm> {
		self.rendered.borrow()
	}

	/// Takes over the form's `submit` event. Native submission is always prevented.
	///
	/// The listener only holds a weak reference, so it goes inert once the last [`Rc`] is dropped.
	///
	/// # Errors
	///
	/// Iff the listener can't be added.
	#[instrument(skip(self))]
	pub fn install(self: &Rc<Self>) -> Result<(), Error> {
		let this: Weak<Self> = Rc::downgrade(self);
		let listener = Closure::wrap(Box::new(move |event: web_sys::Event| {
			event.prevent_default();
			let this = match this.upgrade() {
				Some(this) => this,
				None => return warn!("Submit event for a dropped `FormSubmitter`."),
			};
			wasm_bindgen_futures::spawn_local(async move {
				match this.submit().await {
					Ok(outcome) => debug!("Submission finished: {:?}", outcome),
					Err(error) => error!("Submission failed: {}", error),
				}
			});
		}) as Box<dyn FnMut(web_sys::Event)>);

		let form = self.rendered.borrow().form().clone();
		form.add_event_listener_with_callback("submit", listener.as_ref().unchecked_ref()).map_err(Error::dom)?;
		if let Some(previous) = self.listener.replace(Some(listener)) {
			warn!("`FormSubmitter` installed twice; Replacing the previous listener.");
			remove_listener(&form, &previous);
		}
		Ok(())
	}

	/// Runs one submission attempt.
	///
	/// # Errors
	///
	/// Iff the request couldn't be sent or the reply isn't understood.
	/// Validation errors are [`SubmitOutcome::Invalid`] instead.
	#[instrument(skip(self))]
	pub async fn submit(&self) -> Result<SubmitOutcome, Error> {
		match self.phase.get() {
			Phase::Submitting => {
				warn!("A submission is already in flight; Rejecting this one.");
				return Ok(SubmitOutcome::Rejected);
			}
			Phase::Succeeded => {
				debug!("Form was already submitted successfully.");
				return Ok(SubmitOutcome::Finished);
			}
			Phase::Idle | Phase::Failed => (),
		}

		self.rendered.borrow_mut().clear_errors();
		self.phase.set(Phase::Submitting);

		let result = match self.prepare() {
			Ok(submission) => match self.transport.post(submission).await {
				Ok(reply) => self.conclude(&reply),
				Err(error) => Err(error),
			},
			Err(error) => Err(error),
		};

		if result.is_err() {
			self.phase.set(Phase::Idle);
		}
		result
	}

	fn prepare(&self) -> Result<Submission, Error> {
		let rendered = self.rendered.borrow();
		let form = rendered.form();
		let payload = web_sys::FormData::new_with_form(form).map_err(Error::dom)?;
		if let Some(company) = self.config.company() {
			payload.set_with_str(COMPANY_FIELD, company).map_err(Error::dom)?;
		}
		Ok(Submission {
			url: self.config.endpoint().to_owned(),
			payload,
			csrf_token: csrf_token(form),
		})
	}

	#[instrument(skip(self, reply), fields(status = reply.status))]
	fn conclude(&self, reply: &Reply) -> Result<SubmitOutcome, Error> {
		let mut rendered = self.rendered.borrow_mut();

		if reply.is_success() {
			let success = SuccessResponse::parse(&reply.body).map_err(|error| Error::UnexpectedResponse {
				status: reply.status,
				reason: error.to_string(),
			})?;
			show_success(&mut rendered, &success.message)?;
			self.phase.set(Phase::Succeeded);
			info!("Form submitted.");
			return Ok(SubmitOutcome::Succeeded);
		}

		let errors = ErrorResponse::parse(&reply.body).map_err(|error| Error::UnexpectedResponse {
			status: reply.status,
			reason: error.to_string(),
		})?;
		let outcome = show_errors(&mut rendered, &errors, self.config.unmatched_errors())?;
		self.phase.set(Phase::Failed);
		info!("Form rejected: {:?}", outcome);
		Ok(outcome)
	}
}

impl Drop for FormSubmitter {
	fn drop(&mut self) {
		if let Some(listener) = self.listener.get_mut().take() {
			remove_listener(self.rendered.get_mut().form(), &listener);
		}
	}
}

fn remove_listener(form: &web_sys::HtmlFormElement, listener: &Closure<dyn FnMut(web_sys::Event)>) {
	if let Err(error) = form.remove_event_listener_with_callback("submit", listener.as_ref().unchecked_ref()) {
		error!("Failed to remove submit listener: {:?}", error)
	}
}

/// Replaces everything inside the form with the success banner.
///
/// # Errors
///
/// Iff a DOM operation fails.
pub fn show_success(rendered: &mut RenderedForm, message: &str) -> Result<(), Error> {
	let form: &web_sys::Element = rendered.form().as_ref();
	while let Some(child) = form.first_child() {
		form.remove_child(&child).map_err(Error::dom)?;
	}
	let mut reconciler = ChildReconciler::new_for_element_child_nodes(form.clone());
	with_success_banner(message, |banner| reconciler.update_child_nodes(&[], &[banner], DEFAULT_DEPTH_LIMIT));
	rendered.forget_content();
	Ok(())
}

/// Puts each field's messages next to it. Everything else goes to the form-wide list or is dropped, per `unmatched`.
///
/// # Errors
///
/// Iff a field's error container can't be inserted.
pub fn show_errors(rendered: &mut RenderedForm, errors: &ErrorResponse, unmatched: UnmatchedErrors) -> Result<SubmitOutcome, Error> {
	let mut placed = 0;
	let mut unplaced = 0;

	for (field, messages) in errors.iter() {
		let span = if cfg!(feature = "dangerous-logging") {
			trace_span!("Mapping errors", field, count = messages.len())
		} else {
			trace_span!("Mapping errors", count = messages.len())
		};
		let _enter = span.enter();

		let form_wide = is_form_wide(field);
		if !form_wide {
			if let Some(binding) = rendered.fields_mut().get_mut(field) {
				binding.show_errors(messages.to_vec())?;
				placed += 1;
				continue;
			}
		}

		unplaced += 1;
		match (unmatched, rendered.form_wide_mut()) {
			(UnmatchedErrors::Surface, Some(list)) => list.push(messages.iter().map(|message| form_wide_item(field, message, form_wide))),
			(UnmatchedErrors::Surface, None) => warn!("No form-wide error container; Dropping {} message(s).", messages.len()),
			(UnmatchedErrors::Discard, _) => {
				if cfg!(feature = "dangerous-logging") {
					debug!("Discarding unmatched messages for {:?}: {:?}", field, messages)
				} else {
					debug!("Discarding {} unmatched message(s).", messages.len())
				}
			}
		}
	}

	Ok(SubmitOutcome::Invalid { fields: placed, unmatched: unplaced })
}
