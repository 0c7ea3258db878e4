use crate::{csrf::CSRF_HEADER_NAME, Error};
use core::{future::Future, pin::Pin};
use tracing::{debug, instrument};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// One form submission, ready to send.
#[derive(Debug, Clone)]
pub struct Submission {
	pub url: String,
	pub payload: web_sys::FormData,
	pub csrf_token: Option<String>,
}

/// Status and body of the endpoint's reply, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
	pub status: u16,
	pub body: String,
}

impl Reply {
	#[must_use]
	pub fn new(status: u16, body: impl Into<String>) -> Self {
		Self { status, body: body.into() }
	}

	#[must_use]
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

pub type ReplyFuture = Pin<Box<dyn Future<Output = Result<Reply, Error>>>>;

/// Sends submissions. Only network-level failures are errors; any HTTP status is a [`Reply`].
pub trait Transport {
	fn post(&self, submission: Submission) -> ReplyFuture;
}

/// [`Transport`] over the browser's `fetch`.
///
/// The multipart body is handed over as [`web_sys::FormData`] without `Content-Type`, so the browser writes the boundary.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

impl Transport for FetchTransport {
	fn post(&self, submission: Submission) -> ReplyFuture {
		Box::pin(fetch(submission))
	}
}

#[instrument(skip(submission), fields(url = %submission.url))]
async fn fetch(submission: Submission) -> Result<Reply, Error> {
	let Submission { url, payload, csrf_token } = submission;

	let headers = web_sys::Headers::new().map_err(Error::transport)?;
	headers.set("Accept", "application/json").map_err(Error::transport)?;
	if let Some(csrf_token) = &csrf_token {
		headers.set(CSRF_HEADER_NAME, csrf_token).map_err(Error::transport)?;
	}

	let init = web_sys::RequestInit::new();
	init.set_method("POST");
	init.set_credentials(web_sys::RequestCredentials::SameOrigin);
	init.set_headers(headers.as_ref());
	init.set_body(payload.as_ref());

	let request = web_sys::Request::new_with_str_and_init(&url, &init).map_err(Error::transport)?;
	let window = web_sys::window().ok_or(Error::MissingWindow)?;
	let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(Error::transport)?
		.dyn_into()
		.map_err(Error::transport)?;

	let status = response.status();
	let body = JsFuture::from(response.text().map_err(Error::transport)?).await.map_err(Error::transport)?;
	debug!("Received status {}.", status);
	Ok(Reply {
		status,
		body: body.as_string().unwrap_or_default(),
	})
}
