#![doc(html_root_url = "https://docs.rs/form-builder-dom/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Renders a form-builder schema into the page, submits the form asynchronously and maps the
//! server's validation errors back onto the rendered fields.
//!
//! Pages call `bootFormBuilder()` once. See [`boot::mount`] to wire things up with other plugins or transports.

pub use lignin;

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod boot;
pub mod config;
pub mod csrf;
mod error;
pub mod feedback;
pub mod fields;
pub mod plugin;
pub mod reconcile;
pub mod render;
pub mod response;
pub mod submit;
pub mod transport;

pub use error::Error;
