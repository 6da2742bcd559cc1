//! A recipe browser whose views are patched in place by a small [`lignin`]-based DOM reconciler.
//!
//! [`controller::Controller`] turns view intents into [`model::Model`] mutations and then
//! re-renders or patches the affected [`views`]. Everything except [`web`] (`wasm32` only) runs
//! against any [`dom::Document`], including the browser-free [`dom::memory::MemoryDocument`].

#![doc(html_root_url = "https://docs.rs/forkful/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub use lignin;

pub mod config;
pub mod controller;
pub mod diff;
pub mod dom;
pub mod env;
pub mod event;
pub mod load;
pub mod markup;
pub mod model;
pub mod source;
pub mod state;
pub mod storage;
pub mod view;
pub mod views;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Log field value for user-provided content, which is redacted unless the `"dangerous-logging"` feature is enabled.
pub(crate) fn personal(value: &str) -> &str {
	if cfg!(feature = "dangerous-logging") {
		value
	} else {
		"<redacted>"
	}
}
