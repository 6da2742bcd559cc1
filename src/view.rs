//! The render lifecycle shared by all views.
//!
//! A [`View`] exclusively owns one attachment point and fills it either with its
//! [`Component`]'s markup or with one of three fixed status templates.

use crate::{
	diff::{DomDiffer, PatchSummary, ReconcileError},
	dom::Document,
	load::load_child_nodes,
	markup::{to_html, Html},
};
use bumpalo::Bump;
use core::{
	cell::{Cell, RefCell},
	slice,
};
use lignin::{Node, ThreadBound};
use std::rc::Rc;
use tracing::{debug, instrument, trace, trace_span};

/// Supplies the markup of a concrete view.
pub trait Component {
	type Data: Clone;

	/// Used in log fields.
	const NAME: &'static str;
	/// Shown by [`View::render_error`] when no message is given, and by [`View::render`] for empty data.
	const ERROR_MESSAGE: &'static str;
	const MESSAGE: &'static str = "";

	fn is_empty(data: &Self::Data) -> bool;

	/// Generates this view's fragment for `data`. Must be a pure function of `data`.
	fn markup<'a>(&self, data: &Self::Data, html: &Html<'a>) -> Node<'a, ThreadBound>;
}

/// What the attachment point currently displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shown {
	Nothing,
	Content,
	Spinner,
	Error,
	Message,
}
impl Shown {
	#[must_use]
	pub fn is_status(self) -> bool {
		matches!(self, Shown::Spinner | Shown::Error | Shown::Message)
	}
}

/// How [`View::update`] brought the attachment point up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patched {
	InPlace(PatchSummary),
	/// No content was shown, so there was nothing to patch.
	Rendered,
	/// Empty data while no content was shown.
	Skipped,
}

pub struct View<D: Document, C: Component> {
	document: Rc<D>,
	parent: D::Node,
	component: C,
	icons: Rc<str>,
	data: RefCell<Option<C::Data>>,
	shown: Cell<Shown>,
}

impl<D: Document, C: Component> View<D, C> {
	pub fn new(document: Rc<D>, parent: D::Node, component: C, icons: Rc<str>) -> Self {
		Self {
			document,
			parent,
			component,
			icons,
			data: RefCell::new(None),
			shown: Cell::new(Shown::Nothing),
		}
	}

	#[must_use]
	pub fn document(&self) -> &D {
		&self.document
	}

	/// The attachment point.
	#[must_use]
	pub fn parent(&self) -> &D::Node {
		&self.parent
	}

	#[must_use]
	pub fn component(&self) -> &C {
		&self.component
	}

	#[must_use]
	pub fn shown(&self) -> Shown {
		self.shown.get()
	}

	/// The data last rendered or updated with.
	#[must_use]
	pub fn data(&self) -> Option<C::Data> {
		self.data.borrow().clone()
	}

	/// Replaces the attachment point's content with the markup for `data`.
	///
	/// Empty data renders the error state instead.
	#[instrument(skip_all, fields(view = C::NAME))]
	pub fn render(&self, data: &C::Data) {
		if C::is_empty(data) {
			debug!("Empty data. Rendering error state.");
			return self.render_error(None);
		}

		*self.data.borrow_mut() = Some(data.clone());
		let bump = Bump::new();
		let html = self.html_builder(&bump);
		let vdom = self.component.markup(data, &html);
		let created = self.differ().replace_child_nodes(slice::from_ref(&vdom));
		trace!(created, "Rendered.");
		self.shown.set(Shown::Content);
	}

	/// Like [`View::render`], but returns the markup instead of attaching it.
	///
	/// Empty data still renders the error state (into the attachment point) and returns [`None`].
	#[instrument(skip_all, fields(view = C::NAME))]
	pub fn render_to_string(&self, data: &C::Data) -> Option<String> {
		if C::is_empty(data) {
			self.render_error(None);
			return None;
		}

		*self.data.borrow_mut() = Some(data.clone());
		let bump = Bump::new();
		let html = self.html_builder(&bump);
		Some(to_html(&self.component.markup(data, &html)))
	}

	/// Patches the rendered content in place to match `data`.
	///
	/// While a status template (or nothing) is shown, non-empty data is rendered in full instead
	/// and empty data is ignored. Empty data while content is shown renders the error state.
	///
	/// # Errors
	///
	/// If the markup for `data` doesn't have the shape of the rendered content.
	/// Neither the DOM nor the stored data are changed in that case.
	#[instrument(skip_all, fields(view = C::NAME))]
	pub fn update(&self, data: &C::Data) -> Result<Patched, ReconcileError> {
		let shown = self.shown.get();
		if shown != Shown::Content {
			return Ok(if C::is_empty(data) {
				trace!(?shown, "Nothing to update.");
				Patched::Skipped
			} else {
				debug!(?shown, "No content to patch. Rendering instead.");
				self.render(data);
				Patched::Rendered
			});
		}
		if C::is_empty(data) {
			self.render_error(None);
			return Ok(Patched::Rendered);
		}

		let bump = Bump::new();
		let html = self.html_builder(&bump);
		let vdom = self.component.markup(data, &html);
		let summary = self.differ().update_child_nodes(slice::from_ref(&vdom))?;
		*self.data.borrow_mut() = Some(data.clone());
		Ok(Patched::InPlace(summary))
	}

	pub fn render_spinner(&self) {
		self.render_status(Shown::Spinner, |html| html.element("div", &[("class", "spinner")], &[html.icon(None, "loader")]));
	}

	/// Renders the error template with `message`, or [`Component::ERROR_MESSAGE`].
	pub fn render_error(&self, message: Option<&str>) {
		let message = message.unwrap_or(C::ERROR_MESSAGE);
		self.render_status(Shown::Error, |html| status_box(html, "error", "alert-triangle", message));
	}

	/// Renders the message template with `message`, or [`Component::MESSAGE`].
	pub fn render_message(&self, message: Option<&str>) {
		let message = message.unwrap_or(C::MESSAGE);
		self.render_status(Shown::Message, |html| status_box(html, "message", "smile", message));
	}

	pub fn clear(&self) {
		self.document.clear(&self.parent);
		self.shown.set(Shown::Nothing);
	}

	/// Serializes what is actually rendered right now.
	#[must_use]
	pub fn html(&self) -> String {
		let bump = Bump::new();
		to_html(&Node::Multi(self.snapshot(&bump)))
	}

	/// Loads the rendered content into `bump`.
	pub fn snapshot<'a>(&self, bump: &'a Bump) -> &'a [Node<'a, ThreadBound>] {
		load_child_nodes(&*self.document, &self.parent, bump)
	}

	fn render_status(&self, shown: Shown, markup: impl for<'a> FnOnce(&Html<'a>) -> Node<'a, ThreadBound>) {
		let span = trace_span!("Rendering status", view = C::NAME, ?shown);
		let _enter = span.enter();

		let bump = Bump::new();
		let html = self.html_builder(&bump);
		let vdom = markup(&html);
		self.differ().replace_child_nodes(slice::from_ref(&vdom));
		self.shown.set(shown);
	}

	fn html_builder<'a>(&self, bump: &'a Bump) -> Html<'a> {
		Html::new(bump, &self.icons)
	}

	fn differ(&self) -> DomDiffer<'_, D> {
		DomDiffer::new_for_element_child_nodes(&*self.document, self.parent.clone())
	}
}

fn status_box<'a>(html: &Html<'a>, class: &'a str, icon: &str, message: &str) -> Node<'a, ThreadBound> {
	html.element(
		"div",
		&[("class", class)],
		&[html.element("div", &[], &[html.icon(None, icon)]), html.element("p", &[], &[html.text(message)])],
	)
}
