use crate::{
	dom::Document,
	event::Publisher,
	markup::Html,
	state::Pagination,
	view::{Component, View},
};
use core::ops::Deref;
use lignin::{Node, ThreadBound};
use std::rc::Rc;
use tracing::trace;

pub struct Pager;
impl Component for Pager {
	type Data = Pagination;

	const NAME: &'static str = "pagination";
	const ERROR_MESSAGE: &'static str = "";

	/// A single page or none renders no buttons, which is still content.
	fn is_empty(_: &Pagination) -> bool {
		false
	}

	fn markup<'a>(&self, data: &Pagination, html: &Html<'a>) -> Node<'a, ThreadBound> {
		let &Pagination { page, pages } = data;
		let previous = || {
			html.element(
				"button",
				&[("data-goto", html.fmt(format_args!("{}", page - 1))), ("class", "btn--inline pagination__btn--prev")],
				&[html.icon(Some("search__icon"), "arrow-left"), html.element("span", &[], &[html.text(html.fmt(format_args!("Page {}", page - 1)))])],
			)
		};
		let next = || {
			html.element(
				"button",
				&[("data-goto", html.fmt(format_args!("{}", page + 1))), ("class", "btn--inline pagination__btn--next")],
				&[html.element("span", &[], &[html.text(html.fmt(format_args!("Page {}", page + 1)))]), html.icon(Some("search__icon"), "arrow-right")],
			)
		};

		if pages <= 1 {
			html.multi(&[])
		} else if page <= 1 {
			next()
		} else if page >= pages {
			previous()
		} else {
			html.multi(&[previous(), next()])
		}
	}
}

pub struct PaginationView<D: Document> {
	view: View<D, Pager>,
	page_clicked: Publisher<usize>,
}

impl<D: Document> PaginationView<D> {
	pub fn new(document: Rc<D>, parent: D::Node, icons: Rc<str>) -> Self {
		Self {
			view: View::new(document, parent, Pager, icons),
			page_clicked: Publisher::new(),
		}
	}

	pub fn add_handler_click(&self, handler: impl Fn(usize) + 'static) {
		self.page_clicked.subscribe(handler);
	}

	/// Delegated click somewhere inside the attachment point.
	pub fn click(&self, target: &D::Node) {
		let document = self.document();
		let Some(button) = document.closest_with_class(target, "btn--inline", self.parent()) else {
			return;
		};
		match document.attribute(&button, "data-goto").and_then(|page| page.parse().ok()) {
			Some(page) => self.page_clicked.publish(page),
			None => trace!("Page button without a valid `data-goto`."),
		}
	}
}

impl<D: Document> Deref for PaginationView<D> {
	type Target = View<D, Pager>;

	fn deref(&self) -> &Self::Target {
		&self.view
	}
}
