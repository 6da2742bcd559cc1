use super::preview;
use crate::{
	dom::Document,
	event::Publisher,
	markup::Html,
	state::Previews,
	view::{Component, View},
};
use core::ops::Deref;
use lignin::{Node, ThreadBound};
use std::rc::Rc;

pub struct BookmarkList;
impl Component for BookmarkList {
	type Data = Previews;

	const NAME: &'static str = "bookmarks";
	const ERROR_MESSAGE: &'static str = "No bookmarks yet. Find a nice recipe and bookmark it ;)";

	fn is_empty(data: &Previews) -> bool {
		data.rows.is_empty()
	}

	fn markup<'a>(&self, data: &Previews, html: &Html<'a>) -> Node<'a, ThreadBound> {
		preview::rows(html, data)
	}
}

pub struct BookmarksView<D: Document> {
	view: View<D, BookmarkList>,
	render_needed: Publisher<()>,
}

impl<D: Document> BookmarksView<D> {
	pub fn new(document: Rc<D>, parent: D::Node, icons: Rc<str>) -> Self {
		Self {
			view: View::new(document, parent, BookmarkList, icons),
			render_needed: Publisher::new(),
		}
	}

	pub fn add_handler_render(&self, handler: impl Fn() + 'static) {
		self.render_needed.subscribe(move |()| handler());
	}

	/// The page finished loading.
	pub fn loaded(&self) {
		self.render_needed.publish(());
	}
}

impl<D: Document> Deref for BookmarksView<D> {
	type Target = View<D, BookmarkList>;

	fn deref(&self) -> &Self::Target {
		&self.view
	}
}
