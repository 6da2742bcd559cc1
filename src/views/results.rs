use super::preview;
use crate::{
	dom::Document,
	markup::Html,
	state::Previews,
	view::{Component, View},
};
use core::ops::Deref;
use lignin::{Node, ThreadBound};
use std::rc::Rc;

pub struct SearchResults;
impl Component for SearchResults {
	type Data = Previews;

	const NAME: &'static str = "results";
	const ERROR_MESSAGE: &'static str = "No recipes found for your query! Please try again ;)";

	fn is_empty(data: &Previews) -> bool {
		data.rows.is_empty()
	}

	fn markup<'a>(&self, data: &Previews, html: &Html<'a>) -> Node<'a, ThreadBound> {
		preview::rows(html, data)
	}
}

/// The current page of search results.
pub struct ResultsView<D: Document> {
	view: View<D, SearchResults>,
}

impl<D: Document> ResultsView<D> {
	pub fn new(document: Rc<D>, parent: D::Node, icons: Rc<str>) -> Self {
		Self {
			view: View::new(document, parent, SearchResults, icons),
		}
	}
}

impl<D: Document> Deref for ResultsView<D> {
	type Target = View<D, SearchResults>;

	fn deref(&self) -> &Self::Target {
		&self.view
	}
}
