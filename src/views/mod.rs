//! The concrete views and the intents they raise.

use crate::dom::{Document, Namespace};
use std::rc::Rc;

pub mod add_recipe;
pub mod bookmarks;
pub mod pagination;
pub mod preview;
pub mod recipe;
pub mod results;
pub mod search;

pub use add_recipe::AddRecipeView;
pub use bookmarks::BookmarksView;
pub use pagination::PaginationView;
pub use recipe::RecipeView;
pub use results::ResultsView;
pub use search::SearchView;

/// The attachment points (and the upload window chrome) of all views.
#[derive(Debug, Clone)]
pub struct Roots<N> {
	pub recipe: N,
	pub results: N,
	pub pagination: N,
	pub bookmarks: N,
	/// The upload `<form>`.
	pub upload: N,
	pub window: N,
	pub overlay: N,
}

impl<N> Roots<N> {
	/// Creates detached containers shaped like the application page's.
	pub fn detached<D: Document<Node = N> + ?Sized>(document: &D) -> Self {
		let create = |name: &str, class: &str| {
			let element = document.create_element(Namespace::Html, name);
			document.set_attribute(&element, "class", class);
			element
		};
		Self {
			recipe: create("div", "recipe"),
			results: create("ul", "results"),
			pagination: create("div", "pagination"),
			bookmarks: create("ul", "bookmarks__list"),
			upload: create("form", "upload"),
			window: create("div", "add-recipe-window hidden"),
			overlay: create("div", "overlay hidden"),
		}
	}
}

pub struct Views<D: Document> {
	pub recipe: RecipeView<D>,
	pub results: ResultsView<D>,
	pub pagination: PaginationView<D>,
	pub bookmarks: BookmarksView<D>,
	pub add_recipe: AddRecipeView<D>,
	pub search: SearchView,
}

impl<D: Document> Views<D> {
	pub fn new(document: &Rc<D>, roots: Roots<D::Node>, icons: &str) -> Self {
		let icons: Rc<str> = icons.into();
		Self {
			recipe: RecipeView::new(Rc::clone(document), roots.recipe, Rc::clone(&icons)),
			results: ResultsView::new(Rc::clone(document), roots.results, Rc::clone(&icons)),
			pagination: PaginationView::new(Rc::clone(document), roots.pagination, Rc::clone(&icons)),
			bookmarks: BookmarksView::new(Rc::clone(document), roots.bookmarks, Rc::clone(&icons)),
			add_recipe: AddRecipeView::new(Rc::clone(document), roots.upload, roots.window, roots.overlay, icons),
			search: SearchView::new(),
		}
	}

	/// Raises the intents that belong to the page's `load` event.
	pub fn page_loaded(&self) {
		self.recipe.location_changed();
		self.bookmarks.loaded();
	}
}
