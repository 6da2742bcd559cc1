//! Intent handlers: sequencing model mutations and the view renders that follow them.

use crate::{
	config::Config,
	diff::ReconcileError,
	dom::Document,
	env::Environment,
	model::{FormFields, Loaded, Model},
	personal,
	view::{Patched, Shown},
	views::Views,
};
use futures::FutureExt as _;
use std::rc::{Rc, Weak};
use tracing::{debug, error, instrument, trace, warn};

/// In-place updates only fail if a markup generator changed its fragment's shape, which is a bug.
///
/// # Panics
///
/// On [`Err`].
fn patched(result: Result<Patched, ReconcileError>) {
	match result {
		Ok(patched) => trace!(?patched),
		Err(error) => {
			error!(%error, "Markup shape diverged during an in-place update.");
			panic!("Markup shape diverged during an in-place update: {}", error)
		}
	}
}

pub struct Controller<D: Document> {
	model: Model,
	views: Views<D>,
	environment: Rc<dyn Environment>,
	config: Config,
}

impl<D: Document + 'static> Controller<D> {
	pub fn new(model: Model, views: Views<D>, environment: Rc<dyn Environment>) -> Rc<Self> {
		let config = model.config().clone();
		Rc::new(Self { model, views, environment, config })
	}

	#[must_use]
	pub fn model(&self) -> &Model {
		&self.model
	}

	#[must_use]
	pub fn views(&self) -> &Views<D> {
		&self.views
	}

	/// Subscribes every handler once, renders the upload form and runs the (guarded) startup search.
	#[instrument(skip(self))]
	pub fn init(self: &Rc<Self>) {
		let views = &self.views;

		let bookmarks = self.handler(|this, ()| this.control_bookmarks());
		views.bookmarks.add_handler_render(move || bookmarks(()));
		let recipes = self.task(|this, ()| async move { this.control_recipes().await });
		views.recipe.add_handler_render(move || recipes(()));
		views.recipe.add_handler_update_servings(self.handler(|this, servings: u32| this.control_servings(servings)));
		let add_bookmark = self.handler(|this, ()| this.control_add_bookmark());
		views.recipe.add_handler_add_bookmark(move || add_bookmark(()));
		views.search.add_handler_search(self.task(|this, query: String| async move { this.control_search_results(&query).await }));
		views.pagination.add_handler_click(self.handler(|this, page: usize| this.control_pagination(page)));
		views.add_recipe.add_handler_upload(self.task(|this, fields: FormFields| async move { this.control_add_recipe(fields).await }));

		views.recipe.render_message(None);
		views.add_recipe.render(&());

		let this = Rc::clone(self);
		self.environment.spawn(async move { this.control_search_results("").await }.boxed_local());
		debug!("Initialized.");
	}

	/// A synchronous subscriber that doesn't keep the controller alive.
	fn handler<T>(self: &Rc<Self>, handler: impl Fn(&Self, T) + 'static) -> impl Fn(T) + 'static {
		let this = Rc::downgrade(self);
		move |value| match this.upgrade() {
			Some(this) => handler(&this, value),
			None => trace!("Controller dropped. Ignoring intent."),
		}
	}

	/// A subscriber that spawns `handler`'s future on the environment.
	fn task<T, Fut: core::future::Future<Output = ()> + 'static>(self: &Rc<Self>, handler: impl Fn(Rc<Self>, T) -> Fut + 'static) -> impl Fn(T) + 'static {
		let this: Weak<Self> = Rc::downgrade(self);
		move |value| match this.upgrade() {
			Some(this) => {
				let environment = Rc::clone(&this.environment);
				environment.spawn(handler(this, value).boxed_local());
			}
			None => trace!("Controller dropped. Ignoring intent."),
		}
	}

	/// Loads the recipe named by the location.
	#[instrument(skip(self))]
	pub async fn control_recipes(&self) {
		let Some(id) = self.environment.location_id().filter(|id| !id.is_empty()) else {
			return trace!("No recipe id in location.");
		};

		self.views.recipe.render_spinner();

		// Only marks the selection in rows already on screen. A status template stays up.
		let (results, bookmarks) = {
			let state = self.model.state();
			(state.page_previews(Some(&id)), state.bookmark_previews(Some(&id)))
		};
		if self.views.results.shown() == Shown::Content {
			patched(self.views.results.update(&results));
		}
		if self.views.bookmarks.shown() == Shown::Content {
			patched(self.views.bookmarks.update(&bookmarks));
		}

		match self.model.load_recipe(&id).await {
			Ok(Loaded::Applied) => {
				let detail = self.model.state().recipe_detail();
				match detail {
					Some(detail) => self.views.recipe.render(&detail),
					None => self.views.recipe.render_error(None),
				}
			}
			Ok(Loaded::Superseded) => debug!("A newer recipe load is in flight."),
			Err(error) => {
				warn!(%error, "Failed to load recipe.");
				self.views.recipe.render_error(None);
			}
		}
	}

	pub fn control_bookmarks(&self) {
		let bookmarks = self.model.state().bookmark_previews(self.selected().as_deref());
		self.views.bookmarks.render(&bookmarks);
	}

	/// Runs a search and renders its first page. Empty queries are ignored.
	#[instrument(skip(self), fields(query = personal(query)))]
	pub async fn control_search_results(&self, query: &str) {
		let query = query.trim();
		if query.is_empty() {
			return trace!("Empty query.");
		}

		self.views.results.render_spinner();

		match self.model.load_search_results(query).await {
			Ok(Loaded::Applied) => self.show_page(None),
			Ok(Loaded::Superseded) => debug!("A newer search is in flight."),
			Err(error) => {
				warn!(%error, "Search failed.");
				self.views.results.render_error(Some(&error.to_string()));
				self.views.pagination.clear();
			}
		}
	}

	#[instrument(skip(self))]
	pub fn control_pagination(&self, page: usize) {
		self.show_page(Some(page));
	}

	/// Scales the current recipe and patches the recipe view in place.
	#[instrument(skip(self))]
	pub fn control_servings(&self, servings: u32) {
		if let Err(error) = self.model.update_servings(servings) {
			return warn!(%error, "Can't update servings.");
		}

		let detail = self.model.state().recipe_detail();
		if let Some(detail) = detail {
			patched(self.views.recipe.update(&detail));
		}
	}

	/// Bookmarks the current recipe, or removes its bookmark.
	#[instrument(skip(self))]
	pub fn control_add_bookmark(&self) {
		let detail = self.model.state().recipe_detail();
		let Some(detail) = detail else {
			return warn!("No recipe to bookmark.");
		};

		if detail.bookmarked {
			self.model.delete_bookmark(&detail.recipe.id);
		} else {
			self.model.add_bookmark(&detail.recipe);
		}

		let (detail, bookmarks) = {
			let state = self.model.state();
			(state.recipe_detail(), state.bookmark_previews(Some(&detail.recipe.id)))
		};
		if let Some(detail) = detail {
			patched(self.views.recipe.update(&detail));
		}
		self.views.bookmarks.render(&bookmarks);
	}

	/// Uploads a recipe, shows it and closes the upload window after [`Config::modal_close`].
	#[instrument(skip(self, fields))]
	pub async fn control_add_recipe(&self, fields: FormFields) {
		self.views.add_recipe.render_spinner();

		if let Err(error) = self.model.upload_recipe(&fields).await {
			error!(%error, "Upload failed.");
			return self.views.add_recipe.render_error(Some(&error.to_string()));
		}

		let (detail, bookmarks) = {
			let state = self.model.state();
			let id = state.recipe().map(|recipe| recipe.id.clone());
			(state.recipe_detail(), state.bookmark_previews(id.as_deref()))
		};
		let Some(detail) = detail else {
			return error!("Uploaded recipe went missing.");
		};

		self.views.recipe.render(&detail);
		self.views.add_recipe.render_message(None);
		self.views.bookmarks.render(&bookmarks);
		self.environment.push_location_id(&detail.recipe.id);

		self.environment.sleep(self.config.modal_close).await;
		self.views.add_recipe.close_window();
		self.views.add_recipe.render(&());
	}

	fn show_page(&self, page: Option<usize>) {
		if let Err(error) = self.model.search_results_page(page) {
			return warn!(%error, "Can't show page.");
		}

		let selected = self.selected();
		let (results, pagination) = {
			let state = self.model.state();
			(state.page_previews(selected.as_deref()), state.pagination())
		};
		self.views.results.render(&results);
		self.views.pagination.render(&pagination);
	}

	fn selected(&self) -> Option<String> {
		self.environment.location_id().filter(|id| !id.is_empty())
	}
}
