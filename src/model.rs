//! The single owner of [`State`], and every operation that writes it.
//!
//! Asynchronous mutators never hold a borrow of the state across a suspension point. Each
//! kind of request carries a ticket, so a response that arrives after a newer request of the
//! same kind was started is dropped instead of overwriting the newer state.

use crate::{
	config::Config,
	personal,
	source::{RecipeSource, SourceError},
	state::{Ingredient, NewRecipe, Recipe, RecipeSummary, State},
	storage::Storage,
};
use core::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
	#[error(transparent)]
	Source(#[from] SourceError),
	#[error(transparent)]
	Upload(#[from] UploadError),
	#[error("page {page} is out of range, there are {pages} page(s)")]
	PageOutOfRange { page: usize, pages: usize },
	#[error("no recipe is loaded")]
	NoRecipe,
	#[error("servings must be at least 1")]
	ZeroServings,
}

/// Why the upload form's fields were rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
	#[error("Wrong ingredient format! Please use the correct format :)")]
	IngredientFormat { field: String },
	#[error("Missing field `{0}`")]
	MissingField(&'static str),
	#[error("`{field}` must be a positive whole number")]
	InvalidNumber { field: &'static str },
}

/// Outcome of an asynchronous mutator that succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Loaded {
	Applied,
	/// A newer request of the same kind was started meanwhile. Nothing was changed.
	Superseded,
}

/// Submitted form fields, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(Vec<(String, String)>);
impl FormFields {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.0.push((name.into(), value.into()));
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.iter().find(|(n, _)| n == name).map(|(_, value)| value.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}
}
impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self(iter.into_iter().map(|(name, value)| (name.into(), value.into())).collect())
	}
}

/// Parses the upload form.
///
/// Every non-empty `ingredient-*` field must be `quantity,unit,description`, where the quantity may be empty.
///
/// # Errors
///
/// If a field is missing or malformed.
pub fn parse_upload(fields: &FormFields, key: &str) -> Result<NewRecipe, UploadError> {
	let ingredients = fields
		.iter()
		.filter(|(name, value)| name.starts_with("ingredient") && !value.is_empty())
		.map(|(name, value)| parse_ingredient(name, value))
		.collect::<Result<Vec<_>, _>>()?;

	Ok(NewRecipe {
		title: required(fields, "title")?.to_owned(),
		source_url: required(fields, "sourceUrl")?.to_owned(),
		image_url: required(fields, "image")?.to_owned(),
		publisher: required(fields, "publisher")?.to_owned(),
		cooking_time: positive(fields, "cookingTime")?,
		servings: positive(fields, "servings")?,
		ingredients,
		key: Some(key.to_owned()),
	})
}

fn required<'f>(fields: &'f FormFields, name: &'static str) -> Result<&'f str, UploadError> {
	fields.get(name).ok_or(UploadError::MissingField(name))
}

fn positive(fields: &FormFields, name: &'static str) -> Result<u32, UploadError> {
	match required(fields, name)?.trim().parse() {
		Ok(0) | Err(_) => Err(UploadError::InvalidNumber { field: name }),
		Ok(value) => Ok(value),
	}
}

fn parse_ingredient(name: &str, value: &str) -> Result<Ingredient, UploadError> {
	let format_error = || UploadError::IngredientFormat { field: name.to_owned() };
	let parts: Vec<&str> = value.split(',').map(str::trim).collect();
	match parts.as_slice() {
		[quantity, unit, description] => Ok(Ingredient {
			quantity: if quantity.is_empty() { None } else { Some(quantity.parse().map_err(|_| format_error())?) },
			unit: (*unit).to_owned(),
			description: (*description).to_owned(),
		}),
		_ => Err(format_error()),
	}
}

pub struct Model {
	state: RefCell<State>,
	source: Rc<dyn RecipeSource>,
	storage: Rc<dyn Storage>,
	config: Config,
	recipe_ticket: Cell<u64>,
	search_ticket: Cell<u64>,
}

impl Model {
	/// Restores persisted bookmarks from `storage`.
	pub fn new(source: Rc<dyn RecipeSource>, storage: Rc<dyn Storage>, config: Config) -> Self {
		let config = config.sanitized();
		let mut state = State::new(config.results_per_page);
		state.bookmarks = restore_bookmarks(&*storage, &config.storage_key);
		Self {
			state: RefCell::new(state),
			source,
			storage,
			config,
			recipe_ticket: Cell::new(0),
			search_ticket: Cell::new(0),
		}
	}

	/// Read access. Don't hold this across an `.await` or a mutator call.
	#[must_use]
	pub fn state(&self) -> Ref<'_, State> {
		self.state.borrow()
	}

	#[must_use]
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Loads recipe `id` as the current recipe.
	///
	/// # Errors
	///
	/// If the source fails. The current recipe is left as it was.
	#[instrument(skip(self))]
	pub async fn load_recipe(&self, id: &str) -> Result<Loaded, ModelError> {
		let ticket = next_ticket(&self.recipe_ticket);
		let result = self.source.recipe(id).await;
		if self.recipe_ticket.get() != ticket {
			debug!(ticket, "Dropping superseded recipe response.");
			return Ok(Loaded::Superseded);
		}

		let recipe = result?;
		trace!(title = personal(&recipe.title), "Loaded recipe.");
		self.state.borrow_mut().recipe = Some(recipe);
		Ok(Loaded::Applied)
	}

	/// Runs a search and goes back to page 1.
	///
	/// # Errors
	///
	/// If the source fails. The previous results are left as they were.
	#[instrument(skip(self), fields(query = personal(query)))]
	pub async fn load_search_results(&self, query: &str) -> Result<Loaded, ModelError> {
		let ticket = next_ticket(&self.search_ticket);
		let result = self.source.search(query).await;
		if self.search_ticket.get() != ticket {
			debug!(ticket, "Dropping superseded search response.");
			return Ok(Loaded::Superseded);
		}

		let results = result?;
		debug!(results = results.len(), "Search succeeded.");
		let mut state = self.state.borrow_mut();
		state.search.query = query.to_owned();
		state.search.results = results;
		state.search.page = 1;
		Ok(Loaded::Applied)
	}

	/// Makes `page` (or the current page) current and returns its results.
	///
	/// Without results, only page 1 is valid, and it is empty.
	///
	/// # Errors
	///
	/// If `page` is out of range. The current page is left as it was.
	#[instrument(skip(self))]
	pub fn search_results_page(&self, page: Option<usize>) -> Result<Vec<RecipeSummary>, ModelError> {
		let mut state = self.state.borrow_mut();
		let page = page.unwrap_or(state.search.page);
		let pages = state.search.pages();
		if page < 1 || page > pages.max(1) {
			return Err(ModelError::PageOutOfRange { page, pages });
		}

		state.search.page = page;
		Ok(state.search.slice(page).to_vec())
	}

	/// Scales the current recipe's ingredient quantities linearly to `servings`.
	///
	/// # Errors
	///
	/// If `servings` is 0 or no recipe is loaded.
	#[instrument(skip(self))]
	pub fn update_servings(&self, servings: u32) -> Result<(), ModelError> {
		if servings == 0 {
			return Err(ModelError::ZeroServings);
		}

		let mut state = self.state.borrow_mut();
		let recipe = state.recipe.as_mut().ok_or(ModelError::NoRecipe)?;
		if recipe.servings == 0 {
			warn!("Recipe has no servings to scale from. Only changing the count.");
		} else {
			let factor = f64::from(servings) / f64::from(recipe.servings);
			for quantity in recipe.ingredients.iter_mut().filter_map(|ingredient| ingredient.quantity.as_mut()) {
				*quantity *= factor;
			}
		}
		recipe.servings = servings;
		Ok(())
	}

	/// Does nothing if `recipe` is bookmarked already.
	#[instrument(skip(self, recipe), fields(id = %recipe.id))]
	pub fn add_bookmark(&self, recipe: &Recipe) {
		{
			let mut state = self.state.borrow_mut();
			if state.is_bookmarked(&recipe.id) {
				return trace!("Already bookmarked.");
			}
			state.bookmarks.push(recipe.into());
		}
		self.persist_bookmarks();
	}

	#[instrument(skip(self))]
	pub fn delete_bookmark(&self, id: &str) {
		{
			let mut state = self.state.borrow_mut();
			let before = state.bookmarks.len();
			state.bookmarks.retain(|bookmark| bookmark.id != id);
			if state.bookmarks.len() == before {
				return trace!("Not bookmarked.");
			}
		}
		self.persist_bookmarks();
	}

	/// Uploads the recipe described by `fields`, then makes it the current recipe and bookmarks it.
	///
	/// Any recipe load still in flight is superseded.
	///
	/// # Errors
	///
	/// If the fields are malformed or the source fails.
	#[instrument(skip(self, fields))]
	pub async fn upload_recipe(&self, fields: &FormFields) -> Result<(), ModelError> {
		let new = parse_upload(fields, &self.config.upload_key)?;
		let recipe = self.source.upload(new).await?;
		next_ticket(&self.recipe_ticket);
		debug!(id = %recipe.id, "Uploaded recipe.");

		self.state.borrow_mut().recipe = Some(recipe.clone());
		self.add_bookmark(&recipe);
		Ok(())
	}

	fn persist_bookmarks(&self) {
		let json = match serde_json::to_string(&self.state.borrow().bookmarks) {
			Ok(json) => json,
			Err(error) => return warn!(%error, "Failed to serialize bookmarks."),
		};
		if let Err(error) = self.storage.set(&self.config.storage_key, &json) {
			warn!(%error, "Failed to persist bookmarks.");
		}
	}
}

fn next_ticket(ticket: &Cell<u64>) -> u64 {
	let next = ticket.get() + 1;
	ticket.set(next);
	next
}

fn restore_bookmarks(storage: &dyn Storage, key: &str) -> Vec<RecipeSummary> {
	let json = match storage.get(key) {
		Ok(Some(json)) => json,
		Ok(None) => return Vec::new(),
		Err(error) => {
			warn!(%error, "Failed to read bookmarks.");
			return Vec::new();
		}
	};

	match serde_json::from_str::<Vec<RecipeSummary>>(&json) {
		Ok(mut bookmarks) => {
			let mut seen = hashbrown::HashSet::new();
			bookmarks.retain(|bookmark| seen.insert(bookmark.id.clone()));
			debug!(count = bookmarks.len(), "Restored bookmarks.");
			bookmarks
		}
		Err(error) => {
			warn!(%error, "Discarding corrupt bookmarks.");
			Vec::new()
		}
	}
}
