//! The opaque asynchronous recipe catalog.

use crate::{
	env::Environment,
	state::{NewRecipe, Recipe, RecipeSummary},
};
use core::{
	cell::{Cell, RefCell},
	time::Duration,
};
use futures::{
	future::{self, Either, LocalBoxFuture},
	FutureExt as _,
};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, trace};

/// Every variant displays a message that can be shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
	#[error("No recipe found with ID {id}")]
	NotFound { id: String },
	#[error("Network error: {0}")]
	Network(String),
	#[error("Request took too long! Timeout after {seconds} seconds")]
	Timeout { seconds: u64 },
	#[error("{0}")]
	Rejected(String),
}

pub trait RecipeSource {
	fn recipe(&self, id: &str) -> LocalBoxFuture<'static, Result<Recipe, SourceError>>;
	fn search(&self, query: &str) -> LocalBoxFuture<'static, Result<Vec<RecipeSummary>, SourceError>>;
	/// Resolves to the stored recipe, with its assigned id.
	fn upload(&self, recipe: NewRecipe) -> LocalBoxFuture<'static, Result<Recipe, SourceError>>;
}

/// An in-memory catalog that resolves immediately.
#[derive(Debug, Default)]
pub struct MemorySource {
	recipes: RefCell<Vec<Recipe>>,
	next_id: Cell<u64>,
}

impl MemorySource {
	#[must_use]
	pub fn new(recipes: Vec<Recipe>) -> Self {
		Self {
			recipes: RefCell::new(recipes),
			next_id: Cell::new(1),
		}
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.recipes.borrow().len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl RecipeSource for MemorySource {
	fn recipe(&self, id: &str) -> LocalBoxFuture<'static, Result<Recipe, SourceError>> {
		let result = self.recipes.borrow().iter().find(|recipe| recipe.id == id).cloned().ok_or_else(|| SourceError::NotFound { id: id.to_owned() });
		future::ready(result).boxed_local()
	}

	/// Matches titles and ingredient descriptions, case-insensitively.
	fn search(&self, query: &str) -> LocalBoxFuture<'static, Result<Vec<RecipeSummary>, SourceError>> {
		let query = query.to_lowercase();
		let results: Vec<_> = self
			.recipes
			.borrow()
			.iter()
			.filter(|recipe| recipe.title.to_lowercase().contains(&query) || recipe.ingredients.iter().any(|ingredient| ingredient.description.to_lowercase().contains(&query)))
			.map(RecipeSummary::from)
			.collect();
		trace!(results = results.len(), "Searched memory catalog.");
		future::ready(Ok(results)).boxed_local()
	}

	fn upload(&self, recipe: NewRecipe) -> LocalBoxFuture<'static, Result<Recipe, SourceError>> {
		let id = self.next_id.get();
		self.next_id.set(id + 1);
		let recipe = Recipe {
			id: format!("upload-{}", id),
			title: recipe.title,
			publisher: recipe.publisher,
			source_url: recipe.source_url,
			image_url: recipe.image_url,
			servings: recipe.servings,
			cooking_time: recipe.cooking_time,
			ingredients: recipe.ingredients,
			key: recipe.key,
		};
		debug!(id = %recipe.id, "Stored uploaded recipe.");
		self.recipes.borrow_mut().push(recipe.clone());
		future::ready(Ok(recipe)).boxed_local()
	}
}

/// Fails requests of the wrapped source that take longer than a fixed duration.
pub struct Timeout {
	source: Rc<dyn RecipeSource>,
	environment: Rc<dyn Environment>,
	duration: Duration,
}

impl Timeout {
	pub fn new(source: Rc<dyn RecipeSource>, environment: Rc<dyn Environment>, duration: Duration) -> Self {
		Self { source, environment, duration }
	}

	fn race<T: 'static>(&self, request: LocalBoxFuture<'static, Result<T, SourceError>>) -> LocalBoxFuture<'static, Result<T, SourceError>> {
		let timer = self.environment.sleep(self.duration);
		let seconds = self.duration.as_secs();
		async move {
			match future::select(request, timer).await {
				Either::Left((result, _)) => result,
				Either::Right(((), _)) => {
					debug!(seconds, "Request timed out.");
					Err(SourceError::Timeout { seconds })
				}
			}
		}
		.boxed_local()
	}
}

impl RecipeSource for Timeout {
	fn recipe(&self, id: &str) -> LocalBoxFuture<'static, Result<Recipe, SourceError>> {
		self.race(self.source.recipe(id))
	}

	fn search(&self, query: &str) -> LocalBoxFuture<'static, Result<Vec<RecipeSummary>, SourceError>> {
		self.race(self.source.search(query))
	}

	fn upload(&self, recipe: NewRecipe) -> LocalBoxFuture<'static, Result<Recipe, SourceError>> {
		self.race(self.source.upload(recipe))
	}
}
