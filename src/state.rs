//! Application state and the view data derived from it.
//!
//! [`State`] is only ever written by [`Model`](`crate::model::Model`); everything else gets a
//! shared borrow and reads it through the accessors here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
	pub quantity: Option<f64>,
	pub unit: String,
	pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
	pub id: String,
	pub title: String,
	pub publisher: String,
	pub source_url: String,
	pub image_url: String,
	pub servings: u32,
	pub cooking_time: u32,
	pub ingredients: Vec<Ingredient>,
	/// Set on user-uploaded recipes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
}

/// A search result or bookmark row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
	pub id: String,
	pub title: String,
	pub publisher: String,
	pub image_url: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
}
impl From<&Recipe> for RecipeSummary {
	fn from(recipe: &Recipe) -> Self {
		Self {
			id: recipe.id.clone(),
			title: recipe.title.clone(),
			publisher: recipe.publisher.clone(),
			image_url: recipe.image_url.clone(),
			key: recipe.key.clone(),
		}
	}
}

/// A recipe as submitted through the upload form, before the source assigned it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
	pub title: String,
	pub source_url: String,
	pub image_url: String,
	pub publisher: String,
	pub cooking_time: u32,
	pub servings: u32,
	pub ingredients: Vec<Ingredient>,
	pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
	pub(crate) query: String,
	pub(crate) results: Vec<RecipeSummary>,
	pub(crate) page: usize,
	pub(crate) results_per_page: usize,
}
impl SearchState {
	pub(crate) fn new(results_per_page: usize) -> Self {
		Self {
			page: 1,
			results_per_page,
			..Self::default()
		}
	}

	#[must_use]
	pub fn query(&self) -> &str {
		&self.query
	}

	#[must_use]
	pub fn results(&self) -> &[RecipeSummary] {
		&self.results
	}

	/// 1-based.
	#[must_use]
	pub fn page(&self) -> usize {
		self.page
	}

	#[must_use]
	pub fn results_per_page(&self) -> usize {
		self.results_per_page
	}

	/// `0` while there are no results.
	#[must_use]
	pub fn pages(&self) -> usize {
		(self.results.len() + self.results_per_page - 1) / self.results_per_page
	}

	/// The results on `page`, which must be valid.
	pub(crate) fn slice(&self, page: usize) -> &[RecipeSummary] {
		let start = ((page - 1) * self.results_per_page).min(self.results.len());
		let end = (page * self.results_per_page).min(self.results.len());
		&self.results[start..end]
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
	pub(crate) recipe: Option<Recipe>,
	pub(crate) search: SearchState,
	pub(crate) bookmarks: Vec<RecipeSummary>,
}
impl State {
	pub(crate) fn new(results_per_page: usize) -> Self {
		Self {
			recipe: None,
			search: SearchState::new(results_per_page),
			bookmarks: Vec::new(),
		}
	}

	#[must_use]
	pub fn recipe(&self) -> Option<&Recipe> {
		self.recipe.as_ref()
	}

	#[must_use]
	pub fn search(&self) -> &SearchState {
		&self.search
	}

	/// In the order they were added.
	#[must_use]
	pub fn bookmarks(&self) -> &[RecipeSummary] {
		&self.bookmarks
	}

	#[must_use]
	pub fn is_bookmarked(&self, id: &str) -> bool {
		self.bookmarks.iter().any(|bookmark| bookmark.id == id)
	}

	/// The current recipe together with its bookmark flag, which is never stored.
	#[must_use]
	pub fn recipe_detail(&self) -> Option<RecipeDetail> {
		self.recipe.as_ref().map(|recipe| RecipeDetail {
			recipe: recipe.clone(),
			bookmarked: self.is_bookmarked(&recipe.id),
		})
	}

	/// Rows of the current results page, highlighting `selected`.
	#[must_use]
	pub fn page_previews(&self, selected: Option<&str>) -> Previews {
		let page = self.search.page.clamp(1, self.search.pages().max(1));
		Previews::new(self.search.slice(page).to_vec(), selected)
	}

	#[must_use]
	pub fn bookmark_previews(&self, selected: Option<&str>) -> Previews {
		Previews::new(self.bookmarks.clone(), selected)
	}

	#[must_use]
	pub fn pagination(&self) -> Pagination {
		Pagination {
			page: self.search.page,
			pages: self.search.pages(),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDetail {
	pub recipe: Recipe,
	pub bookmarked: bool,
}

/// Data of the results and bookmarks lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Previews {
	pub rows: Vec<RecipeSummary>,
	pub selected: Option<String>,
}
impl Previews {
	#[must_use]
	pub fn new(rows: Vec<RecipeSummary>, selected: Option<&str>) -> Self {
		Self {
			rows,
			selected: selected.map(str::to_owned),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
	pub page: usize,
	pub pages: usize,
}
