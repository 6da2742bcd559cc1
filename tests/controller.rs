mod catalog_;
mod environment_;

use catalog_::{catalog, pizza_ids};
use environment_::{App, GatedSource};
use forkful::{
	config::Config,
	dom::Document,
	model::FormFields,
	source::{RecipeSource, Timeout},
	storage::{MemoryStorage, Storage},
	view::Shown,
};
use std::rc::Rc;

fn started() -> App {
	let mut app = App::new(catalog());
	app.init();
	app
}

fn open_recipe(app: &mut App, id: &str) {
	app.environment.set_location(Some(id));
	app.controller.views().recipe.location_changed();
	app.run();
}

fn search(app: &mut App, query: &str) {
	app.controller.views().search.submit(query);
	app.run();
}

fn bread() -> FormFields {
	[
		("title", "Bread"),
		("sourceUrl", "https://example.com/bread"),
		("image", "https://example.com/bread.jpg"),
		("publisher", "Me"),
		("cookingTime", "60"),
		("servings", "2"),
		("ingredient-1", "1,kg,flour"),
		("ingredient-2", ",,salt"),
		("ingredient-3", ""),
	]
	.iter()
	.copied()
	.collect()
}

#[test]
fn startup() {
	let app = started();
	let views = app.controller.views();

	assert_eq!(views.recipe.shown(), Shown::Message);
	assert!(app.text(app.roots.recipe).contains("Start by searching for a recipe or an ingredient. Have fun!"));
	assert_eq!(views.add_recipe.shown(), Shown::Content);
	assert_eq!(app.document.find_by_name(app.roots.upload, "input").len(), 12);
	assert!(!views.add_recipe.is_open());

	// The startup search has an empty query, so nothing was requested.
	assert_eq!(views.results.shown(), Shown::Nothing);
	assert_eq!(app.html(app.roots.results), "");
	assert_eq!(app.html(app.roots.pagination), "");
}

#[test]
fn search_and_paginate() {
	let mut app = started();
	search(&mut app, "  pizza ");

	assert_eq!(app.row_ids(app.roots.results), pizza_ids(1..=10));
	assert_eq!(app.text(app.roots.pagination), "Page 2");

	let next = app.find(app.roots.pagination, "pagination__btn--next");
	let label = app.document.find_by_name(next, "span")[0];
	app.controller.views().pagination.click(&label);
	assert_eq!(app.row_ids(app.roots.results), pizza_ids(11..=20));
	assert_eq!(app.text(app.roots.pagination), "Page 1");
	assert_eq!(app.controller.model().state().search().page(), 2);

	let previous = app.find(app.roots.pagination, "pagination__btn--prev");
	app.controller.views().pagination.click(&previous);
	assert_eq!(app.row_ids(app.roots.results), pizza_ids(1..=10));
}

#[test]
fn empty_search_shows_the_results_error() {
	let mut app = started();
	search(&mut app, "caviar");

	assert_eq!(app.controller.views().results.shown(), Shown::Error);
	assert!(app.text(app.roots.results).contains("No recipes found for your query! Please try again ;)"));
	assert_eq!(app.html(app.roots.pagination), "");
}

#[test]
fn opening_a_recipe_marks_its_row_in_place() {
	let mut app = started();
	search(&mut app, "pizza");
	let rows = app.document.find_by_class(app.roots.results, "preview");

	open_recipe(&mut app, "pizza-3");

	assert!(app.text(app.roots.recipe).contains("Pizza 3"));
	assert_eq!(app.document.find_by_class(app.roots.results, "preview"), rows);
	let active = app.find(app.roots.results, "preview__link--active");
	assert_eq!(app.document.attribute(&active, "href").as_deref(), Some("#pizza-3"));
}

#[test]
fn missing_recipe_shows_the_error_and_keeps_state() {
	let mut app = started();
	open_recipe(&mut app, "soup");
	open_recipe(&mut app, "missing");

	assert_eq!(app.controller.views().recipe.shown(), Shown::Error);
	assert!(app.text(app.roots.recipe).contains("We could not find that recipe. Please try another one!"));
	assert_eq!(app.controller.model().state().recipe().unwrap().id, "soup");
}

#[test]
fn servings_update_in_place_and_keep_focus() {
	let mut app = started();
	open_recipe(&mut app, "soup");
	let buttons = app.document.find_by_class(app.roots.recipe, "btn--update-servings");
	let plus = buttons[1];
	assert_eq!(app.document.attribute(&plus, "data-update-to").as_deref(), Some("5"));
	app.document.focus(plus);

	let icon = app.document.find_by_name(plus, "use")[0];
	app.controller.views().recipe.click(&icon);

	let quantity = app.find(app.roots.recipe, "recipe__quantity");
	assert_eq!(app.text(quantity), "2 1/2");
	assert_eq!(app.text(app.find(app.roots.recipe, "recipe__info-data--people")), "5");
	assert_eq!(app.document.attribute(&plus, "data-update-to").as_deref(), Some("6"));
	assert_eq!(app.document.focused(), Some(plus));

	app.controller.control_servings(8);
	assert_eq!(app.text(app.find(app.roots.recipe, "recipe__quantity")), "4");
	assert_eq!(app.find(app.roots.recipe, "recipe__quantity"), quantity);
	assert_eq!(app.document.focused(), Some(plus));
}

#[test]
fn minus_does_nothing_at_one_serving() {
	let mut app = started();
	open_recipe(&mut app, "soup");
	for _ in 0..3 {
		let minus = app.find(app.roots.recipe, "btn--update-servings");
		app.controller.views().recipe.click(&minus);
	}
	assert_eq!(app.controller.model().state().recipe().unwrap().servings, 1);

	let minus = app.find(app.roots.recipe, "btn--update-servings");
	assert_eq!(app.document.attribute(&minus, "data-update-to").as_deref(), Some("0"));
	app.controller.views().recipe.click(&minus);
	assert_eq!(app.controller.model().state().recipe().unwrap().servings, 1);
}

#[test]
fn bookmark_toggle() {
	let mut app = started();
	app.controller.views().bookmarks.loaded();
	assert!(app.text(app.roots.bookmarks).contains("No bookmarks yet. Find a nice recipe and bookmark it ;)"));

	open_recipe(&mut app, "soup");
	let button = app.find(app.roots.recipe, "btn--bookmark");
	app.controller.views().recipe.click(&button);

	assert!(app.html(button).contains("#icon-bookmark-fill"));
	assert_eq!(app.row_ids(app.roots.bookmarks), ["soup"]);
	app.find(app.roots.bookmarks, "preview__link--active");
	assert!(app.storage.get("bookmarks").unwrap().unwrap().contains("soup"));

	app.controller.views().recipe.click(&button);
	assert!(!app.html(button).contains("#icon-bookmark-fill"));
	assert!(app.html(button).contains("#icon-bookmark\""));
	assert!(app.text(app.roots.bookmarks).contains("No bookmarks yet."));
	assert_eq!(app.storage.get("bookmarks").unwrap().as_deref(), Some("[]"));
}

#[test]
fn persisted_bookmarks_render_on_load() {
	let storage = Rc::new(MemoryStorage::new());
	{
		let mut app = App::with_storage(catalog(), Rc::clone(&storage));
		app.init();
		open_recipe(&mut app, "pasta");
		app.controller.control_add_bookmark();
	}

	let mut app = App::with_storage(catalog(), storage);
	app.init();
	app.controller.views().bookmarks.loaded();
	assert_eq!(app.row_ids(app.roots.bookmarks), ["pasta"]);
}

#[test]
fn stale_recipe_response_is_dropped() {
	let mut app = started();
	app.source.set_gated(true);
	open_recipe(&mut app, "soup");
	open_recipe(&mut app, "pasta");
	assert_eq!(app.controller.views().recipe.shown(), Shown::Spinner);

	app.source.release(1);
	app.run();
	assert!(app.text(app.roots.recipe).contains("Pasta al pomodoro"));

	app.source.release(0);
	app.run();
	assert!(app.text(app.roots.recipe).contains("Pasta al pomodoro"));
	assert_eq!(app.controller.model().state().recipe().unwrap().id, "pasta");
}

#[test]
fn stale_search_response_is_dropped() {
	let mut app = started();
	app.source.set_gated(true);
	search(&mut app, "pizza");
	search(&mut app, "pasta");
	assert_eq!(app.controller.views().results.shown(), Shown::Spinner);

	app.source.release(1);
	app.run();
	assert_eq!(app.row_ids(app.roots.results), ["pasta"]);

	app.source.release(0);
	app.run();
	assert_eq!(app.row_ids(app.roots.results), ["pasta"]);
	assert_eq!(app.controller.model().state().search().query(), "pasta");
	assert_eq!(app.html(app.roots.pagination), "");
}

#[test]
fn opening_a_recipe_keeps_the_results_error() {
	let mut app = started();
	search(&mut app, "pizza");
	app.source.set_offline(true);
	search(&mut app, "pasta");
	app.source.set_offline(false);

	open_recipe(&mut app, "soup");

	assert!(app.text(app.roots.recipe).contains("Tomato soup"));
	assert_eq!(app.controller.views().results.shown(), Shown::Error);
	assert!(app.text(app.roots.results).contains("Network error: offline"));
	assert!(app.document.find_by_class(app.roots.results, "preview").is_empty());
	assert_eq!(app.html(app.roots.pagination), "");
}

#[test]
fn opening_a_recipe_keeps_the_results_spinner() {
	let mut app = started();
	search(&mut app, "pizza");
	app.source.set_gated(true);
	search(&mut app, "pasta");
	open_recipe(&mut app, "soup");

	assert_eq!(app.controller.views().results.shown(), Shown::Spinner);
	assert!(app.document.find_by_class(app.roots.results, "preview").is_empty());

	app.source.release(0);
	app.run();
	assert_eq!(app.row_ids(app.roots.results), ["pasta"]);

	app.source.release(1);
	app.run();
	assert!(app.text(app.roots.recipe).contains("Tomato soup"));
}

#[test]
fn page_load_renders_bookmarks_and_the_linked_recipe() {
	let storage = Rc::new(MemoryStorage::new());
	{
		let mut app = App::with_storage(catalog(), Rc::clone(&storage));
		app.init();
		open_recipe(&mut app, "pasta");
		app.controller.control_add_bookmark();
	}

	let mut app = App::with_storage(catalog(), storage);
	app.environment.set_location(Some("soup"));
	app.init();
	app.controller.views().page_loaded();
	app.run();

	assert_eq!(app.row_ids(app.roots.bookmarks), ["pasta"]);
	assert!(app.text(app.roots.recipe).contains("Tomato soup"));
}

#[test]
fn failed_search_shows_the_reason_and_clears_the_pager() {
	let mut app = started();
	search(&mut app, "pizza");
	assert_ne!(app.html(app.roots.pagination), "");

	app.source.set_offline(true);
	search(&mut app, "pasta");

	assert_eq!(app.controller.views().results.shown(), Shown::Error);
	assert!(app.text(app.roots.results).contains("Network error: offline"));
	assert_eq!(app.html(app.roots.pagination), "");
	assert_eq!(app.controller.model().state().search().query(), "pizza");
}

#[test]
fn upload_success() {
	let mut app = started();
	let views = Rc::clone(&app.controller);
	let add_recipe = &views.views().add_recipe;
	add_recipe.toggle_window();
	assert!(add_recipe.is_open());
	assert!(!app.document.has_class(&app.roots.overlay, "hidden"));

	add_recipe.submit(bread());
	app.run();

	assert!(app.text(app.roots.recipe).contains("Bread"));
	let user_generated = app.find(app.roots.recipe, "recipe__user-generated");
	assert!(!app.document.has_class(&user_generated, "hidden"));
	assert_eq!(add_recipe.shown(), Shown::Message);
	assert!(app.text(app.roots.upload).contains("Recipe was successfully uploaded :)"));
	assert_eq!(app.environment.pushed(), ["upload-1"]);
	assert_eq!(app.row_ids(app.roots.bookmarks), ["upload-1"]);
	assert_eq!(app.environment.sleeps(), [Config::default().modal_close]);
	assert!(add_recipe.is_open());

	app.environment.fire_timers();
	app.run();

	assert!(!add_recipe.is_open());
	assert!(app.document.has_class(&app.roots.overlay, "hidden"));
	assert_eq!(add_recipe.shown(), Shown::Content);
	assert_eq!(app.document.find_by_name(app.roots.upload, "input").len(), 12);
}

#[test]
fn upload_failure_keeps_the_window_open() {
	let mut app = started();
	let views = Rc::clone(&app.controller);
	let add_recipe = &views.views().add_recipe;
	add_recipe.toggle_window();

	let mut fields = bread();
	fields.push("ingredient-4", "lots of garlic");
	add_recipe.submit(fields);
	app.run();

	assert_eq!(add_recipe.shown(), Shown::Error);
	assert!(app.text(app.roots.upload).contains("Wrong ingredient format! Please use the correct format :)"));
	assert!(add_recipe.is_open());
	assert_eq!(app.controller.views().recipe.shown(), Shown::Message);
	assert!(app.environment.pushed().is_empty());
	assert!(app.environment.sleeps().is_empty());
}

#[test]
fn slow_search_times_out() {
	let source = Rc::new(GatedSource::new(catalog()));
	let mut app = App::with_source(Rc::clone(&source), Rc::new(MemoryStorage::new()), |source, environment| -> Rc<dyn RecipeSource> {
		Rc::new(Timeout::new(source, environment, Config::default().request_timeout))
	});
	app.init();
	source.set_gated(true);

	search(&mut app, "pizza");
	assert_eq!(app.controller.views().results.shown(), Shown::Spinner);
	assert_eq!(app.environment.sleeps(), [Config::default().request_timeout]);

	app.environment.fire_timers();
	app.run();
	assert!(app.text(app.roots.results).contains("Request took too long! Timeout after 10 seconds"));

	// The late response is ignored.
	source.release(0);
	app.run();
	assert_eq!(app.controller.views().results.shown(), Shown::Error);
}
