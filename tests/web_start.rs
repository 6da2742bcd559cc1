#![cfg(target_arch = "wasm32")]

mod catalog_;

use catalog_::{catalog, soup};
use forkful::{config::Config, source::MemorySource, state::RecipeSummary, web::start};
use gloo_timers::future::TimeoutFuture;
use std::rc::Rc;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::window;

wasm_bindgen_test_configure!(run_in_browser);

const PAGE: &str = r#"
	<form class="search"><input class="search__field"></form>
	<div class="results"></div>
	<div class="pagination"></div>
	<ul class="bookmarks__list"></ul>
	<div class="recipe"></div>
	<button class="nav__btn--add-recipe"></button>
	<div class="overlay hidden"></div>
	<div class="add-recipe-window hidden">
		<button class="btn--close-modal"></button>
		<form class="upload"></form>
	</div>
"#;

#[wasm_bindgen_test]
async fn start_after_load_renders_bookmarks_and_the_linked_recipe() {
	let window = window().unwrap();
	let document = window.document().unwrap();
	assert_eq!(document.ready_state(), "complete");

	let bookmarks = serde_json::to_string(&[RecipeSummary::from(&soup())]).unwrap();
	window.local_storage().unwrap().unwrap().set_item(&Config::default().storage_key, &bookmarks).unwrap();
	window.location().set_hash("soup").unwrap();
	document.body().unwrap().set_inner_html(PAGE);

	let _controller = start(Rc::new(MemorySource::new(catalog())), Config::default());
	TimeoutFuture::new(0).await;

	let list = document.query_selector(".bookmarks__list").unwrap().unwrap();
	assert!(list.query_selector("[data-key=soup]").unwrap().is_some());
	let recipe = document.query_selector(".recipe").unwrap().unwrap();
	assert!(recipe.text_content().unwrap().contains("Tomato soup"));
}
