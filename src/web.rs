//! Browser bindings: the live DOM, `localStorage`, the event loop and startup wiring.

use crate::{
	config::Config,
	controller::Controller,
	dom::{Content, Document, Namespace},
	env::Environment,
	model::{FormFields, Model},
	source::{RecipeSource, Timeout},
	storage::{Storage, StorageError},
	views::{Roots, Views},
};
use core::time::Duration;
use futures::{future::LocalBoxFuture, FutureExt as _};
use std::rc::Rc;
use tracing::{debug, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue, UnwrapThrowExt};
use web_sys::{CharacterData, Element, Event, EventTarget, FormData, HtmlFormElement, HtmlInputElement, Node, Window};

/// The page's [`web_sys::Document`].
#[derive(Debug, Clone)]
pub struct WebDocument {
	document: web_sys::Document,
}

impl WebDocument {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self { document }
	}

	#[must_use]
	pub fn inner(&self) -> &web_sys::Document {
		&self.document
	}

	/// # Panics
	///
	/// If nothing matches `selector`.
	#[must_use]
	pub fn select(&self, selector: &str) -> Node {
		self.document.query_selector(selector).unwrap_throw().expect_throw(selector).into()
	}
}

impl Document for WebDocument {
	type Node = Node;

	fn create_element(&self, namespace: Namespace, name: &str) -> Node {
		match namespace.uri() {
			None => self.document.create_element(name),
			Some(uri) => self.document.create_element_ns(Some(uri), name),
		}
		.unwrap_throw()
		.into()
	}

	fn create_text(&self, data: &str) -> Node {
		self.document.create_text_node(data).into()
	}

	fn create_comment(&self, data: &str) -> Node {
		self.document.create_comment(data).into()
	}

	fn content(&self, node: &Node) -> Content {
		if let Some(element) = node.dyn_ref::<Element>() {
			let attributes = element.attributes();
			Content::Element {
				namespace: Namespace::from_uri(element.namespace_uri().as_deref()),
				name: element.local_name(),
				attributes: (0..attributes.length()).filter_map(|i| attributes.item(i)).map(|attribute| (attribute.name(), attribute.value())).collect(),
			}
		} else if let Some(text) = node.dyn_ref::<web_sys::Text>() {
			Content::Text(text.data())
		} else if let Some(comment) = node.dyn_ref::<web_sys::Comment>() {
			Content::Comment(comment.data())
		} else {
			trace!(?node, "Treating unexpected node type as empty comment.");
			Content::Comment(String::new())
		}
	}

	fn child_nodes(&self, node: &Node) -> Vec<Node> {
		let child_nodes = node.child_nodes();
		(0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).collect()
	}

	fn parent_node(&self, node: &Node) -> Option<Node> {
		node.parent_node()
	}

	fn insert_before(&self, parent: &Node, child: &Node, reference: Option<&Node>) {
		parent.insert_before(child, reference).unwrap_throw();
	}

	fn remove_child(&self, parent: &Node, child: &Node) {
		parent.remove_child(child).unwrap_throw();
	}

	fn set_attribute(&self, element: &Node, name: &str, value: &str) {
		element.unchecked_ref::<Element>().set_attribute(name, value).unwrap_throw();
	}

	fn set_text_content(&self, node: &Node, text: &str) {
		node.set_text_content(Some(text));
	}

	fn set_data(&self, node: &Node, data: &str) {
		node.unchecked_ref::<CharacterData>().set_data(data);
	}
}

/// [***localStorage***](https://developer.mozilla.org/en-US/docs/Web/API/Window/localStorage)
pub struct LocalStorage {
	storage: Option<web_sys::Storage>,
}

impl LocalStorage {
	#[must_use]
	pub fn new(window: &Window) -> Self {
		let storage = window.local_storage().ok().flatten();
		if storage.is_none() {
			warn!("`localStorage` is unavailable. Bookmarks won't persist.");
		}
		Self { storage }
	}
}

impl Storage for LocalStorage {
	fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		self.storage.as_ref().ok_or(StorageError::Unavailable)?.get_item(key).map_err(|_| StorageError::Unavailable)
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.storage.as_ref().ok_or(StorageError::Unavailable)?.set_item(key, value).map_err(|error| StorageError::Write {
			key: key.to_owned(),
			reason: format!("{:?}", error),
		})
	}
}

/// The browser event loop, timers and location hash.
pub struct Browser {
	window: Window,
}

impl Browser {
	#[must_use]
	pub fn new(window: Window) -> Self {
		Self { window }
	}
}

impl Environment for Browser {
	fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
		wasm_bindgen_futures::spawn_local(task);
	}

	fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
		gloo_timers::future::sleep(duration).boxed_local()
	}

	fn location_id(&self) -> Option<String> {
		let hash = self.window.location().hash().ok()?;
		let id = hash.trim_start_matches('#');
		(!id.is_empty()).then(|| id.to_owned())
	}

	fn push_location_id(&self, id: &str) {
		self.window.history().unwrap_throw().push_state_with_url(&JsValue::NULL, "", Some(&format!("#{}", id))).unwrap_throw();
	}
}

fn listen(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) {
	let closure = Closure::<dyn FnMut(Event)>::new(handler);
	target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()).unwrap_throw();
	// Listeners live as long as the page.
	closure.forget();
}

fn event_target_node(event: &Event) -> Option<Node> {
	event.target().and_then(|target| target.dyn_into::<Node>().ok())
}

fn form_fields(form: &HtmlFormElement) -> FormFields {
	let data = FormData::new_with_form(form).unwrap_throw();
	let mut fields = FormFields::new();
	if let Ok(Some(entries)) = js_sys::try_iter(&data) {
		for entry in entries.flatten() {
			let entry = js_sys::Array::from(&entry);
			if let (Some(name), Some(value)) = (entry.get(0).as_string(), entry.get(1).as_string()) {
				fields.push(name, value);
			}
		}
	}
	fields
}

/// Installs the log subscriber, wires the views to the page's markup and runs the controller.
///
/// The page must contain `.recipe`, `.results`, `.pagination`, `.bookmarks__list`, `.search`
/// (with `.search__field`), `.upload`, `.add-recipe-window`, `.overlay`, `.nav__btn--add-recipe`
/// and `.btn--close-modal`.
pub fn start(source: Rc<dyn RecipeSource>, config: Config) -> Rc<Controller<WebDocument>> {
	tracing_wasm::set_as_global_default();

	let window = web_sys::window().expect_throw("No `window`.");
	let document = Rc::new(WebDocument::new(window.document().expect_throw("No `document`.")));
	let environment: Rc<dyn Environment> = Rc::new(Browser::new(window.clone()));

	let roots = Roots {
		recipe: document.select(".recipe"),
		results: document.select(".results"),
		pagination: document.select(".pagination"),
		bookmarks: document.select(".bookmarks__list"),
		upload: document.select(".upload"),
		window: document.select(".add-recipe-window"),
		overlay: document.select(".overlay"),
	};
	let views = Views::new(&document, roots.clone(), &config.icons);

	let source: Rc<dyn RecipeSource> = Rc::new(Timeout::new(source, Rc::clone(&environment), config.request_timeout));
	let model = Model::new(source, Rc::new(LocalStorage::new(&window)), config);
	let controller = Controller::new(model, views, environment);
	controller.init();

	let weak = Rc::downgrade(&controller);
	let with = move |f: fn(&Controller<WebDocument>, Event)| {
		let weak = weak.clone();
		move |event: Event| {
			if let Some(controller) = weak.upgrade() {
				f(&controller, event);
			}
		}
	};

	listen(&window, "hashchange", with(|controller, _| controller.views().recipe.location_changed()));
	listen(&window, "load", with(|controller, _| controller.views().page_loaded()));

	listen(
		&roots.recipe,
		"click",
		with(|controller, event| {
			if let Some(target) = event_target_node(&event) {
				controller.views().recipe.click(&target);
			}
		}),
	);
	listen(
		&roots.pagination,
		"click",
		with(|controller, event| {
			if let Some(target) = event_target_node(&event) {
				controller.views().pagination.click(&target);
			}
		}),
	);

	let search: Node = document.select(".search");
	listen(
		&search,
		"submit",
		with(|controller, event| {
			event.prevent_default();
			let field = event
				.current_target()
				.and_then(|form| form.dyn_into::<Element>().ok())
				.and_then(|form| form.query_selector(".search__field").ok().flatten())
				.and_then(|field| field.dyn_into::<HtmlInputElement>().ok());
			match field {
				Some(field) => {
					let query = field.value();
					field.set_value("");
					controller.views().search.submit(&query);
				}
				None => warn!("Search form without `.search__field`."),
			}
		}),
	);

	fn toggle(controller: &Controller<WebDocument>, _: Event) {
		controller.views().add_recipe.toggle_window();
	}
	listen(&document.select(".nav__btn--add-recipe"), "click", with(toggle));
	listen(&document.select(".btn--close-modal"), "click", with(toggle));
	listen(&roots.overlay, "click", with(toggle));

	listen(
		&roots.upload,
		"submit",
		with(|controller, event| {
			event.prevent_default();
			match event.current_target().and_then(|form| form.dyn_into::<HtmlFormElement>().ok()) {
				Some(form) => controller.views().add_recipe.submit(form_fields(&form)),
				None => warn!("Upload submitted without a form."),
			}
		}),
	);

	// `load` won't fire again if `start` runs late, e.g. from an async module script.
	if document.inner().ready_state() == "complete" {
		debug!("Page already loaded.");
		controller.views().page_loaded();
	}

	debug!("Started.");
	controller
}
