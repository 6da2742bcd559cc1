#![allow(dead_code)]

use bumpalo::Bump;
use core::{
	cell::{Cell, RefCell},
	time::Duration,
};
use forkful::{
	config::Config,
	controller::Controller,
	dom::{
		memory::{MemoryDocument, NodeId},
		Document,
	},
	env::Environment,
	load::load_child_nodes,
	markup::to_html,
	model::Model,
	source::{MemorySource, RecipeSource, SourceError},
	state::{NewRecipe, Recipe, RecipeSummary},
	storage::{MemoryStorage, Storage},
	views::{Roots, Views},
};
use futures::{
	channel::oneshot,
	executor::{LocalPool, LocalSpawner},
	future::LocalBoxFuture,
	task::LocalSpawnExt,
	FutureExt,
};
use lignin::Node;
use std::rc::Rc;

/// Spawns onto a [`LocalPool`]. Timers only fire through [`TestEnvironment::fire_timers`].
pub struct TestEnvironment {
	spawner: LocalSpawner,
	location: RefCell<Option<String>>,
	pushed: RefCell<Vec<String>>,
	timers: RefCell<Vec<(Duration, Option<oneshot::Sender<()>>)>>,
}

impl TestEnvironment {
	pub fn new(spawner: LocalSpawner) -> Self {
		Self {
			spawner,
			location: RefCell::new(None),
			pushed: RefCell::new(Vec::new()),
			timers: RefCell::new(Vec::new()),
		}
	}

	pub fn set_location(&self, id: Option<&str>) {
		*self.location.borrow_mut() = id.map(str::to_owned);
	}

	pub fn pushed(&self) -> Vec<String> {
		self.pushed.borrow().clone()
	}

	pub fn sleeps(&self) -> Vec<Duration> {
		self.timers.borrow().iter().map(|(duration, _)| *duration).collect()
	}

	pub fn fire_timers(&self) {
		for (_, sender) in self.timers.borrow_mut().iter_mut() {
			if let Some(sender) = sender.take() {
				let _ = sender.send(());
			}
		}
	}
}

impl Environment for TestEnvironment {
	fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
		self.spawner.spawn_local(task).unwrap();
	}

	fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
		let (sender, receiver) = oneshot::channel();
		self.timers.borrow_mut().push((duration, Some(sender)));
		async move {
			let _ = receiver.await;
		}
		.boxed_local()
	}

	fn location_id(&self) -> Option<String> {
		self.location.borrow().clone()
	}

	fn push_location_id(&self, id: &str) {
		self.pushed.borrow_mut().push(id.to_owned());
		self.set_location(Some(id));
	}
}

/// A [`MemorySource`] whose responses can be held back and released in any order.
pub struct GatedSource {
	inner: MemorySource,
	gated: Cell<bool>,
	offline: Cell<bool>,
	gates: RefCell<Vec<Option<oneshot::Sender<()>>>>,
}

impl GatedSource {
	pub fn new(recipes: Vec<Recipe>) -> Self {
		Self {
			inner: MemorySource::new(recipes),
			gated: Cell::new(false),
			offline: Cell::new(false),
			gates: RefCell::new(Vec::new()),
		}
	}

	pub fn set_gated(&self, gated: bool) {
		self.gated.set(gated);
	}

	pub fn set_offline(&self, offline: bool) {
		self.offline.set(offline);
	}

	/// Gates in request order.
	pub fn release(&self, index: usize) {
		let sender = self.gates.borrow_mut()[index].take().expect("gate released twice");
		let _ = sender.send(());
	}

	fn gate<T: 'static>(&self, response: LocalBoxFuture<'static, Result<T, SourceError>>) -> LocalBoxFuture<'static, Result<T, SourceError>> {
		let offline = self.offline.get();
		let gate = self.gated.get().then(|| {
			let (sender, receiver) = oneshot::channel();
			self.gates.borrow_mut().push(Some(sender));
			receiver
		});
		async move {
			if let Some(gate) = gate {
				let _ = gate.await;
			}
			if offline {
				return Err(SourceError::Network("offline".to_owned()));
			}
			response.await
		}
		.boxed_local()
	}
}

impl RecipeSource for GatedSource {
	fn recipe(&self, id: &str) -> LocalBoxFuture<'static, Result<Recipe, SourceError>> {
		self.gate(self.inner.recipe(id))
	}

	fn search(&self, query: &str) -> LocalBoxFuture<'static, Result<Vec<RecipeSummary>, SourceError>> {
		self.gate(self.inner.search(query))
	}

	fn upload(&self, recipe: NewRecipe) -> LocalBoxFuture<'static, Result<Recipe, SourceError>> {
		self.gate(self.inner.upload(recipe))
	}
}

/// The whole application on a [`MemoryDocument`].
pub struct App {
	pub pool: LocalPool,
	pub document: Rc<MemoryDocument>,
	pub roots: Roots<NodeId>,
	pub environment: Rc<TestEnvironment>,
	pub source: Rc<GatedSource>,
	pub storage: Rc<MemoryStorage>,
	pub controller: Rc<Controller<MemoryDocument>>,
}

impl App {
	pub fn new(recipes: Vec<Recipe>) -> Self {
		Self::with_storage(recipes, Rc::new(MemoryStorage::new()))
	}

	pub fn with_storage(recipes: Vec<Recipe>, storage: Rc<MemoryStorage>) -> Self {
		Self::with_source(Rc::new(GatedSource::new(recipes)), storage, |source, _| source)
	}

	/// `wrap` can layer another source (like a timeout) over the gated one.
	pub fn with_source(source: Rc<GatedSource>, storage: Rc<MemoryStorage>, wrap: impl FnOnce(Rc<dyn RecipeSource>, Rc<dyn Environment>) -> Rc<dyn RecipeSource>) -> Self {
		let pool = LocalPool::new();
		let document = Rc::new(MemoryDocument::new());
		let roots = Roots::detached(&*document);
		let environment = Rc::new(TestEnvironment::new(pool.spawner()));
		let config = Config::default();

		let views = Views::new(&document, roots.clone(), &config.icons);
		let dyn_environment: Rc<dyn Environment> = environment.clone();
		let dyn_source: Rc<dyn RecipeSource> = source.clone();
		let dyn_storage: Rc<dyn Storage> = storage.clone();
		let model = Model::new(wrap(dyn_source, Rc::clone(&dyn_environment)), dyn_storage, config);
		let controller = Controller::new(model, views, dyn_environment);

		Self {
			pool,
			document,
			roots,
			environment,
			source,
			storage,
			controller,
		}
	}

	pub fn init(&mut self) {
		self.controller.init();
		self.run();
	}

	pub fn run(&mut self) {
		self.pool.run_until_stalled();
	}

	pub fn html(&self, root: NodeId) -> String {
		let bump = Bump::new();
		to_html(&Node::Multi(load_child_nodes(&*self.document, &root, &bump)))
	}

	pub fn text(&self, root: NodeId) -> String {
		self.document.text_content(&root)
	}

	/// The first descendant of `root` with `class`.
	pub fn find(&self, root: NodeId, class: &str) -> NodeId {
		*self.document.find_by_class(root, class).first().unwrap_or_else(|| panic!("no .{} in {}", class, self.html(root)))
	}

	pub fn row_ids(&self, root: NodeId) -> Vec<String> {
		self.document.find_by_class(root, "preview").iter().map(|row| self.document.attribute(row, "data-key").unwrap()).collect()
	}
}
