use crate::{
	dom::Document,
	event::Publisher,
	markup::Html,
	model::FormFields,
	view::{Component, View},
};
use core::ops::Deref;
use lignin::{Node, ThreadBound};
use std::rc::Rc;
use tracing::debug;

pub const INGREDIENT_FIELDS: usize = 6;

/// The blank upload form.
pub struct UploadForm;
impl Component for UploadForm {
	type Data = ();

	const NAME: &'static str = "add-recipe";
	const ERROR_MESSAGE: &'static str = "Something went wrong with the upload. Please try again!";
	const MESSAGE: &'static str = "Recipe was successfully uploaded :)";

	fn is_empty(_: &()) -> bool {
		false
	}

	fn markup<'a>(&self, _: &(), html: &Html<'a>) -> Node<'a, ThreadBound> {
		let field = |label: &str, name: &'a str, kind: &'a str| {
			[
				html.element("label", &[], &[html.text(label)]),
				html.element("input", &[("required", ""), ("name", name), ("type", kind)], &[]),
			]
		};

		let mut data = vec![html.element("h3", &[("class", "upload__heading")], &[html.text("Recipe data")])];
		for (label, name, kind) in [
			("Title", "title", "text"),
			("URL", "sourceUrl", "text"),
			("Image URL", "image", "text"),
			("Publisher", "publisher", "text"),
			("Prep time", "cookingTime", "number"),
			("Servings", "servings", "number"),
		] {
			data.extend(field(label, name, kind));
		}

		let mut ingredients = vec![html.element("h3", &[("class", "upload__heading")], &[html.text("Ingredients")])];
		for i in 1..=INGREDIENT_FIELDS {
			let name = html.fmt(format_args!("ingredient-{}", i));
			ingredients.push(html.element("label", &[], &[html.text(&format!("Ingredient {}", i))]));
			let mut attributes = vec![("type", "text"), ("name", name), ("placeholder", "Format: 'Quantity,Unit,Description'")];
			if i <= 3 {
				attributes.insert(0, ("required", ""));
			}
			ingredients.push(html.element("input", &attributes, &[]));
		}

		html.multi(&[
			html.element("div", &[("class", "upload__column")], &data),
			html.element("div", &[("class", "upload__column")], &ingredients),
			html.element("button", &[("class", "btn upload__btn")], &[html.icon(None, "upload-cloud"), html.element("span", &[], &[html.text("Upload")])]),
		])
	}
}

/// The upload form inside its modal window.
pub struct AddRecipeView<D: Document> {
	view: View<D, UploadForm>,
	window: D::Node,
	overlay: D::Node,
	submitted: Publisher<FormFields>,
}

impl<D: Document> AddRecipeView<D> {
	pub fn new(document: Rc<D>, form: D::Node, window: D::Node, overlay: D::Node, icons: Rc<str>) -> Self {
		Self {
			view: View::new(document, form, UploadForm, icons),
			window,
			overlay,
			submitted: Publisher::new(),
		}
	}

	pub fn add_handler_upload(&self, handler: impl Fn(FormFields) + 'static) {
		self.submitted.subscribe(handler);
	}

	pub fn submit(&self, fields: FormFields) {
		self.submitted.publish(fields);
	}

	#[must_use]
	pub fn is_open(&self) -> bool {
		!self.document().has_class(&self.window, "hidden")
	}

	pub fn toggle_window(&self) {
		let document = self.document();
		let hidden = document.toggle_class(&self.window, "hidden");
		if document.has_class(&self.overlay, "hidden") != hidden {
			document.toggle_class(&self.overlay, "hidden");
		}
		debug!(open = !hidden, "Toggled upload window.");
	}

	/// Closes the window if it is open.
	pub fn close_window(&self) {
		if self.is_open() {
			self.toggle_window();
		}
	}
}

impl<D: Document> Deref for AddRecipeView<D> {
	type Target = View<D, UploadForm>;

	fn deref(&self) -> &Self::Target {
		&self.view
	}
}
