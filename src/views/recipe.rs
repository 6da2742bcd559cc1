use crate::{
	dom::Document,
	event::Publisher,
	markup::Html,
	state::{Ingredient, RecipeDetail},
	view::{Component, View},
};
use core::ops::Deref;
use lignin::{Node, ThreadBound};
use std::rc::Rc;
use tracing::trace;

const MAX_DENOMINATOR: u32 = 16;
const TOLERANCE: f64 = 1e-3;

/// Formats `quantity` as a whole number or (mixed) fraction, like `1 1/2`.
///
/// Quantities that aren't close to a fraction with a small denominator are shown with two decimals.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_quantity(quantity: f64) -> String {
	if !quantity.is_finite() || quantity < 0.0 {
		return quantity.to_string();
	}

	let mut whole = quantity.trunc() as u64;
	let fraction = quantity.fract();
	let found = (1..=MAX_DENOMINATOR).find_map(|denominator| {
		let numerator = (fraction * f64::from(denominator)).round();
		((fraction - numerator / f64::from(denominator)).abs() < TOLERANCE).then(|| (numerator as u32, denominator))
	});
	let Some((mut numerator, denominator)) = found else {
		let decimal = format!("{:.2}", quantity);
		return decimal.trim_end_matches('0').trim_end_matches('.').to_owned();
	};
	if numerator == denominator {
		whole += 1;
		numerator = 0;
	}

	match (whole, numerator) {
		(whole, 0) => whole.to_string(),
		(0, numerator) => format!("{}/{}", numerator, denominator),
		(whole, numerator) => format!("{} {}/{}", whole, numerator, denominator),
	}
}

pub struct RecipePanel;
impl Component for RecipePanel {
	type Data = RecipeDetail;

	const NAME: &'static str = "recipe";
	const ERROR_MESSAGE: &'static str = "We could not find that recipe. Please try another one!";
	const MESSAGE: &'static str = "Start by searching for a recipe or an ingredient. Have fun!";

	fn is_empty(_: &RecipeDetail) -> bool {
		false
	}

	fn markup<'a>(&self, data: &RecipeDetail, html: &Html<'a>) -> Node<'a, ThreadBound> {
		let recipe = &data.recipe;
		let title = html.str(&recipe.title);
		let servings = recipe.servings;

		let figure = html.element(
			"figure",
			&[("class", "recipe__fig")],
			&[
				html.element("img", &[("src", html.str(&recipe.image_url)), ("alt", title), ("class", "recipe__img")], &[]),
				html.element("h1", &[("class", "recipe__title")], &[html.element("span", &[], &[html.text(title)])]),
			],
		);

		let info = |icon: &str, data_class: &'a str, value: u32, label: &str, extra: &[Node<'a, ThreadBound>]| {
			let mut content = vec![
				html.icon(Some("recipe__info-icon"), icon),
				html.element("span", &[("class", data_class)], &[html.text(html.fmt(format_args!("{}", value)))]),
				html.element("span", &[("class", "recipe__info-text")], &[html.text(label)]),
			];
			content.extend_from_slice(extra);
			html.element("div", &[("class", "recipe__info")], &content)
		};
		let servings_button = |to: u32, icon: &str| html.element("button", &[("class", "btn--tiny btn--update-servings"), ("data-update-to", html.fmt(format_args!("{}", to)))], &[html.icon(None, icon)]);

		let details = html.element(
			"div",
			&[("class", "recipe__details")],
			&[
				info("clock", "recipe__info-data recipe__info-data--minutes", recipe.cooking_time, "minutes", &[]),
				info(
					"users",
					"recipe__info-data recipe__info-data--people",
					servings,
					"servings",
					&[html.element(
						"div",
						&[("class", "recipe__info-buttons")],
						&[servings_button(servings.saturating_sub(1), "minus-circle"), servings_button(servings + 1, "plus-circle")],
					)],
				),
				html.element(
					"div",
					&[("class", if recipe.key.is_some() { "recipe__user-generated" } else { "recipe__user-generated hidden" })],
					&[html.icon(None, "user")],
				),
				html.element(
					"button",
					&[("class", "btn--round btn--bookmark")],
					&[html.icon(None, if data.bookmarked { "bookmark-fill" } else { "bookmark" })],
				),
			],
		);

		let ingredients = html.element(
			"div",
			&[("class", "recipe__ingredients")],
			&[
				html.element("h2", &[("class", "heading--2")], &[html.text("Recipe ingredients")]),
				html.element(
					"ul",
					&[("class", "recipe__ingredient-list")],
					&recipe.ingredients.iter().map(|ingredient| ingredient_row(html, ingredient)).collect::<Vec<_>>(),
				),
			],
		);

		let directions = html.element(
			"div",
			&[("class", "recipe__directions")],
			&[
				html.element("h2", &[("class", "heading--2")], &[html.text("How to cook it")]),
				html.element(
					"p",
					&[("class", "recipe__directions-text")],
					&[
						html.text("This recipe was carefully designed and tested by "),
						html.element("span", &[("class", "recipe__publisher")], &[html.text(&recipe.publisher)]),
						html.text(". Please check out directions at their website."),
					],
				),
				html.element(
					"a",
					&[("class", "btn--small recipe__btn"), ("href", html.str(&recipe.source_url)), ("target", "_blank")],
					&[html.element("span", &[], &[html.text("Directions")]), html.icon(Some("search__icon"), "arrow-right")],
				),
			],
		);

		html.multi(&[figure, details, ingredients, directions])
	}
}

fn ingredient_row<'a>(html: &Html<'a>, ingredient: &Ingredient) -> Node<'a, ThreadBound> {
	let quantity = ingredient.quantity.map(format_quantity).unwrap_or_default();
	html.element(
		"li",
		&[("class", "recipe__ingredient")],
		&[
			html.icon(Some("recipe__icon"), "check"),
			html.element("div", &[("class", "recipe__quantity")], &[html.text(&quantity)]),
			html.element(
				"div",
				&[("class", "recipe__description")],
				&[html.element("span", &[("class", "recipe__unit")], &[html.text(&ingredient.unit)]), html.text(&ingredient.description)],
			),
		],
	)
}

pub struct RecipeView<D: Document> {
	view: View<D, RecipePanel>,
	render_needed: Publisher<()>,
	servings_changed: Publisher<u32>,
	bookmark_toggled: Publisher<()>,
}

impl<D: Document> RecipeView<D> {
	pub fn new(document: Rc<D>, parent: D::Node, icons: Rc<str>) -> Self {
		Self {
			view: View::new(document, parent, RecipePanel, icons),
			render_needed: Publisher::new(),
			servings_changed: Publisher::new(),
			bookmark_toggled: Publisher::new(),
		}
	}

	pub fn add_handler_render(&self, handler: impl Fn() + 'static) {
		self.render_needed.subscribe(move |()| handler());
	}

	pub fn add_handler_update_servings(&self, handler: impl Fn(u32) + 'static) {
		self.servings_changed.subscribe(handler);
	}

	pub fn add_handler_add_bookmark(&self, handler: impl Fn() + 'static) {
		self.bookmark_toggled.subscribe(move |()| handler());
	}

	/// The page loaded or the location's recipe id changed.
	pub fn location_changed(&self) {
		self.render_needed.publish(());
	}

	/// Delegated click somewhere inside the attachment point.
	pub fn click(&self, target: &D::Node) {
		let document = self.document();
		if let Some(button) = document.closest_with_class(target, "btn--update-servings", self.parent()) {
			match document.attribute(&button, "data-update-to").and_then(|servings| servings.parse().ok()) {
				Some(servings) if servings > 0 => self.servings_changed.publish(servings),
				_ => trace!("Ignoring servings button without a positive target."),
			}
		} else if document.closest_with_class(target, "btn--bookmark", self.parent()).is_some() {
			self.bookmark_toggled.publish(());
		}
	}
}

impl<D: Document> Deref for RecipeView<D> {
	type Target = View<D, RecipePanel>;

	fn deref(&self) -> &Self::Target {
		&self.view
	}
}
