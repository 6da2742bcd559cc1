//! Rows shared by the results and bookmarks lists.

use crate::{markup::Html, state::Previews, state::RecipeSummary};
use lignin::{Node, ReorderableFragment, ThreadBound};

/// All rows of `previews`, keyed by recipe id.
pub fn rows<'a>(html: &Html<'a>, previews: &Previews) -> Node<'a, ThreadBound> {
	html.keyed(previews.rows.iter().map(|summary| row(html, summary, previews.selected.as_deref())))
}

pub fn row<'a>(html: &Html<'a>, summary: &RecipeSummary, selected: Option<&str>) -> ReorderableFragment<'a, ThreadBound> {
	let link_class = if selected == Some(summary.id.as_str()) { "preview__link preview__link--active" } else { "preview__link" };
	let user_generated = if summary.key.is_some() { "preview__user-generated" } else { "preview__user-generated hidden" };
	let title = html.str(&summary.title);

	html.row(
		&summary.id,
		"li",
		&[("class", "preview")],
		&[html.element(
			"a",
			&[("class", link_class), ("href", html.fmt(format_args!("#{}", summary.id)))],
			&[
				html.element("figure", &[("class", "preview__fig")], &[html.element("img", &[("src", html.str(&summary.image_url)), ("alt", title)], &[])]),
				html.element(
					"div",
					&[("class", "preview__data")],
					&[
						html.element("h4", &[("class", "preview__title")], &[html.text(title)]),
						html.element("p", &[("class", "preview__publisher")], &[html.text(&summary.publisher)]),
						html.element("div", &[("class", user_generated)], &[html.icon(None, "user")]),
					],
				),
			],
		)],
	)
}
