//! Building and serializing markup fragments.
//!
//! Views don't produce strings but small [`lignin`] trees allocated in a per-render [`Bump`].
//! [`Html`] keeps that terse; [`to_html`] turns any fragment back into text, which is what
//! [`View::render_to_string`](`crate::view::View::render_to_string`) returns.

use bumpalo::Bump;
use core::{
	fmt::{self, Write as _},
	hash::{Hash, Hasher},
};
use lignin::{Attribute, Element, ElementCreationOptions, Node, ReorderableFragment, ThreadBound};
use std::collections::hash_map::DefaultHasher;

/// Attribute used to pair rows of [`Node::Keyed`] groups while diffing.
pub const KEY_ATTRIBUTE: &str = "data-key";

/// Bump-backed builder for [`lignin::Node`] trees.
#[derive(Clone, Copy)]
pub struct Html<'a> {
	bump: &'a Bump,
	icons: &'a str,
}
impl<'a> Html<'a> {
	/// `icons` is the URL of the SVG sprite sheet referenced by [`Html::icon`].
	#[must_use]
	pub fn new(bump: &'a Bump, icons: &str) -> Self {
		Self { bump, icons: bump.alloc_str(icons) }
	}

	#[must_use]
	pub fn bump(&self) -> &'a Bump {
		self.bump
	}

	/// Copies `value` into the fragment's arena.
	#[must_use]
	pub fn str(&self, value: &str) -> &'a str {
		self.bump.alloc_str(value)
	}

	#[must_use]
	pub fn fmt(&self, args: fmt::Arguments<'_>) -> &'a str {
		let mut buffer = bumpalo::collections::String::new_in(self.bump);
		// Writing into a bump string only fails on allocation failure, which aborts anyway.
		let _ = buffer.write_fmt(args);
		buffer.into_bump_str()
	}

	#[must_use]
	pub fn element(&self, name: &'a str, attributes: &[(&'a str, &'a str)], content: &[Node<'a, ThreadBound>]) -> Node<'a, ThreadBound> {
		Node::HtmlElement {
			element: self.alloc_element(name, attributes, content),
			dom_binding: None,
		}
	}

	#[must_use]
	pub fn svg(&self, name: &'a str, attributes: &[(&'a str, &'a str)], content: &[Node<'a, ThreadBound>]) -> Node<'a, ThreadBound> {
		Node::SvgElement {
			element: self.alloc_element(name, attributes, content),
			dom_binding: None,
		}
	}

	/// `<svg class="…"><use href="{icons}#icon-{name}"></use></svg>`
	#[must_use]
	pub fn icon(&self, class: Option<&'a str>, name: &str) -> Node<'a, ThreadBound> {
		let href = self.fmt(format_args!("{}#icon-{}", self.icons, name));
		let r#use = self.svg("use", &[("href", href)], &[]);
		match class {
			Some(class) => self.svg("svg", &[("class", class)], &[r#use]),
			None => self.svg("svg", &[], &[r#use]),
		}
	}

	#[must_use]
	pub fn text(&self, text: &str) -> Node<'a, ThreadBound> {
		Node::Text {
			text: self.str(text),
			dom_binding: None,
		}
	}

	#[must_use]
	pub fn multi(&self, nodes: &[Node<'a, ThreadBound>]) -> Node<'a, ThreadBound> {
		Node::Multi(self.bump.alloc_slice_copy(nodes))
	}

	/// A group of rows that are diffed by key instead of by position.
	#[must_use]
	pub fn keyed(&self, rows: impl IntoIterator<Item = ReorderableFragment<'a, ThreadBound>>) -> Node<'a, ThreadBound> {
		Node::Keyed(bumpalo::collections::Vec::from_iter_in(rows, self.bump).into_bump_slice())
	}

	/// A row of a [`Html::keyed`] group: an HTML element that carries `key` as its [`KEY_ATTRIBUTE`].
	#[must_use]
	pub fn row(&self, key: &str, name: &'a str, attributes: &[(&'a str, &'a str)], content: &[Node<'a, ThreadBound>]) -> ReorderableFragment<'a, ThreadBound> {
		let key_attribute = (KEY_ATTRIBUTE, self.str(key));
		let attributes = bumpalo::collections::Vec::from_iter_in(attributes.iter().copied().chain(Some(key_attribute)), self.bump);
		ReorderableFragment {
			dom_key: dom_key(key) as _,
			content: Node::HtmlElement {
				element: self.alloc_element(name, &attributes, content),
				dom_binding: None,
			},
		}
	}

	fn alloc_element(&self, name: &'a str, attributes: &[(&'a str, &'a str)], content: &[Node<'a, ThreadBound>]) -> &'a Element<'a, ThreadBound> {
		let attributes = bumpalo::collections::Vec::from_iter_in(attributes.iter().map(|&(name, value)| Attribute { name, value }), self.bump);
		self.bump.alloc(Element {
			name,
			creation_options: ElementCreationOptions::new(),
			attributes: attributes.into_bump_slice(),
			content: self.multi(content),
			event_bindings: &[],
		})
	}
}

fn dom_key(key: &str) -> u64 {
	let mut hasher = DefaultHasher::new();
	key.hash(&mut hasher);
	hasher.finish()
}

const VOID_ELEMENTS: &[&str] = &["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr"];

/// Serializes a fragment as HTML.
#[must_use]
pub fn to_html(node: &Node<'_, ThreadBound>) -> String {
	let mut html = String::new();
	write_node(&mut html, node);
	html
}

fn write_node(html: &mut String, node: &Node<'_, ThreadBound>) {
	match *node {
		Node::Comment { comment, .. } => {
			html.push_str("<!--");
			html.push_str(comment);
			html.push_str("-->");
		}
		Node::HtmlElement { element, .. } => write_element(html, element, true),
		Node::SvgElement { element, .. } | Node::MathMlElement { element, .. } => write_element(html, element, false),
		Node::Memoized { content, .. } => write_node(html, content),
		Node::Multi(nodes) => {
			for node in nodes {
				write_node(html, node);
			}
		}
		Node::Keyed(fragments) => {
			for fragment in fragments {
				write_node(html, &fragment.content);
			}
		}
		Node::Text { text, .. } => escape(html, text, false),
		_ => html.push_str("<!--unsupported-->"),
	}
}

fn write_element(html: &mut String, element: &Element<'_, ThreadBound>, is_html: bool) {
	let name = if is_html { element.name.to_ascii_lowercase() } else { element.name.to_owned() };
	html.push('<');
	html.push_str(&name);
	for attribute in element.attributes {
		html.push(' ');
		html.push_str(attribute.name);
		html.push_str("=\"");
		escape(html, attribute.value, true);
		html.push('"');
	}
	html.push('>');
	if is_html && VOID_ELEMENTS.contains(&name.as_str()) {
		return;
	}
	write_node(html, &element.content);
	html.push_str("</");
	html.push_str(&name);
	html.push('>');
}

fn escape(html: &mut String, text: &str, attribute: bool) {
	for c in text.chars() {
		match c {
			'&' => html.push_str("&amp;"),
			'<' => html.push_str("&lt;"),
			'>' => html.push_str("&gt;"),
			'"' if attribute => html.push_str("&quot;"),
			c => html.push(c),
		}
	}
}
