//! The host DOM surface the differ and views operate on.
//!
//! Only what this crate's render patterns need is exposed here: creating nodes, walking
//! [***childNodes***](https://developer.mozilla.org/en-US/docs/Web/API/Node/childNodes),
//! inserting and removing, and changing attributes and text.
//! [`memory::MemoryDocument`] implements it without a browser, `web::WebDocument` on top of `web_sys`.

use core::fmt::Debug;

pub mod memory;

/// Element namespace, matching [`lignin::Node`]'s element variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
	Html,
	Svg,
	MathMl,
}
impl Namespace {
	pub const SVG_URI: &'static str = "http://www.w3.org/2000/svg";
	pub const MATH_ML_URI: &'static str = "http://www.w3.org/1998/Math/MathML";

	#[must_use]
	pub fn from_uri(uri: Option<&str>) -> Self {
		match uri {
			Some(Self::SVG_URI) => Self::Svg,
			Some(Self::MATH_ML_URI) => Self::MathMl,
			_ => Self::Html,
		}
	}

	#[must_use]
	pub fn uri(self) -> Option<&'static str> {
		match self {
			Self::Html => None,
			Self::Svg => Some(Self::SVG_URI),
			Self::MathMl => Some(Self::MATH_ML_URI),
		}
	}
}

/// An owned copy of a live node's own data (not including its children).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
	Element {
		namespace: Namespace,
		/// The local name, lowercase for HTML elements.
		name: String,
		attributes: Vec<(String, String)>,
	},
	Text(String),
	Comment(String),
}

/// A document that owns live nodes.
///
/// Node handles are cheap to clone and compare by identity.
/// Methods take `&self` since the browser DOM is shared mutable state anyway.
pub trait Document {
	type Node: Clone + PartialEq + Debug;

	fn create_element(&self, namespace: Namespace, name: &str) -> Self::Node;
	fn create_text(&self, data: &str) -> Self::Node;
	fn create_comment(&self, data: &str) -> Self::Node;

	fn content(&self, node: &Self::Node) -> Content;
	fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;
	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;

	/// Inserts `child` before `reference`, or last if `reference` is [`None`].
	/// A `child` that is already attached elsewhere is moved.
	fn insert_before(&self, parent: &Self::Node, child: &Self::Node, reference: Option<&Self::Node>);
	fn remove_child(&self, parent: &Self::Node, child: &Self::Node);

	fn set_attribute(&self, element: &Self::Node, name: &str, value: &str);
	/// Replaces all children of `node` with a single text node (or none, if `text` is empty).
	fn set_text_content(&self, node: &Self::Node, text: &str);
	/// Sets the data of a text or comment node.
	fn set_data(&self, node: &Self::Node, data: &str);

	fn append_child(&self, parent: &Self::Node, child: &Self::Node) {
		self.insert_before(parent, child, None);
	}

	fn clear(&self, parent: &Self::Node) {
		for child in self.child_nodes(parent) {
			self.remove_child(parent, &child);
		}
	}

	fn attribute(&self, element: &Self::Node, name: &str) -> Option<String> {
		match self.content(element) {
			Content::Element { attributes, .. } => attributes.into_iter().find(|(n, _)| n == name).map(|(_, value)| value),
			Content::Text(_) | Content::Comment(_) => None,
		}
	}

	fn element_children(&self, node: &Self::Node) -> Vec<Self::Node> {
		self.child_nodes(node).into_iter().filter(|child| matches!(self.content(child), Content::Element { .. })).collect()
	}

	/// Concatenated data of all descendant text nodes, like [***textContent***](https://developer.mozilla.org/en-US/docs/Web/API/Node/textContent).
	fn text_content(&self, node: &Self::Node) -> String {
		match self.content(node) {
			Content::Text(text) => text,
			Content::Comment(_) => String::new(),
			Content::Element { .. } => self.child_nodes(node).iter().map(|child| self.text_content(child)).collect(),
		}
	}

	fn has_class(&self, element: &Self::Node, class: &str) -> bool {
		self.attribute(element, "class").map_or(false, |classes| classes.split_ascii_whitespace().any(|c| c == class))
	}

	/// Adds `class` if absent or removes it if present. Returns whether it is now present.
	fn toggle_class(&self, element: &Self::Node, class: &str) -> bool {
		let classes = self.attribute(element, "class").unwrap_or_default();
		let mut list: Vec<&str> = classes.split_ascii_whitespace().collect();
		let present = if let Some(index) = list.iter().position(|c| *c == class) {
			list.remove(index);
			false
		} else {
			list.push(class);
			true
		};
		self.set_attribute(element, "class", &list.join(" "));
		present
	}

	/// The nearest inclusive ancestor of `node` with `class`, not looking past `boundary`.
	fn closest_with_class(&self, node: &Self::Node, class: &str, boundary: &Self::Node) -> Option<Self::Node> {
		let mut current = Some(node.clone());
		while let Some(node) = current {
			if matches!(self.content(&node), Content::Element { .. }) && self.has_class(&node, class) {
				return Some(node);
			}
			if &node == boundary {
				return None;
			}
			current = self.parent_node(&node);
		}
		None
	}
}
