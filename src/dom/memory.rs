//! An arena-backed [`Document`] for running views without a browser.
//!
//! Nodes are never freed, so [`NodeId`]s stay valid (and unique) for the lifetime of the
//! document, which makes node identity across updates directly observable.
//! Focus is tracked the way a browser does it insofar as removing the focused element
//! (or one of its ancestors) from its parent blurs it.

use super::{Content, Document, Namespace};
use core::cell::{Cell, RefCell};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Slot {
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	content: Content,
}

#[derive(Debug, Default)]
pub struct MemoryDocument {
	slots: RefCell<Vec<Slot>>,
	focused: Cell<Option<NodeId>>,
}

impl MemoryDocument {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a detached `<div>` to be used as attachment point.
	pub fn create_root(&self, class: &str) -> NodeId {
		let root = self.create_element(Namespace::Html, "div");
		self.set_attribute(&root, "class", class);
		root
	}

	/// How many nodes were ever created in this document.
	#[must_use]
	pub fn created_count(&self) -> usize {
		self.slots.borrow().len()
	}

	pub fn focus(&self, node: NodeId) {
		self.focused.set(Some(node));
	}

	#[must_use]
	pub fn focused(&self) -> Option<NodeId> {
		self.focused.get()
	}

	/// Whether `node` is `ancestor` or one of its descendants.
	#[must_use]
	pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
		let slots = self.slots.borrow();
		let mut current = Some(node);
		while let Some(id) = current {
			if id == ancestor {
				return true;
			}
			current = slots[id.0].parent;
		}
		false
	}

	/// All descendant elements of `root` with `class`, in document order.
	#[must_use]
	pub fn find_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
		let mut found = Vec::new();
		self.walk(root, &mut |node| {
			if self.has_class(&node, class) {
				found.push(node);
			}
		});
		found
	}

	/// All descendant elements of `root` with the local name `name`, in document order.
	#[must_use]
	pub fn find_by_name(&self, root: NodeId, name: &str) -> Vec<NodeId> {
		let mut found = Vec::new();
		self.walk(root, &mut |node| {
			if matches!(&self.content(&node), Content::Element { name: n, .. } if n == name) {
				found.push(node);
			}
		});
		found
	}

	fn walk(&self, root: NodeId, f: &mut dyn FnMut(NodeId)) {
		for child in self.element_children(&root) {
			f(child);
			self.walk(child, f);
		}
	}

	fn push(&self, content: Content) -> NodeId {
		let mut slots = self.slots.borrow_mut();
		slots.push(Slot { parent: None, children: Vec::new(), content });
		NodeId(slots.len() - 1)
	}

	fn detach(&self, child: NodeId) {
		if let Some(focused) = self.focused.get() {
			if self.contains(child, focused) {
				trace!(?focused, "Blurring removed node.");
				self.focused.set(None);
			}
		}

		let mut slots = self.slots.borrow_mut();
		if let Some(parent) = slots[child.0].parent.take() {
			slots[parent.0].children.retain(|c| *c != child);
		}
	}
}

impl Document for MemoryDocument {
	type Node = NodeId;

	fn create_element(&self, namespace: Namespace, name: &str) -> NodeId {
		self.push(Content::Element {
			namespace,
			name: if namespace == Namespace::Html { name.to_ascii_lowercase() } else { name.to_owned() },
			attributes: Vec::new(),
		})
	}

	fn create_text(&self, data: &str) -> NodeId {
		self.push(Content::Text(data.to_owned()))
	}

	fn create_comment(&self, data: &str) -> NodeId {
		self.push(Content::Comment(data.to_owned()))
	}

	fn content(&self, node: &NodeId) -> Content {
		self.slots.borrow()[node.0].content.clone()
	}

	fn child_nodes(&self, node: &NodeId) -> Vec<NodeId> {
		self.slots.borrow()[node.0].children.clone()
	}

	fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
		self.slots.borrow()[node.0].parent
	}

	fn insert_before(&self, parent: &NodeId, child: &NodeId, reference: Option<&NodeId>) {
		assert!(!self.contains(*child, *parent), "Tried to insert {:?} into its own descendant {:?}", child, parent);
		self.detach(*child);

		let mut slots = self.slots.borrow_mut();
		let children = &mut slots[parent.0].children;
		let index = match reference {
			None => children.len(),
			Some(reference) => children
				.iter()
				.position(|c| c == reference)
				.unwrap_or_else(|| panic!("Reference node {:?} is not a child of {:?}", reference, parent)),
		};
		children.insert(index, *child);
		slots[child.0].parent = Some(*parent);
	}

	fn remove_child(&self, parent: &NodeId, child: &NodeId) {
		assert_eq!(self.parent_node(child), Some(*parent), "{:?} is not a child of {:?}", child, parent);
		self.detach(*child);
	}

	fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
		let mut slots = self.slots.borrow_mut();
		match &mut slots[element.0].content {
			Content::Element { attributes, .. } => match attributes.iter_mut().find(|(n, _)| n == name) {
				Some((_, existing)) => value.clone_into(existing),
				None => attributes.push((name.to_owned(), value.to_owned())),
			},
			other => panic!("Tried to set attribute {:?} on non-element {:?}", name, other),
		}
	}

	fn set_text_content(&self, node: &NodeId, text: &str) {
		self.clear(node);
		if !text.is_empty() {
			let text = self.create_text(text);
			self.append_child(node, &text);
		}
	}

	fn set_data(&self, node: &NodeId, data: &str) {
		let mut slots = self.slots.borrow_mut();
		match &mut slots[node.0].content {
			Content::Text(existing) | Content::Comment(existing) => data.clone_into(existing),
			other => panic!("Tried to set data on {:?}", other),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn removing_an_ancestor_blurs() {
		let document = MemoryDocument::new();
		let root = document.create_root("root");
		let form = document.create_element(Namespace::Html, "FORM");
		let input = document.create_element(Namespace::Html, "input");
		document.append_child(&root, &form);
		document.append_child(&form, &input);

		document.focus(input);
		document.set_attribute(&input, "value", "x");
		assert_eq!(document.focused(), Some(input));

		document.remove_child(&root, &form);
		assert_eq!(document.focused(), None);
		assert_eq!(document.content(&form), Content::Element { namespace: Namespace::Html, name: "form".to_owned(), attributes: vec![] });
	}

	#[test]
	fn set_text_content_replaces_children() {
		let document = MemoryDocument::new();
		let root = document.create_root("root");
		let span = document.create_element(Namespace::Html, "span");
		document.append_child(&root, &span);
		document.append_child(&root, &document.create_text("after"));

		document.set_text_content(&root, "only text");
		assert_eq!(document.child_nodes(&root).len(), 1);
		assert_eq!(document.text_content(&root), "only text");
		assert_eq!(document.parent_node(&span), None);
	}

	#[test]
	fn toggle_class_round_trips() {
		let document = MemoryDocument::new();
		let root = document.create_root("overlay hidden");
		assert!(!document.toggle_class(&root, "hidden"));
		assert_eq!(document.attribute(&root, "class").as_deref(), Some("overlay"));
		assert!(document.toggle_class(&root, "hidden"));
		assert!(document.has_class(&root, "hidden"));
	}
}
