//! Reads live DOM subtrees back into [`lignin`] nodes.
//!
//! This is the "old" side of a diff made visible: [`View::html`](`crate::view::View::html`)
//! serializes what is actually rendered rather than what was last generated.

use crate::dom::{Content, Document, Namespace};
use bumpalo::Bump;
use lignin::{Attribute, Element as lElement, ElementCreationOptions, Node, ThreadBound};

pub fn load_child_nodes<'a, D: Document + ?Sized>(document: &D, parent: &D::Node, bump: &'a Bump) -> &'a [Node<'a, ThreadBound>] {
	let child_nodes = document.child_nodes(parent);
	bump.alloc_slice_fill_iter(child_nodes.iter().map(|child| load_node(document, child, bump)))
}

pub fn load_node<'a, D: Document + ?Sized>(document: &D, node: &D::Node, bump: &'a Bump) -> Node<'a, ThreadBound> {
	match document.content(node) {
		Content::Element { namespace, name, attributes } => {
			let element: &'a lElement<'a, ThreadBound> = bump.alloc_with(|| load_element(document, node, &name, &attributes, bump));
			match namespace {
				Namespace::Html => Node::HtmlElement { element, dom_binding: None },
				Namespace::Svg => Node::SvgElement { element, dom_binding: None },
				Namespace::MathMl => Node::MathMlElement { element, dom_binding: None },
			}
		}
		Content::Text(text) => Node::Text {
			text: bump.alloc_str(&text),
			dom_binding: None,
		},
		Content::Comment(comment) => Node::Comment {
			comment: bump.alloc_str(&comment),
			dom_binding: None,
		},
	}
}

fn load_element<'a, D: Document + ?Sized>(document: &D, element: &D::Node, name: &str, attributes: &[(String, String)], bump: &'a Bump) -> lElement<'a, ThreadBound> {
	lElement {
		name: bump.alloc_str(name),
		creation_options: ElementCreationOptions::new(),
		attributes: load_attributes(attributes, bump),
		content: Node::Multi(load_child_nodes(document, element, bump)),
		event_bindings: &[],
	}
}

pub fn load_attributes<'a>(attributes: &[(String, String)], bump: &'a Bump) -> &'a [Attribute<'a>] {
	bump.alloc_slice_fill_iter(attributes.iter().map(|(name, value)| Attribute {
		name: bump.alloc_str(name),
		value: bump.alloc_str(value),
	}))
}
