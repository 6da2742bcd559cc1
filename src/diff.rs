//! In-place reconciliation of a rendered subtree with a freshly generated fragment.
//!
//! This is not a general VDOM differ: element children are paired by position, and
//! only rows inside a [`Node::Keyed`] group may appear, disappear or move. Everything else has to
//! keep its shape between renders, which is true for markup that only varies in text and
//! attribute values.

use crate::{
	dom::{Content, Document, Namespace},
	markup::KEY_ATTRIBUTE,
};
use core::{fmt::Write as _, slice};
use hashbrown::{HashMap, HashSet};
use lignin::{Element, Node, ReorderableFragment, ThreadBound};
use thiserror::Error;
use tracing::{debug, error, instrument, trace, trace_span, warn};

/// A violated precondition of [`DomDiffer::update_child_nodes`].
///
/// All of these mean that the markup generator changed the fragment's shape in a way that
/// can't be patched. None of them leave the DOM partially updated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
	#[error("expected {expected} {kind}(s) at {path} but found {found}")]
	ShapeMismatch { path: String, kind: &'static str, expected: usize, found: usize },
	#[error("expected <{expected}> at {path} but found {found}")]
	TagMismatch { path: String, expected: String, found: String },
	#[error("keyed row at {path} has no `data-key` attribute")]
	MissingKey { path: String },
	#[error("duplicate key {key:?} at {path}")]
	DuplicateKey { path: String, key: String },
	#[error("unsupported {kind} at {path}")]
	Unsupported { path: String, kind: &'static str },
}

/// What [`DomDiffer::update_child_nodes`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
	/// Text content replacements and text node data changes.
	pub texts: usize,
	pub attributes: usize,
	/// Nodes created for keyed rows that weren't rendered before.
	pub created: usize,
	pub removed: usize,
	pub moved: usize,
}
impl PatchSummary {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}

/// Attached to a specific element during instantiation, this `struct` can be used to replace or patch its [***childNodes***](https://developer.mozilla.org/en-US/docs/Web/API/Node/childNodes).
///
/// Note that this does not include the element it is attached to itself, and also does not include
/// the [***Attr***](https://developer.mozilla.org/en-US/docs/Web/API/Attr)ibutes of that element.
pub struct DomDiffer<'d, D: Document + ?Sized> {
	document: &'d D,
	element: D::Node,
}
impl<'d, D: Document + ?Sized> DomDiffer<'d, D> {
	#[must_use]
	pub fn new_for_element_child_nodes(document: &'d D, element: D::Node) -> Self {
		Self { document, element }
	}

	/// Removes all current child nodes and creates `vdom` in their place.
	///
	/// Returns the number of created DOM nodes.
	#[instrument(skip(self, vdom), fields(element = ?self.element))]
	pub fn replace_child_nodes(&self, vdom: &[Node<'_, ThreadBound>]) -> usize {
		self.document.clear(&self.element);
		let created = vdom.iter().map(|node| create_node(self.document, &self.element, node, None)).sum();
		trace!("Created {} node(s).", created);
		created
	}

	/// Patches the current child nodes in place so that they match `vdom`.
	///
	/// Element pairs that are already structurally equal are skipped entirely. For the others,
	/// leaf text is replaced, direct text nodes of mixed content are updated, attributes of the
	/// new element are (over)written and children are patched recursively.
	///
	/// Attributes that only exist on the rendered element are **not** removed.
	///
	/// # Errors
	///
	/// If the rendered element tree doesn't have the shape of `vdom`, outside of keyed rows.
	/// In that case, the DOM is not modified at all.
	#[instrument(skip(self, vdom), fields(element = ?self.element))]
	pub fn update_child_nodes(&self, vdom: &[Node<'_, ThreadBound>]) -> Result<PatchSummary, ReconcileError> {
		let mut items = Vec::new();
		flatten(vdom, &mut items, false);

		let mut planner = Planner {
			document: self.document,
			ops: Vec::new(),
			path: Vec::new(),
		};
		planner.diff_content(&self.element, &items)?;

		let summary = self.apply(planner.ops);
		debug!(?summary, "Patched in place.");
		Ok(summary)
	}

	fn apply(&self, ops: Vec<Op<'_, D::Node>>) -> PatchSummary {
		let mut summary = PatchSummary::default();
		for op in ops {
			match op {
				Op::SetTextContent { node, text } => {
					self.document.set_text_content(&node, &text);
					summary.texts += 1;
				}
				Op::SetData { node, data } => {
					self.document.set_data(&node, data);
					summary.texts += 1;
				}
				Op::SetAttribute { element, name, value } => {
					self.document.set_attribute(&element, name, value);
					summary.attributes += 1;
				}
				Op::Remove { parent, node } => {
					self.document.remove_child(&parent, &node);
					summary.removed += 1;
				}
				Op::Insert {
					parent,
					node: Insertion::Existing(node),
					before,
				} => {
					self.document.insert_before(&parent, &node, before.as_ref());
					summary.moved += 1;
				}
				Op::Insert {
					parent,
					node: Insertion::Create(vdom),
					before,
				} => summary.created += create_node(self.document, &parent, &vdom, before.as_ref()),
			}
		}
		summary
	}
}

/// Creates `node` and inserts it into `parent` before `before` (or last).
///
/// Returns the number of created DOM nodes.
pub fn create_node<D: Document + ?Sized>(document: &D, parent: &D::Node, node: &Node<'_, ThreadBound>, before: Option<&D::Node>) -> usize {
	match *node {
		Node::HtmlElement { element, .. } => create_element(document, parent, element, Namespace::Html, before),
		Node::SvgElement { element, .. } => create_element(document, parent, element, Namespace::Svg, before),
		Node::MathMlElement { element, .. } => create_element(document, parent, element, Namespace::MathMl, before),
		Node::Text { text, .. } => {
			let text = document.create_text(text);
			document.insert_before(parent, &text, before);
			1
		}
		Node::Comment { comment, .. } => {
			let comment = document.create_comment(comment);
			document.insert_before(parent, &comment, before);
			1
		}
		Node::Multi(nodes) => nodes.iter().map(|node| create_node(document, parent, node, before)).sum(),
		Node::Keyed(fragments) => fragments.iter().map(|fragment| create_node(document, parent, &fragment.content, before)).sum(),
		Node::Memoized { content, .. } => create_node(document, parent, content, before),
		_ => {
			error!("Unsupported node kind in fragment. Skipping it.");
			0
		}
	}
}

fn create_element<D: Document + ?Sized>(document: &D, parent: &D::Node, element: &Element<'_, ThreadBound>, namespace: Namespace, before: Option<&D::Node>) -> usize {
	let span = trace_span!("Creating element", tag = element.name, ?namespace);
	let _enter = span.enter();

	let node = document.create_element(namespace, element.name);
	for attribute in element.attributes {
		document.set_attribute(&node, attribute.name, attribute.value);
	}
	let created = 1 + create_node(document, &node, &element.content, None);
	document.insert_before(parent, &node, before);
	created
}

#[derive(Clone, Copy)]
enum Item<'a> {
	Element(&'a Element<'a, ThreadBound>, Namespace),
	Text(&'a str),
	Comment,
	Keyed(&'a [ReorderableFragment<'a, ThreadBound>]),
	Unsupported,
}
impl Item<'_> {
	fn is_structural(&self) -> bool {
		matches!(self, Item::Element(..) | Item::Keyed(_))
	}
}

/// Flattens `Multi` and `Memoized` into one level of items.
/// With `expand_keyed`, keyed rows are inlined too.
fn flatten<'a>(nodes: &[Node<'a, ThreadBound>], items: &mut Vec<Item<'a>>, expand_keyed: bool) {
	for node in nodes {
		match *node {
			Node::HtmlElement { element, .. } => items.push(Item::Element(element, Namespace::Html)),
			Node::SvgElement { element, .. } => items.push(Item::Element(element, Namespace::Svg)),
			Node::MathMlElement { element, .. } => items.push(Item::Element(element, Namespace::MathMl)),
			Node::Text { text, .. } => items.push(Item::Text(text)),
			Node::Comment { .. } => items.push(Item::Comment),
			Node::Multi(nodes) => flatten(nodes, items, expand_keyed),
			Node::Memoized { content, .. } => flatten(slice::from_ref(content), items, expand_keyed),
			Node::Keyed(fragments) if expand_keyed => {
				for fragment in fragments {
					flatten(slice::from_ref(&fragment.content), items, expand_keyed);
				}
			}
			Node::Keyed(fragments) => items.push(Item::Keyed(fragments)),
			_ => items.push(Item::Unsupported),
		}
	}
}

fn element_of<'a>(node: &Node<'a, ThreadBound>) -> Option<(&'a Element<'a, ThreadBound>, Namespace)> {
	match *node {
		Node::HtmlElement { element, .. } => Some((element, Namespace::Html)),
		Node::SvgElement { element, .. } => Some((element, Namespace::Svg)),
		Node::MathMlElement { element, .. } => Some((element, Namespace::MathMl)),
		_ => None,
	}
}

fn key_of<'a>(element: &Element<'a, ThreadBound>) -> Option<&'a str> {
	element.attributes.iter().find(|attribute| attribute.name == KEY_ATTRIBUTE).map(|attribute| attribute.value)
}

enum Op<'a, N> {
	SetTextContent { node: N, text: String },
	SetData { node: N, data: &'a str },
	SetAttribute { element: N, name: &'a str, value: &'a str },
	Remove { parent: N, node: N },
	Insert { parent: N, node: Insertion<'a, N>, before: Option<N> },
}

enum Insertion<'a, N> {
	Existing(N),
	Create(Node<'a, ThreadBound>),
}

/// Collects all DOM operations first, so that nothing is applied if the shapes don't match.
struct Planner<'d, 'a, D: Document + ?Sized> {
	document: &'d D,
	ops: Vec<Op<'a, D::Node>>,
	path: Vec<(&'a str, usize)>,
}
impl<'d, 'a, D: Document + ?Sized> Planner<'d, 'a, D> {
	fn path(&self) -> String {
		if self.path.is_empty() {
			return "/".to_owned();
		}
		let mut path = String::new();
		for (name, index) in &self.path {
			let _ = write!(path, "/{}[{}]", name, index);
		}
		path
	}

	fn shape_mismatch(&self, kind: &'static str, expected: usize, found: usize) -> ReconcileError {
		ReconcileError::ShapeMismatch {
			path: self.path(),
			kind,
			expected,
			found,
		}
	}

	/// Patches text and element children of `live` to match `items`.
	fn diff_content(&mut self, live: &D::Node, items: &[Item<'a>]) -> Result<(), ReconcileError> {
		if items.iter().any(Item::is_structural) {
			self.diff_text_children(live, items)?;
			self.diff_children(live, items)
		} else {
			self.diff_children(live, items)?;
			let text: String = items.iter().filter_map(|item| if let Item::Text(text) = *item { Some(text) } else { None }).collect();
			if self.document.text_content(live) != text {
				trace!("Replacing leaf text.");
				self.ops.push(Op::SetTextContent { node: live.clone(), text });
			}
			Ok(())
		}
	}

	/// Mixed content: Direct text nodes are paired by position and updated in place.
	fn diff_text_children(&mut self, live: &D::Node, items: &[Item<'a>]) -> Result<(), ReconcileError> {
		let new_texts: Vec<&'a str> = items.iter().filter_map(|item| if let Item::Text(text) = *item { Some(text) } else { None }).collect();
		let live_texts: Vec<(D::Node, String)> = self
			.document
			.child_nodes(live)
			.into_iter()
			.filter_map(|child| match self.document.content(&child) {
				Content::Text(text) => Some((child, text)),
				Content::Element { .. } | Content::Comment(_) => None,
			})
			.collect();

		if new_texts.len() != live_texts.len() {
			return Err(self.shape_mismatch("text node", new_texts.len(), live_texts.len()));
		}

		for (new, (node, old)) in new_texts.into_iter().zip(live_texts) {
			if new != old {
				self.ops.push(Op::SetData { node, data: new });
			}
		}
		Ok(())
	}

	/// Pairs element children: by position, or by key inside keyed groups.
	fn diff_children(&mut self, live: &D::Node, items: &[Item<'a>]) -> Result<(), ReconcileError> {
		let live_children = self.document.element_children(live);
		let expected = || {
			items
				.iter()
				.map(|item| match item {
					Item::Element(..) => 1,
					Item::Keyed(fragments) => fragments.len(),
					Item::Text(_) | Item::Comment | Item::Unsupported => 0,
				})
				.sum::<usize>()
		};

		let mut cursor = 0;
		for item in items {
			match *item {
				Item::Element(element, namespace) => {
					let node = match live_children.get(cursor) {
						Some(node) => node,
						None => return Err(self.shape_mismatch("element", expected(), live_children.len())),
					};
					self.path.push((element.name, cursor));
					self.diff_element(element, namespace, node)?;
					self.path.pop();
					cursor += 1;
				}
				Item::Keyed(fragments) => {
					let start = cursor;
					while cursor < live_children.len() && self.document.attribute(&live_children[cursor], KEY_ATTRIBUTE).is_some() {
						cursor += 1;
					}
					self.diff_keyed(live, fragments, &live_children[start..cursor], live_children.get(cursor).cloned())?;
				}
				Item::Text(_) | Item::Comment => (),
				Item::Unsupported => {
					return Err(ReconcileError::Unsupported {
						path: self.path(),
						kind: "node kind",
					})
				}
			}
		}

		if cursor == live_children.len() {
			Ok(())
		} else {
			Err(self.shape_mismatch("element", expected(), live_children.len()))
		}
	}

	fn diff_element(&mut self, element: &'a Element<'a, ThreadBound>, namespace: Namespace, live: &D::Node) -> Result<(), ReconcileError> {
		let span = trace_span!("Diffing element", tag = element.name);
		let _enter = span.enter();

		let attributes = match self.document.content(live) {
			Content::Element { namespace: n, name, attributes } if n == namespace && name.eq_ignore_ascii_case(element.name) => attributes,
			Content::Element { name, .. } => {
				return Err(ReconcileError::TagMismatch {
					path: self.path(),
					expected: element.name.to_owned(),
					found: format!("<{}>", name),
				})
			}
			other => {
				return Err(ReconcileError::TagMismatch {
					path: self.path(),
					expected: element.name.to_owned(),
					found: format!("{:?}", other),
				})
			}
		};

		if self.is_equal_element(element, namespace, live) {
			trace!("Equal. Skipping subtree.");
			return Ok(());
		}

		for attribute in element.attributes {
			let current = attributes.iter().find(|(name, _)| name == attribute.name).map(|(_, value)| value.as_str());
			if current != Some(attribute.value) {
				self.ops.push(Op::SetAttribute {
					element: live.clone(),
					name: attribute.name,
					value: attribute.value,
				});
			}
		}

		let mut items = Vec::new();
		flatten(slice::from_ref(&element.content), &mut items, false);
		self.diff_content(live, &items)
	}

	fn diff_keyed(&mut self, parent: &D::Node, fragments: &'a [ReorderableFragment<'a, ThreadBound>], live_rows: &[D::Node], before: Option<D::Node>) -> Result<(), ReconcileError> {
		let span = trace_span!("Diffing keyed", fragments = fragments.len(), live_rows = live_rows.len());
		let _enter = span.enter();

		debug_assert_eq!(fragments.len(), fragments.iter().map(|f| f.dom_key).collect::<HashSet<_>>().len(), "Duplicate `ReorderableFragment::dom_key` encountered");

		let mut live_by_key = HashMap::with_capacity(live_rows.len());
		for (position, row) in live_rows.iter().enumerate() {
			match self.document.attribute(row, KEY_ATTRIBUTE) {
				Some(key) => {
					if live_by_key.insert(key, position).is_some() {
						warn!(position, "Duplicate key among rendered rows. Only the last one will be reused.");
					}
				}
				None => return Err(ReconcileError::MissingKey { path: self.path() }),
			}
		}

		let mut used = vec![false; live_rows.len()];
		let mut order = Vec::with_capacity(fragments.len());
		let mut matched = Vec::new();
		let mut new_keys = HashSet::with_capacity(fragments.len());
		for (index, fragment) in fragments.iter().enumerate() {
			let (element, namespace) = match element_of(&fragment.content) {
				Some(element) => element,
				None => {
					return Err(ReconcileError::Unsupported {
						path: self.path(),
						kind: "keyed row that isn't an element",
					})
				}
			};
			let key = match key_of(element) {
				Some(key) => key,
				None => return Err(ReconcileError::MissingKey { path: self.path() }),
			};
			if !new_keys.insert(key) {
				return Err(ReconcileError::DuplicateKey {
					path: self.path(),
					key: key.to_owned(),
				});
			}

			match live_by_key.get(key).copied() {
				Some(position) if !used[position] => {
					used[position] = true;
					self.path.push((element.name, index));
					self.diff_element(element, namespace, &live_rows[position])?;
					self.path.pop();
					matched.push(position);
					order.push(Insertion::Existing(live_rows[position].clone()));
				}
				_ => order.push(Insertion::Create(fragment.content)),
			}
		}

		for (row, _) in live_rows.iter().zip(&used).filter(|(_, used)| !**used) {
			self.ops.push(Op::Remove {
				parent: parent.clone(),
				node: row.clone(),
			});
		}

		if matched.windows(2).all(|pair| pair[0] < pair[1]) {
			// Surviving rows are in order already, so only new ones are inserted, each before the next survivor.
			let mut next = before;
			let mut inserts = Vec::new();
			for insertion in order.into_iter().rev() {
				match insertion {
					Insertion::Existing(node) => next = Some(node),
					Insertion::Create(_) => inserts.push(Op::Insert {
						parent: parent.clone(),
						node: insertion,
						before: next.clone(),
					}),
				}
			}
			self.ops.extend(inserts.into_iter().rev());
		} else {
			trace!("Rows were reordered. Reinserting all of them.");
			for insertion in order {
				self.ops.push(Op::Insert {
					parent: parent.clone(),
					node: insertion,
					before: before.clone(),
				});
			}
		}
		Ok(())
	}

	/// Deep structural equality, like [***isEqualNode***](https://developer.mozilla.org/en-US/docs/Web/API/Node/isEqualNode).
	/// Comments and empty text nodes are ignored.
	fn is_equal_element(&self, element: &Element<'_, ThreadBound>, namespace: Namespace, live: &D::Node) -> bool {
		match self.document.content(live) {
			Content::Element { namespace: n, name, attributes } if n == namespace && name.eq_ignore_ascii_case(element.name) => {
				attributes.len() == element.attributes.len()
					&& element.attributes.iter().all(|a| attributes.iter().any(|(name, value)| name == a.name && value == a.value))
					&& self.is_equal_content(&element.content, live)
			}
			_ => false,
		}
	}

	fn is_equal_content(&self, content: &Node<'_, ThreadBound>, live: &D::Node) -> bool {
		let mut items = Vec::new();
		flatten(slice::from_ref(content), &mut items, true);
		let items: Vec<_> = items.into_iter().filter(|item| !matches!(item, Item::Comment | Item::Text(""))).collect();

		let live_children: Vec<_> = self
			.document
			.child_nodes(live)
			.into_iter()
			.filter(|child| match self.document.content(child) {
				Content::Text(text) => !text.is_empty(),
				Content::Comment(_) => false,
				Content::Element { .. } => true,
			})
			.collect();

		items.len() == live_children.len()
			&& items.iter().zip(&live_children).all(|(item, child)| match *item {
				Item::Element(element, namespace) => self.is_equal_element(element, namespace, child),
				Item::Text(text) => self.document.content(child) == Content::Text(text.to_owned()),
				Item::Comment | Item::Keyed(_) | Item::Unsupported => false,
			})
	}
}
