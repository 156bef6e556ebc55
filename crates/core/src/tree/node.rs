use std::any::Any;

use arbor_uri::Uri;
use indexmap::IndexMap;

use super::NodeId;
use super::component::{Component, NodeKind};
use crate::capability::Capability;
use crate::signal::Signal;

/// A named node owned by a [`Tree`](crate::Tree).
#[derive(Debug)]
pub struct Node {
	pub(crate) name: String,
	pub(crate) parent: Option<NodeId>,
	pub(crate) children: IndexMap<String, NodeId>,
	pub(crate) is_static: bool,
	pub(crate) component: Component,
}

impl Node {
	pub(crate) fn new(name: &str, parent: Option<NodeId>, component: Component) -> Self {
		Self {
			name: name.to_string(),
			parent,
			children: IndexMap::new(),
			is_static: false,
			component,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// The owning node; `None` for the root.
	pub fn parent(&self) -> Option<NodeId> {
		self.parent
	}

	/// Child handles in insertion order.
	pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator + '_ {
		self.children.values().copied()
	}

	pub fn child(&self, name: &str) -> Option<NodeId> {
		self.children.get(name).copied()
	}

	pub fn child_count(&self) -> usize {
		self.children.len()
	}

	/// Whether the owner protected this node against structural-edit signals.
	pub fn is_static(&self) -> bool {
		self.is_static
	}

	pub fn type_name(&self) -> &'static str {
		self.component.type_name
	}

	pub fn kind(&self) -> &NodeKind {
		&self.component.kind
	}

	pub fn is_link(&self) -> bool {
		matches!(self.component.kind, NodeKind::Link { .. })
	}

	/// The stored target path of a link node.
	pub fn link_target(&self) -> Option<&Uri> {
		match &self.component.kind {
			NodeKind::Link { target } => Some(target),
			NodeKind::Component => None,
		}
	}

	pub fn tags(&self) -> &[String] {
		&self.component.tags
	}

	pub fn has_tag(&self, tag: &str) -> bool {
		self.component.tags.iter().any(|t| t == tag)
	}

	pub fn satisfies<C: Capability>(&self) -> bool {
		self.component.satisfies::<C>()
	}

	pub fn satisfies_named(&self, name: &str) -> bool {
		self.component.satisfies_named(name)
	}

	pub fn capability_names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.component.capability_names()
	}

	pub fn cast<C: Capability>(&self) -> Option<&C::Object> {
		self.component.cast::<C>()
	}

	pub fn cast_mut<C: Capability>(&mut self) -> Option<&mut C::Object> {
		self.component.cast_mut::<C>()
	}

	pub fn payload<T: Any>(&self) -> Option<&T> {
		self.component.payload()
	}

	pub fn payload_mut<T: Any>(&mut self) -> Option<&mut T> {
		self.component.payload_mut()
	}

	pub fn signal(&self, name: &str) -> Option<&Signal> {
		self.component.signals.get(name)
	}

	pub fn signal_mut(&mut self, name: &str) -> Option<&mut Signal> {
		self.component.signals.get_mut(name)
	}

	/// Signals in registration order.
	pub fn signals(&self) -> impl Iterator<Item = &Signal> + '_ {
		self.component.signals.values()
	}
}
