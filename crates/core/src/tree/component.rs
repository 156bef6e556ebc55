use std::any::Any;

use arbor_uri::Uri;
use indexmap::IndexMap;

use crate::capability::{Capability, CapabilityEntry, Implements};
use crate::signal::Signal;

/// What a node is, structurally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	/// A regular node that may own children.
	Component,
	/// A non-owning redirection to another node's path.
	Link { target: Uri },
}

/// A node that is not (yet) part of any tree.
///
/// Builders produce components; [`Tree::create_child`](crate::Tree::create_child)
/// turns one into a named, owned node.
pub struct Component {
	pub(crate) type_name: &'static str,
	pub(crate) kind: NodeKind,
	pub(crate) payload: Option<Box<dyn Any>>,
	pub(crate) capabilities: Vec<CapabilityEntry>,
	pub(crate) tags: Vec<String>,
	pub(crate) signals: IndexMap<String, Signal>,
}

impl Component {
	/// Type name given to nodes created without a payload.
	pub const PLAIN_TYPE: &'static str = "arbor.Component";
	/// Type name of link nodes.
	pub const LINK_TYPE: &'static str = "arbor.Link";

	pub fn new(type_name: &'static str) -> Self {
		Self {
			type_name,
			kind: NodeKind::Component,
			payload: None,
			capabilities: Vec::new(),
			tags: Vec::new(),
			signals: IndexMap::new(),
		}
	}

	/// A link pointing at `target`.
	pub fn link(target: Uri) -> Self {
		Self {
			kind: NodeKind::Link { target },
			..Self::new(Self::LINK_TYPE)
		}
	}

	/// Attaches the payload. Capabilities declared earlier for another type stop resolving.
	pub fn with_payload<P: Any>(mut self, payload: P) -> Self {
		self.payload = Some(Box::new(payload));
		self
	}

	/// Declares that the payload, of type `P`, satisfies `C`.
	pub fn satisfying<C: Capability, P: Implements<C>>(mut self) -> Self {
		debug_assert!(
			self.payload.as_deref().is_none_or(|p| p.is::<P>()),
			"capability {} declared for a payload of another type",
			C::NAME
		);
		if !self.satisfies::<C>() {
			self.capabilities.push(CapabilityEntry::new::<C, P>());
		}
		self
	}

	pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
		let tag = tag.into();
		if !self.tags.contains(&tag) {
			self.tags.push(tag);
		}
		self
	}

	/// Adds a signal that travels with the component into its tree.
	pub fn with_signal(mut self, signal: Signal) -> Self {
		self.signals.insert(signal.name().to_string(), signal);
		self
	}

	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	pub fn kind(&self) -> &NodeKind {
		&self.kind
	}

	pub fn satisfies<C: Capability>(&self) -> bool {
		self.capabilities.iter().any(CapabilityEntry::is::<C>)
	}

	/// Returns `true` if a capability named `name` is satisfied.
	pub fn satisfies_named(&self, name: &str) -> bool {
		self.capabilities.iter().any(|c| c.name == name)
	}

	/// Names of every satisfied capability, in declaration order.
	pub fn capability_names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.capabilities.iter().map(|c| c.name)
	}

	/// Views the payload through capability `C`.
	pub fn cast<C: Capability>(&self) -> Option<&C::Object> {
		let entry = self.capabilities.iter().find(|c| c.is::<C>())?;
		entry.cast_ref::<C>(self.payload.as_deref()?)
	}

	/// Mutable view of the payload through capability `C`.
	pub fn cast_mut<C: Capability>(&mut self) -> Option<&mut C::Object> {
		let entry = self.capabilities.iter().find(|c| c.is::<C>())?;
		entry.cast_mut::<C>(self.payload.as_deref_mut()?)
	}

	/// Downcasts the payload to its concrete type.
	pub fn payload<T: Any>(&self) -> Option<&T> {
		self.payload.as_deref()?.downcast_ref()
	}

	pub fn payload_mut<T: Any>(&mut self) -> Option<&mut T> {
		self.payload.as_deref_mut()?.downcast_mut()
	}
}

impl std::fmt::Debug for Component {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Component")
			.field("type_name", &self.type_name)
			.field("kind", &self.kind)
			.field("capabilities", &self.capabilities)
			.field("tags", &self.tags)
			.field("signals", &self.signals.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}
