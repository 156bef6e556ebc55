//! Single-owner component tree.
//!
//! Nodes live in an arena and are addressed by [`NodeId`], a slot index plus a
//! generation counter. Removing a node bumps its slot's generation, so every
//! outstanding handle to it (or to any of its descendants) reports
//! [`ErrorKind::ValueNotFound`] instead of reaching whatever reuses the slot.
//!
//! Parents own their children. Parent back-references, links and directory
//! entries are non-owning: handles or paths that are validated on every use.

mod component;
mod node;
mod resolve;

use std::any::Any;
use std::fmt::Write as _;

use arbor_uri::Uri;
pub use component::{Component, NodeKind};
pub use node::Node;
use tracing::debug;

use crate::capability::Capability;
use crate::error::{Error, ErrorKind, Result};
use crate::policy::ErrorPolicy;
use crate::signal::builtin;

/// A generational handle to a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
	idx: u32,
	generation: u32,
}

impl NodeId {
	/// Returns the slot index.
	pub fn index(self) -> usize {
		self.idx as usize
	}
}

impl std::fmt::Display for NodeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "NodeId({}v{})", self.idx, self.generation)
	}
}

struct Slot {
	generation: u32,
	node: Option<Node>,
}

/// An arena-backed hierarchy of named nodes.
pub struct Tree {
	slots: Vec<Slot>,
	free: Vec<u32>,
	root: NodeId,
	policy: ErrorPolicy,
}

impl Tree {
	/// Creates a tree whose root is named `root_name`, using the default policy.
	pub fn new(root_name: &str) -> Result<Self> {
		Self::with_policy(root_name, ErrorPolicy::default())
	}

	pub fn with_policy(root_name: &str, policy: ErrorPolicy) -> Result<Self> {
		check_name(&policy, root_name)?;
		let mut component = Component::new(Component::PLAIN_TYPE);
		builtin::install(&mut component.signals);
		let root = NodeId {
			idx: 0,
			generation: 0,
		};
		Ok(Self {
			slots: vec![Slot {
				generation: 0,
				node: Some(Node::new(root_name, None, component)),
			}],
			free: Vec::new(),
			root,
			policy,
		})
	}

	pub fn root(&self) -> NodeId {
		self.root
	}

	pub fn policy(&self) -> &ErrorPolicy {
		&self.policy
	}

	pub fn set_policy(&mut self, policy: ErrorPolicy) {
		self.policy = policy;
	}

	/// Raises an error through this tree's policy.
	#[track_caller]
	pub fn raise(&self, kind: ErrorKind, message: impl Into<String>) -> Error {
		self.policy.raise(kind, message)
	}

	/// Returns `true` while `id` refers to a live node.
	pub fn contains(&self, id: NodeId) -> bool {
		self.get(id).is_some()
	}

	/// Number of live nodes, root included.
	pub fn len(&self) -> usize {
		self.slots.len() - self.free.len()
	}

	pub fn is_empty(&self) -> bool {
		false
	}

	pub fn get(&self, id: NodeId) -> Option<&Node> {
		let slot = self.slots.get(id.index())?;
		if slot.generation != id.generation {
			return None;
		}
		slot.node.as_ref()
	}

	pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		let slot = self.slots.get_mut(id.index())?;
		if slot.generation != id.generation {
			return None;
		}
		slot.node.as_mut()
	}

	/// Dereferences `id`, failing with `ValueNotFound` for removed nodes.
	#[track_caller]
	pub fn node(&self, id: NodeId) -> Result<&Node> {
		match self.get(id) {
			Some(node) => Ok(node),
			None => Err(self
				.policy
				.raise(ErrorKind::ValueNotFound, format!("{id} no longer exists"))),
		}
	}

	#[track_caller]
	pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
		let policy = self.policy;
		match self.get_mut(id) {
			Some(node) => Ok(node),
			None => Err(policy.raise(ErrorKind::ValueNotFound, format!("{id} no longer exists"))),
		}
	}

	#[track_caller]
	pub fn name(&self, id: NodeId) -> Result<&str> {
		Ok(self.node(id)?.name())
	}

	#[track_caller]
	pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
		Ok(self.node(id)?.parent)
	}

	/// Child handles in insertion order.
	#[track_caller]
	pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>> {
		Ok(self.node(id)?.children().collect())
	}

	/// Looks up the child `name` of `parent`.
	#[track_caller]
	pub fn child(&self, parent: NodeId, name: &str) -> Result<NodeId> {
		match self.node(parent)?.child(name) {
			Some(child) => Ok(child),
			None => Err(self.policy.raise(
				ErrorKind::ValueNotFound,
				format!("{} has no child {name:?}", self.display_path(parent)),
			)),
		}
	}

	/// The absolute path of `id`: ancestor names from the root, joined by `/`.
	pub fn path(&self, id: NodeId) -> Result<Uri> {
		let mut names = Vec::new();
		let mut current = Some(id);
		while let Some(c) = current {
			let node = self.node(c)?;
			names.push(node.name.as_str());
			current = node.parent;
		}
		names.reverse();
		Ok(Uri::root(&names.join("/")))
	}

	/// Path for diagnostics; never fails.
	pub(crate) fn display_path(&self, id: NodeId) -> String {
		match self.path(id) {
			Ok(uri) => uri.to_string(),
			Err(_) => format!("<removed {id}>"),
		}
	}

	/// Inserts `component` under `parent` as `name`.
	///
	/// Fails with `ValueExists` if a sibling already uses `name`.
	pub fn create_child(
		&mut self,
		parent: NodeId,
		name: &str,
		mut component: Component,
	) -> Result<NodeId> {
		check_name(&self.policy, name)?;
		if self.node(parent)?.children.contains_key(name) {
			return Err(self.policy.raise(
				ErrorKind::ValueExists,
				format!("{} already has a child {name:?}", self.display_path(parent)),
			));
		}
		builtin::install(&mut component.signals);
		let type_name = component.type_name;
		let id = self.alloc(Node::new(name, Some(parent), component));
		self.node_mut(parent)?.children.insert(name.to_string(), id);
		debug!(parent = %self.display_path(parent), name, type_name, "created node");
		Ok(id)
	}

	/// Inserts a plain node with no payload.
	pub fn create_component(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
		self.create_child(parent, name, Component::new(Component::PLAIN_TYPE))
	}

	/// Inserts a link named `name` under `parent` pointing at `target`.
	///
	/// Relative targets are resolved from the link's parent.
	pub fn create_link(&mut self, parent: NodeId, name: &str, target: &Uri) -> Result<NodeId> {
		self.create_child(parent, name, Component::link(target.clone()))
	}

	/// Repoints a link.
	pub fn set_link_target(&mut self, link: NodeId, target: &Uri) -> Result<()> {
		let policy = self.policy;
		let path = self.display_path(link);
		match &mut self.node_mut(link)?.component.kind {
			NodeKind::Link { target: current } => {
				*current = target.clone();
				Ok(())
			}
			NodeKind::Component => {
				Err(policy.raise(ErrorKind::BadValue, format!("{path} is not a link")))
			}
		}
	}

	/// The stored (unresolved) target of a link.
	#[track_caller]
	pub fn link_target(&self, link: NodeId) -> Result<&Uri> {
		match self.node(link)?.link_target() {
			Some(target) => Ok(target),
			None => Err(self
				.policy
				.raise(ErrorKind::BadValue, format!("{} is not a link", self.display_path(link)))),
		}
	}

	/// Removes the child `name` of `parent` and all of its descendants.
	///
	/// The static flag does not protect against this call.
	pub fn remove_child(&mut self, parent: NodeId, name: &str) -> Result<()> {
		let id = self.child(parent, name)?;
		let path = self.display_path(id);
		self.node_mut(parent)?.children.shift_remove(name);
		let removed = self.release(id);
		debug!(path = %path, removed, "removed node");
		Ok(())
	}

	/// Renames `id`, keeping its position among its siblings.
	pub fn rename(&mut self, id: NodeId, new_name: &str) -> Result<()> {
		check_name(&self.policy, new_name)?;
		let node = self.node(id)?;
		if node.name == new_name {
			return Ok(());
		}
		let old_name = node.name.clone();
		if let Some(parent) = node.parent {
			if self.node(parent)?.children.contains_key(new_name) {
				return Err(self.policy.raise(
					ErrorKind::ValueExists,
					format!("{} already has a child {new_name:?}", self.display_path(parent)),
				));
			}
			let siblings = &mut self.node_mut(parent)?.children;
			if let Some((index, _, child)) = siblings.shift_remove_full(&old_name) {
				siblings.shift_insert(index, new_name.to_string(), child);
			}
		}
		self.node_mut(id)?.name = new_name.to_string();
		debug!(from = %old_name, to = new_name, "renamed node");
		Ok(())
	}

	/// Moves `id` under `new_parent`, keeping its name.
	///
	/// The static flag belongs to the old owner and is cleared.
	pub fn move_to(&mut self, id: NodeId, new_parent: NodeId) -> Result<()> {
		let node = self.node(id)?;
		let name = node.name.clone();
		let Some(old_parent) = node.parent else {
			return Err(self
				.policy
				.raise(ErrorKind::InvalidStructure, "the root node cannot be moved"));
		};
		self.node(new_parent)?;
		let mut ancestor = Some(new_parent);
		while let Some(a) = ancestor {
			if a == id {
				return Err(self.policy.raise(
					ErrorKind::InvalidStructure,
					format!(
						"cannot move {} under its own subtree {}",
						self.display_path(id),
						self.display_path(new_parent)
					),
				));
			}
			ancestor = self.node(a)?.parent;
		}
		if old_parent == new_parent {
			return Ok(());
		}
		if self.node(new_parent)?.children.contains_key(&name) {
			return Err(self.policy.raise(
				ErrorKind::ValueExists,
				format!("{} already has a child {name:?}", self.display_path(new_parent)),
			));
		}
		self.node_mut(old_parent)?.children.shift_remove(&name);
		self.node_mut(new_parent)?.children.insert(name.clone(), id);
		let node = self.node_mut(id)?;
		node.parent = Some(new_parent);
		node.is_static = false;
		debug!(name = %name, to = %self.display_path(new_parent), "moved node");
		Ok(())
	}

	/// Marks the child `name` of `parent` as protected against structural-edit signals.
	pub fn set_static(&mut self, parent: NodeId, name: &str, is_static: bool) -> Result<()> {
		let child = self.child(parent, name)?;
		self.node_mut(child)?.is_static = is_static;
		Ok(())
	}

	pub fn is_static(&self, id: NodeId) -> Result<bool> {
		Ok(self.node(id)?.is_static)
	}

	pub fn add_tag(&mut self, id: NodeId, tag: &str) -> Result<()> {
		let tags = &mut self.node_mut(id)?.component.tags;
		if !tags.iter().any(|t| t == tag) {
			tags.push(tag.to_string());
		}
		Ok(())
	}

	pub fn remove_tag(&mut self, id: NodeId, tag: &str) -> Result<()> {
		self.node_mut(id)?.component.tags.retain(|t| t != tag);
		Ok(())
	}

	#[track_caller]
	pub fn has_tag(&self, id: NodeId, tag: &str) -> Result<bool> {
		Ok(self.node(id)?.has_tag(tag))
	}

	#[track_caller]
	pub fn satisfies<C: Capability>(&self, id: NodeId) -> Result<bool> {
		Ok(self.node(id)?.satisfies::<C>())
	}

	/// Views the node's payload through capability `C`.
	///
	/// Fails with `CastingFailed` if the node does not satisfy `C`.
	#[track_caller]
	pub fn cast<C: Capability>(&self, id: NodeId) -> Result<&C::Object> {
		match self.node(id)?.cast::<C>() {
			Some(object) => Ok(object),
			None => Err(self.casting_failed(id, C::NAME)),
		}
	}

	#[track_caller]
	pub fn cast_mut<C: Capability>(&mut self, id: NodeId) -> Result<&mut C::Object> {
		if !self.satisfies::<C>(id)? {
			return Err(self.casting_failed(id, C::NAME));
		}
		let policy = self.policy;
		match self.node_mut(id)?.cast_mut::<C>() {
			Some(object) => Ok(object),
			None => Err(policy.raise(
				ErrorKind::CastingFailed,
				format!("payload of {id} does not match its declared {}", C::NAME),
			)),
		}
	}

	/// Downcasts the node's payload to `T`.
	#[track_caller]
	pub fn payload<T: Any>(&self, id: NodeId) -> Result<&T> {
		match self.node(id)?.payload::<T>() {
			Some(payload) => Ok(payload),
			None => Err(self.casting_failed(id, std::any::type_name::<T>())),
		}
	}

	#[track_caller]
	pub fn payload_mut<T: Any>(&mut self, id: NodeId) -> Result<&mut T> {
		let policy = self.policy;
		let path = self.display_path(id);
		match self.node_mut(id)?.payload_mut::<T>() {
			Some(payload) => Ok(payload),
			None => Err(policy.raise(
				ErrorKind::CastingFailed,
				format!("{path} has no payload of type {}", std::any::type_name::<T>()),
			)),
		}
	}

	#[track_caller]
	fn casting_failed(&self, id: NodeId, wanted: &str) -> Error {
		let type_name = self.get(id).map_or("?", Node::type_name);
		self.policy.raise(
			ErrorKind::CastingFailed,
			format!("{} ({type_name}) does not satisfy {wanted}", self.display_path(id)),
		)
	}

	/// Every descendant of `id`, depth-first in pre-order.
	pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>> {
		let mut out = Vec::new();
		let mut stack: Vec<NodeId> = self.node(id)?.children().rev().collect();
		while let Some(current) = stack.pop() {
			out.push(current);
			stack.extend(self.node(current)?.children().rev());
		}
		Ok(out)
	}

	/// Descendants of `start` matching `predicate`, in pre-order.
	pub fn find_all(
		&self,
		start: NodeId,
		mut predicate: impl FnMut(&Node) -> bool,
	) -> Result<Vec<NodeId>> {
		let mut found = Vec::new();
		for id in self.descendants(start)? {
			if predicate(self.node(id)?) {
				found.push(id);
			}
		}
		Ok(found)
	}

	pub fn find_by_tag(&self, start: NodeId, tag: &str) -> Result<Vec<NodeId>> {
		self.find_all(start, |n| n.has_tag(tag))
	}

	pub fn find_by_capability<C: Capability>(&self, start: NodeId) -> Result<Vec<NodeId>> {
		self.find_all(start, Node::satisfies::<C>)
	}

	/// Renders the subtree under `id`, one node per line, indented by depth.
	pub fn tree_listing(&self, id: NodeId) -> Result<String> {
		let mut out = String::new();
		let mut stack = vec![(id, 0usize)];
		while let Some((current, depth)) = stack.pop() {
			let node = self.node(current)?;
			let indent = "  ".repeat(depth);
			let _ = match node.link_target() {
				Some(target) => writeln!(out, "{indent}{} -> {target}", node.name),
				None => writeln!(out, "{indent}{} ({})", node.name, node.type_name()),
			};
			stack.extend(node.children().rev().map(|c| (c, depth + 1)));
		}
		Ok(out)
	}

	fn alloc(&mut self, node: Node) -> NodeId {
		if let Some(idx) = self.free.pop() {
			let slot = &mut self.slots[idx as usize];
			slot.node = Some(node);
			return NodeId {
				idx,
				generation: slot.generation,
			};
		}
		let idx = self.slots.len() as u32;
		self.slots.push(Slot {
			generation: 0,
			node: Some(node),
		});
		NodeId { idx, generation: 0 }
	}

	/// Frees `id` and its subtree, invalidating every handle into it.
	fn release(&mut self, id: NodeId) -> usize {
		let mut stack = vec![id];
		let mut released = 0;
		while let Some(current) = stack.pop() {
			let slot = &mut self.slots[current.index()];
			if slot.generation != current.generation {
				continue;
			}
			if let Some(node) = slot.node.take() {
				slot.generation = slot.generation.wrapping_add(1);
				self.free.push(current.idx);
				stack.extend(node.children.values().copied());
				released += 1;
			}
		}
		released
	}
}

impl std::fmt::Debug for Tree {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Tree")
			.field("root", &self.display_path(self.root))
			.field("len", &self.len())
			.finish_non_exhaustive()
	}
}

/// Node names are non-empty, free of `/`, `:` and control characters, and not `.` or `..`.
fn check_name(policy: &ErrorPolicy, name: &str) -> Result<()> {
	let valid = !name.is_empty()
		&& name != "."
		&& name != ".."
		&& !name.chars().any(|c| c == '/' || c == ':' || c.is_control());
	if valid {
		Ok(())
	} else {
		Err(policy.raise(ErrorKind::BadValue, format!("invalid node name {name:?}")))
	}
}
