//! Path resolution.

use arbor_uri::{Scheme, Uri};
use tracing::trace;

use super::{NodeId, NodeKind, Tree};
use crate::error::{ErrorKind, Result};

impl Tree {
	/// Resolves `uri` from the root. Relative paths start at the root node.
	pub fn resolve(&self, uri: &Uri) -> Result<NodeId> {
		self.resolve_from(self.root, uri)
	}

	/// Parses and resolves `path` from the root.
	pub fn resolve_path(&self, path: &str) -> Result<NodeId> {
		let uri = Uri::parse(path).map_err(|e| self.policy.raise_uri(&e))?;
		self.resolve(&uri)
	}

	/// Resolves `uri`; relative paths start at `start`.
	///
	/// `.` stays put, `..` ascends, other segments name children. A link reached
	/// by the final segment is followed until a non-link node is found.
	pub fn resolve_from(&self, start: NodeId, uri: &Uri) -> Result<NodeId> {
		let found = self.walk(start, uri)?;
		self.follow_links(found)
	}

	/// Follows `id` through links until a non-link node.
	///
	/// Fails with `InvalidStructure` when a link is visited twice and with
	/// `ValueNotFound` when a target no longer exists.
	pub fn follow_links(&self, id: NodeId) -> Result<NodeId> {
		let mut visited: Vec<NodeId> = Vec::new();
		let mut current = id;
		loop {
			let node = self.node(current)?;
			let NodeKind::Link { target } = &node.component.kind else {
				return Ok(current);
			};
			if visited.contains(&current) {
				let chain: Vec<String> = visited.iter().map(|&v| self.display_path(v)).collect();
				return Err(self.policy.raise(
					ErrorKind::InvalidStructure,
					format!("link cycle: {} -> {}", chain.join(" -> "), self.display_path(current)),
				));
			}
			visited.push(current);
			if target.is_empty() {
				return Err(self.policy.raise(
					ErrorKind::ValueNotFound,
					format!("link {} has no target", self.display_path(current)),
				));
			}
			trace!(link = %self.display_path(current), %target, "following link");
			let origin = node.parent.unwrap_or(self.root);
			current = self.walk(origin, target)?;
		}
	}

	fn walk(&self, start: NodeId, uri: &Uri) -> Result<NodeId> {
		if uri.scheme() != Scheme::Cpath {
			return Err(self.policy.raise(
				ErrorKind::InvalidUri,
				format!("{uri} is not a component path"),
			));
		}
		self.node(start)?;
		let mut segments = uri.segments();
		let mut current = start;
		if uri.is_absolute() {
			let root = self.node(self.root)?;
			current = self.root;
			if let Some(first) = segments.next()
				&& first != root.name
			{
				return Err(self.policy.raise(
					ErrorKind::ValueNotFound,
					format!("{uri} does not start at root {:?}", root.name),
				));
			}
		}
		for segment in segments {
			current = match segment {
				"." => current,
				".." => self.node(current)?.parent.ok_or_else(|| {
					self.policy.raise(
						ErrorKind::ValueNotFound,
						format!("{uri}: {} has no parent", self.display_path(current)),
					)
				})?,
				name => self.node(current)?.child(name).ok_or_else(|| {
					self.policy.raise(
						ErrorKind::ValueNotFound,
						format!("{uri}: {} has no child {name:?}", self.display_path(current)),
					)
				})?,
			};
		}
		Ok(current)
	}
}
