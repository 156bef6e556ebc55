//! Structural-edit signals every node carries.

use arbor_uri::Uri;
use indexmap::IndexMap;
use tracing::info;

use super::{Signal, SignalCall};
use crate::error::{ErrorKind, Result};
use crate::frame::Frame;
use crate::tree::NodeId;

pub const RENAME: &str = "rename_component";
pub const MOVE: &str = "move_component";
pub const DELETE: &str = "delete_component";
pub const LIST_TREE: &str = "list_tree";

/// Adds the built-in signals to `signals`, keeping any already present.
pub(crate) fn install(signals: &mut IndexMap<String, Signal>) {
	if !signals.contains_key(RENAME) {
		let mut signal = Signal::new(RENAME, "Renames the receiving node", "Rename");
		signal.connect(rename).signature(|f| {
			let _ = f.set("name", "");
		});
		signals.insert(RENAME.to_string(), signal);
	}
	if !signals.contains_key(MOVE) {
		let mut signal = Signal::new(MOVE, "Moves the receiving node under another parent", "Move");
		signal.connect(move_to).signature(|f| {
			let _ = f.set("path", Uri::default());
		});
		signals.insert(MOVE.to_string(), signal);
	}
	if !signals.contains_key(DELETE) {
		let mut signal = Signal::new(DELETE, "Removes a child of the receiving node", "Delete");
		signal.connect(delete).signature(|f| {
			let _ = f.set("name", "");
		});
		signals.insert(DELETE.to_string(), signal);
	}
	if !signals.contains_key(LIST_TREE) {
		let mut signal = Signal::new(
			LIST_TREE,
			"Logs the subtree under the receiving node",
			"List tree",
		);
		signal.connect(list_tree).hidden(true).read_only(true);
		signals.insert(LIST_TREE.to_string(), signal);
	}
}

fn refuse_static(call: &SignalCall<'_>, id: NodeId, signal: &str) -> Result<()> {
	if call.tree.is_static(id)? {
		return Err(call.tree.raise(
			ErrorKind::InvalidStructure,
			format!("{signal}: {} is static", call.tree.display_path(id)),
		));
	}
	Ok(())
}

fn rename(call: &mut SignalCall<'_>) -> Result<()> {
	let name: String = call.arg("name")?;
	refuse_static(call, call.receiver, RENAME)?;
	call.tree.rename(call.receiver, &name)
}

fn move_to(call: &mut SignalCall<'_>) -> Result<()> {
	let path: Uri = call.arg("path")?;
	refuse_static(call, call.receiver, MOVE)?;
	let new_parent = call.tree.resolve_from(call.receiver, &path)?;
	call.tree.move_to(call.receiver, new_parent)
}

fn delete(call: &mut SignalCall<'_>) -> Result<()> {
	let name: String = call.arg("name")?;
	let child = call.tree.child(call.receiver, &name)?;
	refuse_static(call, child, DELETE)?;
	call.tree.remove_child(call.receiver, &name)
}

fn list_tree(call: &mut SignalCall<'_>) -> Result<()> {
	let listing = call.tree.tree_listing(call.receiver)?;
	info!(root = %call.tree.display_path(call.receiver), "\n{listing}");
	Ok(())
}

/// Frame for [`RENAME`].
pub fn rename_frame(name: &str) -> Frame {
	let mut frame = Frame::new();
	let _ = frame.set("name", name);
	frame
}

/// Frame for [`MOVE`]; relative paths start at the moved node.
pub fn move_frame(path: Uri) -> Frame {
	let mut frame = Frame::new();
	let _ = frame.set("path", path);
	frame
}

/// Frame for [`DELETE`].
pub fn delete_frame(child: &str) -> Frame {
	let mut frame = Frame::new();
	let _ = frame.set("name", child);
	frame
}
