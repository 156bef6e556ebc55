//! Named, multi-subscriber signals owned by nodes.
//!
//! Firing a signal calls each subscriber in registration order with the same
//! [`Frame`], synchronously, on the caller's thread. Subscribers receive a
//! [`SignalCall`] with mutable access to the tree, so a subscriber may edit the
//! tree, including removing the node that owns the signal, and may fire
//! further signals, including the one currently firing.

pub mod builtin;

use std::rc::Rc;

use tracing::trace;

use crate::error::{ErrorKind, Result};
use crate::frame::{Frame, FromValue};
use crate::tree::{NodeId, Tree};

/// Subscriber callable. Shared so a firing can outlive edits to the signal.
pub type SignalHandler = Rc<dyn Fn(&mut SignalCall<'_>) -> Result<()>>;

/// Fills a frame with the entries a signal expects.
pub type SignatureHandler = Box<dyn Fn(&mut Frame)>;

/// Context handed to each subscriber.
pub struct SignalCall<'a> {
	pub tree: &'a mut Tree,
	/// The node owning the fired signal.
	pub receiver: NodeId,
	pub frame: &'a Frame,
}

impl SignalCall<'_> {
	/// Reads a frame argument, raising frame errors through the tree's policy.
	#[track_caller]
	pub fn arg<T: FromValue>(&self, name: &str) -> Result<T> {
		match self.frame.get(name) {
			Ok(value) => Ok(value),
			Err(e) => Err(self.tree.raise(e.kind(), e.to_string())),
		}
	}
}

/// A named signal with its subscribers.
pub struct Signal {
	name: String,
	pretty_name: String,
	description: String,
	read_only: bool,
	hidden: bool,
	handlers: Vec<SignalHandler>,
	signature: Option<SignatureHandler>,
}

impl Signal {
	pub fn new(name: &str, description: &str, pretty_name: &str) -> Self {
		Self {
			name: name.to_string(),
			pretty_name: pretty_name.to_string(),
			description: description.to_string(),
			read_only: false,
			hidden: false,
			handlers: Vec::new(),
			signature: None,
		}
	}

	/// Appends a subscriber; earlier subscribers stay connected.
	pub fn connect<F>(&mut self, handler: F) -> &mut Self
	where
		F: Fn(&mut SignalCall<'_>) -> Result<()> + 'static,
	{
		self.handlers.push(Rc::new(handler));
		self
	}

	/// Sets the frame-shape callable used by introspection.
	pub fn signature<F>(&mut self, signature: F) -> &mut Self
	where
		F: Fn(&mut Frame) + 'static,
	{
		self.signature = Some(Box::new(signature));
		self
	}

	/// Advisory: hide from listings.
	pub fn hidden(&mut self, hidden: bool) -> &mut Self {
		self.hidden = hidden;
		self
	}

	/// Advisory: the signal does not modify its receiver.
	pub fn read_only(&mut self, read_only: bool) -> &mut Self {
		self.read_only = read_only;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn pretty_name(&self) -> &str {
		&self.pretty_name
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	pub fn is_hidden(&self) -> bool {
		self.hidden
	}

	pub fn is_read_only(&self) -> bool {
		self.read_only
	}

	pub fn has_signature(&self) -> bool {
		self.signature.is_some()
	}

	pub fn subscriber_count(&self) -> usize {
		self.handlers.len()
	}

	/// Returns the frame shape described by the signature, or an empty frame.
	pub fn expected_frame(&self) -> Frame {
		let mut frame = Frame::new();
		if let Some(signature) = &self.signature {
			signature(&mut frame);
		}
		frame
	}
}

impl std::fmt::Debug for Signal {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Signal")
			.field("name", &self.name)
			.field("pretty_name", &self.pretty_name)
			.field("read_only", &self.read_only)
			.field("hidden", &self.hidden)
			.field("subscribers", &self.handlers.len())
			.finish_non_exhaustive()
	}
}

impl Tree {
	/// Registers a signal on `id`, returning the existing one if `name` is taken.
	#[track_caller]
	pub fn regist_signal(
		&mut self,
		id: NodeId,
		name: &str,
		description: &str,
		pretty_name: &str,
	) -> Result<&mut Signal> {
		let signals = &mut self.node_mut(id)?.component.signals;
		Ok(signals
			.entry(name.to_string())
			.or_insert_with(|| Signal::new(name, description, pretty_name)))
	}

	/// Removes a signal and its subscribers.
	#[track_caller]
	pub fn unregist_signal(&mut self, id: NodeId, name: &str) -> Result<()> {
		let path = self.display_path(id);
		let policy = *self.policy();
		match self.node_mut(id)?.component.signals.shift_remove(name) {
			Some(_) => Ok(()),
			None => Err(policy.raise(
				ErrorKind::ValueNotFound,
				format!("{path} has no signal {name:?}"),
			)),
		}
	}

	#[track_caller]
	pub fn signal(&self, id: NodeId, name: &str) -> Result<Option<&Signal>> {
		Ok(self.node(id)?.signal(name))
	}

	/// Names of the signals on `id`, hidden ones only when `include_hidden`.
	pub fn list_signals(&self, id: NodeId, include_hidden: bool) -> Result<Vec<&str>> {
		Ok(self
			.node(id)?
			.signals()
			.filter(|s| include_hidden || !s.is_hidden())
			.map(Signal::name)
			.collect())
	}

	/// Looks up a signal that must exist.
	#[track_caller]
	pub fn require_signal(&self, id: NodeId, name: &str) -> Result<&Signal> {
		match self.node(id)?.signal(name) {
			Some(signal) => Ok(signal),
			None => Err(self.raise(
				ErrorKind::ValueNotFound,
				format!("{} has no signal {name:?}", self.display_path(id)),
			)),
		}
	}

	#[track_caller]
	pub fn signal_mut(&mut self, id: NodeId, name: &str) -> Result<&mut Signal> {
		let path = self.display_path(id);
		let policy = *self.policy();
		match self.node_mut(id)?.signal_mut(name) {
			Some(signal) => Ok(signal),
			None => Err(policy.raise(
				ErrorKind::ValueNotFound,
				format!("{path} has no signal {name:?}"),
			)),
		}
	}

	/// The frame shape a signal expects.
	#[track_caller]
	pub fn signal_signature(&self, id: NodeId, name: &str) -> Result<Frame> {
		Ok(self.require_signal(id, name)?.expected_frame())
	}

	/// Fires signal `name` on `id`.
	///
	/// Subscribers run in registration order over the list as it stood when
	/// the call began; subscribers connected meanwhile run on the next call.
	/// A subscriber may fire this same signal again, and the nested call sees
	/// every subscriber connected so far. The first subscriber error stops the
	/// fan-out and is returned.
	#[track_caller]
	pub fn call_signal(&mut self, id: NodeId, name: &str, frame: &Frame) -> Result<()> {
		let handlers = self.require_signal(id, name)?.handlers.clone();
		trace!(
			receiver = %self.display_path(id),
			signal = name,
			subscribers = handlers.len(),
			"firing signal"
		);

		for handler in &handlers {
			let mut call = SignalCall {
				tree: &mut *self,
				receiver: id,
				frame,
			};
			handler(&mut call)?;
		}
		Ok(())
	}
}
