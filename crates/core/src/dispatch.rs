//! Path-addressed signal invocation.

use arbor_uri::Uri;
use tracing::{trace, warn};

use crate::error::{ErrorKind, Result};
use crate::frame::Frame;
use crate::tree::Tree;

/// Fires a named signal on the node found at a path.
pub trait Dispatcher {
	/// Resolves `target` in `tree` and fires `signal` there with `frame`.
	///
	/// The frame is finalized before any subscriber sees it.
	fn dispatch(&self, tree: &mut Tree, target: &Uri, signal: &str, frame: Frame) -> Result<()>;
}

/// In-process dispatcher calling subscribers on the current thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalDispatcher {
	fail_fast: bool,
}

impl LocalDispatcher {
	pub fn new() -> Self {
		Self::default()
	}

	/// Treats an unresolvable target as a failed assertion instead of a
	/// recoverable `ValueNotFound`.
	pub fn fail_fast() -> Self {
		Self { fail_fast: true }
	}

	pub fn is_fail_fast(&self) -> bool {
		self.fail_fast
	}
}

impl Dispatcher for LocalDispatcher {
	fn dispatch(
		&self,
		tree: &mut Tree,
		target: &Uri,
		signal: &str,
		mut frame: Frame,
	) -> Result<()> {
		let receiver = match tree.resolve(target) {
			Ok(id) => id,
			Err(err) if self.fail_fast && err.is(ErrorKind::ValueNotFound) => {
				warn!(%target, signal, "dispatch target not found");
				return Err(tree.policy().assertion_failed(format!(
					"dispatch of {signal:?} to missing target {target}: {}",
					err.message()
				)));
			}
			Err(err) => return Err(err),
		};
		frame.finalize();
		trace!(%target, signal, args = frame.len(), "dispatching");
		tree.call_signal(receiver, signal, &frame)
	}
}
