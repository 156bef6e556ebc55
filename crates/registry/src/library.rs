//! Libraries: named groups of builders with an init/terminate lifecycle.

use arbor_core::{Capability, Component, Implements, Result};

/// Type name of library nodes.
pub const LIBRARY_TYPE: &str = "arbor.Library";

/// Work a library does when it is initiated or terminated.
pub trait LibraryHooks {
	fn initiate(&mut self) -> Result<()>;

	fn terminate(&mut self) -> Result<()> {
		Ok(())
	}
}

/// Payload of a library node.
///
/// Its children are links, named `"<library>.<reduced name>"`, to every
/// builder the library contributes.
pub struct Library {
	name: String,
	description: String,
	initiated: bool,
	hooks: Option<Box<dyn LibraryHooks>>,
}

impl Library {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_string(),
			description: String::new(),
			initiated: false,
			hooks: None,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	pub fn set_description(&mut self, description: &str) {
		self.description = description.to_string();
	}

	pub fn has_hooks(&self) -> bool {
		self.hooks.is_some()
	}

	pub(crate) fn set_hooks(&mut self, hooks: Box<dyn LibraryHooks>) {
		self.hooks = Some(hooks);
	}

	pub fn is_initiated(&self) -> bool {
		self.initiated
	}

	/// Runs the initiate hook unless already initiated.
	///
	/// Returns `true` if the library changed state. A failing hook leaves the
	/// library terminated.
	pub fn initiate(&mut self) -> Result<bool> {
		if self.initiated {
			return Ok(false);
		}
		if let Some(hooks) = &mut self.hooks {
			hooks.initiate()?;
		}
		self.initiated = true;
		Ok(true)
	}

	/// Runs the terminate hook unless already terminated.
	pub fn terminate(&mut self) -> Result<bool> {
		if !self.initiated {
			return Ok(false);
		}
		if let Some(hooks) = &mut self.hooks {
			hooks.terminate()?;
		}
		self.initiated = false;
		Ok(true)
	}

	pub(crate) fn into_component(self) -> Component {
		Component::new(LIBRARY_TYPE)
			.with_payload(self)
			.satisfying::<LibraryCap, Library>()
	}
}

impl std::fmt::Debug for Library {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Library")
			.field("name", &self.name)
			.field("initiated", &self.initiated)
			.field("hooks", &self.hooks.is_some())
			.finish()
	}
}

/// Capability of library nodes.
pub struct LibraryCap;

impl Capability for LibraryCap {
	const NAME: &'static str = "Library";
	type Object = Library;
}

impl Implements<LibraryCap> for Library {
	fn as_capability(&self) -> &Library {
		self
	}

	fn as_capability_mut(&mut self) -> &mut Library {
		self
	}
}
