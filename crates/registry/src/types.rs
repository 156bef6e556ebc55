//! Canonical type names known to an environment.

use arbor_core::{ErrorKind, ErrorPolicy, Result};
use rustc_hash::FxHashMap;

/// What a registered type name stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRole {
	/// A builder pairing one producer with one capability.
	Builder,
	/// A capability with its factory.
	Capability,
}

/// Metadata recorded for a registered type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
	pub name: String,
	pub role: TypeRole,
	/// Capability the type serves; its own name for capabilities.
	pub capability: String,
	/// Producer type name, empty for capabilities.
	pub concrete: String,
	/// Library that registered the type.
	pub library: String,
}

impl TypeDescriptor {
	/// Descriptor of the builder pairing `concrete` with `capability`.
	pub fn builder(capability: &str, concrete: &str, library: &str) -> Self {
		Self {
			name: builder_type_name(capability, concrete),
			role: TypeRole::Builder,
			capability: capability.to_string(),
			concrete: concrete.to_string(),
			library: library.to_string(),
		}
	}

	/// Descriptor of a capability, recorded when its factory is created.
	pub fn capability(name: &str) -> Self {
		Self {
			name: name.to_string(),
			role: TypeRole::Capability,
			capability: name.to_string(),
			concrete: String::new(),
			library: String::new(),
		}
	}
}

/// Canonical type name of the builder pairing `concrete` with `capability`.
pub fn builder_type_name(capability: &str, concrete: &str) -> String {
	format!("Builder<{capability}, {concrete}>")
}

/// Insertion-ordered map of canonical type names to descriptors.
///
/// Names are registered once; a second registration is a setup error and the
/// first descriptor is kept.
#[derive(Debug, Default)]
pub struct TypeRegistry {
	index: FxHashMap<String, usize>,
	entries: Vec<TypeDescriptor>,
}

impl TypeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Fails with a setup error if `descriptor`'s name is taken.
	pub fn check_vacant(&self, policy: &ErrorPolicy, descriptor: &TypeDescriptor) -> Result<()> {
		match self.get(&descriptor.name) {
			Some(existing) => Err(policy.raise(
				ErrorKind::Setup,
				format!(
					"duplicate type: key={:?} existing={} new={}",
					descriptor.name, existing.library, descriptor.library
				),
			)),
			None => Ok(()),
		}
	}

	/// Registers `descriptor` under its name.
	pub fn register(&mut self, policy: &ErrorPolicy, descriptor: TypeDescriptor) -> Result<()> {
		self.check_vacant(policy, &descriptor)?;
		tracing::debug!(
			name = %descriptor.name,
			role = ?descriptor.role,
			library = %descriptor.library,
			"registered type"
		);
		self.index.insert(descriptor.name.clone(), self.entries.len());
		self.entries.push(descriptor);
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
		self.index.get(name).map(|&i| &self.entries[i])
	}

	pub fn contains(&self, name: &str) -> bool {
		self.index.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Descriptors in registration order.
	pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
		self.entries.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_register_and_lookup() {
		let policy = ErrorPolicy::quiet();
		let mut types = TypeRegistry::new();
		types
			.register(&policy, TypeDescriptor::builder("Thing", "shapes.Widget", "demo"))
			.unwrap();
		types
			.register(&policy, TypeDescriptor::builder("Thing", "shapes.Gadget", "demo"))
			.unwrap();

		let widget = types.get("Builder<Thing, shapes.Widget>").unwrap();
		assert_eq!(widget.role, TypeRole::Builder);
		assert_eq!(widget.library, "demo");
		assert_eq!(types.len(), 2);
		let names: Vec<_> = types.iter().map(|d| d.concrete.as_str()).collect();
		assert_eq!(names, ["shapes.Widget", "shapes.Gadget"]);
	}

	#[test]
	fn test_duplicate_is_setup_error_and_keeps_first() {
		let policy = ErrorPolicy::quiet();
		let mut types = TypeRegistry::new();
		types
			.register(&policy, TypeDescriptor::builder("Thing", "shapes.Widget", "first"))
			.unwrap();
		let err = types
			.register(&policy, TypeDescriptor::builder("Thing", "shapes.Widget", "second"))
			.unwrap_err();

		assert_eq!(err.kind(), ErrorKind::Setup);
		assert!(err.message().contains("existing=first new=second"));
		assert_eq!(types.get("Builder<Thing, shapes.Widget>").unwrap().library, "first");
		assert_eq!(types.len(), 1);
	}
}
