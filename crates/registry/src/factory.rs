use arbor_core::{Capability, Component, Implements};

/// Type name of factory nodes.
pub const FACTORY_TYPE: &str = "arbor.Factory";

/// Payload of a factory node; its children are the builders for one capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factory {
	capability: String,
}

impl Factory {
	pub fn new(capability: &str) -> Self {
		Self {
			capability: capability.to_string(),
		}
	}

	/// Name of the capability served.
	pub fn capability(&self) -> &str {
		&self.capability
	}

	pub(crate) fn into_component(self) -> Component {
		Component::new(FACTORY_TYPE)
			.with_payload(self)
			.satisfying::<FactoryCap, Factory>()
	}
}

/// Capability of factory nodes.
pub struct FactoryCap;

impl Capability for FactoryCap {
	const NAME: &'static str = "Factory";
	type Object = Factory;
}

impl Implements<FactoryCap> for Factory {
	fn as_capability(&self) -> &Factory {
		self
	}

	fn as_capability_mut(&mut self) -> &mut Factory {
		self
	}
}
