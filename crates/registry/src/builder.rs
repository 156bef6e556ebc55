//! Builders: constructors of components for one capability.

use std::any::Any;
use std::marker::PhantomData;

use arbor_core::{Capability, Component, Implements};

/// A producer type that builders can instantiate.
pub trait Concrete: Any + Sized {
	/// Canonical, namespaced type name, e.g. `"shapes.Widget"`.
	const TYPE_NAME: &'static str;

	/// Creates the payload of a component named `name`.
	fn create(name: &str) -> Self;

	/// Adds signals or tags to a freshly built component.
	fn decorate(component: Component) -> Component {
		component
	}
}

/// Builds components satisfying one capability.
pub trait Builder {
	/// Name of the capability every built component satisfies.
	fn abstract_type_name(&self) -> &'static str;

	/// Type name of the producer.
	fn concrete_type_name(&self) -> &'static str;

	fn build(&self, name: &str) -> Component;
}

/// Capability of builder nodes.
pub struct BuilderCap;

impl Capability for BuilderCap {
	const NAME: &'static str = "Builder";
	type Object = dyn Builder;
}

/// The builder pairing producer `P` with capability `C`.
pub struct ConcreteBuilder<C, P> {
	_marker: PhantomData<fn() -> (C, P)>,
}

impl<C, P> ConcreteBuilder<C, P> {
	pub fn new() -> Self {
		Self { _marker: PhantomData }
	}
}

impl<C, P> Default for ConcreteBuilder<C, P> {
	fn default() -> Self {
		Self::new()
	}
}

impl<C: Capability, P: Concrete + Implements<C>> Builder for ConcreteBuilder<C, P> {
	fn abstract_type_name(&self) -> &'static str {
		C::NAME
	}

	fn concrete_type_name(&self) -> &'static str {
		P::TYPE_NAME
	}

	fn build(&self, name: &str) -> Component {
		let component = Component::new(P::TYPE_NAME)
			.with_payload(P::create(name))
			.satisfying::<C, P>();
		P::decorate(component)
	}
}

impl<C: Capability, P: Concrete + Implements<C>> Implements<BuilderCap> for ConcreteBuilder<C, P> {
	fn as_capability(&self) -> &(dyn Builder + 'static) {
		self
	}

	fn as_capability_mut(&mut self) -> &mut (dyn Builder + 'static) {
		self
	}
}

/// Type name of builder nodes.
pub const BUILDER_TYPE: &str = "arbor.Builder";

/// The node component holding the builder for `(C, P)`.
pub(crate) fn builder_component<C: Capability, P: Concrete + Implements<C>>() -> Component {
	Component::new(BUILDER_TYPE)
		.with_payload(ConcreteBuilder::<C, P>::new())
		.satisfying::<BuilderCap, ConcreteBuilder<C, P>>()
}
