//! Capabilities: abstract interfaces a node may satisfy.
//!
//! A capability is a marker type naming the interface and the trait-object
//! type through which it is used. A payload type opts in by implementing
//! [`Implements`]; the bound is checked by the compiler wherever a producer is
//! paired with a capability, so an invalid pairing never builds.
//!
//! ```ignore
//! pub trait Shape { fn area(&self) -> f64; }
//! pub struct ShapeCap;
//! impl Capability for ShapeCap {
//!     const NAME: &'static str = "Shape";
//!     type Object = dyn Shape;
//! }
//! impl Implements<ShapeCap> for Square {
//!     fn as_capability(&self) -> &(dyn Shape + 'static) { self }
//!     fn as_capability_mut(&mut self) -> &mut (dyn Shape + 'static) { self }
//! }
//! ```
//!
//! `Object` is a `'static` trait object, so implementations spell the bound
//! out; a bare `&dyn Shape` borrows the object lifetime from `&self` and does
//! not match the trait.

use std::any::{Any, TypeId};

/// An abstract interface name and the object type it exposes.
pub trait Capability: 'static {
	/// Name of the capability; factories are keyed by it.
	const NAME: &'static str;

	/// The interface, usually `dyn Trait`.
	type Object: ?Sized + 'static;
}

/// Declares that `Self` can stand in for capability `C`.
pub trait Implements<C: Capability>: Any {
	fn as_capability(&self) -> &C::Object;

	fn as_capability_mut(&mut self) -> &mut C::Object;
}

type CastRef<C> =
	for<'a> fn(&'a (dyn Any + 'static)) -> Option<&'a <C as Capability>::Object>;
type CastMut<C> =
	for<'a> fn(&'a mut (dyn Any + 'static)) -> Option<&'a mut <C as Capability>::Object>;

struct Caster<C: Capability> {
	cast_ref: CastRef<C>,
	cast_mut: CastMut<C>,
}

fn cast_ref<'a, C: Capability, P: Implements<C>>(
	any: &'a (dyn Any + 'static),
) -> Option<&'a C::Object> {
	any.downcast_ref::<P>().map(|p| <P as Implements<C>>::as_capability(p))
}

fn cast_mut<'a, C: Capability, P: Implements<C>>(
	any: &'a mut (dyn Any + 'static),
) -> Option<&'a mut C::Object> {
	any.downcast_mut::<P>()
		.map(|p| <P as Implements<C>>::as_capability_mut(p))
}

/// A capability satisfied by a payload, with its type-erased caster.
pub(crate) struct CapabilityEntry {
	pub(crate) name: &'static str,
	type_id: TypeId,
	caster: Box<dyn Any>,
}

impl CapabilityEntry {
	pub(crate) fn new<C: Capability, P: Implements<C>>() -> Self {
		let caster: Caster<C> = Caster {
			cast_ref: cast_ref::<C, P>,
			cast_mut: cast_mut::<C, P>,
		};
		Self {
			name: C::NAME,
			type_id: TypeId::of::<C>(),
			caster: Box::new(caster),
		}
	}

	pub(crate) fn is<C: Capability>(&self) -> bool {
		self.type_id == TypeId::of::<C>()
	}

	pub(crate) fn cast_ref<'a, C: Capability>(
		&self,
		payload: &'a (dyn Any + 'static),
	) -> Option<&'a C::Object> {
		let caster = self.caster.downcast_ref::<Caster<C>>()?;
		(caster.cast_ref)(payload)
	}

	pub(crate) fn cast_mut<'a, C: Capability>(
		&self,
		payload: &'a mut (dyn Any + 'static),
	) -> Option<&'a mut C::Object> {
		let caster = self.caster.downcast_ref::<Caster<C>>()?;
		(caster.cast_mut)(payload)
	}
}

impl std::fmt::Debug for CapabilityEntry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("CapabilityEntry").field(&self.name).finish()
	}
}
