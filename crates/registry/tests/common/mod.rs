//! Producers and capabilities shared by the integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use arbor_core::{Capability, Component, Implements, Signal};
use arbor_registry::{Concrete, LibraryHooks};

pub trait Thing {
	fn label(&self) -> &str;
	fn pinged(&self) -> bool;
}

pub struct ThingCap;

impl Capability for ThingCap {
	const NAME: &'static str = "Thing";
	type Object = dyn Thing;
}

pub trait Gauge {
	fn reading(&self) -> i64;
}

pub struct GaugeCap;

impl Capability for GaugeCap {
	const NAME: &'static str = "Gauge";
	type Object = dyn Gauge;
}

/// Sets `pinged` from the `flag` argument of its `set_pinged` signal.
pub struct Widget {
	pub label: String,
	pub pinged: bool,
}

impl Thing for Widget {
	fn label(&self) -> &str {
		&self.label
	}

	fn pinged(&self) -> bool {
		self.pinged
	}
}

impl Implements<ThingCap> for Widget {
	fn as_capability(&self) -> &(dyn Thing + 'static) {
		self
	}

	fn as_capability_mut(&mut self) -> &mut (dyn Thing + 'static) {
		self
	}
}

impl Concrete for Widget {
	const TYPE_NAME: &'static str = "shapes.Widget";

	fn create(name: &str) -> Self {
		Self {
			label: name.to_string(),
			pinged: false,
		}
	}

	fn decorate(component: Component) -> Component {
		let mut set_pinged = Signal::new("set_pinged", "Sets the pinged flag", "Set pinged");
		set_pinged.connect(|call| {
			let flag = call.arg::<bool>("flag")?;
			call.tree.payload_mut::<Widget>(call.receiver)?.pinged = flag;
			Ok(())
		});
		component.with_signal(set_pinged).with_tag("widget")
	}
}

/// A producer sharing `Widget`'s reduced name.
pub struct OtherWidget;

impl Thing for OtherWidget {
	fn label(&self) -> &str {
		"other"
	}

	fn pinged(&self) -> bool {
		false
	}
}

impl Implements<ThingCap> for OtherWidget {
	fn as_capability(&self) -> &(dyn Thing + 'static) {
		self
	}

	fn as_capability_mut(&mut self) -> &mut (dyn Thing + 'static) {
		self
	}
}

impl Concrete for OtherWidget {
	const TYPE_NAME: &'static str = "gizmos.Widget";

	fn create(_name: &str) -> Self {
		Self
	}
}

pub struct Meter(pub i64);

impl Gauge for Meter {
	fn reading(&self) -> i64 {
		self.0
	}
}

impl Implements<GaugeCap> for Meter {
	fn as_capability(&self) -> &(dyn Gauge + 'static) {
		self
	}

	fn as_capability_mut(&mut self) -> &mut (dyn Gauge + 'static) {
		self
	}
}

impl Concrete for Meter {
	const TYPE_NAME: &'static str = "instruments.Meter";

	fn create(_name: &str) -> Self {
		Self(42)
	}
}

/// Counts lifecycle transitions.
#[derive(Clone, Default)]
pub struct Counter {
	pub initiated: Rc<Cell<u32>>,
	pub terminated: Rc<Cell<u32>>,
}

impl LibraryHooks for Counter {
	fn initiate(&mut self) -> arbor_core::Result<()> {
		self.initiated.set(self.initiated.get() + 1);
		Ok(())
	}

	fn terminate(&mut self) -> arbor_core::Result<()> {
		self.terminated.set(self.terminated.get() + 1);
		Ok(())
	}
}
