//! Reflective construction for arbor trees.
//!
//! Producers are registered as builders of a capability inside a library:
//!
//! ```ignore
//! let mut env = Environment::new(&EnvironmentConfig::default())?;
//! env.register::<ThingCap, Widget>("demo")?;
//!
//! let factory = env.factory::<ThingCap>()?;
//! let builder = env.find_builder_with_reduced_name(factory, "Widget")?;
//! let w1 = tree.create_child(tree.root(), "w1", env.build(builder, "w1")?)?;
//! ```
//!
//! Each capability has one factory holding its builders; each library holds
//! links to the builders it contributed and an init/terminate lifecycle.

pub mod builder;
pub mod config;
pub mod environment;
pub mod factory;
pub mod library;
pub mod names;
pub mod types;

pub use builder::{Builder, BuilderCap, Concrete, ConcreteBuilder};
pub use config::{ConfigError, EnvironmentConfig};
pub use environment::Environment;
pub use factory::{Factory, FactoryCap};
pub use library::{Library, LibraryCap, LibraryHooks};
pub use types::{TypeDescriptor, TypeRegistry, TypeRole};
