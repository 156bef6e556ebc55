//! The process environment: policy, type registry and registry tree.
//!
//! The registry tree is laid out as
//!
//! ```text
//! //<root>
//!   Factories
//!     <capability>            one factory per capability
//!       <library>.<reduced>   builders
//!   Libraries
//!     <library>
//!       <library>.<reduced>   links to builders
//! ```
//!
//! Factories, libraries and builders are static children, so the built-in
//! edit signals cannot rearrange the registry.

use arbor_core::{Capability, Component, ErrorKind, ErrorPolicy, Implements, NodeId, Result, Tree};
use tracing::{debug, info};

use crate::builder::{Builder, BuilderCap, Concrete, builder_component};
use crate::config::EnvironmentConfig;
use crate::factory::{Factory, FactoryCap};
use crate::library::{Library, LibraryCap, LibraryHooks};
use crate::names;
use crate::types::{TypeDescriptor, TypeRegistry};

/// Name of the node holding every factory.
pub const FACTORIES: &str = "Factories";
/// Name of the node holding every library.
pub const LIBRARIES: &str = "Libraries";

/// Process-wide registration state, configured once at startup.
pub struct Environment {
	policy: ErrorPolicy,
	types: TypeRegistry,
	tree: Tree,
	factories: NodeId,
	libraries: NodeId,
}

impl Environment {
	pub fn new(config: &EnvironmentConfig) -> Result<Self> {
		let policy = config.policy();
		let mut tree = Tree::with_policy(&config.registry_root, policy)?;
		let root = tree.root();
		let factories = tree.create_component(root, FACTORIES)?;
		let libraries = tree.create_component(root, LIBRARIES)?;
		tree.set_static(root, FACTORIES, true)?;
		tree.set_static(root, LIBRARIES, true)?;
		Ok(Self {
			policy,
			types: TypeRegistry::new(),
			tree,
			factories,
			libraries,
		})
	}

	pub fn policy(&self) -> &ErrorPolicy {
		&self.policy
	}

	/// Replaces the policy. Trees created earlier keep their copy.
	pub fn set_policy(&mut self, policy: ErrorPolicy) {
		self.policy = policy;
		self.tree.set_policy(policy);
	}

	/// Creates an application tree using this environment's policy.
	pub fn new_tree(&self, root_name: &str) -> Result<Tree> {
		Tree::with_policy(root_name, self.policy)
	}

	/// The registry tree.
	pub fn tree(&self) -> &Tree {
		&self.tree
	}

	pub fn types(&self) -> &TypeRegistry {
		&self.types
	}

	/// The factory for capability `C`, created on first request.
	pub fn factory<C: Capability>(&mut self) -> Result<NodeId> {
		self.factory_named(C::NAME)
	}

	pub fn factory_named(&mut self, capability: &str) -> Result<NodeId> {
		if let Some(id) = self.find_factory(capability)? {
			return Ok(id);
		}
		let descriptor = TypeDescriptor::capability(capability);
		self.types.check_vacant(&self.policy, &descriptor)?;
		let id = self
			.tree
			.create_child(self.factories, capability, Factory::new(capability).into_component())?;
		self.tree.set_static(self.factories, capability, true)?;
		self.types.register(&self.policy, descriptor)?;
		debug!(capability, "created factory");
		Ok(id)
	}

	/// Looks up an existing factory without creating one.
	pub fn find_factory(&self, capability: &str) -> Result<Option<NodeId>> {
		Ok(self.tree.node(self.factories)?.child(capability))
	}

	/// Capability names with a factory, in creation order.
	pub fn factory_names(&self) -> Result<Vec<&str>> {
		let mut out = Vec::new();
		for id in self.tree.node(self.factories)?.children() {
			out.push(self.tree.cast::<FactoryCap>(id)?.capability());
		}
		Ok(out)
	}

	/// Finds the single builder in `factory` whose reduced name is `reduced`.
	///
	/// Fails with `ValueNotFound` if there is none and with `BadValue`, naming
	/// every candidate, if there are several.
	pub fn find_builder_with_reduced_name(&self, factory: NodeId, reduced: &str) -> Result<NodeId> {
		let candidates: Vec<NodeId> = self
			.tree
			.node(factory)?
			.children()
			.filter(|&c| {
				self.tree.get(c).is_some_and(|n| {
					n.satisfies::<BuilderCap>() && names::extract_reduced_name(n.name()) == reduced
				})
			})
			.collect();
		match candidates.as_slice() {
			[] => Err(self.policy.raise(
				ErrorKind::ValueNotFound,
				format!("{} has no builder named {reduced:?}", self.display(factory)),
			)),
			[one] => Ok(*one),
			many => {
				let names: Vec<&str> = many
					.iter()
					.filter_map(|&c| self.tree.get(c).map(|n| n.name()))
					.collect();
				Err(self.policy.raise(
					ErrorKind::BadValue,
					format!(
						"builder name {reduced:?} is ambiguous in {}: {}",
						self.display(factory),
						names.join(", ")
					),
				))
			}
		}
	}

	/// Finds the builder named exactly `full_name` in `factory`.
	pub fn find_builder(&self, factory: NodeId, full_name: &str) -> Result<NodeId> {
		let id = self.tree.child(factory, full_name)?;
		self.tree.cast::<BuilderCap>(id)?;
		Ok(id)
	}

	/// Views a builder node as a [`Builder`].
	pub fn builder(&self, id: NodeId) -> Result<&dyn Builder> {
		self.tree.cast::<BuilderCap>(id)
	}

	/// Builds a detached component named `name`.
	pub fn build(&self, builder: NodeId, name: &str) -> Result<Component> {
		Ok(self.builder(builder)?.build(name))
	}

	/// Builds with the builder of capability `C` whose reduced name is `reduced`.
	pub fn build_reduced<C: Capability>(&self, reduced: &str, name: &str) -> Result<Component> {
		let factory = self.find_factory(C::NAME)?.ok_or_else(|| {
			self.policy
				.raise(ErrorKind::ValueNotFound, format!("no factory for capability {:?}", C::NAME))
		})?;
		let builder = self.find_builder_with_reduced_name(factory, reduced)?;
		self.build(builder, name)
	}

	/// Finds a builder through the directory of the library named by `full_name`.
	pub fn library_builder(&self, full_name: &str) -> Result<NodeId> {
		let library = names::extract_library_name(full_name);
		if library.is_empty() {
			return Err(self.policy.raise(
				ErrorKind::BadValue,
				format!("builder name {full_name:?} has no library namespace"),
			));
		}
		let library = self.library(library)?;
		let link = self.tree.child(library, full_name)?;
		self.tree.follow_links(link)
	}

	/// Builds with the builder named `builder_full_name` and inserts the result
	/// under `parent` in `tree`.
	pub fn create_component(
		&self,
		tree: &mut Tree,
		parent: NodeId,
		name: &str,
		builder_full_name: &str,
	) -> Result<NodeId> {
		let builder = self.library_builder(builder_full_name)?;
		let component = self.build(builder, name)?;
		tree.create_child(parent, name, component)
	}

	/// Registers producer `P` as a builder of capability `C` in `library`.
	///
	/// Creates the factory and the library when missing. The builder is named
	/// `"<library>.<reduced P name>"` and linked from the library. Registering
	/// the same pair twice, or a name already used by another builder in the
	/// factory or the library, is a setup error.
	pub fn register<C, P>(&mut self, library: &str) -> Result<NodeId>
	where
		C: Capability,
		P: Concrete + Implements<C>,
	{
		let descriptor = TypeDescriptor::builder(C::NAME, P::TYPE_NAME, library);
		self.types.check_vacant(&self.policy, &descriptor)?;
		let full_name = names::builder_name(library, P::TYPE_NAME);
		let owners = [self.find_factory(C::NAME)?, self.find_library(library)?];
		for owner in owners.into_iter().flatten() {
			if self.tree.node(owner)?.child(&full_name).is_some() {
				return Err(self.policy.raise(
					ErrorKind::Setup,
					format!("{} already has {full_name:?}", self.display(owner)),
				));
			}
		}
		let factory = self.factory::<C>()?;
		let library_id = self.library_or_create(library)?;

		let builder = self.tree.create_child(factory, &full_name, builder_component::<C, P>())?;
		self.tree.set_static(factory, &full_name, true)?;
		let path = self.tree.path(builder)?;
		self.tree.create_link(library_id, &full_name, &path)?;
		self.tree.set_static(library_id, &full_name, true)?;
		self.types.register(&self.policy, descriptor)?;
		debug!(
			capability = C::NAME,
			concrete = P::TYPE_NAME,
			builder = %full_name,
			"registered builder"
		);
		Ok(builder)
	}

	/// The library named `name`, created on first request.
	pub fn library_or_create(&mut self, name: &str) -> Result<NodeId> {
		if let Some(id) = self.find_library(name)? {
			return Ok(id);
		}
		let id = self
			.tree
			.create_child(self.libraries, name, Library::new(name).into_component())?;
		self.tree.set_static(self.libraries, name, true)?;
		debug!(library = name, "created library");
		Ok(id)
	}

	/// Creates or updates a library, attaching its lifecycle hooks.
	///
	/// Hooks can be attached once.
	pub fn register_library(
		&mut self,
		name: &str,
		description: &str,
		hooks: Option<Box<dyn LibraryHooks>>,
	) -> Result<NodeId> {
		let id = self.library_or_create(name)?;
		let policy = self.policy;
		let library = self.tree.cast_mut::<LibraryCap>(id)?;
		if hooks.is_some() && library.has_hooks() {
			return Err(policy.raise(
				ErrorKind::Setup,
				format!("library {name:?} already has lifecycle hooks"),
			));
		}
		library.set_description(description);
		if let Some(hooks) = hooks {
			library.set_hooks(hooks);
		}
		Ok(id)
	}

	pub fn find_library(&self, name: &str) -> Result<Option<NodeId>> {
		Ok(self.tree.node(self.libraries)?.child(name))
	}

	/// The library named `name`; `ValueNotFound` if it was never created.
	pub fn library(&self, name: &str) -> Result<NodeId> {
		self.find_library(name)?.ok_or_else(|| {
			self.policy
				.raise(ErrorKind::ValueNotFound, format!("no library named {name:?}"))
		})
	}

	/// Library names in creation order.
	pub fn library_names(&self) -> Result<Vec<&str>> {
		let mut out = Vec::new();
		for id in self.tree.node(self.libraries)?.children() {
			out.push(self.tree.name(id)?);
		}
		Ok(out)
	}

	/// Initiates a library; a no-op if it is already initiated.
	pub fn initiate_library(&mut self, name: &str) -> Result<()> {
		let id = self.library(name)?;
		if self.tree.cast_mut::<LibraryCap>(id)?.initiate()? {
			info!(library = name, "initiated library");
		}
		Ok(())
	}

	/// Terminates a library; a no-op if it is not initiated.
	pub fn terminate_library(&mut self, name: &str) -> Result<()> {
		let id = self.library(name)?;
		if self.tree.cast_mut::<LibraryCap>(id)?.terminate()? {
			info!(library = name, "terminated library");
		}
		Ok(())
	}

	/// Initiates every library in creation order, stopping at the first failure.
	pub fn initiate_all(&mut self) -> Result<()> {
		for id in self.tree.children(self.libraries)? {
			let library = self.tree.cast_mut::<LibraryCap>(id)?;
			if library.initiate()? {
				info!(library = library.name(), "initiated library");
			}
		}
		Ok(())
	}

	/// Terminates every library in reverse creation order.
	pub fn terminate_all(&mut self) -> Result<()> {
		for id in self.tree.children(self.libraries)?.into_iter().rev() {
			let library = self.tree.cast_mut::<LibraryCap>(id)?;
			if library.terminate()? {
				info!(library = library.name(), "terminated library");
			}
		}
		Ok(())
	}

	pub fn is_initiated(&self, name: &str) -> Result<bool> {
		let id = self.library(name)?;
		Ok(self.tree.cast::<LibraryCap>(id)?.is_initiated())
	}

	/// Builders listed in a library's directory, with links resolved.
	pub fn library_builders(&self, name: &str) -> Result<Vec<NodeId>> {
		let id = self.library(name)?;
		self.tree
			.children(id)?
			.into_iter()
			.map(|link| self.tree.follow_links(link))
			.collect()
	}

	fn display(&self, id: NodeId) -> String {
		match self.tree.path(id) {
			Ok(path) => path.to_string(),
			Err(_) => id.to_string(),
		}
	}
}

impl std::fmt::Debug for Environment {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Environment")
			.field("policy", &self.policy)
			.field("types", &self.types.len())
			.field("tree", &self.tree)
			.finish_non_exhaustive()
	}
}
