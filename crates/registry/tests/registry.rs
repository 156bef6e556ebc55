//! Integration tests for builder registration and lookup.

mod common;

use arbor_core::{ErrorKind, ErrorPolicy, Uri};
use arbor_registry::{
	BuilderCap, Environment, EnvironmentConfig, FactoryCap, LibraryCap, TypeRole,
};
use common::{Counter, GaugeCap, Meter, OtherWidget, ThingCap, Widget};
use pretty_assertions::assert_eq;

fn env() -> Environment {
	let mut env = Environment::new(&EnvironmentConfig::default()).unwrap();
	env.set_policy(ErrorPolicy::quiet());
	env
}

#[test]
fn test_registration_lays_out_registry_tree() {
	let mut env = env();
	let builder = env.register::<ThingCap, Widget>("demo").unwrap();
	let tree = env.tree();

	assert_eq!(
		tree.path(builder).unwrap().path(),
		"//Environment/Factories/Thing/demo.Widget"
	);
	assert!(tree.is_static(builder).unwrap());
	let link = tree
		.resolve_path("//Environment/Libraries/demo/demo.Widget")
		.unwrap();
	assert_eq!(link, builder);

	let descriptor = env.types().get("Builder<Thing, shapes.Widget>").unwrap();
	assert_eq!(descriptor.role, TypeRole::Builder);
	assert_eq!(descriptor.library, "demo");
	assert_eq!(env.types().get("Thing").unwrap().role, TypeRole::Capability);
}

#[test]
fn test_builder_contract() {
	let mut env = env();
	env.register::<ThingCap, Widget>("demo").unwrap();

	let factory = env.factory::<ThingCap>().unwrap();
	let builder = env.find_builder_with_reduced_name(factory, "Widget").unwrap();
	let info = env.builder(builder).unwrap();
	assert_eq!(info.abstract_type_name(), "Thing");
	assert_eq!(info.concrete_type_name(), "shapes.Widget");

	let mut tree = env.new_tree("Root").unwrap();
	let component = env.build(builder, "w1").unwrap();
	let w1 = tree.create_child(tree.root(), "w1", component).unwrap();
	assert_eq!(tree.cast::<ThingCap>(w1).unwrap().label(), "w1");
	assert_eq!(tree.node(w1).unwrap().type_name(), "shapes.Widget");
	assert!(tree.has_tag(w1, "widget").unwrap());
}

#[test]
fn test_factory_is_created_once() {
	let mut env = env();
	let first = env.factory::<ThingCap>().unwrap();
	let second = env.factory_named("Thing").unwrap();
	assert_eq!(first, second);
	assert_eq!(env.tree().cast::<FactoryCap>(first).unwrap().capability(), "Thing");
	assert_eq!(env.find_factory("Gauge").unwrap(), None);

	env.register::<GaugeCap, Meter>("instruments").unwrap();
	assert_eq!(env.factory_names().unwrap(), ["Thing", "Gauge"]);
}

#[test]
fn test_duplicate_registration_is_setup_error() {
	let mut env = env();
	env.register::<ThingCap, Widget>("demo").unwrap();
	let err = env.register::<ThingCap, Widget>("other").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Setup);
	assert!(env.find_library("other").unwrap().is_none());
}

#[test]
fn test_same_reduced_name_in_one_library_collides() {
	let mut env = env();
	env.register::<ThingCap, Widget>("demo").unwrap();
	let err = env.register::<ThingCap, OtherWidget>("demo").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Setup);
	assert!(err.message().contains("demo.Widget"));
	assert!(!env.types().contains("Builder<Thing, gizmos.Widget>"));
}

#[test]
fn test_ambiguous_reduced_name_lists_candidates() {
	let mut env = env();
	env.register::<ThingCap, Widget>("demo").unwrap();
	env.register::<ThingCap, OtherWidget>("extra").unwrap();

	let factory = env.factory::<ThingCap>().unwrap();
	let err = env.find_builder_with_reduced_name(factory, "Widget").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::BadValue);
	assert!(err.message().contains("demo.Widget"));
	assert!(err.message().contains("extra.Widget"));

	let exact = env.find_builder(factory, "extra.Widget").unwrap();
	assert_eq!(env.builder(exact).unwrap().concrete_type_name(), "gizmos.Widget");
	let err = env.build_reduced::<ThingCap>("Widget", "w").err().unwrap();
	assert_eq!(err.kind(), ErrorKind::BadValue);
}

#[test]
fn test_missing_builder_and_factory() {
	let mut env = env();
	let factory = env.factory::<ThingCap>().unwrap();
	let err = env.find_builder_with_reduced_name(factory, "Widget").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::ValueNotFound);

	let err = env.build_reduced::<GaugeCap>("Meter", "m").err().unwrap();
	assert_eq!(err.kind(), ErrorKind::ValueNotFound);
	let err = env.library_builder("nowhere.Widget").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::ValueNotFound);
	let err = env.library_builder("Widget").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::BadValue);
}

#[test]
fn test_find_builder_rejects_non_builders() {
	let mut env = env();
	let gauges = env.factory::<GaugeCap>().unwrap();
	let err = env.find_builder(gauges, "instruments.Meter").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::ValueNotFound);

	let factories = env.tree().resolve_path("//Environment/Factories").unwrap();
	let err = env.find_builder(factories, "Gauge").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::CastingFailed);
}

#[test]
fn test_build_reduced_and_create_component() {
	let mut env = env();
	env.register::<GaugeCap, Meter>("instruments").unwrap();

	let component = env.build_reduced::<GaugeCap>("Meter", "m").unwrap();
	assert_eq!(component.type_name(), "instruments.Meter");
	assert!(component.satisfies::<GaugeCap>());

	let mut tree = env.new_tree("Root").unwrap();
	let root = tree.root();
	let m = env
		.create_component(&mut tree, root, "m", "instruments.Meter")
		.unwrap();
	assert_eq!(tree.cast::<GaugeCap>(m).unwrap().reading(), 42);
	assert!(tree.cast::<ThingCap>(m).is_err());
}

#[test]
fn test_library_directory() {
	let mut env = env();
	let widget = env.register::<ThingCap, Widget>("demo").unwrap();
	let meter = env.register::<GaugeCap, Meter>("demo").unwrap();

	assert_eq!(env.library_builders("demo").unwrap(), [widget, meter]);
	assert_eq!(env.library_builder("demo.Meter").unwrap(), meter);
	let library = env.library("demo").unwrap();
	let link = env.tree().child(library, "demo.Widget").unwrap();
	assert_eq!(
		env.tree().link_target(link).unwrap(),
		&Uri::parse("//Environment/Factories/Thing/demo.Widget").unwrap()
	);
	assert_eq!(env.library_names().unwrap(), ["demo"]);
}

#[test]
fn test_library_lifecycle_is_idempotent() {
	let mut env = env();
	let counter = Counter::default();
	env.register_library("demo", "Demo producers", Some(Box::new(counter.clone())))
		.unwrap();
	env.register::<ThingCap, Widget>("demo").unwrap();
	assert!(!env.is_initiated("demo").unwrap());

	env.initiate_library("demo").unwrap();
	env.initiate_library("demo").unwrap();
	env.initiate_all().unwrap();
	assert!(env.is_initiated("demo").unwrap());
	assert_eq!(counter.initiated.get(), 1);

	env.terminate_library("demo").unwrap();
	env.terminate_all().unwrap();
	assert!(!env.is_initiated("demo").unwrap());
	assert_eq!(counter.terminated.get(), 1);

	let library = env.library("demo").unwrap();
	assert_eq!(
		env.tree().cast::<LibraryCap>(library).unwrap().description(),
		"Demo producers"
	);
}

#[test]
fn test_hooks_attach_once() {
	let mut env = env();
	env.register_library("demo", "", Some(Box::new(Counter::default())))
		.unwrap();
	env.register_library("demo", "Updated", None).unwrap();
	let err = env
		.register_library("demo", "", Some(Box::new(Counter::default())))
		.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Setup);
	assert!(env.initiate_library("missing").is_err());
}

#[test]
fn test_registry_nodes_are_protected() {
	let mut env = env();
	let builder = env.register::<ThingCap, Widget>("demo").unwrap();
	assert!(env.tree().satisfies::<BuilderCap>(builder).unwrap());
	let factories = env.tree().resolve_path("//Environment/Factories").unwrap();
	assert!(env.tree().is_static(factories).unwrap());
}

#[test]
fn test_config_names_registry_root() {
	let config = EnvironmentConfig::from_toml_str(
		r#"
registry_root = "Registry"

[exceptions]
echo = false
"#,
	)
	.unwrap();
	let mut env = Environment::new(&config).unwrap();
	assert!(!env.policy().exceptions.echo);
	let builder = env.register::<ThingCap, Widget>("demo").unwrap();
	assert_eq!(
		env.tree().path(builder).unwrap().path(),
		"//Registry/Factories/Thing/demo.Widget"
	);
	assert_eq!(env.new_tree("App").unwrap().policy(), env.policy());
}
