//! Namespaced type names.
//!
//! Names are dot-separated: `"demo.Widget"` has namespace `"demo"` and reduced
//! name `"Widget"`. Builders are named `"<library>.<reduced producer name>"`.

/// Namespace separator.
pub const SEPARATOR: char = '.';

/// Everything before the last separator, or `""` when there is none.
pub fn extract_namespace(name: &str) -> &str {
	name.rsplit_once(SEPARATOR).map_or("", |(ns, _)| ns)
}

/// Everything after the last separator, or the whole name.
pub fn extract_reduced_name(name: &str) -> &str {
	name.rsplit_once(SEPARATOR).map_or(name, |(_, reduced)| reduced)
}

/// The first namespace segment, or `""` for names without a namespace.
pub fn extract_library_name(name: &str) -> &str {
	match name.split_once(SEPARATOR) {
		Some((library, _)) => library,
		None => "",
	}
}

/// Full name of the builder `library` contributes for `type_name`.
pub fn builder_name(library: &str, type_name: &str) -> String {
	format!("{library}{SEPARATOR}{}", extract_reduced_name(type_name))
}
