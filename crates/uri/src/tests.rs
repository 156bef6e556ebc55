use proptest::prelude::*;

use super::*;

#[test]
fn test_default_scheme_is_cpath() {
	let uri = Uri::parse("//Root/Tools").unwrap();
	assert_eq!(uri.scheme(), Scheme::Cpath);
	assert_eq!(uri.path(), "//Root/Tools");
	assert_eq!(uri, Uri::parse("cpath://Root/Tools").unwrap());
}

#[test]
fn test_recognized_schemes() {
	assert_eq!(Uri::parse("file:/tmp/mesh.msh").unwrap().scheme(), Scheme::File);
	assert_eq!(Uri::parse("http://example.org/a").unwrap().scheme(), Scheme::Http);
	assert_eq!(Uri::parse("https://example.org").unwrap().scheme(), Scheme::Https);
}

#[test]
fn test_unknown_scheme_is_rejected() {
	let err = Uri::parse("ftp://example.org/a").unwrap_err();
	assert!(matches!(err, UriError::InvalidScheme { ref scheme, .. } if scheme == "ftp"));
}

#[test]
fn test_colon_after_separator_is_not_a_scheme() {
	let uri = Uri::parse("a/b:c").unwrap();
	assert_eq!(uri.scheme(), Scheme::Cpath);
	assert_eq!(uri.path(), "a/b:c");
}

#[test]
fn test_http_requires_authority() {
	let err = Uri::parse("http:/no-host").unwrap_err();
	assert!(matches!(err, UriError::Protocol { scheme: Scheme::Http, .. }));
}

#[test]
fn test_control_characters_are_rejected() {
	assert!(matches!(
		Uri::parse("//Root/a\nb"),
		Err(UriError::Protocol { .. })
	));
}

#[test]
fn test_normalization_collapses_separators() {
	assert_eq!(Uri::parse("//Root///a//b/").unwrap().path(), "//Root/a/b");
	assert_eq!(Uri::parse("////Root").unwrap().path(), "//Root");
	assert_eq!(Uri::parse("a//b").unwrap().path(), "a/b");
	assert_eq!(Uri::parse("file:/tmp//x/").unwrap().path(), "/tmp/x");
}

#[test]
fn test_absolute_and_complete() {
	let abs = Uri::parse("//Root/a").unwrap();
	assert!(abs.is_absolute());
	assert!(abs.is_complete());

	let rel = Uri::parse("../a/./b").unwrap();
	assert!(rel.is_relative());
	assert!(!rel.is_complete());

	// A single leading separator does not mark a component root.
	assert!(Uri::parse("/Root").unwrap().is_relative());
	assert!(Uri::parse("file:/tmp").unwrap().is_absolute());
}

#[test]
fn test_name_and_base_path() {
	let uri = Uri::parse("//Root/Domain/mesh").unwrap();
	assert_eq!(uri.name(), "mesh");
	assert_eq!(uri.base_path().path(), "//Root/Domain");
	assert_eq!(uri.base_path().base_path().path(), "//Root");
	assert_eq!(uri.base_path().base_path().base_path().path(), "//");
	assert_eq!(Uri::root("Root").base_path().name(), "");
}

#[test]
fn test_extension_and_base_name() {
	let uri = Uri::parse("file:/data/grid.tar.gz").unwrap();
	assert_eq!(uri.extension(), ".gz");
	assert_eq!(uri.base_name(), "grid.tar");

	let hidden = Uri::parse("file:/data/.hidden").unwrap();
	assert_eq!(hidden.extension(), "");
	assert_eq!(hidden.base_name(), ".hidden");
}

#[test]
fn test_append_operator() {
	let root = Uri::root("Root");
	assert_eq!((&root / "Tools").path(), "//Root/Tools");
	assert_eq!((root.clone() / "a/b").path(), "//Root/a/b");

	let rel = Uri::parse("x").unwrap();
	assert_eq!((&root / &rel).path(), "//Root/x");
	assert_eq!((&Uri::default() / "x").path(), "x");
	assert_eq!(&root / "", root);
}

#[test]
fn test_rooted_or_foreign_rhs_replaces_base() {
	let base = Uri::parse("//A/x").unwrap();
	let other_root = Uri::parse("//B/y").unwrap();
	assert_eq!(&base / &other_root, other_root);

	let file = Uri::parse("file:rel/data.txt").unwrap();
	assert_eq!(&base / &file, file);

	let tmp = Uri::parse("file:/tmp").unwrap();
	let rooted = Uri::parse("file:/etc/hosts").unwrap();
	assert_eq!(base.join_uri(&rooted), rooted);
	assert_eq!(
		tmp.join_uri(&Uri::parse("file:cache").unwrap()).path(),
		"/tmp/cache"
	);
}

#[test]
fn test_scheme_and_path_setters() {
	let mut uri = Uri::parse("//host/index").unwrap();
	uri.set_scheme(Scheme::Https).unwrap();
	assert_eq!(uri.to_string(), "https://host/index");

	assert!(uri.set_path("relative").is_err());
	uri.set_path("//other//page").unwrap();
	assert_eq!(uri.path(), "//other/page");

	let mut local = Uri::parse("a").unwrap();
	assert!(local.set_scheme(Scheme::Http).is_err());
	assert_eq!(local.scheme(), Scheme::Cpath);
}

#[test]
fn test_equality_includes_scheme() {
	let a = Uri::parse("cpath:/tmp").unwrap();
	let b = Uri::parse("file:/tmp").unwrap();
	assert_ne!(a, b);
	assert_eq!(a.path(), b.path());
}

#[test]
fn test_serde_as_string() {
	let uri = Uri::parse("//Root/a").unwrap();
	let json = serde_json::to_string(&uri).unwrap();
	assert_eq!(json, "\"cpath://Root/a\"");
	let back: Uri = serde_json::from_str(&json).unwrap();
	assert_eq!(back, uri);
	assert!(serde_json::from_str::<Uri>("\"gopher:x\"").is_err());
}

fn cpath_strategy() -> impl Strategy<Value = String> {
	(
		prop::bool::ANY,
		prop::collection::vec("[A-Za-z_][A-Za-z0-9_.]{0,6}", 0..5),
	)
		.prop_map(|(rooted, segments)| {
			let body = segments.join("/");
			if rooted { format!("//{body}") } else { body }
		})
}

proptest! {
	#[test]
	fn display_reparses_to_equal(
		path in cpath_strategy(),
		scheme in prop::sample::select(vec![Scheme::Cpath, Scheme::File]),
	) {
		let uri = Uri::new(scheme, &path).unwrap();
		let reparsed = Uri::parse(&uri.to_string()).unwrap();
		prop_assert_eq!(reparsed, uri);
	}

	#[test]
	fn base_path_and_name_rejoin(path in cpath_strategy()) {
		let uri = Uri::new(Scheme::Cpath, &path).unwrap();
		prop_assume!(!uri.name().is_empty());
		let rejoined = uri.base_path() / uri.name();
		prop_assert_eq!(rejoined, uri);
	}
}
