//! Scheme + path addressing values.
//!
//! A [`Uri`] names either a node inside a component tree (`cpath` scheme) or an
//! external resource (`file`, `http`, `https`). Component paths are absolute
//! when they start with the [`ROOT_MARKER`], e.g. `cpath://Root/Tools/mesher`.
//!
//! Paths are normalized on construction: repeated separators collapse into one,
//! a leading root marker is preserved, and trailing separators are dropped.

use std::fmt;
use std::ops::Div;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[cfg(test)]
mod tests;

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// Prefix marking an absolute component path.
pub const ROOT_MARKER: &str = "//";

/// Recognized URI schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Scheme {
	/// Path inside a component tree.
	#[default]
	Cpath,
	/// Local file system path.
	File,
	/// Remote resource over plain HTTP.
	Http,
	/// Remote resource over HTTPS.
	Https,
}

impl Scheme {
	/// Every recognized scheme, in declaration order.
	pub const ALL: [Scheme; 4] = [Scheme::Cpath, Scheme::File, Scheme::Http, Scheme::Https];

	/// Returns the scheme token without the trailing `:`.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Cpath => "cpath",
			Self::File => "file",
			Self::Http => "http",
			Self::Https => "https",
		}
	}

	/// Looks up a scheme by its token.
	pub fn from_token(token: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|s| s.as_str() == token)
	}

	fn requires_authority(self) -> bool {
		matches!(self, Self::Http | Self::Https)
	}
}

impl fmt::Display for Scheme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Scheme {
	type Err = UriError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_token(s).ok_or_else(|| UriError::InvalidScheme {
			scheme: s.to_string(),
			input: s.to_string(),
		})
	}
}

/// Errors produced while parsing or editing a [`Uri`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UriError {
	/// The scheme token is not one of [`Scheme::ALL`].
	#[error("invalid URI scheme {scheme:?} in {input:?}")]
	InvalidScheme { scheme: String, input: String },
	/// The path is not acceptable for its scheme.
	#[error("malformed {scheme} path {path:?}: {reason}")]
	Protocol {
		scheme: Scheme,
		path: String,
		reason: &'static str,
	},
}

/// A scheme + path addressing value.
///
/// Equality compares scheme and normalized path together.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Uri {
	scheme: Scheme,
	path: String,
}

impl Uri {
	/// Parses `input`, defaulting to [`Scheme::Cpath`] when no scheme token is present.
	pub fn parse(input: &str) -> Result<Self, UriError> {
		let (scheme, path) = split_scheme(input)?;
		Self::new(scheme, path)
	}

	/// Builds a URI from an explicit scheme and a raw path.
	pub fn new(scheme: Scheme, path: &str) -> Result<Self, UriError> {
		let path = validate(scheme, path)?;
		Ok(Self { scheme, path })
	}

	/// The absolute component path of a root named `root`.
	pub fn root(root: &str) -> Self {
		Self {
			scheme: Scheme::Cpath,
			path: normalize(&format!("{ROOT_MARKER}{root}")),
		}
	}

	/// Returns the scheme.
	pub fn scheme(&self) -> Scheme {
		self.scheme
	}

	/// Changes the scheme, re-validating the current path against it.
	pub fn set_scheme(&mut self, scheme: Scheme) -> Result<(), UriError> {
		validate(scheme, &self.path)?;
		self.scheme = scheme;
		Ok(())
	}

	/// Returns the normalized path remainder (everything after `scheme:`).
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Replaces the path remainder, keeping the scheme.
	pub fn set_path(&mut self, path: &str) -> Result<(), UriError> {
		self.path = validate(self.scheme, path)?;
		Ok(())
	}

	/// Returns `true` when the path is empty.
	pub fn is_empty(&self) -> bool {
		self.path.is_empty()
	}

	/// Returns `true` for rooted paths.
	///
	/// Component paths are rooted by the doubled [`ROOT_MARKER`]; other schemes by
	/// a single leading separator.
	pub fn is_absolute(&self) -> bool {
		match self.scheme {
			Scheme::Cpath => self.path.starts_with(ROOT_MARKER),
			_ => self.path.starts_with(SEPARATOR),
		}
	}

	/// Returns `true` for paths that are not absolute.
	pub fn is_relative(&self) -> bool {
		!self.is_absolute()
	}

	/// Returns `true` when no `.` or `..` segments remain.
	pub fn is_complete(&self) -> bool {
		self.segments().all(|s| s != "." && s != "..")
	}

	/// Iterates over the non-empty path segments.
	pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
		self.path.split(SEPARATOR).filter(|s| !s.is_empty())
	}

	/// Returns the final segment, or an empty string for a bare root marker.
	pub fn name(&self) -> &str {
		let body = &self.path[self.prefix_len()..];
		match body.rfind(SEPARATOR) {
			Some(i) => &body[i + 1..],
			None => body,
		}
	}

	/// Returns this URI with the final segment removed.
	pub fn base_path(&self) -> Uri {
		let prefix = self.prefix_len();
		let cut = match self.path[prefix..].rfind(SEPARATOR) {
			Some(i) => prefix + i,
			None => prefix,
		};
		Self {
			scheme: self.scheme,
			path: self.path[..cut].to_string(),
		}
	}

	/// Returns the extension of [`Uri::name`] including its leading dot.
	///
	/// Meaningful for the `file` scheme; names starting with a dot have no extension.
	pub fn extension(&self) -> &str {
		let name = self.name();
		match name.rfind('.') {
			Some(i) if i > 0 => &name[i..],
			_ => "",
		}
	}

	/// Returns [`Uri::name`] without its extension.
	pub fn base_name(&self) -> &str {
		let name = self.name();
		&name[..name.len() - self.extension().len()]
	}

	/// Appends `rhs` as one or more path segments.
	///
	/// An empty receiver yields `rhs` under the receiver's scheme.
	pub fn join(&self, rhs: &str) -> Uri {
		let joined = if self.path.is_empty() {
			rhs.to_string()
		} else if rhs.is_empty() {
			return self.clone();
		} else if self.path.ends_with(SEPARATOR) {
			format!("{}{rhs}", self.path)
		} else {
			format!("{}{SEPARATOR}{rhs}", self.path)
		};
		Self {
			scheme: self.scheme,
			path: normalize(&joined),
		}
	}

	/// Appends `rhs` when it is relative and shares the receiver's scheme.
	///
	/// An absolute `rhs`, or one under another scheme, is returned unchanged
	/// in place of the receiver, as a rooted path replaces the base it is
	/// joined onto.
	pub fn join_uri(&self, rhs: &Uri) -> Uri {
		if rhs.is_absolute() || rhs.scheme != self.scheme {
			return rhs.clone();
		}
		self.join(&rhs.path)
	}

	fn prefix_len(&self) -> usize {
		self.path.chars().take(2).take_while(|&c| c == SEPARATOR).count()
	}
}

impl fmt::Display for Uri {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.scheme, self.path)
	}
}

impl fmt::Debug for Uri {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Uri({self})")
	}
}

impl FromStr for Uri {
	type Err = UriError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<&str> for Uri {
	type Error = UriError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::parse(value)
	}
}

impl Div<&str> for &Uri {
	type Output = Uri;

	fn div(self, rhs: &str) -> Uri {
		self.join(rhs)
	}
}

impl Div<&str> for Uri {
	type Output = Uri;

	fn div(self, rhs: &str) -> Uri {
		self.join(rhs)
	}
}

/// See [`Uri::join_uri`].
impl Div<&Uri> for &Uri {
	type Output = Uri;

	fn div(self, rhs: &Uri) -> Uri {
		self.join_uri(rhs)
	}
}

impl Serialize for Uri {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Uri {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		Uri::parse(&raw).map_err(serde::de::Error::custom)
	}
}

/// Splits a leading `scheme:` token off `input`.
///
/// Text before the first `:` only counts as a scheme when it looks like one;
/// a scheme-shaped token that is not recognized is an error.
fn split_scheme(input: &str) -> Result<(Scheme, &str), UriError> {
	let Some(colon) = input.find(':') else {
		return Ok((Scheme::Cpath, input));
	};
	let token = &input[..colon];
	if !is_scheme_token(token) {
		return Ok((Scheme::Cpath, input));
	}
	match Scheme::from_token(token) {
		Some(scheme) => Ok((scheme, &input[colon + 1..])),
		None => Err(UriError::InvalidScheme {
			scheme: token.to_string(),
			input: input.to_string(),
		}),
	}
}

fn is_scheme_token(token: &str) -> bool {
	let mut chars = token.chars();
	chars.next().is_some_and(|c| c.is_ascii_alphabetic())
		&& chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn validate(scheme: Scheme, path: &str) -> Result<String, UriError> {
	if path.chars().any(char::is_control) {
		return Err(UriError::Protocol {
			scheme,
			path: path.to_string(),
			reason: "control characters are not allowed",
		});
	}
	let normalized = normalize(path);
	if scheme.requires_authority() {
		let authority = normalized
			.strip_prefix(ROOT_MARKER)
			.and_then(|rest| rest.split(SEPARATOR).next())
			.unwrap_or_default();
		if authority.is_empty() {
			return Err(UriError::Protocol {
				scheme,
				path: path.to_string(),
				reason: "expected `//host` authority",
			});
		}
	}
	Ok(normalized)
}

/// Collapses repeated separators, keeping a leading root marker.
fn normalize(path: &str) -> String {
	let mut out = String::with_capacity(path.len());
	if path.starts_with(ROOT_MARKER) {
		out.push_str(ROOT_MARKER);
	} else if path.starts_with(SEPARATOR) {
		out.push(SEPARATOR);
	}
	let mut first = true;
	for segment in path.split(SEPARATOR).filter(|s| !s.is_empty()) {
		if !first {
			out.push(SEPARATOR);
		}
		out.push_str(segment);
		first = false;
	}
	out
}
