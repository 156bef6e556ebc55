use std::fmt;
use std::panic::Location;

/// Category of a raised [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Registration-time misuse: duplicate type name, invalid capability pairing.
	Setup,
	/// Missing child, missing signal, unresolved link or stale handle.
	ValueNotFound,
	/// Sibling name collision.
	ValueExists,
	/// Invalid or ambiguous value.
	BadValue,
	/// A node does not satisfy the requested capability.
	CastingFailed,
	/// Unrecognized URI scheme.
	InvalidUri,
	/// Path not acceptable for its scheme.
	Protocol,
	/// Link cycle or violated structural invariant.
	InvalidStructure,
	/// An invariant check failed.
	FailedAssertion,
}

impl ErrorKind {
	/// Returns the kind name used in reports.
	pub const fn name(self) -> &'static str {
		match self {
			Self::Setup => "SetupError",
			Self::ValueNotFound => "ValueNotFound",
			Self::ValueExists => "ValueExists",
			Self::BadValue => "BadValue",
			Self::CastingFailed => "CastingFailed",
			Self::InvalidUri => "InvalidURI",
			Self::Protocol => "ProtocolError",
			Self::InvalidStructure => "InvalidStructure",
			Self::FailedAssertion => "FailedAssertion",
		}
	}
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Source position where an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeLocation {
	pub file: &'static str,
	pub line: u32,
	pub column: u32,
}

impl CodeLocation {
	/// Captures the location of the caller.
	#[track_caller]
	pub fn caller() -> Self {
		let location = Location::caller();
		Self {
			file: location.file(),
			line: location.line(),
			column: location.column(),
		}
	}
}

impl fmt::Display for CodeLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.file, self.line, self.column)
	}
}

/// Structured error payload.
///
/// Built through [`ErrorPolicy::raise`](crate::ErrorPolicy::raise) so the
/// process policy sees every error at construction time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
	kind: ErrorKind,
	message: String,
	location: CodeLocation,
}

impl Error {
	pub(crate) fn new(kind: ErrorKind, message: String, location: CodeLocation) -> Self {
		Self {
			kind,
			message,
			location,
		}
	}

	pub fn kind(&self) -> ErrorKind {
		self.kind
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn location(&self) -> CodeLocation {
		self.location
	}

	/// Returns `true` if this error is of `kind`.
	pub fn is(&self, kind: ErrorKind) -> bool {
		self.kind == kind
	}

	/// Formats the full report: location, kind and message.
	pub fn description(&self) -> String {
		format!(
			"+++ {} raised +++\nFrom    : {}\nMessage : {}",
			self.kind, self.location, self.message
		)
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
