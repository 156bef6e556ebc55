//! Exception and assertion policy.
//!
//! The policy is consulted when an error is built, not when it is caught: an
//! error raised with `abort` set ends the process before any unwinding.

use std::backtrace::Backtrace;

use arbor_uri::UriError;
use serde::{Deserialize, Serialize};

use crate::error::{CodeLocation, Error, ErrorKind, Result};

/// Reactions to one class of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyFlags {
	/// Log the failure at `error` level.
	pub echo: bool,
	/// Capture and log a backtrace.
	pub dump_backtrace: bool,
	/// Abort the process immediately.
	pub abort: bool,
}

impl PolicyFlags {
	pub const fn new(echo: bool, dump_backtrace: bool, abort: bool) -> Self {
		Self {
			echo,
			dump_backtrace,
			abort,
		}
	}

	fn report(&self, class: &str, kind: ErrorKind, message: &str, location: CodeLocation) {
		if self.echo {
			tracing::error!(%kind, %location, "{class}: {message}");
		}
		if self.dump_backtrace {
			let backtrace = Backtrace::force_capture();
			tracing::error!(%kind, %location, "{class} backtrace:\n{backtrace}");
		}
		if self.abort {
			tracing::error!(%kind, %location, "aborting on {class}");
			std::process::abort();
		}
	}
}

/// Process-wide reactions to raised errors and failed invariant checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorPolicy {
	/// Applied to every raised error.
	pub exceptions: PolicyFlags,
	/// Applied to every failed invariant check.
	pub assertions: PolicyFlags,
}

impl Default for ErrorPolicy {
	fn default() -> Self {
		Self {
			exceptions: PolicyFlags::new(true, false, false),
			assertions: PolicyFlags::new(true, true, false),
		}
	}
}

impl ErrorPolicy {
	/// A policy that neither logs nor aborts.
	pub const fn quiet() -> Self {
		Self {
			exceptions: PolicyFlags::new(false, false, false),
			assertions: PolicyFlags::new(false, false, false),
		}
	}

	/// Builds an error at the caller's location and applies the exception flags.
	#[track_caller]
	pub fn raise(&self, kind: ErrorKind, message: impl Into<String>) -> Error {
		self.raise_at(kind, message.into(), CodeLocation::caller())
	}

	/// Builds an error at an explicit location and applies the exception flags.
	pub fn raise_at(&self, kind: ErrorKind, message: String, location: CodeLocation) -> Error {
		self.exceptions.report("error", kind, &message, location);
		Error::new(kind, message, location)
	}

	/// Converts a URI parse failure into a raised error.
	#[track_caller]
	pub fn raise_uri(&self, err: &UriError) -> Error {
		let kind = match err {
			UriError::InvalidScheme { .. } => ErrorKind::InvalidUri,
			UriError::Protocol { .. } => ErrorKind::Protocol,
		};
		self.raise(kind, err.to_string())
	}

	/// Checks an invariant.
	///
	/// On failure the assertion flags apply first; `abort` halts
	/// unconditionally, otherwise a [`ErrorKind::FailedAssertion`] is raised.
	#[track_caller]
	pub fn check(&self, condition: bool, message: impl FnOnce() -> String) -> Result<()> {
		if condition {
			return Ok(());
		}
		Err(self.assertion_failed_at(message(), CodeLocation::caller()))
	}

	/// Reports an invariant that is known to be violated.
	#[track_caller]
	pub fn assertion_failed(&self, message: impl Into<String>) -> Error {
		self.assertion_failed_at(message.into(), CodeLocation::caller())
	}

	/// Only the assertion flags apply; the exception flags are not consulted.
	fn assertion_failed_at(&self, message: String, location: CodeLocation) -> Error {
		self.assertions
			.report("assertion", ErrorKind::FailedAssertion, &message, location);
		Error::new(ErrorKind::FailedAssertion, message, location)
	}
}

/// Checks an invariant against a policy, returning early with the raised error.
///
/// ```ignore
/// ensure!(tree.policy(), depth < 64, "tree deeper than {depth}");
/// ```
#[macro_export]
macro_rules! ensure {
	($policy:expr, $cond:expr, $($fmt:tt)+) => {
		$policy.check($cond, || format!($($fmt)+))?
	};
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_raise_records_caller_location() {
		let policy = ErrorPolicy::quiet();
		let line = line!() + 1;
		let err = policy.raise(ErrorKind::BadValue, "nope");
		assert_eq!(err.kind(), ErrorKind::BadValue);
		assert_eq!(err.message(), "nope");
		assert_eq!(err.location().line, line);
		assert!(err.location().file.ends_with("policy.rs"));
		assert!(err.description().contains("BadValue"));
		assert_eq!(err.to_string(), "BadValue: nope");
	}

	#[test]
	fn test_check_passes_and_fails() {
		let policy = ErrorPolicy::quiet();
		assert!(policy.check(true, || unreachable!()).is_ok());
		let err = policy.check(1 > 2, || "one is not greater".into()).unwrap_err();
		assert!(err.is(ErrorKind::FailedAssertion));
	}

	#[test]
	fn test_assertions_ignore_exception_abort() {
		let policy = ErrorPolicy {
			exceptions: PolicyFlags::new(false, false, true),
			assertions: PolicyFlags::new(false, false, false),
		};
		let line = line!() + 1;
		let err = policy.assertion_failed("checked");
		assert!(err.is(ErrorKind::FailedAssertion));
		assert_eq!(err.location().line, line);
		let err = policy.check(false, || "checked again".into()).unwrap_err();
		assert_eq!(err.message(), "checked again");
	}

	#[test]
	fn test_ensure_macro_returns_early() {
		fn guarded(value: u32) -> Result<u32> {
			let policy = ErrorPolicy::quiet();
			ensure!(policy, value < 10, "value {value} out of range");
			Ok(value * 2)
		}

		assert_eq!(guarded(3).unwrap(), 6);
		let err = guarded(12).unwrap_err();
		assert_eq!(err.message(), "value 12 out of range");
	}

	#[test]
	fn test_echo_does_not_change_result() {
		let _ = tracing_subscriber::fmt::try_init();
		let policy = ErrorPolicy::default();
		let err = policy.raise(ErrorKind::ValueNotFound, "echoed");
		assert!(err.is(ErrorKind::ValueNotFound));
	}

	#[test]
	fn test_uri_errors_map_to_kinds() {
		let policy = ErrorPolicy::quiet();
		let scheme = arbor_uri::Uri::parse("gopher:x").unwrap_err();
		assert!(policy.raise_uri(&scheme).is(ErrorKind::InvalidUri));
		let protocol = arbor_uri::Uri::parse("http:/x").unwrap_err();
		assert!(policy.raise_uri(&protocol).is(ErrorKind::Protocol));
	}

	#[test]
	fn test_defaults() {
		let policy = ErrorPolicy::default();
		assert!(policy.exceptions.echo);
		assert!(!policy.exceptions.abort);
		assert!(policy.assertions.dump_backtrace);
	}
}
