//! Argument frames passed to signals.
//!
//! A [`Frame`] is an ordered list of named [`Value`]s. Arrays hold values of a
//! single scalar type and do not nest. Once finalized, a frame rejects further
//! edits; dispatchers finalize before firing.

use arbor_uri::Uri;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// A typed frame entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
	String(String),
	Bool(bool),
	Int(i64),
	Real(f64),
	Uri(Uri),
	Array(Vec<Value>),
}

impl Value {
	/// Returns the type name used in mismatch reports.
	pub fn type_name(&self) -> &'static str {
		match self {
			Self::String(_) => "string",
			Self::Bool(_) => "bool",
			Self::Int(_) => "integer",
			Self::Real(_) => "real",
			Self::Uri(_) => "uri",
			Self::Array(_) => "array",
		}
	}

	fn check_array(&self) -> Result<(), &'static str> {
		let Self::Array(items) = self else {
			return Ok(());
		};
		let Some(first) = items.first() else {
			return Ok(());
		};
		if items.iter().any(|v| matches!(v, Self::Array(_))) {
			return Err("must not contain nested arrays");
		}
		if items.iter().any(|v| v.type_name() != first.type_name()) {
			return Err("must hold values of a single type");
		}
		Ok(())
	}
}

macro_rules! impl_value_from {
	($($ty:ty => $variant:ident),* $(,)?) => {
		$(
			impl From<$ty> for Value {
				fn from(v: $ty) -> Self {
					Value::$variant(v.into())
				}
			}
		)*
	};
}

impl_value_from! {
	String => String,
	&str => String,
	bool => Bool,
	i64 => Int,
	i32 => Int,
	u32 => Int,
	f64 => Real,
	Uri => Uri,
}

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(items: Vec<T>) -> Self {
		Value::Array(items.into_iter().map(Into::into).collect())
	}
}

/// Extraction of a typed value from a [`Value`].
pub trait FromValue: Sized {
	/// Type name reported on mismatch.
	const TYPE_NAME: &'static str;

	fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
	const TYPE_NAME: &'static str = "string";

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::String(s) => Some(s.clone()),
			_ => None,
		}
	}
}

impl FromValue for bool {
	const TYPE_NAME: &'static str = "bool";

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}
}

impl FromValue for i64 {
	const TYPE_NAME: &'static str = "integer";

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Int(i) => Some(*i),
			_ => None,
		}
	}
}

impl FromValue for f64 {
	const TYPE_NAME: &'static str = "real";

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Real(r) => Some(*r),
			_ => None,
		}
	}
}

impl FromValue for Uri {
	const TYPE_NAME: &'static str = "uri";

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Uri(u) => Some(u.clone()),
			_ => None,
		}
	}
}

impl<T: FromValue> FromValue for Vec<T> {
	const TYPE_NAME: &'static str = "array";

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Array(items) => items.iter().map(T::from_value).collect(),
			_ => None,
		}
	}
}

/// Errors from building or reading a [`Frame`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
	#[error("argument frame is finalized; cannot change {0:?}")]
	Finalized(String),
	#[error("argument {0:?} not found")]
	Missing(String),
	#[error("argument {name:?} is {actual}, expected {expected}")]
	TypeMismatch {
		name: String,
		expected: &'static str,
		actual: &'static str,
	},
	#[error("array argument {name:?} {reason}")]
	BadArray { name: String, reason: &'static str },
}

impl FrameError {
	/// Maps the failure onto the core error taxonomy.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Missing(_) => ErrorKind::ValueNotFound,
			_ => ErrorKind::BadValue,
		}
	}
}

/// Ordered, named signal arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFrame")]
pub struct Frame {
	entries: IndexMap<String, Value>,
	#[serde(skip)]
	finalized: bool,
}

/// Serialized form of a [`Frame`], validated on the way in.
#[derive(Deserialize)]
struct RawFrame {
	entries: IndexMap<String, Value>,
}

impl TryFrom<RawFrame> for Frame {
	type Error = FrameError;

	fn try_from(raw: RawFrame) -> Result<Self, FrameError> {
		let mut frame = Frame::new();
		for (name, value) in raw.entries {
			frame.set(&name, value)?;
		}
		Ok(frame)
	}
}

impl Frame {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `name` to `value`, keeping the position of an existing entry.
	pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, FrameError> {
		if self.finalized {
			return Err(FrameError::Finalized(name.to_string()));
		}
		let value = value.into();
		value.check_array().map_err(|reason| FrameError::BadArray {
			name: name.to_string(),
			reason,
		})?;
		self.entries.insert(name.to_string(), value);
		Ok(self)
	}

	/// Builder-style [`Frame::set`].
	pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, FrameError> {
		self.set(name, value)?;
		Ok(self)
	}

	/// Removes an entry, returning its value.
	pub fn remove(&mut self, name: &str) -> Result<Value, FrameError> {
		if self.finalized {
			return Err(FrameError::Finalized(name.to_string()));
		}
		self.entries
			.shift_remove(name)
			.ok_or_else(|| FrameError::Missing(name.to_string()))
	}

	/// Reads `name` as `T`.
	pub fn get<T: FromValue>(&self, name: &str) -> Result<T, FrameError> {
		let value = self
			.entries
			.get(name)
			.ok_or_else(|| FrameError::Missing(name.to_string()))?;
		T::from_value(value).ok_or_else(|| FrameError::TypeMismatch {
			name: name.to_string(),
			expected: T::TYPE_NAME,
			actual: value.type_name(),
		})
	}

	pub fn value(&self, name: &str) -> Option<&Value> {
		self.entries.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Freezes the frame; later edits fail with [`FrameError::Finalized`].
	pub fn finalize(&mut self) {
		self.finalized = true;
	}

	pub fn is_finalized(&self) -> bool {
		self.finalized
	}
}
