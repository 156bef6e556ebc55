//! Hierarchical component tree with links, capabilities and signals.
//!
//! A [`Tree`] owns named nodes addressed by [`NodeId`] handles or [`Uri`]
//! paths. Nodes carry an optional payload, the [`Capability`] views it
//! satisfies and a table of named [`Signal`]s. A [`Dispatcher`] resolves a
//! path and fires a signal with an argument [`Frame`].
//!
//! Every error is built through an [`ErrorPolicy`], which decides whether it
//! is logged, whether a backtrace is dumped and whether the process aborts.

pub mod capability;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod policy;
pub mod signal;
pub mod tree;

pub use arbor_uri::{Scheme, Uri, UriError};
pub use capability::{Capability, Implements};
pub use dispatch::{Dispatcher, LocalDispatcher};
pub use error::{CodeLocation, Error, ErrorKind, Result};
pub use frame::{Frame, FrameError, FromValue, Value};
pub use policy::{ErrorPolicy, PolicyFlags};
pub use signal::{Signal, SignalCall, SignalHandler};
pub use tree::{Component, Node, NodeId, NodeKind, Tree};
