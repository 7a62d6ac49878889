#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod hook;
mod listener;
mod registry;

// -----------------------------------------------------------------------------
// Exports

pub use error::ListenError;
pub use hook::{Access, Hook};
pub use listener::{Listener, ListenerFactory};
pub use registry::{ListenerRegistry, ListenerRegistryArc};
