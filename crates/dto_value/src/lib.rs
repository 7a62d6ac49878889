#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod object;
mod serde;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use object::{Class, Object};
pub use value::{Map, Value, ValueKind};

/// The error type returned by user code plugged into the registries:
/// converters, listener hooks and their factories.
///
/// It is carried through unchanged to the caller.
pub type BoxError = alloc::boxed::Box<dyn core::error::Error + Send + Sync>;
