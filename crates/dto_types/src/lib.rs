#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod descriptor;
mod policy;
mod type_set;

// -----------------------------------------------------------------------------
// Exports

pub use descriptor::{Primitive, TypeDescriptor};
pub use policy::DefaultPolicy;
pub use type_set::TypeSet;
