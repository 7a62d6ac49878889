#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod hash;
pub mod index;

// -----------------------------------------------------------------------------
// Top-level exports

pub use index::IndexMap;
