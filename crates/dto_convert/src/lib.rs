#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod converter;
mod error;
mod registry;

// -----------------------------------------------------------------------------
// Exports

pub use converter::{ConverterFactory, ValueConverter};
pub use error::ConvertError;
pub use registry::{ConverterRegistry, ConverterRegistryArc, MAX_DEPTH};
