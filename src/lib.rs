#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use dto_convert as convert;
pub use dto_listen as listen;
pub use dto_types as types;
pub use dto_utils as utils;
pub use dto_value as value;
