//! Core math modules.

pub mod radix;
pub mod stable;
