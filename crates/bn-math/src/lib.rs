//! Bayesian network math utilities.

pub mod math;

pub use math::radix::{checked_product, row_digits, row_index, try_row_index, MixedRadix};
pub use math::stable::*;
