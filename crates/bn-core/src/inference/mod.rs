//! Inference: CPT lookup and exact enumeration.

pub mod cpt;
pub mod enumerate;

pub use cpt::{conditional_probability, LookupError};
pub use enumerate::{
    infer, Distribution, InferenceError, InferenceOptions, InferenceResult,
    DEFAULT_MAX_JOINT_STATES,
};
