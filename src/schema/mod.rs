//! AVM field schema
//!
//! Declares every field of every supported AVM version, with the validation
//! and XML encoding rules of each field.

pub mod descriptor;
pub mod spec;
pub mod vocabulary;

pub use descriptor::{FieldDescriptor, LengthConstraint, ValueKind};
pub use spec::{Spec, SpecDiff, SpecVersion};
pub use vocabulary::{CaseTransform, Vocabulary};
