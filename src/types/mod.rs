//! AVM value types
//!
//! This module defines the value types stored in AVM fields and their wire form.

pub mod value;

pub use value::{AvmValue, FieldKey, WireValue};
