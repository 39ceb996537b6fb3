//! Utility types

pub mod datetime;

pub use datetime::{AvmDateTime, TimeOfDay};
