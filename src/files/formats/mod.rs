//! Container formats
//!
//! Each structurally understood format implements
//! [`XmpContainer`](crate::files::handler::XmpContainer). Anything else goes
//! through raw packet scanning.

#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png")]
pub mod png;
pub mod scan;
