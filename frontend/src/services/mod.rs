//! Browser-side services.
//!
//! # Services
//!
//! - [`upload`] - Descriptor fetch, progress-reporting transfer, navigation

pub mod upload;

pub use upload::*;
