//! UI Components for the Filedrop application.
//!
//! # Layout Components
//! - [`Hero`] - Main title and description
//! - [`Footer`] - Page footer
//!
//! # Feature Components
//! - [`UploadWidget`] - Single-file upload with drag & drop
//! - [`UploadProgress`] - Transfer progress indicator
//! - [`ErrorModal`] - Generic upload error dialog

mod hero;
mod upload;
mod progress;
mod modal;
mod footer;

pub use hero::*;
pub use upload::*;
pub use progress::*;
pub use modal::*;
pub use footer::*;
