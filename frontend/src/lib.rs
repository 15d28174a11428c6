//! Filedrop - Frontend Rust/Leptos Application
//!
//! A WebAssembly widget that uploads a single file, either straight to
//! the Filedrop server or to a pre-signed storage destination, and sends
//! the browser to the file page once the upload is stored.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  UploadPage                                                  │
//! │  ├── Hero (title, description)                              │
//! │  ├── UploadWidget                                           │
//! │  │   ├── drop view (drop zone + hidden file input)          │
//! │  │   ├── confirm view (file name, UploadProgress, buttons)  │
//! │  │   └── ErrorModal                                         │
//! │  └── Footer                                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`] - Endpoints, element ids, destination mode
//! - [`types`] - Common types (SelectedFile, UploadDescriptor, UploadError)
//! - [`state`] - Upload state machine, free of DOM access
//! - [`components`] - UI components
//! - [`services`] - Network transfer and navigation

use leptos::*;
use leptos_meta::*;
use leptos_router::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod types;
pub mod state;
pub mod components;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::{UploadMode, UPLOAD_ENDPOINT, FILE_PAGE_PREFIX};

// Types
pub use types::{
    // Selection
    SelectedFile, ViewState,
    // API
    UploadDescriptor,
    // Errors
    UploadError, UploadResult,
};

// State
pub use state::{Completion, SelectionOutcome, UploadFlow, UploadPhase};

// Components
pub use components::*;

// =============================================================================
// Application Entry Point
// =============================================================================

/// Install the panic hook and console logger, then mount the app.
pub fn run() {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Debug);

    log::info!("🦀 Filedrop - Starting Leptos App");

    mount_to_body(|| view! { <App/> });
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Filedrop"/>
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=UploadPage/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn UploadPage() -> impl IntoView {
    let mode = UploadMode::detect();
    log::info!("Upload mode: {}", mode);

    view! {
        <div class="container">
            <Hero mode=mode/>
            <UploadWidget mode=mode/>
        </div>

        <Footer/>
    }
}
