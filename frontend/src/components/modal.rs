//! Generic error dialog.
//!
//! Every failed upload ends here with the same message; details go to
//! the console log only.

use leptos::*;
use crate::config::ids;

#[component]
pub fn ErrorModal(
    #[prop(into)]
    open: Signal<bool>,
    /// Called when the user dismisses the dialog
    on_close: Callback<()>,
) -> impl IntoView {
    view! {
        <div id=ids::ERROR_MODAL class="modal" class:open=move || open.get()>
            <div class="modal-background" on:click=move |_| on_close.call(())></div>
            <div class="modal-content">
                <h2>"Upload failed"</h2>
                <p>"Something went wrong while uploading your file. Please try again."</p>
                <button class="modal-close" on:click=move |_| on_close.call(())>
                    "Close"
                </button>
            </div>
        </div>
    }
}
