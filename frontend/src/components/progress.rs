use leptos::*;
use crate::config::ids;

/// Upload progress indicator, hidden outside a transfer.
#[component]
pub fn UploadProgress(
    /// Percentage in `[0, 100]`
    #[prop(into)]
    value: Signal<f64>,
    #[prop(into)]
    visible: Signal<bool>,
) -> impl IntoView {
    view! {
        <progress
            id=ids::PROGRESS
            class="progress"
            class:hidden=move || !visible.get()
            max="100"
            prop:value=move || value.get()
        ></progress>
    }
}
