//! Hero section: what the page does, in the order the widget asks for it.

use leptos::*;
use crate::config::UploadMode;

/// Where the bytes go, as told to the user.
pub fn destination_hint(mode: UploadMode) -> &'static str {
    match mode {
        UploadMode::Direct => "Your file is sent to this server.",
        UploadMode::External => "Your file goes straight to object storage with a one-time signed form.",
    }
}

#[component]
pub fn Hero(mode: UploadMode) -> impl IntoView {
    view! {
        <div class="hero">
            <h1>"Filedrop"</h1>
            <ol class="steps">
                <li>"Drop one file on the zone below, or click it to pick one."</li>
                <li>"Check the file name and press Upload."</li>
                <li>"You land on the file page with a link to share."</li>
            </ol>
            <p class="subtitle">{destination_hint(mode)}</p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_hint_follows_mode() {
        assert!(destination_hint(UploadMode::Direct).contains("this server"));
        assert!(destination_hint(UploadMode::External).contains("signed"));
    }
}
