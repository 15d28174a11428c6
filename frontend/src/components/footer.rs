use leptos::*;

/// Retention notice and the about link; uploads expire server-side.
#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer>
            <div class="retention">"Links stay valid for ten minutes after upload."</div>
            <div class="footer-links">
                <a href="/about" class="footer-link">"About Filedrop"</a>
            </div>
        </footer>
    }
}
