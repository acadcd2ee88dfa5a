//! 404 page for unknown routes

use leptos::prelude::*;
use leptos_router::components::A;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <main class="not-found">
            <h1 class="not-found-code">"404"</h1>
            <h2 class="not-found-title">"Page Not Found"</h2>
            <p class="not-found-text">
                "The page you're looking for doesn't exist or has been moved."
            </p>
            <A href="/" attr:class="btn-primary">"Go Home"</A>
        </main>
    }
}
