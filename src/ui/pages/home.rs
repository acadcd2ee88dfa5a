use leptos::prelude::*;

/// Landing page under the navbar
#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <main class="home">
            <h1 class="home-title">"Find your next pair"</h1>
            <p class="home-subtitle">
                "SoleLink connects sneaker buyers with local vendors."
            </p>
        </main>
    }
}
