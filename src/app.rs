use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use crate::core::BackendClient;
use crate::core::config::BackendConfig;
use crate::ui::{HomePage, Navbar, NotFoundPage, provide_backend_client_or_else};

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone() />
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    // The server provides one client for every request; the browser builds its own
    provide_backend_client_or_else(|| BackendClient::from_config(&BackendConfig::from_env()));

    view! {
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href="/pkg/solelink.css"/>

        <Title text="SoleLink"/>

        <Router>
            <Navbar/>
            <Routes fallback=NotFoundPage>
                <Route path=path!("") view=HomePage/>
            </Routes>
        </Router>
    }
}
