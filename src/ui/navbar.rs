//! Top navigation bar
//!
//! Reflects the current session: the signed-in email with a Logout button,
//! or a Login button that opens the [`AuthModal`].

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;

use crate::ui::auth::{AuthModal, logout, use_backend_client, use_session};
use crate::ui::icon::{Icon, icons};

const NAV_LINKS: [(&str, &str); 4] = [
    ("/", "Home"),
    ("/vendors", "Vendors"),
    ("/contactus", "Contact Us"),
    ("/chats", "Chats"),
];

#[component]
pub fn Navbar() -> impl IntoView {
    let client = StoredValue::new(use_backend_client());
    let session = use_session();
    let is_auth_modal_open = RwSignal::new(false);

    let handle_logout = move |_| {
        let client = client.get_value();
        spawn_local(async move {
            logout(&client).await;
        });
    };

    view! {
        <nav class="navbar">
            <A href="/" attr:class="navbar-logo">
                <Icon name=icons::SHOE class="w-7 h-7" />
                <span>"SoleLink"</span>
            </A>

            <ul class="navbar-links">
                {NAV_LINKS
                    .into_iter()
                    .map(|(href, label)| {
                        view! {
                            <li>
                                <A href=href attr:class="navbar-link">{label}</A>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>

            <div class="navbar-session">
                {move || match session.get() {
                    Some(user) => {
                        view! {
                            <span class="navbar-email">{user.email.unwrap_or_default()}</span>
                            <button type="button" class="btn-secondary" on:click=handle_logout>
                                "Logout"
                            </button>
                        }
                        .into_any()
                    }
                    None => {
                        view! {
                            <button
                                type="button"
                                class="btn-primary"
                                on:click=move |_| is_auth_modal_open.set(true)
                            >
                                "Login"
                            </button>
                        }
                        .into_any()
                    }
                }}
            </div>
        </nav>

        <AuthModal
            is_open=is_auth_modal_open
            on_close=Callback::new(move |_| is_auth_modal_open.set(false))
        />
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_link_targets() {
        assert_eq!(
            NAV_LINKS,
            [
                ("/", "Home"),
                ("/vendors", "Vendors"),
                ("/contactus", "Contact Us"),
                ("/chats", "Chats"),
            ]
        );
    }
}
