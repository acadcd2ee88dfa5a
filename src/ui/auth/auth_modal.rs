//! Authentication modal
//!
//! One dialog for login, registration (client or vendor) and Google sign-in.
//! The component only binds signals; the collaborator calls live in
//! [`AuthFlow`].

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::context::use_backend_client;
use crate::core::{
    AuthFlow, AuthMessage, AuthMode, CLOSE_DELAY, CredentialsForm, ModalState, Role,
};
use crate::ui::common::{FormField, StatusMessage};
use crate::ui::icon::{Icon, icons};

#[component]
pub fn AuthModal(
    /// Nothing is rendered while this is false
    #[prop(into)]
    is_open: Signal<bool>,
    /// Called on backdrop click, the close button, and after a successful sign-in
    #[prop(into)]
    on_close: Callback<()>,
) -> impl IntoView {
    let flow = StoredValue::new(AuthFlow::new(use_backend_client()));

    let state = RwSignal::new(ModalState::default());
    let pending = RwSignal::new(false);

    let is_register = move || state.with(|s| s.mode == AuthMode::Register);
    let is_vendor = move || state.with(|s| s.form.role == Role::Vendor);
    let message = Signal::derive(move || state.with(|s| s.message.clone()));

    let finish = move |outcome: AuthMessage| {
        pending.set(false);
        let mut close = false;
        state.update(|s| close = s.show_outcome(outcome));
        if close {
            set_timeout(
                move || {
                    state.update(ModalState::reset_after_close);
                    on_close.run(());
                },
                CLOSE_DELAY,
            );
        }
    };

    // Returns false when another request is still in flight
    let begin = move || {
        if pending.get_untracked() {
            return false;
        }
        pending.set(true);
        state.update(|s| s.message = None);
        true
    };

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let (mode, snapshot) = state.with_untracked(|s| (s.mode, s.form.clone()));
        if !snapshot.has_credentials() || !begin() {
            return;
        }
        let flow = flow.get_value();
        spawn_local(async move {
            finish(flow.submit_credentials(mode, &snapshot).await);
        });
    };

    let on_google = move |_| {
        if !begin() {
            return;
        }
        let flow = flow.get_value();
        spawn_local(async move {
            finish(flow.sign_in_with_google().await);
        });
    };

    let switch_mode = move |next: AuthMode| state.update(|s| s.switch_mode(next));

    let field = move |read: fn(&CredentialsForm) -> String| {
        Signal::derive(move || state.with(|s| read(&s.form)))
    };
    let edit = move |write: fn(&mut CredentialsForm, String)| {
        Callback::new(move |value: String| state.update(|s| write(&mut s.form, value)))
    };

    view! {
        <Show when=move || is_open.get()>
            <div class="modal-backdrop" on:click=move |_| on_close.run(())>
                <div
                    class="modal-body"
                    role="dialog"
                    aria-modal="true"
                    on:click=|ev| ev.stop_propagation()
                >
                    <div class="modal-header">
                        <h2 class="modal-title">"SoleLink"</h2>
                        <button
                            type="button"
                            class="icon-button"
                            aria-label="Close"
                            on:click=move |_| on_close.run(())
                        >
                            <Icon name=icons::X class="w-5 h-5" />
                        </button>
                    </div>

                    <div class="tab-row">
                        <button
                            type="button"
                            class="tab"
                            class:tab-active=move || !is_register()
                            on:click=move |_| switch_mode(AuthMode::Login)
                        >
                            "Login"
                        </button>
                        <button
                            type="button"
                            class="tab"
                            class:tab-active=is_register
                            on:click=move |_| switch_mode(AuthMode::Register)
                        >
                            "Register"
                        </button>
                    </div>

                    <form class="modal-form" on:submit=on_submit>
                        <FormField
                            label="Email"
                            input_type="email"
                            placeholder="you@example.com"
                            autocomplete="email"
                            required=true
                            value=field(|f| f.email.clone())
                            on_input=edit(|f, v| f.email = v)
                            disabled=pending
                        />
                        <FormField
                            label="Password"
                            input_type="password"
                            autocomplete="current-password"
                            required=true
                            value=field(|f| f.password.clone())
                            on_input=edit(|f, v| f.password = v)
                            disabled=pending
                        />

                        <div class="role-toggle">
                            <span class="form-label">"I am a:"</span>
                            <button
                                type="button"
                                class="role-option"
                                class:role-active=move || !is_vendor()
                                on:click=move |_| state.update(|s| s.form.role = Role::Client)
                            >
                                "Client"
                            </button>
                            <button
                                type="button"
                                class="role-option"
                                class:role-active=is_vendor
                                on:click=move |_| state.update(|s| s.form.role = Role::Vendor)
                            >
                                "Vendor"
                            </button>
                        </div>

                        <Show when=move || is_register() && is_vendor()>
                            <FormField
                                label="Business Name"
                                value=field(|f| f.vendor.business_name.clone())
                                on_input=edit(|f, v| f.vendor.business_name = v)
                                disabled=pending
                            />
                            <FormField
                                label="City"
                                value=field(|f| f.vendor.city.clone())
                                on_input=edit(|f, v| f.vendor.city = v)
                                disabled=pending
                            />
                            <FormField
                                label="Zip Code"
                                value=field(|f| f.vendor.zip_code.clone())
                                on_input=edit(|f, v| f.vendor.zip_code = v)
                                disabled=pending
                            />
                        </Show>

                        <StatusMessage message=message />

                        <button
                            type="submit"
                            class="btn-primary"
                            disabled=move || pending.get()
                        >
                            {move || {
                                if pending.get() {
                                    view! {
                                        <Icon name=icons::LOADER class="animate-spin w-4 h-4" />
                                    }
                                    .into_any()
                                } else if is_register() {
                                    view! { <span>"Create Account"</span> }.into_any()
                                } else {
                                    view! { <span>"Login"</span> }.into_any()
                                }
                            }}
                        </button>
                    </form>

                    <div class="separator">
                        <span>"OR"</span>
                    </div>

                    <button
                        type="button"
                        class="btn-google"
                        disabled=move || pending.get()
                        on:click=on_google
                    >
                        <Icon name=icons::GOOGLE class="w-5 h-5" />
                        <span>"Continue with Google"</span>
                    </button>
                </div>
            </div>
        </Show>
    }
}
