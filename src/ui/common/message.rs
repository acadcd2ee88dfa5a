//! Status line for the outcome of a sign-in attempt

use leptos::prelude::*;

use crate::core::{AuthMessage, MessageKind};
use crate::ui::{Icon, icons};

/// Shows the latest [`AuthMessage`], colored by its kind; hidden when `None`
#[component]
pub fn StatusMessage(
    #[prop(into)]
    message: Signal<Option<AuthMessage>>,
) -> impl IntoView {
    view! {
        {move || message.get().map(|message| {
            let (class, icon) = match message.kind {
                MessageKind::Success => ("status-message success-message", icons::CHECK),
                MessageKind::Failure => ("status-message error-message", icons::ALERT_CIRCLE),
            };
            view! {
                <div class=class role="status">
                    <Icon name=icon class="icon-text"/>
                    <span>{message.text}</span>
                </div>
            }
        })}
    }
}
