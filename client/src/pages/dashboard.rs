//! Signed-in landing route.
//!
//! SYSTEM CONTEXT
//! ==============
//! Requires a stored session. Shows the signed-in role next to the SDG 4
//! widget and offers sign-out, which clears both storage keys.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::components::sdg_dashboard::SdgDashboard;
use crate::state::session::{self, SessionState};
use crate::util::auth::install_unauth_redirect;

/// Dashboard page. Redirects to `/` if nobody is signed in.
#[component]
pub fn DashboardPage() -> impl IntoView {
    let state = expect_context::<RwSignal<SessionState>>();
    let navigate = use_navigate();

    install_unauth_redirect(state, navigate.clone());

    let role_label = move || {
        state
            .with(|s| s.session.as_ref().map(session::Session::role_label))
            .unwrap_or_default()
    };

    let on_sign_out = move |_| {
        state.set(session::clear());
        navigate("/", NavigateOptions::default());
    };

    view! {
        <main class="dashboard">
            <header class="dashboard__header">
                <div>
                    <h1 class="dashboard__title">"Asili SSMS"</h1>
                    <p class="dashboard__role">
                        "Signed in as "
                        <span class="dashboard__role-name">{role_label}</span>
                    </p>
                </div>
                <button class="dashboard__sign-out" on:click=on_sign_out>
                    "Sign Out"
                </button>
            </header>
            <Show when=move || state.with(SessionState::is_authenticated)>
                <SdgDashboard/>
            </Show>
        </main>
    }
}
