//! Email + password sign-in card.
//!
//! SYSTEM CONTEXT
//! ==============
//! Posts credentials once per submit to the token endpoint and hands the
//! resulting session to the parent page via `on_login`. The parent decides
//! where the session is stored and where to navigate.

#[cfg(test)]
#[path = "login_form_test.rs"]
mod login_form_test;

use leptos::prelude::*;

use crate::state::session::Session;

pub const SUBMIT_LABEL: &str = "Sign In";
pub const SUBMITTING_LABEL: &str = "Signing in...";
pub const MISSING_FIELDS_MESSAGE: &str = "Enter both email and password.";

/// Role blurbs shown under the form.
pub const ROLE_BLURBS: [(&str, &str); 3] = [
    ("Admin", "Full System Access"),
    ("Teacher", "CBC Assessments"),
    ("Parent", "Student Tracking"),
];

/// Trim the email and require both fields to be present.
///
/// # Errors
///
/// Returns `MISSING_FIELDS_MESSAGE` when either field is blank.
pub fn validate_login_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(MISSING_FIELDS_MESSAGE);
    }
    Ok((email.to_owned(), password.to_owned()))
}

#[must_use]
pub fn submit_label(loading: bool) -> &'static str {
    if loading { SUBMITTING_LABEL } else { SUBMIT_LABEL }
}

#[component]
pub fn LoginForm(on_login: Callback<Session>) -> impl IntoView {
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let loading = RwSignal::new(false);
    let error = RwSignal::new(String::new());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let (email_value, password_value) = match validate_login_input(&email.get_untracked(), &password.get_untracked()) {
            Ok(fields) => fields,
            Err(message) => {
                error.set(message.to_owned());
                return;
            }
        };
        loading.set(true);
        error.set(String::new());

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match crate::net::api::login(&email_value, &password_value).await {
                Ok(session) => on_login.run(session),
                Err(message) => error.set(message),
            }
            loading.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (email_value, password_value, on_login);
            loading.set(false);
        }
    };

    view! {
        <div class="card login-card">
            <h2 class="login-card__title">"Welcome Back"</h2>
            <form class="login-form" on:submit=on_submit>
                <div class="login-field">
                    <label for="email" class="login-label">"Email Address"</label>
                    <input
                        id="email"
                        class="login-input"
                        type="email"
                        placeholder="Enter your email"
                        required
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                </div>
                <div class="login-field">
                    <label for="password" class="login-label">"Password"</label>
                    <input
                        id="password"
                        class="login-input"
                        type="password"
                        placeholder="Enter your password"
                        required
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </div>
                <Show when=move || !error.get().is_empty()>
                    <div class="login-message login-message--error">{move || error.get()}</div>
                </Show>
                <button class="login-button" type="submit" disabled=move || loading.get()>
                    {move || submit_label(loading.get())}
                </button>
            </form>
            <div class="login-roles">
                {ROLE_BLURBS
                    .iter()
                    .map(|(role, blurb)| {
                        view! {
                            <div class="login-roles__item">
                                <div class="login-roles__name">{*role}</div>
                                <div class="login-roles__blurb">{*blurb}</div>
                            </div>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}
