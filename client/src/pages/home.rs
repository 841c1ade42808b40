//! Landing page with the hero, sign-in card and SDG 4 widget.
//!
//! SYSTEM CONTEXT
//! ==============
//! Public route. A successful sign-in persists the session and moves the
//! user to `/dashboard`; visitors who already hold a session are sent there
//! as soon as it has been restored.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::components::login_form::LoginForm;
use crate::components::sdg_dashboard::SdgDashboard;
use crate::state::session::{self, Session, SessionState};

pub const HERO_BADGES: [&str; 3] = ["🇰🇪 Kenyan CBC Aligned", "🔐 Data Protection Compliant", "📱 Offline-First PWA"];

#[component]
pub fn HomePage() -> impl IntoView {
    let state = expect_context::<RwSignal<SessionState>>();
    let navigate = use_navigate();

    let navigate_signed_in = navigate.clone();
    Effect::new(move || {
        if state.with(|s| !s.loading && s.is_authenticated()) {
            navigate_signed_in("/dashboard", NavigateOptions::default());
        }
    });

    let on_login = Callback::new(move |new_session: Session| {
        log_sign_in(&new_session);
        state.set(session::store(new_session));
    });

    view! {
        <main class="home">
            <Show
                when=move || !state.with(SessionState::is_authenticated)
                fallback=|| view! { <div class="home__redirect">"Redirecting to dashboard..."</div> }
            >
                <div class="home__container">
                    <div class="hero">
                        <h1 class="hero__title">"Asili SSMS"</h1>
                        <p class="hero__tagline">
                            "Smart School Management System aligned with UN SDG 4 - Quality Education"
                        </p>
                        <div class="hero__badges">
                            {HERO_BADGES
                                .iter()
                                .map(|badge| view! { <span class="hero__badge">{*badge}</span> })
                                .collect_view()}
                        </div>
                    </div>
                    <div class="home__grid">
                        <LoginForm on_login=on_login/>
                        <SdgDashboard/>
                    </div>
                </div>
            </Show>
        </main>
    }
}

fn log_sign_in(session: &Session) {
    #[cfg(feature = "hydrate")]
    log::info!("signed in as {}", session.role);
    #[cfg(not(feature = "hydrate"))]
    let _ = session;
}
