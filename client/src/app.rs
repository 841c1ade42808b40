//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{Link, Meta, MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::pages::{dashboard::DashboardPage, home::HomePage};
use crate::state::session::SessionState;

pub const APP_TITLE: &str = "Asili SSMS - Smart School Management";
pub const APP_DESCRIPTION: &str = "UN SDG 4 Aligned School Management System for Kenya";
pub const THEME_COLOR: &str = "#1e40af";

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Provides the session context and restores any stored session once the
/// app is running in the browser.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = RwSignal::new(SessionState::default());
    provide_context(session);

    // Effects only run after hydration, so SSR always renders signed-out.
    Effect::new(move || {
        if session.with(|s| s.loading) {
            session.set(SessionState::restore());
        }
    });

    view! {
        <Stylesheet id="leptos" href="/pkg/asili.css"/>
        <Title text=APP_TITLE/>
        <Meta name="description" content=APP_DESCRIPTION/>
        <Meta name="theme-color" content=THEME_COLOR/>
        <Link rel="manifest" href="/manifest.json"/>

        <Router>
            <div class="min-h-screen bg-slate-50">
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=StaticSegment("") view=HomePage/>
                    <Route path=StaticSegment("dashboard") view=DashboardPage/>
                </Routes>
            </div>
        </Router>
    }
}
