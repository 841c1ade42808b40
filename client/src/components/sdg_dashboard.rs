//! SDG 4 indicator widget.
//!
//! Shows four percentage tiles that start at zero and fill in after
//! `LOAD_DELAY`, followed by the key-features list.

use leptos::prelude::*;

use crate::state::metrics::{KEY_FEATURES, MetricsState, format_percent};

#[component]
pub fn SdgDashboard() -> impl IntoView {
    let state = RwSignal::new(MetricsState::default());

    // One-shot timer; the alive flag stops a late tick after unmount.
    #[cfg(feature = "hydrate")]
    {
        let alive = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
        let alive_task = alive.clone();
        leptos::task::spawn_local(async move {
            gloo_timers::future::sleep(crate::state::metrics::LOAD_DELAY).await;
            if alive_task.load(std::sync::atomic::Ordering::Relaxed) {
                state.set(MetricsState::at(crate::state::metrics::LOAD_DELAY));
            }
        });
        on_cleanup(move || alive.store(false, std::sync::atomic::Ordering::Relaxed));
    }

    view! {
        <div class="card sdg-card">
            <div class="sdg-card__header">
                <div class="sdg-card__badge">"4"</div>
                <div>
                    <h2 class="sdg-card__title">"SDG 4 Dashboard"</h2>
                    <p class="sdg-card__subtitle">"Quality Education Indicators"</p>
                </div>
            </div>
            <div class="sdg-tiles">
                {move || {
                    state
                        .get()
                        .metrics
                        .tiles()
                        .into_iter()
                        .map(|(value, label, tone)| {
                            view! {
                                <div class=format!("sdg-tile sdg-tile--{tone}")>
                                    <div class="sdg-tile__value">{format_percent(value)}</div>
                                    <div class="sdg-tile__label">{label}</div>
                                </div>
                            }
                        })
                        .collect_view()
                }}
            </div>
            <div class="sdg-features">
                <h3 class="sdg-features__title">"Key Features"</h3>
                <ul class="sdg-features__list">
                    {KEY_FEATURES
                        .iter()
                        .map(|feature| view! { <li class="sdg-features__item">{*feature}</li> })
                        .collect_view()}
                </ul>
            </div>
        </div>
    }
}
