use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::components::*;
use leptos_router::hooks::use_navigate;
use leptos_router::path;

use crate::api::catalog::SchemaContext;
use crate::api::ApiClient;
use crate::components::require_auth::RequireAuth;
use crate::config;
use crate::pages::configurations::ConfigurationsPage;
use crate::pages::create_experiment::CreateExperimentPage;
use crate::pages::dashboard::DashboardPage;
use crate::pages::experiment_details::ExperimentDetailsPage;
use crate::pages::experiments::ExperimentsPage;
use crate::pages::functions::FunctionsPage;
use crate::pages::login::LoginPage;
use crate::pages::register::RegisterPage;
use crate::session::SessionStore;

/// Sends the user back to the login view once the request client reports a
/// failed token refresh. Navigation lives here, at the shell level, rather
/// than inside the request path.
#[component]
fn SessionWatcher(invalidated: ReadSignal<bool>) -> impl IntoView {
    let navigate = use_navigate();
    Effect::new(move |_| {
        if invalidated.get() {
            navigate("/login", Default::default());
        }
    });
}

#[component]
pub fn App() -> impl IntoView {
    let session = SessionStore::new();
    let (invalidated, set_invalidated) = signal(false);
    let api = ApiClient::with_base(
        config::api_base(),
        session.clone(),
        Arc::new(move || set_invalidated.set(true)),
    );

    provide_context(session);
    provide_context(api);
    provide_context(SchemaContext(RwSignal::new(None)));

    view! {
        <Router>
            <SessionWatcher invalidated=invalidated />
            <main class="app-shell">
                <Routes fallback=|| view! { <Redirect path="/dashboard" /> }>
                    <Route path=path!("/login") view=LoginPage />
                    <Route path=path!("/register") view=RegisterPage />
                    <Route
                        path=path!("/dashboard")
                        view=|| view! { <RequireAuth><DashboardPage /></RequireAuth> }
                    />
                    <Route
                        path=path!("/experiment")
                        view=|| view! { <RequireAuth><ExperimentsPage /></RequireAuth> }
                    />
                    <Route
                        path=path!("/experiment/:id")
                        view=|| view! { <RequireAuth><ExperimentDetailsPage /></RequireAuth> }
                    />
                    <Route
                        path=path!("/create-experiment")
                        view=|| view! { <RequireAuth><CreateExperimentPage /></RequireAuth> }
                    />
                    <Route
                        path=path!("/configuration")
                        view=|| view! { <RequireAuth><ConfigurationsPage /></RequireAuth> }
                    />
                    <Route
                        path=path!("/function")
                        view=|| view! { <RequireAuth><FunctionsPage /></RequireAuth> }
                    />
                    <Route path=path!("/") view=|| view! { <Redirect path="/dashboard" /> } />
                </Routes>
            </main>
        </Router>
    }
}
