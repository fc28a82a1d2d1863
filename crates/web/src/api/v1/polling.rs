use axum::{
    extract::State,
    routing::{get, on, post},
    Json, Router,
};
use model::polling::PollingStatus;

use crate::{
    common::{route_not_found, METHOD_FILTER_ALL},
    relay::Relay,
    WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", get(get_status))
        .route("/toggle", post(toggle))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_status(State(relay): State<Relay>) -> Json<PollingStatus> {
    Json(relay.polling_status())
}

/// Pauses or resumes relaying; every connected dashboard is told.
async fn toggle(State(relay): State<Relay>) -> Json<PollingStatus> {
    Json(relay.toggle_polling())
}
