use std::sync::Arc;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, on},
    Json, Router,
};
use model::config::TransportConfig;
use serde_json::json;

pub mod v1;

use crate::{
    common::{route_not_found, METHOD_FILTER_ALL},
    extract::base_url::BaseUrl,
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        format!("/api{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub fn routes(state: WebState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/config", get(config))
        .with_state(state.clone())
        .nest_service("/v1", v1::routes(state))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn ping() -> impl IntoResponse {
    Json(json!({
        "message": "pong!"
    }))
}

/// Everything a dashboard needs to connect, fetched once at its startup.
async fn config(
    base_url: BaseUrl,
    State(transport): State<Arc<TransportConfig>>,
) -> Json<TransportConfig> {
    Json(TransportConfig {
        stream_url: Some(base_url.full_url(v1::realtime::resource!("/stream"))),
        ..(*transport).clone()
    })
}
