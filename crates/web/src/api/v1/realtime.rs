use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, OriginalUri, State},
    http::Method,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, on, post},
    Json, Router,
};
use axum_extra::TypedHeader;
use futures::stream::Stream;
use model::{bus_update::BusUpdate, Received};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    StreamExt as _,
};
use tower_http::trace::TraceLayer;

use crate::{
    common::{
        route_not_found, schema, HateoasResult, RouteErrorResponse, RouteResult,
        METHOD_FILTER_ALL,
    },
    extract::base_url::BaseUrl,
    hateoas,
    relay::{PublishOutcome, Relay, RelayEvent},
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/realtime{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", post(publish))
        .route("/stream", get(sse_handler))
        .route("/latest", get(latest))
        .route("/schema", get(schema::<BusUpdate>))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// Pushes the polling state and the latest update right away, then every
/// event the relay broadcasts.
async fn sse_handler(
    user_agent: Option<TypedHeader<headers::UserAgent>>,
    State(relay): State<Relay>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let user_agent = user_agent
        .map(|TypedHeader(user_agent)| user_agent.as_str().to_owned())
        .unwrap_or_else(|| "unknown client".to_owned());
    log::info!("`{}` connected", user_agent);

    // subscribe first, so nothing published in between is lost
    let updates = BroadcastStream::new(relay.subscribe()).filter_map(move |result| match result {
        Ok(event) => Some(event),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            log::warn!("`{}` lagged behind, skipped {} events", user_agent, skipped);
            None
        }
    });
    let initial = std::iter::once(RelayEvent::StatusUpdate(relay.polling_status()))
        .chain(relay.latest().await.map(RelayEvent::BusUpdate));

    let stream = tokio_stream::iter(initial)
        .chain(updates)
        .filter_map(|event| event.to_sse())
        .map(Ok);

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn publish(
    OriginalUri(original_uri): OriginalUri,
    State(relay): State<Relay>,
    payload: Result<Json<BusUpdate>, JsonRejection>,
) -> RouteResult<Json<PublishOutcome>> {
    let Json(update) = payload.map_err(|why| {
        log::warn!("rejecting malformed update: {}", why.body_text());
        RouteErrorResponse::bad_request(&Method::POST, original_uri.path())
            .with_message("Malformed bus update.")
            .with_detailed_information(why.body_text())
    })?;
    Ok(Json(relay.publish(update).await))
}

async fn latest(
    OriginalUri(original_uri): OriginalUri,
    base_url: BaseUrl,
    State(relay): State<Relay>,
) -> HateoasResult<Received<BusUpdate>> {
    let received = relay.latest().await.ok_or_else(|| {
        RouteErrorResponse::not_found(&Method::GET, original_uri.path())
            .with_message("No update has been received yet.")
    })?;
    Ok(hateoas::Response::builder(received, base_url)
        .link("self", resource!("/latest"))
        .link("stream", resource!("/stream"))
        .link("schema", resource!("/schema"))
        .build()
        .json())
}
