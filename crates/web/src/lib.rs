pub use crate::common::RouteResult;

use std::sync::Arc;

use axum::{extract::FromRef, routing::get_service, Router};
use config::WebConfig;
use model::config::TransportConfig;
use relay::Relay;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};

pub mod api;
pub mod common;
pub mod config;
pub mod extract;
pub mod hateoas;
pub mod mqtt;
pub mod relay;

#[derive(Clone, FromRef)]
pub struct WebState {
    pub relay: Relay,
    /// Handed out to dashboards on `/api/config`.
    pub transport: Arc<TransportConfig>,
}

/// The API under `/api`, everything else from the static directory.
pub fn app(state: WebState, static_dir: &str) -> Router {
    Router::new()
        .nest_service("/api", api::routes(state))
        .fallback_service(static_content_router(static_dir))
}

pub async fn start_web_server(state: WebState, config: &WebConfig) -> std::io::Result<()> {
    let routes = app(state, &config.static_dir);

    let listener = TcpListener::bind(&config.bind).await?;
    log::info!("Web server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}

fn static_content_router(static_dir: &str) -> Router {
    Router::new().nest_service(
        "/",
        get_service(
            ServeDir::new(static_dir)
                .not_found_service(ServeFile::new(format!("{static_dir}/index.html"))),
        ),
    )
}
