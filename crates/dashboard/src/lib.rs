use std::{error, fmt};

use tokio::sync::mpsc;
use tracker::{
    render::Renderer,
    session::{self, SessionError},
    LiveTrackState,
};
use transport::{
    config::{fetch_config, ConfigError},
    supervise, TransportEvent,
};

use crate::config::DashboardConfig;

pub mod config;

pub const CONFIG_UNAVAILABLE: &str = "Configuration unavailable";

const EVENT_BUFFER: usize = 32;

#[derive(Debug)]
pub enum DashboardError {
    Config(ConfigError),
    Session(SessionError),
}

impl error::Error for DashboardError {}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DashboardError::Config(e) => write!(f, "configuration error: {}", e),
            DashboardError::Session(e) => write!(f, "tracking session error: {}", e),
        }
    }
}

impl From<ConfigError> for DashboardError {
    fn from(err: ConfigError) -> Self {
        DashboardError::Config(err)
    }
}

impl From<SessionError> for DashboardError {
    fn from(err: SessionError) -> Self {
        DashboardError::Session(err)
    }
}

/// Loads the transport configuration and tracks the bus on `renderer` until
/// the session breaks down. A configuration failure ends the run right away.
pub async fn run<R>(config: &DashboardConfig, mut renderer: R) -> Result<(), DashboardError>
where
    R: Renderer + 'static,
{
    let transport = match fetch_config(&config.config_url)
        .await
        .and_then(|transport| config.transport.build(&transport, config.idle_limit))
    {
        Ok(transport) => transport,
        Err(why) => {
            log::error!("{}", why);
            renderer.set_banner_text(CONFIG_UNAVAILABLE);
            return Err(why.into());
        }
    };

    let state = LiveTrackState::new(config.viewport, config.zero_coordinates)
        .with_padding(config.padding_px);
    let session = session::spawn(state, renderer);

    let (sender, mut receiver) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(supervise(transport, config.reconnect, sender));

    while let Some(event) = receiver.recv().await {
        match event {
            TransportEvent::Status(state) => session.show_status(state.status_text()).await?,
            TransportEvent::Location(event) => session.tell(event).await?,
        }
    }
    Ok(())
}
