//! A tracking session as an actor: one task owns the [`LiveTrackState`] and
//! the [`Renderer`], and handles messages strictly one after another in the
//! order they were sent.

use core::fmt;
use std::{error::Error, panic::AssertUnwindSafe};

use model::{location::LocationEvent, Coordinate};
use tokio::sync::{mpsc, oneshot};

use crate::{render::Renderer, state::TrackUpdate, LiveTrackState};

const MAILBOX_CAPACITY: usize = 32;

enum Message {
    Ingest {
        event: LocationEvent,
        respond_to: Option<oneshot::Sender<TrackUpdate>>,
    },
    ShowStatus(String),
    Trail(oneshot::Sender<Vec<Coordinate>>),
}

pub enum SessionError {
    /// The session task is gone.
    Closed,
    ReceiveAnswerError(oneshot::error::RecvError),
}

impl fmt::Debug for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "SendError: session closed"),
            Self::ReceiveAnswerError(why) => write!(f, "ReceiveError: {:?}", why),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "tracking session is closed"),
            Self::ReceiveAnswerError(why) => {
                write!(f, "tracking session did not answer: {}", why)
            }
        }
    }
}

impl Error for SessionError {}

impl From<oneshot::error::RecvError> for SessionError {
    fn from(why: oneshot::error::RecvError) -> Self {
        Self::ReceiveAnswerError(why)
    }
}

impl<T> From<mpsc::error::SendError<T>> for SessionError {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        Self::Closed
    }
}

#[derive(Clone)]
pub struct SessionRef {
    sender: mpsc::Sender<Message>,
}

impl SessionRef {
    /// Ingests `event`, renders the result and returns it.
    pub async fn ingest(&self, event: LocationEvent) -> Result<TrackUpdate, SessionError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(Message::Ingest {
                event,
                respond_to: Some(respond_to),
            })
            .await?;
        Ok(response.await?)
    }

    /// Like [`SessionRef::ingest`], without waiting for the result.
    pub async fn tell(&self, event: LocationEvent) -> Result<(), SessionError> {
        self.sender
            .send(Message::Ingest {
                event,
                respond_to: None,
            })
            .await?;
        Ok(())
    }

    /// Shows a connection status in the banner.
    pub async fn show_status<S: Into<String>>(&self, text: S) -> Result<(), SessionError> {
        self.sender.send(Message::ShowStatus(text.into())).await?;
        Ok(())
    }

    pub async fn trail(&self) -> Result<Vec<Coordinate>, SessionError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(Message::Trail(respond_to)).await?;
        Ok(response.await?)
    }
}

/// Starts a session. It runs until every [`SessionRef`] is dropped.
///
/// A panicking renderer does not end the session: the panic is logged and the
/// trail is kept.
pub fn spawn<R>(mut state: LiveTrackState, mut renderer: R) -> SessionRef
where
    R: Renderer + 'static,
{
    let (sender, mut receiver) = mpsc::channel(MAILBOX_CAPACITY);

    tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            match message {
                Message::Ingest { event, respond_to } => {
                    let update = state.ingest(&event);
                    render_guarded(&mut renderer, |renderer| update.render(renderer));
                    if let Some(respond_to) = respond_to {
                        respond_to
                            .send(update)
                            .unwrap_or_else(|_| log::error!("Can not respond to ingest!"));
                    }
                }
                Message::ShowStatus(text) => {
                    render_guarded(&mut renderer, |renderer| {
                        renderer.set_banner_text(&text)
                    });
                }
                Message::Trail(respond_to) => {
                    respond_to
                        .send(state.trail().points().to_vec())
                        .unwrap_or_else(|_| log::error!("Can not respond to trail request!"));
                }
            }
        }
        log::debug!("tracking session ended with {} trail points", state.trail().len());
    });

    SessionRef { sender }
}

fn render_guarded<R, F>(renderer: &mut R, draw: F)
where
    R: Renderer,
    F: FnOnce(&mut dyn Renderer),
{
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| draw(renderer)));
    if let Err(why) = result {
        log::error!("renderer panicked: {:?}", why);
    }
}
