use std::fmt;

/// Lifecycle of one transport:
/// `Connecting -> Connected -> Disconnected | Error -> Connecting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    /// The peer closed the channel.
    Disconnected,
    /// Connecting failed or the channel broke.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSignal {
    Established,
    Lost,
    Failed(String),
    /// The backoff elapsed.
    Retry,
}

impl ConnectionState {
    pub fn next(self, signal: ConnectionSignal) -> Self {
        match (self, signal) {
            (Self::Connecting, ConnectionSignal::Established) => Self::Connected,
            (Self::Connected, ConnectionSignal::Lost) => Self::Disconnected,
            (Self::Connecting | Self::Connected, ConnectionSignal::Failed(reason)) => {
                Self::Error(reason)
            }
            (Self::Disconnected | Self::Error(_), ConnectionSignal::Retry) => Self::Connecting,
            (state, signal) => {
                log::debug!("ignoring {:?} while {:?}", signal, state);
                state
            }
        }
    }

    /// The line shown in the dashboard banner.
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected. Waiting for data...",
            Self::Disconnected => "Connection Lost. Retrying...",
            Self::Error(_) => "Connection Error. Retrying...",
        }
    }

    pub fn is_connected(&self) -> bool {
        *self == Self::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Error(reason) => write!(f, "error ({reason})"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
            Self::Disconnected => f.write_str("disconnected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle() {
        let state = ConnectionState::Connecting
            .next(ConnectionSignal::Established)
            .next(ConnectionSignal::Lost);
        assert_eq!(state, ConnectionState::Disconnected);
        assert_eq!(
            state.next(ConnectionSignal::Retry),
            ConnectionState::Connecting
        );
    }

    #[test]
    fn failure_leads_to_error_then_retry() {
        let state = ConnectionState::Connecting
            .next(ConnectionSignal::Failed("refused".to_owned()));
        assert_eq!(state, ConnectionState::Error("refused".to_owned()));
        assert_eq!(state.status_text(), "Connection Error. Retrying...");
        assert_eq!(
            state.next(ConnectionSignal::Retry),
            ConnectionState::Connecting
        );
    }

    #[test]
    fn out_of_order_signals_are_ignored() {
        assert_eq!(
            ConnectionState::Connected.next(ConnectionSignal::Retry),
            ConnectionState::Connected
        );
        assert_eq!(
            ConnectionState::Disconnected.next(ConnectionSignal::Established),
            ConnectionState::Disconnected
        );
    }
}
