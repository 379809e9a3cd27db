//! Connection lifecycle and reconnect policy

use std::sync::Arc;
use tokio::sync::{Mutex, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::ChunkSink;
use super::backoff::Backoff;
use crate::provider::{Connector, Provider};
use crate::types::{ConnectionConfig, ConnectionState};
use crate::{PipelineError, Result};

/// A running session task and the token that stops it.
struct Session {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns the transport and its reconnect policy.
///
/// ```text
/// Disconnected ─connect─▶ Connecting ─ok─▶ Connected ─lost─▶ Reconnecting ─ok─▶ Connected
///                              │                                  ▲
///                              └─fail─▶ Error ─auto_reconnect─────┘
/// any state ─disconnect─▶ Disconnected
/// ```
///
/// Each `connect` spawns one session task that opens providers through the
/// [`Connector`], pumps their bytes into a [`ChunkSink`] and retries with
/// exponential backoff. `disconnect` cancels that task and waits for it.
///
/// A failure is published as `Error(reason)` and, with `auto_reconnect`, replaced
/// by `Reconnecting` in the same step. The failure itself goes to
/// [`ChunkSink::on_error`], which is where the reason outlives the state.
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    state_rx: watch::Receiver<ConnectionState>,
    session: Mutex<Option<Session>>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        Self { connector, state_tx: Arc::new(state_tx), state_rx, session: Mutex::new(None) }
    }

    /// Current link state.
    pub fn state(&self) -> ConnectionState {
        self.state_rx.borrow().clone()
    }

    /// Receiver notified on every state transition.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Whether a session task is alive (connecting, connected or backing off).
    pub async fn is_active(&self) -> bool {
        self.session.lock().await.as_ref().is_some_and(|s| !s.task.is_finished())
    }

    /// Start a session for `config`, feeding received bytes into `sink`.
    ///
    /// Returns once the first attempt has either connected or failed. Failures are
    /// reported through the sink and the state machine, not as an `Err`.
    ///
    /// If a session is already active this logs a warning and does nothing.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidConfig`] when `config` fails validation.
    pub async fn connect<S: ChunkSink>(&self, config: ConnectionConfig, sink: S) -> Result<()> {
        config.validate()?;

        let (first_tx, first_rx) = oneshot::channel();
        {
            let mut guard = self.session.lock().await;
            if guard.as_ref().is_some_and(|s| !s.task.is_finished()) {
                warn!(
                    address = %config.address(),
                    state = %self.state(),
                    "Connect ignored: session already active"
                );
                return Ok(());
            }

            info!(transport = ?config.transport, address = %config.address(), "Connecting");
            self.state_tx.send_replace(ConnectionState::Connecting);

            let cancel = CancellationToken::new();
            let task = tokio::spawn(run_session(
                Arc::clone(&self.connector),
                config,
                sink,
                Arc::clone(&self.state_tx),
                cancel.clone(),
                first_tx,
            ));
            *guard = Some(Session { cancel, task });
        }

        // Sender is dropped without a value if disconnect() wins the race.
        let _ = first_rx.await;
        Ok(())
    }

    /// Tear down the session, cancel any pending retry, end in `Disconnected`.
    ///
    /// Safe to call repeatedly and while `connect` is in flight.
    pub async fn disconnect(&self) {
        // Held until `Disconnected` is published so a racing connect starts after it
        let mut guard = self.session.lock().await;

        if let Some(session) = guard.take() {
            debug!("Cancelling connection session");
            session.cancel.cancel();
            match session.task.await {
                Err(e) if e.is_panic() => error!("Connection session panicked: {}", e),
                _ => {}
            }
            info!("Disconnected");
        }

        self.state_tx.send_if_modified(|state| {
            if *state == ConnectionState::Disconnected {
                false
            } else {
                *state = ConnectionState::Disconnected;
                true
            }
        });
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            debug!("Dropping connection manager with live session");
            session.cancel.cancel();
        }
    }
}

/// Why a connected provider stopped delivering.
enum PumpEnd {
    Cancelled,
    Closed,
    Failed(PipelineError),
}

async fn run_session<S: ChunkSink>(
    connector: Arc<dyn Connector>,
    config: ConnectionConfig,
    mut sink: S,
    state: Arc<watch::Sender<ConnectionState>>,
    cancel: CancellationToken,
    first_attempt: oneshot::Sender<()>,
) {
    let mut backoff = Backoff::new(config.reconnect_base_delay, config.max_reconnect_delay);
    let mut first_attempt = Some(first_attempt);
    let address = config.address();

    loop {
        sink.on_attempt();

        let opening = tokio::time::timeout(config.connect_timeout, connector.open(&config));
        let attempt = tokio::select! {
            _ = cancel.cancelled() => return,
            result = opening => result,
        };
        let opened = match attempt {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout { duration: config.connect_timeout }),
        };

        let failure = match opened {
            Ok(provider) => {
                backoff.reset();
                info!(endpoint = %provider.describe(), "Connected");
                state.send_replace(ConnectionState::Connected);
                if let Some(tx) = first_attempt.take() {
                    let _ = tx.send(());
                }

                match pump(provider, &mut sink, &cancel).await {
                    PumpEnd::Cancelled => return,
                    PumpEnd::Closed => {
                        let reason = format!("{address} closed the connection");
                        PipelineError::connection_failed(reason)
                    }
                    PumpEnd::Failed(e) => e,
                }
            }
            Err(e) => {
                warn!(
                    address = %address,
                    attempt = backoff.attempt() + 1,
                    "Connect attempt failed: {}",
                    e
                );
                e
            }
        };

        sink.on_link_lost();
        sink.on_error(failure.clone());
        state.send_replace(ConnectionState::Error(failure.to_string()));
        if let Some(tx) = first_attempt.take() {
            let _ = tx.send(());
        }

        if !config.auto_reconnect {
            info!(address = %address, "Auto-reconnect disabled, session ending");
            return;
        }

        let delay = backoff.next_delay();
        info!(address = %address, ?delay, attempt = backoff.attempt(), "Scheduling reconnect");
        state.send_replace(ConnectionState::Reconnecting);

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

async fn pump<S: ChunkSink>(
    mut provider: Box<dyn Provider>,
    sink: &mut S,
    cancel: &CancellationToken,
) -> PumpEnd {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PumpEnd::Cancelled,
            next = provider.next_chunk() => next,
        };

        match next {
            Ok(Some(chunk)) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return PumpEnd::Cancelled,
                    _ = sink.on_chunk(&chunk) => {}
                }
            }
            Ok(None) => {
                debug!(endpoint = %provider.describe(), "Provider closed");
                return PumpEnd::Closed;
            }
            Err(e) => {
                warn!(endpoint = %provider.describe(), "Provider error: {}", e);
                return PumpEnd::Failed(e);
            }
        }
    }
}
