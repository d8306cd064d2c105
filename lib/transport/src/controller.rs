//! Delivery-mode controller.
//!
//! Inbound updates enter the system through exactly one path: an
//! active polling loop or a registered webhook. The mode is fixed at
//! construction from configuration; the state machine still refuses to
//! activate a second path if a reconfiguration ever tries.
//!
//! States: Idle -> Polling | WebhookRegistered -> Stopped.

use crate::api::ChatTransport;
use crate::dispatch::Dispatcher;
use crate::error::ControllerError;
use crate::update::TelegramUpdate;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// Long-poll window passed to the transport.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed poll before retrying.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// The chosen inbound-delivery mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportMode {
    /// Actively poll the transport for updates.
    Polling,
    /// Register a callback URL and accept pushed updates.
    Webhook {
        /// Full callback URL to register.
        url: String,
    },
}

/// Controller lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Constructed, no delivery path active.
    Idle,
    /// The polling loop is running.
    Polling,
    /// A webhook is registered; pushes are accepted.
    WebhookRegistered,
    /// Shut down; no new updates are accepted.
    Stopped,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Polling => "polling",
            Self::WebhookRegistered => "webhook-registered",
            Self::Stopped => "stopped",
        };
        write!(f, "{name}")
    }
}

/// Owns the single decision of how updates enter the system and
/// guarantees the two delivery paths are never active together.
pub struct TransportController {
    mode: TransportMode,
    transport: Arc<dyn ChatTransport>,
    dispatcher: Arc<Dispatcher>,
    state: Mutex<ControllerState>,
    shutdown_tx: watch::Sender<bool>,
}

impl TransportController {
    /// Creates an idle controller for the configured mode.
    #[must_use]
    pub fn new(
        mode: TransportMode,
        transport: Arc<dyn ChatTransport>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            mode,
            transport,
            dispatcher,
            state: Mutex::new(ControllerState::Idle),
            shutdown_tx,
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ControllerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition_from_idle(&self, next: ControllerState) -> Result<(), ControllerError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != ControllerState::Idle {
            return Err(ControllerError::NotIdle {
                state: state.to_string(),
            });
        }
        *state = next;
        Ok(())
    }

    /// Activates the configured delivery path.
    ///
    /// In polling mode this starts the receive loop in a background
    /// task. In webhook mode this registers the callback URL with the
    /// transport before accepting any push.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::NotIdle`] if a delivery path was
    /// already activated, or [`ControllerError::RegistrationFailed`]
    /// if webhook registration fails. Registration failure is fatal to
    /// startup by design: falling back to polling would change
    /// observable behavior the operator did not ask for.
    pub async fn start(&self) -> Result<(), ControllerError> {
        match &self.mode {
            TransportMode::Polling => {
                self.transition_from_idle(ControllerState::Polling)?;
                tracing::info!("starting polling loop");
                tokio::spawn(run_polling(
                    Arc::clone(&self.transport),
                    Arc::clone(&self.dispatcher),
                    self.shutdown_tx.subscribe(),
                ));
                Ok(())
            }
            TransportMode::Webhook { url } => {
                self.transition_from_idle(ControllerState::WebhookRegistered)?;
                tracing::info!(url = %url, "registering webhook");
                if let Err(e) = self.transport.set_webhook(url).await {
                    // Roll back so the failure is visibly terminal.
                    let mut state =
                        self.state.lock().unwrap_or_else(PoisonError::into_inner);
                    *state = ControllerState::Stopped;
                    return Err(ControllerError::RegistrationFailed {
                        reason: e.to_string(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Accepts one pushed update from the webhook endpoint.
    ///
    /// The update is normalized and dispatched in its own task so slow
    /// model calls never hold the HTTP callback open.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::NotAcceptingPushes`] unless the
    /// webhook path is the active one; a push never enters the system
    /// while the polling loop owns delivery.
    pub fn handle_push(&self, update: TelegramUpdate) -> Result<(), ControllerError> {
        let state = self.state();
        if state != ControllerState::WebhookRegistered {
            return Err(ControllerError::NotAcceptingPushes {
                state: state.to_string(),
            });
        }

        if let Some(inbound) = update.normalize() {
            let dispatcher = Arc::clone(&self.dispatcher);
            tokio::spawn(async move {
                dispatcher.handle(inbound).await;
            });
        }
        Ok(())
    }

    /// Stops accepting new inbound updates.
    ///
    /// The polling loop exits promptly, releasing the transport
    /// connection; in webhook mode the registration is removed
    /// best-effort. In-flight dispatches are left to complete.
    pub async fn shutdown(&self) {
        let previous = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let previous = *state;
            *state = ControllerState::Stopped;
            previous
        };
        let _ = self.shutdown_tx.send(true);

        if previous == ControllerState::WebhookRegistered {
            if let Err(e) = self.transport.delete_webhook().await {
                tracing::warn!(error = %e, "failed to remove webhook registration");
            }
        }
        tracing::info!(previous_state = %previous, "transport controller stopped");
    }
}

/// The polling receive loop.
///
/// Each received update advances the confirmation offset and is
/// dispatched in its own task, so one slow exchange never delays the
/// next poll.
async fn run_polling(
    transport: Arc<dyn ChatTransport>,
    dispatcher: Arc<Dispatcher>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut offset: Option<i64> = None;
    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            result = transport.get_updates(offset, POLL_TIMEOUT_SECS) => match result {
                Ok(batch) => {
                    for update in batch {
                        offset = Some(offset.map_or(update.update_id + 1, |current| {
                            current.max(update.update_id + 1)
                        }));
                        if let Some(inbound) = update.normalize() {
                            let dispatcher = Arc::clone(&dispatcher);
                            tokio::spawn(async move {
                                dispatcher.handle(inbound).await;
                            });
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "polling failed, retrying");
                    tokio::select! {
                        _ = shutdown_rx.changed() => break,
                        () = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                    }
                }
            }
        }
    }
    tracing::debug!("polling loop exited");
}
