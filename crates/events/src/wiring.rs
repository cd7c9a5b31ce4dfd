//! The form controller and its two value-change subscriptions.
//!
//! [`FormController`] owns the shared [`CustomerForm`] and is the single
//! mutation entry point. Per change:
//!
//! 1. Notification leaf — applied synchronously inside the same
//!    `set_value` call: switching to `"text"` attaches the required rule to
//!    the phone leaf, anything else clears it, and the phone leaf is
//!    revalidated before the call returns.
//! 2. Email leaf — changes are debounced (quiet period, default 1000 ms);
//!    once a burst settles, the inline email message is recomputed from the
//!    leaf's current status and errors and published on a watch channel.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio_util::sync::CancellationToken;

use regform_core::{messages, paths, CoreError, CustomerForm};

use crate::bus::{EventBus, FormEvent, FormEventKind};
use crate::debounce;

/// Buffer size for the internal debounce pipeline channels.
const PIPELINE_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// WiringConfig
// ---------------------------------------------------------------------------

/// Tuning knobs for the reactive wiring.
#[derive(Debug, Clone)]
pub struct WiringConfig {
    /// Quiet period for the email message debounce.
    pub debounce: Duration,
    /// Capacity of the broadcast event bus.
    pub bus_capacity: usize,
}

impl Default for WiringConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
            bus_capacity: 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// FormController
// ---------------------------------------------------------------------------

/// Owns the shared form tree, the event bus, and the email message pipeline.
///
/// Dropping the controller tears the pipeline down: the bus sender closes,
/// the relay exits, and the debounce and apply tasks drain out behind it.
/// [`shutdown`](FormController::shutdown) cancels the tasks immediately.
pub struct FormController {
    form: Arc<Mutex<CustomerForm>>,
    bus: EventBus,
    email_message: watch::Receiver<String>,
    cancel: CancellationToken,
}

impl FormController {
    /// Build the default form and spawn the email message pipeline on the
    /// current tokio runtime.
    pub fn spawn(config: WiringConfig) -> Self {
        let form = Arc::new(Mutex::new(CustomerForm::new()));
        let bus = EventBus::new(config.bus_capacity);
        let (message_tx, message_rx) = watch::channel(String::new());
        let cancel = CancellationToken::new();

        let (burst_tx, burst_rx) = mpsc::channel(PIPELINE_CAPACITY);
        let (settled_tx, settled_rx) = mpsc::channel(PIPELINE_CAPACITY);

        tokio::spawn(relay_email_changes(
            bus.subscribe(),
            burst_tx,
            cancel.clone(),
        ));
        tokio::spawn(debounce::debounce(
            burst_rx,
            settled_tx,
            config.debounce,
            cancel.clone(),
        ));
        tokio::spawn(apply_email_message(
            Arc::clone(&form),
            settled_rx,
            message_tx,
            cancel.clone(),
        ));

        Self {
            form,
            bus,
            email_message: message_rx,
            cancel,
        }
    }

    /// Apply a user edit to a leaf and publish the change event.
    ///
    /// Changes to the notification leaf additionally toggle the phone
    /// leaf's rule set before this call returns — no debouncing.
    pub async fn set_value(&self, path: &str, value: Value) -> Result<(), CoreError> {
        {
            let mut form = self.form.lock().await;
            form.set_value(path, value.clone())?;
            if path == paths::NOTIFICATION {
                let notify_via = value.as_str().unwrap_or_default();
                form.set_notification(notify_via)?;
                tracing::debug!(notify_via, "Applied notification toggle to phone leaf");
            }
        }
        self.bus.publish(FormEvent::value_changed(path, value));
        Ok(())
    }

    /// Record that a leaf received and lost focus, then publish the event.
    pub async fn mark_touched(&self, path: &str) -> Result<(), CoreError> {
        self.form.lock().await.mark_touched(path)?;
        self.bus.publish(FormEvent::touched(path));
        Ok(())
    }

    /// Append a fresh address group. Returns the new list length.
    pub async fn add_address(&self) -> Result<usize, CoreError> {
        let len = self.form.lock().await.add_address()?;
        self.bus.publish(FormEvent::address_added(len - 1));
        Ok(len)
    }

    /// Serialize the current values to the log sink and return the string.
    pub async fn save(&self) -> String {
        self.form.lock().await.save()
    }

    /// Overwrite the whole tree with the fixed test record; fails with
    /// [`CoreError::ShapeMismatch`] (see `CustomerForm::populate_test_data`).
    pub async fn populate_test_data(&self) -> Result<(), CoreError> {
        self.form.lock().await.populate_test_data()
    }

    /// Read the form under the lock.
    pub async fn with_form<R>(&self, read: impl FnOnce(&CustomerForm) -> R) -> R {
        let form = self.form.lock().await;
        read(&form)
    }

    /// The current inline email message.
    pub fn email_message(&self) -> String {
        self.email_message.borrow().clone()
    }

    /// Watch the inline email message for changes.
    pub fn subscribe_email_message(&self) -> watch::Receiver<String> {
        self.email_message.clone()
    }

    /// Subscribe to all form events.
    pub fn subscribe(&self) -> broadcast::Receiver<FormEvent> {
        self.bus.subscribe()
    }

    /// Cancel the background tasks.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Forward email-leaf change events from the bus into the debouncer.
async fn relay_email_changes(
    mut bus_rx: broadcast::Receiver<FormEvent>,
    burst_tx: mpsc::Sender<()>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = bus_rx.recv() => match event {
                Ok(event)
                    if event.kind == FormEventKind::ValueChanged
                        && event.path == paths::EMAIL =>
                {
                    if burst_tx.send(()).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Email relay lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

/// Recompute the inline email message after each settled burst.
async fn apply_email_message(
    form: Arc<Mutex<CustomerForm>>,
    mut settled_rx: mpsc::Receiver<()>,
    message_tx: watch::Sender<String>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            settled = settled_rx.recv() => match settled {
                Some(()) => {
                    let message = {
                        let form = form.lock().await;
                        match form.field(paths::EMAIL) {
                            Ok(field) => messages::email_message(field),
                            Err(e) => {
                                tracing::error!(error = %e, "Email leaf not found");
                                continue;
                            }
                        }
                    };
                    tracing::debug!(message = %message, "Email message recomputed");
                    if message_tx.send(message).is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }
}
