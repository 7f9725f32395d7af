use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::TwilioConfig;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Text message telling a respondent where their results are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub phone: String,
    pub body: String,
}

impl Notification {
    pub fn results_ready(phone: impl Into<String>, link: &str) -> Self {
        Self {
            phone: phone.into(),
            body: format!("Hello! Your results can be found at: {link}"),
        }
    }
}

/// Outbound delivery hook. Implementations must return without waiting on
/// delivery and must never surface a failure to the caller.
pub trait NotificationSender: Send + Sync {
    fn send(&self, notification: Notification);
}

impl<T: NotificationSender + ?Sized> NotificationSender for Arc<T> {
    fn send(&self, notification: Notification) {
        (**self).send(notification)
    }
}

impl<T: NotificationSender + ?Sized> NotificationSender for Box<T> {
    fn send(&self, notification: Notification) {
        (**self).send(notification)
    }
}

/// Sends SMS through the Twilio Messages API on a detached tokio task.
#[derive(Clone)]
pub struct TwilioSender {
    client: reqwest::Client,
    config: TwilioConfig,
    endpoint: String,
    in_flight: Arc<Mutex<JoinSet<()>>>,
}

impl TwilioSender {
    pub fn new(config: TwilioConfig) -> Self {
        let endpoint = format!(
            "{TWILIO_API_BASE}/Accounts/{}/Messages.json",
            config.account_sid
        );
        Self {
            client: reqwest::Client::new(),
            config,
            endpoint,
            in_flight: Arc::default(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Waits for deliveries that are still running. Short-lived processes call
    /// this before exiting so the runtime does not cancel them.
    pub async fn flush(&self) {
        let mut pending = {
            let mut guard = match self.in_flight.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            std::mem::take(&mut *guard)
        };

        while pending.join_next().await.is_some() {}
    }

    async fn deliver(
        client: reqwest::Client,
        endpoint: String,
        config: TwilioConfig,
        notification: Notification,
    ) {
        let form = [
            ("To", notification.phone.as_str()),
            ("From", config.from_number.as_str()),
            ("Body", notification.body.as_str()),
        ];

        let result = client
            .post(&endpoint)
            .basic_auth(&config.account_sid, Some(&config.auth_token))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!(to = %notification.phone, "results notification delivered");
            }
            Ok(response) => {
                warn!(
                    to = %notification.phone,
                    status = %response.status(),
                    "twilio rejected results notification"
                );
            }
            Err(err) => {
                warn!(to = %notification.phone, error = %err, "results notification failed");
            }
        }
    }
}

impl std::fmt::Debug for TwilioSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioSender")
            .field("endpoint", &self.endpoint)
            .field("config", &self.config)
            .finish()
    }
}

impl NotificationSender for TwilioSender {
    fn send(&self, notification: Notification) {
        let Ok(handle) = Handle::try_current() else {
            warn!(
                to = %notification.phone,
                "no async runtime available; results notification dropped"
            );
            return;
        };

        let delivery = Self::deliver(
            self.client.clone(),
            self.endpoint.clone(),
            self.config.clone(),
            notification,
        );

        let mut in_flight = match self.in_flight.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        while in_flight.try_join_next().is_some() {}
        in_flight.spawn_on(delivery, &handle);
    }
}

/// Used when no SMS provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSender;

impl NotificationSender for LoggingSender {
    fn send(&self, notification: Notification) {
        info!(
            to = %notification.phone,
            body = %notification.body,
            "sms delivery disabled; notification logged only"
        );
    }
}

/// Records notifications instead of sending them.
#[derive(Debug, Default, Clone)]
pub struct InMemorySender {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl InMemorySender {
    pub fn sent(&self) -> Vec<Notification> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl NotificationSender for InMemorySender {
    fn send(&self, notification: Notification) {
        debug!(to = %notification.phone, "notification captured");
        match self.sent.lock() {
            Ok(mut guard) => guard.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
