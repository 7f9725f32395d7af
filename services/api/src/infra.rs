use lionheart::config::{NotificationConfig, ScoringConfig};
use lionheart::error::AppError;
use lionheart::results::{LoggingSender, Notification, NotificationSender, TwilioSender};
use lionheart::scoring::ScoringKey;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Delivery channel selected from configuration at startup.
#[derive(Debug, Clone)]
pub(crate) enum ConfiguredSender {
    Twilio(TwilioSender),
    Logging(LoggingSender),
}

impl ConfiguredSender {
    pub(crate) fn from_config(config: &NotificationConfig) -> Self {
        match &config.twilio {
            Some(twilio) => {
                info!(from = %twilio.from_number, "sms notifications enabled via twilio");
                Self::Twilio(TwilioSender::new(twilio.clone()))
            }
            None => {
                warn!("twilio credentials not configured; notifications will only be logged");
                Self::Logging(LoggingSender)
            }
        }
    }

    pub(crate) async fn flush(&self) {
        if let Self::Twilio(sender) = self {
            sender.flush().await;
        }
    }
}

impl NotificationSender for ConfiguredSender {
    fn send(&self, notification: Notification) {
        match self {
            Self::Twilio(sender) => sender.send(notification),
            Self::Logging(sender) => sender.send(notification),
        }
    }
}

/// Loads the scoring key once for the life of the process.
pub(crate) fn load_scoring_key(config: &ScoringConfig) -> Result<Arc<ScoringKey>, AppError> {
    let key = ScoringKey::from_path(&config.key_path)?;
    info!(
        path = %config.key_path.display(),
        rules = key.len(),
        scored = key.scored_len(),
        "scoring key loaded"
    );
    Ok(Arc::new(key))
}
