//! Slack-compatible webhook alerts
//!
//! Alerts are best-effort: delivery problems are logged and reported through
//! [`Delivery`], never raised to the caller.

use cleanops_common::resilience::{Clock, SystemClock};
use cleanops_domain::{AlertsConfig, HttpCallConfig};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::http::{CallOptions, ResilientClient};

/// Payment anomaly summary posted to the alerts channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAlert {
    /// Who raised the alert; `None` for automated checks
    pub actor: Option<String>,
    pub failed_payments: u32,
    pub pending_payments: u32,
}

impl PaymentAlert {
    pub fn message(&self) -> String {
        format!(
            ":rotating_light: Payment alerts detected (by {}). Failed: {}. Pending: {}.",
            self.actor.as_deref().unwrap_or("system"),
            self.failed_payments,
            self.pending_payments
        )
    }
}

/// What happened to one alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Webhook accepted the message
    Sent(StatusCode),
    /// No webhook URL configured; nothing was sent
    NotConfigured,
    /// Webhook answered with a non-success status that is not retried
    Rejected(StatusCode),
    /// Circuit open, cancelled, retries exhausted or the request was invalid
    Failed(String),
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Posts alert messages to a Slack incoming webhook
#[derive(Clone)]
pub struct SlackNotifier<C: Clock = SystemClock> {
    client: ResilientClient<C>,
    webhook: Option<String>,
    options: CallOptions,
}

impl<C: Clock> SlackNotifier<C> {
    pub fn new(client: ResilientClient<C>, alerts: &AlertsConfig, http: &HttpCallConfig) -> Self {
        let options = CallOptions::from_config(http)
            .breaker(alerts.breaker_key.clone())
            .label(alerts.label.clone());

        Self { client, webhook: alerts.slack_webhook.clone(), options }
    }

    /// Replace the call options used for every delivery
    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.webhook.is_some()
    }

    #[instrument(skip(self, alert), fields(failed = alert.failed_payments, pending = alert.pending_payments))]
    pub async fn notify_payment_alert(&self, alert: &PaymentAlert) -> Delivery {
        self.notify_text(&alert.message()).await
    }

    /// Post `text` to the webhook
    pub async fn notify_text(&self, text: &str) -> Delivery {
        let Some(webhook) = self.webhook.as_deref() else {
            info!(label = %self.options.label, "alert webhook not configured; skipping");
            return Delivery::NotConfigured;
        };

        let request =
            self.client.request(Method::POST, webhook).json(&WebhookPayload { text });

        match self.client.send(request, &self.options).await {
            Ok(response) if response.status().is_success() => Delivery::Sent(response.status()),
            Ok(response) => {
                warn!(status = %response.status(), "alert webhook rejected message");
                Delivery::Rejected(response.status())
            }
            Err(err) => {
                error!(error = %err, "failed to send alert");
                Delivery::Failed(err.to_string())
            }
        }
    }
}
