//! Order notifications
//!
//! The outbound half of order creation: a new order triggers a WhatsApp
//! message to the shop's order-desk number through a third-party messaging
//! API. Delivery is strictly best-effort — a failed notification is logged
//! and never blocks or rolls back the order it announces.

use reqwest::Client;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while sending an order notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// A required environment variable is unset.
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    /// HTTP transport failure.
    #[error("notification request failed")]
    Http(#[from] reqwest::Error),

    /// The messaging API answered with a non-success status.
    #[error("notification rejected with status {0}")]
    Rejected(reqwest::StatusCode),
}

/// Configuration for the messaging API.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Messaging API endpoint, e.g. `"https://api.example.com/v1/messages"`.
    pub endpoint: String,

    /// Bearer token for the messaging API.
    pub api_key: String,

    /// Phone number that receives new-order messages.
    pub recipient: String,
}

impl NotifyConfig {
    /// Read the configuration from `NOTIFY_ENDPOINT`, `NOTIFY_API_KEY` and
    /// `NOTIFY_RECIPIENT`.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError::MissingVar`] naming the first unset variable.
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, NotifyError> {
        let var = |name| lookup(name).ok_or(NotifyError::MissingVar(name));

        Ok(Self {
            endpoint: var("NOTIFY_ENDPOINT")?,
            api_key: var("NOTIFY_API_KEY")?,
            recipient: var("NOTIFY_RECIPIENT")?,
        })
    }
}

/// HTTP client posting new-order messages to the messaging API.
#[derive(Debug, Clone)]
pub struct OrderNotifier {
    config: NotifyConfig,
    http: Client,
}

impl OrderNotifier {
    /// Create a new notifier from the given configuration.
    #[must_use]
    pub fn new(config: NotifyConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Announce a freshly created order.
    ///
    /// Failures are logged and swallowed; the order this call announces has
    /// already been persisted and must not be affected.
    pub async fn order_created(&self, order_id: &str, total: &Money<'_, Currency>) {
        match self.send(order_id, total).await {
            Ok(()) => debug!(order_id, "order notification sent"),
            Err(error) => warn!(order_id, %error, "order notification failed"),
        }
    }

    async fn send(&self, order_id: &str, total: &Money<'_, Currency>) -> Result<(), NotifyError> {
        let body = serde_json::json!({
            "to": self.config.recipient,
            "body": message_text(order_id, total),
        });

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status()));
        }

        Ok(())
    }
}

/// Build the message announcing a new order.
fn message_text(order_id: &str, total: &Money<'_, Currency>) -> String {
    format!("New order {order_id} received. Total: {total}.")
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;

    use super::*;

    #[test]
    fn message_includes_order_id_and_formatted_total() {
        let total = Money::from_minor(1_234_50, USD);
        let text = message_text("ord_42", &total);

        assert!(text.contains("ord_42"));
        assert!(text.contains("1,234.50"));
    }

    #[test]
    fn config_reads_all_three_variables() {
        let config = NotifyConfig::from_lookup(|name| match name {
            "NOTIFY_ENDPOINT" => Some("https://api.example.com/v1/messages".to_owned()),
            "NOTIFY_API_KEY" => Some("key".to_owned()),
            "NOTIFY_RECIPIENT" => Some("+10000000000".to_owned()),
            _ => None,
        })
        .expect("config should load");

        assert_eq!(config.endpoint, "https://api.example.com/v1/messages");
        assert_eq!(config.recipient, "+10000000000");
    }

    #[test]
    fn missing_variable_names_the_first_gap() {
        let result = NotifyConfig::from_lookup(|name| match name {
            "NOTIFY_ENDPOINT" => Some("https://api.example.com/v1/messages".to_owned()),
            _ => None,
        });

        assert!(matches!(
            result,
            Err(NotifyError::MissingVar("NOTIFY_API_KEY"))
        ));
    }
}
