use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::config_model::Resend;
use crate::domain::repositories::order_notifications::OrderNotifier;

/// Sends customer emails through the Resend API. When no API key is
/// configured the mailer degrades to a no-op so local setups do not need a
/// mail account.
pub struct ResendMailer {
    http: reqwest::Client,
    config: Option<Resend>,
}

impl ResendMailer {
    pub fn new(config: Option<Resend>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Self { http, config }
    }

    async fn send(&self, to: &str, subject: &str, html: String) -> Result<()> {
        let Some(config) = self.config.as_ref() else {
            debug!(to, subject, "resend_mailer: no API key configured, skipping send");
            return Ok(());
        };

        let resp = self
            .http
            .post("https://api.resend.com/emails")
            .bearer_auth(&config.api_key)
            .json(&json!({
                "from": config.from_address,
                "to": to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Resend API request failed (status {status}): {body}");
        }

        info!(to, subject, "resend_mailer: email sent");
        Ok(())
    }
}

#[async_trait]
impl OrderNotifier for ResendMailer {
    async fn send_payment_confirmed(
        &self,
        to: &str,
        order_id: Uuid,
        amount_minor: i64,
    ) -> Result<()> {
        let html = format!(
            "<h1>Order Confirmation</h1>\
             <p>Thank you for your order!</p>\
             <p>Order ID: {order_id}</p>\
             <p>Amount: {}.{:02}</p>",
            amount_minor / 100,
            amount_minor % 100
        );

        self.send(to, "Order Payment Confirmed", html).await
    }

    async fn send_status_update(&self, to: &str, order_id: Uuid, status: &str) -> Result<()> {
        let html = format!(
            "<h1>Order Status Update</h1>\
             <p>Your order status has been updated.</p>\
             <p>Order ID: {order_id}</p>\
             <p>New Status: {status}</p>"
        );

        self.send(to, "Order Status Update", html).await
    }
}
