use crate::error::Result;
use crate::notification::Notification;
use crate::sender::{body_hash, build_message, send_smtp, Delivery};

/// Delivers a composed notification.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Notifier that sends over authenticated SMTP.
pub struct SmtpNotifier {
    delivery: Delivery,
}

impl SmtpNotifier {
    pub fn new(delivery: Delivery) -> Self {
        Self { delivery }
    }
}

#[async_trait::async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let message = build_message(notification, &self.delivery.from, &self.delivery.to).await?;

        tracing::info!(
            "Sending '{}' to {} with {} attachments (body sha256 {})",
            notification.subject,
            self.delivery.to,
            notification.attachments.len(),
            body_hash(&notification.html_body)
        );
        send_smtp(message, &self.delivery.smtp).await?;
        tracing::info!("Notification sent");
        Ok(())
    }
}
