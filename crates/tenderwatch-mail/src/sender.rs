use crate::error::{MailError, Result};
use crate::notification::Notification;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use sha2::{Digest, Sha256};
use tenderwatch_core::NotificationConfig;

/// Port that expects STARTTLS instead of implicit TLS
const SUBMISSION_PORT: u16 = 587;

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Delivery settings resolved from configuration.
#[derive(Clone)]
pub struct Delivery {
    pub from: String,
    pub to: String,
    pub smtp: SmtpConfig,
}

impl Delivery {
    /// Resolve sender, recipient and credentials. The SMTP login defaults to
    /// the sender address.
    pub fn from_config(config: &NotificationConfig) -> Result<Self> {
        let from = config
            .sender
            .clone()
            .ok_or(MailError::MissingSetting("sender"))?;
        let to = config
            .recipient
            .clone()
            .ok_or(MailError::MissingSetting("recipient"))?;
        let password = config
            .smtp_password
            .clone()
            .ok_or(MailError::MissingSetting("smtp_password"))?;

        Ok(Self {
            smtp: SmtpConfig {
                host: config.smtp_host.clone(),
                port: config.smtp_port,
                username: config.smtp_username.clone().unwrap_or_else(|| from.clone()),
                password,
            },
            from,
            to,
        })
    }
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address.parse().map_err(|e| MailError::Address {
        address: address.to_string(),
        reason: format!("{e}"),
    })
}

/// Build the MIME message: HTML body followed by one part per attachment.
pub async fn build_message(notification: &Notification, from: &str, to: &str) -> Result<Message> {
    let octet_stream = ContentType::parse("application/octet-stream")
        .map_err(|e| MailError::Build(e.to_string()))?;

    let mut parts = MultiPart::mixed().singlepart(SinglePart::html(notification.html_body.clone()));
    for path in &notification.attachments {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| MailError::Attachment {
                path: path.clone(),
                source,
            })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        parts = parts.singlepart(Attachment::new(name).body(bytes, octet_stream.clone()));
    }

    Message::builder()
        .from(mailbox(from)?)
        .to(mailbox(to)?)
        .subject(&notification.subject)
        .multipart(parts)
        .map_err(|e| MailError::Build(e.to_string()))
}

/// Sends via SMTP using lettre.
pub async fn send_smtp(message: Message, config: &SmtpConfig) -> Result<()> {
    let creds = Credentials::new(config.username.clone(), config.password.clone());
    let builder = if config.port == SUBMISSION_PORT {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
    }
    .map_err(|e| MailError::Transport(format!("SMTP relay error: {e}")))?;

    let transport = builder.port(config.port).credentials(creds).build();
    transport
        .send(message)
        .await
        .map_err(|e| MailError::Transport(e.to_string()))?;
    Ok(())
}

/// SHA-256 hex of a message body. Logs carry the hash, never the body.
pub fn body_hash(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}
