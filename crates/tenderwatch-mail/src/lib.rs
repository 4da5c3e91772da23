pub mod error;
pub mod notification;
pub mod notifier;
pub mod sender;

pub use error::{MailError, Result};
pub use notification::{match_fragment, Notification, NO_MATCH_BODY};
pub use notifier::{Notifier, SmtpNotifier};
pub use sender::{body_hash, build_message, Delivery, SmtpConfig};
