//! Page loads with a bounded number of attempts.

use crate::error::{Result, ScrapeError};
use std::time::Duration;
use tenderwatch_browser::BrowserActions;

/// Load `url`, retrying failed attempts after a fixed delay.
///
/// Attempt failures are logged and discarded. Only exhausting every attempt
/// is an error, and it is fatal for the run.
pub async fn navigate_with_retry<D>(
    driver: &D,
    url: &str,
    attempts: u32,
    delay: Duration,
) -> Result<()>
where
    D: BrowserActions + ?Sized,
{
    let mut last_error = String::from("no attempt made");

    for attempt in 1..=attempts {
        tracing::info!("[Attempt {}/{}] Navigating to {}", attempt, attempts, url);

        match driver.navigate(url).await {
            Ok(()) => {
                tracing::info!("Page loaded successfully");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Navigation attempt {} failed: {}", attempt, e);
                last_error = e.to_string();

                if attempt < attempts {
                    tracing::info!("Retrying in {:?}...", delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    tracing::error!("All {} navigation attempts failed", attempts);
    Err(ScrapeError::NavigationExhausted {
        url: url.to_string(),
        attempts,
        last_error,
    })
}
