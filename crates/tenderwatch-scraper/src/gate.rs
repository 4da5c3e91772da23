//! Best-effort waits on the rendered page.
//!
//! Neither wait fails: a timeout just reports that the condition was not
//! observed, and the caller picks the fallback.

use std::time::Duration;
use tenderwatch_browser::BrowserActions;
use tokio::time::Instant;

/// Wait until nothing matches `overlay`, or until `timeout` elapses.
///
/// Returns `true` if the overlay was observed absent. Driver errors count as
/// "still loading".
pub async fn await_stable<D>(driver: &D, overlay: &str, timeout: Duration, poll: Duration) -> bool
where
    D: BrowserActions + ?Sized,
{
    let deadline = Instant::now() + timeout;

    loop {
        match driver.count(overlay).await {
            Ok(0) => return true,
            Ok(n) => tracing::debug!("Loading overlay still present ({} nodes)", n),
            Err(e) => tracing::debug!("Overlay check failed: {}", e),
        }

        if Instant::now() >= deadline {
            tracing::debug!("Loading overlay did not clear within {:?}", timeout);
            return false;
        }
        tokio::time::sleep(poll).await;
    }
}

/// Wait until at least one node matches `xpath`, or until `timeout` elapses.
pub async fn wait_for_element<D>(driver: &D, xpath: &str, timeout: Duration, poll: Duration) -> bool
where
    D: BrowserActions + ?Sized,
{
    let deadline = Instant::now() + timeout;

    loop {
        if let Ok(n) = driver.count(xpath).await {
            if n > 0 {
                return true;
            }
        }

        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(poll).await;
    }
}
