use std::future::Future;
use std::time::Duration;

use super::logger::LOGGER;

/// Bound on direct provider callback completion.
pub const GET_TOKEN_TIMEOUT: Duration = Duration::from_millis(5000);

/// Block on `operation` for at most `timeout`, yielding to the cooperative
/// scheduler while polling. Returns `Some` with the operation's output on
/// completion (whatever its success), `None` on timeout. A timed-out
/// operation is left pending; callers treat `None` as a fatal test failure
/// and never retry.
pub async fn await_completion<F, T>(operation: F, label: &str, timeout: Duration) -> Option<T>
where
    F: Future<Output = T>,
{
    LOGGER.debug(format!("Waiting for {label}"));
    match tokio::time::timeout(timeout, operation).await {
        Ok(output) => Some(output),
        Err(_) => {
            LOGGER.error(format!(
                "{label} did not complete within {} ms",
                timeout.as_millis()
            ));
            None
        }
    }
}

/// Cooperatively pump for the given duration, letting background work make
/// progress.
pub async fn process_events(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}
