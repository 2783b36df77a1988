use std::future::Future;
use std::time::Duration;

/// Fixed-backoff retry: up to `attempts` tries with `backoff` between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const fn new(attempts: u32, backoff: Duration) -> Self {
        Self { attempts, backoff }
    }

    /// Run `op` until it succeeds or the attempts are used up, returning the
    /// last error in that case. `op` and `on_failure` get the 1-based attempt
    /// number. At least one attempt is always made, and there is no sleep
    /// after the final failure.
    pub async fn run<T, E, F, Fut>(
        &self,
        mut op: F,
        mut on_failure: impl FnMut(u32, &E),
    ) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    on_failure(attempt, &e);
                    if attempt >= attempts {
                        return Err(e);
                    }
                }
            }
            attempt += 1;
            tokio::time::sleep(self.backoff).await;
        }
    }
}
