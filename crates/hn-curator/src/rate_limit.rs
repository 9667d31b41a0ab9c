use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Token bucket pacing judge requests. `acquire` waits instead of rejecting.
#[derive(Clone)]
pub struct RateLimiter {
    rps: u32,
    state: Arc<Mutex<State>>,
}

#[derive(Debug)]
struct State {
    tokens: f64,
    last: Instant,
}

impl RateLimiter {
    /// `None` when `rps` is absent or zero.
    pub fn new(rps: Option<u32>) -> Option<Self> {
        let rps = rps.filter(|&n| n > 0)?;
        Some(Self {
            rps,
            state: Arc::new(Mutex::new(State {
                tokens: rps as f64,
                last: Instant::now(),
            })),
        })
    }

    pub fn rps(&self) -> u32 {
        self.rps
    }

    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(state.last);
                state.last = now;

                let refill = elapsed.as_secs_f64() * self.rps as f64;
                state.tokens = (state.tokens + refill).min(self.rps as f64);

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - state.tokens) / self.rps as f64)
            };
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_without_positive_rate() {
        assert!(RateLimiter::new(None).is_none());
        assert!(RateLimiter::new(Some(0)).is_none());
        assert_eq!(RateLimiter::new(Some(3)).map(|l| l.rps()), Some(3));
    }

    #[tokio::test]
    async fn waits_once_the_burst_is_spent() {
        let limiter = RateLimiter::new(Some(2)).unwrap();
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;
        // third token needs roughly half a second of refill
        assert!(start.elapsed() >= Duration::from_millis(400));
    }
}
