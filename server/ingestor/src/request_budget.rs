use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Sliding-window request budget: at most `max_requests` starts within any
/// `window`. Callers over budget wait their turn in arrival order.
#[derive(Debug)]
pub struct RequestBudget {
    started: Mutex<VecDeque<Instant>>,
    max_requests: usize,
    window: Duration,
}

impl RequestBudget {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        let max_requests = max_requests.max(1);
        Self {
            started: Mutex::new(VecDeque::with_capacity(max_requests)),
            max_requests,
            window,
        }
    }

    pub async fn acquire(&self) {
        // the lock is held while waiting, which keeps waiters in FIFO order
        let mut started = self.started.lock().await;

        loop {
            let now = Instant::now();
            while started
                .front()
                .is_some_and(|&start| now.duration_since(start) >= self.window)
            {
                started.pop_front();
            }

            if started.len() < self.max_requests {
                started.push_back(now);
                return;
            }

            if let Some(&oldest) = started.front() {
                tracing::debug!(
                    wait_ms = (oldest + self.window - now).as_millis(),
                    "request budget exhausted, waiting"
                );
                tokio::time::sleep_until(oldest + self.window).await;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use futures_util::future::join_all;

    #[tokio::test(start_paused = true)]
    async fn requests_within_budget_start_immediately() {
        let budget = RequestBudget::new(3, Duration::from_secs(1));
        let start = Instant::now();

        for _ in 0..3 {
            budget.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn requests_over_budget_wait_for_the_window() {
        let budget = RequestBudget::new(2, Duration::from_secs(1));
        let start = Instant::now();
        let mut started_after = vec![];

        for _ in 0..5 {
            budget.acquire().await;
            started_after.push(start.elapsed());
        }

        assert_eq!(
            started_after,
            [0, 0, 1, 1, 2].map(Duration::from_secs).to_vec()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_are_queued_not_dropped() {
        let budget = RequestBudget::new(2, Duration::from_millis(500));
        let start = Instant::now();

        let started_after = join_all((0..6).map(|_| async {
            budget.acquire().await;
            start.elapsed()
        }))
        .await;

        assert_eq!(
            started_after,
            [0, 0, 500, 500, 1000, 1000]
                .map(Duration::from_millis)
                .to_vec()
        );
    }

    #[test]
    fn zero_budget_still_lets_requests_through() {
        assert_eq!(RequestBudget::new(0, Duration::from_secs(1)).max_requests, 1);
    }
}
