use std::time::Duration;

use governor::clock::Clock;
use governor::middleware::NoOpMiddleware;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

/// `governor` clock driven by tokio's timer, so paused-time tests advance it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now().into_std()
    }
}

type DirectRateLimiter<C> =
    RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Fixed-interval dispatch pacer.
///
/// Admits one dispatch per `interval` (burst of one) and optionally adds a
/// random extra delay of up to `jitter` after each admission. A zero interval
/// disables pacing entirely.
pub struct Pacer<C: Clock = TokioClock> {
    limiter: Option<DirectRateLimiter<C>>,
    clock: C,
    jitter: Duration,
}

impl Pacer<TokioClock> {
    pub fn new(interval: Duration, jitter: Duration) -> Self {
        Self::with_clock(interval, jitter, TokioClock)
    }
}

impl<C: Clock> Pacer<C> {
    pub fn with_clock(interval: Duration, jitter: Duration, clock: C) -> Self {
        let limiter =
            Quota::with_period(interval).map(|quota| RateLimiter::direct_with_clock(quota, &clock));
        Self {
            limiter,
            clock,
            jitter,
        }
    }

    pub fn unpaced() -> Self
    where
        C: Default,
    {
        Self::with_clock(Duration::ZERO, Duration::ZERO, C::default())
    }

    /// Claims the next dispatch slot, or reports how long until one opens.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };
        limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Sleeps until a dispatch slot is available, then applies jitter.
    pub async fn until_ready(&self) {
        while let Err(wait) = self.try_acquire() {
            tokio::time::sleep(wait).await;
        }

        if !self.jitter.is_zero() {
            let max_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
            tokio::time::sleep(Duration::from_millis(fastrand::u64(0..=max_ms))).await;
        }
    }

    pub fn is_paced(&self) -> bool {
        self.limiter.is_some()
    }
}

impl<C: Clock> std::fmt::Debug for Pacer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("paced", &self.limiter.is_some())
            .field("jitter", &self.jitter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;

    #[test]
    fn second_dispatch_waits_one_interval() {
        let clock = FakeRelativeClock::default();
        let pacer = Pacer::with_clock(Duration::from_millis(100), Duration::ZERO, clock.clone());

        assert!(pacer.try_acquire().is_ok());
        let wait = pacer.try_acquire().expect_err("second dispatch must wait");
        assert!(wait <= Duration::from_millis(100), "wait={wait:?}");
        assert!(wait > Duration::ZERO);

        clock.advance(Duration::from_millis(100));
        assert!(pacer.try_acquire().is_ok());
    }

    #[test]
    fn zero_interval_disables_pacing() {
        let pacer: Pacer<FakeRelativeClock> = Pacer::unpaced();
        assert!(!pacer.is_paced());
        for _ in 0..100 {
            assert!(pacer.try_acquire().is_ok());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn until_ready_spaces_dispatches_on_tokio_time() {
        let pacer = Pacer::new(Duration::from_millis(250), Duration::ZERO);
        let started = tokio::time::Instant::now();

        for _ in 0..5 {
            pacer.until_ready().await;
        }

        assert!(started.elapsed() >= Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn jittered_dispatch_waits_at_most_interval_plus_jitter() {
        let interval = Duration::from_millis(100);
        let jitter = Duration::from_millis(50);
        let pacer = Pacer::new(interval, jitter);
        // tokio timers round up to the next millisecond.
        let ceiling = interval + jitter + Duration::from_millis(2);
        let started = tokio::time::Instant::now();

        for _ in 0..20 {
            let before = tokio::time::Instant::now();
            pacer.until_ready().await;
            let waited = before.elapsed();
            assert!(waited <= ceiling, "waited={waited:?}");
        }

        assert!(started.elapsed() >= interval * 19);
    }
}
