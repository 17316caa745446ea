use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::Clock;
use governor::middleware::NoOpMiddleware;
use governor::nanos::Nanos;
use governor::state::{InMemoryState, NotKeyed};
use governor::Quota;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// Governor clock driven by tokio's timer, so waits line up with
/// `tokio::time::sleep` and a paused test clock.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    type Instant = Nanos;

    fn now(&self) -> Nanos {
        Nanos::from(self.origin.elapsed())
    }
}

type DirectLimiter =
    governor::RateLimiter<NotKeyed, InMemoryState, TokioClock, NoOpMiddleware<Nanos>>;

/// Enforces a minimum spacing between upstream requests.
///
/// One instance is shared by every fetch path. The quota allows a single
/// request per `interval` with no burst. Waiters queue on a fair mutex, so
/// concurrent callers are let through one at a time in arrival order.
pub struct RateLimiter {
    interval: Duration,
    clock: TokioClock,
    turn: Mutex<()>,
    // `None` for a zero interval.
    inner: Option<DirectLimiter>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        let clock = TokioClock::new();
        let inner = Quota::with_period(interval).map(|quota| {
            DirectLimiter::direct_with_clock(quota.allow_burst(NonZeroU32::MIN), clock.clone())
        });
        Self {
            interval,
            clock,
            turn: Mutex::new(()),
            inner,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the quota admits one more request.
    pub async fn acquire(&self) {
        let Some(limiter) = &self.inner else {
            return;
        };
        let _turn = self.turn.lock().await;
        while let Err(not_until) = limiter.check() {
            let wait = not_until.wait_time_from(self.clock.now());
            trace!(?wait, "rate limited");
            tokio::time::sleep(wait).await;
        }
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
