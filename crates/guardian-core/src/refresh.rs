// ── Poll timer ──
//
// The auto-refresh timer as a scoped resource. At most one timer task is
// alive per `AutoRefresh`; enabling spawns it, disabling or dropping the
// handle cancels it. A poll that is already running when the timer is
// cancelled still finishes and applies its result.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The work performed on each tick.
pub type RefreshFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

struct ActiveTimer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owner of the single periodic poll task.
pub struct AutoRefresh {
    period: Duration,
    refresh: RefreshFn,
    /// Cancelling the parent stops any timer spawned from this handle.
    parent: CancellationToken,
    active: Option<ActiveTimer>,
}

impl AutoRefresh {
    /// Create a disabled timer. Must be enabled from within a tokio runtime.
    pub fn new(period: Duration, parent: CancellationToken, refresh: RefreshFn) -> Self {
        Self {
            period,
            refresh,
            parent,
            active: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether a timer task is currently armed.
    pub fn is_enabled(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|t| !t.cancel.is_cancelled() && !t.handle.is_finished())
    }

    /// Arm or disarm the timer. Switching on always cancels any previous
    /// task before spawning the new one. A zero period never arms.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.is_enabled() {
            return;
        }
        self.stop();
        if enabled {
            self.start();
        }
    }

    fn start(&mut self) {
        if self.period.is_zero() {
            debug!("poll period is zero; auto-refresh stays off");
            return;
        }
        let cancel = self.parent.child_token();
        let handle = tokio::spawn(refresh_task(
            self.period,
            Arc::clone(&self.refresh),
            cancel.clone(),
        ));
        debug!(period_secs = self.period.as_secs(), "auto-refresh armed");
        self.active = Some(ActiveTimer { cancel, handle });
    }

    /// Cancel the current timer, if any.
    pub fn stop(&mut self) {
        if let Some(timer) = self.active.take() {
            timer.cancel.cancel();
            debug!("auto-refresh disarmed");
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Tick every `period`; the first tick fires one period after start.
async fn refresh_task(period: Duration, refresh: RefreshFn, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => (refresh)().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, RefreshFn) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let refresh: RefreshFn = Arc::new(move || {
            let c = Arc::clone(&c);
            Box::pin(async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
        });
        (count, refresh)
    }

    /// Let spawned tasks observe the current (paused) clock.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn polls_every_period_while_enabled() {
        let (count, refresh) = counter();
        let mut timer = AutoRefresh::new(Duration::from_secs(30), CancellationToken::new(), refresh);
        timer.set_enabled(true);
        settle().await;

        tokio::time::sleep(Duration::from_secs(29)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn disabling_stops_polls() {
        let (count, refresh) = counter();
        let mut timer = AutoRefresh::new(Duration::from_secs(30), CancellationToken::new(), refresh);
        timer.set_enabled(true);
        settle().await;
        tokio::time::sleep(Duration::from_secs(31)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        timer.set_enabled(false);
        assert!(!timer.is_enabled());
        tokio::time::sleep(Duration::from_secs(300)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn toggling_never_overlaps_timers() {
        let (count, refresh) = counter();
        let mut timer = AutoRefresh::new(Duration::from_secs(30), CancellationToken::new(), refresh);
        for _ in 0..5 {
            timer.set_enabled(true);
            timer.set_enabled(true);
            settle().await;
            timer.set_enabled(false);
            timer.set_enabled(true);
            settle().await;
        }
        tokio::time::sleep(Duration::from_secs(31)).await;
        settle().await;
        // One live timer, one tick.
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_the_timer() {
        let (count, refresh) = counter();
        {
            let mut timer =
                AutoRefresh::new(Duration::from_secs(30), CancellationToken::new(), refresh);
            timer.set_enabled(true);
            settle().await;
        }
        tokio::time::sleep(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_never_arms() {
        let (count, refresh) = counter();
        let mut timer = AutoRefresh::new(Duration::ZERO, CancellationToken::new(), refresh);
        timer.set_enabled(true);
        assert!(!timer.is_enabled());
        tokio::time::sleep(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_stops_timer() {
        let (count, refresh) = counter();
        let parent = CancellationToken::new();
        let mut timer = AutoRefresh::new(Duration::from_secs(30), parent.clone(), refresh);
        timer.set_enabled(true);
        settle().await;
        parent.cancel();
        assert!(!timer.is_enabled());
        tokio::time::sleep(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
