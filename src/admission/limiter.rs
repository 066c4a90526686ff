use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use anyhow::Context as _;

use crate::config::AdmissionConfig;
use crate::foundation::error::GiftermResult;

#[derive(Clone, Copy, Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(burst: f64, now: Instant) -> Self {
        Self {
            tokens: burst,
            last_refill: now,
        }
    }

    fn refill(&mut self, rate_per_sec: f64, burst: f64, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * rate_per_sec).min(burst);
        self.last_refill = now;
    }

    fn try_take(&mut self) -> bool {
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct VisitorState {
    bucket: TokenBucket,
    last_seen: Instant,
}

/// Per-client token-bucket admission control.
///
/// Each identity gets its own bucket on first sight. Idle identities are evicted by
/// [`AdmissionController::sweep_at`], which the janitor thread started by
/// [`AdmissionController::start`] calls on a fixed interval.
///
/// All state lives behind one mutex; every operation is a short critical section over the map.
#[derive(Debug)]
pub struct AdmissionController {
    rate_per_sec: f64,
    burst: f64,
    idle_after: Duration,
    sweep_interval: Duration,
    visitors: Mutex<HashMap<String, VisitorState>>,
}

impl AdmissionController {
    /// Controller without a janitor. Call [`Self::sweep_at`] yourself or use [`Self::start`].
    pub fn new(cfg: &AdmissionConfig) -> Self {
        Self {
            rate_per_sec: cfg.rate_per_sec,
            burst: f64::from(cfg.burst),
            idle_after: cfg.idle_after(),
            sweep_interval: cfg.sweep_interval(),
            visitors: Mutex::new(HashMap::new()),
        }
    }

    /// Build a shared controller and spawn its janitor thread.
    ///
    /// The janitor only holds a weak handle and exits after the controller is dropped.
    pub fn start(cfg: &AdmissionConfig) -> GiftermResult<Arc<Self>> {
        let ctl = Arc::new(Self::new(cfg));
        let weak = Arc::downgrade(&ctl);
        let interval = ctl.sweep_interval;
        std::thread::Builder::new()
            .name("gifterm-janitor".to_string())
            .spawn(move || janitor_loop(weak, interval))
            .context("spawn admission janitor thread")?;
        Ok(ctl)
    }

    /// Admit or reject one request from `identity`.
    pub fn check(&self, identity: &str) -> bool {
        self.check_at(identity, Instant::now())
    }

    /// [`Self::check`] against an explicit clock reading.
    ///
    /// A new identity starts with a full bucket. The identity is marked as seen whether or not
    /// the request is admitted.
    pub fn check_at(&self, identity: &str, now: Instant) -> bool {
        let mut visitors = self.lock();
        let state = visitors
            .entry(identity.to_string())
            .or_insert_with(|| VisitorState {
                bucket: TokenBucket::full(self.burst, now),
                last_seen: now,
            });
        state.bucket.refill(self.rate_per_sec, self.burst, now);
        state.last_seen = now;
        let allowed = state.bucket.try_take();
        if !allowed {
            tracing::debug!(identity, "admission rejected");
        }
        allowed
    }

    /// Evict every identity idle for longer than the configured threshold.
    ///
    /// Returns the number of evicted identities.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut visitors = self.lock();
        let before = visitors.len();
        visitors.retain(|_, v| now.saturating_duration_since(v.last_seen) <= self.idle_after);
        before - visitors.len()
    }

    /// Number of tracked identities.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` when no identity is tracked.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether `identity` currently has a bucket.
    pub fn contains(&self, identity: &str) -> bool {
        self.lock().contains_key(identity)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, VisitorState>> {
        // Each critical section is a single map operation, so a poisoned map is still consistent.
        self.visitors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn janitor_loop(ctl: Weak<AdmissionController>, interval: Duration) {
    loop {
        std::thread::sleep(interval);
        let Some(ctl) = ctl.upgrade() else {
            return;
        };
        let evicted = ctl.sweep_at(Instant::now());
        tracing::debug!(evicted, remaining = ctl.len(), "admission janitor sweep");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/admission/limiter.rs"]
mod tests;
