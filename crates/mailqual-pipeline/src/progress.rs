//! Progress events and their dispatcher (§4.F, §5, §9).
//!
//! Replaces a bare callback with a typed event dispatched on a dedicated
//! task: the dispatcher holds only the most recent event (a `tokio::sync::
//! watch` channel is inherently latest-wins) and the consumer task invokes
//! the user's callback without holding any pipeline lock.

use std::time::Duration;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct FileProgress {
    pub filename: String,
    pub total_records_seen: u64,
    pub rate_per_sec: f64,
    pub eta: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub files_done: usize,
    pub files_total: usize,
    pub elapsed: Duration,
    pub eta: Option<Duration>,
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    File(FileProgress),
    Batch(BatchProgress),
}

/// Exponentially weighted moving average of per-record duration over the
/// last ~1,000 records, used to derive `rate_per_sec`/`eta` (§4.F).
#[derive(Debug, Clone)]
pub struct EwmaRate {
    alpha: f64,
    avg_seconds: Option<f64>,
}

impl EwmaRate {
    pub fn new() -> Self {
        // alpha chosen so ~1,000 samples dominate the average, matching
        // the "last 1,000 records" window named in §4.F.
        Self {
            alpha: 2.0 / 1_001.0,
            avg_seconds: None,
        }
    }

    pub fn observe(&mut self, sample: Duration) {
        let seconds = sample.as_secs_f64();
        self.avg_seconds = Some(match self.avg_seconds {
            Some(avg) => self.alpha * seconds + (1.0 - self.alpha) * avg,
            None => seconds,
        });
    }

    pub fn rate_per_sec(&self) -> f64 {
        match self.avg_seconds {
            Some(avg) if avg > 0.0 => 1.0 / avg,
            _ => 0.0,
        }
    }

    pub fn eta(&self, remaining: u64) -> Option<Duration> {
        let avg = self.avg_seconds?;
        Some(Duration::from_secs_f64(avg * remaining as f64))
    }
}

impl Default for EwmaRate {
    fn default() -> Self {
        Self::new()
    }
}

/// A progress sink: a dedicated `watch` channel plus a consumer task
/// draining it and invoking the user callback. Sends are non-blocking and
/// coalesce (only the latest unread event survives) if the consumer falls
/// behind.
pub struct ProgressDispatcher {
    tx: watch::Sender<Option<ProgressEvent>>,
}

impl ProgressDispatcher {
    /// Spawn the dispatcher task. `callback` is invoked on the dispatcher
    /// task, never on a worker, so workers never block on it.
    pub fn spawn<F>(callback: F) -> Self
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        let (tx, mut rx) = watch::channel(None);
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let event = rx.borrow_and_update().clone();
                if let Some(event) = event {
                    callback(event);
                }
            }
        });
        Self { tx }
    }

    pub fn report(&self, event: ProgressEvent) {
        // `send` on a watch channel overwrites the previous value; a slow
        // consumer only ever sees the most recent one.
        let _ = self.tx.send(Some(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ewma_rate_increases_as_samples_get_faster() {
        let mut rate = EwmaRate::new();
        rate.observe(Duration::from_millis(100));
        let slow = rate.rate_per_sec();
        for _ in 0..2000 {
            rate.observe(Duration::from_millis(1));
        }
        let fast = rate.rate_per_sec();
        assert!(fast > slow);
    }

    #[test]
    fn eta_scales_with_remaining_count() {
        let mut rate = EwmaRate::new();
        rate.observe(Duration::from_millis(10));
        let eta_10 = rate.eta(10).unwrap();
        let eta_100 = rate.eta(100).unwrap();
        assert!(eta_100 > eta_10);
    }
}
