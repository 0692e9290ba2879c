//! Clock abstraction for token time checks.
//!
//! Token expiry is evaluated against an injected clock rather than
//! `jsonwebtoken`'s built-in validation, so lifecycle tests can move time.

/// Source of the current instant, in Unix epoch seconds.
pub trait Clock: Send + Sync {
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Manually advanced clock for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock(std::sync::atomic::AtomicI64);

#[cfg(test)]
impl ManualClock {
    pub fn at(epoch_secs: i64) -> Self {
        Self(std::sync::atomic::AtomicI64::new(epoch_secs))
    }

    pub fn set(&self, epoch_secs: i64) {
        self.0.store(epoch_secs, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.0.fetch_add(secs, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}
