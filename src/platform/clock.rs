use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, PoisonError};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type DynClock = Arc<dyn Clock>;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Never hands out the same instant twice: a reading that does not move past
/// the previous one is bumped by a microsecond.
pub struct MonotonicClock<C> {
    inner: C,
    last: Mutex<Option<DateTime<Utc>>>,
}

impl<C: Clock> MonotonicClock<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let mut now = self.inner.now();
        if let Some(prev) = *last
            && now <= prev
        {
            now = prev + Duration::microseconds(1);
        }
        *last = Some(now);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Frozen(DateTime<Utc>);

    impl Clock for Frozen {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn test_monotonic_clock_never_repeats() {
        let base = Utc::now();
        let clock = MonotonicClock::new(Frozen(base));
        let a = clock.now();
        let b = clock.now();
        let c = clock.now();
        assert_eq!(a, base);
        assert!(a < b && b < c);
    }
}
