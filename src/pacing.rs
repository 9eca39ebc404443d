//! Delays between retries and between pages.
//!
//! The remote site is rate sensitive; randomized pauses are the only
//! throttling the scraper does. Keeping them behind [`Pacer`] lets tests
//! run without sleeping.

use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::error::ConfigError;

/// An inclusive range a pause duration is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterWindow {
    min: Duration,
    max: Duration,
}

impl JitterWindow {
    pub fn new(min: Duration, max: Duration) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidWindow { min, max });
        }
        Ok(Self { min, max })
    }

    /// Whole-second window. Panics on `min > max`; meant for constants.
    pub const fn from_secs(min: u64, max: u64) -> Self {
        assert!(min <= max, "jitter window min exceeds max");
        Self {
            min: Duration::from_secs(min),
            max: Duration::from_secs(max),
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let secs = rng.gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

/// Waits before the next attempt or page.
pub trait Pacer {
    fn pause(&self, window: JitterWindow);
}

impl<P: Pacer + ?Sized> Pacer for &P {
    fn pause(&self, window: JitterWindow) {
        (**self).pause(window)
    }
}

/// Sleeps the current thread for a uniformly random duration in the window.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPacer;

impl Pacer for RandomPacer {
    fn pause(&self, window: JitterWindow) {
        let delay = window.sample(&mut rand::thread_rng());
        debug!("waiting {:.2}s", delay.as_secs_f64());
        std::thread::sleep(delay);
    }
}

/// Never waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPause;

impl Pacer for NoPause {
    fn pause(&self, _window: JitterWindow) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rejects_inverted_window() {
        let err = JitterWindow::new(Duration::from_secs(5), Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWindow { .. }));
    }

    #[test]
    fn samples_stay_inside_window() {
        let window = JitterWindow::from_secs(3, 7);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let d = window.sample(&mut rng);
            assert!(d >= window.min() && d <= window.max(), "{d:?}");
        }
    }

    #[test]
    fn degenerate_window_is_exact() {
        let window = JitterWindow::from_secs(2, 2);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(window.sample(&mut rng), Duration::from_secs(2));
    }
}
