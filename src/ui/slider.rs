use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideState {
    pub current: usize,
    pub count: usize,
}

/// Hero slider of the home page: one active slide and its matching dot.
#[derive(Clone)]
pub struct HeroSlider {
    current: Arc<RwLock<usize>>,
    count: usize,
}

impl HeroSlider {
    pub fn new(count: usize) -> Self {
        Self {
            current: Arc::new(RwLock::new(0)),
            count,
        }
    }

    pub async fn state(&self) -> SlideState {
        SlideState {
            current: *self.current.read().await,
            count: self.count,
        }
    }

    /// Activates slide `index`. Out of range indices are ignored.
    pub async fn show(&self, index: usize) {
        if index < self.count {
            *self.current.write().await = index;
        }
    }

    /// Steps forward (positive) or back (negative), wrapping at both ends.
    pub async fn change(&self, direction: isize) {
        if self.count == 0 {
            return;
        }
        let mut current = self.current.write().await;
        let count = self.count as isize;
        *current = (*current as isize + direction).rem_euclid(count) as usize;
    }

    /// Activates a slide by its one-based dot number.
    pub async fn go_to(&self, one_based: usize) {
        if let Some(index) = one_based.checked_sub(1) {
            self.show(index).await;
        }
    }

    /// Advances one slide every `interval` until the returned task is aborted.
    pub fn start_autoplay(&self, interval: Duration) -> Option<JoinHandle<()>> {
        if self.count == 0 || interval.is_zero() {
            return None;
        }
        let slider = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                slider.change(1).await;
                debug!("Hero slider advanced to {}", *slider.current.read().await);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_change_wraps_both_ways() {
        let slider = HeroSlider::new(3);
        slider.change(-1).await;
        assert_eq!(slider.state().await.current, 2);
        slider.change(1).await;
        assert_eq!(slider.state().await.current, 0);
    }

    #[tokio::test]
    async fn test_go_to_is_one_based() {
        let slider = HeroSlider::new(3);
        slider.go_to(3).await;
        assert_eq!(slider.state().await.current, 2);
        slider.go_to(0).await;
        slider.go_to(4).await;
        assert_eq!(slider.state().await.current, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_advances_each_interval() {
        let slider = HeroSlider::new(3);
        let handle = slider.start_autoplay(Duration::from_secs(5)).unwrap();

        tokio::time::sleep(Duration::from_millis(5_100)).await;
        assert_eq!(slider.state().await.current, 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(slider.state().await.current, 0);

        handle.abort();
    }

    #[test]
    fn test_empty_slider_has_no_autoplay() {
        let slider = HeroSlider::new(0);
        assert!(slider.start_autoplay(Duration::from_secs(5)).is_none());
        assert!(
            HeroSlider::new(3)
                .start_autoplay(Duration::ZERO)
                .is_none()
        );
    }
}
