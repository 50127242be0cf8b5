use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// What the page shows of the navigation sidebar.
///
/// `open` drives the slide animation; `displayed` stays true until the
/// closing animation has had time to finish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SidebarState {
    pub open: bool,
    pub displayed: bool,
}

#[derive(Debug, Default)]
struct Inner {
    state: SidebarState,
    // Bumped by every show/close; a pending hide only lands if it still matches.
    generation: u64,
}

/// Navigation sidebar with its overlay.
#[derive(Clone)]
pub struct Sidebar {
    inner: Arc<RwLock<Inner>>,
    close_delay: Duration,
}

impl Sidebar {
    pub fn new(close_delay: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            close_delay,
        }
    }

    pub async fn state(&self) -> SidebarState {
        self.inner.read().await.state
    }

    pub async fn show(&self) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.state = SidebarState {
            open: true,
            displayed: true,
        };
    }

    /// Starts the closing animation; the sidebar is hidden once the close
    /// delay has passed, unless it was shown again meanwhile.
    pub async fn close(&self) -> JoinHandle<()> {
        let generation = {
            let mut inner = self.inner.write().await;
            inner.generation += 1;
            inner.state.open = false;
            inner.generation
        };

        let inner = self.inner.clone();
        let delay = self.close_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = inner.write().await;
            if inner.generation == generation {
                inner.state.displayed = false;
            } else {
                debug!("Sidebar reopened before its close animation ended");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_close_hides_after_animation() {
        let sidebar = Sidebar::new(Duration::from_millis(220));
        sidebar.show().await;
        assert_eq!(
            sidebar.state().await,
            SidebarState {
                open: true,
                displayed: true
            }
        );

        let _hide = sidebar.close().await;
        assert!(!sidebar.state().await.open);
        assert!(sidebar.state().await.displayed);

        tokio::time::sleep(Duration::from_millis(219)).await;
        assert!(sidebar.state().await.displayed);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(sidebar.state().await, SidebarState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopen_during_close_keeps_sidebar_visible() {
        let sidebar = Sidebar::new(Duration::from_millis(220));
        sidebar.show().await;
        let hide = sidebar.close().await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        sidebar.show().await;
        hide.await.unwrap();

        assert_eq!(
            sidebar.state().await,
            SidebarState {
                open: true,
                displayed: true
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_when_already_closed_is_harmless() {
        let sidebar = Sidebar::new(Duration::from_millis(220));
        sidebar.close().await.await.unwrap();
        assert_eq!(sidebar.state().await, SidebarState::default());
    }
}
