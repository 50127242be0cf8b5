use super::FullscreenError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Elements that can hold fullscreen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Document,
    Lightbox,
    Stage,
    Image,
    Other,
}

impl Element {
    /// True for the viewer container and anything nested inside it.
    pub fn is_within_lightbox(self) -> bool {
        matches!(self, Element::Lightbox | Element::Stage | Element::Image)
    }
}

/// A fullscreen change the page has been asked to carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "element", rename_all = "snake_case")]
pub enum FullscreenRequest {
    Enter(Element),
    Exit,
}

#[async_trait]
pub trait FullscreenController: Send + Sync {
    async fn request_fullscreen(&self, element: Element) -> Result<(), FullscreenError>;
    async fn exit_fullscreen(&self) -> Result<(), FullscreenError>;
    async fn fullscreen_element(&self) -> Option<Element>;

    /// Records the element the platform reports as fullscreen, if any.
    async fn report(&self, element: Option<Element>);

    /// Request still waiting for the platform to act on it.
    async fn pending_request(&self) -> Option<FullscreenRequest> {
        None
    }
}

pub type DynFullscreen = Arc<dyn FullscreenController>;

/// In-memory fullscreen state. Built unsupported, every request is refused.
pub struct SimulatedFullscreen {
    current: RwLock<Option<Element>>,
    supported: bool,
}

impl SimulatedFullscreen {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            supported: true,
        }
    }

    pub fn unsupported() -> Self {
        Self {
            current: RwLock::new(None),
            supported: false,
        }
    }

}

impl Default for SimulatedFullscreen {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FullscreenController for SimulatedFullscreen {
    async fn request_fullscreen(&self, element: Element) -> Result<(), FullscreenError> {
        if !self.supported {
            return Err(FullscreenError::Unsupported);
        }
        *self.current.write().await = Some(element);
        Ok(())
    }

    async fn exit_fullscreen(&self) -> Result<(), FullscreenError> {
        let mut current = self.current.write().await;
        if current.is_none() {
            return Err(FullscreenError::Denied);
        }
        *current = None;
        Ok(())
    }

    async fn fullscreen_element(&self) -> Option<Element> {
        *self.current.read().await
    }

    async fn report(&self, element: Option<Element>) {
        *self.current.write().await = element;
    }
}

#[derive(Debug, Default)]
struct ClientState {
    current: Option<Element>,
    pending: Option<FullscreenRequest>,
}

/// Fullscreen held by a remote page. Requests are queued for the page to
/// carry out; only the page's reports change the fullscreen element.
#[derive(Debug, Default)]
pub struct ClientFullscreen {
    state: RwLock<ClientState>,
}

impl ClientFullscreen {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FullscreenController for ClientFullscreen {
    async fn request_fullscreen(&self, element: Element) -> Result<(), FullscreenError> {
        self.state.write().await.pending = Some(FullscreenRequest::Enter(element));
        Ok(())
    }

    async fn exit_fullscreen(&self) -> Result<(), FullscreenError> {
        let mut state = self.state.write().await;
        if state.current.is_none() {
            // Withdraw an enter request the page never confirmed.
            state.pending = None;
            return Err(FullscreenError::Denied);
        }
        state.pending = Some(FullscreenRequest::Exit);
        Ok(())
    }

    async fn fullscreen_element(&self) -> Option<Element> {
        self.state.read().await.current
    }

    async fn report(&self, element: Option<Element>) {
        let mut state = self.state.write().await;
        state.current = element;
        state.pending = None;
    }

    async fn pending_request(&self) -> Option<FullscreenRequest> {
        self.state.read().await.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_request_waits_for_report() {
        let fullscreen = ClientFullscreen::new();
        fullscreen
            .request_fullscreen(Element::Lightbox)
            .await
            .unwrap();

        assert_eq!(fullscreen.fullscreen_element().await, None);
        assert_eq!(
            fullscreen.pending_request().await,
            Some(FullscreenRequest::Enter(Element::Lightbox))
        );

        fullscreen.report(Some(Element::Lightbox)).await;
        assert_eq!(
            fullscreen.fullscreen_element().await,
            Some(Element::Lightbox)
        );
        assert_eq!(fullscreen.pending_request().await, None);
    }

    #[tokio::test]
    async fn test_client_exit_without_fullscreen_withdraws_request() {
        let fullscreen = ClientFullscreen::new();
        fullscreen.request_fullscreen(Element::Lightbox).await.unwrap();

        assert!(fullscreen.exit_fullscreen().await.is_err());
        assert_eq!(fullscreen.pending_request().await, None);

        fullscreen.report(Some(Element::Lightbox)).await;
        fullscreen.exit_fullscreen().await.unwrap();
        assert_eq!(
            fullscreen.pending_request().await,
            Some(FullscreenRequest::Exit)
        );
    }

    #[test]
    fn test_request_serializes_for_the_page() {
        let json = serde_json::to_value(FullscreenRequest::Enter(Element::Lightbox)).unwrap();
        assert_eq!(json, serde_json::json!({"action": "enter", "element": "lightbox"}));
        let json = serde_json::to_value(FullscreenRequest::Exit).unwrap();
        assert_eq!(json, serde_json::json!({"action": "exit"}));
    }
}
