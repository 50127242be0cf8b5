use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: DateTime<Utc>,
}

/// Transient messages, at most one on screen at a time.
///
/// A new toast replaces the current one immediately. Each toast removes
/// itself after the timeout unless it was already replaced.
#[derive(Clone)]
pub struct Notifier {
    current: Arc<RwLock<Option<Toast>>>,
    timeout: Duration,
}

impl Notifier {
    pub fn new(timeout: Duration) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            timeout,
        }
    }

    pub async fn success(&self, message: impl Into<String>) -> Uuid {
        self.show(message, ToastKind::Success).await
    }

    pub async fn error(&self, message: impl Into<String>) -> Uuid {
        self.show(message, ToastKind::Error).await
    }

    pub async fn show(&self, message: impl Into<String>, kind: ToastKind) -> Uuid {
        let toast = Toast {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            shown_at: Utc::now(),
        };
        let id = toast.id;
        info!(kind = kind.as_str(), "Notification: {}", toast.message);

        *self.current.write().await = Some(toast);

        let current = self.current.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let mut current = current.write().await;
            if current.as_ref().is_some_and(|t| t.id == id) {
                *current = None;
            }
        });

        id
    }

    pub async fn current(&self) -> Option<Toast> {
        self.current.read().await.clone()
    }

    pub async fn dismiss(&self) {
        *self.current.write().await = None;
    }
}
