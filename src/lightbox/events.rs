use crate::platform::Element;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Elements of the gallery page that listeners attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Target {
    Item(usize),
    Grid,
    CloseButton,
    PrevButton,
    NextButton,
    Lightbox,
    Stage,
    Image,
    Document,
}

impl Target {
    pub fn parent(self) -> Option<Target> {
        match self {
            Target::Item(_) => Some(Target::Grid),
            Target::Grid | Target::Lightbox => Some(Target::Document),
            Target::CloseButton | Target::PrevButton | Target::NextButton | Target::Stage => {
                Some(Target::Lightbox)
            }
            Target::Image => Some(Target::Stage),
            Target::Document => None,
        }
    }

    /// The target followed by its ancestors up to the document.
    pub fn propagation_path(self) -> Vec<Target> {
        let mut path = vec![self];
        let mut current = self;
        while let Some(parent) = current.parent() {
            path.push(parent);
            current = parent;
        }
        path
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
    TouchStart,
    TouchEnd,
    DragStart,
    FullscreenChange,
}

/// An input event, addressed to the element it was fired on.
///
/// Key names follow the DOM `KeyboardEvent.key` values (`"Enter"`, `" "`,
/// `"Escape"`, `"ArrowLeft"`, `"ArrowRight"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightboxEvent {
    Click { target: Target },
    KeyDown { target: Target, key: String },
    TouchStart { target: Target, x: f64 },
    TouchEnd { target: Target, x: f64 },
    DragStart { target: Target },
    /// Carries the page's fullscreen element after the change, if any.
    FullscreenChange {
        #[serde(default)]
        element: Option<Element>,
    },
}

impl LightboxEvent {
    pub fn target(&self) -> Target {
        match self {
            LightboxEvent::Click { target }
            | LightboxEvent::KeyDown { target, .. }
            | LightboxEvent::TouchStart { target, .. }
            | LightboxEvent::TouchEnd { target, .. }
            | LightboxEvent::DragStart { target } => *target,
            LightboxEvent::FullscreenChange { .. } => Target::Document,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            LightboxEvent::Click { .. } => EventKind::Click,
            LightboxEvent::KeyDown { .. } => EventKind::KeyDown,
            LightboxEvent::TouchStart { .. } => EventKind::TouchStart,
            LightboxEvent::TouchEnd { .. } => EventKind::TouchEnd,
            LightboxEvent::DragStart { .. } => EventKind::DragStart,
            LightboxEvent::FullscreenChange { .. } => EventKind::FullscreenChange,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            LightboxEvent::KeyDown { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn x(&self) -> Option<f64> {
        match self {
            LightboxEvent::TouchStart { x, .. } | LightboxEvent::TouchEnd { x, .. } => Some(*x),
            _ => None,
        }
    }
}

/// What a listener does when its event reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    OpenItem(usize),
    ItemKey(usize),
    Close,
    ShowPrev,
    ShowNext,
    DocumentKey,
    BackdropClick,
    SwipeStart,
    SwipeEnd,
    PreventDrag,
    SyncFullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Handle for one bound listener. Give it back to
/// [`EventRegistry::unsubscribe`] to detach the listener.
#[must_use = "a dropped subscription can no longer be detached"]
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: ListenerId,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

#[derive(Debug, Clone)]
struct Listener {
    target: Target,
    kind: EventKind,
    action: Action,
}

#[derive(Debug, Default)]
pub struct EventRegistry {
    next_id: u64,
    listeners: BTreeMap<ListenerId, Listener>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, target: Target, kind: EventKind, action: Action) -> Subscription {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(
            id,
            Listener {
                target,
                kind,
                action,
            },
        );
        Subscription { id }
    }

    /// Detaches the listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.listeners.remove(&subscription.id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Actions bound on exactly `target` for `kind`, in binding order.
    pub fn actions_for(&self, target: Target, kind: EventKind) -> Vec<Action> {
        self.listeners
            .values()
            .filter(|l| l.target == target && l.kind == kind)
            .map(|l| l.action)
            .collect()
    }

    /// Actions reached by `event` as it bubbles from its target to the document.
    pub fn route(&self, event: &LightboxEvent) -> Vec<Action> {
        let kind = event.kind();
        event
            .target()
            .propagation_path()
            .into_iter()
            .flat_map(|target| self.actions_for(target, kind))
            .collect()
    }
}
