use super::debounce::{Debounced, Debouncer};
use super::events::{Action, EventKind, EventRegistry, LightboxEvent, Subscription, Target};
use super::state::{Direction, LightboxItem, LightboxSnapshot, LightboxView, Phase};
use crate::platform::{DynFullscreen, DynImageLoader, Element};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const OPEN_KEYS: [&str; 2] = ["Enter", " "];

#[derive(Debug, Clone, Copy)]
pub struct LightboxSettings {
    pub transition_delay: Duration,
    /// Minimum horizontal travel, in pixels, for a touch to count as a swipe.
    pub swipe_threshold: f64,
}

impl Default for LightboxSettings {
    fn default() -> Self {
        Self {
            transition_delay: Duration::from_millis(100),
            swipe_threshold: 35.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    /// At least one listener received the event.
    pub handled: bool,
    pub default_prevented: bool,
}

struct Inner {
    items: Vec<LightboxItem>,
    current_index: Option<usize>,
    phase: Phase,
    view: LightboxView,
    touch_start_x: Option<f64>,
    registry: EventRegistry,
    subscriptions: Vec<Subscription>,
    // Bumped on close and re-attach; loads started under an older epoch are dropped.
    epoch: u64,
}

/// Single-image viewer over the items of the currently rendered page.
#[derive(Clone)]
pub struct Lightbox {
    inner: Arc<Mutex<Inner>>,
    debouncer: Arc<Debouncer>,
    loader: DynImageLoader,
    fullscreen: DynFullscreen,
    settings: LightboxSettings,
}

impl Lightbox {
    pub fn new(
        loader: DynImageLoader,
        fullscreen: DynFullscreen,
        settings: LightboxSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                items: Vec::new(),
                current_index: None,
                phase: Phase::Closed,
                view: LightboxView::default(),
                touch_start_x: None,
                registry: EventRegistry::new(),
                subscriptions: Vec::new(),
                epoch: 0,
            })),
            debouncer: Arc::new(Debouncer::new(settings.transition_delay)),
            loader,
            fullscreen,
            settings,
        }
    }

    /// Binds the viewer to a freshly rendered item set. Every listener bound
    /// for the previous set is disposed first; items without a source are
    /// skipped.
    pub async fn attach<I>(&self, items: I)
    where
        I: IntoIterator<Item = LightboxItem>,
    {
        if self.phase().await != Phase::Closed {
            self.close().await;
        }
        self.debouncer.cancel();

        let mut inner = self.inner.lock().await;
        let previous = std::mem::take(&mut inner.subscriptions);
        for subscription in previous {
            inner.registry.unsubscribe(subscription);
        }

        inner.items = items.into_iter().filter(|i| !i.src.is_empty()).collect();
        inner.current_index = None;
        inner.touch_start_x = None;
        inner.epoch += 1;

        let mut bindings = Vec::with_capacity(inner.items.len() * 2 + 9);
        for index in 0..inner.items.len() {
            bindings.push((Target::Item(index), EventKind::Click, Action::OpenItem(index)));
            bindings.push((Target::Item(index), EventKind::KeyDown, Action::ItemKey(index)));
        }
        bindings.extend([
            (Target::CloseButton, EventKind::Click, Action::Close),
            (Target::PrevButton, EventKind::Click, Action::ShowPrev),
            (Target::NextButton, EventKind::Click, Action::ShowNext),
            (Target::Document, EventKind::KeyDown, Action::DocumentKey),
            (Target::Lightbox, EventKind::Click, Action::BackdropClick),
            (Target::Stage, EventKind::TouchStart, Action::SwipeStart),
            (Target::Stage, EventKind::TouchEnd, Action::SwipeEnd),
            (Target::Image, EventKind::DragStart, Action::PreventDrag),
            (Target::Document, EventKind::FullscreenChange, Action::SyncFullscreen),
        ]);

        let subscriptions = bindings
            .into_iter()
            .map(|(target, kind, action)| inner.registry.subscribe(target, kind, action))
            .collect();
        inner.subscriptions = subscriptions;

        debug!(
            items = inner.items.len(),
            listeners = inner.registry.len(),
            "Lightbox attached"
        );
    }

    pub async fn open(&self, index: usize) {
        self.debouncer.cancel();
        let epoch = {
            let mut inner = self.inner.lock().await;
            if index >= inner.items.len() {
                return;
            }
            inner.epoch += 1;
            inner.current_index = Some(index);
            inner.phase = Phase::Opening;
            inner.view.aria_hidden = false;
            inner.view.scroll_locked = true;
            inner.epoch
        };

        if !self.load_into_view(index, None, epoch).await {
            return;
        }

        {
            let mut inner = self.inner.lock().await;
            if inner.epoch != epoch {
                return;
            }
            inner.phase = Phase::Open;
        }

        if self.fullscreen.fullscreen_element().await.is_none() {
            match self.fullscreen.request_fullscreen(Element::Lightbox).await {
                Ok(()) => self.emit_fullscreen_change().await,
                Err(e) => debug!("Fullscreen request ignored: {}", e),
            }
        }
    }

    pub async fn show_next(&self) {
        let target = {
            let inner = self.inner.lock().await;
            match inner.current_index {
                Some(current) if !inner.items.is_empty() => (current + 1) % inner.items.len(),
                _ => return,
            }
        };
        self.transition_to(target, Direction::Right).await;
    }

    pub async fn show_prev(&self) {
        let target = {
            let inner = self.inner.lock().await;
            match inner.current_index {
                Some(current) if !inner.items.is_empty() => {
                    (current + inner.items.len() - 1) % inner.items.len()
                }
                _ => return,
            }
        };
        self.transition_to(target, Direction::Left).await;
    }

    pub async fn close(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.phase = Phase::Closing;
            inner.view = LightboxView::default();
            inner.current_index = None;
            inner.touch_start_x = None;
            inner.epoch += 1;
        }
        self.debouncer.cancel();

        match self.fullscreen.exit_fullscreen().await {
            Ok(()) => self.emit_fullscreen_change().await,
            Err(e) => debug!("Fullscreen exit ignored: {}", e),
        }

        let mut inner = self.inner.lock().await;
        if inner.phase == Phase::Closing {
            inner.phase = Phase::Closed;
        }
    }

    /// Brings the caption and image in line with the current fullscreen
    /// element. Safe to call any number of times, open or closed.
    pub async fn sync_fullscreen(&self) {
        let element = self.fullscreen.fullscreen_element().await;
        let mut inner = self.inner.lock().await;
        inner.view.caption_visible = !element.is_some_and(Element::is_within_lightbox);
        inner.view.image_visible = true;
    }

    pub async fn dispatch(&self, event: LightboxEvent) -> DispatchOutcome {
        let actions = self.inner.lock().await.registry.route(&event);
        let mut outcome = DispatchOutcome {
            handled: !actions.is_empty(),
            default_prevented: false,
        };

        for action in actions {
            match action {
                Action::OpenItem(index) => {
                    outcome.default_prevented = true;
                    self.open(index).await;
                }
                Action::ItemKey(index) => {
                    if event.key().is_some_and(|k| OPEN_KEYS.contains(&k)) {
                        outcome.default_prevented = true;
                        self.open(index).await;
                    }
                }
                Action::Close => self.close().await,
                Action::ShowPrev => self.show_prev().await,
                Action::ShowNext => self.show_next().await,
                Action::DocumentKey => {
                    if self.view().await.aria_hidden {
                        continue;
                    }
                    match event.key() {
                        Some("Escape") => self.close().await,
                        Some("ArrowRight") => self.show_next().await,
                        Some("ArrowLeft") => self.show_prev().await,
                        _ => {}
                    }
                }
                Action::BackdropClick => {
                    if matches!(event.target(), Target::Lightbox | Target::Stage) {
                        self.close().await;
                    }
                }
                Action::SwipeStart => {
                    self.inner.lock().await.touch_start_x = event.x();
                }
                Action::SwipeEnd => {
                    let start = self.inner.lock().await.touch_start_x.take();
                    if let (Some(start), Some(end)) = (start, event.x()) {
                        let dx = end - start;
                        if dx.abs() > self.settings.swipe_threshold {
                            if dx < 0.0 {
                                self.show_next().await;
                            } else {
                                self.show_prev().await;
                            }
                        }
                    }
                }
                Action::PreventDrag => outcome.default_prevented = true,
                Action::SyncFullscreen => {
                    if let LightboxEvent::FullscreenChange { element } = &event {
                        self.fullscreen.report(*element).await;
                    }
                    self.sync_fullscreen().await;
                }
            }
        }

        outcome
    }

    pub async fn view(&self) -> LightboxView {
        self.inner.lock().await.view.clone()
    }

    pub async fn phase(&self) -> Phase {
        self.inner.lock().await.phase
    }

    pub async fn current_index(&self) -> Option<usize> {
        self.inner.lock().await.current_index
    }

    pub async fn item_count(&self) -> usize {
        self.inner.lock().await.items.len()
    }

    pub async fn listener_count(&self) -> usize {
        self.inner.lock().await.registry.len()
    }

    pub async fn snapshot(&self) -> LightboxSnapshot {
        let fullscreen_request = self.fullscreen.pending_request().await;
        let inner = self.inner.lock().await;
        LightboxSnapshot {
            fullscreen_request,
            phase: inner.phase,
            current_index: inner.current_index,
            item_count: inner.items.len(),
            image_class: inner.view.image_classes(),
            view: inner.view.clone(),
        }
    }

    async fn transition_to(&self, target: usize, direction: Direction) {
        let epoch = {
            let mut inner = self.inner.lock().await;
            if inner.current_index == Some(target) {
                return;
            }
            inner.view.image_visible = false;
            inner.phase = Phase::Transitioning;
            inner.epoch
        };

        let result = self
            .debouncer
            .run(|| async move {
                if self.load_into_view(target, Some(direction), epoch).await {
                    let mut inner = self.inner.lock().await;
                    if inner.epoch == epoch {
                        inner.current_index = Some(target);
                        inner.phase = Phase::Open;
                    }
                }
            })
            .await;

        if result == Debounced::Superseded {
            debug!(index = target, "Lightbox transition superseded");
        }
    }

    /// Loads `index` into the view. Returns false when the load went stale
    /// because the viewer was closed or re-attached meanwhile.
    async fn load_into_view(&self, index: usize, direction: Option<Direction>, epoch: u64) -> bool {
        let item = {
            let mut inner = self.inner.lock().await;
            if inner.epoch != epoch {
                return false;
            }
            let Some(item) = inner.items.get(index).cloned() else {
                return false;
            };
            inner.view.spinner_visible = true;
            inner.view.image_visible = false;
            inner.view.enter_from = direction;
            item
        };

        let loaded = self.loader.load(&item.src).await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            debug!(index, "Dropping stale lightbox load");
            return false;
        }
        inner.view.spinner_visible = false;
        inner.view.caption = item.caption;
        match loaded {
            Ok(_) => {
                inner.view.image_src = item.src;
                inner.view.image_alt = item.alt;
                inner.view.image_visible = true;
            }
            Err(e) => {
                warn!("Failed to load lightbox image {}: {}", item.alt, e);
                inner.view.image_src.clear();
                inner.view.image_alt = item.alt;
            }
        }
        true
    }

    // Delivers a fullscreenchange to whatever is bound for it, the way the
    // platform would after a request or exit.
    async fn emit_fullscreen_change(&self) {
        let element = self.fullscreen.fullscreen_element().await;
        let actions = self
            .inner
            .lock()
            .await
            .registry
            .route(&LightboxEvent::FullscreenChange { element });
        for action in actions {
            if action == Action::SyncFullscreen {
                self.sync_fullscreen().await;
            }
        }
    }
}
