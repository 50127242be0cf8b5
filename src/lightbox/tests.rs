use super::*;
use crate::platform::{
    ClientFullscreen, Element, FullscreenController, FullscreenRequest, ImageLoadError,
    ImageLoader, LoadedImage, SimulatedFullscreen,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingLoader {
    loaded: Mutex<Vec<String>>,
}

impl RecordingLoader {
    fn loaded(&self) -> Vec<String> {
        self.loaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageLoader for RecordingLoader {
    async fn load(&self, src: &str) -> Result<LoadedImage, ImageLoadError> {
        self.loaded.lock().unwrap().push(src.to_string());
        if src.starts_with("bad") {
            return Err(ImageLoadError::NotDataUrl);
        }
        Ok(LoadedImage {
            width: 4,
            height: 3,
        })
    }
}

fn items(count: usize) -> Vec<LightboxItem> {
    (0..count)
        .map(|i| LightboxItem {
            src: format!("img{}", i),
            alt: format!("photo_{}.jpg", i),
            caption: format!("Caption {}", i),
        })
        .collect()
}

struct Fixture {
    lightbox: Lightbox,
    loader: Arc<RecordingLoader>,
    fullscreen: Arc<SimulatedFullscreen>,
}

async fn fixture_with(fullscreen: SimulatedFullscreen, count: usize) -> Fixture {
    let loader = Arc::new(RecordingLoader::default());
    let fullscreen = Arc::new(fullscreen);
    let lightbox = Lightbox::new(
        loader.clone(),
        fullscreen.clone(),
        LightboxSettings::default(),
    );
    lightbox.attach(items(count)).await;
    Fixture {
        lightbox,
        loader,
        fullscreen,
    }
}

async fn fixture(count: usize) -> Fixture {
    fixture_with(SimulatedFullscreen::new(), count).await
}

fn click(target: Target) -> LightboxEvent {
    LightboxEvent::Click { target }
}

fn key(target: Target, key: &str) -> LightboxEvent {
    LightboxEvent::KeyDown {
        target,
        key: key.to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_open_shows_image_and_enters_fullscreen() {
    let f = fixture(3).await;

    let outcome = f.lightbox.dispatch(click(Target::Item(1))).await;
    assert!(outcome.handled);
    assert!(outcome.default_prevented);

    let view = f.lightbox.view().await;
    assert_eq!(f.lightbox.phase().await, Phase::Open);
    assert_eq!(f.lightbox.current_index().await, Some(1));
    assert!(!view.aria_hidden);
    assert!(view.scroll_locked);
    assert!(view.image_visible);
    assert!(!view.spinner_visible);
    assert_eq!(view.image_src, "img1");
    assert_eq!(view.caption, "Caption 1");
    // Fullscreen engaged on the viewer hides the caption.
    assert!(!view.caption_visible);
    assert_eq!(
        f.fullscreen.fullscreen_element().await,
        Some(Element::Lightbox)
    );
}

#[tokio::test(start_paused = true)]
async fn test_next_wraps_to_first_item() {
    let f = fixture(3).await;
    f.lightbox.open(2).await;

    f.lightbox.show_next().await;
    assert_eq!(f.lightbox.current_index().await, Some(0));
    let view = f.lightbox.view().await;
    assert_eq!(view.image_src, "img0");
    assert_eq!(view.enter_from, Some(Direction::Right));
    assert_eq!(f.lightbox.phase().await, Phase::Open);

    f.lightbox.show_prev().await;
    assert_eq!(f.lightbox.current_index().await, Some(2));
    assert_eq!(f.lightbox.view().await.enter_from, Some(Direction::Left));
}

#[tokio::test(start_paused = true)]
async fn test_single_item_navigation_is_no_op() {
    let f = fixture(1).await;
    f.lightbox.open(0).await;
    f.lightbox.show_next().await;
    assert_eq!(f.lightbox.current_index().await, Some(0));
    assert_eq!(f.loader.loaded(), vec!["img0"]);
}

#[tokio::test(start_paused = true)]
async fn test_close_clears_view_and_exits_fullscreen() {
    let f = fixture(3).await;
    f.lightbox.open(0).await;
    f.lightbox.dispatch(click(Target::CloseButton)).await;

    let view = f.lightbox.view().await;
    assert_eq!(f.lightbox.phase().await, Phase::Closed);
    assert_eq!(f.lightbox.current_index().await, None);
    assert!(view.aria_hidden);
    assert!(!view.scroll_locked);
    assert!(view.image_src.is_empty());
    assert!(view.caption.is_empty());
    assert!(view.caption_visible);
    assert_eq!(f.fullscreen.fullscreen_element().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_close_from_transition_drops_pending_load() {
    let f = fixture(3).await;
    f.lightbox.open(0).await;

    tokio::join!(f.lightbox.show_next(), f.lightbox.close());

    let view = f.lightbox.view().await;
    assert!(view.image_src.is_empty());
    assert!(view.caption.is_empty());
    assert_eq!(f.lightbox.current_index().await, None);
    assert_eq!(f.lightbox.phase().await, Phase::Closed);
    assert_eq!(f.loader.loaded(), vec!["img0"]);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_navigation_loads_only_last_target() {
    let f = fixture(3).await;
    f.lightbox.open(1).await;

    tokio::join!(f.lightbox.show_next(), f.lightbox.show_prev());

    assert_eq!(f.lightbox.current_index().await, Some(0));
    assert_eq!(f.loader.loaded(), vec!["img1", "img0"]);
    assert_eq!(f.lightbox.view().await.enter_from, Some(Direction::Left));
}

#[tokio::test(start_paused = true)]
async fn test_reattach_leaves_one_listener_set() {
    let f = fixture(3).await;
    assert_eq!(f.lightbox.listener_count().await, 3 * 2 + 9);

    f.lightbox.attach(items(2)).await;
    f.lightbox.attach(items(2)).await;
    assert_eq!(f.lightbox.listener_count().await, 2 * 2 + 9);

    // Item 2 belonged to the first set only.
    let outcome = f.lightbox.dispatch(click(Target::Item(2))).await;
    assert!(!outcome.handled);
    assert_eq!(f.lightbox.phase().await, Phase::Closed);

    f.lightbox.dispatch(click(Target::Item(1))).await;
    f.lightbox.dispatch(click(Target::NextButton)).await;
    assert_eq!(f.lightbox.current_index().await, Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_reattach_closes_open_viewer() {
    let f = fixture(3).await;
    f.lightbox.open(1).await;

    f.lightbox.attach(items(4)).await;
    assert_eq!(f.lightbox.phase().await, Phase::Closed);
    assert!(f.lightbox.view().await.aria_hidden);
    assert_eq!(f.lightbox.item_count().await, 4);
}

#[tokio::test(start_paused = true)]
async fn test_items_without_source_are_skipped() {
    let f = fixture(0).await;
    let mut set = items(3);
    set[1].src.clear();
    f.lightbox.attach(set).await;
    assert_eq!(f.lightbox.item_count().await, 2);
    assert_eq!(f.lightbox.listener_count().await, 2 * 2 + 9);
}

#[tokio::test(start_paused = true)]
async fn test_keyboard_navigation() {
    let f = fixture(3).await;

    // Arrow keys do nothing while closed.
    f.lightbox.dispatch(key(Target::Document, "ArrowRight")).await;
    assert_eq!(f.lightbox.current_index().await, None);

    let outcome = f.lightbox.dispatch(key(Target::Item(0), "Enter")).await;
    assert!(outcome.default_prevented);
    assert_eq!(f.lightbox.current_index().await, Some(0));

    f.lightbox.dispatch(key(Target::Document, "ArrowLeft")).await;
    assert_eq!(f.lightbox.current_index().await, Some(2));

    f.lightbox.dispatch(key(Target::Document, "ArrowRight")).await;
    assert_eq!(f.lightbox.current_index().await, Some(0));

    f.lightbox.dispatch(key(Target::Document, "Escape")).await;
    assert_eq!(f.lightbox.phase().await, Phase::Closed);

    let outcome = f.lightbox.dispatch(key(Target::Item(1), "a")).await;
    assert!(!outcome.default_prevented);
    assert_eq!(f.lightbox.phase().await, Phase::Closed);

    f.lightbox.dispatch(key(Target::Item(1), " ")).await;
    assert_eq!(f.lightbox.current_index().await, Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_click_on_image_keeps_viewer_open() {
    let f = fixture(3).await;
    f.lightbox.open(0).await;

    let outcome = f.lightbox.dispatch(click(Target::Image)).await;
    assert!(outcome.handled);
    assert_eq!(f.lightbox.phase().await, Phase::Open);

    f.lightbox.dispatch(click(Target::PrevButton)).await;
    assert_eq!(f.lightbox.phase().await, Phase::Open);
    assert_eq!(f.lightbox.current_index().await, Some(2));

    f.lightbox.dispatch(click(Target::Stage)).await;
    assert_eq!(f.lightbox.phase().await, Phase::Closed);

    f.lightbox.open(0).await;
    f.lightbox.dispatch(click(Target::Lightbox)).await;
    assert_eq!(f.lightbox.phase().await, Phase::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_swipe_past_threshold_navigates() {
    let f = fixture(3).await;
    f.lightbox.open(0).await;

    let swipe = |from: f64, to: f64| {
        let lightbox = f.lightbox.clone();
        async move {
            lightbox
                .dispatch(LightboxEvent::TouchStart {
                    target: Target::Stage,
                    x: from,
                })
                .await;
            lightbox
                .dispatch(LightboxEvent::TouchEnd {
                    target: Target::Stage,
                    x: to,
                })
                .await;
        }
    };

    swipe(200.0, 120.0).await;
    assert_eq!(f.lightbox.current_index().await, Some(1));

    swipe(100.0, 130.0).await;
    assert_eq!(f.lightbox.current_index().await, Some(1));

    swipe(100.0, 136.0).await;
    assert_eq!(f.lightbox.current_index().await, Some(0));

    // A touchend without a touchstart is ignored.
    f.lightbox
        .dispatch(LightboxEvent::TouchEnd {
            target: Target::Stage,
            x: 0.0,
        })
        .await;
    assert_eq!(f.lightbox.current_index().await, Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_drag_is_prevented_on_image() {
    let f = fixture(2).await;
    let outcome = f
        .lightbox
        .dispatch(LightboxEvent::DragStart {
            target: Target::Image,
        })
        .await;
    assert!(outcome.default_prevented);
}

#[tokio::test(start_paused = true)]
async fn test_failed_load_keeps_caption() {
    let f = fixture(0).await;
    let mut set = items(2);
    set[1].src = "bad-data".to_string();
    f.lightbox.attach(set).await;

    f.lightbox.open(1).await;
    let view = f.lightbox.view().await;
    assert_eq!(f.lightbox.phase().await, Phase::Open);
    assert!(view.image_src.is_empty());
    assert_eq!(view.caption, "Caption 1");
    assert!(!view.spinner_visible);
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_fullscreen_is_tolerated() {
    let f = fixture_with(SimulatedFullscreen::unsupported(), 2).await;
    f.lightbox.open(0).await;

    let view = f.lightbox.view().await;
    assert_eq!(f.lightbox.phase().await, Phase::Open);
    assert_eq!(view.image_src, "img0");
    assert!(view.caption_visible);
    assert_eq!(f.fullscreen.fullscreen_element().await, None);

    f.lightbox.close().await;
    assert_eq!(f.lightbox.phase().await, Phase::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_fullscreen_change_restores_caption() {
    let f = fixture(2).await;
    f.lightbox.open(0).await;
    assert!(!f.lightbox.view().await.caption_visible);

    // The user leaves fullscreen through the platform, not the viewer.
    f.lightbox
        .dispatch(LightboxEvent::FullscreenChange { element: None })
        .await;
    let view = f.lightbox.view().await;
    assert!(view.caption_visible);
    assert!(view.image_visible);
    assert_eq!(f.fullscreen.fullscreen_element().await, None);

    f.lightbox
        .dispatch(LightboxEvent::FullscreenChange { element: None })
        .await;
    assert_eq!(f.lightbox.view().await, view);

    f.fullscreen.report(Some(Element::Stage)).await;
    f.lightbox.sync_fullscreen().await;
    assert!(!f.lightbox.view().await.caption_visible);

    f.fullscreen.report(Some(Element::Other)).await;
    f.lightbox.sync_fullscreen().await;
    assert!(f.lightbox.view().await.caption_visible);
}

#[tokio::test(start_paused = true)]
async fn test_page_held_fullscreen_follows_reports() {
    let loader = Arc::new(RecordingLoader::default());
    let fullscreen = Arc::new(ClientFullscreen::new());
    let lightbox = Lightbox::new(loader, fullscreen.clone(), LightboxSettings::default());
    lightbox.attach(items(2)).await;

    lightbox.dispatch(click(Target::Item(0))).await;
    let snapshot = lightbox.snapshot().await;
    // Asked for, not yet granted: the caption stays.
    assert!(snapshot.view.caption_visible);
    assert_eq!(
        snapshot.fullscreen_request,
        Some(FullscreenRequest::Enter(Element::Lightbox))
    );

    lightbox
        .dispatch(LightboxEvent::FullscreenChange {
            element: Some(Element::Lightbox),
        })
        .await;
    let snapshot = lightbox.snapshot().await;
    assert!(!snapshot.view.caption_visible);
    assert_eq!(snapshot.fullscreen_request, None);

    lightbox.close().await;
    assert_eq!(
        lightbox.snapshot().await.fullscreen_request,
        Some(FullscreenRequest::Exit)
    );

    lightbox
        .dispatch(LightboxEvent::FullscreenChange { element: None })
        .await;
    let snapshot = lightbox.snapshot().await;
    assert!(snapshot.view.caption_visible);
    assert_eq!(snapshot.fullscreen_request, None);
    assert_eq!(fullscreen.fullscreen_element().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_refused_fullscreen_request_is_withdrawn_on_close() {
    let loader = Arc::new(RecordingLoader::default());
    let fullscreen = Arc::new(ClientFullscreen::new());
    let lightbox = Lightbox::new(loader, fullscreen.clone(), LightboxSettings::default());
    lightbox.attach(items(2)).await;

    lightbox.open(1).await;
    assert!(lightbox.snapshot().await.fullscreen_request.is_some());

    lightbox.close().await;
    assert_eq!(lightbox.snapshot().await.fullscreen_request, None);
    assert!(lightbox.view().await.caption_visible);
}
