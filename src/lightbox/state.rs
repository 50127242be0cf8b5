use crate::gallery::GridItem;
use crate::platform::FullscreenRequest;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Closed,
    Opening,
    Open,
    Transitioning,
    Closing,
}

/// Side the next image slides in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn css_class(self) -> &'static str {
        match self {
            Direction::Left => "mg-enter-from-left",
            Direction::Right => "mg-enter-from-right",
        }
    }
}

/// Everything the overlay markup shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightboxView {
    pub aria_hidden: bool,
    pub image_src: String,
    pub image_alt: String,
    pub caption: String,
    pub caption_visible: bool,
    pub image_visible: bool,
    pub enter_from: Option<Direction>,
    pub spinner_visible: bool,
    /// Document scrolling is suspended while the overlay is up.
    pub scroll_locked: bool,
}

impl Default for LightboxView {
    fn default() -> Self {
        Self {
            aria_hidden: true,
            image_src: String::new(),
            image_alt: String::new(),
            caption: String::new(),
            caption_visible: true,
            image_visible: false,
            enter_from: None,
            spinner_visible: false,
            scroll_locked: false,
        }
    }
}

impl LightboxView {
    pub fn image_classes(&self) -> String {
        let mut classes = String::from("mg-lb-image");
        if let Some(direction) = self.enter_from {
            classes.push(' ');
            classes.push_str(direction.css_class());
        }
        if self.image_visible {
            classes.push_str(" mg-visible");
        }
        classes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightboxItem {
    pub src: String,
    pub alt: String,
    pub caption: String,
}

impl From<&GridItem> for LightboxItem {
    fn from(item: &GridItem) -> Self {
        Self {
            src: item.src.clone(),
            alt: item.alt.clone(),
            caption: item.caption.clone(),
        }
    }
}

/// Phase, index and view together, as served to the page script.
#[derive(Debug, Clone, Serialize)]
pub struct LightboxSnapshot {
    pub phase: Phase,
    /// Fullscreen change the page should make, if one is waiting.
    pub fullscreen_request: Option<FullscreenRequest>,
    pub current_index: Option<usize>,
    pub item_count: usize,
    pub image_class: String,
    pub view: LightboxView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_view_is_hidden() {
        let view = LightboxView::default();
        assert!(view.aria_hidden);
        assert!(!view.scroll_locked);
        assert_eq!(view.image_classes(), "mg-lb-image");
    }

    #[test]
    fn test_image_classes_carry_direction_and_visibility() {
        let view = LightboxView {
            enter_from: Some(Direction::Left),
            image_visible: true,
            ..LightboxView::default()
        };
        assert_eq!(
            view.image_classes(),
            "mg-lb-image mg-enter-from-left mg-visible"
        );
    }
}
