//! Page services that live beside the gallery: theme, simulated sign-in,
//! toasts, the navigation sidebar and the home page slider.
mod auth;
mod handlers;
mod notifications;
mod sidebar;
mod slider;
mod theme;

pub use auth::{
    AuthError, AuthForm, AuthMode, AuthModal, AuthService, DEFAULT_USER_KEY, LoginMethod,
    UserProfile,
};
pub use handlers::{
    HomeQuery, auth_google_handler, auth_logout_handler, auth_submit_handler, download_handler,
    home_handler, notification_handler, sidebar_close_handler, sidebar_open_handler,
    theme_toggle_handler,
};
pub use notifications::{Notifier, Toast, ToastKind};
pub use sidebar::{Sidebar, SidebarState};
pub use slider::{HeroSlider, SlideState};
pub use theme::{DEFAULT_THEME_KEY, Theme, ThemeIndicator, ThemeService};

use tracing::info;

/// Download buttons only announce the download.
pub async fn announce_download(notifier: &Notifier, platform: &str) {
    notifier
        .success(format!("Starting download for {}...", platform))
        .await;
    info!("Download started for {}", platform);
}
