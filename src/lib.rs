use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod gallery;
pub mod ingest;
pub mod lightbox;
pub mod platform;
pub mod startup_checks;
pub mod static_files;
pub mod storage;
pub mod templating;
pub mod ui;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub templates: TemplateConfig,
    pub static_files: StaticConfig,
    pub gallery: GalleryConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub images_per_page: usize,
    /// Album label for images selected without a folder.
    pub default_album: String,
    pub transition_delay_ms: u64,
    pub swipe_threshold_px: f64,
    pub notification_timeout_ms: u64,
    pub slide_interval_secs: u64,
    pub slide_count: usize,
    /// Time the sidebar's closing animation gets before it is hidden.
    pub sidebar_close_delay_ms: u64,
}

impl GalleryConfig {
    pub fn lightbox_settings(&self) -> lightbox::LightboxSettings {
        lightbox::LightboxSettings {
            transition_delay: Duration::from_millis(self.transition_delay_ms),
            swipe_threshold: self.swipe_threshold_px,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub records_key: String,
    pub selected_album_key: String,
    pub theme_key: String,
    pub user_key: String,
    /// Capacity of the session store, in bytes of keys plus values.
    pub session_quota_bytes: usize,
    /// TOML file backing the durable store.
    pub local_storage_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Image Gallery".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("templates"),
        }
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("static"),
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            images_per_page: 12,
            default_album: "Untitled Album".to_string(),
            transition_delay_ms: 100,
            swipe_threshold_px: 35.0,
            notification_timeout_ms: 3000,
            slide_interval_secs: 5,
            slide_count: 3,
            sidebar_close_delay_ms: 220,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            records_key: storage::DEFAULT_RECORDS_KEY.to_string(),
            selected_album_key: storage::DEFAULT_SELECTED_ALBUM_KEY.to_string(),
            theme_key: ui::DEFAULT_THEME_KEY.to_string(),
            user_key: ui::DEFAULT_USER_KEY.to_string(),
            session_quota_bytes: 5 * 1024 * 1024,
            local_storage_path: PathBuf::from("local_storage.toml"),
        }
    }
}

use axum::{
    Router,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use platform::{
    ClientFullscreen, DataUrlImageLoader, DynStore, FileStore, LocalFileReader, MemoryStore,
    MonotonicClock, SystemClock,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub template_engine: Arc<templating::TemplateEngine>,
    pub static_handler: static_files::StaticFileHandler,
    pub session: gallery::SharedSession,
    pub notifier: ui::Notifier,
    pub theme: ui::ThemeService,
    pub auth: ui::AuthService,
    pub slider: ui::HeroSlider,
    pub sidebar: ui::Sidebar,
    pub config: Config,
}

impl AppState {
    /// Values every page template and the shared partials can use.
    pub async fn page_globals(&self, page_title: &str) -> liquid::Object {
        let theme = self.theme.current().await;
        let indicator = theme.indicator();

        liquid::object!({
            "app_name": self.config.app.name,
            "page_title": page_title,
            "theme": theme.as_str(),
            "theme_icon": indicator.icon,
            "theme_label": indicator.label,
            "user": self.auth.current_user().await,
            "toast": self.notifier.current().await,
            "sidebar": self.sidebar.state().await,
            "toast_timeout_ms": self.config.gallery.notification_timeout_ms,
            "css_url": self.static_handler.versioned_url("gallery.css").await,
            "js_url": self.static_handler.versioned_url("gallery.js").await,
        })
    }

    pub async fn render_html(
        &self,
        template_name: &str,
        page_title: &str,
        page: liquid::Object,
    ) -> Response {
        let mut globals = self.page_globals(page_title).await;
        for (key, value) in page {
            globals.insert(key, value);
        }

        match self
            .template_engine
            .render_template(template_name, globals)
            .await
        {
            Ok(html) => Html(html).into_response(),
            Err(e) => gallery::GalleryError::Template(e).into_response(),
        }
    }
}

async fn static_file_handler(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let has_version = params.contains_key("v");
    app_state.static_handler.serve(&path, has_version).await
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

async fn open_local_store(config: &StorageConfig) -> DynStore {
    match FileStore::open(&config.local_storage_path).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(
                "Failed to open local storage {:?}: {}",
                config.local_storage_path, e
            );
            warn!("Theme and user preferences will not outlive this process");
            Arc::new(MemoryStore::new())
        }
    }
}

pub async fn create_app(config: Config) -> Router {
    let template_engine = Arc::new(templating::TemplateEngine::new(
        config.templates.directory.clone(),
    ));

    let static_handler =
        static_files::StaticFileHandler::new(config.static_files.directory.clone()).await;

    let notifier = ui::Notifier::new(Duration::from_millis(
        config.gallery.notification_timeout_ms,
    ));

    // The session store lives as long as the server process, like a tab's.
    let session_store: DynStore =
        Arc::new(MemoryStore::with_quota(config.storage.session_quota_bytes));
    let local_store = open_local_store(&config.storage).await;

    let records = storage::RecordStore::with_keys(
        session_store,
        config.storage.records_key.clone(),
        config.storage.selected_album_key.clone(),
    );
    let ingestor = ingest::Ingestor::new(
        records.clone(),
        Arc::new(LocalFileReader),
        Arc::new(MonotonicClock::new(SystemClock)),
        config.gallery.default_album.clone(),
    );
    let lightbox = lightbox::Lightbox::new(
        Arc::new(DataUrlImageLoader),
        Arc::new(ClientFullscreen::new()),
        config.gallery.lightbox_settings(),
    );
    let session = Arc::new(gallery::GallerySession::new(
        ingestor,
        records,
        lightbox,
        notifier.clone(),
        config.gallery.images_per_page,
    ));
    session.restore().await;

    let slider = ui::HeroSlider::new(config.gallery.slide_count);
    // Detached; runs for the life of the runtime.
    let _ = slider.start_autoplay(Duration::from_secs(config.gallery.slide_interval_secs));

    let app_state = AppState {
        template_engine,
        static_handler,
        session,
        theme: ui::ThemeService::new(
            local_store.clone(),
            config.storage.theme_key.clone(),
            notifier.clone(),
        ),
        auth: ui::AuthService::new(
            local_store,
            config.storage.user_key.clone(),
            notifier.clone(),
        ),
        notifier,
        slider,
        sidebar: ui::Sidebar::new(Duration::from_millis(
            config.gallery.sidebar_close_delay_ms,
        )),
        config: config.clone(),
    };

    Router::new()
        .route("/", axum::routing::get(ui::home_handler))
        .route("/pictures", axum::routing::get(gallery::pictures_handler))
        .route(
            "/pictures/next",
            axum::routing::post(gallery::next_page_handler),
        )
        .route(
            "/pictures/previous",
            axum::routing::post(gallery::previous_page_handler),
        )
        .route("/albums", axum::routing::get(gallery::albums_handler))
        .route(
            gallery::SELECT_ALBUM_PATH,
            axum::routing::post(gallery::select_album_handler),
        )
        .route(
            "/api/ingest",
            axum::routing::post(gallery::ingest_handler)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/lightbox",
            axum::routing::get(gallery::lightbox_state_handler),
        )
        .route(
            "/api/lightbox/events",
            axum::routing::post(gallery::lightbox_event_handler),
        )
        .route(
            "/api/theme/toggle",
            axum::routing::post(ui::theme_toggle_handler),
        )
        .route(
            "/api/auth/submit",
            axum::routing::post(ui::auth_submit_handler),
        )
        .route(
            "/api/auth/google",
            axum::routing::post(ui::auth_google_handler),
        )
        .route(
            "/api/auth/logout",
            axum::routing::post(ui::auth_logout_handler),
        )
        .route(
            "/api/download/{platform}",
            axum::routing::post(ui::download_handler),
        )
        .route(
            "/api/sidebar/open",
            axum::routing::post(ui::sidebar_open_handler),
        )
        .route(
            "/api/sidebar/close",
            axum::routing::post(ui::sidebar_close_handler),
        )
        .route(
            "/api/notification",
            axum::routing::get(ui::notification_handler),
        )
        .route("/static/{*path}", axum::routing::get(static_file_handler))
        .fallback(not_found_handler)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let method = request.method();
                    let uri = request.uri();
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::info_span!(
                        "http_request",
                        method = %method,
                        uri = %uri,
                        matched_path,
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    let method = request.method();
                    let uri = request.uri();
                    let user_agent = request
                        .headers()
                        .get("user-agent")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");

                    tracing::info!(
                        target: "access_log",
                        method = %method,
                        path = %uri.path(),
                        query = ?uri.query(),
                        user_agent = %user_agent,
                        "request"
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            target: "access_log",
                            status = %response.status(),
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state)
}
