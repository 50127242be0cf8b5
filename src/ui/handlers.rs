use super::{AuthError, AuthForm, AuthMode, announce_download};
use crate::AppState;
use crate::gallery::GalleryError;
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, Uri, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::debug;

const KNOWN_PLATFORMS: [&str; 4] = ["windows", "mac", "android", "ios"];

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    /// Opens the sign-in dialog in this mode.
    pub auth: Option<AuthMode>,
    /// One-based slide number, as on the slider dots.
    pub slide: Option<usize>,
    /// Previous (negative) or next (positive) slide, as on the slider arrows.
    pub slide_step: Option<isize>,
}

#[axum::debug_handler]
pub async fn home_handler(
    State(app_state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> Response {
    if let Some(slide) = query.slide {
        app_state.slider.go_to(slide).await;
    }
    if let Some(step) = query.slide_step {
        app_state.slider.change(step.signum()).await;
    }
    let slider = app_state.slider.state().await;
    let slides: Vec<_> = (0..slider.count)
        .map(|i| {
            liquid::object!({
                "index": i,
                "number": i + 1,
                "active": i == slider.current,
            })
        })
        .collect();

    let globals = liquid::object!({
        "slides": slides,
        "platforms": KNOWN_PLATFORMS,
        "auth_modal": query.auth.map(AuthMode::modal),
    });

    app_state.render_html("index.html.liquid", "Home", globals).await
}

#[axum::debug_handler]
pub async fn theme_toggle_handler(
    State(app_state): State<AppState>,
) -> Result<Redirect, GalleryError> {
    app_state.theme.toggle().await?;
    Ok(Redirect::to("/"))
}

#[axum::debug_handler]
pub async fn auth_submit_handler(
    State(app_state): State<AppState>,
    Form(form): Form<AuthForm>,
) -> Result<Redirect, GalleryError> {
    match app_state.auth.submit(&form).await {
        Ok(_) => Ok(Redirect::to("/")),
        // The toast already tells the user; send them back to the form.
        Err(AuthError::PasswordMismatch) => Ok(Redirect::to("/?auth=signup")),
        Err(e) => Err(e.into()),
    }
}

#[axum::debug_handler]
pub async fn auth_google_handler(
    State(app_state): State<AppState>,
) -> Result<Redirect, GalleryError> {
    app_state.auth.login_with_google().await?;
    Ok(Redirect::to("/"))
}

#[axum::debug_handler]
pub async fn auth_logout_handler(
    State(app_state): State<AppState>,
) -> Result<Redirect, GalleryError> {
    app_state.auth.logout().await?;
    Ok(Redirect::to("/"))
}

#[axum::debug_handler]
pub async fn download_handler(
    State(app_state): State<AppState>,
    Path(platform): Path<String>,
) -> Redirect {
    if !KNOWN_PLATFORMS.contains(&platform.as_str()) {
        debug!("Download requested for unlisted platform {}", platform);
    }
    announce_download(&app_state.notifier, &platform).await;
    Redirect::to("/#download")
}

#[axum::debug_handler]
pub async fn notification_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.notifier.current().await)
}

/// Same-site page the request came from, or the home page.
fn back_to(headers: &HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|referer| referer.parse::<Uri>().ok())
        .and_then(|uri| uri.path_and_query().map(|pq| pq.as_str().to_string()))
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or_else(|| "/".to_string())
}

#[axum::debug_handler]
pub async fn sidebar_open_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Redirect {
    app_state.sidebar.show().await;
    Redirect::to(&back_to(&headers))
}

#[axum::debug_handler]
pub async fn sidebar_close_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Redirect {
    // The hide lands on its own once the animation delay passes.
    drop(app_state.sidebar.close().await);
    Redirect::to(&back_to(&headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_referer(referer: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_str(referer).unwrap());
        headers
    }

    #[test]
    fn test_back_to_keeps_path_and_query() {
        assert_eq!(
            back_to(&with_referer("http://localhost:3000/pictures?x=1")),
            "/pictures?x=1"
        );
        assert_eq!(back_to(&with_referer("/albums")), "/albums");
    }

    #[test]
    fn test_back_to_falls_back_home() {
        assert_eq!(back_to(&HeaderMap::new()), "/");
        assert_eq!(back_to(&with_referer("not a uri")), "/");
    }
}
