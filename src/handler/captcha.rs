use std::sync::Arc;

use axum::{
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::SignedCookieJar;

use crate::{
    error::HttpError,
    service::captcha::{captcha_cookie, generate},
    AppState,
};

pub fn captcha_handler() -> Router {
    Router::new().route("/", get(get_captcha))
}

pub async fn get_captcha(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    let captcha = generate();
    let jar = SignedCookieJar::from_headers(&headers, app_state.cookie_key.clone())
        .add(captcha_cookie(&captcha.code));

    Ok((
        jar,
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        captcha.svg,
    ))
}
