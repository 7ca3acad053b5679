use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, HeaderValue},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::{cookie::Cookie, WithRejection};
use validator::Validate;

use crate::{
    db::userdb::UserExt,
    dtos::userdtos::{
        FilterUserDto, LoginUserDto, Response, UserData, UserLoginResponseDto, UserResponseDto,
    },
    error::{db_error, ErrorMessage, HttpError},
    middleware::{auth, JWTAuthMiddeware, TOKEN_COOKIE},
    utils::{password, token},
    AppState,
};

pub fn auth_handler() -> Router {
    let protected = Router::new()
        .route("/me", get(get_me))
        .route_layer(middleware::from_fn(auth));

    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .merge(protected)
}

fn session_cookie(value: String, minutes: i64) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, value))
        .path("/")
        .max_age(time::Duration::minutes(minutes))
        .http_only(true)
        .build()
}

fn set_cookie_headers(cookie: Cookie<'static>) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| HttpError::server_error(e.to_string()))?;
    headers.append(header::SET_COOKIE, value);
    Ok(headers)
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<LoginUserDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    let password_matched = password::compare(&body.password, &user.password)
        .map_err(|_| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matched {
        tracing::warn!("Failed login attempt for {}", body.email);
        return Err(HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()));
    }

    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let headers = set_cookie_headers(session_cookie(token.clone(), app_state.env.jwt_maxage))?;

    tracing::info!("User {} logged in", user.id);

    Ok((
        headers,
        Json(UserLoginResponseDto {
            status: "success".to_string(),
            token,
        }),
    ))
}

pub async fn logout() -> Result<impl IntoResponse, HttpError> {
    let headers = set_cookie_headers(session_cookie(String::new(), 0))?;

    Ok((
        headers,
        Json(Response {
            status: "success",
            message: "Logged out successfully".to_string(),
        }),
    ))
}

pub async fn get_me(
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let filtered_user = FilterUserDto::filter_user(&user.user);

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: filtered_user,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logout_cookie_expires_immediately() {
        let cookie = session_cookie(String::new(), 0);
        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[test]
    fn session_cookie_renders_as_set_cookie_header() {
        let headers = set_cookie_headers(session_cookie("abc".into(), 60)).unwrap();
        let value = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(value.starts_with("token=abc"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Max-Age=3600"));
    }
}
