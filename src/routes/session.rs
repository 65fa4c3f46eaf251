use askama::Template;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use rusqlite::Connection;
use serde::Deserialize;

use crate::auth::password::verify_password;
use crate::auth::{cookies, session};
use crate::db::queries;
use crate::error::AppResult;
use crate::extractors::Guest;
use crate::flash::{self, Flash};
use crate::guard::{HOME_PATH, LOGIN_PATH};
use crate::state::AppState;
use crate::views::Layout;

const INVALID_LOGIN: &str = "Invalid name or password";

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub name: String,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/login_form", get(login_form))
        .route("/logout", get(logout))
}

/// Open a session for `user_id` and redirect to `to` with the session
/// cookie and `flash` set.
pub(crate) fn start_session(
    state: &AppState,
    conn: &Connection,
    user_id: i64,
    to: &str,
    flash: Flash,
) -> AppResult<Response> {
    let auth = &state.config.auth;
    let token = session::create_session(conn, user_id, auth.session_hours)?;

    Ok(flash::redirect_with_cookies(
        to,
        [
            cookies::session(&auth.cookie_name, &token, auth.session_hours),
            flash.cookie(),
        ],
    ))
}

async fn login_form(Guest(ctx): Guest) -> AppResult<Response> {
    Ok(ctx
        .page(LoginTemplate {
            layout: ctx.layout(),
            name: String::new(),
            error: None,
        })
        .into_response())
}

async fn login(
    State(state): State<AppState>,
    Guest(ctx): Guest,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let name = form.name.trim();
    let user = queries::find_user_by_name(&conn, name)?
        .filter(|u| verify_password(&form.password, &u.password_hash));

    match user {
        Some(user) => {
            tracing::info!(user_id = user.id, "User logged in");
            start_session(&state, &conn, user.id, HOME_PATH, Flash::LoggedIn)
        }
        None => {
            tracing::warn!("Failed login for {:?}", name);
            Ok(ctx
                .page(LoginTemplate {
                    layout: ctx.layout(),
                    name: name.to_string(),
                    error: Some(INVALID_LOGIN.to_string()),
                })
                .into_response())
        }
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let cookie_name = &state.config.auth.cookie_name;

    if let Some(token) = cookies::get(&headers, cookie_name) {
        let conn = state.db.get()?;
        session::delete_session(&conn, token)?;
        tracing::info!("User logged out");
    }

    Ok(flash::redirect_with_cookies(
        LOGIN_PATH,
        [cookies::clear(cookie_name), Flash::LoggedOut.cookie()],
    ))
}
