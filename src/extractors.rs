use askama::Template;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::{cookies, session};
use crate::db::models::DEFAULT_AVATAR;
use crate::error::AppError;
use crate::flash::{Flash, FLASH_COOKIE};
use crate::guard::{forbid_if_logged_in, require_login};
use crate::state::AppState;
use crate::views::{Layout, Page};

/// The logged-in user, as resolved from the session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub avatar_path: Option<String>,
}

impl CurrentUser {
    pub fn avatar(&self) -> &str {
        self.avatar_path.as_deref().unwrap_or(DEFAULT_AVATAR)
    }
}

/// Everything a handler needs to know about who is asking, resolved once
/// per request and passed in explicitly.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    /// A flash cookie arrived (known code or not) and must be cleared by
    /// the next rendered page.
    pub flash_pending: bool,
}

impl RequestContext {
    pub fn layout(&self) -> Layout {
        Layout {
            user: self.user.clone(),
            flash: self.flash,
        }
    }

    /// Render `template` as this request's page, consuming any flash.
    pub fn page<T: Template>(&self, template: T) -> Page<T> {
        Page::new(template, self.flash_pending)
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let flash_code = cookies::get(&parts.headers, FLASH_COOKIE);
        let flash = flash_code.and_then(Flash::from_code);

        let user = match cookies::get(&parts.headers, &state.config.auth.cookie_name) {
            Some(token) => {
                let conn = state.db.get()?;
                session::user_for_token(&conn, token)?
            }
            None => None,
        };

        Ok(RequestContext {
            user,
            flash,
            flash_pending: flash_code.is_some(),
        })
    }
}

/// A request from a logged-in user. Rejects with the login redirect before
/// any later extractor (path, form, multipart) gets to look at the request.
#[derive(Debug, Clone)]
pub struct LoggedIn {
    pub user: CurrentUser,
    pub ctx: RequestContext,
}

impl FromRequestParts<AppState> for LoggedIn {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::from_request_parts(parts, state).await?;
        let user = require_login(&ctx)?.clone();
        Ok(LoggedIn { user, ctx })
    }
}

/// A request from someone not logged in, for the signup and login pages.
#[derive(Debug, Clone)]
pub struct Guest(pub RequestContext);

impl FromRequestParts<AppState> for Guest {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::from_request_parts(parts, state).await?;
        forbid_if_logged_in(&ctx)?;
        Ok(Guest(ctx))
    }
}
