//! Pre-handler checks. Each one either lets the request through or
//! short-circuits it with a redirect and a flash notice, before the
//! handler touches the database.

use axum::response::{IntoResponse, Response};
use rusqlite::Connection;

use crate::db::models::Post;
use crate::db::queries;
use crate::error::AppResult;
use crate::extractors::{CurrentUser, RequestContext};
use crate::flash::{self, Flash};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Why a guard refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
    LoginRequired,
    AlreadyLoggedIn,
    NotAuthorized,
}

impl Denied {
    pub fn location(self) -> &'static str {
        match self {
            Denied::LoginRequired => LOGIN_PATH,
            Denied::AlreadyLoggedIn | Denied::NotAuthorized => HOME_PATH,
        }
    }

    pub fn flash(self) -> Flash {
        match self {
            Denied::LoginRequired => Flash::LoginRequired,
            Denied::AlreadyLoggedIn => Flash::AlreadyLoggedIn,
            Denied::NotAuthorized => Flash::NotAuthorized,
        }
    }
}

impl std::fmt::Display for Denied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.flash().message())
    }
}

impl std::error::Error for Denied {}

impl IntoResponse for Denied {
    fn into_response(self) -> Response {
        flash::redirect(self.location(), self.flash())
    }
}

pub fn require_login(ctx: &RequestContext) -> Result<&CurrentUser, Denied> {
    ctx.user.as_ref().ok_or(Denied::LoginRequired)
}

pub fn forbid_if_logged_in(ctx: &RequestContext) -> Result<(), Denied> {
    match ctx.user {
        Some(_) => Err(Denied::AlreadyLoggedIn),
        None => Ok(()),
    }
}

/// Capability check: may `actor_id` mutate something owned by `owner_id`?
pub fn can_modify(actor_id: i64, owner_id: i64) -> bool {
    actor_id == owner_id
}

/// `owner_id` is `None` when the resource does not exist, which is refused
/// the same way as someone else's resource.
pub fn require_owner(actor: &CurrentUser, owner_id: Option<i64>) -> Result<(), Denied> {
    match owner_id {
        Some(owner) if can_modify(actor.id, owner) => Ok(()),
        _ => Err(Denied::NotAuthorized),
    }
}

/// Ownership of post `post_id`. Hands back the loaded post so the handler
/// does not look it up again.
pub fn require_post_owner(conn: &Connection, actor: &CurrentUser, post_id: i64) -> AppResult<Post> {
    let post = queries::find_post(conn, post_id)?;
    require_owner(actor, post.as_ref().map(|p| p.user_id))?;
    post.ok_or_else(|| Denied::NotAuthorized.into())
}
