//! One-shot notices carried across a redirect.
//!
//! A redirect sets the `shutter_flash` cookie to a short code; the next
//! rendered page decodes it, shows the message and clears the cookie.
//! Only known codes round-trip, so the cookie can never inject text.

use axum::http::{header, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};

use crate::auth::cookies;

pub const FLASH_COOKIE: &str = "shutter_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    LoginRequired,
    AlreadyLoggedIn,
    NotAuthorized,
    PostCreated,
    PostUpdated,
    PostDeleted,
    SignedUp,
    LoggedIn,
    LoggedOut,
    UserUpdated,
    Liked,
    Unliked,
    Commented,
    CommentEmpty,
    CommentDeleted,
    Followed,
    Unfollowed,
    CannotFollowSelf,
}

const ALL: &[Flash] = &[
    Flash::LoginRequired,
    Flash::AlreadyLoggedIn,
    Flash::NotAuthorized,
    Flash::PostCreated,
    Flash::PostUpdated,
    Flash::PostDeleted,
    Flash::SignedUp,
    Flash::LoggedIn,
    Flash::LoggedOut,
    Flash::UserUpdated,
    Flash::Liked,
    Flash::Unliked,
    Flash::Commented,
    Flash::CommentEmpty,
    Flash::CommentDeleted,
    Flash::Followed,
    Flash::Unfollowed,
    Flash::CannotFollowSelf,
];

impl Flash {
    pub fn code(self) -> &'static str {
        match self {
            Flash::LoginRequired => "login-required",
            Flash::AlreadyLoggedIn => "already-logged-in",
            Flash::NotAuthorized => "not-authorized",
            Flash::PostCreated => "post-created",
            Flash::PostUpdated => "post-updated",
            Flash::PostDeleted => "post-deleted",
            Flash::SignedUp => "signed-up",
            Flash::LoggedIn => "logged-in",
            Flash::LoggedOut => "logged-out",
            Flash::UserUpdated => "user-updated",
            Flash::Liked => "liked",
            Flash::Unliked => "unliked",
            Flash::Commented => "commented",
            Flash::CommentEmpty => "comment-empty",
            Flash::CommentDeleted => "comment-deleted",
            Flash::Followed => "followed",
            Flash::Unfollowed => "unfollowed",
            Flash::CannotFollowSelf => "cannot-follow-self",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        ALL.iter().copied().find(|f| f.code() == code)
    }

    pub fn message(&self) -> &'static str {
        match self {
            Flash::LoginRequired => "Login required",
            Flash::AlreadyLoggedIn => "You are already logged in",
            Flash::NotAuthorized => "Not authorized",
            Flash::PostCreated => "Posted",
            Flash::PostUpdated => "Post updated",
            Flash::PostDeleted => "Post deleted",
            Flash::SignedUp => "Welcome! Find someone to follow",
            Flash::LoggedIn => "Logged in",
            Flash::LoggedOut => "Logged out",
            Flash::UserUpdated => "Profile updated",
            Flash::Liked => "You liked the post",
            Flash::Unliked => "Like removed",
            Flash::Commented => "Comment posted",
            Flash::CommentEmpty => "Comment cannot be empty",
            Flash::CommentDeleted => "Comment deleted",
            Flash::Followed => "Followed",
            Flash::Unfollowed => "Unfollowed",
            Flash::CannotFollowSelf => "You cannot follow yourself",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Flash::LoginRequired
                | Flash::AlreadyLoggedIn
                | Flash::NotAuthorized
                | Flash::CommentEmpty
                | Flash::CannotFollowSelf
        )
    }

    pub fn cookie(self) -> String {
        format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/",
            FLASH_COOKIE,
            self.code()
        )
    }
}

pub fn clear_cookie() -> String {
    cookies::clear(FLASH_COOKIE)
}

/// 303 to `to`, carrying `flash` to the next rendered page.
pub fn redirect(to: &str, flash: Flash) -> Response {
    redirect_with_cookies(to, [flash.cookie()])
}

/// 303 to `to` with any number of extra `Set-Cookie` values.
pub fn redirect_with_cookies<const N: usize>(to: &str, set_cookies: [String; N]) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, to.to_string())],
        AppendHeaders(set_cookies.map(|c| (header::SET_COOKIE, c))),
        "",
    )
        .into_response()
}
