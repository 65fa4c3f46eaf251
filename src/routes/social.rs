use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::post;
use axum::{Form, Router};
use serde::Deserialize;

use crate::db::models::Follow;
use crate::db::queries;
use crate::error::{AppError, AppResult};
use crate::extractors::LoggedIn;
use crate::flash::{self, Flash};
use crate::guard::{require_owner, HOME_PATH};
use crate::state::AppState;

const USERS_PATH: &str = "/users";

#[derive(Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub comment: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/like_create/{id}", post(like_create))
        .route("/like_destroy/{id}", post(like_destroy))
        .route("/comment_create/{post_id}/{user_id}", post(comment_create))
        .route("/comment_destroy/{id}", post(comment_destroy))
        .route("/follow/{user_id}", post(follow))
        .route("/unfollow/{user_id}", post(unfollow))
}

fn post_path(post_id: i64) -> String {
    format!("/post/{}", post_id)
}

// --- Likes ---

async fn like_create(
    State(state): State<AppState>,
    LoggedIn { user, .. }: LoggedIn,
    Path(post_id): Path<i64>,
) -> AppResult<Response> {

    let conn = state.db.get()?;
    queries::find_post(&conn, post_id)?.ok_or(AppError::NotFound)?;
    if queries::insert_like(&conn, user.id, post_id)? {
        tracing::info!(post_id, user_id = user.id, "Post liked");
    }

    Ok(flash::redirect(HOME_PATH, Flash::Liked))
}

/// Only ever removes the actor's own like.
async fn like_destroy(
    State(state): State<AppState>,
    LoggedIn { user, .. }: LoggedIn,
    Path(post_id): Path<i64>,
) -> AppResult<Response> {

    let conn = state.db.get()?;
    if let Some(like) = queries::find_like(&conn, user.id, post_id)? {
        queries::delete_like(&conn, like.id)?;
        tracing::info!(post_id, user_id = user.id, "Like removed");
    }

    Ok(flash::redirect(HOME_PATH, Flash::Unliked))
}

// --- Comments ---

/// The path names the commenting user; it has to be the actor.
async fn comment_create(
    State(state): State<AppState>,
    LoggedIn { user, .. }: LoggedIn,
    Path((post_id, user_id)): Path<(i64, i64)>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    require_owner(&user, Some(user_id))?;

    let conn = state.db.get()?;
    queries::find_post(&conn, post_id)?.ok_or(AppError::NotFound)?;

    let comment = form.comment.trim();
    if comment.is_empty() {
        return Ok(flash::redirect(&post_path(post_id), Flash::CommentEmpty));
    }

    let comment_id = queries::insert_comment(&conn, user.id, post_id, comment)?;
    tracing::info!(comment_id, post_id, user_id = user.id, "Comment created");

    Ok(flash::redirect(&post_path(post_id), Flash::Commented))
}

async fn comment_destroy(
    State(state): State<AppState>,
    LoggedIn { user, .. }: LoggedIn,
    Path(id): Path<i64>,
) -> AppResult<Response> {

    let conn = state.db.get()?;
    let comment = queries::find_comment(&conn, id)?;
    require_owner(&user, comment.as_ref().map(|c| c.user_id))?;
    let Some(comment) = comment else {
        return Err(AppError::NotFound);
    };

    queries::delete_comment(&conn, comment.id)?;
    tracing::info!(comment_id = comment.id, user_id = user.id, "Comment deleted");

    Ok(flash::redirect(
        &post_path(comment.post_id),
        Flash::CommentDeleted,
    ))
}

// --- Follows ---

async fn follow(
    State(state): State<AppState>,
    LoggedIn { user, .. }: LoggedIn,
    Path(user_id): Path<i64>,
) -> AppResult<Response> {
    if user.id == user_id {
        return Ok(flash::redirect(USERS_PATH, Flash::CannotFollowSelf));
    }

    let conn = state.db.get()?;
    queries::find_user(&conn, user_id)?.ok_or(AppError::NotFound)?;
    let edge = Follow {
        follower_id: user.id,
        followed_id: user_id,
    };
    if queries::insert_follow(&conn, &edge)? {
        tracing::info!(follower_id = user.id, followed_id = user_id, "Followed");
    }

    Ok(flash::redirect(USERS_PATH, Flash::Followed))
}

async fn unfollow(
    State(state): State<AppState>,
    LoggedIn { user, .. }: LoggedIn,
    Path(user_id): Path<i64>,
) -> AppResult<Response> {

    let conn = state.db.get()?;
    let edge = Follow {
        follower_id: user.id,
        followed_id: user_id,
    };
    if queries::delete_follow(&conn, &edge)? {
        tracing::info!(follower_id = user.id, followed_id = user_id, "Unfollowed");
    }

    Ok(flash::redirect(USERS_PATH, Flash::Unfollowed))
}
