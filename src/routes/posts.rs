use askama::Template;
use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::db::queries;
use crate::error::{AppError, AppResult};
use crate::extractors::LoggedIn;
use crate::flash::{self, Flash};
use crate::guard::{require_post_owner, HOME_PATH};
use crate::state::AppState;
use crate::uploads::{self, MultipartForm};
use crate::views::{CommentRow, Layout, PostCard};

const CONTENT_BLANK: &str = "Caption is required";
const IMAGE_BLANK: &str = "Image is required";

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub layout: Layout,
    pub cards: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "pages/new.html")]
pub struct NewPostTemplate {
    pub layout: Layout,
    pub content: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "pages/post.html")]
pub struct ShowPostTemplate {
    pub layout: Layout,
    pub card: PostCard,
    pub comments: Vec<CommentRow>,
    pub viewer_id: i64,
}

#[derive(Template)]
#[template(path = "pages/edit.html")]
pub struct EditPostTemplate {
    pub layout: Layout,
    pub post_id: i64,
    pub content: String,
    pub errors: Vec<String>,
}

// --- Forms ---

#[derive(Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize)]
pub struct DestroyForm {
    pub id: i64,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/new", get(new_form))
        .route("/create", post(create))
        .route("/post/{id}", get(show))
        .route("/edit/{id}", get(edit_form).post(update))
        .route("/update/{id}", post(update))
        .route("/destroy/{id}", post(destroy))
        .route("/destroy", post(destroy_by_form))
}

// --- Handlers ---

async fn index(State(state): State<AppState>, auth: LoggedIn) -> AppResult<Response> {
    let LoggedIn { user, ctx } = auth;

    let posts = {
        let conn = state.db.get()?;
        queries::feed(&conn, user.id)?
    };

    Ok(ctx
        .page(IndexTemplate {
            layout: ctx.layout(),
            cards: PostCard::for_viewer(posts, user.id),
        })
        .into_response())
}

async fn new_form(LoggedIn { ctx, .. }: LoggedIn) -> AppResult<Response> {
    Ok(ctx
        .page(NewPostTemplate {
            layout: ctx.layout(),
            content: String::new(),
            errors: Vec::new(),
        })
        .into_response())
}

async fn create(
    State(state): State<AppState>,
    LoggedIn { user, ctx }: LoggedIn,
    multipart: Multipart,
) -> AppResult<Response> {
    let mut form = MultipartForm::read(multipart).await?;
    let content = form.text("content").trim().to_string();
    let image = form.take_file("image");

    let mut errors = Vec::new();
    if content.is_empty() {
        errors.push(CONTENT_BLANK.to_string());
    }
    if image.is_none() {
        errors.push(IMAGE_BLANK.to_string());
    }

    let Some(image) = image.filter(|_| errors.is_empty()) else {
        return Ok(ctx
            .page(NewPostTemplate {
                layout: ctx.layout(),
                content,
                errors,
            })
            .into_response());
    };

    let image_path =
        uploads::save_image(&state.config.public_dir(), uploads::POST_IMAGES, &image).await?;

    let post_id = {
        let conn = state.db.get()?;
        queries::insert_post(&conn, user.id, &content, &image_path)?
    };
    tracing::info!(post_id, user_id = user.id, "Post created");

    Ok(flash::redirect(HOME_PATH, Flash::PostCreated))
}

async fn show(
    State(state): State<AppState>,
    LoggedIn { user, ctx }: LoggedIn,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let post = queries::feed_post(&conn, id, user.id)?.ok_or(AppError::NotFound)?;
    let comments = queries::comments_for_post(&conn, id)?
        .into_iter()
        .map(|c| CommentRow::new(c, user.id))
        .collect();

    Ok(ctx
        .page(ShowPostTemplate {
            layout: ctx.layout(),
            card: PostCard::new(post, user.id),
            comments,
            viewer_id: user.id,
        })
        .into_response())
}

async fn edit_form(
    State(state): State<AppState>,
    LoggedIn { user, ctx }: LoggedIn,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let post = {
        let conn = state.db.get()?;
        require_post_owner(&conn, &user, id)?
    };

    Ok(ctx
        .page(EditPostTemplate {
            layout: ctx.layout(),
            post_id: post.id,
            content: post.content,
            errors: Vec::new(),
        })
        .into_response())
}

async fn update(
    State(state): State<AppState>,
    LoggedIn { user, ctx }: LoggedIn,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let post = require_post_owner(&conn, &user, id)?;

    let content = form.content.trim();
    if content.is_empty() {
        return Ok(ctx
            .page(EditPostTemplate {
                layout: ctx.layout(),
                post_id: post.id,
                content: String::new(),
                errors: vec![CONTENT_BLANK.to_string()],
            })
            .into_response());
    }

    queries::update_post_content(&conn, post.id, content)?;
    tracing::info!(post_id = post.id, user_id = user.id, "Post updated");

    Ok(flash::redirect(HOME_PATH, Flash::PostUpdated))
}

async fn destroy(
    State(state): State<AppState>,
    auth: LoggedIn,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    destroy_post(&state, &auth, id)
}

/// Script-driven delete that sends the id as a form field.
async fn destroy_by_form(
    State(state): State<AppState>,
    auth: LoggedIn,
    Form(form): Form<DestroyForm>,
) -> AppResult<Response> {
    destroy_post(&state, &auth, form.id)
}

fn destroy_post(state: &AppState, auth: &LoggedIn, id: i64) -> AppResult<Response> {
    let conn = state.db.get()?;
    let post = require_post_owner(&conn, &auth.user, id)?;

    queries::delete_post(&conn, post.id)?;
    tracing::info!(post_id = post.id, user_id = auth.user.id, "Post deleted");

    Ok(flash::redirect(HOME_PATH, Flash::PostDeleted))
}
