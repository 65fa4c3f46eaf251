use askama::Template;
use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::auth::password::hash_password;
use crate::db::models::{Follow, User, UserListing, DEFAULT_AVATAR};
use crate::db::queries;
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, Guest, LoggedIn};
use crate::flash::{self, Flash};
use crate::guard::{require_owner, Denied, HOME_PATH};
use crate::routes::session::start_session;
use crate::state::AppState;
use crate::uploads::{self, MultipartForm};
use crate::views::{Layout, PostCard};

const NAME_BLANK: &str = "Name is required";
const NAME_TAKEN: &str = "Name is already taken";
const NAME_CHARS: &str = "Name may only contain letters, digits, underscores, hyphens and dots";
const NAME_NEEDS_ALNUM: &str = "Name must contain a letter or digit";
const PASSWORD_BLANK: &str = "Password is required";

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/signup.html")]
pub struct SignupTemplate {
    pub layout: Layout,
    pub name: String,
    pub errors: Vec<String>,
}

pub struct UserRow {
    pub listing: UserListing,
    pub is_self: bool,
}

#[derive(Template)]
#[template(path = "pages/users.html")]
pub struct UsersTemplate {
    pub layout: Layout,
    pub users: Vec<UserRow>,
}

#[derive(Template)]
#[template(path = "pages/profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub user: User,
    pub is_self: bool,
    pub following: bool,
    pub follower_count: i64,
    pub following_count: i64,
    pub cards: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "pages/user_edit.html")]
pub struct UserEditTemplate {
    pub layout: Layout,
    pub original_name: String,
    pub name: String,
    pub avatar: String,
    pub errors: Vec<String>,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup_form))
        .route("/user_create", post(user_create))
        .route("/users", get(users_index))
        .route("/user_edit/{handle}", get(user_edit_form))
        .route("/user_update/{name}", post(user_update))
        .route("/{handle}", get(profile))
}

/// `@alice` → `alice`. Anything without the `@` is not a profile path.
fn parse_handle(handle: &str) -> AppResult<&str> {
    handle
        .strip_prefix('@')
        .filter(|name| !name.is_empty())
        .ok_or(AppError::NotFound)
}

/// Names end up in URL path segments, so keep them to a URL-safe alphabet.
/// A name of only punctuation could be `.` or `..`, which resolve away.
fn name_errors(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some(NAME_BLANK)
    } else if !name
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        Some(NAME_CHARS)
    } else if !name.chars().any(char::is_alphanumeric) {
        Some(NAME_NEEDS_ALNUM)
    } else {
        None
    }
}

// --- Handlers ---

async fn signup_form(Guest(ctx): Guest) -> AppResult<Response> {
    Ok(ctx
        .page(SignupTemplate {
            layout: ctx.layout(),
            name: String::new(),
            errors: Vec::new(),
        })
        .into_response())
}

async fn user_create(
    State(state): State<AppState>,
    Guest(ctx): Guest,
    multipart: Multipart,
) -> AppResult<Response> {
    let mut form = MultipartForm::read(multipart).await?;
    let name = form.text("name").trim().to_string();
    let password = form.text("password").to_string();
    let avatar = form.take_file("user_image");

    let mut errors: Vec<String> = Vec::new();
    if let Some(err) = name_errors(&name) {
        errors.push(err.to_string());
    } else {
        let conn = state.db.get()?;
        if queries::name_taken(&conn, &name, None)? {
            errors.push(NAME_TAKEN.to_string());
        }
    }
    if password.is_empty() {
        errors.push(PASSWORD_BLANK.to_string());
    }

    let signup_again = |errors: Vec<String>| {
        ctx.page(SignupTemplate {
            layout: ctx.layout(),
            name: name.clone(),
            errors,
        })
        .into_response()
    };

    if !errors.is_empty() {
        return Ok(signup_again(errors));
    }

    let password_hash = hash_password(&password, state.config.auth.bcrypt_cost)?;
    let avatar_path = match avatar {
        Some(upload) => {
            uploads::save_image(&state.config.public_dir(), uploads::AVATARS, &upload).await?
        }
        None => DEFAULT_AVATAR.to_string(),
    };

    let conn = state.db.get()?;
    let user_id = match queries::insert_user(&conn, &name, &password_hash, &avatar_path) {
        Ok(id) => id,
        // Lost a race with a concurrent signup for the same name
        Err(e) if queries::is_unique_violation(&e) => {
            return Ok(signup_again(vec![NAME_TAKEN.to_string()]));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id, "User signed up");

    start_session(&state, &conn, user_id, HOME_PATH, Flash::SignedUp)
}

async fn users_index(
    State(state): State<AppState>,
    LoggedIn { user: viewer, ctx }: LoggedIn,
) -> AppResult<Response> {
    let users = {
        let conn = state.db.get()?;
        queries::list_users(&conn, viewer.id)?
    };
    let users = users
        .into_iter()
        .map(|listing| UserRow {
            is_self: listing.user.id == viewer.id,
            listing,
        })
        .collect();

    Ok(ctx
        .page(UsersTemplate {
            layout: ctx.layout(),
            users,
        })
        .into_response())
}

async fn profile(
    State(state): State<AppState>,
    LoggedIn { user: viewer, ctx }: LoggedIn,
    Path(handle): Path<String>,
) -> AppResult<Response> {
    let name = parse_handle(&handle)?;

    let conn = state.db.get()?;
    let user = queries::find_user_by_name(&conn, name)?.ok_or(AppError::NotFound)?;
    let posts = queries::posts_by_user(&conn, user.id, viewer.id)?;
    let (follower_count, following_count) = queries::follow_counts(&conn, user.id)?;
    let following = queries::is_following(
        &conn,
        &Follow {
            follower_id: viewer.id,
            followed_id: user.id,
        },
    )?;

    Ok(ctx
        .page(ProfileTemplate {
            layout: ctx.layout(),
            is_self: user.id == viewer.id,
            following,
            follower_count,
            following_count,
            cards: PostCard::for_viewer(posts, viewer.id),
            user,
        })
        .into_response())
}

/// Load user `name` and check the actor is that user. A missing user is
/// refused like someone else's account.
fn require_self(state: &AppState, actor: &CurrentUser, name: &str) -> AppResult<User> {
    let conn = state.db.get()?;
    let user = queries::find_user_by_name(&conn, name)?;
    require_owner(actor, user.as_ref().map(|u| u.id))?;
    user.ok_or_else(|| Denied::NotAuthorized.into())
}

async fn user_edit_form(
    State(state): State<AppState>,
    LoggedIn { user: actor, ctx }: LoggedIn,
    Path(handle): Path<String>,
) -> AppResult<Response> {
    let user = require_self(&state, &actor, parse_handle(&handle)?)?;

    Ok(ctx
        .page(UserEditTemplate {
            layout: ctx.layout(),
            avatar: user.avatar().to_string(),
            original_name: user.name.clone(),
            name: user.name,
            errors: Vec::new(),
        })
        .into_response())
}

async fn user_update(
    State(state): State<AppState>,
    LoggedIn { user: actor, ctx }: LoggedIn,
    Path(name): Path<String>,
    multipart: Multipart,
) -> AppResult<Response> {
    let user = require_self(&state, &actor, &name)?;

    let mut form = MultipartForm::read(multipart).await?;
    let new_name = form.text("user_edit_name").trim().to_string();
    let avatar = form.take_file("user_edit_image");

    let error = match name_errors(&new_name) {
        Some(err) => Some(err),
        None => {
            let conn = state.db.get()?;
            queries::name_taken(&conn, &new_name, Some(user.id))?.then_some(NAME_TAKEN)
        }
    };
    if let Some(err) = error {
        return Ok(ctx
            .page(UserEditTemplate {
                layout: ctx.layout(),
                avatar: user.avatar().to_string(),
                original_name: user.name,
                name: new_name,
                errors: vec![err.to_string()],
            })
            .into_response());
    }

    let avatar_path = match avatar {
        Some(upload) => Some(
            uploads::save_image(&state.config.public_dir(), uploads::AVATARS, &upload).await?,
        ),
        None => None,
    };

    {
        let conn = state.db.get()?;
        queries::update_user(&conn, user.id, &new_name, avatar_path.as_deref())?;
    }
    tracing::info!(user_id = user.id, "User updated");

    Ok(flash::redirect(
        &format!("/@{}", new_name),
        Flash::UserUpdated,
    ))
}
