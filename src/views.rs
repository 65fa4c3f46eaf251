use askama::Template;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDateTime, Utc};

use crate::db::models::{CommentView, FeedPost};
use crate::extractors::CurrentUser;
use crate::flash::{self, Flash};
use crate::guard::can_modify;

/// Shared by every page: the nav bar's user and the pending flash notice.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub user: Option<CurrentUser>,
    pub flash: Option<Flash>,
}

/// Renders an askama template as an HTML response, clearing the flash
/// cookie when this page is the one that displays it.
pub struct Page<T: Template> {
    template: T,
    consumes_flash: bool,
}

impl<T: Template> Page<T> {
    pub fn new(template: T, consumes_flash: bool) -> Self {
        Self {
            template,
            consumes_flash,
        }
    }
}

impl<T: Template> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        match self.template.render() {
            Ok(body) => {
                let mut response = (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                    body,
                )
                    .into_response();
                if self.consumes_flash {
                    if let Ok(clear) = HeaderValue::from_str(&flash::clear_cookie()) {
                        response.headers_mut().append(header::SET_COOKIE, clear);
                    }
                }
                response
            }
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

// --- View structs ---

pub struct PostCard {
    pub post: FeedPost,
    pub created_ago: String,
    pub editable: bool,
}

impl PostCard {
    pub fn new(post: FeedPost, viewer_id: i64) -> Self {
        Self {
            created_ago: parse_and_format_time(&post.created_at),
            editable: can_modify(viewer_id, post.user_id),
            post,
        }
    }

    pub fn for_viewer(posts: Vec<FeedPost>, viewer_id: i64) -> Vec<Self> {
        posts
            .into_iter()
            .map(|post| Self::new(post, viewer_id))
            .collect()
    }
}

pub struct CommentRow {
    pub comment: CommentView,
    pub created_ago: String,
    pub deletable: bool,
}

impl CommentRow {
    pub fn new(comment: CommentView, viewer_id: i64) -> Self {
        Self {
            created_ago: parse_and_format_time(&comment.created_at),
            deletable: can_modify(viewer_id, comment.user_id),
            comment,
        }
    }
}

// --- Time formatting ---

pub fn parse_and_format_time(db_time: &str) -> String {
    NaiveDateTime::parse_from_str(db_time, "%Y-%m-%d %H:%M:%S")
        .map(|dt| format_relative_time(&dt))
        .unwrap_or_else(|_| db_time.to_string())
}

pub fn format_relative_time(dt: &NaiveDateTime) -> String {
    let now = Utc::now().naive_utc();
    let diff = now.signed_duration_since(*dt);

    let seconds = diff.num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = diff.num_minutes();
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }

    let hours = diff.num_hours();
    if hours < 24 {
        return format!("{}h ago", hours);
    }

    let days = diff.num_days();
    if days < 7 {
        return format!("{}d ago", days);
    }

    dt.format("%b %-d, %Y").to_string()
}
