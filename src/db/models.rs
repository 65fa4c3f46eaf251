use rusqlite::Row;

/// Avatar given to users who sign up without uploading one.
pub const DEFAULT_AVATAR: &str = "/assets/default-avatar.svg";

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub password_hash: String,
    pub avatar_path: Option<String>,
    pub created_at: String,
}

impl User {
    pub(crate) const COLUMNS: &'static str = "id, name, password_hash, avatar_path, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            password_hash: row.get(2)?,
            avatar_path: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    pub fn avatar(&self) -> &str {
        self.avatar_path.as_deref().unwrap_or(DEFAULT_AVATAR)
    }
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub image_path: String,
    pub created_at: String,
}

impl Post {
    pub(crate) const COLUMNS: &'static str = "id, user_id, content, image_path, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            content: row.get(2)?,
            image_path: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub comment: String,
    pub created_at: String,
}

impl Comment {
    pub(crate) const COLUMNS: &'static str = "id, user_id, post_id, comment, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            post_id: row.get(2)?,
            comment: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

/// A directed "follower follows followed" edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Follow {
    pub follower_id: i64,
    pub followed_id: i64,
}

// --- Joined read models ---

/// A post as it appears in a feed, joined with its author and counters
/// relative to the viewing user.
#[derive(Debug, Clone)]
pub struct FeedPost {
    pub id: i64,
    pub user_id: i64,
    pub author_name: String,
    pub author_avatar: String,
    pub content: String,
    pub image_path: String,
    pub created_at: String,
    pub like_count: i64,
    pub liked_by_viewer: bool,
    pub comment_count: i64,
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub id: i64,
    pub user_id: i64,
    pub author_name: String,
    pub comment: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct UserListing {
    pub user: User,
    pub followed_by_viewer: bool,
}
