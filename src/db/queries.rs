// Every read and write the handlers perform, one function per statement.
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::{
    Comment, CommentView, FeedPost, Follow, Like, Post, User, UserListing, DEFAULT_AVATAR,
};

/// True for a UNIQUE/PRIMARY KEY constraint failure. NOT NULL, CHECK and
/// foreign-key failures are not.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

// --- Users ---

pub fn insert_user(
    conn: &Connection,
    name: &str,
    password_hash: &str,
    avatar_path: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (name, password_hash, avatar_path) VALUES (?1, ?2, ?3)",
        params![name, password_hash, avatar_path],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS),
        params![id],
        User::from_row,
    )
    .optional()
}

pub fn find_user_by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE name = ?1", User::COLUMNS),
        params![name],
        User::from_row,
    )
    .optional()
}

/// True if some user other than `except` already has `name`.
pub fn name_taken(conn: &Connection, name: &str, except: Option<i64>) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE name = ?1 AND id != ?2",
        params![name, except.unwrap_or(-1)],
        |row| row.get(0),
    )
}

pub fn update_user(
    conn: &Connection,
    id: i64,
    name: &str,
    avatar_path: Option<&str>,
) -> rusqlite::Result<()> {
    match avatar_path {
        Some(path) => conn.execute(
            "UPDATE users SET name = ?1, avatar_path = ?2 WHERE id = ?3",
            params![name, path, id],
        )?,
        None => conn.execute(
            "UPDATE users SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?,
    };
    Ok(())
}

/// All users, oldest account first, flagged with whether `viewer_id` follows them.
pub fn list_users(conn: &Connection, viewer_id: i64) -> rusqlite::Result<Vec<UserListing>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.name, u.password_hash, u.avatar_path, u.created_at,
                EXISTS (SELECT 1 FROM follows f WHERE f.follower_id = ?1 AND f.followed_id = u.id)
         FROM users u
         ORDER BY u.id ASC",
    )?;

    let users = stmt
        .query_map(params![viewer_id], |row| {
            Ok(UserListing {
                user: User::from_row(row)?,
                followed_by_viewer: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(users)
}

// --- Posts ---

pub fn insert_post(
    conn: &Connection,
    user_id: i64,
    content: &str,
    image_path: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO posts (user_id, content, image_path) VALUES (?1, ?2, ?3)",
        params![user_id, content, image_path],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_post(conn: &Connection, id: i64) -> rusqlite::Result<Option<Post>> {
    conn.query_row(
        &format!("SELECT {} FROM posts WHERE id = ?1", Post::COLUMNS),
        params![id],
        Post::from_row,
    )
    .optional()
}

pub fn update_post_content(conn: &Connection, id: i64, content: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE posts SET content = ?1 WHERE id = ?2",
        params![content, id],
    )?;
    Ok(())
}

/// Deletes the post; its likes and comments go with it.
pub fn delete_post(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM posts WHERE id = ?1", params![id])
}

const FEED_SELECT: &str = "SELECT p.id, p.user_id, u.name, u.avatar_path, p.content, p.image_path, p.created_at,
        (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id),
        EXISTS (SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = ?1),
        (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id)
 FROM posts p
 JOIN users u ON u.id = p.user_id";

fn feed_post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedPost> {
    let avatar: Option<String> = row.get(3)?;
    Ok(FeedPost {
        id: row.get(0)?,
        user_id: row.get(1)?,
        author_name: row.get(2)?,
        author_avatar: avatar.unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
        content: row.get(4)?,
        image_path: row.get(5)?,
        created_at: row.get(6)?,
        like_count: row.get(7)?,
        liked_by_viewer: row.get(8)?,
        comment_count: row.get(9)?,
    })
}

/// Every post, newest first.
pub fn feed(conn: &Connection, viewer_id: i64) -> rusqlite::Result<Vec<FeedPost>> {
    let mut stmt = conn.prepare(&format!(
        "{} ORDER BY p.created_at DESC, p.id DESC",
        FEED_SELECT
    ))?;
    let posts = stmt
        .query_map(params![viewer_id], feed_post_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(posts)
}

pub fn feed_post(
    conn: &Connection,
    post_id: i64,
    viewer_id: i64,
) -> rusqlite::Result<Option<FeedPost>> {
    conn.query_row(
        &format!("{} WHERE p.id = ?2", FEED_SELECT),
        params![viewer_id, post_id],
        feed_post_from_row,
    )
    .optional()
}

/// One user's posts, newest first.
pub fn posts_by_user(
    conn: &Connection,
    author_id: i64,
    viewer_id: i64,
) -> rusqlite::Result<Vec<FeedPost>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE p.user_id = ?2 ORDER BY p.created_at DESC, p.id DESC",
        FEED_SELECT
    ))?;
    let posts = stmt
        .query_map(params![viewer_id, author_id], feed_post_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(posts)
}

// --- Likes ---

/// Returns false when the like already existed.
pub fn insert_like(conn: &Connection, user_id: i64, post_id: i64) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO likes (user_id, post_id) VALUES (?1, ?2)",
        params![user_id, post_id],
    )?;
    Ok(inserted > 0)
}

pub fn find_like(conn: &Connection, user_id: i64, post_id: i64) -> rusqlite::Result<Option<Like>> {
    conn.query_row(
        "SELECT id, user_id, post_id FROM likes WHERE user_id = ?1 AND post_id = ?2",
        params![user_id, post_id],
        |row| {
            Ok(Like {
                id: row.get(0)?,
                user_id: row.get(1)?,
                post_id: row.get(2)?,
            })
        },
    )
    .optional()
}

pub fn delete_like(conn: &Connection, id: i64) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM likes WHERE id = ?1", params![id])?;
    Ok(())
}

// --- Comments ---

pub fn insert_comment(
    conn: &Connection,
    user_id: i64,
    post_id: i64,
    comment: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO comments (user_id, post_id, comment) VALUES (?1, ?2, ?3)",
        params![user_id, post_id, comment],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_comment(conn: &Connection, id: i64) -> rusqlite::Result<Option<Comment>> {
    conn.query_row(
        &format!("SELECT {} FROM comments WHERE id = ?1", Comment::COLUMNS),
        params![id],
        Comment::from_row,
    )
    .optional()
}

pub fn delete_comment(conn: &Connection, id: i64) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM comments WHERE id = ?1", params![id])?;
    Ok(())
}

/// Comments on a post, oldest first.
pub fn comments_for_post(conn: &Connection, post_id: i64) -> rusqlite::Result<Vec<CommentView>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.user_id, u.name, c.comment, c.created_at
         FROM comments c
         JOIN users u ON u.id = c.user_id
         WHERE c.post_id = ?1
         ORDER BY c.created_at ASC, c.id ASC",
    )?;

    let comments = stmt
        .query_map(params![post_id], |row| {
            Ok(CommentView {
                id: row.get(0)?,
                user_id: row.get(1)?,
                author_name: row.get(2)?,
                comment: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(comments)
}

// --- Follows ---

/// Returns false when the edge already existed.
pub fn insert_follow(conn: &Connection, follow: &Follow) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO follows (follower_id, followed_id) VALUES (?1, ?2)",
        params![follow.follower_id, follow.followed_id],
    )?;
    Ok(inserted > 0)
}

/// Returns false when there was no such edge.
pub fn delete_follow(conn: &Connection, follow: &Follow) -> rusqlite::Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
        params![follow.follower_id, follow.followed_id],
    )?;
    Ok(deleted > 0)
}

pub fn is_following(conn: &Connection, follow: &Follow) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
        params![follow.follower_id, follow.followed_id],
        |row| row.get(0),
    )
}

/// (followers, following) counts for a user.
pub fn follow_counts(conn: &Connection, user_id: i64) -> rusqlite::Result<(i64, i64)> {
    conn.query_row(
        "SELECT (SELECT COUNT(*) FROM follows WHERE followed_id = ?1),
                (SELECT COUNT(*) FROM follows WHERE follower_id = ?1)",
        params![user_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
}
