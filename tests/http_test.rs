//! End-to-end tests that drive the full router in-process.
//!
//! Covers:
//! - Login guard on every protected route
//! - Ownership guard on post edit/delete, comments and profile edits
//! - Post creation, validation and newest-first listing
//! - Signup, login, logout and the session cookie
//! - Likes, follows and one-shot flash notices

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use rusqlite::params;
use tempfile::TempDir;
use tower::ServiceExt;

use shutter::config::Config;
use shutter::db;
use shutter::routes;
use shutter::state::AppState;

const BOUNDARY: &str = "shutter-test-boundary";
const PASSWORD: &str = "correct horse";

struct TestApp {
    _tmp: TempDir,
    state: AppState,
    app: Router,
}

fn test_app() -> TestApp {
    let tmp = TempDir::new().unwrap();
    let mut config = Config::default();
    config.resolve_paths(tmp.path());
    config.auth.bcrypt_cost = 4;

    let pool = db::create_pool(&config.db_path()).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let state = AppState { db: pool, config };
    TestApp {
        app: routes::app(state.clone()),
        state,
        _tmp: tmp,
    }
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.unwrap()
    }

    async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, path: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::from(form.to_string())).unwrap())
            .await
    }

    /// POST with no body and no content type.
    async fn post_empty(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::builder().method("POST").uri(path);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    async fn post_multipart(
        &self,
        path: &str,
        parts: &[Part<'_>],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut req = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::from(multipart_body(parts))).unwrap())
            .await
    }

    /// Sign up `name` and return the `name=value` session cookie.
    async fn signup(&self, name: &str) -> String {
        let resp = self
            .post_multipart(
                "/user_create",
                &[Part::Text("name", name), Part::Text("password", PASSWORD)],
                None,
            )
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");
        session_cookie(&resp).expect("signup should set a session cookie")
    }

    async fn create_post(&self, cookie: &str, content: &str, file_name: &str) -> Response<Body> {
        self.post_multipart(
            "/create",
            &[
                Part::Text("content", content),
                Part::File("image", file_name, b"\x89PNG fake image"),
            ],
            Some(cookie),
        )
        .await
    }

    fn count(&self, sql: &str) -> i64 {
        let conn = self.state.db.get().unwrap();
        conn.query_row(sql, [], |r| r.get(0)).unwrap()
    }

    fn user_id(&self, name: &str) -> i64 {
        let conn = self.state.db.get().unwrap();
        conn.query_row(
            "SELECT id FROM users WHERE name = ?1",
            params![name],
            |r| r.get(0),
        )
        .unwrap()
    }

    fn only_post_id(&self) -> i64 {
        let conn = self.state.db.get().unwrap();
        conn.query_row("SELECT id FROM posts", [], |r| r.get(0))
            .unwrap()
    }
}

fn location(resp: &Response<Body>) -> String {
    resp.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

fn set_cookies(resp: &Response<Body>) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// `name=value` part of a non-empty `shutter_session` Set-Cookie.
fn session_cookie(resp: &Response<Body>) -> Option<String> {
    set_cookies(resp)
        .into_iter()
        .filter_map(|c| c.split(';').next().map(str::to_string))
        .find(|c| c.starts_with("shutter_session=") && c != "shutter_session=")
}

fn flash_code(resp: &Response<Body>) -> Option<String> {
    set_cookies(resp)
        .into_iter()
        .filter_map(|c| c.split(';').next().map(str::to_string))
        .find_map(|c| c.strip_prefix("shutter_flash=").map(str::to_string))
}

async fn body_text(resp: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ============================================================================
// LOGIN GUARD
// ============================================================================

#[tokio::test]
async fn anonymous_pages_redirect_to_login() {
    let app = test_app();

    for path in ["/", "/new", "/post/1", "/edit/1", "/users", "/@alice"] {
        let resp = app.get(path, None).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "GET {}", path);
        assert_eq!(location(&resp), "/login", "GET {}", path);
        assert_eq!(flash_code(&resp).as_deref(), Some("login-required"));
    }
}

#[tokio::test]
async fn anonymous_mutations_never_touch_the_database() {
    let app = test_app();
    let cookie = app.signup("alice").await;
    app.signup("bob").await;
    app.create_post(&cookie, "mine", "a.png").await;
    let post_id = app.only_post_id();
    let alice = app.user_id("alice");
    let bob = app.user_id("bob");

    app.post_form(&format!("/like_create/{}", post_id), "", Some(&cookie))
        .await;
    app.post_form(
        &format!("/comment_create/{}/{}", post_id, alice),
        "comment=first",
        Some(&cookie),
    )
    .await;
    app.post_form(&format!("/follow/{}", bob), "", Some(&cookie))
        .await;
    let comment_id = app.count("SELECT id FROM comments");

    let form_routes = [
        format!("/update/{}", post_id),
        format!("/edit/{}", post_id),
        format!("/destroy/{}", post_id),
        "/destroy".to_string(),
        format!("/like_create/{}", post_id),
        format!("/like_destroy/{}", post_id),
        format!("/comment_create/{}/{}", post_id, alice),
        format!("/comment_destroy/{}", comment_id),
        format!("/follow/{}", bob),
        format!("/unfollow/{}", bob),
    ];
    for path in &form_routes {
        let form = format!("id={}&content=hacked&comment=hacked", post_id);
        let resp = app.post_form(path, &form, None).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "POST {}", path);
        assert_eq!(location(&resp), "/login", "POST {}", path);
    }

    let resp = app
        .post_multipart(
            "/create",
            &[
                Part::Text("content", "anon"),
                Part::File("image", "anon.png", b"x"),
            ],
            None,
        )
        .await;
    assert_eq!(location(&resp), "/login");

    let resp = app
        .post_multipart(
            "/user_update/alice",
            &[Part::Text("user_edit_name", "mallory")],
            None,
        )
        .await;
    assert_eq!(location(&resp), "/login");

    assert_eq!(app.count("SELECT COUNT(*) FROM posts"), 1);
    assert_eq!(
        app.count("SELECT COUNT(*) FROM posts WHERE content = 'mine'"),
        1
    );
    assert_eq!(app.count("SELECT COUNT(*) FROM likes"), 1);
    assert_eq!(
        app.count("SELECT COUNT(*) FROM comments WHERE comment = 'first'"),
        1
    );
    assert_eq!(app.count("SELECT COUNT(*) FROM comments"), 1);
    assert_eq!(app.count("SELECT COUNT(*) FROM follows"), 1);
    assert_eq!(
        app.count("SELECT COUNT(*) FROM users WHERE name = 'alice'"),
        1
    );
}

#[tokio::test]
async fn anonymous_request_with_no_body_still_redirects_to_login() {
    let app = test_app();
    let cookie = app.signup("alice").await;
    app.create_post(&cookie, "mine", "a.png").await;
    let post_id = app.only_post_id();

    let paths = [
        "/create".to_string(),
        format!("/update/{}", post_id),
        format!("/edit/{}", post_id),
        "/destroy".to_string(),
        format!("/comment_create/{}/1", post_id),
        "/user_update/alice".to_string(),
        "/destroy/not-a-number".to_string(),
    ];
    for path in &paths {
        let resp = app.post_empty(path, None).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "POST {}", path);
        assert_eq!(location(&resp), "/login", "POST {}", path);
        assert_eq!(flash_code(&resp).as_deref(), Some("login-required"));
    }

    // guest-only posts turn a logged-in user away before reading the body
    for path in ["/user_create", "/login"] {
        let resp = app.post_empty(path, Some(&cookie)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "POST {}", path);
        assert_eq!(location(&resp), "/");
        assert_eq!(flash_code(&resp).as_deref(), Some("already-logged-in"));
    }

    assert_eq!(app.count("SELECT COUNT(*) FROM posts"), 1);
}

#[tokio::test]
async fn logged_in_user_is_kept_off_guest_pages() {
    let app = test_app();
    let cookie = app.signup("alice").await;

    for path in ["/signup", "/login", "/login_form"] {
        let resp = app.get(path, Some(&cookie)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "GET {}", path);
        assert_eq!(location(&resp), "/");
        assert_eq!(flash_code(&resp).as_deref(), Some("already-logged-in"));
    }
}

// ============================================================================
// POSTS
// ============================================================================

#[tokio::test]
async fn created_post_is_listed_first() {
    let app = test_app();
    let cookie = app.signup("alice").await;

    let resp = app.create_post(&cookie, "older", "old.png").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let resp = app.create_post(&cookie, "hello", "a.png").await;
    assert_eq!(location(&resp), "/");
    assert_eq!(flash_code(&resp).as_deref(), Some("post-created"));

    let alice = app.user_id("alice");
    let conn = app.state.db.get().unwrap();
    let (user_id, image_path): (i64, String) = conn
        .query_row(
            "SELECT user_id, image_path FROM posts WHERE content = 'hello'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(user_id, alice);
    assert_eq!(image_path, "/image/a.png");
    drop(conn);

    let body = body_text(app.get("/", Some(&cookie)).await).await;
    let newer = body.find("hello").expect("new post listed");
    let older = body.find("older").expect("old post listed");
    assert!(newer < older, "newest post should come first");
}

#[tokio::test]
async fn uploaded_image_is_served() {
    let app = test_app();
    let cookie = app.signup("alice").await;
    app.create_post(&cookie, "hello", "a.png").await;

    let resp = app.get("/image/a.png", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"\x89PNG fake image");

    let resp = app.get("/image/missing.png", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_without_caption_or_image_is_rejected() {
    let app = test_app();
    let cookie = app.signup("alice").await;

    let resp = app.create_post(&cookie, "   ", "a.png").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Caption is required"));
    assert!(body.contains("action=\"/create\""));

    let resp = app
        .post_multipart("/create", &[Part::Text("content", "no photo")], Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Image is required"));
    assert!(body.contains("no photo"), "attempted caption is kept");

    assert_eq!(app.count("SELECT COUNT(*) FROM posts"), 0);
}

#[tokio::test]
async fn only_the_owner_can_edit_or_delete() {
    let app = test_app();
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    app.create_post(&alice, "original", "a.png").await;
    let post_id = app.only_post_id();

    let resp = app.get(&format!("/edit/{}", post_id), Some(&bob)).await;
    assert_eq!(location(&resp), "/");
    assert_eq!(flash_code(&resp).as_deref(), Some("not-authorized"));

    for path in [
        format!("/edit/{}", post_id),
        format!("/update/{}", post_id),
        format!("/destroy/{}", post_id),
    ] {
        let resp = app.post_form(&path, "content=hacked", Some(&bob)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");
        assert_eq!(flash_code(&resp).as_deref(), Some("not-authorized"));
    }
    let resp = app
        .post_form("/destroy", &format!("id={}", post_id), Some(&bob))
        .await;
    assert_eq!(flash_code(&resp).as_deref(), Some("not-authorized"));

    assert_eq!(
        app.count("SELECT COUNT(*) FROM posts WHERE content = 'original'"),
        1
    );
}

#[tokio::test]
async fn missing_post_is_not_authorized_for_mutation_but_404_for_show() {
    let app = test_app();
    let cookie = app.signup("alice").await;

    let resp = app.post_form("/destroy/999", "", Some(&cookie)).await;
    assert_eq!(location(&resp), "/");
    assert_eq!(flash_code(&resp).as_deref(), Some("not-authorized"));

    let resp = app.get("/post/999", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn owner_edits_then_deletes() {
    let app = test_app();
    let cookie = app.signup("alice").await;
    app.create_post(&cookie, "before", "a.png").await;
    let post_id = app.only_post_id();

    let body = body_text(app.get(&format!("/edit/{}", post_id), Some(&cookie)).await).await;
    assert!(body.contains("before"));

    let resp = app
        .post_form(&format!("/update/{}", post_id), "content=", Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Caption is required"));

    let resp = app
        .post_form(&format!("/edit/{}", post_id), "content=after", Some(&cookie))
        .await;
    assert_eq!(flash_code(&resp).as_deref(), Some("post-updated"));
    assert_eq!(
        app.count("SELECT COUNT(*) FROM posts WHERE content = 'after'"),
        1
    );

    let resp = app
        .post_form(&format!("/destroy/{}", post_id), "", Some(&cookie))
        .await;
    assert_eq!(flash_code(&resp).as_deref(), Some("post-deleted"));
    assert_eq!(app.count("SELECT COUNT(*) FROM posts"), 0);
}

// ============================================================================
// SIGNUP / LOGIN / LOGOUT
// ============================================================================

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let app = test_app();
    app.signup("alice").await;

    let resp = app
        .post_multipart(
            "/user_create",
            &[Part::Text("name", "alice"), Part::Text("password", "other")],
            None,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).is_none());
    let body = body_text(resp).await;
    assert!(body.contains("Name is already taken"));
    assert!(body.contains("action=\"/user_create\""));

    assert_eq!(app.count("SELECT COUNT(*) FROM users"), 1);
}

#[tokio::test]
async fn signup_stores_a_password_hash() {
    let app = test_app();
    app.signup("alice").await;

    let conn = app.state.db.get().unwrap();
    let hash: String = conn
        .query_row("SELECT password_hash FROM users", [], |r| r.get(0))
        .unwrap();
    assert_ne!(hash, PASSWORD);
    assert!(hash.starts_with("$2"));
}

#[tokio::test]
async fn login_and_logout_manage_the_session() {
    let app = test_app();
    let signup_cookie = app.signup("alice").await;
    let alice = app.user_id("alice");

    let resp = app.get("/logout", Some(&signup_cookie)).await;
    assert_eq!(location(&resp), "/login");
    assert_eq!(flash_code(&resp).as_deref(), Some("logged-out"));
    assert!(session_cookie(&resp).is_none());
    assert_eq!(app.count("SELECT COUNT(*) FROM sessions"), 0);

    // the old cookie no longer logs anyone in
    let resp = app.get("/", Some(&signup_cookie)).await;
    assert_eq!(location(&resp), "/login");

    let resp = app
        .post_form("/login", "name=alice&password=wrong", None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).is_none());
    assert!(body_text(resp).await.contains("Invalid name or password"));

    let resp = app
        .post_form("/login", "name=alice&password=correct+horse", None)
        .await;
    assert_eq!(location(&resp), "/");
    assert_eq!(flash_code(&resp).as_deref(), Some("logged-in"));
    let cookie = session_cookie(&resp).unwrap();
    let token = cookie.trim_start_matches("shutter_session=");

    let conn = app.state.db.get().unwrap();
    let session_user: i64 = conn
        .query_row(
            "SELECT user_id FROM sessions WHERE token = ?1",
            params![token],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(session_user, alice);
    drop(conn);

    assert_eq!(app.get("/", Some(&cookie)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn flash_shows_once_then_clears() {
    let app = test_app();

    let resp = app.get("/login", Some("shutter_flash=login-required")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = set_cookies(&resp)
        .iter()
        .any(|c| c.starts_with("shutter_flash=;") && c.contains("Max-Age=0"));
    assert!(cleared, "rendering a flash must clear its cookie");
    assert!(body_text(resp).await.contains("Login required"));

    let resp = app.get("/login", None).await;
    assert!(set_cookies(&resp).is_empty());
    assert!(!body_text(resp).await.contains("Login required"));
}

// ============================================================================
// USERS
// ============================================================================

#[tokio::test]
async fn profiles_need_an_existing_handle() {
    let app = test_app();
    let cookie = app.signup("alice").await;

    let resp = app.get("/@alice", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Edit profile"));

    assert_eq!(
        app.get("/@nobody", Some(&cookie)).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/alice", Some(&cookie)).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn users_can_only_edit_themselves() {
    let app = test_app();
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    let resp = app.get("/user_edit/@alice", Some(&bob)).await;
    assert_eq!(flash_code(&resp).as_deref(), Some("not-authorized"));

    let resp = app
        .post_multipart(
            "/user_update/alice",
            &[Part::Text("user_edit_name", "mallory")],
            Some(&bob),
        )
        .await;
    assert_eq!(flash_code(&resp).as_deref(), Some("not-authorized"));
    assert_eq!(
        app.count("SELECT COUNT(*) FROM users WHERE name = 'alice'"),
        1
    );

    let resp = app
        .post_multipart(
            "/user_update/alice",
            &[Part::Text("user_edit_name", "bob")],
            Some(&alice),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Name is already taken"));

    let resp = app
        .post_multipart(
            "/user_update/alice",
            &[
                Part::Text("user_edit_name", "alicia"),
                Part::File("user_edit_image", "me.png", b"avatar"),
            ],
            Some(&alice),
        )
        .await;
    assert_eq!(location(&resp), "/@alicia");
    assert_eq!(flash_code(&resp).as_deref(), Some("user-updated"));

    let conn = app.state.db.get().unwrap();
    let avatar: String = conn
        .query_row(
            "SELECT avatar_path FROM users WHERE name = 'alicia'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(avatar, "/image/user_image/me.png");
}

// ============================================================================
// LIKES / COMMENTS / FOLLOWS
// ============================================================================

#[tokio::test]
async fn like_then_unlike_leaves_no_row() {
    let app = test_app();
    let cookie = app.signup("alice").await;
    app.create_post(&cookie, "hello", "a.png").await;
    let post_id = app.only_post_id();

    for _ in 0..2 {
        let resp = app
            .post_form(&format!("/like_create/{}", post_id), "", Some(&cookie))
            .await;
        assert_eq!(location(&resp), "/");
    }
    assert_eq!(app.count("SELECT COUNT(*) FROM likes"), 1);

    let resp = app
        .post_form(&format!("/like_destroy/{}", post_id), "", Some(&cookie))
        .await;
    assert_eq!(flash_code(&resp).as_deref(), Some("unliked"));
    assert_eq!(app.count("SELECT COUNT(*) FROM likes"), 0);
}

#[tokio::test]
async fn comments_are_written_as_the_actor_only() {
    let app = test_app();
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    app.create_post(&alice, "hello", "a.png").await;
    let post_id = app.only_post_id();
    let alice_id = app.user_id("alice");
    let bob_id = app.user_id("bob");

    // bob cannot comment in alice's name
    let resp = app
        .post_form(
            &format!("/comment_create/{}/{}", post_id, alice_id),
            "comment=spoofed",
            Some(&bob),
        )
        .await;
    assert_eq!(flash_code(&resp).as_deref(), Some("not-authorized"));
    assert_eq!(app.count("SELECT COUNT(*) FROM comments"), 0);

    let resp = app
        .post_form(
            &format!("/comment_create/{}/{}", post_id, bob_id),
            "comment=nice+shot",
            Some(&bob),
        )
        .await;
    assert_eq!(location(&resp), format!("/post/{}", post_id));
    assert_eq!(app.count("SELECT COUNT(*) FROM comments"), 1);

    let body = body_text(app.get(&format!("/post/{}", post_id), Some(&alice)).await).await;
    assert!(body.contains("nice shot"));

    let comment_id = app.count("SELECT id FROM comments");
    let resp = app
        .post_form(&format!("/comment_destroy/{}", comment_id), "", Some(&alice))
        .await;
    assert_eq!(flash_code(&resp).as_deref(), Some("not-authorized"));
    let resp = app
        .post_form(&format!("/comment_destroy/{}", comment_id), "", Some(&bob))
        .await;
    assert_eq!(flash_code(&resp).as_deref(), Some("comment-deleted"));
    assert_eq!(app.count("SELECT COUNT(*) FROM comments"), 0);
}

#[tokio::test]
async fn follow_and_unfollow() {
    let app = test_app();
    let alice = app.signup("alice").await;
    app.signup("bob").await;
    let alice_id = app.user_id("alice");
    let bob_id = app.user_id("bob");

    let resp = app
        .post_form(&format!("/follow/{}", alice_id), "", Some(&alice))
        .await;
    assert_eq!(flash_code(&resp).as_deref(), Some("cannot-follow-self"));

    let resp = app
        .post_form(&format!("/follow/{}", bob_id), "", Some(&alice))
        .await;
    assert_eq!(location(&resp), "/users");
    assert_eq!(app.count("SELECT COUNT(*) FROM follows"), 1);

    let body = body_text(app.get("/users", Some(&alice)).await).await;
    assert!(body.contains(&format!("action=\"/unfollow/{}\"", bob_id)));

    app.post_form(&format!("/unfollow/{}", bob_id), "", Some(&alice))
        .await;
    assert_eq!(app.count("SELECT COUNT(*) FROM follows"), 0);

    let resp = app.post_form("/follow/999", "", Some(&alice)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
