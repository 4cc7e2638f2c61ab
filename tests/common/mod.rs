// Not every test binary uses every helper
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use quill::auth::reset::ResetTokens;
use quill::config::Config;
use quill::mail::Mailer;
use quill::state::AppState;
use quill::{app, db};

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub state: AppState,
    // Held so the database and uploads survive until the test ends
    pub _data_dir: TempDir,
}

pub fn test_app() -> TestApp {
    let data_dir = TempDir::new().expect("Failed to create temp dir");

    let mut config = Config::default();
    config.database.path = Some(data_dir.path().join("test.db"));
    config.storage.path = Some(data_dir.path().join("uploads"));

    let pool = db::create_pool(config.db_path()).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let reset_tokens = ResetTokens::new(TEST_SECRET, config.auth.reset_ttl_secs);

    TestApp {
        state: AppState {
            db: pool,
            config,
            reset_tokens,
            mailer: Mailer::disabled(),
        },
        _data_dir: data_dir,
    }
}

impl TestApp {
    pub fn router(&self) -> Router {
        app(self.state.clone())
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::empty()).unwrap();
        self.router().oneshot(request).await.unwrap()
    }

    pub async fn post_form(
        &self,
        path: &str,
        body: &str,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.router().oneshot(request).await.unwrap()
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Response<Body> {
        let body = format!(
            "username={}&email={}&password={}&confirm_password={}",
            username,
            email.replace('@', "%40"),
            password,
            password
        );
        self.post_form("/register", &body, None).await
    }

    /// Log in and return the session cookie for follow-up requests.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = format!(
            "email={}&password={}",
            email.replace('@', "%40"),
            password
        );
        let response = self.post_form("/login", &body, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login should succeed");
        session_cookie(&response).expect("login should set a session cookie")
    }
}

/// The `name=value` part of the session cookie set by a response, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("quill_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
