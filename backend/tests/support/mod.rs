#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use elsyser::config::Settings;
use elsyser::db::repository::{AccountRepository, FullRepository, SchoolRepository};
use elsyser::db::LocalRepository;
use elsyser::http::{create_router, AppState};
use elsyser::models::{ClassLetter, NewStudent, NewTeacher, NewUser, SubjectId, User};
use elsyser::services::accounts::{generate_key, hash_password};
use elsyser::services::seed::seed_classes;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on unwind and serializes access to the
/// process environment, since tests in one binary run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub const PASSWORD: &str = "correct-horse";

/// A router over a seeded in-memory school.
///
/// Every account has the password [`PASSWORD`] and an issued token.
pub struct TestApp {
    pub repo: Arc<LocalRepository>,
    pub router: Router,
    pub subject_id: SubjectId,
    /// Teaches Mathematics.
    pub teacher: String,
    /// 10A
    pub student: String,
    /// 10A
    pub classmate: String,
    /// 11B
    pub outsider: String,
    /// Staff, no school role.
    pub admin: String,
}

async fn user(repo: &LocalRepository, name: &str, is_staff: bool) -> User {
    repo.create_user(NewUser {
        username: name.into(),
        email: format!("{}@elsys-bg.org", name),
        first_name: name.into(),
        last_name: "Test".into(),
        password_hash: hash_password(PASSWORD).unwrap(),
        is_active: true,
        is_staff,
    })
    .await
    .unwrap()
}

async fn token(repo: &LocalRepository, user: &User) -> String {
    repo.get_or_create_token(user.id, &generate_key())
        .await
        .unwrap()
        .key
}

async fn student(repo: &LocalRepository, name: &str, number: i32, letter: ClassLetter) -> String {
    let class = repo.find_class(number, letter).await.unwrap().unwrap();
    let u = user(repo, name, false).await;
    repo.create_student(NewStudent {
        user_id: u.id,
        class_id: class.id,
        profile_image_url: String::new(),
        info: String::new(),
        activation_key: None,
    })
    .await
    .unwrap();
    token(repo, &u).await
}

impl TestApp {
    pub async fn new() -> Self {
        let repo = Arc::new(LocalRepository::new());
        seed_classes(repo.as_ref()).await.unwrap();
        let math = repo.create_subject("Mathematics").await.unwrap();

        let teacher_user = user(&repo, "teacher", false).await;
        repo.create_teacher(NewTeacher {
            user_id: teacher_user.id,
            subject_id: math.id,
            profile_image_url: String::new(),
            info: "Algebra and geometry".into(),
        })
        .await
        .unwrap();
        let teacher = token(&repo, &teacher_user).await;

        let student_token = student(&repo, "student", 10, ClassLetter::A).await;
        let classmate = student(&repo, "classmate", 10, ClassLetter::A).await;
        let outsider = student(&repo, "outsider", 11, ClassLetter::B).await;
        let admin_user = user(&repo, "admin", true).await;
        let admin = token(&repo, &admin_user).await;

        let shared = Arc::clone(&repo) as Arc<dyn FullRepository>;
        let router = create_router(AppState::new(shared, Settings::default()));

        Self {
            repo,
            router,
            subject_id: math.id,
            teacher,
            student: student_token,
            classmate,
            outsider,
            admin,
        }
    }

    /// Send one request through the router and decode the JSON reply.
    ///
    /// An empty body decodes to `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }
}
