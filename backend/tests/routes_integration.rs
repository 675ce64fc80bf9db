//! End-to-end tests through the axum router over an in-memory school.

mod support;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use elsyser::db::repository::AccountRepository;
use support::{TestApp, PASSWORD};

fn in_days(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

fn topics(page: &Value) -> Vec<String> {
    page["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|talk| talk["topic"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_register_activate_login_logout() {
    let app = TestApp::new().await;
    let registration = json!({
        "username": "ivan",
        "email": "ivan@elsys-bg.org",
        "first_name": "Ivan",
        "password": "secret123",
        "class": {"number": 12, "letter": "V"}
    });

    let (status, body) = app
        .send(Method::POST, "/api/register", None, Some(registration.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "ivan");

    // Inactive accounts cannot log in yet.
    let credentials = json!({"username": "ivan", "password": "secret123"});
    let (status, _) = app
        .send(Method::POST, "/api/login", None, Some(credentials.clone()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let user = app.repo.find_user_by_username("ivan").await.unwrap().unwrap();
    let student = app.repo.find_student_by_user(user.id).await.unwrap().unwrap();
    let key = student.activation_key.unwrap();

    let (status, body) = app
        .send(Method::GET, &format!("/api/activate/{}", key), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Account activated.");

    // Keys are single use.
    let (status, _) = app
        .send(Method::GET, &format!("/api/activate/{}", key), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(Method::POST, "/api/login", None, Some(credentials))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_teacher"], false);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = app.post("/api/logout", &token, json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/subjects", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "not_authenticated");

    // Same username again.
    let (status, body) = app
        .send(Method::POST, "/api/register", None, Some(registration))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["username"].is_array());
}

#[tokio::test]
async fn test_register_unknown_class() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/api/register",
            None,
            Some(json!({
                "username": "maria",
                "email": "maria@elsys-bg.org",
                "password": "secret123",
                "class": {"number": 7, "letter": "A"}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid");
}

#[tokio::test]
async fn test_login_returns_same_token() {
    let app = TestApp::new().await;
    let credentials = json!({"username": "teacher", "password": PASSWORD});
    let (status, body) = app
        .send(Method::POST, "/api/login", None, Some(credentials))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_teacher"], true);
    assert_eq!(body["token"], app.teacher.as_str());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "teacher", "password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["non_field_errors"].is_array());
}

#[tokio::test]
async fn test_password_reset() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/api/password/reset",
            None,
            Some(json!({"email": "student@elsys-bg.org"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset e-mail has been sent.");

    // The emailed key is only logged; swap in a known one.
    let user = app.repo.find_user_by_username("student").await.unwrap().unwrap();
    app.repo.replace_password_reset(user.id, "reset-key").await.unwrap();

    let confirm = json!({"key": "reset-key", "new_password": "fresh-pass"});
    let (status, _) = app
        .send(Method::POST, "/api/password/reset/confirm", None, Some(confirm.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/exams", &app.student).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "student", "password": "fresh-pass"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(Method::POST, "/api/password/reset/confirm", None, Some(confirm))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["key"].is_array());
}

#[tokio::test]
async fn test_authentication_required() {
    let app = TestApp::new().await;
    for uri in ["/api/exams", "/api/homeworks", "/api/news/students", "/api/meetups"] {
        let (status, _) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let (status, _) = app.get("/api/exams", "not-a-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_edit_only_own() {
    let app = TestApp::new().await;
    let (_, me) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "student", "password": PASSWORD})),
        )
        .await;
    let user_id = me["user"]["id"].as_i64().unwrap();
    let uri = format!("/api/profile/{}", user_id);

    let (status, body) = app.get(&uri, &app.student).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_edit"], true);
    assert_eq!(body["is_teacher"], false);

    let (status, body) = app.get(&uri, &app.classmate).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_edit"], false);

    let (status, _) = app.put(&uri, &app.classmate, json!({"info": "hacked"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.put(&uri, &app.student, json!({"info": "Likes chess"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"], "Likes chess");
    assert_eq!(body["class"]["number"], 10);
}

#[tokio::test]
async fn test_classes_listing() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/classes", &app.student).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["10"].as_array().unwrap().len(), 4);
    assert_eq!(body.as_object().unwrap().len(), 5);

    let (status, body) = app.get("/api/students/10/A", &app.teacher).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_exam_lifecycle() {
    let app = TestApp::new().await;
    let exam = json!({
        "class": {"number": 10, "letter": "A"},
        "date": in_days(7),
        "topic": "Quadratic equations",
        "details": "Chapters 3 and 4"
    });

    let (status, _) = app.post("/api/exams", &app.student, exam.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post("/api/exams", &app.teacher, exam.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["subject"]["title"], "Mathematics");
    let exam_id = body["id"].as_i64().unwrap();

    // Topics are unique.
    let (status, body) = app.post("/api/exams", &app.teacher, exam).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["topic"].is_array());

    let (status, body) = app.get("/api/exams", &app.student).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (_, body) = app.get("/api/exams", &app.outsider).await;
    assert_eq!(body["count"], 0);

    let uri = format!("/api/exams/{}", exam_id);
    let (status, body) = app.put(&uri, &app.teacher, json!({"details": "Only chapter 3"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["details"], "Only chapter 3");
    assert_eq!(body["topic"], "Quadratic equations");

    let (status, _) = app.send(Method::DELETE, &uri, Some(&app.student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(Method::DELETE, &uri, Some(&app.teacher), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app.get(&uri, &app.teacher).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_exam_in_past_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/exams",
            &app.teacher,
            json!({
                "class": {"number": 10, "letter": "A"},
                "date": in_days(-1),
                "topic": "Logarithms"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["date"].is_array());
}

#[tokio::test]
async fn test_submission_rules() {
    let app = TestApp::new().await;
    let (status, homework) = app
        .post(
            "/api/homeworks",
            &app.teacher,
            json!({
                "class": {"number": 10, "letter": "A"},
                "deadline": in_days(3),
                "details": "Exercises 1 to 10"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let submissions = format!("/api/homeworks/{}/submissions", homework["id"]);

    let (status, submission) = app
        .post(&submissions, &app.student, json!({"content": "x = 4"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(submission["checked"], false);

    let (status, body) = app
        .post(&submissions, &app.student, json!({"content": "x = 5"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "You can submit only one submission.");

    // Students only see their own submission.
    let (_, body) = app.get(&submissions, &app.classmate).await;
    assert!(body.as_array().unwrap().is_empty());
    let (_, body) = app.get(&submissions, &app.teacher).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let uri = format!("{}/{}", submissions, submission["id"]);
    let (status, _) = app.put(&uri, &app.classmate, json!({"content": "mine"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.put(&uri, &app.student, json!({"content": "x = 4, y = 2"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["edited"], true);

    let (status, body) = app.put(&uri, &app.teacher, json!({"checked": true})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checked"], true);

    let (status, body) = app.put(&uri, &app.student, json!({"content": "late fix"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Submission is already checked.");
}

#[tokio::test]
async fn test_materials_by_subject() {
    let app = TestApp::new().await;
    let uri = format!("/api/subjects/{}/materials", app.subject_id);
    let material = json!({
        "title": "Vectors",
        "section": "Geometry",
        "content": "Dot product and cross product.",
        "class_number": 10
    });

    let (status, _) = app.post(&uri, &app.student, material.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post(&uri, &app.teacher, material).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["subject"]["title"], "Mathematics");

    let (_, body) = app.get("/api/materials", &app.student).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (_, body) = app.get(&uri, &app.outsider).await;
    assert_eq!(body[0]["title"], "Vectors");
}

#[tokio::test]
async fn test_student_news_and_comments() {
    let app = TestApp::new().await;
    let (status, news) = app
        .post(
            "/api/news/students",
            &app.student,
            json!({"title": "Field trip", "content": "Bring your own lunch."}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(news["class_number"], 10);
    assert_eq!(news["class_letter"], "A");

    let (_, body) = app.get("/api/news/students", &app.classmate).await;
    assert_eq!(body["count"], 1);
    let (_, body) = app.get("/api/news/students", &app.outsider).await;
    assert_eq!(body["count"], 0);

    let news_uri = format!("/api/news/students/{}", news["id"]);
    let (status, _) = app.get(&news_uri, &app.outsider).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.put(&news_uri, &app.classmate, json!({"title": "Mine now"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let comments = format!("{}/comments", news_uri);
    let (status, comment) = app
        .post(&comments, &app.classmate, json!({"content": "Great!"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app.get(&news_uri, &app.student).await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);

    let comment_uri = format!("{}/{}", comments, comment["id"]);
    let (status, _) = app.put(&comment_uri, &app.student, json!({"content": "Edited"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .put(&comment_uri, &app.classmate, json!({"content": "Great, see you there!"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["edited"], true);

    let (status, _) = app
        .send(Method::DELETE, &news_uri, Some(&app.student), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&comment_uri, &app.classmate).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_teacher_news_scope() {
    let app = TestApp::new().await;
    let (status, news) = app
        .post(
            "/api/news/teachers/10/A",
            &app.teacher,
            json!({"title": "Parents meeting", "content": "Friday at 18:00."}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post(
            "/api/news/teachers/10/A",
            &app.teacher,
            json!({"title": "Parents meeting", "content": "Friday at 18:00."}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/news/teachers", &app.student).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.get("/api/news/teachers", &app.teacher).await;
    assert_eq!(body["count"], 1);
    let (_, body) = app.get("/api/news/teachers/10", &app.teacher).await;
    assert_eq!(body["count"], 1);
    let (_, body) = app.get("/api/news/teachers/10/B", &app.teacher).await;
    assert_eq!(body["count"], 0);

    // The class news shows up for the students of that class.
    let (_, body) = app.get("/api/news/students", &app.student).await;
    assert_eq!(body["results"][0]["id"], news["id"]);

    let (status, _) = app.get("/api/news/teachers/10/X", &app.teacher).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_meetup_talk_voting() {
    let app = TestApp::new().await;
    let meetup = json!({
        "date": (Utc::now() + Duration::days(14)).to_rfc3339(),
        "description": "Spring tech talks"
    });

    let (status, _) = app.post("/api/meetups", &app.student, meetup.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, meetup) = app.post("/api/meetups", &app.admin, meetup).await;
    assert_eq!(status, StatusCode::CREATED);
    let talks = format!("/api/meetups/{}/talks", meetup["id"]);

    let (_, first) = app
        .post(&talks, &app.student, json!({"topic": "Ownership", "description": "Borrowing explained."}))
        .await;
    let (status, second) = app
        .post(&talks, &app.teacher, json!({"topic": "Lifetimes", "description": "Why 'a exists."}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app.get(&talks, &app.student).await;
    assert_eq!(topics(&body), vec!["Ownership", "Lifetimes"]);

    let upvote = format!("{}/{}/upvote", talks, second["id"]);
    for token in [&app.student, &app.classmate, &app.classmate] {
        let (status, _) = app.put(&upvote, token, json!({})).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = app.get(&format!("{}/{}", talks, second["id"]), &app.outsider).await;
    assert_eq!(body["votes_count"], 2);

    let (_, body) = app.get(&talks, &app.student).await;
    assert_eq!(topics(&body), vec!["Lifetimes", "Ownership"]);

    let downvote = format!("{}/{}/downvote", talks, second["id"]);
    let (_, body) = app.put(&downvote, &app.student, json!({})).await;
    assert_eq!(body["votes_count"], 1);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("{}/{}", talks, first["id"]),
            Some(&app.student),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.get(&format!("/api/meetups/{}", meetup["id"]), &app.student).await;
    assert_eq!(body["talks"].as_array().unwrap().len(), 2);

    let (_, body) = app.get("/api/meetups?when=upcoming", &app.student).await;
    assert_eq!(body["count"], 1);
    let (_, body) = app.get("/api/meetups?when=past", &app.student).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_pagination() {
    let app = TestApp::new().await;
    for i in 0..12 {
        let (status, _) = app
            .post(
                "/api/news/students",
                &app.student,
                json!({"title": format!("Notice {}", i), "content": "Nothing new today."}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.get("/api/news/students", &app.student).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 12);
    assert_eq!(body["next"], 2);
    assert_eq!(body["previous"], Value::Null);
    assert_eq!(body["results"].as_array().unwrap().len(), 10);

    let (_, body) = app.get("/api/news/students?page=2", &app.student).await;
    assert_eq!(body["previous"], 1);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    let (status, body) = app.get("/api/news/students?page=3", &app.student).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Invalid page.");
}

#[tokio::test]
async fn test_malformed_body() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(Method::POST, "/api/login", None, Some(json!(["not", "an", "object"])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "parse_error");
}

#[tokio::test]
async fn test_malformed_path_and_query() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/exams/abc", &app.student).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "parse_error");

    let (status, body) = app.get("/api/exams?page=x", &app.student).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "parse_error");
}

#[tokio::test]
async fn test_class_number_outside_school_years() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/classes/13", &app.student).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = app.get("/api/news/teachers/7", &app.teacher).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
