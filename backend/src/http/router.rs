//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing) and
//! returns the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, accounts, coursework, meetups, news, school};
use super::state::AppState;

/// Request bodies are small JSON documents.
const BODY_LIMIT: usize = 1024 * 1024;

fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(accounts::register))
        .route("/activate/{activation_key}", get(accounts::activate))
        .route("/login", post(accounts::login))
        .route("/logout", post(accounts::logout))
        .route("/password/change", put(accounts::change_password))
        .route("/password/reset", post(accounts::request_password_reset))
        .route(
            "/password/reset/confirm",
            post(accounts::confirm_password_reset),
        )
}

fn school_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile/{user_id}",
            get(school::get_profile)
                .put(school::update_profile)
                .patch(school::update_profile),
        )
        .route("/subjects", get(school::list_subjects))
        .route("/classes", get(school::list_classes))
        .route("/classes/{number}", get(school::classes_with_number))
        .route("/students/{number}/{letter}", get(school::students_in_class))
        .route("/grades/{subject_id}", get(school::list_subject_grades))
        .route(
            "/grades/{subject_id}/{user_id}",
            get(school::list_student_grades).post(school::create_grade),
        )
}

fn coursework_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/exams",
            get(coursework::list_exams).post(coursework::create_exam),
        )
        .route(
            "/exams/{exam_id}",
            get(coursework::get_exam)
                .put(coursework::update_exam)
                .patch(coursework::update_exam)
                .delete(coursework::delete_exam),
        )
        .route(
            "/homeworks",
            get(coursework::list_homeworks).post(coursework::create_homework),
        )
        .route(
            "/homeworks/{homework_id}",
            get(coursework::get_homework)
                .put(coursework::update_homework)
                .patch(coursework::update_homework)
                .delete(coursework::delete_homework),
        )
        .route(
            "/homeworks/{homework_id}/submissions",
            get(coursework::list_submissions).post(coursework::create_submission),
        )
        .route(
            "/homeworks/{homework_id}/submissions/{submission_id}",
            get(coursework::get_submission)
                .put(coursework::update_submission)
                .patch(coursework::update_submission),
        )
        .route("/materials", get(coursework::list_all_materials))
        .route(
            "/subjects/{subject_id}/materials",
            get(coursework::list_subject_materials).post(coursework::create_material),
        )
        .route(
            "/subjects/{subject_id}/materials/{material_id}",
            get(coursework::get_material)
                .put(coursework::update_material)
                .patch(coursework::update_material)
                .delete(coursework::delete_material),
        )
}

fn news_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/news/students",
            get(news::list_student_news).post(news::create_student_news),
        )
        .route(
            "/news/students/{news_id}",
            get(news::get_student_news)
                .put(news::update_student_news)
                .patch(news::update_student_news)
                .delete(news::delete_student_news),
        )
        .route(
            "/news/students/{news_id}/comments",
            get(news::list_student_comments).post(news::create_student_comment),
        )
        .route(
            "/news/students/{news_id}/comments/{comment_id}",
            get(news::get_student_comment)
                .put(news::update_student_comment)
                .patch(news::update_student_comment)
                .delete(news::delete_student_comment),
        )
        .route("/news/teachers", get(news::list_authored_news))
        .route("/news/teachers/{number}", get(news::list_news_for_number))
        .route(
            "/news/teachers/{number}/{letter}",
            get(news::list_class_news).post(news::create_class_news),
        )
        .route(
            "/news/teachers/{number}/{letter}/{news_id}",
            get(news::get_class_news)
                .put(news::update_class_news)
                .patch(news::update_class_news)
                .delete(news::delete_class_news),
        )
        .route(
            "/news/teachers/{number}/{letter}/{news_id}/comments",
            get(news::list_class_comments).post(news::create_class_comment),
        )
        .route(
            "/news/teachers/{number}/{letter}/{news_id}/comments/{comment_id}",
            get(news::get_class_comment)
                .put(news::update_class_comment)
                .patch(news::update_class_comment)
                .delete(news::delete_class_comment),
        )
}

fn meetup_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/meetups",
            get(meetups::list_meetups).post(meetups::create_meetup),
        )
        .route(
            "/meetups/{meetup_id}",
            get(meetups::get_meetup)
                .put(meetups::update_meetup)
                .patch(meetups::update_meetup)
                .delete(meetups::delete_meetup),
        )
        .route(
            "/meetups/{meetup_id}/talks",
            get(meetups::list_talks).post(meetups::create_talk),
        )
        .route(
            "/meetups/{meetup_id}/talks/{talk_id}",
            get(meetups::get_talk)
                .put(meetups::update_talk)
                .patch(meetups::update_talk)
                .delete(meetups::delete_talk),
        )
        .route(
            "/meetups/{meetup_id}/talks/{talk_id}/upvote",
            put(meetups::upvote),
        )
        .route(
            "/meetups/{meetup_id}/talks/{talk_id}/downvote",
            put(meetups::downvote),
        )
}

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Browser clients are served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .merge(account_routes())
        .merge(school_routes())
        .merge(coursework_routes())
        .merge(news_routes())
        .merge(meetup_routes());

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::FullRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
        let state = AppState::new(repo, Settings::default());
        let _router = create_router(state);
    }
}
