//! Profiles, subjects, classes, students and grades.

use axum::extract::State;
use axum::Json;

use super::{created, Created, HandlerResult};
use crate::api::{
    ClassView, ClassesByNumber, GradeRequest, GradeView, ProfileResponse, ProfileUpdateRequest,
    StudentProfileView, SubjectView,
};
use crate::http::extract::{CurrentUser, MaybeUser, Path, Payload};
use crate::http::state::AppState;
use crate::models::{SubjectId, UserId};
use crate::services::{grades, school};

/// GET /api/profile/{user_id}
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(user_id): Path<UserId>,
) -> HandlerResult<ProfileResponse> {
    Ok(Json(
        school::get_profile(state.repository.as_ref(), &principal, user_id).await?,
    ))
}

/// PUT|PATCH /api/profile/{user_id}
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(user_id): Path<UserId>,
    Payload(request): Payload<ProfileUpdateRequest>,
) -> HandlerResult<ProfileResponse> {
    Ok(Json(
        school::update_profile(state.repository.as_ref(), &principal, user_id, request).await?,
    ))
}

/// GET /api/subjects
pub async fn list_subjects(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> HandlerResult<Vec<SubjectView>> {
    Ok(Json(school::list_subjects(state.repository.as_ref()).await?))
}

/// GET /api/classes
pub async fn list_classes(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> HandlerResult<ClassesByNumber> {
    Ok(Json(school::list_classes(state.repository.as_ref()).await?))
}

/// GET /api/classes/{number}
pub async fn classes_with_number(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(number): Path<i32>,
) -> HandlerResult<Vec<ClassView>> {
    Ok(Json(
        school::classes_with_number(state.repository.as_ref(), number).await?,
    ))
}

/// GET /api/students/{number}/{letter}
pub async fn students_in_class(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((number, letter)): Path<(i32, String)>,
) -> HandlerResult<Vec<StudentProfileView>> {
    Ok(Json(
        school::students_in_class(state.repository.as_ref(), number, &letter).await?,
    ))
}

/// GET /api/grades/{subject_id}
pub async fn list_subject_grades(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(subject_id): Path<SubjectId>,
) -> HandlerResult<Vec<GradeView>> {
    Ok(Json(
        grades::list_subject_grades(state.repository.as_ref(), subject_id).await?,
    ))
}

/// GET /api/grades/{subject_id}/{user_id}
pub async fn list_student_grades(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path((subject_id, user_id)): Path<(SubjectId, UserId)>,
) -> HandlerResult<Vec<GradeView>> {
    Ok(Json(
        grades::list_student_grades(state.repository.as_ref(), &principal, subject_id, user_id)
            .await?,
    ))
}

/// POST /api/grades/{subject_id}/{user_id}
pub async fn create_grade(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((subject_id, user_id)): Path<(SubjectId, UserId)>,
    Payload(request): Payload<GradeRequest>,
) -> Created<GradeView> {
    let grade = grades::create_grade(
        state.repository.as_ref(),
        user.principal(),
        subject_id,
        user_id,
        request,
    )
    .await?;
    created(grade)
}
