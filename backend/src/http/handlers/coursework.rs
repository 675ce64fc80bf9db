//! Exams, homeworks with their submissions, and study materials.

use axum::extract::State;
use axum::Json;

use super::{created, deleted, Created, Deleted, HandlerResult};
use crate::api::{
    ExamPayload, ExamView, HomeworkPayload, HomeworkView, MaterialPayload, MaterialView,
    SubmissionPayload, SubmissionView,
};
use crate::http::dto::PageQuery;
use crate::http::extract::{MaybeUser, Path, Payload, Query};
use crate::http::state::AppState;
use crate::models::{ExamId, HomeworkId, MaterialId, SubjectId, SubmissionId};
use crate::services::{exams, homeworks, materials, Page};

// =============================================================================
// Exams
// =============================================================================

/// GET /api/exams
pub async fn list_exams(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(query): Query<PageQuery>,
) -> HandlerResult<Page<ExamView>> {
    let page = state.page(query.page);
    Ok(Json(
        exams::list_exams(state.repository.as_ref(), user.principal(), page).await?,
    ))
}

/// POST /api/exams
pub async fn create_exam(
    State(state): State<AppState>,
    user: MaybeUser,
    Payload(payload): Payload<ExamPayload>,
) -> Created<ExamView> {
    created(exams::create_exam(state.repository.as_ref(), user.principal(), payload).await?)
}

/// GET /api/exams/{exam_id}
pub async fn get_exam(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<ExamId>,
) -> HandlerResult<ExamView> {
    Ok(Json(
        exams::get_exam(state.repository.as_ref(), user.principal(), id).await?,
    ))
}

/// PUT|PATCH /api/exams/{exam_id}
pub async fn update_exam(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<ExamId>,
    Payload(payload): Payload<ExamPayload>,
) -> HandlerResult<ExamView> {
    Ok(Json(
        exams::update_exam(state.repository.as_ref(), user.principal(), id, payload).await?,
    ))
}

/// DELETE /api/exams/{exam_id}
pub async fn delete_exam(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<ExamId>,
) -> Deleted {
    exams::delete_exam(state.repository.as_ref(), user.principal(), id).await?;
    deleted()
}

// =============================================================================
// Homeworks
// =============================================================================

/// GET /api/homeworks
pub async fn list_homeworks(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(query): Query<PageQuery>,
) -> HandlerResult<Page<HomeworkView>> {
    let page = state.page(query.page);
    Ok(Json(
        homeworks::list_homeworks(state.repository.as_ref(), user.principal(), page).await?,
    ))
}

/// POST /api/homeworks
pub async fn create_homework(
    State(state): State<AppState>,
    user: MaybeUser,
    Payload(payload): Payload<HomeworkPayload>,
) -> Created<HomeworkView> {
    created(
        homeworks::create_homework(state.repository.as_ref(), user.principal(), payload).await?,
    )
}

/// GET /api/homeworks/{homework_id}
pub async fn get_homework(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<HomeworkId>,
) -> HandlerResult<HomeworkView> {
    Ok(Json(
        homeworks::get_homework(state.repository.as_ref(), user.principal(), id).await?,
    ))
}

/// PUT|PATCH /api/homeworks/{homework_id}
pub async fn update_homework(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<HomeworkId>,
    Payload(payload): Payload<HomeworkPayload>,
) -> HandlerResult<HomeworkView> {
    Ok(Json(
        homeworks::update_homework(state.repository.as_ref(), user.principal(), id, payload)
            .await?,
    ))
}

/// DELETE /api/homeworks/{homework_id}
pub async fn delete_homework(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<HomeworkId>,
) -> Deleted {
    homeworks::delete_homework(state.repository.as_ref(), user.principal(), id).await?;
    deleted()
}

// =============================================================================
// Submissions
// =============================================================================

/// GET /api/homeworks/{homework_id}/submissions
pub async fn list_submissions(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(homework_id): Path<HomeworkId>,
) -> HandlerResult<Vec<SubmissionView>> {
    Ok(Json(
        homeworks::list_submissions(state.repository.as_ref(), user.principal(), homework_id)
            .await?,
    ))
}

/// POST /api/homeworks/{homework_id}/submissions
pub async fn create_submission(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(homework_id): Path<HomeworkId>,
    Payload(payload): Payload<SubmissionPayload>,
) -> Created<SubmissionView> {
    created(
        homeworks::create_submission(
            state.repository.as_ref(),
            user.principal(),
            homework_id,
            payload,
        )
        .await?,
    )
}

/// GET /api/homeworks/{homework_id}/submissions/{submission_id}
pub async fn get_submission(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((homework_id, id)): Path<(HomeworkId, SubmissionId)>,
) -> HandlerResult<SubmissionView> {
    Ok(Json(
        homeworks::get_submission(state.repository.as_ref(), user.principal(), homework_id, id)
            .await?,
    ))
}

/// PUT|PATCH /api/homeworks/{homework_id}/submissions/{submission_id}
pub async fn update_submission(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((homework_id, id)): Path<(HomeworkId, SubmissionId)>,
    Payload(payload): Payload<SubmissionPayload>,
) -> HandlerResult<SubmissionView> {
    Ok(Json(
        homeworks::update_submission(
            state.repository.as_ref(),
            user.principal(),
            homework_id,
            id,
            payload,
        )
        .await?,
    ))
}

// =============================================================================
// Materials
// =============================================================================

/// GET /api/materials
pub async fn list_all_materials(
    State(state): State<AppState>,
    user: MaybeUser,
) -> HandlerResult<Vec<MaterialView>> {
    Ok(Json(
        materials::list_all_materials(state.repository.as_ref(), user.principal()).await?,
    ))
}

/// GET /api/subjects/{subject_id}/materials
pub async fn list_subject_materials(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(subject_id): Path<SubjectId>,
) -> HandlerResult<Vec<MaterialView>> {
    Ok(Json(
        materials::list_subject_materials(state.repository.as_ref(), user.principal(), subject_id)
            .await?,
    ))
}

/// POST /api/subjects/{subject_id}/materials
pub async fn create_material(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(subject_id): Path<SubjectId>,
    Payload(payload): Payload<MaterialPayload>,
) -> Created<MaterialView> {
    created(
        materials::create_material(
            state.repository.as_ref(),
            user.principal(),
            subject_id,
            payload,
        )
        .await?,
    )
}

/// GET /api/subjects/{subject_id}/materials/{material_id}
pub async fn get_material(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((subject_id, id)): Path<(SubjectId, MaterialId)>,
) -> HandlerResult<MaterialView> {
    Ok(Json(
        materials::get_material(state.repository.as_ref(), user.principal(), subject_id, id)
            .await?,
    ))
}

/// PUT|PATCH /api/subjects/{subject_id}/materials/{material_id}
pub async fn update_material(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((subject_id, id)): Path<(SubjectId, MaterialId)>,
    Payload(payload): Payload<MaterialPayload>,
) -> HandlerResult<MaterialView> {
    Ok(Json(
        materials::update_material(
            state.repository.as_ref(),
            user.principal(),
            subject_id,
            id,
            payload,
        )
        .await?,
    ))
}

/// DELETE /api/subjects/{subject_id}/materials/{material_id}
pub async fn delete_material(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((subject_id, id)): Path<(SubjectId, MaterialId)>,
) -> Deleted {
    materials::delete_material(state.repository.as_ref(), user.principal(), subject_id, id)
        .await?;
    deleted()
}
