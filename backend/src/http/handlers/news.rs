//! Class news and comments.
//!
//! Students work on the news of their own class under `/api/news/students`;
//! teachers address any class under `/api/news/teachers/{number}/{letter}`.
//! Both trees share the service operations and differ only in the
//! [`NewsScope`] they pass.

use axum::extract::State;
use axum::Json;

use super::{created, deleted, Created, Deleted, HandlerResult};
use crate::api::{CommentPayload, CommentView, NewsPayload, NewsView};
use crate::http::dto::PageQuery;
use crate::http::error::AppError;
use crate::http::extract::{MaybeUser, Path, Payload, Query};
use crate::http::state::AppState;
use crate::models::{CommentId, NewsId};
use crate::services::{news, NewsScope, Page};

fn class_scope(number: i32, letter: &str) -> Result<NewsScope, AppError> {
    Ok(NewsScope::class(number, letter)?)
}

// =============================================================================
// Student news
// =============================================================================

/// GET /api/news/students
pub async fn list_student_news(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(query): Query<PageQuery>,
) -> HandlerResult<Page<NewsView>> {
    let page = state.page(query.page);
    Ok(Json(
        news::list_news(
            state.repository.as_ref(),
            user.principal(),
            NewsScope::Student,
            page,
        )
        .await?,
    ))
}

/// POST /api/news/students
pub async fn create_student_news(
    State(state): State<AppState>,
    user: MaybeUser,
    Payload(payload): Payload<NewsPayload>,
) -> Created<NewsView> {
    created(
        news::create_news(
            state.repository.as_ref(),
            user.principal(),
            NewsScope::Student,
            payload,
        )
        .await?,
    )
}

/// GET /api/news/students/{news_id}
pub async fn get_student_news(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<NewsId>,
) -> HandlerResult<NewsView> {
    Ok(Json(
        news::get_news(state.repository.as_ref(), user.principal(), NewsScope::Student, id)
            .await?,
    ))
}

/// PUT|PATCH /api/news/students/{news_id}
pub async fn update_student_news(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<NewsId>,
    Payload(payload): Payload<NewsPayload>,
) -> HandlerResult<NewsView> {
    Ok(Json(
        news::update_news(
            state.repository.as_ref(),
            user.principal(),
            NewsScope::Student,
            id,
            payload,
        )
        .await?,
    ))
}

/// DELETE /api/news/students/{news_id}
pub async fn delete_student_news(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<NewsId>,
) -> Deleted {
    news::delete_news(state.repository.as_ref(), user.principal(), NewsScope::Student, id)
        .await?;
    deleted()
}

// =============================================================================
// Teacher news
// =============================================================================

/// GET /api/news/teachers
pub async fn list_authored_news(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(query): Query<PageQuery>,
) -> HandlerResult<Page<NewsView>> {
    let page = state.page(query.page);
    Ok(Json(
        news::list_authored_news(state.repository.as_ref(), user.principal(), page).await?,
    ))
}

/// GET /api/news/teachers/{number}
pub async fn list_news_for_number(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(number): Path<i32>,
    Query(query): Query<PageQuery>,
) -> HandlerResult<Page<NewsView>> {
    let page = state.page(query.page);
    Ok(Json(
        news::list_news_for_number(state.repository.as_ref(), user.principal(), number, page)
            .await?,
    ))
}

/// GET /api/news/teachers/{number}/{letter}
pub async fn list_class_news(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((number, letter)): Path<(i32, String)>,
    Query(query): Query<PageQuery>,
) -> HandlerResult<Page<NewsView>> {
    let scope = class_scope(number, &letter)?;
    let page = state.page(query.page);
    Ok(Json(
        news::list_news(state.repository.as_ref(), user.principal(), scope, page).await?,
    ))
}

/// POST /api/news/teachers/{number}/{letter}
pub async fn create_class_news(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((number, letter)): Path<(i32, String)>,
    Payload(payload): Payload<NewsPayload>,
) -> Created<NewsView> {
    let scope = class_scope(number, &letter)?;
    created(news::create_news(state.repository.as_ref(), user.principal(), scope, payload).await?)
}

/// GET /api/news/teachers/{number}/{letter}/{news_id}
pub async fn get_class_news(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((number, letter, id)): Path<(i32, String, NewsId)>,
) -> HandlerResult<NewsView> {
    let scope = class_scope(number, &letter)?;
    Ok(Json(
        news::get_news(state.repository.as_ref(), user.principal(), scope, id).await?,
    ))
}

/// PUT|PATCH /api/news/teachers/{number}/{letter}/{news_id}
pub async fn update_class_news(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((number, letter, id)): Path<(i32, String, NewsId)>,
    Payload(payload): Payload<NewsPayload>,
) -> HandlerResult<NewsView> {
    let scope = class_scope(number, &letter)?;
    Ok(Json(
        news::update_news(state.repository.as_ref(), user.principal(), scope, id, payload)
            .await?,
    ))
}

/// DELETE /api/news/teachers/{number}/{letter}/{news_id}
pub async fn delete_class_news(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((number, letter, id)): Path<(i32, String, NewsId)>,
) -> Deleted {
    let scope = class_scope(number, &letter)?;
    news::delete_news(state.repository.as_ref(), user.principal(), scope, id).await?;
    deleted()
}

// =============================================================================
// Comments under student news
// =============================================================================

/// GET /api/news/students/{news_id}/comments
pub async fn list_student_comments(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(news_id): Path<NewsId>,
) -> HandlerResult<Vec<CommentView>> {
    Ok(Json(
        news::list_comments(
            state.repository.as_ref(),
            user.principal(),
            NewsScope::Student,
            news_id,
        )
        .await?,
    ))
}

/// POST /api/news/students/{news_id}/comments
pub async fn create_student_comment(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(news_id): Path<NewsId>,
    Payload(payload): Payload<CommentPayload>,
) -> Created<CommentView> {
    created(
        news::create_comment(
            state.repository.as_ref(),
            user.principal(),
            NewsScope::Student,
            news_id,
            payload,
        )
        .await?,
    )
}

/// GET /api/news/students/{news_id}/comments/{comment_id}
pub async fn get_student_comment(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((news_id, id)): Path<(NewsId, CommentId)>,
) -> HandlerResult<CommentView> {
    Ok(Json(
        news::get_comment(
            state.repository.as_ref(),
            user.principal(),
            NewsScope::Student,
            news_id,
            id,
        )
        .await?,
    ))
}

/// PUT|PATCH /api/news/students/{news_id}/comments/{comment_id}
pub async fn update_student_comment(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((news_id, id)): Path<(NewsId, CommentId)>,
    Payload(payload): Payload<CommentPayload>,
) -> HandlerResult<CommentView> {
    Ok(Json(
        news::update_comment(
            state.repository.as_ref(),
            user.principal(),
            NewsScope::Student,
            news_id,
            id,
            payload,
        )
        .await?,
    ))
}

/// DELETE /api/news/students/{news_id}/comments/{comment_id}
pub async fn delete_student_comment(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((news_id, id)): Path<(NewsId, CommentId)>,
) -> Deleted {
    news::delete_comment(
        state.repository.as_ref(),
        user.principal(),
        NewsScope::Student,
        news_id,
        id,
    )
    .await?;
    deleted()
}

// =============================================================================
// Comments under teacher news
// =============================================================================

/// GET /api/news/teachers/{number}/{letter}/{news_id}/comments
pub async fn list_class_comments(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((number, letter, news_id)): Path<(i32, String, NewsId)>,
) -> HandlerResult<Vec<CommentView>> {
    let scope = class_scope(number, &letter)?;
    Ok(Json(
        news::list_comments(state.repository.as_ref(), user.principal(), scope, news_id).await?,
    ))
}

/// POST /api/news/teachers/{number}/{letter}/{news_id}/comments
pub async fn create_class_comment(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((number, letter, news_id)): Path<(i32, String, NewsId)>,
    Payload(payload): Payload<CommentPayload>,
) -> Created<CommentView> {
    let scope = class_scope(number, &letter)?;
    created(
        news::create_comment(
            state.repository.as_ref(),
            user.principal(),
            scope,
            news_id,
            payload,
        )
        .await?,
    )
}

/// GET /api/news/teachers/{number}/{letter}/{news_id}/comments/{comment_id}
pub async fn get_class_comment(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((number, letter, news_id, id)): Path<(i32, String, NewsId, CommentId)>,
) -> HandlerResult<CommentView> {
    let scope = class_scope(number, &letter)?;
    Ok(Json(
        news::get_comment(state.repository.as_ref(), user.principal(), scope, news_id, id)
            .await?,
    ))
}

/// PUT|PATCH /api/news/teachers/{number}/{letter}/{news_id}/comments/{comment_id}
pub async fn update_class_comment(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((number, letter, news_id, id)): Path<(i32, String, NewsId, CommentId)>,
    Payload(payload): Payload<CommentPayload>,
) -> HandlerResult<CommentView> {
    let scope = class_scope(number, &letter)?;
    Ok(Json(
        news::update_comment(
            state.repository.as_ref(),
            user.principal(),
            scope,
            news_id,
            id,
            payload,
        )
        .await?,
    ))
}

/// DELETE /api/news/teachers/{number}/{letter}/{news_id}/comments/{comment_id}
pub async fn delete_class_comment(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((number, letter, news_id, id)): Path<(i32, String, NewsId, CommentId)>,
) -> Deleted {
    let scope = class_scope(number, &letter)?;
    news::delete_comment(state.repository.as_ref(), user.principal(), scope, news_id, id)
        .await?;
    deleted()
}
