//! Meetups, their talks and talk voting.

use axum::extract::State;
use axum::Json;

use super::{created, deleted, Created, Deleted, HandlerResult};
use crate::api::{MeetupPayload, MeetupView, TalkPayload, TalkView};
use crate::http::dto::{MeetupQuery, PageQuery};
use crate::http::extract::{MaybeUser, Path, Payload, Query};
use crate::http::state::AppState;
use crate::models::{MeetupId, TalkId};
use crate::services::{talks, Page};

/// GET /api/meetups?when=past|upcoming
pub async fn list_meetups(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(query): Query<MeetupQuery>,
) -> HandlerResult<Page<MeetupView>> {
    let page = state.page(query.page);
    Ok(Json(
        talks::list_meetups(state.repository.as_ref(), user.principal(), query.when, page)
            .await?,
    ))
}

/// POST /api/meetups
pub async fn create_meetup(
    State(state): State<AppState>,
    user: MaybeUser,
    Payload(payload): Payload<MeetupPayload>,
) -> Created<MeetupView> {
    created(talks::create_meetup(state.repository.as_ref(), user.principal(), payload).await?)
}

/// GET /api/meetups/{meetup_id}
pub async fn get_meetup(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<MeetupId>,
) -> HandlerResult<MeetupView> {
    Ok(Json(
        talks::get_meetup(state.repository.as_ref(), user.principal(), id).await?,
    ))
}

/// PUT|PATCH /api/meetups/{meetup_id}
pub async fn update_meetup(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<MeetupId>,
    Payload(payload): Payload<MeetupPayload>,
) -> HandlerResult<MeetupView> {
    Ok(Json(
        talks::update_meetup(state.repository.as_ref(), user.principal(), id, payload).await?,
    ))
}

/// DELETE /api/meetups/{meetup_id}
pub async fn delete_meetup(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<MeetupId>,
) -> Deleted {
    talks::delete_meetup(state.repository.as_ref(), user.principal(), id).await?;
    deleted()
}

/// GET /api/meetups/{meetup_id}/talks
pub async fn list_talks(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(meetup_id): Path<MeetupId>,
    Query(query): Query<PageQuery>,
) -> HandlerResult<Page<TalkView>> {
    let page = state.page(query.page);
    Ok(Json(
        talks::list_talks(state.repository.as_ref(), user.principal(), meetup_id, page).await?,
    ))
}

/// POST /api/meetups/{meetup_id}/talks
pub async fn create_talk(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(meetup_id): Path<MeetupId>,
    Payload(payload): Payload<TalkPayload>,
) -> Created<TalkView> {
    created(
        talks::create_talk(state.repository.as_ref(), user.principal(), meetup_id, payload)
            .await?,
    )
}

/// GET /api/meetups/{meetup_id}/talks/{talk_id}
pub async fn get_talk(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((meetup_id, id)): Path<(MeetupId, TalkId)>,
) -> HandlerResult<TalkView> {
    Ok(Json(
        talks::get_talk(state.repository.as_ref(), user.principal(), meetup_id, id).await?,
    ))
}

/// PUT|PATCH /api/meetups/{meetup_id}/talks/{talk_id}
pub async fn update_talk(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((meetup_id, id)): Path<(MeetupId, TalkId)>,
    Payload(payload): Payload<TalkPayload>,
) -> HandlerResult<TalkView> {
    Ok(Json(
        talks::update_talk(
            state.repository.as_ref(),
            user.principal(),
            meetup_id,
            id,
            payload,
        )
        .await?,
    ))
}

/// DELETE /api/meetups/{meetup_id}/talks/{talk_id}
pub async fn delete_talk(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((meetup_id, id)): Path<(MeetupId, TalkId)>,
) -> Deleted {
    talks::delete_talk(state.repository.as_ref(), user.principal(), meetup_id, id).await?;
    deleted()
}

/// PUT /api/meetups/{meetup_id}/talks/{talk_id}/upvote
pub async fn upvote(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((meetup_id, id)): Path<(MeetupId, TalkId)>,
) -> HandlerResult<TalkView> {
    Ok(Json(
        talks::upvote(state.repository.as_ref(), user.principal(), meetup_id, id).await?,
    ))
}

/// PUT /api/meetups/{meetup_id}/talks/{talk_id}/downvote
pub async fn downvote(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((meetup_id, id)): Path<(MeetupId, TalkId)>,
) -> HandlerResult<TalkView> {
    Ok(Json(
        talks::downvote(state.repository.as_ref(), user.principal(), meetup_id, id).await?,
    ))
}
