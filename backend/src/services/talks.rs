//! Meetups and the talks proposed for them.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::{MeetupPayload, MeetupView, TalkPayload, TalkView};
use crate::db::repository::{FullRepository, MeetupFilter};
use crate::models::{MeetupId, NewMeetup, NewTalk, Talk, TalkId};

use super::error::{LookupExt, ServiceError, ServiceResult};
use super::pagination::{Page, PageRequest};
use super::permissions::{authorize, ensure_author, Action, Principal, Resource};
use super::render::{self, render_all};
use super::validation::{require, validate_with};

/// `?when=` filter for the meetup list, relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetupWhen {
    Past,
    Upcoming,
}

// ==================== Meetups ====================

pub async fn list_meetups<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    when: Option<MeetupWhen>,
    page: PageRequest,
) -> ServiceResult<Page<MeetupView>> {
    authorize(principal, Resource::Meetup, Action::List)?;
    let now = Utc::now();
    let filter = match when {
        Some(MeetupWhen::Past) => MeetupFilter {
            before: Some(now),
            after: None,
        },
        Some(MeetupWhen::Upcoming) => MeetupFilter {
            before: None,
            after: Some(now),
        },
        None => MeetupFilter::default(),
    };

    let meetups = page.apply(repo.list_meetups(filter).await?)?;
    let results = render_all!(repo, meetups.results, render::meetup);
    Ok(meetups.with_results(results))
}

pub async fn get_meetup<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    id: MeetupId,
) -> ServiceResult<MeetupView> {
    authorize(principal, Resource::Meetup, Action::Retrieve)?;
    let meetup = repo.get_meetup(id).await.or_not_found()?;
    render::meetup(repo, &meetup).await
}

pub async fn create_meetup<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    payload: MeetupPayload,
) -> ServiceResult<MeetupView> {
    authorize(principal, Resource::Meetup, Action::Create)?;
    validate_with(&payload, |checks| {
        checks.required("date", payload.date);
    })?;

    let meetup = repo
        .create_meetup(NewMeetup {
            date: require("date", payload.date)?,
            description: payload.description.unwrap_or_default(),
        })
        .await?;
    log::info!("Meetup {} scheduled for {}", meetup.id, meetup.date);
    render::meetup(repo, &meetup).await
}

pub async fn update_meetup<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    id: MeetupId,
    payload: MeetupPayload,
) -> ServiceResult<MeetupView> {
    authorize(principal, Resource::Meetup, Action::Update)?;
    let mut meetup = repo.get_meetup(id).await.or_not_found()?;
    validate_with(&payload, |_| {})?;

    if let Some(date) = payload.date {
        meetup.date = date;
    }
    if let Some(description) = payload.description {
        meetup.description = description;
    }
    let meetup = repo.update_meetup(&meetup).await?;
    render::meetup(repo, &meetup).await
}

/// Deletes the meetup, its talks and their votes.
pub async fn delete_meetup<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    id: MeetupId,
) -> ServiceResult<()> {
    authorize(principal, Resource::Meetup, Action::Destroy)?;
    repo.delete_meetup(id).await.or_not_found()?;
    log::info!("Meetup {} deleted", id);
    Ok(())
}

// ==================== Talks ====================

async fn talk_of<R: FullRepository + ?Sized>(
    repo: &R,
    meetup_id: MeetupId,
    id: TalkId,
) -> ServiceResult<Talk> {
    repo.get_meetup(meetup_id).await.or_not_found()?;
    let talk = repo.get_talk(id).await.or_not_found()?;
    if talk.meetup_id != meetup_id {
        return Err(ServiceError::not_found());
    }
    Ok(talk)
}

/// Talks of a meetup, most voted first.
pub async fn list_talks<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    meetup_id: MeetupId,
    page: PageRequest,
) -> ServiceResult<Page<TalkView>> {
    authorize(principal, Resource::Talk, Action::List)?;
    repo.get_meetup(meetup_id).await.or_not_found()?;

    let talks = page.apply(repo.list_talks(meetup_id).await?)?;
    let results = render_all!(repo, talks.results, render::talk);
    Ok(talks.with_results(results))
}

pub async fn get_talk<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    meetup_id: MeetupId,
    id: TalkId,
) -> ServiceResult<TalkView> {
    authorize(principal, Resource::Talk, Action::Retrieve)?;
    let talk = talk_of(repo, meetup_id, id).await?;
    render::talk(repo, &talk).await
}

pub async fn create_talk<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    meetup_id: MeetupId,
    payload: TalkPayload,
) -> ServiceResult<TalkView> {
    let principal = authorize(principal, Resource::Talk, Action::Create)?;
    repo.get_meetup(meetup_id).await.or_not_found()?;

    validate_with(&payload, |checks| {
        checks.required("topic", payload.topic.as_ref());
        checks.required("description", payload.description.as_ref());
    })?;

    let talk = repo
        .create_talk(NewTalk {
            meetup_id,
            author_id: principal.user.id,
            topic: require("topic", payload.topic)?,
            description: require("description", payload.description)?,
            video_url: payload.video_url,
        })
        .await?;
    log::info!(
        "Talk {} '{}' proposed by '{}'",
        talk.id,
        talk.topic,
        principal.user.username
    );
    render::talk(repo, &talk).await
}

pub async fn update_talk<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    meetup_id: MeetupId,
    id: TalkId,
    payload: TalkPayload,
) -> ServiceResult<TalkView> {
    let principal = authorize(principal, Resource::Talk, Action::Update)?;
    let mut talk = talk_of(repo, meetup_id, id).await?;
    ensure_author(talk.author_id == principal.user.id)?;
    validate_with(&payload, |_| {})?;

    if let Some(topic) = payload.topic {
        talk.topic = topic;
    }
    if let Some(description) = payload.description {
        talk.description = description;
    }
    if payload.video_url.is_some() {
        talk.video_url = payload.video_url;
    }
    let talk = repo.update_talk(&talk).await?;
    render::talk(repo, &talk).await
}

pub async fn delete_talk<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    meetup_id: MeetupId,
    id: TalkId,
) -> ServiceResult<()> {
    authorize(principal, Resource::Talk, Action::Destroy)?;
    let talk = talk_of(repo, meetup_id, id).await?;
    repo.delete_talk(talk.id).await.or_not_found()?;
    Ok(())
}

/// Add the caller's vote. Voting twice keeps a single vote.
pub async fn upvote<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    meetup_id: MeetupId,
    id: TalkId,
) -> ServiceResult<TalkView> {
    let principal = authorize(principal, Resource::Talk, Action::Upvote)?;
    let talk = talk_of(repo, meetup_id, id).await?;
    if repo.add_vote(talk.id, principal.user.id).await? {
        log::debug!("'{}' upvoted talk {}", principal.user.username, talk.id);
    }
    let talk = repo.get_talk(talk.id).await?;
    render::talk(repo, &talk).await
}

/// Withdraw the caller's vote if there is one.
pub async fn downvote<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    meetup_id: MeetupId,
    id: TalkId,
) -> ServiceResult<TalkView> {
    let principal = authorize(principal, Resource::Talk, Action::Downvote)?;
    let talk = talk_of(repo, meetup_id, id).await?;
    if repo.remove_vote(talk.id, principal.user.id).await? {
        log::debug!("'{}' withdrew vote on talk {}", principal.user.username, talk.id);
    }
    let talk = repo.get_talk(talk.id).await?;
    render::talk(repo, &talk).await
}
