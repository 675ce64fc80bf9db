//! Meetup repository trait: meetups, talks and talk votes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::models::{Meetup, MeetupId, NewMeetup, NewTalk, Talk, TalkId, UserId};

/// Meetup date window. Unset bounds are open.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeetupFilter {
    /// Only meetups strictly before this instant.
    pub before: Option<DateTime<Utc>>,
    /// Only meetups at or after this instant.
    pub after: Option<DateTime<Utc>>,
}

/// Repository trait for meetups and talks.
///
/// Talk rows returned by any method carry their current `votes_count`.
#[async_trait]
pub trait MeetupRepository: Send + Sync {
    async fn create_meetup(&self, meetup: NewMeetup) -> RepositoryResult<Meetup>;
    async fn get_meetup(&self, id: MeetupId) -> RepositoryResult<Meetup>;
    async fn update_meetup(&self, meetup: &Meetup) -> RepositoryResult<Meetup>;
    /// Deletes the meetup, its talks and their votes.
    async fn delete_meetup(&self, id: MeetupId) -> RepositoryResult<()>;
    /// Ordered by date, most recent first.
    async fn list_meetups(&self, filter: MeetupFilter) -> RepositoryResult<Vec<Meetup>>;

    async fn create_talk(&self, talk: NewTalk) -> RepositoryResult<Talk>;
    async fn get_talk(&self, id: TalkId) -> RepositoryResult<Talk>;
    async fn update_talk(&self, talk: &Talk) -> RepositoryResult<Talk>;
    async fn delete_talk(&self, id: TalkId) -> RepositoryResult<()>;

    /// Talks of a meetup ordered by vote count (descending), then id.
    async fn list_talks(&self, meetup_id: MeetupId) -> RepositoryResult<Vec<Talk>>;

    /// Record `user_id`'s vote for the talk.
    ///
    /// # Returns
    /// * `Ok(true)` if a vote was added, `Ok(false)` if it already existed
    async fn add_vote(&self, talk_id: TalkId, user_id: UserId) -> RepositoryResult<bool>;

    /// Withdraw `user_id`'s vote.
    ///
    /// # Returns
    /// * `Ok(true)` if a vote was removed, `Ok(false)` if there was none
    async fn remove_vote(&self, talk_id: TalkId, user_id: UserId) -> RepositoryResult<bool>;
}
