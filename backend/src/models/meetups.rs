//! Meetups and the talks proposed for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MeetupId, TalkId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meetup {
    pub id: MeetupId,
    pub date: DateTime<Utc>,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewMeetup {
    pub date: DateTime<Utc>,
    pub description: String,
}

/// A talk with its vote tally. `votes_count` is computed by the storage
/// backend and ignored on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talk {
    pub id: TalkId,
    pub meetup_id: MeetupId,
    pub author_id: UserId,
    pub topic: String,
    pub description: String,
    pub video_url: Option<String>,
    pub votes_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewTalk {
    pub meetup_id: MeetupId,
    pub author_id: UserId,
    pub topic: String,
    pub description: String,
    pub video_url: Option<String>,
}
