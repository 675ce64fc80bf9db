//! Class news and their comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClassLetter, CommentId, NewsId, UserId};

/// A news entry addressed to a class (`class_letter` set) or to a whole
/// school year (`class_letter` empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct News {
    pub id: NewsId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub class_number: i32,
    pub class_letter: Option<ClassLetter>,
    pub posted_on: DateTime<Utc>,
    pub edited: bool,
    pub last_edited_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewNews {
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub class_number: i32,
    pub class_letter: Option<ClassLetter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub news_id: NewsId,
    pub posted_by: UserId,
    pub content: String,
    pub posted_on: DateTime<Utc>,
    pub edited: bool,
    pub last_edited_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub news_id: NewsId,
    pub posted_by: UserId,
    pub content: String,
}
