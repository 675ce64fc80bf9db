//! News repository trait: news entries and comments.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    ClassLetter, Comment, CommentId, NewComment, NewNews, News, NewsId, UserId,
};

/// News selection. Unset fields do not filter; `class_letter` only applies
/// together with `class_number`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewsFilter {
    pub author_id: Option<UserId>,
    pub class_number: Option<i32>,
    pub class_letter: Option<ClassLetter>,
}

#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// `Conflict` if a news entry with the same title and content exists.
    async fn create_news(&self, news: NewNews) -> RepositoryResult<News>;
    async fn get_news(&self, id: NewsId) -> RepositoryResult<News>;
    async fn update_news(&self, news: &News) -> RepositoryResult<News>;
    /// Deletes the news entry together with its comments.
    async fn delete_news(&self, id: NewsId) -> RepositoryResult<()>;
    /// Newest first.
    async fn list_news(&self, filter: NewsFilter) -> RepositoryResult<Vec<News>>;

    async fn create_comment(&self, comment: NewComment) -> RepositoryResult<Comment>;
    async fn get_comment(&self, id: CommentId) -> RepositoryResult<Comment>;
    async fn update_comment(&self, comment: &Comment) -> RepositoryResult<Comment>;
    async fn delete_comment(&self, id: CommentId) -> RepositoryResult<()>;
    /// Comments of one news entry, oldest first.
    async fn list_comments(&self, news_id: NewsId) -> RepositoryResult<Vec<Comment>>;
}
