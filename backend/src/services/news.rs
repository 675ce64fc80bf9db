//! Class news and their comments.
//!
//! Students work with the news of their own class. Teachers address a class
//! explicitly through its number and letter and can browse everything they
//! wrote or everything posted for a class number. Comments hang under a
//! news entry reached through either route.

use chrono::Utc;

use crate::api::{CommentPayload, CommentView, NewsPayload, NewsView};
use crate::db::repository::{FullRepository, NewsFilter};
use crate::models::{ClassLetter, Comment, CommentId, NewComment, NewNews, News, NewsId};

use super::error::{ConflictExt, LookupExt, ServiceError, ServiceResult};
use super::pagination::{Page, PageRequest};
use super::permissions::{authorize, ensure_author, Action, Principal, Resource};
use super::render::{self, render_all};
use super::school::ensure_class_number;
use super::validation::{require, validate_with};

/// Which route a news request came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsScope {
    /// The caller's own class, students only.
    Student,
    /// A class picked by a teacher.
    Class { number: i32, letter: ClassLetter },
}

impl NewsScope {
    /// Parse the `{number}/{letter}` path segments. Unknown letters are a 404.
    pub fn class(number: i32, letter: &str) -> ServiceResult<Self> {
        let letter = letter.parse().map_err(|_| ServiceError::not_found())?;
        Ok(NewsScope::Class { number, letter })
    }

    fn resource(self) -> Resource {
        match self {
            NewsScope::Student => Resource::StudentNews,
            NewsScope::Class { .. } => Resource::TeacherNews,
        }
    }
}

/// Check the caller against `scope` and resolve the class it targets.
async fn authorize_scope<'a, R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&'a Principal>,
    scope: NewsScope,
    action: Action,
) -> ServiceResult<(&'a Principal, i32, ClassLetter)> {
    let principal = authorize(principal, scope.resource(), action)?;
    match scope {
        NewsScope::Student => {
            let student = principal.student()?;
            let class = repo.get_class(student.class_id).await?;
            Ok((principal, class.number, class.letter))
        }
        NewsScope::Class { number, letter } => {
            repo.find_class(number, letter)
                .await?
                .ok_or_else(ServiceError::not_found)?;
            Ok((principal, number, letter))
        }
    }
}

async fn news_in_scope<'a, R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&'a Principal>,
    scope: NewsScope,
    action: Action,
    id: NewsId,
) -> ServiceResult<(&'a Principal, News)> {
    let (principal, number, letter) = authorize_scope(repo, principal, scope, action).await?;
    let news = repo.get_news(id).await.or_not_found()?;
    if news.class_number != number || news.class_letter != Some(letter) {
        return Err(ServiceError::not_found());
    }
    Ok((principal, news))
}

async fn paginate_news<R: FullRepository + ?Sized>(
    repo: &R,
    filter: NewsFilter,
    page: PageRequest,
) -> ServiceResult<Page<NewsView>> {
    let news = page.apply(repo.list_news(filter).await?)?;
    let results = render_all!(repo, news.results, render::news);
    Ok(news.with_results(results))
}

// ==================== News ====================

/// News of one class, newest first.
pub async fn list_news<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    scope: NewsScope,
    page: PageRequest,
) -> ServiceResult<Page<NewsView>> {
    let (_, number, letter) = authorize_scope(repo, principal, scope, Action::List).await?;
    let filter = NewsFilter {
        class_number: Some(number),
        class_letter: Some(letter),
        ..Default::default()
    };
    paginate_news(repo, filter, page).await
}

/// Everything the calling teacher has posted.
pub async fn list_authored_news<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    page: PageRequest,
) -> ServiceResult<Page<NewsView>> {
    let principal = authorize(principal, Resource::TeacherNews, Action::List)?;
    let filter = NewsFilter {
        author_id: Some(principal.user.id),
        ..Default::default()
    };
    paginate_news(repo, filter, page).await
}

/// News for every class with the given number.
pub async fn list_news_for_number<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    number: i32,
    page: PageRequest,
) -> ServiceResult<Page<NewsView>> {
    authorize(principal, Resource::TeacherNews, Action::List)?;
    ensure_class_number(number)?;
    let filter = NewsFilter {
        class_number: Some(number),
        ..Default::default()
    };
    paginate_news(repo, filter, page).await
}

pub async fn get_news<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    scope: NewsScope,
    id: NewsId,
) -> ServiceResult<NewsView> {
    let (_, news) = news_in_scope(repo, principal, scope, Action::Retrieve, id).await?;
    render::news(repo, &news).await
}

pub async fn create_news<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    scope: NewsScope,
    payload: NewsPayload,
) -> ServiceResult<NewsView> {
    let (principal, number, letter) =
        authorize_scope(repo, principal, scope, Action::Create).await?;

    validate_with(&payload, |checks| {
        checks.required("title", payload.title.as_ref());
        checks.required("content", payload.content.as_ref());
    })?;

    let news = repo
        .create_news(NewNews {
            title: require("title", payload.title)?,
            content: require("content", payload.content)?,
            author_id: principal.user.id,
            class_number: number,
            class_letter: Some(letter),
        })
        .await
        .conflict_on("non_field_errors")?;

    log::info!(
        "News {} posted for {}{} by '{}'",
        news.id,
        number,
        letter,
        principal.user.username
    );
    render::news(repo, &news).await
}

pub async fn update_news<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    scope: NewsScope,
    id: NewsId,
    payload: NewsPayload,
) -> ServiceResult<NewsView> {
    let (principal, mut news) = news_in_scope(repo, principal, scope, Action::Update, id).await?;
    ensure_author(news.author_id == principal.user.id)?;
    validate_with(&payload, |_| {})?;

    if let Some(title) = payload.title {
        news.title = title;
    }
    if let Some(content) = payload.content {
        news.content = content;
    }
    news.edited = true;
    news.last_edited_on = Some(Utc::now());

    let news = repo
        .update_news(&news)
        .await
        .conflict_on("non_field_errors")?;
    render::news(repo, &news).await
}

/// Deletes the entry and its comments.
pub async fn delete_news<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    scope: NewsScope,
    id: NewsId,
) -> ServiceResult<()> {
    let (principal, news) = news_in_scope(repo, principal, scope, Action::Destroy, id).await?;
    ensure_author(news.author_id == principal.user.id)?;

    repo.delete_news(news.id).await.or_not_found()?;
    log::info!("News {} deleted by '{}'", news.id, principal.user.username);
    Ok(())
}

// ==================== Comments ====================

async fn comment_of<R: FullRepository + ?Sized>(
    repo: &R,
    news: &News,
    id: CommentId,
) -> ServiceResult<Comment> {
    let comment = repo.get_comment(id).await.or_not_found()?;
    if comment.news_id != news.id {
        return Err(ServiceError::not_found());
    }
    Ok(comment)
}

pub async fn list_comments<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    scope: NewsScope,
    news_id: NewsId,
) -> ServiceResult<Vec<CommentView>> {
    authorize(principal, Resource::Comment, Action::List)?;
    let (_, news) = news_in_scope(repo, principal, scope, Action::Retrieve, news_id).await?;
    let comments = repo.list_comments(news.id).await?;
    Ok(render_all!(repo, comments, render::comment))
}

pub async fn get_comment<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    scope: NewsScope,
    news_id: NewsId,
    id: CommentId,
) -> ServiceResult<CommentView> {
    authorize(principal, Resource::Comment, Action::Retrieve)?;
    let (_, news) = news_in_scope(repo, principal, scope, Action::Retrieve, news_id).await?;
    let comment = comment_of(repo, &news, id).await?;
    render::comment(repo, &comment).await
}

pub async fn create_comment<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    scope: NewsScope,
    news_id: NewsId,
    payload: CommentPayload,
) -> ServiceResult<CommentView> {
    authorize(principal, Resource::Comment, Action::Create)?;
    let (principal, news) = news_in_scope(repo, principal, scope, Action::Retrieve, news_id).await?;

    validate_with(&payload, |checks| {
        checks.required("content", payload.content.as_ref());
    })?;

    let comment = repo
        .create_comment(NewComment {
            news_id: news.id,
            posted_by: principal.user.id,
            content: require("content", payload.content)?,
        })
        .await?;
    render::comment(repo, &comment).await
}

pub async fn update_comment<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    scope: NewsScope,
    news_id: NewsId,
    id: CommentId,
    payload: CommentPayload,
) -> ServiceResult<CommentView> {
    authorize(principal, Resource::Comment, Action::Update)?;
    let (principal, news) = news_in_scope(repo, principal, scope, Action::Retrieve, news_id).await?;
    let mut comment = comment_of(repo, &news, id).await?;
    ensure_author(comment.posted_by == principal.user.id)?;
    validate_with(&payload, |_| {})?;

    if let Some(content) = payload.content {
        comment.content = content;
    }
    comment.edited = true;
    comment.last_edited_on = Some(Utc::now());

    let comment = repo.update_comment(&comment).await?;
    render::comment(repo, &comment).await
}

pub async fn delete_comment<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    scope: NewsScope,
    news_id: NewsId,
    id: CommentId,
) -> ServiceResult<()> {
    authorize(principal, Resource::Comment, Action::Destroy)?;
    let (principal, news) = news_in_scope(repo, principal, scope, Action::Retrieve, news_id).await?;
    let comment = comment_of(repo, &news, id).await?;
    ensure_author(comment.posted_by == principal.user.id)?;

    repo.delete_comment(comment.id).await.or_not_found()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::fixture;

    fn payload(title: &str) -> NewsPayload {
        NewsPayload {
            title: Some(title.into()),
            content: Some("School trip on Friday".into()),
        }
    }

    fn comment(content: &str) -> CommentPayload {
        CommentPayload {
            content: Some(content.into()),
        }
    }

    fn class_10a() -> NewsScope {
        NewsScope::class(10, "A").unwrap()
    }

    #[tokio::test]
    async fn test_student_news_stays_in_class() {
        let f = fixture().await;
        let news = create_news(&f.repo, Some(&f.student), NewsScope::Student, payload("Trip"))
            .await
            .unwrap();
        assert_eq!(news.class_number, 10);
        assert_eq!(news.class_letter, Some(ClassLetter::A));

        let page = list_news(&f.repo, Some(&f.classmate), NewsScope::Student, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.count, 1);

        let page = list_news(&f.repo, Some(&f.outsider), NewsScope::Student, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.count, 0);
        assert!(matches!(
            get_news(&f.repo, Some(&f.outsider), NewsScope::Student, news.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_teacher_routes_require_teacher() {
        let f = fixture().await;
        let err = create_news(&f.repo, Some(&f.student), class_10a(), payload("Hi"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            crate::services::permissions::ONLY_TEACHERS
        );

        let err = list_news(&f.repo, Some(&f.teacher), NewsScope::Student, PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            crate::services::permissions::ONLY_STUDENTS
        );
    }

    #[tokio::test]
    async fn test_teacher_listings() {
        let f = fixture().await;
        create_news(&f.repo, Some(&f.teacher), class_10a(), payload("Exam moved"))
            .await
            .unwrap();
        create_news(&f.repo, Some(&f.other_teacher), NewsScope::class(11, "B").unwrap(), payload("Lab"))
            .await
            .unwrap();

        let own = list_authored_news(&f.repo, Some(&f.teacher), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(own.count, 1);

        let tenth = list_news_for_number(&f.repo, Some(&f.other_teacher), 10, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(tenth.count, 1);
        assert_eq!(tenth.results[0].title, "Exam moved");

        assert!(matches!(
            list_news_for_number(&f.repo, Some(&f.teacher), 13, PageRequest::default()).await,
            Err(ServiceError::NotFound(_))
        ));

        assert!(matches!(
            list_news(&f.repo, Some(&f.teacher), NewsScope::class(12, "G").unwrap(), PageRequest::default()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_marks_edited_and_is_author_only() {
        let f = fixture().await;
        let news = create_news(&f.repo, Some(&f.student), NewsScope::Student, payload("Party"))
            .await
            .unwrap();

        let err = update_news(&f.repo, Some(&f.classmate), NewsScope::Student, news.id, payload("Mine"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let updated = update_news(&f.repo, Some(&f.student), NewsScope::Student, news.id, payload("Party!"))
            .await
            .unwrap();
        assert!(updated.edited);
        assert!(updated.last_edited_on.is_some());
    }

    #[tokio::test]
    async fn test_comments_lifecycle() {
        let f = fixture().await;
        let news = create_news(&f.repo, Some(&f.student), NewsScope::Student, payload("Notes"))
            .await
            .unwrap();
        let posted = create_comment(&f.repo, Some(&f.classmate), NewsScope::Student, news.id, comment("thanks"))
            .await
            .unwrap();
        assert_eq!(posted.posted_by.username, "classmate");

        // teachers reach the same entry through the class route
        let listed = list_comments(&f.repo, Some(&f.teacher), class_10a(), news.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        let err = delete_comment(&f.repo, Some(&f.student), NewsScope::Student, news.id, posted.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let view = get_news(&f.repo, Some(&f.student), NewsScope::Student, news.id)
            .await
            .unwrap();
        assert_eq!(view.comments.len(), 1);

        delete_news(&f.repo, Some(&f.student), NewsScope::Student, news.id)
            .await
            .unwrap();
        assert!(matches!(
            get_comment(&f.repo, Some(&f.student), NewsScope::Student, news.id, posted.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
