//! Builders that expand stored entities into response views.
//!
//! Entities only keep foreign keys; views embed the referenced author,
//! subject and class so clients can render a row without extra requests.

use crate::api::{
    AuthorView, ClassView, CommentView, ExamView, GradeView, HomeworkView, MaterialView,
    MeetupView, NewsView, StudentProfileView, SubjectView, SubmissionView, TalkView,
    TeacherProfileView, UserInfo,
};
use crate::db::repository::FullRepository;
use crate::models::{
    Comment, Exam, Grade, Homework, Material, Meetup, News, Student, Submission, Talk, Teacher,
    TeacherId, UserId,
};

use super::error::ServiceResult;

pub async fn author<R: FullRepository + ?Sized>(repo: &R, user_id: UserId) -> ServiceResult<AuthorView> {
    Ok(AuthorView::from(&repo.get_user(user_id).await?))
}

pub async fn teacher_author<R: FullRepository + ?Sized>(
    repo: &R,
    teacher_id: TeacherId,
) -> ServiceResult<AuthorView> {
    let teacher = repo.get_teacher(teacher_id).await?;
    author(repo, teacher.user_id).await
}

pub async fn student_profile<R: FullRepository + ?Sized>(
    repo: &R,
    student: &Student,
) -> ServiceResult<StudentProfileView> {
    let user = repo.get_user(student.user_id).await?;
    let class = repo.get_class(student.class_id).await?;
    Ok(StudentProfileView {
        user: UserInfo::from(&user),
        class: ClassView::from(&class),
        profile_image_url: student.profile_image_url.clone(),
        info: student.info.clone(),
    })
}

pub async fn teacher_profile<R: FullRepository + ?Sized>(
    repo: &R,
    teacher: &Teacher,
) -> ServiceResult<TeacherProfileView> {
    let user = repo.get_user(teacher.user_id).await?;
    let subject = repo.get_subject(teacher.subject_id).await?;
    Ok(TeacherProfileView {
        user: UserInfo::from(&user),
        subject: SubjectView::from(&subject),
        profile_image_url: teacher.profile_image_url.clone(),
        info: teacher.info.clone(),
    })
}

pub async fn grade<R: FullRepository + ?Sized>(repo: &R, grade: &Grade) -> ServiceResult<GradeView> {
    let subject = repo.get_subject(grade.subject_id).await?;
    let student = repo.get_student(grade.student_id).await?;
    Ok(GradeView {
        id: grade.id,
        value: grade.value,
        subject: SubjectView::from(&subject),
        student: author(repo, student.user_id).await?,
        posted_on: grade.posted_on,
    })
}

pub async fn exam<R: FullRepository + ?Sized>(repo: &R, exam: &Exam) -> ServiceResult<ExamView> {
    Ok(ExamView {
        id: exam.id,
        subject: SubjectView::from(&repo.get_subject(exam.subject_id).await?),
        class: ClassView::from(&repo.get_class(exam.class_id).await?),
        date: exam.date,
        topic: exam.topic.clone(),
        details: exam.details.clone(),
        author: teacher_author(repo, exam.author_id).await?,
    })
}

pub async fn homework<R: FullRepository + ?Sized>(
    repo: &R,
    homework: &Homework,
) -> ServiceResult<HomeworkView> {
    Ok(HomeworkView {
        id: homework.id,
        subject: SubjectView::from(&repo.get_subject(homework.subject_id).await?),
        class: ClassView::from(&repo.get_class(homework.class_id).await?),
        deadline: homework.deadline,
        details: homework.details.clone(),
        materials_url: homework.materials_url.clone(),
        author: teacher_author(repo, homework.author_id).await?,
    })
}

pub async fn submission<R: FullRepository + ?Sized>(
    repo: &R,
    submission: &Submission,
) -> ServiceResult<SubmissionView> {
    let student = repo.get_student(submission.student_id).await?;
    Ok(SubmissionView {
        id: submission.id,
        homework_id: submission.homework_id,
        student: author(repo, student.user_id).await?,
        content: submission.content.clone(),
        solution_url: submission.solution_url.clone(),
        checked: submission.checked,
        posted_on: submission.posted_on,
        edited: submission.edited,
        last_edited_on: submission.last_edited_on,
    })
}

pub async fn material<R: FullRepository + ?Sized>(
    repo: &R,
    material: &Material,
) -> ServiceResult<MaterialView> {
    Ok(MaterialView {
        id: material.id,
        title: material.title.clone(),
        section: material.section.clone(),
        content: material.content.clone(),
        class_number: material.class_number,
        subject: SubjectView::from(&repo.get_subject(material.subject_id).await?),
        video_url: material.video_url.clone(),
        author: teacher_author(repo, material.author_id).await?,
    })
}

pub async fn comment<R: FullRepository + ?Sized>(
    repo: &R,
    comment: &Comment,
) -> ServiceResult<CommentView> {
    Ok(CommentView {
        id: comment.id,
        posted_by: author(repo, comment.posted_by).await?,
        content: comment.content.clone(),
        posted_on: comment.posted_on,
        edited: comment.edited,
        last_edited_on: comment.last_edited_on,
    })
}

pub async fn news<R: FullRepository + ?Sized>(repo: &R, news: &News) -> ServiceResult<NewsView> {
    let mut comments = Vec::new();
    for entry in repo.list_comments(news.id).await? {
        comments.push(comment(repo, &entry).await?);
    }
    Ok(NewsView {
        id: news.id,
        title: news.title.clone(),
        content: news.content.clone(),
        class_number: news.class_number,
        class_letter: news.class_letter,
        posted_on: news.posted_on,
        author: author(repo, news.author_id).await?,
        comments,
        edited: news.edited,
        last_edited_on: news.last_edited_on,
    })
}

pub async fn talk<R: FullRepository + ?Sized>(repo: &R, talk: &Talk) -> ServiceResult<TalkView> {
    Ok(TalkView {
        id: talk.id,
        meetup_id: talk.meetup_id,
        author: author(repo, talk.author_id).await?,
        topic: talk.topic.clone(),
        description: talk.description.clone(),
        video_url: talk.video_url.clone(),
        votes_count: talk.votes_count,
    })
}

pub async fn meetup<R: FullRepository + ?Sized>(
    repo: &R,
    meetup: &Meetup,
) -> ServiceResult<MeetupView> {
    let mut talks = Vec::new();
    for entry in repo.list_talks(meetup.id).await? {
        talks.push(talk(repo, &entry).await?);
    }
    Ok(MeetupView {
        id: meetup.id,
        date: meetup.date,
        description: meetup.description.clone(),
        talks,
    })
}

/// Render a whole list with `render`, preserving order.
macro_rules! render_all {
    ($repo:expr, $items:expr, $render:path) => {{
        let mut views = Vec::new();
        for item in $items.iter() {
            views.push($render($repo, item).await?);
        }
        views
    }};
}

pub(crate) use render_all;
