//! Profiles, classes, subjects and class rosters.

use crate::api::{
    ClassRef, ClassView, ClassesByNumber, ProfileResponse, ProfileUpdateRequest, ProfileView,
    StudentProfileView, SubjectView, UserInfo,
};
use crate::db::repository::FullRepository;
use crate::models::{Class, ClassLetter, UserId, CLASS_NUMBERS};

use super::error::{LookupExt, ServiceError, ServiceResult};
use super::permissions::Principal;
use super::render;
use super::validation::{validate, Checks};

async fn profile_view<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
) -> ServiceResult<(ProfileView, bool)> {
    let user = repo.get_user(user_id).await.or_not_found()?;

    if let Some(teacher) = repo.find_teacher_by_user(user.id).await? {
        let view = render::teacher_profile(repo, &teacher).await?;
        return Ok((ProfileView::Teacher(view), true));
    }
    if let Some(student) = repo.find_student_by_user(user.id).await? {
        let view = render::student_profile(repo, &student).await?;
        return Ok((ProfileView::Student(view), false));
    }
    Ok((
        ProfileView::Member {
            user: UserInfo::from(&user),
        },
        false,
    ))
}

pub async fn get_profile<R: FullRepository + ?Sized>(
    repo: &R,
    principal: &Principal,
    user_id: UserId,
) -> ServiceResult<ProfileResponse> {
    let (profile, is_teacher) = profile_view(repo, user_id).await?;
    Ok(ProfileResponse {
        profile,
        is_teacher,
        can_edit: principal.user.id == user_id,
    })
}

/// Partial update of the caller's own profile.
pub async fn update_profile<R: FullRepository + ?Sized>(
    repo: &R,
    principal: &Principal,
    user_id: UserId,
    request: ProfileUpdateRequest,
) -> ServiceResult<ProfileResponse> {
    let mut user = repo.get_user(user_id).await.or_not_found()?;
    if user.id != principal.user.id {
        return Err(ServiceError::unauthorized(
            "You can only update your own profile.",
        ));
    }
    validate(&request)?;

    if let Some(first_name) = request.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = request.last_name {
        user.last_name = last_name;
    }
    if let Some(email) = request.email {
        user.email = email;
    }
    repo.update_user(&user).await?;

    if let Some(mut teacher) = repo.find_teacher_by_user(user.id).await? {
        if let Some(info) = request.info {
            teacher.info = info;
        }
        if let Some(url) = request.profile_image_url {
            teacher.profile_image_url = url;
        }
        repo.update_teacher(&teacher).await?;
    } else if let Some(mut student) = repo.find_student_by_user(user.id).await? {
        if let Some(info) = request.info {
            student.info = info;
        }
        if let Some(url) = request.profile_image_url {
            student.profile_image_url = url;
        }
        repo.update_student(&student).await?;
    }

    log::debug!("Profile of '{}' updated", user.username);
    get_profile(repo, principal, user_id).await
}

pub async fn list_subjects<R: FullRepository + ?Sized>(repo: &R) -> ServiceResult<Vec<SubjectView>> {
    let subjects = repo.list_subjects().await?;
    Ok(subjects.iter().map(SubjectView::from).collect())
}

pub async fn list_classes<R: FullRepository + ?Sized>(repo: &R) -> ServiceResult<ClassesByNumber> {
    let mut grouped = ClassesByNumber::new();
    for class in repo.list_classes(None).await? {
        grouped
            .entry(class.number)
            .or_default()
            .push(ClassView::from(&class));
    }
    Ok(grouped)
}

/// School years outside [`CLASS_NUMBERS`] have no route, so they are a 404.
pub(crate) fn ensure_class_number(number: i32) -> ServiceResult<()> {
    if CLASS_NUMBERS.contains(&number) {
        Ok(())
    } else {
        Err(ServiceError::not_found())
    }
}

pub async fn classes_with_number<R: FullRepository + ?Sized>(
    repo: &R,
    number: i32,
) -> ServiceResult<Vec<ClassView>> {
    ensure_class_number(number)?;
    let classes = repo.list_classes(Some(number)).await?;
    Ok(classes.iter().map(ClassView::from).collect())
}

/// Student profiles of one class; unknown classes are a 404.
pub async fn students_in_class<R: FullRepository + ?Sized>(
    repo: &R,
    number: i32,
    letter: &str,
) -> ServiceResult<Vec<StudentProfileView>> {
    let letter: ClassLetter = letter.parse().map_err(|_| ServiceError::not_found())?;
    let class = repo
        .find_class(number, letter)
        .await?
        .ok_or_else(ServiceError::not_found)?;

    let mut profiles = Vec::new();
    for student in repo.list_students_in_class(class.id).await? {
        profiles.push(render::student_profile(repo, &student).await?);
    }
    Ok(profiles)
}

/// Resolve a `{number, letter}` reference from a request body.
pub(crate) async fn resolve_class<R: FullRepository + ?Sized>(
    repo: &R,
    field: &str,
    class: &ClassRef,
) -> ServiceResult<Class> {
    let mut checks = Checks::new();
    let letter = checks.class_ref(field, class.number, &class.letter);
    checks.finish()?;

    match letter {
        Some(letter) => repo.find_class(class.number, letter).await?.ok_or_else(|| {
            ServiceError::field(
                field,
                format!("Class {}{} does not exist.", class.number, letter),
            )
        }),
        None => Err(ServiceError::field(field, "Invalid class.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::{AccountRepository, SchoolRepository};
    use crate::models::{NewStudent, NewUser};
    use crate::services::accounts::principal_for;

    async fn seeded() -> (LocalRepository, Principal, Principal) {
        let repo = LocalRepository::new();
        let class = repo.create_class(11, ClassLetter::B).await.unwrap();
        repo.create_class(11, ClassLetter::A).await.unwrap();
        repo.create_class(9, ClassLetter::A).await.unwrap();

        let mut principals = Vec::new();
        for name in ["ana", "boris"] {
            let user = repo
                .create_user(NewUser {
                    username: name.into(),
                    email: format!("{}@example.com", name),
                    first_name: name.into(),
                    last_name: String::new(),
                    password_hash: String::new(),
                    is_active: true,
                    is_staff: false,
                })
                .await
                .unwrap();
            repo.create_student(NewStudent {
                user_id: user.id,
                class_id: class.id,
                profile_image_url: String::new(),
                info: String::new(),
                activation_key: None,
            })
            .await
            .unwrap();
            principals.push(principal_for(&repo, user).await.unwrap());
        }
        let boris = principals.pop().unwrap();
        let ana = principals.pop().unwrap();
        (repo, ana, boris)
    }

    #[tokio::test]
    async fn test_profile_can_edit() {
        let (repo, ana, boris) = seeded().await;
        let own = get_profile(&repo, &ana, ana.user.id).await.unwrap();
        assert!(own.can_edit);
        assert!(!own.is_teacher);

        let other = get_profile(&repo, &ana, boris.user.id).await.unwrap();
        assert!(!other.can_edit);
    }

    #[tokio::test]
    async fn test_update_only_own_profile() {
        let (repo, ana, boris) = seeded().await;
        let request = ProfileUpdateRequest {
            info: Some("chess club".into()),
            ..Default::default()
        };

        let err = update_profile(&repo, &ana, boris.user.id, request.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
        assert_eq!(err.to_string(), "You can only update your own profile.");

        let updated = update_profile(&repo, &ana, ana.user.id, request).await.unwrap();
        let ProfileView::Student(profile) = updated.profile else {
            panic!("expected a student profile");
        };
        assert_eq!(profile.info, "chess club");
    }

    #[tokio::test]
    async fn test_classes_grouped_by_number() {
        let (repo, _, _) = seeded().await;
        let grouped = list_classes(&repo).await.unwrap();
        assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), vec![9, 11]);
        assert_eq!(grouped[&11].len(), 2);
        assert_eq!(grouped[&11][0].letter, ClassLetter::A);
    }

    #[tokio::test]
    async fn test_classes_with_number_outside_school_years() {
        let (repo, _, _) = seeded().await;
        assert_eq!(classes_with_number(&repo, 11).await.unwrap().len(), 2);
        assert!(classes_with_number(&repo, 10).await.unwrap().is_empty());
        for number in [0, 7, 13] {
            assert!(matches!(
                classes_with_number(&repo, number).await,
                Err(ServiceError::NotFound(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_students_in_class() {
        let (repo, _, _) = seeded().await;
        assert_eq!(students_in_class(&repo, 11, "B").await.unwrap().len(), 2);
        assert!(students_in_class(&repo, 11, "A").await.unwrap().is_empty());
        assert!(matches!(
            students_in_class(&repo, 12, "A").await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
