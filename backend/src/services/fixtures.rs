//! Shared fixtures for service tests.

use crate::db::repositories::LocalRepository;
use crate::db::repository::{AccountRepository, SchoolRepository};
use crate::models::{ClassLetter, NewStudent, NewTeacher, NewUser, SubjectId, User};

use super::accounts::principal_for;
use super::permissions::Principal;

pub struct Fixture {
    pub repo: LocalRepository,
    pub subject_id: SubjectId,
    /// Teaches Mathematics.
    pub teacher: Principal,
    /// Teaches Physics.
    pub other_teacher: Principal,
    /// 10A
    pub student: Principal,
    /// 10A
    pub classmate: Principal,
    /// 11B
    pub outsider: Principal,
    /// Staff account without a school role.
    pub admin: Principal,
}

async fn user(repo: &LocalRepository, name: &str, is_staff: bool) -> User {
    repo.create_user(NewUser {
        username: name.into(),
        email: format!("{}@example.com", name),
        first_name: name.into(),
        last_name: String::new(),
        password_hash: String::new(),
        is_active: true,
        is_staff,
    })
    .await
    .unwrap()
}

async fn teacher(repo: &LocalRepository, name: &str, subject_id: SubjectId) -> Principal {
    let u = user(repo, name, false).await;
    repo.create_teacher(NewTeacher {
        user_id: u.id,
        subject_id,
        profile_image_url: String::new(),
        info: String::new(),
    })
    .await
    .unwrap();
    principal_for(repo, u).await.unwrap()
}

async fn student(repo: &LocalRepository, name: &str, number: i32, letter: ClassLetter) -> Principal {
    let class = repo.find_class(number, letter).await.unwrap().unwrap();
    let u = user(repo, name, false).await;
    repo.create_student(NewStudent {
        user_id: u.id,
        class_id: class.id,
        profile_image_url: String::new(),
        info: String::new(),
        activation_key: None,
    })
    .await
    .unwrap();
    principal_for(repo, u).await.unwrap()
}

pub async fn fixture() -> Fixture {
    let repo = LocalRepository::new();
    repo.create_class(10, ClassLetter::A).await.unwrap();
    repo.create_class(11, ClassLetter::B).await.unwrap();
    let math = repo.create_subject("Mathematics").await.unwrap();
    let physics = repo.create_subject("Physics").await.unwrap();

    let teacher_principal = teacher(&repo, "teacher", math.id).await;
    let other_teacher = teacher(&repo, "other_teacher", physics.id).await;
    let student_principal = student(&repo, "student", 10, ClassLetter::A).await;
    let classmate = student(&repo, "classmate", 10, ClassLetter::A).await;
    let outsider = student(&repo, "outsider", 11, ClassLetter::B).await;
    let admin_user = user(&repo, "admin", true).await;
    let admin = principal_for(&repo, admin_user).await.unwrap();

    Fixture {
        repo,
        subject_id: math.id,
        teacher: teacher_principal,
        other_teacher,
        student: student_principal,
        classmate,
        outsider,
        admin,
    }
}
