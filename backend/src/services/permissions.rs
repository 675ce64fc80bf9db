//! Caller identity and permission checks.
//!
//! Every resource declares which [`Permission`]s guard each [`Action`]; the
//! checks run in order and the first failure is reported. Object level
//! authorship is checked separately once the object has been loaded.

use crate::models::{Student, Teacher, User};

use super::error::{ServiceError, ServiceResult, NO_PERMISSION};

pub const ONLY_STUDENTS: &str = "Only students are allowed to view and modify this content.";
pub const ONLY_TEACHERS: &str = "Only teachers are allowed to view and modify this content.";
pub const AUTHOR_ONLY: &str = "You should be the author of this content in order to modify it.";

#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Student(Student),
    Teacher(Teacher),
    /// Account with no school profile.
    Member,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub user: User,
    pub role: Role,
}

impl Principal {
    pub fn is_student(&self) -> bool {
        matches!(self.role, Role::Student(_))
    }

    pub fn is_teacher(&self) -> bool {
        matches!(self.role, Role::Teacher(_))
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_staff
    }

    pub fn student(&self) -> ServiceResult<&Student> {
        match &self.role {
            Role::Student(student) => Ok(student),
            _ => Err(ServiceError::forbidden(ONLY_STUDENTS)),
        }
    }

    pub fn teacher(&self) -> ServiceResult<&Teacher> {
        match &self.role {
            Role::Teacher(teacher) => Ok(teacher),
            _ => Err(ServiceError::forbidden(ONLY_TEACHERS)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    IsAuthenticated,
    IsStudent,
    IsTeacher,
    IsAdmin,
}

impl Permission {
    pub fn check(self, principal: Option<&Principal>) -> ServiceResult<()> {
        let principal = principal.ok_or_else(ServiceError::not_authenticated)?;
        match self {
            Permission::IsAuthenticated => Ok(()),
            Permission::IsStudent => principal.student().map(|_| ()),
            Permission::IsTeacher => principal.teacher().map(|_| ()),
            Permission::IsAdmin if principal.is_admin() => Ok(()),
            Permission::IsAdmin => Err(ServiceError::forbidden(NO_PERMISSION)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Destroy,
    Upvote,
    Downvote,
}

/// Resources with their own per-action permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Profile,
    Grade,
    Exam,
    Homework,
    Submission,
    Material,
    StudentNews,
    TeacherNews,
    Comment,
    Meetup,
    Talk,
}

use Permission::*;

impl Resource {
    pub fn permissions(self, action: Action) -> &'static [Permission] {
        match (self, action) {
            (Resource::Exam | Resource::Homework | Resource::Material, Action::List | Action::Retrieve) => {
                &[IsAuthenticated]
            }
            (Resource::Exam | Resource::Homework | Resource::Material, _) => {
                &[IsAuthenticated, IsTeacher]
            }
            (Resource::Grade, Action::Create) => &[IsAuthenticated, IsTeacher],
            (Resource::Submission, Action::Create) => &[IsAuthenticated, IsStudent],
            (Resource::StudentNews, _) => &[IsAuthenticated, IsStudent],
            (Resource::TeacherNews, _) => &[IsAuthenticated, IsTeacher],
            (Resource::Meetup, Action::List | Action::Retrieve) => &[IsAuthenticated],
            (Resource::Meetup, _) => &[IsAuthenticated, IsAdmin],
            (Resource::Talk, Action::Destroy) => &[IsAuthenticated, IsAdmin],
            _ => &[IsAuthenticated],
        }
    }
}

/// Check the caller against the permissions `resource` requires for `action`.
pub fn authorize<'a>(
    principal: Option<&'a Principal>,
    resource: Resource,
    action: Action,
) -> ServiceResult<&'a Principal> {
    for permission in resource.permissions(action) {
        permission.check(principal)?;
    }
    principal.ok_or_else(ServiceError::not_authenticated)
}

/// Object level check for authored content.
pub fn ensure_author(is_author: bool) -> ServiceResult<()> {
    if is_author {
        Ok(())
    } else {
        Err(ServiceError::forbidden(AUTHOR_ONLY))
    }
}
