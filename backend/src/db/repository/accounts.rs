//! Account repository trait: users, API tokens and role profiles.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    AuthToken, ClassId, NewStudent, NewTeacher, NewUser, PasswordReset, Student, StudentId,
    Teacher, TeacherId, User, UserId,
};

/// Repository trait for accounts.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Check if the storage backend is reachable.
    ///
    /// # Returns
    /// * `Ok(true)` if connection is healthy
    /// * `Err(RepositoryError)` if the check itself fails
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Users ====================

    /// Insert a new user.
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user with its assigned id
    /// * `Err(RepositoryError::Conflict)` - If the username is taken
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User>;

    /// Fetch a user by id; `NotFound` if it does not exist.
    async fn get_user(&self, id: UserId) -> RepositoryResult<User>;

    async fn find_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;

    /// Users whose e-mail matches `email`, ignoring case, ordered by id.
    async fn find_users_by_email(&self, email: &str) -> RepositoryResult<Vec<User>>;

    /// Persist all mutable fields of `user`.
    async fn update_user(&self, user: &User) -> RepositoryResult<User>;

    // ==================== Tokens ====================

    /// Return the user's token, creating one with `new_key` if none exists.
    async fn get_or_create_token(&self, user_id: UserId, new_key: &str)
        -> RepositoryResult<AuthToken>;

    async fn find_token(&self, key: &str) -> RepositoryResult<Option<AuthToken>>;

    /// Remove the user's token.
    ///
    /// # Returns
    /// * `Ok(true)` if a token was deleted
    async fn delete_token(&self, user_id: UserId) -> RepositoryResult<bool>;

    // ==================== Password resets ====================

    /// Store a reset key for the user, replacing any earlier one.
    async fn replace_password_reset(&self, user_id: UserId, key: &str)
        -> RepositoryResult<PasswordReset>;

    async fn find_password_reset(&self, key: &str) -> RepositoryResult<Option<PasswordReset>>;

    /// # Returns
    /// * `Ok(true)` if a pending reset was deleted
    async fn delete_password_reset(&self, user_id: UserId) -> RepositoryResult<bool>;

    // ==================== Students ====================

    async fn create_student(&self, student: NewStudent) -> RepositoryResult<Student>;

    async fn get_student(&self, id: StudentId) -> RepositoryResult<Student>;

    async fn find_student_by_user(&self, user_id: UserId) -> RepositoryResult<Option<Student>>;

    async fn find_student_by_activation_key(&self, key: &str)
        -> RepositoryResult<Option<Student>>;

    async fn update_student(&self, student: &Student) -> RepositoryResult<Student>;

    /// Students of a class ordered by id.
    async fn list_students_in_class(&self, class_id: ClassId) -> RepositoryResult<Vec<Student>>;

    // ==================== Teachers ====================

    async fn create_teacher(&self, teacher: NewTeacher) -> RepositoryResult<Teacher>;

    async fn get_teacher(&self, id: TeacherId) -> RepositoryResult<Teacher>;

    async fn find_teacher_by_user(&self, user_id: UserId) -> RepositoryResult<Option<Teacher>>;

    async fn update_teacher(&self, teacher: &Teacher) -> RepositoryResult<Teacher>;
}
