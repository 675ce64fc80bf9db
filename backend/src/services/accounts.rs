//! Registration, activation, token authentication and password management.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::api::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse,
    PasswordResetConfirmRequest, PasswordResetRequest, RegisterRequest, UserInfo,
};
use crate::db::repository::FullRepository;
use crate::models::{NewStudent, NewUser, User, DEFAULT_PROFILE_IMAGE};

use super::error::{ServiceError, ServiceResult};
use super::permissions::{Principal, Role};
use super::school::resolve_class;
use super::validation::{validate, validate_with};

pub const DEFAULT_ACTIVATION_URL: &str =
    "http://elsyser.aerobatic.io/auth/activate/{activation_key}/";

pub const DEFAULT_PASSWORD_RESET_URL: &str =
    "http://elsyser.aerobatic.io/auth/password/reset/{reset_key}/";

/// How long a password reset key stays valid.
pub const PASSWORD_RESET_TTL_DAYS: i64 = 3;

const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";
const RESET_SENT: &str = "Password reset e-mail has been sent.";
const BAD_RESET_KEY: &str = "Invalid or expired password reset key.";

/// Fresh random key, 32 lowercase hex characters.
pub fn generate_key() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(hashing_failed)?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(hashing_failed)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn hashing_failed(err: argon2::password_hash::Error) -> ServiceError {
    ServiceError::Internal(format!("password hashing failed: {}", err))
}

pub fn activation_url(template: &str, key: &str) -> String {
    template.replace("{activation_key}", key)
}

pub fn password_reset_url(template: &str, key: &str) -> String {
    template.replace("{reset_key}", key)
}

/// Create an inactive student account and log its activation link.
pub async fn register<R: FullRepository + ?Sized>(
    repo: &R,
    activation_template: &str,
    request: RegisterRequest,
) -> ServiceResult<UserInfo> {
    validate_with(&request, |checks| {
        checks.class_ref("class", request.class.number, &request.class.letter);
    })?;

    if repo.find_user_by_username(&request.username).await?.is_some() {
        return Err(ServiceError::field(
            "username",
            "A user with that username already exists.",
        ));
    }
    let class = resolve_class(repo, "class", &request.class).await?;

    let user = repo
        .create_user(NewUser {
            username: request.username,
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            password_hash: hash_password(&request.password)?,
            is_active: false,
            is_staff: false,
        })
        .await?;

    let key = generate_key();
    repo.create_student(NewStudent {
        user_id: user.id,
        class_id: class.id,
        profile_image_url: DEFAULT_PROFILE_IMAGE.to_string(),
        info: String::new(),
        activation_key: Some(key.clone()),
    })
    .await?;

    log::info!(
        "Registered student '{}' in class {}, activation link: {}",
        user.username,
        class.label(),
        activation_url(activation_template, &key)
    );

    Ok(UserInfo::from(&user))
}

pub async fn activate<R: FullRepository + ?Sized>(
    repo: &R,
    key: &str,
) -> ServiceResult<MessageResponse> {
    let mut student = repo
        .find_student_by_activation_key(key)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Invalid activation key.".to_string()))?;

    let mut user = repo.get_user(student.user_id).await?;
    user.is_active = true;
    repo.update_user(&user).await?;

    student.activation_key = None;
    repo.update_student(&student).await?;

    log::info!("Activated account '{}'", user.username);
    Ok(MessageResponse::new("Account activated."))
}

pub async fn login<R: FullRepository + ?Sized>(
    repo: &R,
    request: LoginRequest,
) -> ServiceResult<LoginResponse> {
    validate(&request)?;

    let user = match repo.find_user_by_username(&request.username).await? {
        Some(user) if user.is_active && verify_password(&request.password, &user.password_hash) => {
            user
        }
        _ => return Err(ServiceError::non_field(BAD_CREDENTIALS)),
    };

    let token = repo.get_or_create_token(user.id, &generate_key()).await?;
    let is_teacher = repo.find_teacher_by_user(user.id).await?.is_some();

    log::debug!("User '{}' logged in", user.username);
    Ok(LoginResponse {
        user: UserInfo::from(&user),
        token: token.key,
        is_teacher,
    })
}

pub async fn logout<R: FullRepository + ?Sized>(
    repo: &R,
    principal: &Principal,
) -> ServiceResult<MessageResponse> {
    repo.delete_token(principal.user.id).await?;
    Ok(MessageResponse::new("Successfully logged out."))
}

pub async fn change_password<R: FullRepository + ?Sized>(
    repo: &R,
    principal: &Principal,
    request: ChangePasswordRequest,
) -> ServiceResult<MessageResponse> {
    validate(&request)?;

    let mut user = repo.get_user(principal.user.id).await?;
    if !verify_password(&request.current_password, &user.password_hash) {
        return Err(ServiceError::field(
            "current_password",
            "Current password is incorrect.",
        ));
    }

    user.password_hash = hash_password(&request.new_password)?;
    repo.update_user(&user).await?;
    Ok(MessageResponse::new("Password changed."))
}

/// Issue a reset key for every active account with this e-mail and log its link.
///
/// The reply is the same whether or not an account matched.
pub async fn request_password_reset<R: FullRepository + ?Sized>(
    repo: &R,
    reset_template: &str,
    request: PasswordResetRequest,
) -> ServiceResult<MessageResponse> {
    validate(&request)?;

    for user in repo.find_users_by_email(&request.email).await? {
        if !user.is_active {
            continue;
        }
        let reset = repo.replace_password_reset(user.id, &generate_key()).await?;
        log::info!(
            "Password reset requested for '{}', reset link: {}",
            user.username,
            password_reset_url(reset_template, &reset.key)
        );
    }
    Ok(MessageResponse::new(RESET_SENT))
}

/// Set a new password with a key from [`request_password_reset`].
///
/// The key is single-use. The user's API token is revoked, so existing
/// sessions have to log in again.
pub async fn confirm_password_reset<R: FullRepository + ?Sized>(
    repo: &R,
    request: PasswordResetConfirmRequest,
) -> ServiceResult<MessageResponse> {
    validate(&request)?;

    let reset = repo
        .find_password_reset(&request.key)
        .await?
        .ok_or_else(|| ServiceError::field("key", BAD_RESET_KEY))?;
    if reset.created + Duration::days(PASSWORD_RESET_TTL_DAYS) < Utc::now() {
        repo.delete_password_reset(reset.user_id).await?;
        return Err(ServiceError::field("key", BAD_RESET_KEY));
    }

    let mut user = repo.get_user(reset.user_id).await?;
    user.password_hash = hash_password(&request.new_password)?;
    repo.update_user(&user).await?;
    repo.delete_password_reset(user.id).await?;
    repo.delete_token(user.id).await?;

    log::info!("Password reset completed for '{}'", user.username);
    Ok(MessageResponse::new("Password has been reset with the new password."))
}

/// Resolve the school role of `user`. Teachers win over students.
pub async fn principal_for<R: FullRepository + ?Sized>(
    repo: &R,
    user: User,
) -> ServiceResult<Principal> {
    let role = if let Some(teacher) = repo.find_teacher_by_user(user.id).await? {
        Role::Teacher(teacher)
    } else if let Some(student) = repo.find_student_by_user(user.id).await? {
        Role::Student(student)
    } else {
        Role::Member
    };
    Ok(Principal { user, role })
}

/// Authenticate an `Authorization` header value.
///
/// No header or a non `Token` scheme means an anonymous caller.
pub async fn authenticate<R: FullRepository + ?Sized>(
    repo: &R,
    header: Option<&str>,
) -> ServiceResult<Option<Principal>> {
    let Some(header) = header else {
        return Ok(None);
    };

    let mut parts = header.split_whitespace();
    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case("token") => {}
        _ => return Ok(None),
    }
    let key = match (parts.next(), parts.next()) {
        (Some(key), None) => key,
        (None, _) => {
            return Err(ServiceError::Unauthenticated(
                "Invalid token header. No credentials provided.".to_string(),
            ))
        }
        (Some(_), Some(_)) => {
            return Err(ServiceError::Unauthenticated(
                "Invalid token header. Token string should not contain spaces.".to_string(),
            ))
        }
    };

    let token = repo
        .find_token(key)
        .await?
        .ok_or_else(ServiceError::invalid_token)?;
    let user = repo.get_user(token.user_id).await?;
    if !user.is_active {
        return Err(ServiceError::Unauthenticated(
            "User inactive or deleted.".to_string(),
        ));
    }

    principal_for(repo, user).await.map(Some)
}
