//! Startup data: the fixed class list plus an optional TOML seed file.
//!
//! ```toml
//! subjects = ["Mathematics", "Physics"]
//!
//! [[teachers]]
//! username = "ivanova"
//! password = "change-me"
//! first_name = "Maria"
//! last_name = "Ivanova"
//! subject = "Mathematics"
//!
//! [[admins]]
//! username = "principal"
//! password = "change-me"
//! ```
//!
//! Seeding is idempotent: classes, subjects and users that already exist are
//! left untouched.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::db::repository::FullRepository;
use crate::models::{
    ClassLetter, NewTeacher, NewUser, UserId, CLASS_NUMBERS, DEFAULT_PROFILE_IMAGE,
};

use super::accounts::hash_password;
use super::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub subjects: Vec<String>,
    pub teachers: Vec<SeedTeacher>,
    pub admins: Vec<SeedUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedTeacher {
    #[serde(flatten)]
    pub user: SeedUser,
    /// Subject title; created when missing.
    pub subject: String,
    #[serde(default)]
    pub info: String,
}

/// What a seeding run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub classes: usize,
    pub subjects: usize,
    pub users: usize,
}

impl SeedFile {
    pub fn parse(content: &str) -> ServiceResult<Self> {
        toml::from_str(content)
            .map_err(|e| ServiceError::Internal(format!("Failed to parse seed file: {}", e)))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ServiceResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ServiceError::Internal(format!("Failed to read seed file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }
}

/// Create every class 8A..12G that does not exist yet.
pub async fn seed_classes<R: FullRepository + ?Sized>(repo: &R) -> ServiceResult<usize> {
    let mut created = 0;
    for number in CLASS_NUMBERS {
        for letter in ClassLetter::ALL {
            if repo.find_class(number, letter).await?.is_none() {
                repo.create_class(number, letter).await?;
                created += 1;
            }
        }
    }
    if created > 0 {
        log::info!("Seeded {} classes", created);
    }
    Ok(created)
}

/// Seed classes, then apply `seed` when given.
pub async fn seed<R: FullRepository + ?Sized>(
    repo: &R,
    seed: Option<&SeedFile>,
) -> ServiceResult<SeedReport> {
    let mut report = SeedReport {
        classes: seed_classes(repo).await?,
        ..SeedReport::default()
    };
    let Some(seed) = seed else {
        return Ok(report);
    };

    for title in &seed.subjects {
        if ensure_subject(repo, title).await? {
            report.subjects += 1;
        }
    }

    for teacher in &seed.teachers {
        if ensure_subject(repo, &teacher.subject).await? {
            report.subjects += 1;
        }
        let Some(user) = create_user(repo, &teacher.user, false).await? else {
            continue;
        };
        let subject = repo
            .find_subject_by_title(&teacher.subject)
            .await?
            .ok_or_else(ServiceError::not_found)?;
        repo.create_teacher(NewTeacher {
            user_id: user,
            subject_id: subject.id,
            profile_image_url: DEFAULT_PROFILE_IMAGE.to_string(),
            info: teacher.info.clone(),
        })
        .await?;
        report.users += 1;
    }

    for admin in &seed.admins {
        if create_user(repo, admin, true).await?.is_some() {
            report.users += 1;
        }
    }

    log::info!(
        "Seed applied: {} subjects, {} users",
        report.subjects,
        report.users
    );
    Ok(report)
}

async fn ensure_subject<R: FullRepository + ?Sized>(repo: &R, title: &str) -> ServiceResult<bool> {
    if repo.find_subject_by_title(title).await?.is_some() {
        return Ok(false);
    }
    repo.create_subject(title).await?;
    Ok(true)
}

/// Active user for `seed`, or `None` when the username is taken.
async fn create_user<R: FullRepository + ?Sized>(
    repo: &R,
    seed: &SeedUser,
    is_staff: bool,
) -> ServiceResult<Option<UserId>> {
    if repo.find_user_by_username(&seed.username).await?.is_some() {
        log::debug!("Seed user {} already exists", seed.username);
        return Ok(None);
    }
    let user = repo
        .create_user(NewUser {
            username: seed.username.clone(),
            email: seed.email.clone(),
            first_name: seed.first_name.clone(),
            last_name: seed.last_name.clone(),
            password_hash: hash_password(&seed.password)?,
            is_active: true,
            is_staff,
        })
        .await?;
    Ok(Some(user.id))
}
