//! Postgres repository implementation using Diesel.
//!
//! Tables are created by the embedded migrations under `migrations/`. Cascading
//! deletes (homework submissions, news comments, meetup talks and votes) and
//! uniqueness rules (usernames, exam topics, one submission per student and
//! homework, news title/content pairs) are enforced by the schema itself.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tokio::task;

use crate::db::repository::{
    AccountRepository, CourseworkRepository, ErrorContext, ExamFilter, GradeFilter,
    HomeworkFilter, MeetupFilter, MeetupRepository, NewsFilter, NewsRepository, RepositoryError,
    RepositoryResult, SchoolRepository, SubmissionFilter,
};
use crate::models::{
    AuthToken, Class, ClassId, ClassLetter, Comment, CommentId, Exam, ExamId, Grade, Homework,
    HomeworkId, Material, MaterialId, Meetup, MeetupId, NewComment, NewExam, NewGrade,
    NewHomework, NewMaterial, NewMeetup, NewNews, NewStudent, NewSubmission, NewTalk, NewTeacher,
    NewUser, News, NewsId, PasswordReset, Student, StudentId, Subject, SubjectId, Submission, SubmissionId, Talk,
    TalkId, Teacher, TeacherId, User, UserId,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// Only the connection string is required; every pool setting falls back
    /// to [`PostgresConfig::default`] when unset or unparsable.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
///
/// Every query runs on a pooled connection inside `spawn_blocking` and is
/// retried with exponential backoff when the failure is transient.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Arguments
    /// * `config` - Database configuration
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// This method will retry the operation up to `max_retries` times if a
    /// retryable error occurs (connection errors, timeouts, serialization failures).
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    ///
    /// Returns current pool state and query statistics for monitoring.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    /// Check if the database connection is healthy.
    ///
    /// Performs a simple query to verify connectivity.
    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }

    /// Get detailed health information.
    ///
    /// Returns a tuple of (is_healthy, latency_ms, error_message).
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        match self.health_check().await {
            Ok(true) => (true, Some(start.elapsed().as_millis() as u64), None),
            Ok(false) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some("Health check returned false".to_string()),
            ),
            Err(e) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some(e.to_string()),
            ),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

/// Map unique violations to a client-facing message, keeping other errors as-is.
fn conflict_as(
    message: impl Into<String>,
) -> impl FnOnce(diesel::result::Error) -> RepositoryError {
    let message = message.into();
    move |err| match RepositoryError::from(err) {
        RepositoryError::Conflict { context, .. } => RepositoryError::Conflict { message, context },
        other => other,
    }
}

fn missing(entity: &str, id: impl ToString) -> RepositoryError {
    RepositoryError::not_found_entity(entity, id)
}

/// Escape `LIKE` wildcards so `raw` only matches itself.
fn like_literal(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn deleted(count: usize, entity: &str, id: i64) -> RepositoryResult<()> {
    if count == 0 {
        Err(missing(entity, id))
    } else {
        Ok(())
    }
}

fn collect_classes(rows: Vec<ClassRow>) -> RepositoryResult<Vec<Class>> {
    rows.into_iter().map(Class::try_from).collect()
}

fn talk_exists(conn: &mut PgConnection, id: i64) -> RepositoryResult<()> {
    let found = diesel::select(diesel::dsl::exists(talks::table.find(id)))
        .get_result::<bool>(conn)
        .map_err(map_diesel_error)?;
    if found {
        Ok(())
    } else {
        Err(missing("talk", id))
    }
}

fn load_talk(conn: &mut PgConnection, id: i64) -> RepositoryResult<Talk> {
    let row = talks::table
        .find(id)
        .select(TalkRow::as_select())
        .first(conn)
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| missing("talk", id))?;
    let votes = talk_votes::table
        .filter(talk_votes::talk_id.eq(id))
        .count()
        .get_result::<i64>(conn)
        .map_err(map_diesel_error)?;
    Ok(row.into_talk(votes))
}

fn vote_counts(conn: &mut PgConnection, talk_ids: Vec<i64>) -> RepositoryResult<HashMap<i64, i64>> {
    let rows: Vec<(i64, i64)> = talk_votes::table
        .filter(talk_votes::talk_id.eq_any(talk_ids))
        .group_by(talk_votes::talk_id)
        .select((talk_votes::talk_id, count_star()))
        .load(conn)
        .map_err(map_diesel_error)?;
    Ok(rows.into_iter().collect())
}

#[async_trait]
impl AccountRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let row = NewUserRow::from(user);
        self.with_conn(move |conn| {
            diesel::insert_into(users::table)
                .values(&row)
                .returning(UserRow::as_returning())
                .get_result(conn)
                .map(User::from)
                .map_err(conflict_as("A user with that username already exists."))
        })
        .await
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        self.with_conn(move |conn| {
            users::table
                .find(id.value())
                .select(UserRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(User::from)
                .ok_or_else(|| missing("user", id))
        })
        .await
    }

    async fn find_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let username = username.to_string();
        self.with_conn(move |conn| {
            users::table
                .filter(users::username.eq(&username))
                .select(UserRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(User::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_users_by_email(&self, email: &str) -> RepositoryResult<Vec<User>> {
        let pattern = like_literal(email);
        self.with_conn(move |conn| {
            users::table
                .filter(users::email.ilike(&pattern).escape('\\'))
                .order(users::id.asc())
                .select(UserRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(User::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update_user(&self, user: &User) -> RepositoryResult<User> {
        let user = user.clone();
        self.with_conn(move |conn| {
            diesel::update(users::table.find(user.id.value()))
                .set((
                    users::username.eq(&user.username),
                    users::email.eq(&user.email),
                    users::first_name.eq(&user.first_name),
                    users::last_name.eq(&user.last_name),
                    users::password_hash.eq(&user.password_hash),
                    users::is_active.eq(user.is_active),
                    users::is_staff.eq(user.is_staff),
                ))
                .returning(UserRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(conflict_as("A user with that username already exists."))?
                .map(User::from)
                .ok_or_else(|| missing("user", user.id))
        })
        .await
    }

    async fn get_or_create_token(
        &self,
        user_id: UserId,
        new_key: &str,
    ) -> RepositoryResult<AuthToken> {
        let key = new_key.to_string();
        self.with_conn(move |conn| {
            conn.transaction::<_, diesel::result::Error, _>(|tx| {
                diesel::insert_into(auth_tokens::table)
                    .values((
                        auth_tokens::key.eq(&key),
                        auth_tokens::user_id.eq(user_id.value()),
                    ))
                    .on_conflict(auth_tokens::user_id)
                    .do_nothing()
                    .execute(tx)?;
                auth_tokens::table
                    .filter(auth_tokens::user_id.eq(user_id.value()))
                    .select(AuthTokenRow::as_select())
                    .first(tx)
            })
            .map(AuthToken::from)
            .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_token(&self, key: &str) -> RepositoryResult<Option<AuthToken>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            auth_tokens::table
                .find(&key)
                .select(AuthTokenRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(AuthToken::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn delete_token(&self, user_id: UserId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(auth_tokens::table.filter(auth_tokens::user_id.eq(user_id.value())))
                .execute(conn)
                .map(|count| count > 0)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn replace_password_reset(
        &self,
        user_id: UserId,
        key: &str,
    ) -> RepositoryResult<PasswordReset> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            diesel::insert_into(password_resets::table)
                .values((
                    password_resets::key.eq(&key),
                    password_resets::user_id.eq(user_id.value()),
                ))
                .on_conflict(password_resets::user_id)
                .do_update()
                .set((
                    password_resets::key.eq(&key),
                    password_resets::created.eq(chrono::Utc::now()),
                ))
                .returning(PasswordResetRow::as_returning())
                .get_result(conn)
                .map(PasswordReset::from)
                .map_err(|e| match map_diesel_error(e) {
                    RepositoryError::ValidationError { .. } => missing("user", user_id),
                    other => other,
                })
        })
        .await
    }

    async fn find_password_reset(&self, key: &str) -> RepositoryResult<Option<PasswordReset>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            password_resets::table
                .find(&key)
                .select(PasswordResetRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(PasswordReset::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn delete_password_reset(&self, user_id: UserId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(
                password_resets::table.filter(password_resets::user_id.eq(user_id.value())),
            )
            .execute(conn)
            .map(|count| count > 0)
            .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_student(&self, student: NewStudent) -> RepositoryResult<Student> {
        let row = NewStudentRow::from(student);
        self.with_conn(move |conn| {
            diesel::insert_into(students::table)
                .values(&row)
                .returning(StudentRow::as_returning())
                .get_result(conn)
                .map(Student::from)
                .map_err(conflict_as("User already has a student profile"))
        })
        .await
    }

    async fn get_student(&self, id: StudentId) -> RepositoryResult<Student> {
        self.with_conn(move |conn| {
            students::table
                .find(id.value())
                .select(StudentRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Student::from)
                .ok_or_else(|| missing("student", id))
        })
        .await
    }

    async fn find_student_by_user(&self, user_id: UserId) -> RepositoryResult<Option<Student>> {
        self.with_conn(move |conn| {
            students::table
                .filter(students::user_id.eq(user_id.value()))
                .select(StudentRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(Student::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_student_by_activation_key(
        &self,
        key: &str,
    ) -> RepositoryResult<Option<Student>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            students::table
                .filter(students::activation_key.eq(&key))
                .select(StudentRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(Student::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update_student(&self, student: &Student) -> RepositoryResult<Student> {
        let student = student.clone();
        self.with_conn(move |conn| {
            diesel::update(students::table.find(student.id.value()))
                .set((
                    students::class_id.eq(student.class_id.value()),
                    students::profile_image_url.eq(&student.profile_image_url),
                    students::info.eq(&student.info),
                    students::activation_key.eq(&student.activation_key),
                ))
                .returning(StudentRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Student::from)
                .ok_or_else(|| missing("student", student.id))
        })
        .await
    }

    async fn list_students_in_class(&self, class_id: ClassId) -> RepositoryResult<Vec<Student>> {
        self.with_conn(move |conn| {
            students::table
                .filter(students::class_id.eq(class_id.value()))
                .order(students::id.asc())
                .select(StudentRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(Student::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_teacher(&self, teacher: NewTeacher) -> RepositoryResult<Teacher> {
        let row = NewTeacherRow::from(teacher);
        self.with_conn(move |conn| {
            diesel::insert_into(teachers::table)
                .values(&row)
                .returning(TeacherRow::as_returning())
                .get_result(conn)
                .map(Teacher::from)
                .map_err(conflict_as("User already has a teacher profile"))
        })
        .await
    }

    async fn get_teacher(&self, id: TeacherId) -> RepositoryResult<Teacher> {
        self.with_conn(move |conn| {
            teachers::table
                .find(id.value())
                .select(TeacherRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Teacher::from)
                .ok_or_else(|| missing("teacher", id))
        })
        .await
    }

    async fn find_teacher_by_user(&self, user_id: UserId) -> RepositoryResult<Option<Teacher>> {
        self.with_conn(move |conn| {
            teachers::table
                .filter(teachers::user_id.eq(user_id.value()))
                .select(TeacherRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(Teacher::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update_teacher(&self, teacher: &Teacher) -> RepositoryResult<Teacher> {
        let teacher = teacher.clone();
        self.with_conn(move |conn| {
            diesel::update(teachers::table.find(teacher.id.value()))
                .set((
                    teachers::subject_id.eq(teacher.subject_id.value()),
                    teachers::profile_image_url.eq(&teacher.profile_image_url),
                    teachers::info.eq(&teacher.info),
                ))
                .returning(TeacherRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Teacher::from)
                .ok_or_else(|| missing("teacher", teacher.id))
        })
        .await
    }
}

#[async_trait]
impl SchoolRepository for PostgresRepository {
    async fn create_class(&self, number: i32, letter: ClassLetter) -> RepositoryResult<Class> {
        self.with_conn(move |conn| {
            let row = diesel::insert_into(classes::table)
                .values((classes::number.eq(number), classes::letter.eq(letter.as_str())))
                .returning(ClassRow::as_returning())
                .get_result(conn)
                .map_err(conflict_as(format!("Class {}{} already exists.", number, letter)))?;
            Class::try_from(row)
        })
        .await
    }

    async fn get_class(&self, id: ClassId) -> RepositoryResult<Class> {
        self.with_conn(move |conn| {
            let row = classes::table
                .find(id.value())
                .select(ClassRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| missing("class", id))?;
            Class::try_from(row)
        })
        .await
    }

    async fn find_class(
        &self,
        number: i32,
        letter: ClassLetter,
    ) -> RepositoryResult<Option<Class>> {
        self.with_conn(move |conn| {
            classes::table
                .filter(classes::number.eq(number))
                .filter(classes::letter.eq(letter.as_str()))
                .select(ClassRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Class::try_from)
                .transpose()
        })
        .await
    }

    async fn list_classes(&self, number: Option<i32>) -> RepositoryResult<Vec<Class>> {
        self.with_conn(move |conn| {
            let mut query = classes::table.select(ClassRow::as_select()).into_boxed();
            if let Some(number) = number {
                query = query.filter(classes::number.eq(number));
            }
            let rows = query
                .order((classes::number.asc(), classes::letter.asc()))
                .load(conn)
                .map_err(map_diesel_error)?;
            collect_classes(rows)
        })
        .await
    }

    async fn create_subject(&self, title: &str) -> RepositoryResult<Subject> {
        let title = title.to_string();
        self.with_conn(move |conn| {
            diesel::insert_into(subjects::table)
                .values(subjects::title.eq(&title))
                .returning(SubjectRow::as_returning())
                .get_result(conn)
                .map(Subject::from)
                .map_err(conflict_as(format!("Subject {} already exists.", title)))
        })
        .await
    }

    async fn get_subject(&self, id: SubjectId) -> RepositoryResult<Subject> {
        self.with_conn(move |conn| {
            subjects::table
                .find(id.value())
                .select(SubjectRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Subject::from)
                .ok_or_else(|| missing("subject", id))
        })
        .await
    }

    async fn find_subject_by_title(&self, title: &str) -> RepositoryResult<Option<Subject>> {
        let title = title.to_string();
        self.with_conn(move |conn| {
            subjects::table
                .filter(subjects::title.eq(&title))
                .select(SubjectRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(Subject::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>> {
        self.with_conn(|conn| {
            subjects::table
                .order(subjects::title.asc())
                .select(SubjectRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(Subject::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_grade(&self, grade: NewGrade) -> RepositoryResult<Grade> {
        let row = NewGradeRow::from(grade);
        self.with_conn(move |conn| {
            diesel::insert_into(grades::table)
                .values(&row)
                .returning(GradeRow::as_returning())
                .get_result(conn)
                .map(Grade::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_grades(&self, filter: GradeFilter) -> RepositoryResult<Vec<Grade>> {
        self.with_conn(move |conn| {
            let mut query = grades::table.select(GradeRow::as_select()).into_boxed();
            if let Some(subject_id) = filter.subject_id {
                query = query.filter(grades::subject_id.eq(subject_id.value()));
            }
            if let Some(student_id) = filter.student_id {
                query = query.filter(grades::student_id.eq(student_id.value()));
            }
            query
                .order((grades::posted_on.desc(), grades::id.desc()))
                .load(conn)
                .map(|rows| rows.into_iter().map(Grade::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }
}

const EXAM_TOPIC_TAKEN: &str = "exam with this topic already exists.";

#[async_trait]
impl CourseworkRepository for PostgresRepository {
    async fn create_exam(&self, exam: NewExam) -> RepositoryResult<Exam> {
        let row = NewExamRow::from(exam);
        self.with_conn(move |conn| {
            diesel::insert_into(exams::table)
                .values(&row)
                .returning(ExamRow::as_returning())
                .get_result(conn)
                .map(Exam::from)
                .map_err(conflict_as(EXAM_TOPIC_TAKEN))
        })
        .await
    }

    async fn get_exam(&self, id: ExamId) -> RepositoryResult<Exam> {
        self.with_conn(move |conn| {
            exams::table
                .find(id.value())
                .select(ExamRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Exam::from)
                .ok_or_else(|| missing("exam", id))
        })
        .await
    }

    async fn update_exam(&self, exam: &Exam) -> RepositoryResult<Exam> {
        let exam = exam.clone();
        self.with_conn(move |conn| {
            diesel::update(exams::table.find(exam.id.value()))
                .set((
                    exams::subject_id.eq(exam.subject_id.value()),
                    exams::class_id.eq(exam.class_id.value()),
                    exams::date.eq(exam.date),
                    exams::topic.eq(&exam.topic),
                    exams::details.eq(&exam.details),
                ))
                .returning(ExamRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(conflict_as(EXAM_TOPIC_TAKEN))?
                .map(Exam::from)
                .ok_or_else(|| missing("exam", exam.id))
        })
        .await
    }

    async fn delete_exam(&self, id: ExamId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let count = diesel::delete(exams::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            deleted(count, "exam", id.value())
        })
        .await
    }

    async fn list_exams(&self, filter: ExamFilter) -> RepositoryResult<Vec<Exam>> {
        self.with_conn(move |conn| {
            let mut query = exams::table
                .inner_join(subjects::table)
                .inner_join(classes::table)
                .select(ExamRow::as_select())
                .into_boxed();
            if let Some(class_id) = filter.class_id {
                query = query.filter(exams::class_id.eq(class_id.value()));
            }
            if let Some(author_id) = filter.author_id {
                query = query.filter(exams::author_id.eq(author_id.value()));
            }
            if let Some(from) = filter.from_date {
                query = query.filter(exams::date.ge(from));
            }
            query
                .order((
                    exams::date.asc(),
                    subjects::title.asc(),
                    classes::number.asc(),
                    classes::letter.asc(),
                    exams::id.asc(),
                ))
                .load(conn)
                .map(|rows| rows.into_iter().map(Exam::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_homework(&self, homework: NewHomework) -> RepositoryResult<Homework> {
        let row = NewHomeworkRow::from(homework);
        self.with_conn(move |conn| {
            diesel::insert_into(homeworks::table)
                .values(&row)
                .returning(HomeworkRow::as_returning())
                .get_result(conn)
                .map(Homework::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_homework(&self, id: HomeworkId) -> RepositoryResult<Homework> {
        self.with_conn(move |conn| {
            homeworks::table
                .find(id.value())
                .select(HomeworkRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Homework::from)
                .ok_or_else(|| missing("homework", id))
        })
        .await
    }

    async fn update_homework(&self, homework: &Homework) -> RepositoryResult<Homework> {
        let homework = homework.clone();
        self.with_conn(move |conn| {
            diesel::update(homeworks::table.find(homework.id.value()))
                .set((
                    homeworks::subject_id.eq(homework.subject_id.value()),
                    homeworks::class_id.eq(homework.class_id.value()),
                    homeworks::deadline.eq(homework.deadline),
                    homeworks::details.eq(&homework.details),
                    homeworks::materials_url.eq(&homework.materials_url),
                ))
                .returning(HomeworkRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Homework::from)
                .ok_or_else(|| missing("homework", homework.id))
        })
        .await
    }

    async fn delete_homework(&self, id: HomeworkId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let count = diesel::delete(homeworks::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            deleted(count, "homework", id.value())
        })
        .await
    }

    async fn list_homeworks(&self, filter: HomeworkFilter) -> RepositoryResult<Vec<Homework>> {
        self.with_conn(move |conn| {
            let mut query = homeworks::table
                .inner_join(classes::table)
                .inner_join(subjects::table)
                .select(HomeworkRow::as_select())
                .into_boxed();
            if let Some(class_id) = filter.class_id {
                query = query.filter(homeworks::class_id.eq(class_id.value()));
            }
            if let Some(author_id) = filter.author_id {
                query = query.filter(homeworks::author_id.eq(author_id.value()));
            }
            if let Some(from) = filter.from_deadline {
                query = query.filter(homeworks::deadline.ge(from));
            }
            query
                .order((
                    homeworks::deadline.desc(),
                    classes::number.asc(),
                    classes::letter.asc(),
                    subjects::title.asc(),
                    homeworks::id.asc(),
                ))
                .load(conn)
                .map(|rows| rows.into_iter().map(Homework::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_submission(&self, submission: NewSubmission) -> RepositoryResult<Submission> {
        let row = NewSubmissionRow::from(submission);
        self.with_conn(move |conn| {
            diesel::insert_into(submissions::table)
                .values(&row)
                .returning(SubmissionRow::as_returning())
                .get_result(conn)
                .map(Submission::from)
                .map_err(conflict_as("Student already submitted for this homework"))
        })
        .await
    }

    async fn get_submission(&self, id: SubmissionId) -> RepositoryResult<Submission> {
        self.with_conn(move |conn| {
            submissions::table
                .find(id.value())
                .select(SubmissionRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Submission::from)
                .ok_or_else(|| missing("submission", id))
        })
        .await
    }

    async fn update_submission(&self, submission: &Submission) -> RepositoryResult<Submission> {
        let submission = submission.clone();
        self.with_conn(move |conn| {
            diesel::update(submissions::table.find(submission.id.value()))
                .set((
                    submissions::content.eq(&submission.content),
                    submissions::solution_url.eq(&submission.solution_url),
                    submissions::checked.eq(submission.checked),
                    submissions::edited.eq(submission.edited),
                    submissions::last_edited_on.eq(submission.last_edited_on),
                ))
                .returning(SubmissionRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Submission::from)
                .ok_or_else(|| missing("submission", submission.id))
        })
        .await
    }

    async fn list_submissions(
        &self,
        filter: SubmissionFilter,
    ) -> RepositoryResult<Vec<Submission>> {
        self.with_conn(move |conn| {
            let mut query = submissions::table
                .filter(submissions::homework_id.eq(filter.homework_id.value()))
                .select(SubmissionRow::as_select())
                .into_boxed();
            if let Some(student_id) = filter.student_id {
                query = query.filter(submissions::student_id.eq(student_id.value()));
            }
            if let Some(checked) = filter.checked {
                query = query.filter(submissions::checked.eq(checked));
            }
            query
                .order((submissions::posted_on.desc(), submissions::id.desc()))
                .load(conn)
                .map(|rows| rows.into_iter().map(Submission::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_material(&self, material: NewMaterial) -> RepositoryResult<Material> {
        let row = NewMaterialRow::from(material);
        self.with_conn(move |conn| {
            diesel::insert_into(materials::table)
                .values(&row)
                .returning(MaterialRow::as_returning())
                .get_result(conn)
                .map(Material::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_material(&self, id: MaterialId) -> RepositoryResult<Material> {
        self.with_conn(move |conn| {
            materials::table
                .find(id.value())
                .select(MaterialRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Material::from)
                .ok_or_else(|| missing("material", id))
        })
        .await
    }

    async fn update_material(&self, material: &Material) -> RepositoryResult<Material> {
        let material = material.clone();
        self.with_conn(move |conn| {
            diesel::update(materials::table.find(material.id.value()))
                .set((
                    materials::title.eq(&material.title),
                    materials::section.eq(&material.section),
                    materials::content.eq(&material.content),
                    materials::class_number.eq(material.class_number),
                    materials::subject_id.eq(material.subject_id.value()),
                    materials::video_url.eq(&material.video_url),
                ))
                .returning(MaterialRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Material::from)
                .ok_or_else(|| missing("material", material.id))
        })
        .await
    }

    async fn delete_material(&self, id: MaterialId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let count = diesel::delete(materials::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            deleted(count, "material", id.value())
        })
        .await
    }

    async fn list_materials(
        &self,
        subject_id: Option<SubjectId>,
    ) -> RepositoryResult<Vec<Material>> {
        self.with_conn(move |conn| {
            let mut query = materials::table.select(MaterialRow::as_select()).into_boxed();
            if let Some(subject_id) = subject_id {
                query = query.filter(materials::subject_id.eq(subject_id.value()));
            }
            query
                .order((materials::class_number.asc(), materials::id.asc()))
                .load(conn)
                .map(|rows| rows.into_iter().map(Material::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }
}

const NEWS_TAKEN: &str = "News with this title and content already exists.";

#[async_trait]
impl NewsRepository for PostgresRepository {
    async fn create_news(&self, entry: NewNews) -> RepositoryResult<News> {
        let row = NewNewsRow::from(entry);
        self.with_conn(move |conn| {
            let row = diesel::insert_into(news::table)
                .values(&row)
                .returning(NewsRow::as_returning())
                .get_result(conn)
                .map_err(conflict_as(NEWS_TAKEN))?;
            News::try_from(row)
        })
        .await
    }

    async fn get_news(&self, id: NewsId) -> RepositoryResult<News> {
        self.with_conn(move |conn| {
            let row = news::table
                .find(id.value())
                .select(NewsRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| missing("news", id))?;
            News::try_from(row)
        })
        .await
    }

    async fn update_news(&self, entry: &News) -> RepositoryResult<News> {
        let entry = entry.clone();
        self.with_conn(move |conn| {
            let row = diesel::update(news::table.find(entry.id.value()))
                .set((
                    news::title.eq(&entry.title),
                    news::content.eq(&entry.content),
                    news::class_number.eq(entry.class_number),
                    news::class_letter.eq(entry.class_letter.map(|l| l.as_str())),
                    news::edited.eq(entry.edited),
                    news::last_edited_on.eq(entry.last_edited_on),
                ))
                .returning(NewsRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(conflict_as(NEWS_TAKEN))?
                .ok_or_else(|| missing("news", entry.id))?;
            News::try_from(row)
        })
        .await
    }

    async fn delete_news(&self, id: NewsId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let count = diesel::delete(news::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            deleted(count, "news", id.value())
        })
        .await
    }

    async fn list_news(&self, filter: NewsFilter) -> RepositoryResult<Vec<News>> {
        self.with_conn(move |conn| {
            let mut query = news::table.select(NewsRow::as_select()).into_boxed();
            if let Some(author_id) = filter.author_id {
                query = query.filter(news::author_id.eq(author_id.value()));
            }
            if let Some(number) = filter.class_number {
                query = query.filter(news::class_number.eq(number));
                if let Some(letter) = filter.class_letter {
                    query = query.filter(news::class_letter.eq(letter.as_str()));
                }
            }
            query
                .order((news::posted_on.desc(), news::id.desc()))
                .load(conn)
                .map_err(map_diesel_error)?
                .into_iter()
                .map(News::try_from)
                .collect()
        })
        .await
    }

    async fn create_comment(&self, comment: NewComment) -> RepositoryResult<Comment> {
        let row = NewCommentRow::from(comment);
        self.with_conn(move |conn| {
            let news_exists = diesel::select(diesel::dsl::exists(news::table.find(row.news_id)))
                .get_result::<bool>(conn)
                .map_err(map_diesel_error)?;
            if !news_exists {
                return Err(missing("news", row.news_id));
            }
            diesel::insert_into(comments::table)
                .values(&row)
                .returning(CommentRow::as_returning())
                .get_result(conn)
                .map(Comment::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_comment(&self, id: CommentId) -> RepositoryResult<Comment> {
        self.with_conn(move |conn| {
            comments::table
                .find(id.value())
                .select(CommentRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Comment::from)
                .ok_or_else(|| missing("comment", id))
        })
        .await
    }

    async fn update_comment(&self, comment: &Comment) -> RepositoryResult<Comment> {
        let comment = comment.clone();
        self.with_conn(move |conn| {
            diesel::update(comments::table.find(comment.id.value()))
                .set((
                    comments::content.eq(&comment.content),
                    comments::edited.eq(comment.edited),
                    comments::last_edited_on.eq(comment.last_edited_on),
                ))
                .returning(CommentRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Comment::from)
                .ok_or_else(|| missing("comment", comment.id))
        })
        .await
    }

    async fn delete_comment(&self, id: CommentId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let count = diesel::delete(comments::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            deleted(count, "comment", id.value())
        })
        .await
    }

    async fn list_comments(&self, news_id: NewsId) -> RepositoryResult<Vec<Comment>> {
        self.with_conn(move |conn| {
            comments::table
                .filter(comments::news_id.eq(news_id.value()))
                .order((comments::posted_on.asc(), comments::id.asc()))
                .select(CommentRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(Comment::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl MeetupRepository for PostgresRepository {
    async fn create_meetup(&self, meetup: NewMeetup) -> RepositoryResult<Meetup> {
        let row = NewMeetupRow::from(meetup);
        self.with_conn(move |conn| {
            diesel::insert_into(meetups::table)
                .values(&row)
                .returning(MeetupRow::as_returning())
                .get_result(conn)
                .map(Meetup::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_meetup(&self, id: MeetupId) -> RepositoryResult<Meetup> {
        self.with_conn(move |conn| {
            meetups::table
                .find(id.value())
                .select(MeetupRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Meetup::from)
                .ok_or_else(|| missing("meetup", id))
        })
        .await
    }

    async fn update_meetup(&self, meetup: &Meetup) -> RepositoryResult<Meetup> {
        let meetup = meetup.clone();
        self.with_conn(move |conn| {
            diesel::update(meetups::table.find(meetup.id.value()))
                .set((
                    meetups::date.eq(meetup.date),
                    meetups::description.eq(&meetup.description),
                ))
                .returning(MeetupRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Meetup::from)
                .ok_or_else(|| missing("meetup", meetup.id))
        })
        .await
    }

    async fn delete_meetup(&self, id: MeetupId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let count = diesel::delete(meetups::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            deleted(count, "meetup", id.value())
        })
        .await
    }

    async fn list_meetups(&self, filter: MeetupFilter) -> RepositoryResult<Vec<Meetup>> {
        self.with_conn(move |conn| {
            let mut query = meetups::table.select(MeetupRow::as_select()).into_boxed();
            if let Some(before) = filter.before {
                query = query.filter(meetups::date.lt(before));
            }
            if let Some(after) = filter.after {
                query = query.filter(meetups::date.ge(after));
            }
            query
                .order((meetups::date.desc(), meetups::id.desc()))
                .load(conn)
                .map(|rows| rows.into_iter().map(Meetup::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_talk(&self, talk: NewTalk) -> RepositoryResult<Talk> {
        let row = NewTalkRow::from(talk);
        self.with_conn(move |conn| {
            let meetup_exists =
                diesel::select(diesel::dsl::exists(meetups::table.find(row.meetup_id)))
                    .get_result::<bool>(conn)
                    .map_err(map_diesel_error)?;
            if !meetup_exists {
                return Err(missing("meetup", row.meetup_id));
            }
            diesel::insert_into(talks::table)
                .values(&row)
                .returning(TalkRow::as_returning())
                .get_result(conn)
                .map(|talk| talk.into_talk(0))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_talk(&self, id: TalkId) -> RepositoryResult<Talk> {
        self.with_conn(move |conn| load_talk(conn, id.value())).await
    }

    async fn update_talk(&self, talk: &Talk) -> RepositoryResult<Talk> {
        let talk = talk.clone();
        self.with_conn(move |conn| {
            let count = diesel::update(talks::table.find(talk.id.value()))
                .set((
                    talks::topic.eq(&talk.topic),
                    talks::description.eq(&talk.description),
                    talks::video_url.eq(&talk.video_url),
                ))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if count == 0 {
                return Err(missing("talk", talk.id));
            }
            load_talk(conn, talk.id.value())
        })
        .await
    }

    async fn delete_talk(&self, id: TalkId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let count = diesel::delete(talks::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            deleted(count, "talk", id.value())
        })
        .await
    }

    async fn list_talks(&self, meetup_id: MeetupId) -> RepositoryResult<Vec<Talk>> {
        self.with_conn(move |conn| {
            let rows: Vec<TalkRow> = talks::table
                .filter(talks::meetup_id.eq(meetup_id.value()))
                .select(TalkRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            let counts = vote_counts(conn, rows.iter().map(|r| r.id).collect())?;

            let mut ranked: Vec<Talk> = rows
                .into_iter()
                .map(|row| {
                    let votes = counts.get(&row.id).copied().unwrap_or(0);
                    row.into_talk(votes)
                })
                .collect();
            ranked.sort_by(|a, b| b.votes_count.cmp(&a.votes_count).then(a.id.cmp(&b.id)));
            Ok(ranked)
        })
        .await
    }

    async fn add_vote(&self, talk_id: TalkId, user_id: UserId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            talk_exists(conn, talk_id.value())?;
            diesel::insert_into(talk_votes::table)
                .values((
                    talk_votes::talk_id.eq(talk_id.value()),
                    talk_votes::user_id.eq(user_id.value()),
                ))
                .on_conflict_do_nothing()
                .execute(conn)
                .map(|count| count > 0)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn remove_vote(&self, talk_id: TalkId, user_id: UserId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            talk_exists(conn, talk_id.value())?;
            diesel::delete(
                talk_votes::table
                    .filter(talk_votes::talk_id.eq(talk_id.value()))
                    .filter(talk_votes::user_id.eq(user_id.value())),
            )
            .execute(conn)
            .map(|count| count > 0)
            .map_err(map_diesel_error)
        })
        .await
    }
}
