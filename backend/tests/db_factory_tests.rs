//! Tests for db::factory and db::repo_config - backend selection and configuration.

mod support;

use std::io::Write;
use std::str::FromStr;

use elsyser::db::factory::{RepositoryFactory, RepositoryType};
use elsyser::db::repo_config::{RepositoryConfig, CONFIG_ENV};
use elsyser::db::repository::{AccountRepository, SchoolRepository};

#[test]
fn test_repository_type_from_str_postgres() {
    for name in ["postgres", "POSTGRES", "pg"] {
        assert_eq!(RepositoryType::from_str(name).unwrap(), RepositoryType::Postgres);
    }
}

#[test]
fn test_repository_type_from_str_local() {
    for name in ["local", "LOCAL", "memory"] {
        assert_eq!(RepositoryType::from_str(name).unwrap(), RepositoryType::Local);
    }
}

#[test]
fn test_repository_type_from_str_invalid() {
    let result = RepositoryType::from_str("sqlite");
    assert!(result.unwrap_err().contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_repository_type_from_env_with_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://localhost/elsyser")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres),
    );
}

#[test]
fn test_repository_type_explicit_wins() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", Some("postgres://localhost/elsyser")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_repository_type_unknown_falls_back_to_local() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("mongo"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local)
    });
}

#[tokio::test]
async fn test_create_local_is_empty() {
    let repo = RepositoryFactory::create_local();
    assert!(repo.health_check().await.unwrap());
    assert!(repo.list_classes(None).await.unwrap().is_empty());
    assert!(repo.find_user_by_username("admin").await.unwrap().is_none());
}

#[tokio::test]
async fn test_local_repositories_are_independent() {
    let first = RepositoryFactory::create_local();
    let second = RepositoryFactory::create_local();
    first.create_subject("Physics").await.unwrap();
    assert_eq!(first.list_subjects().await.unwrap().len(), 1);
    assert!(second.list_subjects().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_from_config_file_local() {
    let path = std::env::temp_dir().join(format!("elsyser-repo-{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[repository]\ntype = \"memory\"").unwrap();

    let repo = RepositoryFactory::from_config_file(&path).await.unwrap();
    assert!(repo.health_check().await.unwrap());

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_from_config_file_missing() {
    let err = RepositoryFactory::from_config_file("/nonexistent/repository.toml")
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_config_invalid_type() {
    let config = RepositoryConfig::parse("[repository]\ntype = \"redis\"\n").unwrap();
    assert!(config.repository_type().is_err());
    assert!(config.to_postgres_config().is_err());
}

#[test]
fn test_find_default_honours_env() {
    let path = std::env::temp_dir().join(format!("elsyser-find-{}.toml", std::process::id()));
    std::fs::write(&path, "[repository]\ntype = \"local\"\n").unwrap();
    let path_str = path.to_string_lossy().to_string();

    let found = support::with_scoped_env(&[(CONFIG_ENV, Some(path_str.as_str()))], || {
        RepositoryConfig::find_default()
    });
    assert_eq!(found, Some(path.clone()));

    std::fs::remove_file(&path).unwrap();
}
