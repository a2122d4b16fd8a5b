//! Integration tests for `PearRepository` against a real `PostgreSQL`.
//!
//! Ignored by default. Point `PEAR_TEST_DATABASE_URL` at a scratch database
//! and run with `--ignored`. Each test uses its own user IDs so runs do not
//! interfere with each other.

use std::time::Duration;

use chrono::{SubsecRound, Utc};
use secrecy::SecretString;

use pear_bot::db::{self, PearRepository, PearStore, RepositoryError};
use pear_core::SeedId;

async fn repository() -> PearRepository {
    let url = std::env::var("PEAR_TEST_DATABASE_URL")
        .expect("PEAR_TEST_DATABASE_URL must be set for database tests");

    let pool = db::create_pool(&SecretString::from(url), 2, Duration::from_secs(5))
        .await
        .expect("Failed to connect to test database");
    db::run_migrations(&pool).await.expect("Failed to migrate");

    PearRepository::new(pool)
}

/// User ID unique to this test run.
fn user(tag: &str) -> String {
    format!("U{tag}{}", Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

#[tokio::test]
#[ignore = "requires PEAR_TEST_DATABASE_URL"]
async fn test_seed_round_trip() {
    let repo = repository().await;
    let requester = user("RT");
    // Postgres keeps microseconds
    let before = Utc::now().trunc_subsecs(6);

    let inserted = repo
        .insert_seed(&requester, "borrow checker", Utc::now())
        .await
        .expect("insert");
    let fetched = repo
        .get_seed(inserted.id)
        .await
        .expect("query")
        .expect("seed exists");

    assert_eq!(fetched.requester, requester);
    assert_eq!(fetched.topic, "borrow checker");
    assert!(fetched.created_at >= before);
    assert_eq!(fetched, inserted);
}

#[tokio::test]
#[ignore = "requires PEAR_TEST_DATABASE_URL"]
async fn test_empty_topic_rejected_by_schema() {
    let repo = repository().await;

    let result = repo.insert_seed(&user("EMPTY"), "", Utc::now()).await;

    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires PEAR_TEST_DATABASE_URL"]
async fn test_pear_for_missing_seed_fails() {
    let repo = repository().await;
    let fulfiller = user("FK");

    let result = repo
        .insert_pear(SeedId::new(i32::MAX), &fulfiller, Utc::now())
        .await;

    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    assert!(
        repo.list_fulfilled_by(&fulfiller)
            .await
            .expect("query")
            .is_empty()
    );
}

#[tokio::test]
#[ignore = "requires PEAR_TEST_DATABASE_URL"]
async fn test_seed_fulfilled_once() {
    let repo = repository().await;
    let seed = repo
        .insert_seed(&user("REQ"), "flamegraphs", Utc::now())
        .await
        .expect("insert seed");

    repo.insert_pear(seed.id, &user("A"), Utc::now())
        .await
        .expect("first pear");
    let second = repo.insert_pear(seed.id, &user("B"), Utc::now()).await;

    assert!(matches!(second, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires PEAR_TEST_DATABASE_URL"]
async fn test_history_lists_fulfilled_seeds_in_order() {
    let repo = repository().await;
    let requester = user("HREQ");
    let fulfiller = user("HFUL");

    for topic in ["sqlx", "axum"] {
        let seed = repo
            .insert_seed(&requester, topic, Utc::now())
            .await
            .expect("insert seed");
        repo.insert_pear(seed.id, &fulfiller, Utc::now())
            .await
            .expect("insert pear");
    }

    let history = repo.list_fulfilled_by(&fulfiller).await.expect("history");

    let topics: Vec<_> = history.iter().map(|record| record.topic.as_str()).collect();
    assert_eq!(topics, ["sqlx", "axum"]);
    assert!(history.iter().all(|record| record.requester == requester));
}

#[tokio::test]
#[ignore = "requires PEAR_TEST_DATABASE_URL"]
async fn test_ping() {
    repository().await.ping().await.expect("ping");
}
