use super::*;
use shared::schema::validate_fields;

fn jane() -> ValidSubmission {
    validate_fields("Jane Doe", "jane@example.com", "Hello").expect("valid")
}

#[tokio::test]
async fn stores_submission_and_assigns_id_and_timestamp() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let before = Utc::now().trunc_subsecs(6);
    let stored = storage.insert_submission(&jane()).await.expect("insert");

    assert_eq!(stored.name, "Jane Doe");
    assert_eq!(stored.email, "jane@example.com");
    assert_eq!(stored.message, "Hello");
    assert!(stored.created_at >= before);

    let loaded = storage
        .get_submission(stored.id)
        .await
        .expect("load")
        .expect("present");
    assert_eq!(loaded, stored);
}

#[tokio::test]
async fn same_content_twice_creates_two_records() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = storage.create_submission(&jane()).await.expect("first");
    let second = storage.create_submission(&jane()).await.expect("second");

    assert_ne!(first.id, second.id);
    assert_eq!(storage.count_submissions().await.expect("count"), 2);
}

#[tokio::test]
async fn lists_newest_first_with_limit() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut ids = Vec::new();
    for message in ["one", "two", "three"] {
        let submission = validate_fields("Jane", "jane@example.com", message).expect("valid");
        ids.push(storage.insert_submission(&submission).await.expect("insert").id);
    }

    let newest_two = storage.list_submissions(2).await.expect("list");
    assert_eq!(newest_two.len(), 2);
    assert_eq!(newest_two[0].id, ids[2]);
    assert_eq!(newest_two[1].id, ids[1]);
}

#[tokio::test]
async fn unknown_id_is_none() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let missing = storage
        .get_submission(SubmissionId::new_v4())
        .await
        .expect("query");
    assert!(missing.is_none());
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    SubmissionStore::health_check(&storage)
        .await
        .expect("health check");
}

#[tokio::test]
async fn closed_pool_fails_inserts() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.pool().close().await;
    let err = storage
        .create_submission(&jane())
        .await
        .expect_err("closed pool");
    assert!(err.to_string().contains("failed to insert contact submission"));
}

#[test]
fn sqlite_path_ignores_memory_and_foreign_urls() {
    assert!(sqlite_path("sqlite::memory:").is_none());
    assert!(sqlite_path("postgres://localhost/db").is_none());
    assert_eq!(
        sqlite_path("sqlite://./data/contact.db?mode=rwc"),
        Some(PathBuf::from("./data/contact.db"))
    );
}
