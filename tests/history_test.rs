use concierge::history::sqlite::SqliteHistory;
use concierge::history::{History, HistoryEntry};

fn entry(user: &str, query: &str) -> HistoryEntry {
    HistoryEntry::new(user, query, &format!("answer to {query}"), "primary")
}

#[tokio::test]
async fn record_and_list() {
    let history = SqliteHistory::in_memory().unwrap();
    history.record(entry("u-1", "kitchen")).await.unwrap();

    let entries = history.for_user("u-1", 10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].query, "kitchen");
    assert_eq!(entries[0].response, "answer to kitchen");
    assert_eq!(entries[0].provider, "primary");
}

#[tokio::test]
async fn limit_keeps_newest_in_chronological_order() {
    let history = SqliteHistory::in_memory().unwrap();
    for q in ["one", "two", "three", "four"] {
        history.record(entry("u-1", q)).await.unwrap();
    }

    let entries = history.for_user("u-1", 2).await.unwrap();
    let queries: Vec<_> = entries.iter().map(|e| e.query.as_str()).collect();
    assert_eq!(queries, vec!["three", "four"]);
}

#[tokio::test]
async fn users_are_isolated() {
    let history = SqliteHistory::in_memory().unwrap();
    history.record(entry("u-1", "mine")).await.unwrap();
    history.record(entry("u-2", "theirs")).await.unwrap();

    let entries = history.for_user("u-2", 10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].query, "theirs");
}

#[tokio::test]
async fn clear_user_leaves_others() {
    let history = SqliteHistory::in_memory().unwrap();
    history.record(entry("u-1", "a")).await.unwrap();
    history.record(entry("u-2", "b")).await.unwrap();

    history.clear_user("u-1").await.unwrap();

    assert!(history.for_user("u-1", 10).await.unwrap().is_empty());
    assert_eq!(history.for_user("u-2", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn timestamps_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.db");
    let path = path.to_str().unwrap();
    let original = entry("u-1", "bathroom");

    {
        let history = SqliteHistory::open(path).unwrap();
        history.record(original.clone()).await.unwrap();
    }

    let history = SqliteHistory::open(path).unwrap();
    let entries = history.for_user("u-1", 10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].created_at, original.created_at);
}
