use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_set_get_overwrite_remove() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("bulabooks.progress").await.unwrap(), None);

    repo.set("bulabooks.progress", r#"{"wordHunt":{}}"#)
        .await
        .unwrap();
    assert_eq!(
        repo.get("bulabooks.progress").await.unwrap().as_deref(),
        Some(r#"{"wordHunt":{}}"#)
    );

    repo.set("bulabooks.progress", "{}").await.unwrap();
    assert_eq!(
        repo.get("bulabooks.progress").await.unwrap().as_deref(),
        Some("{}")
    );

    repo.remove("bulabooks.progress").await.unwrap();
    assert_eq!(repo.get("bulabooks.progress").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set("bulabooks.lang", "tn").await.unwrap();
    repo.migrate().await.expect("second migrate");

    assert_eq!(
        repo.get("bulabooks.lang").await.unwrap().as_deref(),
        Some("tn")
    );
}

#[tokio::test]
async fn storage_sqlite_keys_are_independent() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_storage?mode=memory&cache=shared")
        .await
        .expect("open");

    storage.kv.set("bulabooks.lang", "zu").await.unwrap();
    storage
        .kv
        .set("bulabooks.tutorial.completed", "true")
        .await
        .unwrap();
    storage.kv.remove("bulabooks.lang").await.unwrap();

    assert_eq!(storage.kv.get("bulabooks.lang").await.unwrap(), None);
    assert_eq!(
        storage
            .kv
            .get("bulabooks.tutorial.completed")
            .await
            .unwrap()
            .as_deref(),
        Some("true")
    );
}
