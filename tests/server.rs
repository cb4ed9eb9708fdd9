use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use students_api::{app, Server, SqliteStore};
use tokio::sync::oneshot;

#[tokio::test]
async fn serves_crud_over_tcp_and_shuts_down() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(dir.path().join("storage.db")).unwrap());

    let server = Server::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", server.local_addr().unwrap());
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve_with_shutdown(app(store), async {
        let _ = stop_rx.await;
    }));

    let client = reqwest::Client::new();

    let created = client
        .post(format!("{base}/api/students"))
        .json(&json!({"name": "Ann", "email": "ann@x.com", "age": 21}))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), reqwest::StatusCode::CREATED);
    assert_eq!(
        created.headers()["content-type"],
        "application/json"
    );
    assert_eq!(created.json::<Value>().await.unwrap(), json!({"id": 1}));

    let fetched = client
        .get(format!("{base}/api/students/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(fetched.status(), reqwest::StatusCode::OK);
    assert_eq!(
        fetched.json::<Value>().await.unwrap(),
        json!({"id": 1, "name": "Ann", "email": "ann@x.com", "age": 21})
    );

    let deleted = client
        .delete(format!("{base}/api/students/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), reqwest::StatusCode::NO_CONTENT);

    let missing = client
        .get(format!("{base}/api/students/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    let unsupported = client
        .request(reqwest::Method::TRACE, format!("{base}/api/students"))
        .send()
        .await
        .unwrap();
    assert_eq!(unsupported.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);

    drop(client);
    stop_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn shutdown_closes_idle_keep_alive_connections() {
    let server = Server::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", server.local_addr().unwrap());
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve_with_shutdown(
        app(Arc::new(SqliteStore::open_in_memory().unwrap())),
        async {
            let _ = stop_rx.await;
        },
    ));

    // The client keeps its pooled connection open for the whole test.
    let client = reqwest::Client::new();
    let listed = client
        .get(format!("{base}/api/students"))
        .send()
        .await
        .unwrap();
    assert_eq!(listed.status(), reqwest::StatusCode::OK);
    assert_eq!(listed.json::<Value>().await.unwrap(), json!([]));

    let started_at = Instant::now();
    stop_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    assert!(
        started_at.elapsed() < Duration::from_secs(2),
        "shutdown took {:?}",
        started_at.elapsed()
    );
    drop(client);
}
