//! End-to-end topic traversal against a mock forum

use crate::fixtures::*;
use tempfile::TempDir;
use thread_trail::output::{write_thread_dumps, TraversalSummary};
use thread_trail::TrailError;
use wiremock::{MockServer, ResponseTemplate};

/// Mounts a three thread topic a <-> b <-> c
async fn mount_topic(server: &MockServer) {
    mount_thread(
        server,
        "/thr/a",
        vec![thread_page(None, Some("/thr/b/"), &[(1, None, "a1"), (2, Some(1), "a2")])],
    )
    .await;
    mount_thread(
        server,
        "/thr/b",
        vec![
            thread_page(Some("/thr/a/"), Some("/thr/c/"), &[(3, Some(2), "b3"), (4, Some(1), "b4")]),
            thread_page(Some("/thr/a/"), Some("/thr/c/"), &[(1, None, "b1"), (2, None, "b2")]),
        ],
    )
    .await;
    mount_thread(
        server,
        "/thr/c",
        vec![thread_page(Some("/thr/b/p=0"), None, &[(1, None, "c1")])],
    )
    .await;
}

#[tokio::test]
async fn test_traverse_topic_from_middle() {
    let server = MockServer::start().await;
    mount_topic(&server).await;

    let start = format!("{}/thr/b/", server.uri());
    let topic = traverser().traverse(&start).await.unwrap();

    assert_eq!(topic.ids(), vec![-1, 0, 1]);
    assert!(topic.is_complete());
    assert_eq!(topic.thread(-1).unwrap().address, format!("{}/thr/a", server.uri()));
    assert_eq!(topic.thread(1).unwrap().address, format!("{}/thr/c", server.uri()));

    // Replies resolve only within their own thread
    let middle = topic.thread(0).unwrap();
    let b3 = middle.comment(3).unwrap();
    assert_eq!(middle.reply_target(b3).map(|c| c.text.as_str()), Some("b2"));
    let b4 = middle.comment(4).unwrap();
    assert_eq!(middle.reply_target(b4).map(|c| c.text.as_str()), Some("b1"));

    for thread in ["/thr/a/", "/thr/b/", "/thr/c/"] {
        assert_eq!(requests_under(&server, thread).await, MAX_PAGES as usize);
    }
}

#[tokio::test]
async fn test_failing_neighbour_does_not_stop_other_direction() {
    let server = MockServer::start().await;
    mount_topic(&server).await;

    let start = format!("{}/thr/c/", server.uri());
    let topic = traverser().traverse(&start).await.unwrap();
    assert_eq!(topic.ids(), vec![-2, -1, 0]);

    let server = MockServer::start().await;
    for number in 0..MAX_PAGES {
        mount_page(&server, "/thr/a", number, ResponseTemplate::new(500)).await;
    }
    mount_thread(
        &server,
        "/thr/b",
        vec![thread_page(Some("/thr/a/"), Some("/thr/c/"), &[(1, None, "b1")])],
    )
    .await;
    mount_thread(
        &server,
        "/thr/c",
        vec![thread_page(Some("/thr/b/"), None, &[(1, None, "c1")])],
    )
    .await;

    let start = format!("{}/thr/b", server.uri());
    let topic = traverser().traverse(&start).await.unwrap();

    assert_eq!(topic.ids(), vec![0, 1]);
    assert_eq!(topic.failures.len(), 1);
    assert_eq!(topic.failures[0].id, -1);
}

#[tokio::test]
async fn test_unreachable_start_is_an_error() {
    let server = MockServer::start().await;

    let start = format!("{}/thr/nowhere", server.uri());
    let err = traverser().traverse(&start).await.unwrap_err();
    assert!(matches!(err, TrailError::AllPagesFailed { attempted: 3, .. }));
}

#[tokio::test]
async fn test_traversal_dumps_and_summary() {
    let server = MockServer::start().await;
    mount_topic(&server).await;

    let start = format!("{}/thr/b", server.uri());
    let topic = traverser().traverse(&start).await.unwrap();

    let dir = TempDir::new().unwrap();
    let paths = write_thread_dumps(dir.path(), &topic.threads).unwrap();
    assert_eq!(paths.len(), 3);

    let middle: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths[1]).unwrap()).unwrap();
    assert_eq!(middle["id"], 0);
    assert_eq!(middle["comments"][2]["reply"]["text"], "b2");

    let summary = TraversalSummary::from_topic(&start, &topic);
    assert_eq!(summary.thread_count, 3);
    assert_eq!(summary.comment_count, 7);
    assert_eq!(summary.id_range, Some((-1, 1)));
}
