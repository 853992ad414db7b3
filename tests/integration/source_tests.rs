//! HTTP page source and single-thread assembly

use crate::fixtures::*;
use thread_trail::{PageSource, TrailError};
use wiremock::{MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_page_parses_forum_markup() {
    let server = MockServer::start().await;
    mount_thread(
        &server,
        "/thr/b",
        vec![thread_page(
            Some("/thr/a/"),
            Some("/thr/c/p=2"),
            &[(8, None, "hello"), (9, Some(8), "agreed")],
        )],
    )
    .await;

    let base = format!("{}/thr/b", server.uri());
    let page = source().fetch_page(&base, 0).await.unwrap();

    assert_eq!(page.head.prev, Some(format!("{}/thr/a/", server.uri())));
    assert_eq!(page.head.next, Some(format!("{}/thr/c/p=2", server.uri())));
    assert_eq!(page.contents.len(), 2);
    assert_eq!(page.contents[1].reply_id, Some(8));
    assert_eq!(page.contents[1].text, "agreed");
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let server = MockServer::start().await;
    mount_thread(&server, "/thr/b", vec![]).await;

    let base = format!("{}/thr/b", server.uri());
    let page = source().fetch_page(&base, 2).await.unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;
    mount_page(&server, "/thr/b", 0, ResponseTemplate::new(503)).await;

    let base = format!("{}/thr/b", server.uri());
    let err = source().fetch_page(&base, 0).await.unwrap_err();

    assert!(matches!(err, TrailError::Status { status: 503, .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_assemble_thread_across_pages() {
    let server = MockServer::start().await;
    // Page 0 holds the newest comments, page 1 the oldest
    mount_thread(
        &server,
        "/thr/b",
        vec![
            thread_page(None, None, &[(4, Some(1), "late"), (5, Some(4), "later")]),
            thread_page(None, None, &[(1, None, "first"), (2, None, "second"), (3, Some(2), "third")]),
        ],
    )
    .await;

    let base = format!("{}/thr/b", server.uri());
    let thread = assembler().assemble(0, &base).await.unwrap();

    let ids: Vec<u64> = thread.contents.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(thread.address, base);

    let later = thread.comment(5).unwrap();
    assert_eq!(thread.reply_target(later).map(|c| c.id), Some(4));
    let late = thread.comment(4).unwrap();
    assert_eq!(thread.reply_target(late).map(|c| c.text.as_str()), Some("first"));
    assert_eq!(thread.dangling_replies(), 0);

    assert_eq!(requests_under(&server, "/thr/b/").await, MAX_PAGES as usize);
}

#[tokio::test]
async fn test_assemble_rejects_disagreeing_pages() {
    let server = MockServer::start().await;
    mount_thread(
        &server,
        "/thr/b",
        vec![
            thread_page(Some("/thr/a/"), None, &[(3, None, "x")]),
            thread_page(Some("/thr/z/"), None, &[(1, None, "y")]),
        ],
    )
    .await;

    let base = format!("{}/thr/b", server.uri());
    let err = assembler().assemble(0, &base).await.unwrap_err();

    match err {
        TrailError::InconsistentHead { heads, .. } => assert_eq!(heads.len(), 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_assemble_empty_thread() {
    let server = MockServer::start().await;
    mount_thread(&server, "/thr/b", vec![]).await;

    let base = format!("{}/thr/b", server.uri());
    let err = assembler().assemble(0, &base).await.unwrap_err();
    assert!(matches!(err, TrailError::EmptyThread { .. }));
}
