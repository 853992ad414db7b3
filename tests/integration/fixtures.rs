//! Forum markup and mock server helpers

use std::sync::Arc;
use thread_trail::config::{CrawlerConfig, UserAgentConfig};
use thread_trail::crawler::limiter::{NoDelay, RetryPolicy};
use thread_trail::crawler::{Assembler, Traverser};
use thread_trail::HttpPageSource;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const MAX_PAGES: u32 = 3;

/// One comment as `(id, reply_id, text)`
pub type Post<'a> = (u64, Option<u64>, &'a str);

pub fn article(id: u64, reply_id: Option<u64>, text: &str) -> String {
    let citation = reply_id
        .map(|r| {
            format!(
                r#"<span class="resOverlay" data-tipso="preview"><a href="/rrid={r}/">&gt;&gt;{r}</a></span> "#
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="res_list_article">
            <dt><div class="res_meta_wrap">
                <span class="resnumb"><a href="/rrid={id}/">#{id}</a></span>
                <span itemprop="commentTime">2024/01/01 10:{min:02}</span>
            </div></dt>
            <dd class="body"><div class="resbody" itemprop="commentText">{citation}{text}</div></dd>
        </div>"#,
        min = id % 60
    )
}

/// Renders a thread page; links are paths relative to the server
pub fn thread_page(prev: Option<&str>, next: Option<&str>, posts: &[Post<'_>]) -> String {
    let prev = prev
        .map(|p| format!(r#"<div class="sre_mae"><a href="{p}">prev</a></div>"#))
        .unwrap_or_default();
    let next = next
        .map(|n| format!(r#"<div class="sre_tsugi"><a href="{n}">next</a></div>"#))
        .unwrap_or_default();
    let articles: Vec<String> = posts
        .iter()
        .map(|(id, reply, text)| article(*id, *reply, text))
        .collect();

    format!(
        r#"<html><body><div class="thrWhole"><div class="thrWholeLeft">
            <dl id="thr_top"><div id="thr_pager">{prev}{next}</div></dl>
            <dl id="res_list">{}</dl>
        </div></div></body></html>"#,
        articles.join("\n")
    )
}

/// The forum's layout for a page past the end of a thread
pub fn missing_page() -> String {
    "<html><body><div class=\"notice\">No such page</div></body></html>".to_string()
}

/// Serves `pages` for thread `thread_path`, padding up to `MAX_PAGES` with
/// past-the-end pages
pub async fn mount_thread(server: &MockServer, thread_path: &str, pages: Vec<String>) {
    for number in 0..MAX_PAGES {
        let body = pages.get(number as usize).cloned().unwrap_or_else(missing_page);
        mount_page(server, thread_path, number, ResponseTemplate::new(200).set_body_string(body))
            .await;
    }
}

pub async fn mount_page(
    server: &MockServer,
    thread_path: &str,
    number: u32,
    response: ResponseTemplate,
) {
    Mock::given(method("GET"))
        .and(path(format!("{}/p={}", thread_path, number)))
        .respond_with(response.insert_header("content-type", "text/html"))
        .mount(server)
        .await;
}

pub fn source() -> Arc<HttpPageSource> {
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    };
    let crawler = CrawlerConfig {
        request_timeout_secs: 5,
        ..CrawlerConfig::default()
    };
    Arc::new(HttpPageSource::from_config(&user_agent, &crawler).expect("client"))
}

pub fn assembler() -> Assembler<HttpPageSource> {
    Assembler::new(source(), MAX_PAGES)
        .with_schedule(Arc::new(NoDelay))
        .with_retry(RetryPolicy::none())
}

pub fn traverser() -> Traverser<HttpPageSource> {
    Traverser::new(assembler()).with_schedule(Arc::new(NoDelay))
}

/// Number of requests the server received for paths starting with `prefix`
pub async fn requests_under(server: &MockServer, prefix: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().starts_with(prefix))
        .count()
}
