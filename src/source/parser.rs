//! HTML parser for forum thread pages
//!
//! This module turns one rendered thread page into a [`Page`]:
//! - The pager block gives the links to the previous and next thread
//! - Each article in the response list becomes a [`Comment`]
//! - A reply citation (`>>N`) is split off the body into `reply_id`
//!
//! Selectors follow the forum's markup:
//!
//! | Field | Selector |
//! |-------|----------|
//! | page root | `.thrWhole .thrWholeLeft` |
//! | prev thread | `dl#thr_top #thr_pager .sre_mae a` |
//! | next thread | `dl#thr_top #thr_pager .sre_tsugi a` |
//! | comment | `dl#res_list > .res_list_article` |
//! | id | `dt div.res_meta_wrap span.resnumb > a` (`#123`) |
//! | time | `span[itemprop="commentTime"]` |
//! | body | `dd.body .resbody[itemprop="commentText"]` |
//! | citation | `span.resOverlay[data-tipso] a` (`>>12`) |

use crate::model::{Comment, Page, PageHead};
use crate::url::resolve_link;
use crate::TrailError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Compiled selectors for one parse
struct Selectors {
    root: Selector,
    prev: Selector,
    next: Selector,
    article: Selector,
    number: Selector,
    time: Selector,
    body: Selector,
    citation: Selector,
    anchor: Selector,
}

impl Selectors {
    fn new(url: &str) -> Result<Self, TrailError> {
        let compile = |css: &str| {
            Selector::parse(css).map_err(|e| TrailError::HtmlParse {
                url: url.to_string(),
                message: format!("invalid selector '{}': {:?}", css, e),
            })
        };

        Ok(Self {
            root: compile(".thrWhole .thrWholeLeft")?,
            prev: compile("dl#thr_top #thr_pager .sre_mae a")?,
            next: compile("dl#thr_top #thr_pager .sre_tsugi a")?,
            article: compile("dl#res_list > .res_list_article")?,
            number: compile("dt div.res_meta_wrap span.resnumb > a")?,
            time: compile("dt div.res_meta_wrap span[itemprop=\"commentTime\"]")?,
            body: compile("dd.body .resbody[itemprop=\"commentText\"]")?,
            citation: compile("span.resOverlay")?,
            anchor: compile("a")?,
        })
    }
}

/// Parses a rendered thread page
///
/// A document without the page root (for example the forum's "no such page"
/// layout) parses as an empty page, which callers treat as past the end of
/// the thread.
///
/// # Arguments
///
/// * `html` - The HTML content of the page
/// * `page_url` - The URL the page was fetched from, used to resolve links
///
/// # Returns
///
/// * `Ok(Page)` - Head links and comments sorted by id
/// * `Err(TrailError::HtmlParse)` - A comment without a readable id
///
/// # Example
///
/// ```
/// use thread_trail::source::parse_page;
///
/// let page = parse_page("<html><body></body></html>", "https://f.example/thr/1/p=0").unwrap();
/// assert!(page.contents.is_empty());
/// ```
pub fn parse_page(html: &str, page_url: &str) -> Result<Page, TrailError> {
    let base_url = Url::parse(page_url)?;
    let selectors = Selectors::new(page_url)?;
    let document = Html::parse_document(html);

    let Some(root) = document.select(&selectors.root).next() else {
        tracing::debug!("No thread body found at {}", page_url);
        return Ok(Page::default());
    };

    let head = PageHead {
        prev: extract_link(root, &selectors.prev, &base_url),
        next: extract_link(root, &selectors.next, &base_url),
    };

    let contents = root
        .select(&selectors.article)
        .map(|article| extract_comment(article, &selectors, page_url))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page::new(head, contents))
}

/// Extracts the first matching link as an absolute URL
fn extract_link(root: ElementRef<'_>, selector: &Selector, base_url: &Url) -> Option<String> {
    root.select(selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve_link(href, base_url))
}

/// Extracts one comment from a response list article
fn extract_comment(
    article: ElementRef<'_>,
    selectors: &Selectors,
    page_url: &str,
) -> Result<Comment, TrailError> {
    let number = article
        .select(&selectors.number)
        .next()
        .map(collect_text)
        .unwrap_or_default();

    let id = number
        .strip_prefix('#')
        .and_then(|n| n.trim().parse::<u64>().ok())
        .ok_or_else(|| TrailError::HtmlParse {
            url: page_url.to_string(),
            message: format!("unreadable comment number '{}'", number),
        })?;

    let time = article
        .select(&selectors.time)
        .next()
        .map(collect_text)
        .unwrap_or_default();

    let body = article.select(&selectors.body).next();
    let text = body.map(collect_text).unwrap_or_default();

    let citation = body.and_then(|b| extract_citation(b, selectors));
    let reply_id = citation.as_deref().and_then(parse_citation);
    if citation.is_some() && reply_id.is_none() {
        tracing::debug!("Ignoring unreadable citation {:?} in #{}", citation, id);
    }

    let text = match &citation {
        Some(cited) => text.replacen(cited.as_str(), "", 1).trim().to_string(),
        None => text,
    };

    Ok(Comment {
        id,
        time,
        text,
        reply_id,
        reply_ref: None,
    })
}

/// Returns the citation text (`>>12`) of a comment body, if it has one
///
/// Only overlays carrying a `data-tipso` preview count as citations.
fn extract_citation(body: ElementRef<'_>, selectors: &Selectors) -> Option<String> {
    let overlay = body.select(&selectors.citation).next()?;
    let tipso = overlay.value().attr("data-tipso")?;
    if tipso.is_empty() {
        return None;
    }

    overlay
        .select(&selectors.anchor)
        .next()
        .map(collect_text)
        .filter(|s| !s.is_empty())
}

/// Parses `>>12` into `12`
fn parse_citation(citation: &str) -> Option<u64> {
    citation
        .trim()
        .trim_start_matches(">>")
        .trim_start_matches("&gt;&gt;")
        .trim()
        .parse()
        .ok()
}

fn collect_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://f.example/thr_res/tid=10/p=0";

    fn article(id: u64, time: &str, body: &str) -> String {
        format!(
            r#"<div class="res_list_article">
                <dt><div class="res_meta_wrap">
                    <span class="resnumb"><a href="/thr_res/tid=10/rrid={id}/">#{id}</a></span>
                    <span itemprop="commentTime">{time}</span>
                </div></dt>
                <dd class="body"><div class="resbody" itemprop="commentText">{body}</div></dd>
            </div>"#
        )
    }

    fn document(pager: &str, articles: &[String]) -> String {
        format!(
            r#"<html><body><div class="thrWhole"><div class="thrWholeLeft">
                <dl id="thr_top"><div id="thr_pager">{pager}</div></dl>
                <dl id="res_list">{}</dl>
            </div></div></body></html>"#,
            articles.join("\n")
        )
    }

    #[test]
    fn test_parse_head_links() {
        let html = document(
            r#"<div class="sre_mae"><a href="/thr_res/tid=9/">prev</a></div>
               <div class="sre_tsugi"><a href="https://f.example/thr_res/tid=11/">next</a></div>"#,
            &[article(1, "2024/01/01 10:00", "hello")],
        );
        let page = parse_page(&html, PAGE_URL).unwrap();

        assert_eq!(
            page.head.prev.as_deref(),
            Some("https://f.example/thr_res/tid=9/")
        );
        assert_eq!(
            page.head.next.as_deref(),
            Some("https://f.example/thr_res/tid=11/")
        );
    }

    #[test]
    fn test_missing_links_are_none() {
        let html = document("", &[article(1, "t", "hello")]);
        let page = parse_page(&html, PAGE_URL).unwrap();
        assert_eq!(page.head, PageHead::default());
    }

    #[test]
    fn test_parse_comments_sorted() {
        let html = document(
            "",
            &[
                article(12, "2024/01/01 10:02", "third"),
                article(10, "2024/01/01 10:00", "first"),
                article(11, "2024/01/01 10:01", "second"),
            ],
        );
        let page = parse_page(&html, PAGE_URL).unwrap();

        let ids: Vec<u64> = page.contents.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        assert_eq!(page.contents[0].time, "2024/01/01 10:00");
        assert_eq!(page.contents[0].text, "first");
        assert!(page.contents.iter().all(|c| c.reply_id.is_none()));
    }

    #[test]
    fn test_reply_citation_is_split_off() {
        let body = r#"<span class="resOverlay" data-tipso="original text"><a href="/rrid=3/">&gt;&gt;3</a></span>
                      I agree"#;
        let html = document("", &[article(7, "t", body)]);
        let page = parse_page(&html, PAGE_URL).unwrap();

        let comment = &page.contents[0];
        assert_eq!(comment.reply_id, Some(3));
        assert_eq!(comment.text, "I agree");
        assert!(comment.reply_ref.is_none());
    }

    #[test]
    fn test_overlay_without_tipso_is_not_a_citation() {
        let body = r#"<span class="resOverlay"><a href="/rrid=3/">&gt;&gt;3</a></span> text"#;
        let html = document("", &[article(7, "t", body)]);
        let page = parse_page(&html, PAGE_URL).unwrap();

        assert_eq!(page.contents[0].reply_id, None);
        assert_eq!(page.contents[0].text, ">>3 text");
    }

    #[test]
    fn test_missing_root_is_empty_page() {
        let page = parse_page("<html><body><p>404</p></body></html>", PAGE_URL).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.head, PageHead::default());
    }

    #[test]
    fn test_root_without_comments_is_empty_page() {
        let html = document(r#"<div class="sre_mae"><a href="/thr_res/tid=9/">prev</a></div>"#, &[]);
        let page = parse_page(&html, PAGE_URL).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_unreadable_number_is_error() {
        let broken = article(1, "t", "x").replace("#1<", "No.1<");
        let html = document("", &[broken]);
        let err = parse_page(&html, PAGE_URL).unwrap_err();
        assert!(matches!(err, TrailError::HtmlParse { .. }));
    }

    #[test]
    fn test_parse_citation() {
        assert_eq!(parse_citation(">>12"), Some(12));
        assert_eq!(parse_citation(" >> 5 "), Some(5));
        assert_eq!(parse_citation(">>abc"), None);
    }
}
