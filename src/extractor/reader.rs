use readability::extractor;
use scraper::{Html, Selector};
use url::Url;

use crate::extractor::model::ReadabilityResult;

const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    ".article-body",
    ".entry-content",
    ".post",
    ".content",
    "#content",
    "#main",
];

pub fn extract(html: &str, url: &Url) -> Option<ReadabilityResult> {
    let document = Html::parse_document(html);

    if let Ok(article) = extractor::extract(&mut html.as_bytes(), url)
        && !article.text.trim().is_empty()
    {
        let title = if article.title.trim().is_empty() {
            extract_title(&document).unwrap_or_default()
        } else {
            article.title
        };
        return Some(ReadabilityResult {
            title,
            site_name: extract_site_name(&document),
            text: article.text,
        });
    }

    fallback_extract(&document)
}

fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|t| !t.is_empty())
}

fn extract_site_name(document: &Html) -> Option<String> {
    if let Some(name) = first_attr(document, "meta[property='og:site_name']", "content") {
        return Some(name);
    }

    // "Article Title - Site Name" or "Article Title | Site Name"
    let title = first_text(document, "title")?;
    [" - ", " | "]
        .iter()
        .find_map(|sep| title.rfind(sep).map(|pos| title[pos + sep.len()..].to_string()))
}

fn extract_title(document: &Html) -> Option<String> {
    first_attr(document, "meta[property='og:title']", "content")
        .or_else(|| first_text(document, "title"))
        .or_else(|| first_text(document, "h1"))
}

fn fallback_extract(document: &Html) -> Option<ReadabilityResult> {
    let title = extract_title(document)?;
    let text = extract_main_content(document);

    if text.trim().is_empty() {
        return None;
    }

    Some(ReadabilityResult {
        title,
        site_name: extract_site_name(document),
        text,
    })
}

fn extract_main_content(document: &Html) -> String {
    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element.text().collect::<Vec<_>>().join(" ");
            if text.trim().len() > 100 {
                return text;
            }
        }
    }

    if let Ok(body_selector) = Selector::parse("body")
        && let Some(body) = document.select(&body_selector).next()
    {
        return body.text().collect::<Vec<_>>().join(" ");
    }

    String::new()
}
