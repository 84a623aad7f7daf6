use scraper::{Html, Selector};
use url::Url;

/// Declared share images, most specific first.
const META_IMAGE_SELECTORS: &[(&str, &str)] = &[
    ("meta[property='og:image']", "content"),
    ("meta[name='og:image']", "content"),
    ("meta[property='og:image:url']", "content"),
    ("meta[name='twitter:image']", "content"),
    ("meta[property='twitter:image']", "content"),
    ("link[rel='image_src']", "href"),
];

const CONTENT_IMAGE_SELECTORS: &[&str] = &["article img[src]", "main img[src]", "body img[src]"];

/// The page's representative image as an absolute URL.
pub fn top_image(document: &Html, base: &Url) -> Option<String> {
    for (selector, attr) in META_IMAGE_SELECTORS {
        if let Some(found) = select_attr(document, selector, attr, base) {
            return Some(found);
        }
    }

    CONTENT_IMAGE_SELECTORS
        .iter()
        .find_map(|selector| select_attr(document, selector, "src", base))
}

fn select_attr(document: &Html, selector: &str, attr: &str, base: &Url) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.starts_with("data:"))
        .find_map(|v| base.join(v).ok())
        .map(|u| u.to_string())
}
