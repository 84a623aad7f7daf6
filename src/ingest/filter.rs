use crate::extractor::ExtractedArticle;
use crate::feeds::FeedEntry;

/// Case-insensitive keyword match on a feed entry's title, summary or tags.
pub fn entry_matches(entry: &FeedEntry, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    entry.title.to_lowercase().contains(&keyword)
        || entry.summary.to_lowercase().contains(&keyword)
        || entry
            .tags
            .iter()
            .any(|t| t.to_lowercase().contains(&keyword))
}

/// Case-insensitive keyword match on an extracted page's title or text.
pub fn article_matches(article: &ExtractedArticle, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    article.title.to_lowercase().contains(&keyword) || article.text.to_lowercase().contains(&keyword)
}

/// Entries that mention `filter_topic`, or all of them when there is none.
pub fn filter_entries(entries: Vec<FeedEntry>, filter_topic: Option<&str>) -> Vec<FeedEntry> {
    match filter_topic.filter(|t| !t.trim().is_empty()) {
        Some(topic) => entries
            .into_iter()
            .filter(|e| entry_matches(e, topic))
            .collect(),
        None => entries,
    }
}
