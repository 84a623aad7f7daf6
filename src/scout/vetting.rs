use std::collections::HashSet;
use tracing::debug;

use crate::entities::NewSource;

/// Score given to every scouted feed until real trust scoring exists.
pub const DEFAULT_TRUST_SCORE: f64 = 7.0;

/// The host part of `http://host/path`, or the whole string when it has no
/// third `/`-separated token.
pub fn domain_of(url: &str) -> &str {
    url.split('/').nth(2).unwrap_or(url)
}

/// Deduplicate feeds by URL and by domain (first wins) and turn the survivors
/// into sources named after their domain.
pub fn vet_and_format_feeds(feeds: &[String], category: &str) -> Vec<NewSource> {
    let mut seen_urls = HashSet::new();
    let mut seen_domains = HashSet::new();
    let mut vetted = Vec::new();

    for feed_url in feeds {
        let domain = domain_of(feed_url);
        if seen_urls.contains(feed_url.as_str()) || seen_domains.contains(domain) {
            debug!(url = %feed_url, "skipping duplicate feed or domain");
            continue;
        }
        seen_urls.insert(feed_url.as_str());
        seen_domains.insert(domain);

        vetted.push(NewSource {
            name: domain.to_string(),
            url: feed_url.clone(),
            category: category.to_string(),
            trust_score: DEFAULT_TRUST_SCORE,
            user_added: true,
            filter_topic: None,
        });
    }

    debug!(count = vetted.len(), "vetted sources");
    vetted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feeds(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn dedupes_by_url_and_domain() {
        let vetted = vet_and_format_feeds(
            &feeds(&["http://a.com/rss", "http://a.com/rss", "http://b.com/feed"]),
            "Diabetes",
        );
        assert_eq!(vetted.len(), 2);
        assert_eq!(vetted[0].name, "a.com");
        assert_eq!(vetted[1].url, "http://b.com/feed");
        assert!(vetted.iter().all(|s| s.category == "Diabetes"));
        assert!(vetted.iter().all(|s| s.trust_score == DEFAULT_TRUST_SCORE));
    }

    #[test]
    fn same_domain_keeps_first_feed() {
        let vetted = vet_and_format_feeds(
            &feeds(&["https://a.com/news/rss", "https://a.com/sport/rss"]),
            "Health",
        );
        assert_eq!(vetted.len(), 1);
        assert_eq!(vetted[0].url, "https://a.com/news/rss");
    }

    #[test]
    fn domain_falls_back_to_whole_url() {
        assert_eq!(domain_of("https://a.com/rss"), "a.com");
        assert_eq!(domain_of("feed.xml"), "feed.xml");
        assert_eq!(domain_of("http:/x"), "http:/x");
    }
}
