//! Command-line interface definitions.

use clap::{Parser, Subcommand};

use clearfeed::ingest::DEFAULT_MAX_ARTICLES;
use clearfeed::repositories::articles::FEED_LIMIT;
use clearfeed::scout::vetting::DEFAULT_TRUST_SCORE;

/// Curated news for what you care about.
///
/// ```sh
/// clearfeed topics select Diabetes Tennis
/// clearfeed scout --save
/// clearfeed fetch --max 20
/// clearfeed feed --limit 10
/// ```
#[derive(Parser, Debug)]
#[command(name = "clearfeed", author, version, about)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Browse and select topics of interest
    Topics {
        #[command(subcommand)]
        action: TopicsCommand,
    },
    /// Discover and vet feeds for topics (defaults to the selected topics)
    Scout {
        #[arg(long = "topic")]
        topics: Vec<String>,
        /// Store the vetted sources
        #[arg(long)]
        save: bool,
    },
    /// Fetch, summarize and store articles from stored sources
    Fetch {
        /// Only these sources, by name (default: all)
        #[arg(long = "source")]
        sources: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_MAX_ARTICLES)]
        max: usize,
    },
    /// Manage stored sources
    Sources {
        #[command(subcommand)]
        action: SourcesCommand,
    },
    /// Delete every stored article
    Reset,
    /// Show the stored feed, newest first
    Feed {
        #[arg(long, default_value_t = FEED_LIMIT)]
        limit: i64,
        /// Only articles with this language tag (e.g. "en")
        #[arg(long)]
        language: Option<String>,
        /// Translate summaries to Hindi, Spanish or English
        #[arg(long)]
        translate: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TopicsCommand {
    /// Every topic in the catalog, by group
    List,
    /// Replace the selected topics
    Select {
        #[arg(required = true)]
        topics: Vec<String>,
    },
    /// The currently selected topics
    Show,
}

#[derive(Subcommand, Debug)]
pub enum SourcesCommand {
    /// Stored sources by name
    List {
        /// Include the seed file, merged by URL
        #[arg(long)]
        with_seed: bool,
    },
    /// Add a source by hand
    Add {
        name: String,
        url: String,
        #[arg(long, default_value = "General")]
        category: String,
        #[arg(long, default_value_t = DEFAULT_TRUST_SCORE)]
        trust_score: f64,
        /// Keep only articles mentioning this keyword
        #[arg(long)]
        filter_topic: Option<String>,
    },
    /// Remove a source and its articles
    Remove { id: i64 },
    /// Import the seed file
    Seed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scout_collects_repeated_topics() {
        let cli = Cli::parse_from([
            "clearfeed", "scout", "--topic", "Diabetes", "--topic", "Tennis", "--save",
        ]);
        match cli.command {
            Command::Scout { topics, save } => {
                assert_eq!(topics, vec!["Diabetes", "Tennis"]);
                assert!(save);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn fetch_defaults_to_global_cap() {
        let cli = Cli::parse_from(["clearfeed", "--log-json", "fetch"]);
        assert!(cli.log_json);
        match cli.command {
            Command::Fetch { sources, max } => {
                assert!(sources.is_empty());
                assert_eq!(max, DEFAULT_MAX_ARTICLES);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn select_requires_topics() {
        assert!(Cli::try_parse_from(["clearfeed", "topics", "select"]).is_err());
    }

    #[test]
    fn source_add_defaults() {
        let cli = Cli::parse_from(["clearfeed", "sources", "add", "My Feed", "https://x.org/rss"]);
        match cli.command {
            Command::Sources {
                action:
                    SourcesCommand::Add {
                        category,
                        trust_score,
                        filter_topic,
                        ..
                    },
            } => {
                assert_eq!(category, "General");
                assert_eq!(trust_score, DEFAULT_TRUST_SCORE);
                assert_eq!(filter_topic, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
