use anyhow::{Result, bail};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use clearfeed::config::Config;
use clearfeed::entities::NewSource;
use clearfeed::extractor::ReadabilityExtractor;
use clearfeed::feeds::HttpFeedReader;
use clearfeed::ingest::ArticleFetcher;
use clearfeed::pipeline::Pipeline;
use clearfeed::repositories::{self, SettingsRepository};
use clearfeed::scout::Scout;
use clearfeed::summarizer::ChatSummarizer;
use clearfeed::topics;
use clearfeed::translator::{GoogleTranslator, Language, Translator};

mod cli;

use cli::{Cli, Command, SourcesCommand, TopicsCommand};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Cancelled on Ctrl-C so long commands stop with what they have.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Received shutdown signal, stopping after the current step...");
        trigger.cancel();
    });
    token
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = Config::from_env()?;
    let pool = repositories::connect(config.database_url()).await?;
    repositories::migrate(&pool).await?;

    let cancel = shutdown_token();
    let pipeline = Pipeline::new(pool.clone()).with_cancellation(cancel.clone());
    let settings = SettingsRepository::new(pool);

    match cli.command {
        Command::Topics { action } => match action {
            TopicsCommand::List => {
                for (group, subtopics) in topics::GROUPED_TOPICS {
                    println!("{group}: {}", subtopics.join(", "));
                }
            }
            TopicsCommand::Select { topics: chosen } => {
                let unknown: Vec<&String> = chosen.iter().filter(|t| !topics::is_known(t)).collect();
                if !unknown.is_empty() {
                    bail!("unknown topics: {unknown:?}");
                }
                settings.save_selected_topics(&chosen).await?;
                println!("Selected topics: {}", chosen.join(", "));
            }
            TopicsCommand::Show => {
                let selected = settings.selected_topics().await?;
                if selected.is_empty() {
                    println!("No topics selected.");
                } else {
                    println!("Selected topics: {}", selected.join(", "));
                }
            }
        },

        Command::Scout { topics: requested, save } => {
            let scout = Scout::from_config(&config)?;
            let requested = if requested.is_empty() {
                settings.selected_topics().await?
            } else {
                requested
            };
            if requested.is_empty() {
                bail!("no topics given and none selected; run `clearfeed topics select` first");
            }

            let summary = pipeline.scout_topics(&scout, &requested).await;
            for (topic, cause) in &summary.degraded {
                warn!(topic = %topic, cause = %cause, "search unavailable for topic");
            }
            if summary.sources.is_empty() {
                println!("No sources found for these topics. Try others.");
                return Ok(());
            }

            println!("Found {} unique, vetted sources:", summary.sources.len());
            for source in &summary.sources {
                print_source(source);
            }
            if save {
                let added = pipeline.save_vetted(&summary.sources).await?;
                println!("Saved {added} new sources to the database.");
            }
        }

        Command::Fetch { sources, max } => {
            let summarizer = ChatSummarizer::from_config(&config)?;
            let fetcher = ArticleFetcher::new(Arc::new(HttpFeedReader), Arc::new(ReadabilityExtractor))
                .with_cancellation(cancel);
            let report = pipeline
                .fetch_and_ingest(&fetcher, &summarizer, &sources, max)
                .await?;
            if report.fetched == 0 {
                println!("No articles could be fetched from the selected sources.");
            } else {
                println!(
                    "Fetched {} articles: {} stored, {} duplicates, {} without source, {} failed ({} with placeholder summaries).",
                    report.fetched,
                    report.stored,
                    report.duplicates,
                    report.missing_source,
                    report.failed,
                    report.placeholder_summaries
                );
            }
        }

        Command::Sources { action } => match action {
            SourcesCommand::List { with_seed } => {
                if with_seed {
                    let merged =
                        repositories::load_all_sources(pipeline.sources(), config.sources_file()).await?;
                    for source in &merged {
                        print_source(source);
                    }
                } else {
                    let stored = pipeline.sources().list_by_name().await?;
                    if stored.is_empty() {
                        println!("No sources in your database.");
                    }
                    for source in stored {
                        println!(
                            "#{:<4} {:<30} {:<15} {}  (trust {})",
                            source.id, source.name, source.category, source.url, source.trust_score
                        );
                    }
                }
            }
            SourcesCommand::Add {
                name,
                url,
                category,
                trust_score,
                filter_topic,
            } => {
                let source = NewSource {
                    name,
                    url,
                    category,
                    trust_score,
                    user_added: true,
                    filter_topic,
                };
                if pipeline.sources().insert_or_ignore(&source).await? {
                    println!("Source '{}' added.", source.name);
                } else {
                    println!("A source with URL {} already exists.", source.url);
                }
            }
            SourcesCommand::Remove { id } => {
                if pipeline.sources().delete(id).await? {
                    println!("Source #{id} removed.");
                } else {
                    println!("No source with id {id}.");
                }
            }
            SourcesCommand::Seed => {
                let added = repositories::import_seed(pipeline.sources(), config.sources_file()).await?;
                println!("Imported {added} new sources from {}.", config.sources_file().display());
            }
        },

        Command::Reset => {
            let deleted = pipeline.reset().await?;
            println!("All {deleted} articles have been deleted from your feed.");
        }

        Command::Feed {
            limit,
            language,
            translate,
        } => {
            let translator = GoogleTranslator::from_config(&config);
            let translation = translate
                .as_deref()
                .map(|name| (&translator as &dyn Translator, Language::from_name(name)));
            let items = pipeline.feed(limit, language.as_deref(), translation).await?;
            if items.is_empty() {
                println!("No news articles saved yet. Fetch and summarize some news first!");
            }
            for item in items {
                println!("{}\n  {}", item.title, item.url);
                println!("  Source: {} | Published: {}", item.source_name, item.published_at);
                if let Some(image) = &item.image_url {
                    println!("  Image: {image}");
                }
                println!("  {}\n", item.summary);
            }
        }
    }

    Ok(())
}

fn print_source(source: &NewSource) {
    let filter = source
        .filter_topic
        .as_deref()
        .map(|t| format!(" [filter: {t}]"))
        .unwrap_or_default();
    println!(
        "{:<30} {:<15} {}  (trust {}){filter}",
        source.name, source.category, source.url, source.trust_score
    );
}
