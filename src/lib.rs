pub mod config;
pub mod datetime;
pub mod entities;
pub mod extractor;
pub mod feeds;
pub mod fetcher;
pub mod ingest;
pub mod outcome;
pub mod pipeline;
pub mod repositories;
pub mod scout;
pub mod summarizer;
pub mod topics;
pub mod translator;
