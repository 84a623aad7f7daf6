use crate::entities::NewSource;
use crate::repositories::SourceRepository;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Read the JSON seed list (`[{name, url, category, trust_score}]`). A missing
/// file is an empty list. Entries are always tagged as system-seeded.
pub async fn read_seed_file(path: &Path) -> Result<Vec<NewSource>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "seed file not found");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading seed file {}", path.display()));
        }
    };

    let mut sources: Vec<NewSource> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing seed file {}", path.display()))?;
    for source in &mut sources {
        source.user_added = false;
    }
    Ok(sources)
}

/// Union of the seed file and the stored sources, keyed by URL. Stored rows
/// override seed entries; seed order comes first, then stored-only rows.
pub async fn load_all_sources(repo: &SourceRepository, seed_path: &Path) -> Result<Vec<NewSource>> {
    let seeded = read_seed_file(seed_path).await?;
    let stored = repo.list_by_name().await?;

    let mut merged: Vec<NewSource> = Vec::with_capacity(seeded.len() + stored.len());
    let mut by_url: HashMap<String, usize> = HashMap::new();

    for source in seeded.into_iter().chain(stored.into_iter().map(NewSource::from)) {
        match by_url.get(&source.url) {
            Some(&idx) => merged[idx] = source,
            None => {
                by_url.insert(source.url.clone(), merged.len());
                merged.push(source);
            }
        }
    }

    Ok(merged)
}

/// Store the seed file's sources. Returns how many were new.
pub async fn import_seed(repo: &SourceRepository, seed_path: &Path) -> Result<usize> {
    let seeded = read_seed_file(seed_path).await?;
    let total = seeded.len();

    let mut added = 0;
    for source in &seeded {
        if repo.insert_or_ignore(source).await? {
            added += 1;
        }
    }

    info!(total, added, "imported seed sources");
    Ok(added)
}
