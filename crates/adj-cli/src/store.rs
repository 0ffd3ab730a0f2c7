//! # JSON Store File
//!
//! The CLI works against a single JSON file holding an array of
//! adjudication aggregates. The file is read into an in-memory repository,
//! commands run against it, and mutating commands write it back.

use std::path::Path;
use std::sync::Arc;

use adj_lifecycle::{
    InMemoryAdjudicationRepository, LifecycleConfig, LifecycleContext, ReportedAdjudication,
    TracingEventPublisher,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Read the store file. A missing file is an empty store.
pub fn load_store(path: &Path) -> Result<InMemoryAdjudicationRepository> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "store file not found, starting empty");
        return Ok(InMemoryAdjudicationRepository::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read store {}", path.display()))?;
    let records: Vec<ReportedAdjudication> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse store {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = records.len(), "store loaded");
    Ok(InMemoryAdjudicationRepository::with_records(records))
}

/// Write every aggregate in `repository` back to the store file.
pub fn save_store(path: &Path, repository: &InMemoryAdjudicationRepository) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("failed to create store directory")?;
    }
    let json = serde_json::to_string_pretty(&repository.snapshot())?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write store {}", path.display()))?;
    Ok(())
}

/// A lifecycle context over the store file's contents.
pub fn open_context(
    store: &Path,
    config: Option<&Path>,
    today: Option<NaiveDate>,
) -> Result<(LifecycleContext, Arc<InMemoryAdjudicationRepository>)> {
    let config = LifecycleConfig::load(config).context("failed to load configuration")?;
    let repository = Arc::new(load_store(store)?);
    let mut ctx = LifecycleContext::new(
        repository.clone(),
        Arc::new(TracingEventPublisher),
        config,
    );
    if let Some(today) = today {
        ctx = ctx.with_today(today);
    }
    Ok((ctx, repository))
}
