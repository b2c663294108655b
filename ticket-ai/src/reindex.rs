//! Bulk embedding rebuild.
//!
//! The vector index is a derived, rebuildable cache keyed by ticket id;
//! this scan-and-reembed pass is the recovery mechanism whenever the index
//! and the record store drift apart. Safe to repeat: upserts are keyed by
//! ticket id, so a rerun converges on the same state.

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use crate::AiService;
use crate::error::AiError;

/// Outcome counts of one reindex pass.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReindexReport {
    pub total: usize,
    pub indexed: usize,
    /// Tickets without a description; nothing to embed.
    pub skipped: usize,
    pub failed: usize,
}

enum Outcome {
    Indexed,
    Skipped,
    Failed,
}

/// Re-embeds and re-upserts every ticket in the record store.
///
/// # Errors
/// Returns [`AiError::Store`] if the initial scan fails; per-ticket
/// embedding/upsert failures are counted, not raised.
pub(crate) async fn reindex_all(svc: &AiService) -> Result<ReindexReport, AiError> {
    let texts = svc.repo().all_descriptions().await?;
    let total = texts.len();
    info!(total, "embedding reindex started");

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap()
        .progress_chars("##-"),
    );

    let concurrency = svc.config().reindex_concurrency.max(1);
    let outcomes: Vec<Outcome> = stream::iter(texts)
        .map(|t| {
            let pb = pb.clone();
            async move {
                let outcome = if t.description.trim().is_empty() {
                    Outcome::Skipped
                } else if svc.store_embedding(&t.id, &t.description).await {
                    Outcome::Indexed
                } else {
                    Outcome::Failed
                };
                pb.inc(1);
                outcome
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    pb.finish_with_message("Reindex complete");

    let mut report = ReindexReport {
        total,
        indexed: 0,
        skipped: 0,
        failed: 0,
    };
    for o in outcomes {
        match o {
            Outcome::Indexed => report.indexed += 1,
            Outcome::Skipped => report.skipped += 1,
            Outcome::Failed => report.failed += 1,
        }
    }

    info!(
        indexed = report.indexed,
        skipped = report.skipped,
        failed = report.failed,
        "embedding reindex finished"
    );
    Ok(report)
}
