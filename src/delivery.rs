//! Ordered delivery of stored-but-unsent articles.
//!
//! The whole batch runs inside one storage transaction: rows are read,
//! sent oldest-first, and flipped to sent one by one as Telegram confirms
//! each. A transport failure only costs that one article — the row stays
//! unsent and the loop moves on. A storage failure while flipping a flag
//! rolls the entire transaction back, so already-delivered-but-unflagged
//! items are re-sent on the next run: at-least-once, never silently lost.

use std::error::Error;

use chrono::NaiveDateTime;
use tracing::{error, info, instrument, warn};

use crate::store::NewsStore;
use crate::telegram::Transport;
use crate::timefmt;

/// What happened to one unsent row during a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Sent and flagged inside this batch's transaction.
    Delivered,
    /// The transport refused it; the row stays unsent for a future run.
    Failed(String),
    /// Not attempted — the row has no image to send.
    Skipped,
}

/// Per-item outcomes of one delivery batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Vec<(i64, DeliveryOutcome)>,
}

impl BatchReport {
    fn record(&mut self, id: i64, outcome: DeliveryOutcome) {
        self.outcomes.push((id, outcome));
    }

    pub fn outcomes(&self) -> &[(i64, DeliveryOutcome)] {
        &self.outcomes
    }

    pub fn delivered(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Delivered))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Skipped))
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, pred: impl Fn(&DeliveryOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Deliver every unsent article, oldest first.
///
/// Rows are sorted by parsed `posted` ascending with a stable sort, ties
/// keeping storage order; a row whose timestamp no longer parses sorts as
/// earliest. Partial batch success is acceptable by design — the caller
/// gets the full per-item picture in the [`BatchReport`].
///
/// # Errors
///
/// Only storage errors surface here: beginning the transaction, reading
/// the unsent set, a failed flag update (which rolls back the whole
/// batch), or the final commit.
#[instrument(level = "info", skip_all, fields(dry_run = dry_run))]
pub async fn process_unsent<T: Transport>(
    store: &NewsStore,
    transport: &T,
    dry_run: bool,
) -> Result<BatchReport, Box<dyn Error>> {
    if dry_run {
        info!("DRY-RUN: finished processing unsent items");
        return Ok(BatchReport::default());
    }

    let mut tx = store.begin().await?;
    let mut items = NewsStore::select_unsent(&mut tx).await?;
    if items.is_empty() {
        info!("No unsent items found...");
        tx.commit().await?;
        return Ok(BatchReport::default());
    }

    items.sort_by_key(|item| {
        timefmt::parse_canonical(&item.posted).unwrap_or(NaiveDateTime::MIN)
    });

    let mut report = BatchReport::default();
    for item in &items {
        if item.image.is_empty() {
            warn!(id = item.id, "Item has no image; skipping");
            report.record(item.id, DeliveryOutcome::Skipped);
            continue;
        }

        if let Err(e) = transport.send(item).await {
            error!(id = item.id, error = %e, "Error sending item to Telegram; leaving unsent");
            report.record(item.id, DeliveryOutcome::Failed(e.to_string()));
            continue;
        }

        if let Err(update_err) = NewsStore::mark_sent(&mut tx, item.id).await {
            error!(
                id = item.id,
                error = %update_err,
                "Error updating sent flag; rolling back the batch"
            );
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, "Rollback failed");
            }
            return Err(update_err.into());
        }
        report.record(item.id, DeliveryOutcome::Delivered);
    }

    tx.commit().await?;
    info!(
        delivered = report.delivered(),
        failed = report.failed(),
        skipped = report.skipped(),
        "Delivery batch complete"
    );
    Ok(report)
}
