//! Batch/progress scheduler.
//!
//! Top-level records are split into fixed-size chunks. Each chunk's
//! imports are issued together and awaited as a unit; a progress
//! notification is posted before every chunk and once more at the end.

use std::future::Future;

use futures::future::join_all;
use tokio::sync::mpsc::UnboundedSender;

use crate::report::ImportProgress;

/// Message of the final progress notification.
pub const COMPLETE_MESSAGE: &str = "Import complete";

/// Runs per-item futures in chunks, reporting progress between chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchScheduler {
    batch_size: usize,
}

impl BatchScheduler {
    /// Create a scheduler. A batch size of 0 is treated as 1.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Items per chunk.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run `task` over every item, one chunk at a time.
    ///
    /// Results come back in input order. Progress is posted as
    /// `{current: processed so far, total}` before each chunk, then
    /// `{total, total}` once everything has settled. A closed progress
    /// channel is ignored.
    pub async fn run<'a, T, R, F, Fut>(
        &self,
        items: &'a [T],
        progress: Option<&UnboundedSender<ImportProgress>>,
        mut task: F,
    ) -> Vec<R>
    where
        F: FnMut(&'a T) -> Fut,
        Fut: Future<Output = R>,
    {
        let total = items.len();
        let mut results = Vec::with_capacity(total);

        for chunk in items.chunks(self.batch_size) {
            let processed = results.len();
            post(
                progress,
                ImportProgress {
                    current: processed,
                    total,
                    message: format!("Importing {processed}/{total}"),
                },
            );
            tracing::debug!(processed, total, chunk = chunk.len(), "Starting batch");
            results.extend(join_all(chunk.iter().map(&mut task)).await);
        }

        post(
            progress,
            ImportProgress {
                current: total,
                total,
                message: COMPLETE_MESSAGE.to_string(),
            },
        );
        results
    }
}

fn post(progress: Option<&UnboundedSender<ImportProgress>>, update: ImportProgress) {
    if let Some(tx) = progress {
        if tx.send(update).is_err() {
            tracing::trace!("Progress receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_progress_at_batch_boundaries() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let items: Vec<usize> = (0..25).collect();

        let results = BatchScheduler::new(20)
            .run(&items, Some(&tx), |n| async move { n * 2 })
            .await;
        drop(tx);

        assert_eq!(results, items.iter().map(|n| n * 2).collect::<Vec<_>>());
        let mut seen = Vec::new();
        while let Some(update) = rx.recv().await {
            seen.push((update.current, update.total));
        }
        assert_eq!(seen, vec![(0, 25), (20, 25), (25, 25)]);
    }

    #[tokio::test]
    async fn test_empty_input_reports_completion() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let items: Vec<u8> = Vec::new();

        let results: Vec<u8> = BatchScheduler::new(5)
            .run(&items, Some(&tx), |n| async move { *n })
            .await;

        assert!(results.is_empty());
        let update = rx.recv().await.expect("completion");
        assert_eq!(update.message, COMPLETE_MESSAGE);
    }

    #[test]
    fn test_zero_batch_size() {
        assert_eq!(BatchScheduler::new(0).batch_size(), 1);
    }
}
