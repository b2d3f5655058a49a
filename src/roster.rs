use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};

use crate::{
    models::{OpaqueId, ProgressSummary, RosterEntry, RosterRow, SnapshotError},
    normalize::normalize,
    progress::summarize,
    resolver::resolve_next,
    source::CurriculumSource,
};

/// One row per entry, in input order. A missing snapshot degrades its own row
/// to zero progress and never blocks the rest of the roster.
pub fn reduce_roster(entries: Vec<RosterEntry>) -> Vec<RosterRow> {
    entries.into_iter().map(reduce_entry).collect()
}

fn reduce_entry(entry: RosterEntry) -> RosterRow {
    match entry.snapshot {
        Ok(curriculum) => RosterRow {
            enrollment_id: entry.enrollment_id,
            summary: summarize(&curriculum).overall,
            next: resolve_next(&curriculum),
            error: None,
        },
        Err(e) => {
            tracing::warn!(enrollment_id = %entry.enrollment_id, error = %e, "roster entry degraded");
            RosterRow {
                enrollment_id: entry.enrollment_id,
                summary: ProgressSummary::default(),
                next: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Fetches every enrollment's curriculum with at most `concurrency` requests
/// in flight. Entries come back in the order of `ids`.
pub async fn load_roster(
    source: Arc<dyn CurriculumSource>,
    ids: Vec<OpaqueId>,
    bearer: Option<String>,
    concurrency: usize,
) -> Vec<RosterEntry> {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let bearer: Option<Arc<str>> = bearer.map(Arc::from);
    let mut set = JoinSet::new();

    for (pos, id) in ids.iter().cloned().enumerate() {
        let source = source.clone();
        let permits = permits.clone();
        let bearer = bearer.clone();
        set.spawn(async move {
            let snapshot = match permits.acquire_owned().await {
                Ok(_permit) => source
                    .fetch_curriculum(&id, bearer.as_deref())
                    .await
                    .map(|raw| normalize(&raw))
                    .map_err(SnapshotError::from),
                Err(_) => Err(SnapshotError::Unavailable("fetch pool closed".into())),
            };
            (pos, snapshot)
        });
    }

    let mut slots: Vec<Option<Result<_, SnapshotError>>> = vec![None; ids.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((pos, snapshot)) => slots[pos] = Some(snapshot),
            Err(e) => tracing::error!(error = %e, "curriculum fetch task failed"),
        }
    }

    ids.into_iter()
        .zip(slots)
        .map(|(enrollment_id, slot)| RosterEntry {
            enrollment_id,
            snapshot: slot.unwrap_or_else(|| Err(SnapshotError::Unavailable("fetch task aborted".into()))),
        })
        .collect()
}
