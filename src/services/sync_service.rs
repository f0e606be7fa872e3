//! Mirror sync service
//!
//! Full re-export of users and problems to the spreadsheet mirror, used to
//! bring the mirror back in line after an outage. The push itself is
//! fire-and-forget like every other mirror event.

use crate::{
    error::AppResult,
    mirror::{MirrorEvent, MirrorHandle},
    models::User,
    services::AdminGate,
    store::DataStore,
};

/// Mirror sync service
pub struct SyncService;

impl SyncService {
    /// Snapshot all users and problems and enqueue a full mirror sync.
    /// Returns the counts included in the snapshot.
    pub async fn sync_all(
        store: &dyn DataStore,
        mirror: &MirrorHandle,
        actor: &User,
    ) -> AppResult<(usize, usize)> {
        AdminGate::ensure_admin(actor)?;

        let users = store.list_users().await?;
        let problems = store.list_problems().await?;
        mirror.push(MirrorEvent::sync_all(&users, &problems));

        tracing::info!(
            users = users.len(),
            problems = problems.len(),
            "full mirror sync enqueued"
        );
        Ok((users.len(), problems.len()))
    }
}
