//! Synchronization substrate interface
//!
//! The substrate is an external collaborator: it maintains the shared log of
//! per-participant sequence state, notices when counters advance, serves
//! per-sequence fetches with internal retries, and appends published items
//! under the caller's own sequence. This module pins down the small
//! capability surface the chat client needs, so sessions can be wired to a
//! real network substrate or to an in-process double interchangeably.

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::ChronoChatResult;
use crate::events::SyncEventReceiver;
use crate::name::Name;
use crate::types::FetchRequest;

// ----------------------------------------------------------------------------
// Substrate Capability Trait
// ----------------------------------------------------------------------------

/// Capability interface onto the synchronization substrate
#[async_trait]
pub trait SyncSubstrate: Send + Sync {
    /// Join `sync_scope`, publishing under `publish_prefix`
    ///
    /// Establishes the connection and returns the event stream for this
    /// subscription. Call once per session, before anything else.
    async fn subscribe(
        &mut self,
        sync_scope: &Name,
        publish_prefix: &Name,
    ) -> ChronoChatResult<SyncEventReceiver>;

    /// Issue one bounded-retry fetch
    ///
    /// The substrate retries internally up to `request.retry_budget`
    /// attempts. Success surfaces later as [`SyncEvent::DataFetched`];
    /// exhausted retries drop the item silently.
    ///
    /// [`SyncEvent::DataFetched`]: crate::events::SyncEvent::DataFetched
    async fn fetch(&self, request: FetchRequest) -> ChronoChatResult<()>;

    /// Append `body` to our own sequence
    ///
    /// Fire-and-forget: no delivery confirmation. The substrate owns
    /// sequence-number and digest bookkeeping; `freshness` advises how long
    /// the item should stay servable to late-joining fetchers.
    async fn publish(&self, body: &[u8], freshness: Duration) -> ChronoChatResult<()>;

    /// Tear down the subscription
    ///
    /// The event receiver returned by [`subscribe`](Self::subscribe) closes
    /// once teardown completes.
    fn shutdown(&self);
}
