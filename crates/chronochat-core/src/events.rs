//! Typed events and channels
//!
//! The substrate's notification and fetch-completion callbacks are modeled as
//! a stream of typed events consumed by the single-threaded session loop.
//! Fetch requests flow the other way over their own channel. Both channels
//! are unbounded: notification handling must never block.

use tokio::sync::mpsc;

use crate::name::Name;
use crate::types::{FetchRequest, MissingRange};

// ----------------------------------------------------------------------------
// Substrate Events
// ----------------------------------------------------------------------------

/// Events delivered by the synchronization substrate
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Newly visible sequence ranges, at most one per participant
    Updates(Vec<MissingRange>),
    /// One fetch completed; carries the item's full data name and payload
    ///
    /// Completion order is not issue order. A fetch that exhausts its retry
    /// budget produces no event at all.
    DataFetched { name: Name, payload: Vec<u8> },
}

// ----------------------------------------------------------------------------
// Channels
// ----------------------------------------------------------------------------

pub type SyncEventSender = mpsc::UnboundedSender<SyncEvent>;
pub type SyncEventReceiver = mpsc::UnboundedReceiver<SyncEvent>;

pub type FetchRequestSender = mpsc::UnboundedSender<FetchRequest>;
pub type FetchRequestReceiver = mpsc::UnboundedReceiver<FetchRequest>;

pub fn create_sync_event_channel() -> (SyncEventSender, SyncEventReceiver) {
    mpsc::unbounded_channel()
}

pub fn create_fetch_request_channel() -> (FetchRequestSender, FetchRequestReceiver) {
    mpsc::unbounded_channel()
}
