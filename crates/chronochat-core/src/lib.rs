//! ChronoChat Core
//!
//! Client-side control logic for a chat application built atop a
//! state-synchronization substrate. This crate provides the data model, the
//! update-driven fetch scheduler, and the capability interface the substrate
//! is accessed through. Session wiring and the interactive command loop live
//! in `chronochat-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod config;
pub mod errors;
pub mod events;
pub mod name;
pub mod scheduler;
pub mod substrate;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use config::ChatConfig;
pub use errors::{ChronoChatError, ChronoChatResult};
pub use events::{
    create_fetch_request_channel, create_sync_event_channel, FetchRequestReceiver,
    FetchRequestSender, SyncEvent, SyncEventReceiver, SyncEventSender,
};
pub use name::Name;
pub use scheduler::FetchScheduler;
pub use substrate::SyncSubstrate;
pub use types::{ChatMessage, FetchRequest, MissingRange, ParticipantId, SequenceNumber};
